//! Scheduled maintenance tasks for JobNest.
//!
//! The only periodic job today is the sweep that deletes expired refresh
//! tokens from the ledger.

pub mod scheduler;

pub use scheduler::MaintenanceScheduler;
