//! # jobnest-database
//!
//! Store interfaces consumed by the identity core, their PostgreSQL
//! repository implementations, and an in-memory implementation used by
//! tests and single-node demos.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryDatabase;
pub use store::{
    AccountStore, ConsumeOutcome, OneTimeTokenStore, ProfileUpdate, RefreshTokenStore, StoreSet,
    TokenEffect,
};
