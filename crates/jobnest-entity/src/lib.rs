//! # jobnest-entity
//!
//! Domain entity models for the JobNest identity core. Every struct in this
//! crate represents a database table row or a domain value object. Database
//! entities additionally derive `sqlx::FromRow`.

pub mod account;
pub mod token;
