//! Praxio core domain logic.
//!
//! This crate has zero internal dependencies so the workflow engine can be
//! used by the API/repository layer and by any future reporting or batch
//! tooling without dragging in HTTP or database concerns.

pub mod error;
pub mod permissions;
pub mod types;
pub mod workflow;
