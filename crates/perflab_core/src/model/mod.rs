//! Domain model for the project registry.
//!
//! # Responsibility
//! - Define canonical data structures used by registry business logic.
//! - Keep validation rules next to the records they protect.
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - A project always references exactly one owner.

pub mod entity;
pub mod project;
