//! # Repositories
//!
//! Shared storage that many owners draw from.

pub mod points;
