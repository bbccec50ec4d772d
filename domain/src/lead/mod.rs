//! Lead domain.
//!
//! - [`entities::Lead`]: a pending item of sales work eligible for assignment

pub mod entities;
