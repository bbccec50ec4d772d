//! Sales agent domain.
//!
//! - [`entities::Agent`]: a staff member who can receive leads

pub mod entities;
