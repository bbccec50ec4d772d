//! Application configuration
//!
//! - [`TableNames`]: which store tables the use cases read and write
//! - [`AssignmentSettings`]: defaults applied to every assignment run

mod assignment_settings;
mod table_names;

pub use assignment_settings::AssignmentSettings;
pub use table_names::TableNames;
