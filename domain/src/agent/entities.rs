//! Agent entity

use crate::core::ids::AgentId;
use serde::{Deserialize, Serialize};

/// A party eligible to receive leads.
///
/// Only active agents may be chosen as targets of a fresh distribution.
/// Assignments held by agents that were later deactivated stay in place
/// until an operator transfers them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Agent {
    pub fn new(id: impl Into<AgentId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_active: true,
        }
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}
