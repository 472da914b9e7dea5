#![forbid(unsafe_code)]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Subscription plan offered in the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Plan {
    Basic,
    Pro,
}

impl Plan {
    pub const ALL: [Plan; 2] = [Plan::Basic, Plan::Pro];

    /// Resolve a plan id (`"1"` or `"2"`).
    pub fn from_id(id: &str) -> Result<Self, DomainError> {
        match id {
            "1" => Ok(Self::Basic),
            "2" => Ok(Self::Pro),
            other => Err(DomainError::UnknownPlan(other.to_string())),
        }
    }

    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Basic => "1",
            Self::Pro => "2",
        }
    }

    /// Display name, also the value stored in the subscription state.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Pro => "Pro",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Plan {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s)
    }
}
