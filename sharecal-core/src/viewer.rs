//! Who is looking at the calendar.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SharecalError;

/// Per-user role controlling delete rights and baseline edit rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = SharecalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(SharecalError::InvalidInput(format!(
                "Unknown role '{}'. Expected admin or user",
                other
            ))),
        }
    }
}

/// Snapshot of the current viewer.
///
/// A viewer without a role is treated as unauthenticated, even when an
/// identity is known.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    pub identity: Option<String>,
    pub role: Option<Role>,
}

impl Viewer {
    pub fn anonymous() -> Self {
        Viewer::default()
    }

    pub fn new(identity: impl Into<String>, role: Role) -> Self {
        Viewer {
            identity: Some(identity.into()),
            role: Some(role),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some() && self.role.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }

    /// Whether this viewer is the given identity.
    pub fn is(&self, identity: Option<&str>) -> bool {
        matches!((self.identity.as_deref(), identity), (Some(a), Some(b)) if a == b)
    }
}

impl fmt::Display for Viewer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.identity, self.role) {
            (Some(id), Some(role)) => write!(f, "{} ({})", id, role),
            (Some(id), None) => write!(f, "{} (no role)", id),
            _ => f.write_str("anonymous"),
        }
    }
}
