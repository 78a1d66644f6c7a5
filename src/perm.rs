//! Permission kinds and their bit/name mappings

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GateError;

/// The five canonical permission kinds a sub-module can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Permission {
    Read,
    Create,
    Edit,
    Delete,
    Full,
}

// Capability bit constants
pub const READ: u8 = 1;
pub const CREATE: u8 = 1 << 1;
pub const EDIT: u8 = 1 << 2;
pub const DELETE: u8 = 1 << 3;
pub const FULL: u8 = 1 << 4;

impl Permission {
    pub const ALL: [Permission; 5] = [
        Permission::Read,
        Permission::Create,
        Permission::Edit,
        Permission::Delete,
        Permission::Full,
    ];

    /// The literal name used in grant payloads
    pub fn as_str(self) -> &'static str {
        match self {
            Permission::Read => "Read",
            Permission::Create => "Create",
            Permission::Edit => "Edit",
            Permission::Delete => "Delete",
            Permission::Full => "Full",
        }
    }

    #[inline]
    pub fn bit(self) -> u8 {
        match self {
            Permission::Read => READ,
            Permission::Create => CREATE,
            Permission::Edit => EDIT,
            Permission::Delete => DELETE,
            Permission::Full => FULL,
        }
    }

    /// Any kind but Read; one of these anywhere lifts the global read-only override
    #[inline]
    pub fn is_write(self) -> bool {
        self != Permission::Read
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = GateError;

    /// Exact, case-sensitive match; anything else is a caller error
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| GateError::UnknownPermission(s.to_string()))
    }
}

/// Whether a grant list names any write-class kind
pub fn names_any_write(names: &[String]) -> bool {
    names.iter().any(|n| n.parse::<Permission>().is_ok_and(Permission::is_write))
}

/// Convert a list of kinds to a mask
pub fn kinds_to_mask(kinds: &[Permission]) -> u8 {
    kinds.iter().fold(0, |a, k| a | k.bit())
}
