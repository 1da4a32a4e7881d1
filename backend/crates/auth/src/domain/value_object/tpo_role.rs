//! TPO Role Value Object

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role held by a TPO officer. Roles are checked by membership, not by
/// seniority ordering; an Admin does not implicitly satisfy a Coordinator
/// requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum TpoRole {
    Assistant = 0,
    Coordinator = 1,
    Admin = 2,
}

impl TpoRole {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            TpoRole::Assistant => "assistant",
            TpoRole::Coordinator => "coordinator",
            TpoRole::Admin => "admin",
        }
    }

    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, TpoRole::Admin)
    }

    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(TpoRole::Assistant),
            1 => Some(TpoRole::Coordinator),
            2 => Some(TpoRole::Admin),
            _ => None,
        }
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "assistant" => Some(TpoRole::Assistant),
            "coordinator" => Some(TpoRole::Coordinator),
            "admin" => Some(TpoRole::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for TpoRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip() {
        for role in [TpoRole::Assistant, TpoRole::Coordinator, TpoRole::Admin] {
            assert_eq!(TpoRole::from_id(role.id()), Some(role));
        }
        assert_eq!(TpoRole::from_id(-1), None);
    }

    #[test]
    fn test_code_roundtrip() {
        assert_eq!(TpoRole::from_code("coordinator"), Some(TpoRole::Coordinator));
        assert_eq!(TpoRole::from_code("Coordinator"), None);
        assert_eq!(TpoRole::from_code(""), None);
    }

    #[test]
    fn test_is_admin() {
        assert!(TpoRole::Admin.is_admin());
        assert!(!TpoRole::Coordinator.is_admin());
        assert!(!TpoRole::Assistant.is_admin());
    }
}
