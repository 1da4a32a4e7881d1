//! TPO Permission Value Object
//!
//! Fine-grained permissions carried independently of role. A permission
//! requirement is satisfied only if every demanded permission is present on
//! the officer's grant list.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TpoPermission {
    ManageStudents,
    ManageCompanies,
    ManageAlumni,
    ManageDrives,
    ManageTpo,
    ViewAnalytics,
}

impl TpoPermission {
    pub const ALL: [TpoPermission; 6] = [
        TpoPermission::ManageStudents,
        TpoPermission::ManageCompanies,
        TpoPermission::ManageAlumni,
        TpoPermission::ManageDrives,
        TpoPermission::ManageTpo,
        TpoPermission::ViewAnalytics,
    ];

    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            TpoPermission::ManageStudents => "manage_students",
            TpoPermission::ManageCompanies => "manage_companies",
            TpoPermission::ManageAlumni => "manage_alumni",
            TpoPermission::ManageDrives => "manage_drives",
            TpoPermission::ManageTpo => "manage_tpo",
            TpoPermission::ViewAnalytics => "view_analytics",
        }
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "manage_students" => Some(TpoPermission::ManageStudents),
            "manage_companies" => Some(TpoPermission::ManageCompanies),
            "manage_alumni" => Some(TpoPermission::ManageAlumni),
            "manage_drives" => Some(TpoPermission::ManageDrives),
            "manage_tpo" => Some(TpoPermission::ManageTpo),
            "view_analytics" => Some(TpoPermission::ViewAnalytics),
            _ => None,
        }
    }
}

impl fmt::Display for TpoPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        for perm in TpoPermission::ALL {
            assert_eq!(TpoPermission::from_code(perm.code()), Some(perm));
        }
        assert_eq!(TpoPermission::from_code("manage_everything"), None);
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&TpoPermission::ManageDrives).unwrap();
        assert_eq!(json, r#""manage_drives""#);
        let perm: TpoPermission = serde_json::from_str(r#""view_analytics""#).unwrap();
        assert_eq!(perm, TpoPermission::ViewAnalytics);
    }
}
