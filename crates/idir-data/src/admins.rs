use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Back-office role. Blocked accounts keep their record but can
/// no longer sign in.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum AdminRole {
    #[default]
    RegularAdmin,
    SuperAdmin,
    Blocked,
}

impl fmt::Display for AdminRole {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            AdminRole::RegularAdmin => "regularAdmin",
            AdminRole::SuperAdmin => "superAdmin",
            AdminRole::Blocked => "blocked",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for AdminRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "regularAdmin" | "regular" => Ok(AdminRole::RegularAdmin),
            "superAdmin" | "super" => Ok(AdminRole::SuperAdmin),
            "blocked" => Ok(AdminRole::Blocked),
            other => Err(anyhow::anyhow!("unknown admin role: {}", other)),
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AdminFilter {
    pub uid: Option<String>,
    pub email: Option<String>,
    pub role: Option<AdminRole>,
}

/// A back-office account.
#[derive(Debug, Default, Clone, FromRow, Serialize, Deserialize)]
pub struct Admin {
    pub uid: String,
    pub email: String,
    pub name: String,
    pub role: AdminRole,
    pub password_hash: String,
}

impl Admin {
    pub fn is_super(&self) -> bool {
        self.role == AdminRole::SuperAdmin
    }
}
