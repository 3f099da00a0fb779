use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct BoardMemberFilter {
    pub id: Option<u32>,
    pub name: Option<String>,
}

/// A board member shown on the about page.
#[derive(Debug, Default, Clone, FromRow, Serialize, Deserialize)]
pub struct BoardMember {
    pub id: u32,
    pub first_name: String,
    pub last_name: String,
    pub first_name_am: String,
    pub last_name_am: String,
    pub role_title: String,
    pub image_url: Option<String>,
    pub created_at: NaiveDateTime,
}

impl BoardMember {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
