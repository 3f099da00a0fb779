use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct FormFilter {
    pub id: Option<u32>,
    pub name: Option<String>,
}

/// A downloadable form document offered on the public site.
#[derive(Debug, Default, Clone, FromRow, Serialize, Deserialize)]
pub struct FormDoc {
    pub id: u32,
    pub name: String,
    pub name_am: String,
    pub description: String,
    pub file_url: String,
    pub created_at: NaiveDateTime,
}
