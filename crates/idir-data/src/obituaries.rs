use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ObituaryFilter {
    pub id: Option<u32>,
    pub name: Option<String>,
}

#[derive(Debug, Default, Clone, FromRow, Serialize, Deserialize)]
pub struct Obituary {
    pub id: u32,
    pub first_name: String,
    pub last_name: String,
    pub first_name_am: String,
    pub last_name_am: String,
    pub died_on: Option<NaiveDate>,
    pub image_url: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Obituary {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
