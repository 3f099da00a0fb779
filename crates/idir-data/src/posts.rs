use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Which page section a post is shown in.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PostSection {
    #[default]
    Blog,
    Home,
    About,
    Announcement,
}

impl fmt::Display for PostSection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            PostSection::Blog => "blog",
            PostSection::Home => "home",
            PostSection::About => "about",
            PostSection::Announcement => "announcement",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for PostSection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "blog" => Ok(PostSection::Blog),
            "home" => Ok(PostSection::Home),
            "about" => Ok(PostSection::About),
            "announcement" => Ok(PostSection::Announcement),
            other => Err(anyhow::anyhow!("unknown post section: {}", other)),
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PostFilter {
    pub id: Option<u32>,
    pub section: Option<PostSection>,
}

/// A post or announcement. Position determines display order
/// within its section.
#[derive(Debug, Default, Clone, FromRow, Serialize, Deserialize)]
pub struct Post {
    pub id: u32,
    pub header: String,
    pub header_am: String,
    pub body: String,
    pub body_am: String,
    pub image_url: Option<String>,
    pub section: PostSection,
    pub position: u32,
    pub created_at: NaiveDateTime,
}
