use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{PaymentEntry, PaymentEntryFilter, Query};

/// Membership lifecycle status. New registrations start as `New`
/// and are moved along by the board.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    #[default]
    New,
    Active,
    Warning,
    Stopped,
    Deceased,
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            MemberStatus::New => "new",
            MemberStatus::Active => "active",
            MemberStatus::Warning => "warning",
            MemberStatus::Stopped => "stopped",
            MemberStatus::Deceased => "deceased",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for MemberStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "new" => Ok(MemberStatus::New),
            "active" => Ok(MemberStatus::Active),
            "warning" => Ok(MemberStatus::Warning),
            "stopped" => Ok(MemberStatus::Stopped),
            "deceased" => Ok(MemberStatus::Deceased),
            other => Err(anyhow::anyhow!("unknown member status: {}", other)),
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MemberFilter {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: Option<MemberStatus>,
}

/// An association member. The id is the member number assigned on
/// registration and is the join key into the payment ledger.
#[derive(Debug, Default, Clone, FromRow, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub first_name_am: String,
    pub last_name_am: String,
    pub date_of_birth: Option<NaiveDate>,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub street: String,
    pub photo_url: Option<String>,
    pub status: MemberStatus,
    pub registered_at: NaiveDateTime,
}

impl Member {
    /// Get the ledger entries recorded for this member.
    pub async fn get_payments<DB>(&self, db: &DB) -> Result<Vec<PaymentEntry>>
    where
        DB: Query<PaymentEntry, Filter = PaymentEntryFilter>,
    {
        let entries = db
            .query(&PaymentEntryFilter {
                member_id: Some(self.id.clone()),
                ..Default::default()
            })
            .await?;
        Ok(entries)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn full_name_am(&self) -> String {
        format!("{} {}", self.first_name_am, self.last_name_am)
    }

    // Only active members may be entered into a payment round.
    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }

    /// Case-insensitive substring match over id, names, email,
    /// phone and address. Used by the roster search.
    pub fn matches(&self, query: &str) -> bool {
        let q = query.to_lowercase();
        self.id.to_lowercase().contains(&q)
            || self.full_name().to_lowercase().contains(&q)
            || self.full_name_am().contains(query)
            || self.email.to_lowercase().contains(&q)
            || self.phone.contains(query)
            || self.city.to_lowercase().contains(&q)
            || self.street.to_lowercase().contains(&q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for s in ["new", "active", "warning", "stopped", "deceased"] {
            let status: MemberStatus = s.parse().unwrap();
            assert_eq!(status.to_string(), s);
        }
        assert!("retired".parse::<MemberStatus>().is_err());
    }

    #[test]
    fn test_member_matches() {
        let member = Member {
            id: "ED-0042".to_string(),
            first_name: "Abebe".to_string(),
            last_name: "Kebede".to_string(),
            email: "abebe@example.org".to_string(),
            phone: "+1 555 0142".to_string(),
            city: "Denver".to_string(),
            ..Default::default()
        };
        assert!(member.matches("ed-0042"));
        assert!(member.matches("abebe keb"));
        assert!(member.matches("EXAMPLE.ORG"));
        assert!(member.matches("555 0142"));
        assert!(member.matches("denver"));
        assert!(!member.matches("tadesse"));
    }
}
