use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Connection as SqlConnection, QueryBuilder, Sqlite};
use tracing::debug;

use idir_data::{
    Delete, Insert, Member, Payment, PaymentEntry, PaymentEntryFilter,
    PaymentFilter, Query, Retrieve,
};

use crate::{
    results::{Id, QueryError},
    Connection,
};

#[async_trait]
impl Query<Payment> for Connection {
    type Filter = PaymentFilter;

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Payment>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            "SELECT number, created_at FROM payments WHERE 1",
        );
        if let Some(number) = filter.number {
            qry.push(" AND number = ").push_bind(number);
        }
        qry.push(" ORDER BY number");

        let payments: Vec<Payment> = qry.build_query_as().fetch_all(&mut *conn).await?;
        Ok(payments)
    }
}

#[async_trait]
impl Retrieve<Payment> for Connection {
    type Key = u32;

    /// Direct keyed lookup of a payment round.
    async fn retrieve(&self, number: Self::Key) -> Result<Payment> {
        let filter = PaymentFilter {
            number: Some(number),
        };
        let payment = self
            .query(&filter)
            .await?
            .pop()
            .ok_or(QueryError::NotFound)?;
        Ok(payment)
    }
}

#[async_trait]
impl Insert<Payment> for Connection {
    /// Open a new payment round. Fails if the number is taken.
    async fn insert(&self, payment: Payment) -> Result<Payment> {
        {
            let mut conn = self.lock().await;
            let existing: Option<Id<u32>> =
                sqlx::query_as("SELECT number AS id FROM payments WHERE number = ?")
                    .bind(payment.number)
                    .fetch_optional(&mut *conn)
                    .await?;
            if existing.is_some() {
                return Err(QueryError::Duplicate(payment.number.to_string()).into());
            }
            sqlx::query("INSERT INTO payments (number, created_at) VALUES (?, ?)")
                .bind(payment.number)
                .bind(payment.created_at)
                .execute(&mut *conn)
                .await?;
        }
        self.retrieve(payment.number).await
    }
}

#[async_trait]
impl Delete<Payment> for Connection {
    /// Delete a payment round. Entries cascade.
    async fn delete(&self, payment: Payment) -> Result<()> {
        let mut conn = self.lock().await;
        QueryBuilder::<Sqlite>::new("DELETE FROM payments WHERE number = ")
            .push_bind(payment.number)
            .build()
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Query<PaymentEntry> for Connection {
    type Filter = PaymentEntryFilter;

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<PaymentEntry>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                payment_number,
                member_id,
                paid_on,
                place,
                method,
                receipt_no,
                remark
            FROM payment_entries
            WHERE 1
            "#,
        );
        if let Some(number) = filter.payment_number {
            qry.push(" AND payment_number = ").push_bind(number);
        }
        if let Some(member_id) = filter.member_id.clone() {
            qry.push(" AND member_id = ").push_bind(member_id);
        }
        qry.push(" ORDER BY payment_number, member_id");

        let entries: Vec<PaymentEntry> =
            qry.build_query_as().fetch_all(&mut *conn).await?;
        Ok(entries)
    }
}

impl Connection {
    /// Record a member's contribution to a round. The member must
    /// exist and be active; both checks run in the same transaction
    /// as the write, so a status change cannot slip in between.
    /// Re-recording a contribution replaces the member's own entry
    /// and leaves every other entry of the round untouched.
    pub async fn add_payment_entry(&self, entry: PaymentEntry) -> Result<PaymentEntry> {
        {
            let mut conn = self.lock().await;
            let mut tx = conn.begin().await?;

            let member: Option<Member> =
                sqlx::query_as("SELECT * FROM members WHERE id = ?")
                    .bind(&entry.member_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            let member = member.ok_or(QueryError::NotFound)?;
            if !member.is_active() {
                return Err(QueryError::MemberNotActive(member.id).into());
            }

            let round: Option<Id<u32>> =
                sqlx::query_as("SELECT number AS id FROM payments WHERE number = ?")
                    .bind(entry.payment_number)
                    .fetch_optional(&mut *tx)
                    .await?;
            if round.is_none() {
                return Err(QueryError::NotFound.into());
            }

            sqlx::query(
                r#"
                INSERT INTO payment_entries (
                    payment_number, member_id, paid_on,
                    place, method, receipt_no, remark
                ) VALUES (?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT (payment_number, member_id) DO UPDATE SET
                    paid_on = excluded.paid_on,
                    place = excluded.place,
                    method = excluded.method,
                    receipt_no = excluded.receipt_no,
                    remark = excluded.remark
                "#,
            )
            .bind(entry.payment_number)
            .bind(&entry.member_id)
            .bind(entry.paid_on)
            .bind(&entry.place)
            .bind(&entry.method)
            .bind(&entry.receipt_no)
            .bind(&entry.remark)
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;
        }
        debug!(
            payment = entry.payment_number,
            member = %entry.member_id,
            "recorded payment entry"
        );
        Ok(entry)
    }

    /// Remove a member's entry from a round.
    pub async fn remove_payment_entry(&self, member_id: &str, number: u32) -> Result<()> {
        let mut conn = self.lock().await;
        let result = sqlx::query(
            "DELETE FROM payment_entries WHERE member_id = ? AND payment_number = ?",
        )
        .bind(member_id)
        .bind(number)
        .execute(&mut *conn)
        .await?;
        if result.rows_affected() == 0 {
            return Err(QueryError::NotFound.into());
        }
        Ok(())
    }

    /// Members that have paid into a round, with their entries.
    pub async fn paid_members(&self, number: u32) -> Result<Vec<(Member, PaymentEntry)>> {
        let entries: Vec<PaymentEntry> = self
            .query(&PaymentEntryFilter {
                payment_number: Some(number),
                ..Default::default()
            })
            .await?;

        let members: Vec<Member> = {
            let mut conn = self.lock().await;
            sqlx::query_as(
                r#"
                SELECT m.* FROM members m
                JOIN payment_entries e ON e.member_id = m.id
                WHERE e.payment_number = ?
                ORDER BY m.id
                "#,
            )
            .bind(number)
            .fetch_all(&mut *conn)
            .await?
        };

        let mut by_member: HashMap<String, PaymentEntry> = entries
            .into_iter()
            .map(|e| (e.member_id.clone(), e))
            .collect();
        let paid = members
            .into_iter()
            .filter_map(|m| by_member.remove(&m.id).map(|e| (m, e)))
            .collect();
        Ok(paid)
    }

    /// Active members with no entry in the round.
    pub async fn unpaid_members(&self, number: u32) -> Result<Vec<Member>> {
        let mut conn = self.lock().await;
        let members: Vec<Member> = sqlx::query_as(
            r#"
            SELECT * FROM members
            WHERE status = 'active'
              AND id NOT IN (
                SELECT member_id FROM payment_entries
                WHERE payment_number = ?
              )
            ORDER BY id
            "#,
        )
        .bind(number)
        .fetch_all(&mut *conn)
        .await?;
        Ok(members)
    }

    /// Number of members that have paid into a round.
    pub async fn count_paid(&self, number: u32) -> Result<u32> {
        let mut conn = self.lock().await;
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM payment_entries WHERE payment_number = ?",
        )
        .bind(number)
        .fetch_one(&mut *conn)
        .await?;
        Ok(count as u32)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    use idir_data::MemberStatus;

    async fn setup_round(db: &Connection, number: u32, member_ids: &[&str]) {
        db.insert(Payment {
            number,
            ..Payment::default()
        })
        .await
        .unwrap();
        for id in member_ids {
            db.insert(Member {
                id: id.to_string(),
                status: MemberStatus::Active,
                ..Member::default()
            })
            .await
            .unwrap();
        }
    }

    fn entry(number: u32, member_id: &str) -> PaymentEntry {
        PaymentEntry {
            payment_number: number,
            member_id: member_id.to_string(),
            paid_on: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            place: "Community hall".to_string(),
            method: "cash".to_string(),
            receipt_no: "R-100".to_string(),
            remark: "".to_string(),
        }
    }

    #[tokio::test]
    async fn test_payment_round_insert_and_retrieve() {
        let db = Connection::open_test().await;
        db.insert(Payment {
            number: 7,
            ..Payment::default()
        })
        .await
        .unwrap();

        let round: Payment = db.retrieve(7u32).await.unwrap();
        assert_eq!(round.number, 7);

        let err = db
            .insert(Payment {
                number: 7,
                ..Payment::default()
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_add_entry_requires_active_member() {
        let db = Connection::open_test().await;
        db.insert(Payment {
            number: 1,
            ..Payment::default()
        })
        .await
        .unwrap();
        db.insert(Member {
            id: "ED-0001".to_string(),
            status: MemberStatus::Stopped,
            ..Member::default()
        })
        .await
        .unwrap();

        let err = db.add_payment_entry(entry(1, "ED-0001")).await.unwrap_err();
        assert!(err.to_string().contains("not active"));

        // Unknown member
        let err = db.add_payment_entry(entry(1, "ED-9999")).await.unwrap_err();
        assert!(err.to_string().contains("Not found"));
    }

    #[tokio::test]
    async fn test_add_entry_requires_round() {
        let db = Connection::open_test().await;
        db.insert(Member {
            id: "ED-0001".to_string(),
            status: MemberStatus::Active,
            ..Member::default()
        })
        .await
        .unwrap();

        let err = db.add_payment_entry(entry(9, "ED-0001")).await.unwrap_err();
        assert!(err.to_string().contains("Not found"));
    }

    #[tokio::test]
    async fn test_entry_upsert_preserves_other_entries() {
        let db = Connection::open_test().await;
        setup_round(&db, 1, &["ED-0001", "ED-0002"]).await;

        db.add_payment_entry(entry(1, "ED-0001")).await.unwrap();
        db.add_payment_entry(entry(1, "ED-0002")).await.unwrap();

        // Re-record the first member's contribution
        let mut updated = entry(1, "ED-0001");
        updated.receipt_no = "R-200".to_string();
        updated.method = "transfer".to_string();
        db.add_payment_entry(updated).await.unwrap();

        let entries: Vec<PaymentEntry> = db
            .query(&PaymentEntryFilter {
                payment_number: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].member_id, "ED-0001");
        assert_eq!(entries[0].receipt_no, "R-200");
        assert_eq!(entries[0].method, "transfer");
        // The second member's entry is unchanged
        assert_eq!(entries[1].member_id, "ED-0002");
        assert_eq!(entries[1].receipt_no, "R-100");
    }

    #[tokio::test]
    async fn test_concurrent_entries_both_land() {
        let db = Connection::open_test().await;
        setup_round(&db, 1, &["ED-0001", "ED-0002"]).await;

        let (a, b) = tokio::join!(
            db.add_payment_entry(entry(1, "ED-0001")),
            db.add_payment_entry(entry(1, "ED-0002")),
        );
        a.unwrap();
        b.unwrap();

        assert_eq!(db.count_paid(1).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_paid_and_unpaid_views() {
        let db = Connection::open_test().await;
        setup_round(&db, 1, &["ED-0001", "ED-0002", "ED-0003"]).await;
        // A stopped member never shows up as unpaid
        db.insert(Member {
            id: "ED-0004".to_string(),
            status: MemberStatus::Stopped,
            ..Member::default()
        })
        .await
        .unwrap();

        db.add_payment_entry(entry(1, "ED-0002")).await.unwrap();

        let paid = db.paid_members(1).await.unwrap();
        assert_eq!(paid.len(), 1);
        assert_eq!(paid[0].0.id, "ED-0002");
        assert_eq!(paid[0].1.receipt_no, "R-100");

        let unpaid = db.unpaid_members(1).await.unwrap();
        let ids: Vec<&str> = unpaid.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["ED-0001", "ED-0003"]);
    }

    #[tokio::test]
    async fn test_remove_entry() {
        let db = Connection::open_test().await;
        setup_round(&db, 1, &["ED-0001"]).await;
        db.add_payment_entry(entry(1, "ED-0001")).await.unwrap();

        db.remove_payment_entry("ED-0001", 1).await.unwrap();
        assert_eq!(db.count_paid(1).await.unwrap(), 0);

        let err = db.remove_payment_entry("ED-0001", 1).await.unwrap_err();
        assert!(err.to_string().contains("Not found"));
    }

    #[tokio::test]
    async fn test_member_delete_cascades_entries() {
        let db = Connection::open_test().await;
        setup_round(&db, 1, &["ED-0001"]).await;
        db.add_payment_entry(entry(1, "ED-0001")).await.unwrap();

        let member: Member = db.retrieve("ED-0001".to_string()).await.unwrap();
        db.delete(member).await.unwrap();

        assert_eq!(db.count_paid(1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_member_side_view() {
        let db = Connection::open_test().await;
        setup_round(&db, 1, &["ED-0001"]).await;
        db.insert(Payment {
            number: 2,
            ..Payment::default()
        })
        .await
        .unwrap();

        db.add_payment_entry(entry(1, "ED-0001")).await.unwrap();
        db.add_payment_entry(entry(2, "ED-0001")).await.unwrap();

        let member: Member = db.retrieve("ED-0001".to_string()).await.unwrap();
        let entries = member.get_payments(&db).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].payment_number, 1);
        assert_eq!(entries[1].payment_number, 2);
    }
}
