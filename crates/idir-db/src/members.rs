use anyhow::Result;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};

use idir_data::{Delete, Insert, Member, MemberFilter, Query, Retrieve, Update};

use crate::{
    results::{Id, QueryError},
    Connection,
};

#[async_trait]
impl Query<Member> for Connection {
    type Filter = MemberFilter;

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Member>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                id,
                first_name,
                last_name,
                first_name_am,
                last_name_am,
                date_of_birth,
                email,
                phone,
                city,
                street,
                photo_url,
                status,
                registered_at
            FROM members
            WHERE 1
            "#,
        );

        if let Some(id) = filter.id.clone() {
            qry.push(" AND id = ").push_bind(id);
        }
        if let Some(name) = filter.name.clone() {
            let pattern = format!("%{}%", name);
            qry.push(" AND (first_name || ' ' || last_name LIKE ")
                .push_bind(pattern.clone())
                .push(" OR first_name_am || ' ' || last_name_am LIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(email) = filter.email.clone() {
            qry.push(" AND email LIKE ").push_bind(email);
        }
        if let Some(phone) = filter.phone.clone() {
            qry.push(" AND phone LIKE ")
                .push_bind(format!("%{}%", phone));
        }
        if let Some(status) = filter.status {
            qry.push(" AND status = ").push_bind(status);
        }
        qry.push(" ORDER BY registered_at, id");

        let members: Vec<Member> = qry.build_query_as().fetch_all(&mut *conn).await?;
        Ok(members)
    }
}

#[async_trait]
impl Retrieve<Member> for Connection {
    type Key = String;

    async fn retrieve(&self, member_id: Self::Key) -> Result<Member> {
        let filter = MemberFilter {
            id: Some(member_id),
            ..Default::default()
        };
        let member = self
            .query(&filter)
            .await?
            .pop()
            .ok_or(QueryError::NotFound)?;
        Ok(member)
    }
}

#[async_trait]
impl Insert<Member> for Connection {
    /// Insert a member. Fails if the member number is taken.
    async fn insert(&self, member: Member) -> Result<Member> {
        {
            let mut conn = self.lock().await;
            let existing: Option<Id<String>> =
                sqlx::query_as("SELECT id FROM members WHERE id = ?")
                    .bind(&member.id)
                    .fetch_optional(&mut *conn)
                    .await?;
            if existing.is_some() {
                return Err(QueryError::Duplicate(member.id).into());
            }

            let mut qry = QueryBuilder::<Sqlite>::new(
                r#"INSERT INTO members (
                    id,
                    first_name,
                    last_name,
                    first_name_am,
                    last_name_am,
                    date_of_birth,
                    email,
                    phone,
                    city,
                    street,
                    photo_url,
                    status,
                    registered_at
                ) VALUES (
                "#,
            );
            qry.separated(", ")
                .push_bind(&member.id)
                .push_bind(&member.first_name)
                .push_bind(&member.last_name)
                .push_bind(&member.first_name_am)
                .push_bind(&member.last_name_am)
                .push_bind(member.date_of_birth)
                .push_bind(&member.email)
                .push_bind(&member.phone)
                .push_bind(&member.city)
                .push_bind(&member.street)
                .push_bind(&member.photo_url)
                .push_bind(member.status)
                .push_bind(member.registered_at);
            qry.push(")").build().execute(&mut *conn).await?;
        }
        self.retrieve(member.id).await
    }
}

#[async_trait]
impl Update<Member> for Connection {
    /// Update member
    async fn update(&self, member: Member) -> Result<Member> {
        {
            let mut conn = self.lock().await;
            QueryBuilder::<Sqlite>::new("UPDATE members SET")
                .push(" first_name = ")
                .push_bind(&member.first_name)
                .push(", last_name = ")
                .push_bind(&member.last_name)
                .push(", first_name_am = ")
                .push_bind(&member.first_name_am)
                .push(", last_name_am = ")
                .push_bind(&member.last_name_am)
                .push(", date_of_birth = ")
                .push_bind(member.date_of_birth)
                .push(", email = ")
                .push_bind(&member.email)
                .push(", phone = ")
                .push_bind(&member.phone)
                .push(", city = ")
                .push_bind(&member.city)
                .push(", street = ")
                .push_bind(&member.street)
                .push(", photo_url = ")
                .push_bind(&member.photo_url)
                .push(", status = ")
                .push_bind(member.status)
                .push(" WHERE id = ")
                .push_bind(&member.id)
                .build()
                .execute(&mut *conn)
                .await?;
        }
        self.retrieve(member.id).await
    }
}

#[async_trait]
impl Delete<Member> for Connection {
    /// Delete member. Ledger entries cascade.
    async fn delete(&self, member: Member) -> Result<()> {
        let mut conn = self.lock().await;
        QueryBuilder::<Sqlite>::new("DELETE FROM members WHERE id = ")
            .push_bind(member.id)
            .build()
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

impl Connection {
    /// Fetch the entire roster in pages ordered by registration
    /// time. Terminates when a page comes back shorter than
    /// `page_size`. A failure mid-pagination discards everything
    /// accumulated so far.
    pub async fn fetch_all_members(&self, page_size: u32) -> Result<Vec<Member>> {
        let mut members = Vec::new();
        let mut offset: u32 = 0;
        loop {
            let page: Vec<Member> = {
                let mut conn = self.lock().await;
                sqlx::query_as(
                    r#"
                    SELECT * FROM members
                    ORDER BY registered_at, id
                    LIMIT ? OFFSET ?
                    "#,
                )
                .bind(page_size)
                .bind(offset)
                .fetch_all(&mut *conn)
                .await?
            };
            let count = page.len() as u32;
            members.extend(page);
            if count < page_size {
                break;
            }
            offset += page_size;
        }
        Ok(members)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    use idir_data::MemberStatus;

    #[tokio::test]
    async fn test_member_insert() {
        let db = Connection::open_test().await;
        let member = Member {
            id: "ED-0001".to_string(),
            first_name: "Abebe".to_string(),
            last_name: "Kebede".to_string(),
            email: "abebe@example.org".to_string(),
            phone: "+1 555 0101".to_string(),
            city: "Denver".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1961, 9, 2),
            status: MemberStatus::Active,
            ..Member::default()
        };
        let member = db.insert(member).await.unwrap();

        assert_eq!(member.id, "ED-0001");
        assert_eq!(member.first_name, "Abebe");
        assert_eq!(member.email, "abebe@example.org");
        assert_eq!(member.date_of_birth, NaiveDate::from_ymd_opt(1961, 9, 2));
        assert_eq!(member.status, MemberStatus::Active);
    }

    #[tokio::test]
    async fn test_member_insert_duplicate_id() {
        let db = Connection::open_test().await;
        let member = Member {
            id: "ED-0001".to_string(),
            first_name: "Abebe".to_string(),
            ..Member::default()
        };
        db.insert(member).await.unwrap();

        let duplicate = Member {
            id: "ED-0001".to_string(),
            first_name: "Almaz".to_string(),
            ..Member::default()
        };
        let err = db.insert(duplicate).await.unwrap_err();
        assert!(err.to_string().contains("already exists"));

        // The original record is untouched
        let member: Member = db.retrieve("ED-0001".to_string()).await.unwrap();
        assert_eq!(member.first_name, "Abebe");
    }

    #[tokio::test]
    async fn test_member_update() {
        let db = Connection::open_test().await;
        let member = Member {
            id: "ED-0002".to_string(),
            first_name: "Almaz".to_string(),
            status: MemberStatus::New,
            ..Member::default()
        };
        let mut member = db.insert(member).await.unwrap();
        member.first_name = "Almaz Updated".to_string();
        member.phone = "+1 555 0102".to_string();
        member.status = MemberStatus::Active;

        let member = db.update(member).await.unwrap();
        assert_eq!(member.first_name, "Almaz Updated");
        assert_eq!(member.phone, "+1 555 0102");
        assert_eq!(member.status, MemberStatus::Active);
    }

    #[tokio::test]
    async fn test_member_filter() {
        let db = Connection::open_test().await;
        db.insert(Member {
            id: "ED-0001".to_string(),
            first_name: "Abebe".to_string(),
            last_name: "Kebede".to_string(),
            email: "abebe@example.org".to_string(),
            status: MemberStatus::Active,
            ..Member::default()
        })
        .await
        .unwrap();
        db.insert(Member {
            id: "ED-0002".to_string(),
            first_name: "Almaz".to_string(),
            last_name: "Tadesse".to_string(),
            email: "almaz@example.org".to_string(),
            ..Member::default()
        })
        .await
        .unwrap();

        let members: Vec<Member> = db
            .query(&MemberFilter {
                name: Some("tadesse".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].id, "ED-0002");

        let members: Vec<Member> = db
            .query(&MemberFilter {
                status: Some(MemberStatus::Active),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].id, "ED-0001");
    }

    #[tokio::test]
    async fn test_member_delete() {
        let db = Connection::open_test().await;
        let member = db
            .insert(Member {
                id: "ED-0003".to_string(),
                ..Member::default()
            })
            .await
            .unwrap();

        db.delete(member).await.unwrap();
        let result: Result<Member> = db.retrieve("ED-0003".to_string()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_fetch_all_members_pagination() {
        let db = Connection::open_test().await;
        for i in 1..=5 {
            db.insert(Member {
                id: format!("ED-{:04}", i),
                ..Member::default()
            })
            .await
            .unwrap();
        }

        let members = db.fetch_all_members(2).await.unwrap();
        assert_eq!(members.len(), 5);

        // No duplicates
        let mut ids: Vec<String> =
            members.iter().map(|m| m.id.clone()).collect();
        ids.dedup();
        assert_eq!(ids.len(), 5);

        // Page size aligned with the total row count also terminates
        let members = db.fetch_all_members(5).await.unwrap();
        assert_eq!(members.len(), 5);
    }
}
