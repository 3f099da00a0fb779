use anyhow::Result;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};

use idir_data::{Delete, Insert, Obituary, ObituaryFilter, Query, Retrieve};

use crate::{
    results::{Id, QueryError},
    Connection,
};

#[async_trait]
impl Query<Obituary> for Connection {
    type Filter = ObituaryFilter;

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Obituary>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                id,
                first_name,
                last_name,
                first_name_am,
                last_name_am,
                died_on,
                image_url,
                created_at
            FROM obituaries
            WHERE 1
            "#,
        );
        if let Some(id) = filter.id {
            qry.push(" AND id = ").push_bind(id);
        }
        if let Some(name) = filter.name.clone() {
            qry.push(" AND first_name || ' ' || last_name LIKE ")
                .push_bind(format!("%{}%", name));
        }
        qry.push(" ORDER BY created_at DESC, id DESC");

        let obituaries: Vec<Obituary> =
            qry.build_query_as().fetch_all(&mut *conn).await?;
        Ok(obituaries)
    }
}

#[async_trait]
impl Retrieve<Obituary> for Connection {
    type Key = u32;

    async fn retrieve(&self, id: Self::Key) -> Result<Obituary> {
        let filter = ObituaryFilter {
            id: Some(id),
            ..Default::default()
        };
        let obituary = self
            .query(&filter)
            .await?
            .pop()
            .ok_or(QueryError::NotFound)?;
        Ok(obituary)
    }
}

#[async_trait]
impl Insert<Obituary> for Connection {
    async fn insert(&self, obituary: Obituary) -> Result<Obituary> {
        let insert: Id<u32> = {
            let mut conn = self.lock().await;
            let mut qry = QueryBuilder::<Sqlite>::new(
                r#"INSERT INTO obituaries (
                    first_name,
                    last_name,
                    first_name_am,
                    last_name_am,
                    died_on,
                    image_url,
                    created_at
                ) VALUES (
                "#,
            );
            qry.separated(", ")
                .push_bind(&obituary.first_name)
                .push_bind(&obituary.last_name)
                .push_bind(&obituary.first_name_am)
                .push_bind(&obituary.last_name_am)
                .push_bind(obituary.died_on)
                .push_bind(&obituary.image_url)
                .push_bind(obituary.created_at);
            qry.push(") RETURNING id")
                .build_query_as()
                .fetch_one(&mut *conn)
                .await?
        };
        self.retrieve(insert.id).await
    }
}

#[async_trait]
impl Delete<Obituary> for Connection {
    async fn delete(&self, obituary: Obituary) -> Result<()> {
        let mut conn = self.lock().await;
        QueryBuilder::<Sqlite>::new("DELETE FROM obituaries WHERE id = ")
            .push_bind(obituary.id)
            .build()
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[tokio::test]
    async fn test_obituary_insert_and_filter() {
        let db = Connection::open_test().await;
        db.insert(Obituary {
            first_name: "Worku".to_string(),
            last_name: "Alemu".to_string(),
            died_on: NaiveDate::from_ymd_opt(2024, 1, 15),
            image_url: Some("obituaries/170_worku.jpg".to_string()),
            ..Obituary::default()
        })
        .await
        .unwrap();

        let found: Vec<Obituary> = db
            .query(&ObituaryFilter {
                name: Some("Alemu".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].full_name(), "Worku Alemu");
        assert_eq!(
            found[0].died_on,
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
    }

    #[tokio::test]
    async fn test_obituary_delete() {
        let db = Connection::open_test().await;
        let obituary = db.insert(Obituary::default()).await.unwrap();
        let id = obituary.id;
        db.delete(obituary).await.unwrap();

        let result: Result<Obituary> = db.retrieve(id).await;
        assert!(result.is_err());
    }
}
