use anyhow::Result;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};

use idir_data::{Delete, FormDoc, FormFilter, Insert, Query, Retrieve};

use crate::{
    results::{Id, QueryError},
    Connection,
};

#[async_trait]
impl Query<FormDoc> for Connection {
    type Filter = FormFilter;

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<FormDoc>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT id, name, name_am, description, file_url, created_at
            FROM forms
            WHERE 1
            "#,
        );
        if let Some(id) = filter.id {
            qry.push(" AND id = ").push_bind(id);
        }
        if let Some(name) = filter.name.clone() {
            qry.push(" AND name LIKE ").push_bind(format!("%{}%", name));
        }
        qry.push(" ORDER BY created_at, id");

        let forms: Vec<FormDoc> = qry.build_query_as().fetch_all(&mut *conn).await?;
        Ok(forms)
    }
}

#[async_trait]
impl Retrieve<FormDoc> for Connection {
    type Key = u32;

    async fn retrieve(&self, id: Self::Key) -> Result<FormDoc> {
        let filter = FormFilter {
            id: Some(id),
            ..Default::default()
        };
        let form = self
            .query(&filter)
            .await?
            .pop()
            .ok_or(QueryError::NotFound)?;
        Ok(form)
    }
}

#[async_trait]
impl Insert<FormDoc> for Connection {
    async fn insert(&self, form: FormDoc) -> Result<FormDoc> {
        let insert: Id<u32> = {
            let mut conn = self.lock().await;
            let mut qry = QueryBuilder::<Sqlite>::new(
                r#"INSERT INTO forms (
                    name,
                    name_am,
                    description,
                    file_url,
                    created_at
                ) VALUES (
                "#,
            );
            qry.separated(", ")
                .push_bind(&form.name)
                .push_bind(&form.name_am)
                .push_bind(&form.description)
                .push_bind(&form.file_url)
                .push_bind(form.created_at);
            qry.push(") RETURNING id")
                .build_query_as()
                .fetch_one(&mut *conn)
                .await?
        };
        self.retrieve(insert.id).await
    }
}

#[async_trait]
impl Delete<FormDoc> for Connection {
    async fn delete(&self, form: FormDoc) -> Result<()> {
        let mut conn = self.lock().await;
        QueryBuilder::<Sqlite>::new("DELETE FROM forms WHERE id = ")
            .push_bind(form.id)
            .build()
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_form_insert_and_query() {
        let db = Connection::open_test().await;
        let form = db
            .insert(FormDoc {
                name: "Membership application".to_string(),
                description: "Fill in and hand to the board".to_string(),
                file_url: "forms/171_application.pdf".to_string(),
                ..FormDoc::default()
            })
            .await
            .unwrap();
        assert!(form.id > 0);

        let forms: Vec<FormDoc> = db
            .query(&FormFilter {
                name: Some("application".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(forms.len(), 1);
        assert_eq!(forms[0].file_url, "forms/171_application.pdf");
    }

    #[tokio::test]
    async fn test_form_delete() {
        let db = Connection::open_test().await;
        let form = db.insert(FormDoc::default()).await.unwrap();
        let id = form.id;
        db.delete(form).await.unwrap();

        let result: Result<FormDoc> = db.retrieve(id).await;
        assert!(result.is_err());
    }
}
