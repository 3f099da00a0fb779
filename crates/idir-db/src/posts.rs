use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Connection as SqlConnection, QueryBuilder, Sqlite};

use idir_data::{Delete, Insert, Post, PostFilter, Query, Retrieve, Update};

use crate::{
    results::{Id, QueryError},
    Connection,
};

#[async_trait]
impl Query<Post> for Connection {
    type Filter = PostFilter;

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<Post>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                id,
                header,
                header_am,
                body,
                body_am,
                image_url,
                section,
                position,
                created_at
            FROM posts
            WHERE 1
            "#,
        );
        if let Some(id) = filter.id {
            qry.push(" AND id = ").push_bind(id);
        }
        if let Some(section) = filter.section {
            qry.push(" AND section = ").push_bind(section);
        }
        qry.push(" ORDER BY section, position, id");

        let posts: Vec<Post> = qry.build_query_as().fetch_all(&mut *conn).await?;
        Ok(posts)
    }
}

#[async_trait]
impl Retrieve<Post> for Connection {
    type Key = u32;

    async fn retrieve(&self, id: Self::Key) -> Result<Post> {
        let filter = PostFilter {
            id: Some(id),
            ..Default::default()
        };
        let post = self
            .query(&filter)
            .await?
            .pop()
            .ok_or(QueryError::NotFound)?;
        Ok(post)
    }
}

#[async_trait]
impl Insert<Post> for Connection {
    /// Insert a post at the end of its section.
    async fn insert(&self, post: Post) -> Result<Post> {
        let insert: Id<u32> = {
            let mut conn = self.lock().await;
            let position: i64 = sqlx::query_scalar(
                "SELECT COALESCE(MAX(position) + 1, 0) FROM posts WHERE section = ?",
            )
            .bind(post.section)
            .fetch_one(&mut *conn)
            .await?;

            let mut qry = QueryBuilder::<Sqlite>::new(
                r#"INSERT INTO posts (
                    header,
                    header_am,
                    body,
                    body_am,
                    image_url,
                    section,
                    position,
                    created_at
                ) VALUES (
                "#,
            );
            qry.separated(", ")
                .push_bind(&post.header)
                .push_bind(&post.header_am)
                .push_bind(&post.body)
                .push_bind(&post.body_am)
                .push_bind(&post.image_url)
                .push_bind(post.section)
                .push_bind(position)
                .push_bind(post.created_at);
            qry.push(") RETURNING id")
                .build_query_as()
                .fetch_one(&mut *conn)
                .await?
        };
        self.retrieve(insert.id).await
    }
}

#[async_trait]
impl Update<Post> for Connection {
    /// Update a post's content. Position is managed by `move_post`.
    async fn update(&self, post: Post) -> Result<Post> {
        {
            let mut conn = self.lock().await;
            QueryBuilder::<Sqlite>::new("UPDATE posts SET")
                .push(" header = ")
                .push_bind(&post.header)
                .push(", header_am = ")
                .push_bind(&post.header_am)
                .push(", body = ")
                .push_bind(&post.body)
                .push(", body_am = ")
                .push_bind(&post.body_am)
                .push(", image_url = ")
                .push_bind(&post.image_url)
                .push(" WHERE id = ")
                .push_bind(post.id)
                .build()
                .execute(&mut *conn)
                .await?;
        }
        self.retrieve(post.id).await
    }
}

#[async_trait]
impl Delete<Post> for Connection {
    async fn delete(&self, post: Post) -> Result<()> {
        let mut conn = self.lock().await;
        QueryBuilder::<Sqlite>::new("DELETE FROM posts WHERE id = ")
            .push_bind(post.id)
            .build()
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

impl Connection {
    /// Move a post to a new position within its section. The whole
    /// section is renumbered in one transaction.
    pub async fn move_post(&self, id: u32, new_position: u32) -> Result<Post> {
        {
            let mut conn = self.lock().await;
            let mut tx = conn.begin().await?;

            let post: Option<Post> =
                sqlx::query_as("SELECT * FROM posts WHERE id = ?")
                    .bind(id)
                    .fetch_optional(&mut *tx)
                    .await?;
            let post = post.ok_or(QueryError::NotFound)?;

            let mut section: Vec<Id<u32>> = sqlx::query_as(
                "SELECT id FROM posts WHERE section = ? ORDER BY position, id",
            )
            .bind(post.section)
            .fetch_all(&mut *tx)
            .await?;

            section.retain(|p| p.id != id);
            let target = (new_position as usize).min(section.len());
            section.insert(target, Id { id });

            for (position, item) in section.iter().enumerate() {
                sqlx::query("UPDATE posts SET position = ? WHERE id = ?")
                    .bind(position as i64)
                    .bind(item.id)
                    .execute(&mut *tx)
                    .await?;
            }

            tx.commit().await?;
        }
        self.retrieve(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use idir_data::PostSection;

    fn post(header: &str, section: PostSection) -> Post {
        Post {
            header: header.to_string(),
            body: format!("{} body", header),
            section,
            ..Post::default()
        }
    }

    #[tokio::test]
    async fn test_post_insert_appends() {
        let db = Connection::open_test().await;
        let first = db
            .insert(post("First", PostSection::Announcement))
            .await
            .unwrap();
        let second = db
            .insert(post("Second", PostSection::Announcement))
            .await
            .unwrap();
        // Positions count per section
        let other = db.insert(post("Blog", PostSection::Blog)).await.unwrap();

        assert_eq!(first.position, 0);
        assert_eq!(second.position, 1);
        assert_eq!(other.position, 0);
    }

    #[tokio::test]
    async fn test_post_update() {
        let db = Connection::open_test().await;
        let mut p = db.insert(post("Old", PostSection::Home)).await.unwrap();
        p.header = "New".to_string();
        p.image_url = Some("posts/123_banner.png".to_string());

        let p = db.update(p).await.unwrap();
        assert_eq!(p.header, "New");
        assert_eq!(p.image_url.as_deref(), Some("posts/123_banner.png"));
    }

    #[tokio::test]
    async fn test_post_move() {
        let db = Connection::open_test().await;
        let a = db.insert(post("A", PostSection::Blog)).await.unwrap();
        db.insert(post("B", PostSection::Blog)).await.unwrap();
        let c = db.insert(post("C", PostSection::Blog)).await.unwrap();

        // Move the last post to the front
        let moved = db.move_post(c.id, 0).await.unwrap();
        assert_eq!(moved.position, 0);

        let posts: Vec<Post> = db
            .query(&PostFilter {
                section: Some(PostSection::Blog),
                ..Default::default()
            })
            .await
            .unwrap();
        let headers: Vec<&str> =
            posts.iter().map(|p| p.header.as_str()).collect();
        assert_eq!(headers, vec!["C", "A", "B"]);

        // Out-of-range positions clamp to the end
        let moved = db.move_post(a.id, 99).await.unwrap();
        assert_eq!(moved.position, 2);
    }

    #[tokio::test]
    async fn test_post_delete() {
        let db = Connection::open_test().await;
        let p = db.insert(post("Gone", PostSection::About)).await.unwrap();
        let id = p.id;
        db.delete(p).await.unwrap();

        let result: Result<Post> = db.retrieve(id).await;
        assert!(result.is_err());
    }
}
