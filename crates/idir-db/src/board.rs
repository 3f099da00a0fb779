use anyhow::Result;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};

use idir_data::{BoardMember, BoardMemberFilter, Delete, Insert, Query, Retrieve};

use crate::{
    results::{Id, QueryError},
    Connection,
};

#[async_trait]
impl Query<BoardMember> for Connection {
    type Filter = BoardMemberFilter;

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<BoardMember>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                id,
                first_name,
                last_name,
                first_name_am,
                last_name_am,
                role_title,
                image_url,
                created_at
            FROM board_members
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
        qry.push(" ORDER BY id");

        let board: Vec<BoardMember> =
            qry.build_query_as().fetch_all(&mut *conn).await?;
        Ok(board)
    }
}

#[async_trait]
impl Retrieve<BoardMember> for Connection {
    type Key = u32;

    async fn retrieve(&self, id: Self::Key) -> Result<BoardMember> {
        let filter = BoardMemberFilter {
            id: Some(id),
            ..Default::default()
        };
        let board_member = self
            .query(&filter)
            .await?
            .pop()
            .ok_or(QueryError::NotFound)?;
        Ok(board_member)
    }
}

#[async_trait]
impl Insert<BoardMember> for Connection {
    async fn insert(&self, board_member: BoardMember) -> Result<BoardMember> {
        let insert: Id<u32> = {
            let mut conn = self.lock().await;
            let mut qry = QueryBuilder::<Sqlite>::new(
                r#"INSERT INTO board_members (
                    first_name,
                    last_name,
                    first_name_am,
                    last_name_am,
                    role_title,
                    image_url,
                    created_at
                ) VALUES (
                "#,
            );
            qry.separated(", ")
                .push_bind(&board_member.first_name)
                .push_bind(&board_member.last_name)
                .push_bind(&board_member.first_name_am)
                .push_bind(&board_member.last_name_am)
                .push_bind(&board_member.role_title)
                .push_bind(&board_member.image_url)
                .push_bind(board_member.created_at);
            qry.push(") RETURNING id")
                .build_query_as()
                .fetch_one(&mut *conn)
                .await?
        };
        self.retrieve(insert.id).await
    }
}

#[async_trait]
impl Delete<BoardMember> for Connection {
    async fn delete(&self, board_member: BoardMember) -> Result<()> {
        let mut conn = self.lock().await;
        QueryBuilder::<Sqlite>::new("DELETE FROM board_members WHERE id = ")
            .push_bind(board_member.id)
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
    async fn test_board_member_round_trip() {
        let db = Connection::open_test().await;
        let added = db
            .insert(BoardMember {
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                role_title: "Member".to_string(),
                image_url: Some("board/172_test-user.jpg".to_string()),
                ..BoardMember::default()
            })
            .await
            .unwrap();

        let board: Vec<BoardMember> = db.query(&BoardMemberFilter::default()).await.unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].full_name(), "Test User");
        assert!(!board[0].image_url.as_deref().unwrap_or("").is_empty());

        db.delete(added).await.unwrap();
        let board: Vec<BoardMember> = db.query(&BoardMemberFilter::default()).await.unwrap();
        assert!(board.is_empty());
    }
}
