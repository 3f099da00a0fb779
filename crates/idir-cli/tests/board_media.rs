use tempfile::TempDir;

use idir_data::{BoardMember, BoardMemberFilter, Delete, Insert, Query};
use idir_db::Connection;
use idir_storage::{MediaKind, MediaStore};

// Add a board member with a portrait, then remove both the record
// and the stored image.
#[tokio::test]
async fn test_board_member_with_image_round_trip() {
    let db = Connection::open_test().await;
    let dir = TempDir::new().unwrap();
    let media = MediaStore::open(dir.path().to_path_buf(), 1024 * 1024)
        .await
        .unwrap();

    let image_url = media
        .store(MediaKind::Board, "test-user.jpg", b"jpeg-bytes")
        .await
        .unwrap();
    assert!(image_url.starts_with("board/"));

    let added = db
        .insert(BoardMember {
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            role_title: "Member".to_string(),
            image_url: Some(image_url.clone()),
            ..BoardMember::default()
        })
        .await
        .unwrap();

    let board: Vec<BoardMember> = db.query(&BoardMemberFilter::default()).await.unwrap();
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].full_name(), "Test User");
    assert!(!board[0].image_url.as_deref().unwrap().is_empty());

    media.delete(&image_url).await.unwrap();
    db.delete(added).await.unwrap();

    let board: Vec<BoardMember> = db.query(&BoardMemberFilter::default()).await.unwrap();
    assert!(board.is_empty());
    assert!(!media.exists(&image_url));

    // Deleting an already absent image warns instead of failing
    media.delete(&image_url).await.unwrap();
}
