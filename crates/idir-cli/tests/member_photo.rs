use std::fs;

use tempfile::TempDir;

use idir_cli::context::Context;
use idir_cli::formatting::Lang;
use idir_data::Member;
use idir_db::Connection;
use idir_storage::MediaStore;

async fn test_context(dir: &TempDir) -> Context {
    Context {
        db: Connection::open_test().await,
        media: MediaStore::open(dir.path().join("media"), 1024)
            .await
            .unwrap(),
        state_dir: dir.path().join("state"),
        lang: Lang::En,
    }
}

// A failed insert must not leave the uploaded photo behind.
#[tokio::test]
async fn test_failed_member_insert_removes_uploaded_photo() {
    let dir = TempDir::new().unwrap();
    let ctx = test_context(&dir).await;

    let member = Member {
        id: "ED-0001".to_string(),
        first_name: "Abebe".to_string(),
        last_name: "Kebede".to_string(),
        ..Member::default()
    };

    let added = ctx
        .add_member(member.clone(), Some(("abebe.jpg", b"jpeg-bytes".as_slice())))
        .await
        .unwrap();
    let photo_url = added.photo_url.as_deref().unwrap();
    assert!(photo_url.starts_with("members/"));
    assert!(ctx.media.exists(photo_url));

    // Same member number again: the insert fails and the second
    // upload is removed
    let err = ctx
        .add_member(member, Some(("abebe-2.jpg", b"jpeg-bytes".as_slice())))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("already exists"));

    let photos: Vec<_> = fs::read_dir(dir.path().join("media/members"))
        .unwrap()
        .collect();
    assert_eq!(photos.len(), 1);
}
