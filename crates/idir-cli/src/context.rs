use std::path::PathBuf;

use anyhow::Result;

use idir_data::{Insert, Member};
use idir_db::Connection;
use idir_storage::{MediaKind, MediaStore};

use crate::cli::Cli;
use crate::formatting::Lang;

/// Uploads beyond this size are refused.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Rows kept per persisted roster cache.
pub const CACHE_CAPACITY: usize = 5000;

/// Shared handles for the commands.
pub struct Context {
    pub db: Connection,
    pub media: MediaStore,
    pub state_dir: PathBuf,
    pub lang: Lang,
}

impl Context {
    pub async fn from_cli(cli: &Cli) -> Result<Self> {
        let db = Connection::open(&cli.db).await?;
        let media = MediaStore::open(cli.media_dir.clone(), MAX_UPLOAD_BYTES).await?;
        Ok(Self {
            db,
            media,
            state_dir: cli.state_dir.clone(),
            lang: cli.lang.parse()?,
        })
    }

    /// Store a member's photo and insert the record. A failed insert
    /// removes the uploaded photo again, so a duplicate member number
    /// does not leave an orphaned object behind.
    pub async fn add_member(
        &self,
        mut member: Member,
        photo: Option<(&str, &[u8])>,
    ) -> Result<Member> {
        let photo_url = match photo {
            Some((name, data)) => {
                Some(self.media.store(MediaKind::Members, name, data).await?)
            }
            None => None,
        };
        member.photo_url = photo_url.clone();

        match self.db.insert(member).await {
            Ok(member) => Ok(member),
            Err(err) => {
                if let Some(url) = &photo_url {
                    self.media.delete(url).await?;
                }
                Err(err)
            }
        }
    }
}
