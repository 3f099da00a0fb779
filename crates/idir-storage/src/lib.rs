pub mod media;
pub use media::{MediaKind, MediaStore, StorageError};
