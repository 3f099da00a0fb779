use anyhow::Result;
use async_trait::async_trait;

/// Query records matching a filter.
#[async_trait]
pub trait Query<T> {
    type Filter;
    async fn query(&self, filter: &Self::Filter) -> Result<Vec<T>>;
}

/// Insert a new record. Fails if the key is already taken.
#[async_trait]
pub trait Insert<T> {
    async fn insert(&self, item: T) -> Result<T>;
}

/// Update an existing record.
#[async_trait]
pub trait Update<T> {
    async fn update(&self, item: T) -> Result<T>;
}

/// Retrieve a single record by key.
#[async_trait]
pub trait Retrieve<T> {
    type Key;
    async fn retrieve(&self, key: Self::Key) -> Result<T>;
}

/// Delete a record.
#[async_trait]
pub trait Delete<T> {
    async fn delete(&self, item: T) -> Result<()>;
}
