use async_trait::async_trait;

use crate::application::errors::StorageError;

/// NotificationStore trait - per-group dynamic-at membership
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn dynamic_at_count(&self, group_id: u64) -> Result<u64, StorageError>;

    async fn dynamic_at_list(&self, group_id: u64) -> Result<Vec<u64>, StorageError>;

    /// Returns false if the id was already on the list
    async fn dynamic_at_add(&self, group_id: u64, uid: u64) -> Result<bool, StorageError>;

    /// Returns false if the id was not on the list
    async fn dynamic_at_remove(&self, group_id: u64, uid: u64) -> Result<bool, StorageError>;
}
