use async_trait::async_trait;

use crate::application::errors::DataSourceError;
use crate::domain::entities::{PushType, Subscriber};

/// DataSource trait - subscription records per push target
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Tracked creators configured to push to the given target
    async fn subscribers(
        &self,
        target_id: u64,
        push_type: PushType,
    ) -> Result<Vec<Subscriber>, DataSourceError>;
}
