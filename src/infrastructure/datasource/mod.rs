//! Subscription records loaded from a JSON file
//!
//! The push configuration (which creators push to which chats) is owned by
//! the wider system; this side only reads it.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::application::errors::DataSourceError;
use crate::domain::entities::{PushType, Subscriber};
use crate::domain::traits::DataSource;

/// One tracked creator and the chats their updates push to
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubscriptionEntry {
    pub uid: u64,
    pub uname: String,
    pub targets: Vec<PushTargetEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PushTargetEntry {
    #[serde(rename = "type")]
    pub kind: PushType,
    pub id: u64,
}

pub struct JsonDataSource {
    index: HashMap<(u64, PushType), Vec<Subscriber>>,
}

impl JsonDataSource {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataSourceError> {
        let content = std::fs::read_to_string(path)?;
        let entries: Vec<SubscriptionEntry> =
            serde_json::from_str(&content).map_err(|e| DataSourceError::Parse(e.to_string()))?;
        Ok(Self::from_entries(entries))
    }

    pub fn empty() -> Self {
        Self {
            index: HashMap::new(),
        }
    }

    pub fn from_entries(entries: Vec<SubscriptionEntry>) -> Self {
        let mut index: HashMap<(u64, PushType), Vec<Subscriber>> = HashMap::new();
        for entry in &entries {
            for target in &entry.targets {
                index
                    .entry((target.id, target.kind))
                    .or_default()
                    .push(Subscriber::new(entry.uid, entry.uname.clone()));
            }
        }
        Self { index }
    }

    /// Number of distinct push targets
    pub fn target_count(&self) -> usize {
        self.index.len()
    }
}

#[async_trait]
impl DataSource for JsonDataSource {
    async fn subscribers(
        &self,
        target_id: u64,
        push_type: PushType,
    ) -> Result<Vec<Subscriber>, DataSourceError> {
        Ok(self
            .index
            .get(&(target_id, push_type))
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn indexes_by_target_and_push_type() {
        let json = r#"[
            {"uid": 1, "uname": "up1", "targets": [{"type": "group", "id": 100}, {"type": "friend", "id": 200}]},
            {"uid": 2, "uname": "up2", "targets": [{"type": "group", "id": 100}]}
        ]"#;
        let entries: Vec<SubscriptionEntry> = serde_json::from_str(json).unwrap();
        let source = JsonDataSource::from_entries(entries);

        let group = source.subscribers(100, PushType::Group).await.unwrap();
        assert_eq!(group.len(), 2);
        assert!(group.iter().any(|s| s.uid == 1));
        assert!(group.iter().any(|s| s.uid == 2));

        let friend = source.subscribers(200, PushType::Friend).await.unwrap();
        assert_eq!(friend, vec![Subscriber::new(1, "up1")]);

        assert!(source
            .subscribers(100, PushType::Friend)
            .await
            .unwrap()
            .is_empty());
        assert!(source
            .subscribers(999, PushType::Group)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subscriptions.json");
        std::fs::write(
            &path,
            r#"[{"uid": 7, "uname": "up7", "targets": [{"type": "group", "id": 1}]}]"#,
        )
        .unwrap();

        let source = JsonDataSource::load(&path).unwrap();
        assert_eq!(source.target_count(), 1);
        let subs = source.subscribers(1, PushType::Group).await.unwrap();
        assert_eq!(subs, vec![Subscriber::new(7, "up7")]);
    }
}
