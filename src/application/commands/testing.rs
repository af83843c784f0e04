//! Shared doubles for command handler tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use crate::application::context::BotContext;
use crate::application::errors::{BotError, DataSourceError, PluginError, StorageError};
use crate::domain::entities::{
    Friend, Group, Member, MessageChain, MessageEvent, Origin, PushType, Subscriber, Target,
};
use crate::domain::traits::{Chat, DataSource, NotificationStore, PluginHost, PluginInfo};
use crate::infrastructure::config::Config;

pub const BOT_ACCOUNT: u64 = 10_000;
pub const MASTER: u64 = 900;

/// Chat double that records every outbound message
#[derive(Default)]
pub struct RecordingChat {
    pub sent: Mutex<Vec<(Target, MessageChain, Option<i64>)>>,
}

impl RecordingChat {
    pub fn texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, chain, _)| chain.text())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Chat for RecordingChat {
    async fn send(
        &self,
        target: Target,
        chain: MessageChain,
        quote: Option<i64>,
    ) -> Result<(), BotError> {
        self.sent.lock().unwrap().push((target, chain, quote));
        Ok(())
    }
}

/// In-memory notification store; lists keep whatever duplicates they are given
#[derive(Default)]
pub struct MemoryStore {
    lists: Mutex<HashMap<u64, Vec<u64>>>,
}

impl MemoryStore {
    pub fn with_list(group_id: u64, ids: &[u64]) -> Self {
        let store = Self::default();
        store.lists.lock().unwrap().insert(group_id, ids.to_vec());
        store
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn dynamic_at_count(&self, group_id: u64) -> Result<u64, StorageError> {
        Ok(self
            .lists
            .lock()
            .unwrap()
            .get(&group_id)
            .map(|ids| ids.len() as u64)
            .unwrap_or(0))
    }

    async fn dynamic_at_list(&self, group_id: u64) -> Result<Vec<u64>, StorageError> {
        Ok(self
            .lists
            .lock()
            .unwrap()
            .get(&group_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn dynamic_at_add(&self, group_id: u64, uid: u64) -> Result<bool, StorageError> {
        let mut lists = self.lists.lock().unwrap();
        let list = lists.entry(group_id).or_default();
        if list.contains(&uid) {
            return Ok(false);
        }
        list.push(uid);
        Ok(true)
    }

    async fn dynamic_at_remove(&self, group_id: u64, uid: u64) -> Result<bool, StorageError> {
        let mut lists = self.lists.lock().unwrap();
        let Some(list) = lists.get_mut(&group_id) else {
            return Ok(false);
        };
        let before = list.len();
        list.retain(|id| *id != uid);
        Ok(list.len() != before)
    }
}

/// Data source double backed by a fixed map
#[derive(Default)]
pub struct StaticDataSource {
    subscribers: HashMap<(u64, PushType), Vec<Subscriber>>,
}

impl StaticDataSource {
    pub fn with_group(group_id: u64, subscribers: Vec<Subscriber>) -> Self {
        let mut map = HashMap::new();
        map.insert((group_id, PushType::Group), subscribers);
        Self { subscribers: map }
    }
}

#[async_trait]
impl DataSource for StaticDataSource {
    async fn subscribers(
        &self,
        target_id: u64,
        push_type: PushType,
    ) -> Result<Vec<Subscriber>, DataSourceError> {
        Ok(self
            .subscribers
            .get(&(target_id, push_type))
            .cloned()
            .unwrap_or_default())
    }
}

/// Plugin host double that records calls in invocation order
#[derive(Default)]
pub struct RecordingHost {
    loaded: Mutex<Vec<String>>,
    calls: Mutex<Vec<String>>,
    fail_load: Mutex<Option<String>>,
}

impl RecordingHost {
    pub fn with_loaded(names: &[&str]) -> Self {
        let host = Self::default();
        *host.loaded.lock().unwrap() = names.iter().map(|s| s.to_string()).collect();
        host
    }

    /// Make the next load call fail with the given error text
    pub fn fail_next_load(&self, error: impl Into<String>) {
        *self.fail_load.lock().unwrap() = Some(error.into());
    }

    pub fn call_log(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl PluginHost for RecordingHost {
    fn lookup(&self, name: &str) -> Option<PluginInfo> {
        self.loaded
            .lock()
            .unwrap()
            .iter()
            .find(|n| n.as_str() == name)
            .map(|n| PluginInfo {
                name: n.clone(),
                version: "0.1.0".to_string(),
            })
    }

    fn loaded(&self) -> Vec<String> {
        self.loaded.lock().unwrap().clone()
    }

    fn load(&self, name: &str) -> Result<(), PluginError> {
        self.calls.lock().unwrap().push(format!("load:{}", name));
        if let Some(error) = self.fail_load.lock().unwrap().take() {
            return Err(PluginError::Load(error));
        }
        self.loaded.lock().unwrap().push(name.to_string());
        Ok(())
    }

    fn unload(&self, name: &str) -> Result<(), PluginError> {
        self.calls.lock().unwrap().push(format!("unload:{}", name));
        let mut loaded = self.loaded.lock().unwrap();
        let before = loaded.len();
        loaded.retain(|n| n != name);
        if loaded.len() == before {
            return Err(PluginError::NotFound(name.to_string()));
        }
        Ok(())
    }
}

/// Assembles a BotContext from doubles
pub struct ContextBuilder {
    chat: Arc<RecordingChat>,
    store: Arc<MemoryStore>,
    datasource: Arc<StaticDataSource>,
    plugins: Arc<RecordingHost>,
    config: Config,
}

impl ContextBuilder {
    pub fn new() -> Self {
        let mut config = Config::default();
        config.bot.account = BOT_ACCOUNT;
        config.bot.master = Some(MASTER);
        config.plugins.custom_package = Some("custom_pkg".to_string());
        config.plugins.reload_settle_ms = 5;
        Self {
            chat: Arc::new(RecordingChat::default()),
            store: Arc::new(MemoryStore::default()),
            datasource: Arc::new(StaticDataSource::default()),
            plugins: Arc::new(RecordingHost::default()),
            config,
        }
    }

    pub fn chat(mut self, chat: Arc<RecordingChat>) -> Self {
        self.chat = chat;
        self
    }

    pub fn store(mut self, store: Arc<MemoryStore>) -> Self {
        self.store = store;
        self
    }

    pub fn datasource(mut self, datasource: Arc<StaticDataSource>) -> Self {
        self.datasource = datasource;
        self
    }

    pub fn plugins(mut self, plugins: Arc<RecordingHost>) -> Self {
        self.plugins = plugins;
        self
    }

    pub fn config(mut self, f: impl FnOnce(&mut Config)) -> Self {
        f(&mut self.config);
        self
    }

    pub fn build(self) -> BotContext {
        BotContext {
            account: self.config.bot.account,
            config: Arc::new(self.config),
            chat: self.chat,
            store: self.store,
            datasource: self.datasource,
            plugins: self.plugins,
        }
    }
}

pub fn context() -> BotContext {
    ContextBuilder::new().build()
}

pub fn group_event(group_id: u64, member_id: u64, text: &str) -> MessageEvent {
    group_event_with_chain(group_id, member_id, MessageChain::plain(text))
}

pub fn group_event_with_chain(group_id: u64, member_id: u64, chain: MessageChain) -> MessageEvent {
    MessageEvent {
        source: 1,
        time: Utc::now(),
        chain,
        origin: Origin::Group {
            group: Group {
                id: group_id,
                name: "测试群".to_string(),
            },
            member: Member {
                id: member_id,
                name: "member".to_string(),
            },
        },
    }
}

pub fn friend_event(friend_id: u64, text: &str) -> MessageEvent {
    MessageEvent {
        source: 2,
        time: Utc::now(),
        chain: MessageChain::plain(text),
        origin: Origin::Friend(Friend {
            id: friend_id,
            nickname: "friend".to_string(),
        }),
    }
}
