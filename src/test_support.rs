// Recording fake of the platform port, shared by the unit tests.

use crate::core::platform::{Platform, PlatformError, Reactor, SentMessage};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    Sent { channel_id: u64, content: String },
    Replied {
        channel_id: u64,
        message_id: u64,
        content: String,
    },
    Edited {
        channel_id: u64,
        message_id: u64,
        content: String,
    },
    DirectMessage { user_id: u64, content: String },
    TimedOut {
        guild_id: u64,
        user_id: u64,
        until: DateTime<Utc>,
        reason: String,
    },
    Kicked {
        guild_id: u64,
        user_id: u64,
        reason: String,
    },
    Banned {
        guild_id: u64,
        user_id: u64,
        reason: String,
    },
    RoleAdded {
        guild_id: u64,
        user_id: u64,
        role_id: u64,
    },
    RoleRemoved {
        guild_id: u64,
        user_id: u64,
        role_id: u64,
    },
    Reacted {
        channel_id: u64,
        message_id: u64,
        emoji: String,
    },
}

pub struct FakePlatform {
    next_id: AtomicU64,
    recorded: Mutex<Vec<Recorded>>,
    roles_held: Mutex<HashSet<(u64, u64)>>,
    reactors: Mutex<HashMap<u64, Vec<Reactor>>>,
    role_names: Mutex<HashMap<u64, String>>,
    role_fetches: AtomicUsize,
    fail_fetch: AtomicBool,
    fail_moderation: AtomicBool,
    fail_dm: AtomicBool,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1000),
            recorded: Mutex::new(Vec::new()),
            roles_held: Mutex::new(HashSet::new()),
            reactors: Mutex::new(HashMap::new()),
            role_names: Mutex::new(HashMap::new()),
            role_fetches: AtomicUsize::new(0),
            fail_fetch: AtomicBool::new(false),
            fail_moderation: AtomicBool::new(false),
            fail_dm: AtomicBool::new(false),
        }
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.recorded.lock().unwrap().clone()
    }

    /// Content of every channel message and reply, in order.
    pub fn messages(&self) -> Vec<String> {
        self.recorded()
            .into_iter()
            .filter_map(|r| match r {
                Recorded::Sent { content, .. } | Recorded::Replied { content, .. } => {
                    Some(content)
                }
                _ => None,
            })
            .collect()
    }

    /// The id the next sent message will get.
    pub fn peek_next_id(&self) -> u64 {
        self.next_id.load(Ordering::SeqCst)
    }

    pub fn holds_role(&self, user_id: u64, role_id: u64) -> bool {
        self.roles_held.lock().unwrap().contains(&(user_id, role_id))
    }

    pub fn set_reactors(&self, message_id: u64, reactors: Vec<Reactor>) {
        self.reactors.lock().unwrap().insert(message_id, reactors);
    }

    pub fn add_role_name(&self, role_id: u64, name: &str) {
        self.role_names
            .lock()
            .unwrap()
            .insert(role_id, name.to_string());
    }

    /// How many times the guild role list was fetched.
    pub fn role_fetches(&self) -> usize {
        self.role_fetches.load(Ordering::SeqCst)
    }

    pub fn fail_fetches(&self) {
        self.fail_fetch.store(true, Ordering::SeqCst);
    }

    pub fn fail_moderation(&self) {
        self.fail_moderation.store(true, Ordering::SeqCst);
    }

    pub fn fail_direct_messages(&self) {
        self.fail_dm.store(true, Ordering::SeqCst);
    }

    fn record(&self, entry: Recorded) {
        self.recorded.lock().unwrap().push(entry);
    }

    fn new_message(&self) -> SentMessage {
        SentMessage {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            created_at: Utc::now(),
        }
    }

    fn moderation_result(&self) -> Result<(), PlatformError> {
        if self.fail_moderation.load(Ordering::SeqCst) {
            Err(PlatformError::Request("missing permissions".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Platform for FakePlatform {
    async fn send_message(
        &self,
        channel_id: u64,
        content: &str,
    ) -> Result<SentMessage, PlatformError> {
        self.record(Recorded::Sent {
            channel_id,
            content: content.to_string(),
        });
        Ok(self.new_message())
    }

    async fn reply(
        &self,
        channel_id: u64,
        message_id: u64,
        content: &str,
    ) -> Result<SentMessage, PlatformError> {
        self.record(Recorded::Replied {
            channel_id,
            message_id,
            content: content.to_string(),
        });
        Ok(self.new_message())
    }

    async fn edit_message(
        &self,
        channel_id: u64,
        message_id: u64,
        content: &str,
    ) -> Result<(), PlatformError> {
        self.record(Recorded::Edited {
            channel_id,
            message_id,
            content: content.to_string(),
        });
        Ok(())
    }

    async fn send_direct_message(&self, user_id: u64, content: &str) -> Result<(), PlatformError> {
        if self.fail_dm.load(Ordering::SeqCst) {
            return Err(PlatformError::Request("DMs closed".to_string()));
        }
        self.record(Recorded::DirectMessage {
            user_id,
            content: content.to_string(),
        });
        Ok(())
    }

    async fn timeout_member(
        &self,
        guild_id: u64,
        user_id: u64,
        until: DateTime<Utc>,
        reason: &str,
    ) -> Result<(), PlatformError> {
        self.moderation_result()?;
        self.record(Recorded::TimedOut {
            guild_id,
            user_id,
            until,
            reason: reason.to_string(),
        });
        Ok(())
    }

    async fn kick_member(
        &self,
        guild_id: u64,
        user_id: u64,
        reason: &str,
    ) -> Result<(), PlatformError> {
        self.moderation_result()?;
        self.record(Recorded::Kicked {
            guild_id,
            user_id,
            reason: reason.to_string(),
        });
        Ok(())
    }

    async fn ban_member(
        &self,
        guild_id: u64,
        user_id: u64,
        reason: &str,
    ) -> Result<(), PlatformError> {
        self.moderation_result()?;
        self.record(Recorded::Banned {
            guild_id,
            user_id,
            reason: reason.to_string(),
        });
        Ok(())
    }

    async fn add_role(
        &self,
        guild_id: u64,
        user_id: u64,
        role_id: u64,
    ) -> Result<(), PlatformError> {
        self.roles_held.lock().unwrap().insert((user_id, role_id));
        self.record(Recorded::RoleAdded {
            guild_id,
            user_id,
            role_id,
        });
        Ok(())
    }

    async fn remove_role(
        &self,
        guild_id: u64,
        user_id: u64,
        role_id: u64,
    ) -> Result<(), PlatformError> {
        self.roles_held.lock().unwrap().remove(&(user_id, role_id));
        self.record(Recorded::RoleRemoved {
            guild_id,
            user_id,
            role_id,
        });
        Ok(())
    }

    async fn fetch_reactors(
        &self,
        _channel_id: u64,
        message_id: u64,
        _emoji: &str,
    ) -> Result<Vec<Reactor>, PlatformError> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(PlatformError::Request("Unknown Message".to_string()));
        }
        Ok(self
            .reactors
            .lock()
            .unwrap()
            .get(&message_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn react(
        &self,
        channel_id: u64,
        message_id: u64,
        emoji: &str,
    ) -> Result<(), PlatformError> {
        self.record(Recorded::Reacted {
            channel_id,
            message_id,
            emoji: emoji.to_string(),
        });
        Ok(())
    }

    async fn role_names(&self, _guild_id: u64) -> Result<HashMap<u64, String>, PlatformError> {
        self.role_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.role_names.lock().unwrap().clone())
    }
}
