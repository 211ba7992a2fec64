//! Recording in-memory `MenuClient` used by the controller tests.

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::Duration,
};

use anyhow::anyhow;
use async_trait::async_trait;
use tokio::sync::mpsc;
use twilight_model::{
    guild::Permissions,
    id::{
        Id,
        marker::{ChannelMarker, UserMarker},
    },
};

use crate::client::{
    CollectedReaction, Destination, MenuClient, MessageBody, MessageHandle, ReactionEvent,
    ReactionFeed, ReactionFilter, reaction_feed,
};
use crate::reaction::ReactionKey;

pub(crate) const BOT_ID: u64 = 1;
pub(crate) const OWNER_ID: u64 = 10;
pub(crate) const STRANGER_ID: u64 = 20;
pub(crate) const GUILD_CHANNEL_ID: u64 = 100;
pub(crate) const DM_CHANNEL_ID: u64 = 200;

/// One chat-service call, in the order the menu issued it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Call {
    Send { message: u64, description: String },
    Edit { message: u64, description: String },
    Delete { message: u64 },
    AddReaction { message: u64, key: ReactionKey },
    RemoveAll { message: u64 },
    RemoveMark { message: u64, key: ReactionKey, user: u64 },
    Subscribe { message: u64 },
}

#[derive(Default)]
struct FakeMessage {
    body: Option<MessageBody>,
    reactions: Vec<(ReactionKey, Vec<u64>)>,
}

struct Subscription {
    message: u64,
    filter: ReactionFilter,
    sender: mpsc::UnboundedSender<ReactionEvent>,
}

pub(crate) struct FakeClient {
    calls: Mutex<Vec<Call>>,
    messages: Mutex<HashMap<u64, FakeMessage>>,
    subscriptions: Mutex<Vec<Subscription>>,
    next_message: AtomicU64,
    permissions: Option<Permissions>,
    edit_delay: Option<Duration>,
    fail_reactions: AtomicBool,
}

impl FakeClient {
    pub(crate) fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            messages: Mutex::new(HashMap::new()),
            subscriptions: Mutex::new(Vec::new()),
            next_message: AtomicU64::new(1000),
            permissions: Some(Permissions::ADMINISTRATOR),
            edit_delay: None,
            fail_reactions: AtomicBool::new(false),
        }
    }

    pub(crate) fn with_permissions(mut self, permissions: Option<Permissions>) -> Self {
        self.permissions = permissions;
        self
    }

    /// Make every edit take `delay` of (paused) time.
    pub(crate) fn with_edit_delay(mut self, delay: Duration) -> Self {
        self.edit_delay = Some(delay);
        self
    }

    /// Make `add_reaction` fail until switched back.
    pub(crate) fn set_fail_reactions(&self, fail: bool) {
        self.fail_reactions.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Description of the embed currently shown on a message.
    pub(crate) fn description(&self, message: &MessageHandle) -> Option<String> {
        let messages = self.messages.lock().unwrap();
        messages
            .get(&message.message_id.get())
            .and_then(|stored| stored.body.as_ref())
            .and_then(|body| body.embed.description.clone())
    }

    pub(crate) fn content(&self, message: &MessageHandle) -> Option<String> {
        let messages = self.messages.lock().unwrap();
        messages
            .get(&message.message_id.get())
            .and_then(|stored| stored.body.as_ref())
            .map(|body| body.content.clone())
    }

    pub(crate) fn exists(&self, message: &MessageHandle) -> bool {
        self.messages
            .lock()
            .unwrap()
            .contains_key(&message.message_id.get())
    }

    /// Reactions on a message that at least one user has marked, in attach order.
    pub(crate) fn reactions(&self, message: &MessageHandle) -> Vec<ReactionKey> {
        let messages = self.messages.lock().unwrap();
        messages
            .get(&message.message_id.get())
            .map(|stored| {
                stored
                    .reactions
                    .iter()
                    .filter(|(_, users)| !users.is_empty())
                    .map(|(key, _)| key.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Users currently marking `key` on a message.
    pub(crate) fn markers(&self, message: &MessageHandle, key: &ReactionKey) -> Vec<u64> {
        let messages = self.messages.lock().unwrap();
        messages
            .get(&message.message_id.get())
            .and_then(|stored| stored.reactions.iter().find(|(existing, _)| existing == key))
            .map(|(_, users)| users.clone())
            .unwrap_or_default()
    }

    pub(crate) fn live_subscriptions(&self) -> usize {
        let mut subscriptions = self.subscriptions.lock().unwrap();
        subscriptions.retain(|subscription| !subscription.sender.is_closed());
        subscriptions.len()
    }

    /// Simulate a user clicking a reaction. Returns how many sessions received it.
    pub(crate) fn react(&self, message: &MessageHandle, user: u64, key: &str) -> usize {
        let key = ReactionKey::parse(key);
        let message_id = message.message_id.get();

        {
            let mut messages = self.messages.lock().unwrap();
            if let Some(stored) = messages.get_mut(&message_id) {
                mark(stored, &key, user);
            }
        }

        let reaction = CollectedReaction {
            key,
            user_id: Id::new(user),
        };
        let subscriptions = self.subscriptions.lock().unwrap();
        subscriptions
            .iter()
            .filter(|subscription| subscription.message == message_id)
            .filter(|subscription| (subscription.filter)(&reaction))
            .filter(|subscription| {
                subscription
                    .sender
                    .send(ReactionEvent::Added(reaction.clone()))
                    .is_ok()
            })
            .count()
    }

    /// Simulate the chat layer closing every subscription on a message.
    pub(crate) fn close(&self, message: &MessageHandle, snapshot: Option<Vec<ReactionKey>>) {
        let message_id = message.message_id.get();
        let subscriptions = self.subscriptions.lock().unwrap();
        for subscription in subscriptions.iter().filter(|s| s.message == message_id) {
            let _ = subscription.sender.send(ReactionEvent::Closed {
                snapshot: snapshot.clone(),
                message_deleted: false,
            });
        }
    }

    /// Simulate someone else deleting the message, as the gateway reports it.
    pub(crate) fn delete_externally(&self, message: &MessageHandle) {
        let message_id = message.message_id.get();
        let keys = self.reactions(message);
        self.messages.lock().unwrap().remove(&message_id);

        let subscriptions = self.subscriptions.lock().unwrap();
        for subscription in subscriptions.iter().filter(|s| s.message == message_id) {
            let _ = subscription.sender.send(ReactionEvent::Closed {
                snapshot: Some(keys.clone()),
                message_deleted: true,
            });
        }
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn store(&self, message: u64, body: &MessageBody) -> anyhow::Result<()> {
        let mut messages = self.messages.lock().unwrap();
        let stored = messages
            .get_mut(&message)
            .ok_or_else(|| anyhow!("unknown message {message}"))?;
        stored.body = Some(body.clone());
        Ok(())
    }
}

fn mark(stored: &mut FakeMessage, key: &ReactionKey, user: u64) {
    match stored.reactions.iter_mut().find(|(existing, _)| existing == key) {
        Some((_, users)) if !users.contains(&user) => users.push(user),
        Some(_) => {}
        None => stored.reactions.push((key.clone(), vec![user])),
    }
}

fn description(body: &MessageBody) -> String {
    body.embed.description.clone().unwrap_or_default()
}

#[async_trait]
impl MenuClient for FakeClient {
    fn current_user_id(&self) -> Id<UserMarker> {
        Id::new(BOT_ID)
    }

    async fn send(
        &self,
        destination: &Destination,
        body: &MessageBody,
    ) -> anyhow::Result<MessageHandle> {
        let channel_id = match destination {
            Destination::Channel(id) | Destination::Direct(id) => *id,
            Destination::User(_) => Id::new(DM_CHANNEL_ID),
        };
        let message = self.next_message.fetch_add(1, Ordering::SeqCst);

        self.messages.lock().unwrap().insert(
            message,
            FakeMessage {
                body: Some(body.clone()),
                reactions: Vec::new(),
            },
        );
        self.record(Call::Send {
            message,
            description: description(body),
        });

        Ok(MessageHandle {
            channel_id,
            message_id: Id::new(message),
        })
    }

    async fn edit(
        &self,
        message: &MessageHandle,
        body: &MessageBody,
    ) -> anyhow::Result<MessageHandle> {
        if let Some(delay) = self.edit_delay {
            tokio::time::sleep(delay).await;
        }

        let id = message.message_id.get();
        self.store(id, body)?;
        self.record(Call::Edit {
            message: id,
            description: description(body),
        });
        Ok(*message)
    }

    async fn delete(&self, message: &MessageHandle) -> anyhow::Result<()> {
        let id = message.message_id.get();
        self.messages
            .lock()
            .unwrap()
            .remove(&id)
            .ok_or_else(|| anyhow!("unknown message {id}"))?;
        self.record(Call::Delete { message: id });
        Ok(())
    }

    async fn add_reaction(&self, message: &MessageHandle, key: &ReactionKey) -> anyhow::Result<()> {
        let id = message.message_id.get();
        if self.fail_reactions.load(Ordering::SeqCst) {
            return Err(anyhow!("missing permission to react on {id}"));
        }
        {
            let mut messages = self.messages.lock().unwrap();
            let stored = messages
                .get_mut(&id)
                .ok_or_else(|| anyhow!("unknown message {id}"))?;
            mark(stored, key, BOT_ID);
        }
        self.record(Call::AddReaction {
            message: id,
            key: key.clone(),
        });
        Ok(())
    }

    async fn remove_all_reactions(&self, message: &MessageHandle) -> anyhow::Result<()> {
        let id = message.message_id.get();
        {
            let mut messages = self.messages.lock().unwrap();
            let stored = messages
                .get_mut(&id)
                .ok_or_else(|| anyhow!("unknown message {id}"))?;
            stored.reactions.clear();
        }
        self.record(Call::RemoveAll { message: id });
        Ok(())
    }

    async fn remove_reaction_mark(
        &self,
        message: &MessageHandle,
        key: &ReactionKey,
        user_id: Id<UserMarker>,
    ) -> anyhow::Result<()> {
        let id = message.message_id.get();
        {
            let mut messages = self.messages.lock().unwrap();
            if let Some(stored) = messages.get_mut(&id)
                && let Some((_, users)) = stored
                    .reactions
                    .iter_mut()
                    .find(|(existing, _)| existing == key)
            {
                users.retain(|user| *user != user_id.get());
            }
        }
        self.record(Call::RemoveMark {
            message: id,
            key: key.clone(),
            user: user_id.get(),
        });
        Ok(())
    }

    async fn subscribe_reaction_adds(
        &self,
        message: &MessageHandle,
        filter: ReactionFilter,
    ) -> anyhow::Result<ReactionFeed> {
        let (sender, feed) = reaction_feed();
        let id = message.message_id.get();
        self.subscriptions.lock().unwrap().push(Subscription {
            message: id,
            filter,
            sender,
        });
        self.record(Call::Subscribe { message: id });
        Ok(feed)
    }

    async fn channel_permissions(
        &self,
        _channel_id: Id<ChannelMarker>,
    ) -> anyhow::Result<Option<Permissions>> {
        Ok(self.permissions)
    }
}

pub(crate) fn guild_channel() -> Destination {
    Destination::Channel(Id::new(GUILD_CHANNEL_ID))
}
