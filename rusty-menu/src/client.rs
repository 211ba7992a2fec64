use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use twilight_model::{
    channel::message::embed::Embed,
    guild::Permissions,
    id::{
        Id,
        marker::{ChannelMarker, MessageMarker, UserMarker},
    },
};

use crate::reaction::ReactionKey;

/// Where a menu is posted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Destination {
    /// A guild text channel.
    Channel(Id<ChannelMarker>),
    /// An already opened direct-message channel.
    Direct(Id<ChannelMarker>),
    /// A user whose direct-message channel is opened on first send.
    User(Id<UserMarker>),
}

impl Destination {
    /// Whether this destination is a direct-message context.
    pub fn is_direct(&self) -> bool {
        !matches!(self, Self::Channel(_))
    }

    /// Channel id, when already known.
    pub fn channel_id(&self) -> Option<Id<ChannelMarker>> {
        match self {
            Self::Channel(id) | Self::Direct(id) => Some(*id),
            Self::User(_) => None,
        }
    }
}

/// The rendered menu message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MessageHandle {
    pub channel_id: Id<ChannelMarker>,
    pub message_id: Id<MessageMarker>,
}

/// Message content plus the single embed a menu renders.
#[derive(Clone, Debug, PartialEq)]
pub struct MessageBody {
    pub content: String,
    pub embed: Embed,
}

/// A reaction-add event delivered to a listener session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectedReaction {
    pub key: ReactionKey,
    pub user_id: Id<UserMarker>,
}

/// Items produced by a reaction subscription.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReactionEvent {
    /// A reaction passing the subscription filter was added.
    Added(CollectedReaction),
    /// The chat layer closed the subscription, with the reactions it saw if known.
    ///
    /// `message_deleted` is set when the close was caused by the message
    /// disappearing, in which case there is nothing left to tidy.
    Closed {
        snapshot: Option<Vec<ReactionKey>>,
        message_deleted: bool,
    },
}

/// Predicate a subscription applies before delivering a reaction.
pub type ReactionFilter = Arc<dyn Fn(&CollectedReaction) -> bool + Send + Sync>;

/// Receiving half of a reaction subscription.
///
/// Dropping the feed is how a session detaches from the chat layer.
#[derive(Debug)]
pub struct ReactionFeed {
    events: mpsc::UnboundedReceiver<ReactionEvent>,
}

impl ReactionFeed {
    /// Next event, or `None` once the sending side is gone.
    pub async fn recv(&mut self) -> Option<ReactionEvent> {
        self.events.recv().await
    }
}

impl From<mpsc::UnboundedReceiver<ReactionEvent>> for ReactionFeed {
    fn from(events: mpsc::UnboundedReceiver<ReactionEvent>) -> Self {
        Self { events }
    }
}

/// Create a connected sender/feed pair for adapters.
pub fn reaction_feed() -> (mpsc::UnboundedSender<ReactionEvent>, ReactionFeed) {
    let (sender, events) = mpsc::unbounded_channel();
    (sender, ReactionFeed { events })
}

/// Chat-service operations a menu needs.
///
/// Every failure is returned to the caller as-is; implementations must not
/// retry on the menu's behalf.
#[async_trait]
pub trait MenuClient: Send + Sync {
    /// Id of the bot account, used to filter its own reactions.
    fn current_user_id(&self) -> Id<UserMarker>;

    async fn send(
        &self,
        destination: &Destination,
        body: &MessageBody,
    ) -> anyhow::Result<MessageHandle>;

    async fn edit(&self, message: &MessageHandle, body: &MessageBody)
    -> anyhow::Result<MessageHandle>;

    async fn delete(&self, message: &MessageHandle) -> anyhow::Result<()>;

    async fn add_reaction(&self, message: &MessageHandle, key: &ReactionKey)
    -> anyhow::Result<()>;

    async fn remove_all_reactions(&self, message: &MessageHandle) -> anyhow::Result<()>;

    /// Remove one user's mark from a reaction, leaving other users' marks.
    async fn remove_reaction_mark(
        &self,
        message: &MessageHandle,
        key: &ReactionKey,
        user_id: Id<UserMarker>,
    ) -> anyhow::Result<()>;

    /// Subscribe to reaction adds on a message.
    async fn subscribe_reaction_adds(
        &self,
        message: &MessageHandle,
        filter: ReactionFilter,
    ) -> anyhow::Result<ReactionFeed>;

    /// The bot's permissions in a guild channel, `None` when they cannot be resolved.
    async fn channel_permissions(
        &self,
        channel_id: Id<ChannelMarker>,
    ) -> anyhow::Result<Option<Permissions>>;
}
