//! Gateway-side fan-out of reaction events to menu sessions.

use std::collections::HashMap;

use tokio::sync::{Mutex, mpsc};
use tracing::debug;
use twilight_model::{
    gateway::event::Event,
    id::{Id, marker::MessageMarker},
};

use rusty_menu::{CollectedReaction, ReactionEvent, ReactionFeed, ReactionFilter, ReactionKey, reaction_feed};

use crate::parse::reaction_key_from_emoji;

struct Subscriber {
    filter: ReactionFilter,
    sender: mpsc::UnboundedSender<ReactionEvent>,
    collected: Vec<ReactionKey>,
}

/// Routes gateway reaction and delete events to the sessions listening on a message.
///
/// Subscribers whose feed was dropped are pruned lazily on the next event for
/// their message.
#[derive(Default)]
pub struct ReactionHub {
    subscribers: Mutex<HashMap<Id<MessageMarker>, Vec<Subscriber>>>,
}

impl ReactionHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start listening for reaction adds on a message.
    pub async fn subscribe(&self, message_id: Id<MessageMarker>, filter: ReactionFilter) -> ReactionFeed {
        let (sender, feed) = reaction_feed();
        let mut subscribers = self.subscribers.lock().await;
        let listeners = subscribers.entry(message_id).or_default();
        listeners.retain(|subscriber| !subscriber.sender.is_closed());
        listeners.push(Subscriber {
            filter,
            sender,
            collected: Vec::new(),
        });
        debug!(%message_id, listeners = listeners.len(), "reaction subscription added");
        feed
    }

    /// Feed one gateway event through the hub. Unrelated events are ignored.
    pub async fn handle_event(&self, event: &Event) {
        match event {
            Event::ReactionAdd(add) => {
                let reaction = CollectedReaction {
                    key: reaction_key_from_emoji(&add.emoji),
                    user_id: add.user_id,
                };
                self.reaction_added(add.message_id, reaction).await;
            }
            Event::MessageDelete(delete) => self.message_deleted(delete.id).await,
            Event::MessageDeleteBulk(bulk) => {
                for message_id in &bulk.ids {
                    self.message_deleted(*message_id).await;
                }
            }
            _ => {}
        }
    }

    /// Deliver a reaction to every live subscriber whose filter accepts it.
    ///
    /// Returns how many subscribers received it.
    pub async fn reaction_added(&self, message_id: Id<MessageMarker>, reaction: CollectedReaction) -> usize {
        let mut subscribers = self.subscribers.lock().await;
        let Some(listeners) = subscribers.get_mut(&message_id) else {
            return 0;
        };

        listeners.retain(|subscriber| !subscriber.sender.is_closed());

        let mut delivered = 0;
        for subscriber in listeners.iter_mut() {
            if !(subscriber.filter)(&reaction) {
                continue;
            }
            if !subscriber.collected.contains(&reaction.key) {
                subscriber.collected.push(reaction.key.clone());
            }
            if subscriber.sender.send(ReactionEvent::Added(reaction.clone())).is_ok() {
                delivered += 1;
            }
        }

        if listeners.is_empty() {
            subscribers.remove(&message_id);
        }

        delivered
    }

    /// Close every subscription on a deleted message, handing each its collected keys.
    pub async fn message_deleted(&self, message_id: Id<MessageMarker>) {
        let Some(listeners) = self.subscribers.lock().await.remove(&message_id) else {
            return;
        };

        debug!(%message_id, listeners = listeners.len(), "menu message deleted; closing subscriptions");
        for subscriber in listeners {
            let _ = subscriber.sender.send(ReactionEvent::Closed {
                snapshot: Some(subscriber.collected),
                message_deleted: true,
            });
        }
    }

    /// Number of messages with at least one live subscriber.
    pub async fn active_messages(&self) -> usize {
        let mut subscribers = self.subscribers.lock().await;
        subscribers.retain(|_, listeners| {
            listeners.retain(|subscriber| !subscriber.sender.is_closed());
            !listeners.is_empty()
        });
        subscribers.len()
    }
}
