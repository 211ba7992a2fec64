//! Listener sessions: one spawned task per menu message that feeds reaction
//! events back into the controller.
//!
//! A session outlives page changes on the same message, so clicks queued
//! while a page renders are dispatched once the render finishes.

use std::{sync::Arc, time::Duration};

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use twilight_model::id::{Id, marker::MessageMarker};

use crate::{
    client::{CollectedReaction, ReactionEvent, ReactionFeed},
    controller::Menu,
    reaction::ReactionKey,
};

/// The session currently attached to a menu message.
#[derive(Debug)]
pub(crate) struct ActiveSession {
    pub(crate) id: u64,
    pub(crate) message_id: Id<MessageMarker>,
    cancel: CancellationToken,
    restart: Arc<Notify>,
}

impl ActiveSession {
    pub(crate) fn new(id: u64, message_id: Id<MessageMarker>) -> Self {
        Self {
            id,
            message_id,
            cancel: CancellationToken::new(),
            restart: Arc::new(Notify::new()),
        }
    }

    /// Start the idle timeout over, as if a reaction had just been collected.
    pub(crate) fn restart_idle_timer(&self) {
        self.restart.notify_one();
    }

    /// Stop delivering events without running the end handler.
    pub(crate) fn end_silently(self) {
        self.cancel.cancel();
    }
}

/// Why a session stopped listening on its own.
#[derive(Debug)]
pub(crate) struct SessionEnd {
    pub(crate) snapshot: Option<Vec<ReactionKey>>,
    pub(crate) message_deleted: bool,
}

impl SessionEnd {
    fn idle() -> Self {
        Self {
            snapshot: None,
            message_deleted: false,
        }
    }
}

enum SessionEvent {
    Collect(CollectedReaction),
    End(SessionEnd),
}

pub(crate) fn spawn<D>(menu: Menu<D>, session: &ActiveSession, feed: ReactionFeed, idle: Option<Duration>)
where
    D: Send + Sync + 'static,
{
    tokio::spawn(run(
        menu,
        session.id,
        feed,
        session.cancel.clone(),
        Arc::clone(&session.restart),
        idle,
    ));
}

async fn run<D>(
    menu: Menu<D>,
    id: u64,
    mut feed: ReactionFeed,
    cancel: CancellationToken,
    restart: Arc<Notify>,
    idle: Option<Duration>,
) where
    D: Send + Sync + 'static,
{
    debug!(session = id, ?idle, "reaction session opened");

    loop {
        let event = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!(session = id, "reaction session detached");
                return;
            }
            () = restart.notified() => continue,
            event = next_event(&mut feed, idle) => event,
        };

        match event {
            SessionEvent::Collect(reaction) => {
                if let Err(error) = menu.collect(id, reaction).await {
                    menu.report(&error);
                }
            }
            SessionEvent::End(end) => {
                debug!(
                    session = id,
                    has_snapshot = end.snapshot.is_some(),
                    message_deleted = end.message_deleted,
                    "reaction session ended"
                );
                if let Err(error) = menu.finish_session(id, end).await {
                    menu.report(&error);
                }
                return;
            }
        }
    }
}

async fn next_event(feed: &mut ReactionFeed, idle: Option<Duration>) -> SessionEvent {
    let received = match idle {
        Some(limit) => match tokio::time::timeout(limit, feed.recv()).await {
            Ok(received) => received,
            Err(_elapsed) => return SessionEvent::End(SessionEnd::idle()),
        },
        None => feed.recv().await,
    };

    match received {
        Some(ReactionEvent::Added(reaction)) => SessionEvent::Collect(reaction),
        Some(ReactionEvent::Closed {
            snapshot,
            message_deleted,
        }) => SessionEvent::End(SessionEnd {
            snapshot,
            message_deleted,
        }),
        None => SessionEvent::End(SessionEnd::idle()),
    }
}
