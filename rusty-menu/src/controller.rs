//! Menu controller: renders pages, keeps reactions in step with the active
//! page, and turns reaction clicks into transitions.
//!
//! `set_page`, `stop`, `delete` and the session end handler are serialized by
//! a per-menu transition lock. One listener session serves a message across
//! page changes, and reaction dispatch waits on the same lock, so a click that
//! arrives while a page is still rendering is handled against the page that
//! render produces.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use futures::future::BoxFuture;
use tracing::{debug, error, warn};
use twilight_model::{
    channel::message::embed::Embed,
    id::{Id, marker::UserMarker},
};
use twilight_util::builder::embed::EmbedBuilder;

use crate::{
    action::MenuAction,
    client::{CollectedReaction, Destination, MenuClient, MessageBody, MessageHandle, ReactionFilter},
    error::MenuError,
    events::{Observers, PageChanged, PageChanging},
    options::MenuOptions,
    page::MenuPage,
    preflight::check_permissions,
    reaction::ReactionKey,
    session::{self, ActiveSession, SessionEnd},
};

/// Lifecycle of a menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuStatus {
    /// Nothing rendered yet.
    Uninitialized,
    /// Page rendered and a reaction session is listening.
    Active(usize),
    /// Session ended; the message may still exist.
    Stopped,
    /// Message removed. Terminal.
    Deleted,
}

/// Page selector accepted by [`Menu::set_page`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageTarget {
    Index(usize),
    Name(String),
}

impl From<usize> for PageTarget {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for PageTarget {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<String> for PageTarget {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

/// Builder collecting pages and options before the menu is created.
pub struct MenuBuilder<D = ()> {
    client: Arc<dyn MenuClient>,
    destination: Destination,
    user_id: Id<UserMarker>,
    pages: Vec<MenuPage<D>>,
    options: MenuOptions,
    data: D,
}

impl MenuBuilder<()> {
    pub fn new(
        client: Arc<dyn MenuClient>,
        destination: Destination,
        user_id: Id<UserMarker>,
    ) -> Self {
        Self::with_data(client, destination, user_id, ())
    }
}

impl<D> MenuBuilder<D> {
    /// Start a builder carrying caller-defined data reachable from callbacks.
    pub fn with_data(
        client: Arc<dyn MenuClient>,
        destination: Destination,
        user_id: Id<UserMarker>,
        data: D,
    ) -> Self {
        Self {
            client,
            destination,
            user_id,
            pages: Vec::new(),
            options: MenuOptions::default(),
            data,
        }
    }

    pub fn page(mut self, page: MenuPage<D>) -> Self {
        self.pages.push(page);
        self
    }

    pub fn pages(mut self, pages: impl IntoIterator<Item = MenuPage<D>>) -> Self {
        self.pages.extend(pages);
        self
    }

    pub fn options(mut self, options: MenuOptions) -> Self {
        self.options = options;
        self
    }

    /// Create the menu, assigning page indices and running the permission preflight.
    pub async fn build(self) -> Result<Menu<D>, MenuError> {
        if self.pages.is_empty() {
            return Err(MenuError::NoPages);
        }

        let pages: Vec<MenuPage<D>> = self
            .pages
            .into_iter()
            .enumerate()
            .map(|(index, page)| page.with_index(index))
            .collect();

        let mut seen = HashSet::new();
        for page in &pages {
            if !seen.insert(page.name()) {
                warn!(page = page.name(), "duplicate page name; jumps by name resolve to the first match");
            }
        }

        check_permissions(self.client.as_ref(), &self.destination).await;

        Ok(Menu {
            inner: Arc::new(MenuInner {
                client: self.client,
                user_id: self.user_id,
                pages,
                options: self.options,
                data: self.data,
                state: Mutex::new(MenuState {
                    destination: self.destination,
                    status: MenuStatus::Uninitialized,
                    page_index: 0,
                    message: None,
                    session: None,
                    attached: Vec::new(),
                    reaction_set_changed: false,
                    next_session_id: 0,
                }),
                transition: tokio::sync::Mutex::new(()),
                observers: Observers::new(),
            }),
        })
    }
}

/// A reaction-driven menu bound to one user and one message.
///
/// Cheap to clone; clones share the same state.
pub struct Menu<D = ()> {
    inner: Arc<MenuInner<D>>,
}

impl<D> Clone for Menu<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct MenuInner<D> {
    client: Arc<dyn MenuClient>,
    user_id: Id<UserMarker>,
    pages: Vec<MenuPage<D>>,
    options: MenuOptions,
    data: D,
    state: Mutex<MenuState>,
    transition: tokio::sync::Mutex<()>,
    observers: Observers<D>,
}

struct MenuState {
    destination: Destination,
    status: MenuStatus,
    page_index: usize,
    message: Option<MessageHandle>,
    session: Option<ActiveSession>,
    attached: Vec<ReactionKey>,
    reaction_set_changed: bool,
    next_session_id: u64,
}

impl MenuState {
    fn track_attached(&mut self, key: &ReactionKey) {
        if !self.attached.contains(key) {
            self.attached.push(key.clone());
        }
    }
}

impl Menu<()> {
    pub fn builder(
        client: Arc<dyn MenuClient>,
        destination: Destination,
        user_id: Id<UserMarker>,
    ) -> MenuBuilder<()> {
        MenuBuilder::new(client, destination, user_id)
    }
}

impl<D> Menu<D> {
    /// The only user allowed to drive the menu.
    pub fn user_id(&self) -> Id<UserMarker> {
        self.inner.user_id
    }

    pub fn pages(&self) -> &[MenuPage<D>] {
        &self.inner.pages
    }

    pub fn options(&self) -> &MenuOptions {
        &self.inner.options
    }

    /// Caller-defined data passed at construction.
    pub fn data(&self) -> &D {
        &self.inner.data
    }

    pub fn destination(&self) -> Destination {
        self.state().destination
    }

    pub fn status(&self) -> MenuStatus {
        self.state().status
    }

    pub fn current_index(&self) -> usize {
        self.state().page_index
    }

    pub fn current_page(&self) -> &MenuPage<D> {
        let index = self.current_index();
        &self.inner.pages[index]
    }

    /// Handle of the rendered message, if any.
    pub fn message(&self) -> Option<MessageHandle> {
        self.state().message
    }

    /// Reactions the bot has attached since the message was created or cleared.
    pub fn attached_reactions(&self) -> Vec<ReactionKey> {
        self.state().attached.clone()
    }

    /// Whether the last transition changed the ordered reaction-key sequence.
    pub fn reaction_set_changed(&self) -> bool {
        self.state().reaction_set_changed
    }

    /// Register an observer for `page-changing` notifications.
    pub fn on_page_changing(&self, observer: impl Fn(&PageChanging<'_, D>) + Send + Sync + 'static) {
        self.inner.observers.add_changing(Box::new(observer));
    }

    /// Register an observer for `page-changed` notifications.
    pub fn on_page_changed(&self, observer: impl Fn(&PageChanged<'_, D>) + Send + Sync + 'static) {
        self.inner.observers.add_changed(Box::new(observer));
    }

    /// Register an observer for failures raised inside reaction handlers.
    pub fn on_error(&self, observer: impl Fn(&MenuError) + Send + Sync + 'static) {
        self.inner.observers.add_error(Box::new(observer));
    }

    fn state(&self) -> MutexGuard<'_, MenuState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn resolve(&self, target: &PageTarget) -> Result<usize, MenuError> {
        let pages = &self.inner.pages;
        match target {
            PageTarget::Index(index) if *index < pages.len() => Ok(*index),
            PageTarget::Index(index) => Err(MenuError::PageOutOfRange {
                index: *index,
                len: pages.len(),
            }),
            PageTarget::Name(name) => pages
                .iter()
                .position(|page| page.name() == name)
                .ok_or_else(|| MenuError::PageNotFound(name.clone())),
        }
    }

    fn body(&self, embed: Embed) -> MessageBody {
        let destination = self.destination();
        let content = if self.inner.options.mention && !destination.is_direct() {
            format!("<@{}>", self.inner.user_id)
        } else {
            String::new()
        };

        MessageBody { content, embed }
    }

    fn end_session_silently(&self) {
        let session = self.state().session.take();
        if let Some(session) = session {
            debug!(session = session.id, "detaching reaction session");
            session.end_silently();
        }
    }

    pub(crate) fn report(&self, error: &MenuError) {
        error!(user_id = %self.inner.user_id, %error, "menu reaction handler failed");
        self.inner.observers.error(error);
    }
}

impl<D> Menu<D>
where
    D: Send + Sync + 'static,
{
    /// Render the first page.
    pub async fn start(&self) -> Result<(), MenuError> {
        self.set_page(0).await
    }

    /// Move to a page by index or by name.
    ///
    /// Unknown names and out-of-range indices fail before anything is
    /// emitted or rendered.
    pub async fn set_page(&self, target: impl Into<PageTarget>) -> Result<(), MenuError> {
        let target = target.into();
        let _transition = self.inner.transition.lock().await;
        self.render_page(&target).await
    }

    async fn render_page(&self, target: &PageTarget) -> Result<(), MenuError> {
        let new_index = self.resolve(target)?;
        let inner = &self.inner;
        let new_page = &inner.pages[new_index];

        let old_index = {
            let state = self.state();
            if state.status == MenuStatus::Deleted {
                return Err(MenuError::Deleted);
            }
            state.page_index
        };

        inner.observers.page_changing(&PageChanging {
            old_index,
            old_page: &inner.pages[old_index],
            new_index,
            new_page,
        });

        debug!(from = old_index, to = new_index, page = new_page.name(), "changing menu page");

        if let Err(error) = self.render_transition(new_index).await {
            self.abandon_render();
            return Err(error);
        }

        inner.observers.page_changed(&PageChanged {
            index: new_index,
            page: new_page,
        });

        Ok(())
    }

    async fn render_transition(&self, new_index: usize) -> Result<(), MenuError> {
        let inner = &self.inner;
        let new_page = &inner.pages[new_index];

        let (destination, existing) = {
            let mut state = self.state();
            state.reaction_set_changed = state.status != MenuStatus::Uninitialized
                && !inner.pages[state.page_index].has_same_reactions(new_page);
            state.page_index = new_index;
            (state.destination, state.message)
        };

        let loading = self.body(loading_embed(new_page, &inner.options.loading_message));
        let message = self.render_loading(destination, existing, &loading).await?;

        let listening = self
            .state()
            .session
            .as_ref()
            .is_some_and(|session| session.message_id == message.message_id);
        if !listening {
            self.end_session_silently();
        }

        for key in new_page.reaction_keys() {
            inner.client.add_reaction(&message, key).await?;
            self.state().track_attached(key);
        }

        if listening {
            let state = self.state();
            if let Some(session) = &state.session {
                session.restart_idle_timer();
            }
        } else {
            self.open_session(&message).await?;
        }

        let body = self.body(new_page.content().clone());
        let message = inner.client.edit(&message, &body).await?;

        let mut state = self.state();
        state.message = Some(message);
        state.status = MenuStatus::Active(new_index);

        Ok(())
    }

    /// A render that failed part-way leaves the menu stopped with no session listening.
    fn abandon_render(&self) {
        self.end_session_silently();
        let mut state = self.state();
        if state.status != MenuStatus::Deleted {
            state.status = MenuStatus::Stopped;
        }
        warn!(page = state.page_index, "menu render failed; menu stopped");
    }

    /// Put the loading body on screen, reusing the message where the destination allows.
    async fn render_loading(
        &self,
        destination: Destination,
        existing: Option<MessageHandle>,
        loading: &MessageBody,
    ) -> Result<MessageHandle, MenuError> {
        let client = &self.inner.client;

        let message = match existing {
            Some(previous) if !destination.is_direct() => client.edit(&previous, loading).await?,
            Some(previous) => {
                // Reactions cannot be bulk-cleared in DMs, so the message is replaced.
                self.end_session_silently();
                {
                    let mut state = self.state();
                    state.message = None;
                    state.attached.clear();
                }
                client.delete(&previous).await?;
                client.send(&destination, loading).await?
            }
            None => client.send(&destination, loading).await?,
        };

        let mut state = self.state();
        if state.message.map(|current| current.message_id) != Some(message.message_id) {
            state.attached.clear();
        }
        if let Destination::User(_) = state.destination {
            state.destination = Destination::Direct(message.channel_id);
        }
        state.message = Some(message);

        Ok(message)
    }

    async fn open_session(&self, message: &MessageHandle) -> Result<(), MenuError> {
        let bot_id = self.inner.client.current_user_id();
        let filter: ReactionFilter =
            Arc::new(move |reaction: &CollectedReaction| reaction.user_id != bot_id);
        let feed = self
            .inner
            .client
            .subscribe_reaction_adds(message, filter)
            .await?;

        // Stored under the same guard it is spawned with, so its first event
        // already sees it as the current session.
        let mut state = self.state();
        state.next_session_id += 1;
        let session = ActiveSession::new(state.next_session_id, message.message_id);
        session::spawn(self.clone(), &session, feed, self.inner.options.idle_timeout());
        state.session = Some(session);

        Ok(())
    }

    /// End the session and tidy reactions.
    ///
    /// With `keep_user_reaction_on_stop` only the bot's own marks are
    /// removed; otherwise all reactions are cleared outside direct messages.
    pub async fn stop(&self) -> Result<(), MenuError> {
        let _transition = self.inner.transition.lock().await;
        self.end_session_silently();

        let (message, attached) = {
            let mut state = self.state();
            if state.status == MenuStatus::Deleted {
                return Ok(());
            }
            state.status = MenuStatus::Stopped;
            (state.message, state.attached.clone())
        };

        match message {
            Some(message) if self.inner.options.keep_user_reaction_on_stop => {
                let bot_id = self.inner.client.current_user_id();
                for key in &attached {
                    self.inner
                        .client
                        .remove_reaction_mark(&message, key, bot_id)
                        .await?;
                }
                Ok(())
            }
            _ => self.clear_reactions().await,
        }
    }

    /// End the session and delete the menu message. The menu cannot be reused.
    pub async fn delete(&self) -> Result<(), MenuError> {
        let _transition = self.inner.transition.lock().await;
        self.end_session_silently();
        self.delete_message().await
    }

    async fn delete_message(&self) -> Result<(), MenuError> {
        let message = {
            let mut state = self.state();
            state.status = MenuStatus::Deleted;
            state.attached.clear();
            state.message.take()
        };

        if let Some(message) = message {
            self.inner.client.delete(&message).await?;
        }

        Ok(())
    }

    async fn clear_reactions(&self) -> Result<(), MenuError> {
        let message = {
            let state = self.state();
            if state.destination.is_direct() {
                return Ok(());
            }
            state.message
        };

        if let Some(message) = message {
            self.inner.client.remove_all_reactions(&message).await?;
            self.state().attached.clear();
        }

        Ok(())
    }

    /// Handle one reaction delivered by session `session_id`.
    ///
    /// Waits for any in-flight transition first so the reaction is matched
    /// against the page that transition renders. Boxed so that transitions
    /// started from here can open the next session.
    pub(crate) fn collect(
        &self,
        session_id: u64,
        reaction: CollectedReaction,
    ) -> BoxFuture<'_, Result<(), MenuError>> {
        Box::pin(async move {
            let inner = &self.inner;
            drop(inner.transition.lock().await);

            let (page_index, message) = {
                let state = self.state();
                if state.session.as_ref().map(|session| session.id) != Some(session_id) {
                    debug!(session = session_id, "dropping reaction for a detached session");
                    return Ok(());
                }
                (state.page_index, state.message)
            };
            let Some(message) = message else {
                return Ok(());
            };

            let page = &inner.pages[page_index];
            let action = if reaction.user_id == inner.user_id {
                page.action_for(&reaction.key).cloned()
            } else {
                None
            };

            let Some(action) = action else {
                debug!(
                    user_id = %reaction.user_id,
                    reaction = %reaction.key,
                    "rejecting menu reaction"
                );
                inner
                    .client
                    .remove_reaction_mark(&message, &reaction.key, reaction.user_id)
                    .await?;
                return Ok(());
            };

            debug!(action = action.label(), page = page.name(), "menu reaction accepted");

            let last_index = inner.pages.len() - 1;
            match action {
                MenuAction::Callback(callback) => callback(self.clone()).await,
                MenuAction::Stop => self.stop().await,
                MenuAction::Delete => self.delete().await,
                MenuAction::First => self.set_page(0).await,
                MenuAction::Last => self.set_page(last_index).await,
                MenuAction::Previous if page_index > 0 => self.set_page(page_index - 1).await,
                MenuAction::Next if page_index < last_index => self.set_page(page_index + 1).await,
                MenuAction::Previous | MenuAction::Next => Ok(()),
                MenuAction::Page(name) => self.set_page(name).await,
            }
        })
    }

    /// Run the end handler for a session that closed on its own.
    ///
    /// Sessions already replaced or detached are ignored.
    pub(crate) async fn finish_session(&self, id: u64, end: SessionEnd) -> Result<(), MenuError> {
        let _transition = self.inner.transition.lock().await;

        let (direct, message, changed) = {
            let mut state = self.state();
            if state.session.as_ref().map(|session| session.id) != Some(id) {
                return Ok(());
            }
            state.session = None;
            if end.message_deleted {
                debug!(session = id, "menu message was deleted elsewhere");
                state.message = None;
                state.attached.clear();
                state.status = MenuStatus::Deleted;
                return Ok(());
            }
            if state.status != MenuStatus::Deleted {
                state.status = MenuStatus::Stopped;
            }
            (
                state.destination.is_direct(),
                state.message,
                state.reaction_set_changed,
            )
        };

        if direct {
            return Ok(());
        }

        match end.snapshot {
            Some(_) if changed => self.clear_reactions().await,
            Some(snapshot) => {
                if let (Some(message), Some(first)) = (message, snapshot.first()) {
                    self.inner
                        .client
                        .remove_reaction_mark(&message, first, self.inner.user_id)
                        .await?;
                }
                Ok(())
            }
            None if self.inner.options.delete_on_timeout => self.delete_message().await,
            None => self.clear_reactions().await,
        }
    }
}

fn loading_embed<D>(page: &MenuPage<D>, loading_message: &str) -> Embed {
    let builder = EmbedBuilder::new().description(loading_message);
    match page.content().title.as_deref() {
        Some(title) => builder.title(title).build(),
        None => builder.build(),
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
