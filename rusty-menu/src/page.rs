use std::fmt;

use twilight_model::channel::message::embed::Embed;

use crate::{action::MenuAction, reaction::ReactionKey};

/// One page of a menu: a name, the embed shown while it is active, and the
/// reactions it offers.
///
/// The key order of `reactions` is the order reactions are attached in.
pub struct MenuPage<D = ()> {
    name: String,
    content: Embed,
    reactions: Vec<(ReactionKey, MenuAction<D>)>,
    index: usize,
}

impl<D> MenuPage<D> {
    /// Create a page without reactions.
    ///
    /// The index is assigned when the page is added to a menu.
    pub fn new(name: impl Into<String>, content: Embed) -> Self {
        Self {
            name: name.into(),
            content,
            reactions: Vec::new(),
            index: 0,
        }
    }

    /// Map a reaction key to an action, keeping insertion order.
    ///
    /// Mapping the same key twice replaces the earlier action in place.
    pub fn reaction(mut self, key: impl Into<ReactionKey>, action: MenuAction<D>) -> Self {
        let key = key.into();
        match self.reactions.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = action,
            None => self.reactions.push((key, action)),
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &Embed {
        &self.content
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn reactions(&self) -> &[(ReactionKey, MenuAction<D>)] {
        &self.reactions
    }

    /// Reaction keys in attach order.
    pub fn reaction_keys(&self) -> impl Iterator<Item = &ReactionKey> {
        self.reactions.iter().map(|(key, _)| key)
    }

    /// Resolve the action selected by an incoming reaction.
    pub fn action_for(&self, incoming: &ReactionKey) -> Option<&MenuAction<D>> {
        self.reactions
            .iter()
            .find(|(key, _)| key.matches(incoming))
            .map(|(_, action)| action)
    }

    /// Whether both pages attach the same keys in the same order.
    pub fn has_same_reactions<E>(&self, other: &MenuPage<E>) -> bool {
        self.reaction_keys().eq(other.reaction_keys())
    }

    pub(crate) fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }
}

impl<D> Clone for MenuPage<D> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            content: self.content.clone(),
            reactions: self.reactions.clone(),
            index: self.index,
        }
    }
}

impl<D> fmt::Debug for MenuPage<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuPage")
            .field("name", &self.name)
            .field("index", &self.index)
            .field("reactions", &self.reactions)
            .finish_non_exhaustive()
    }
}
