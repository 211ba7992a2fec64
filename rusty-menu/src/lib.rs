//! Reaction-driven embed menus.
//!
//! A [`Menu`] posts one of its [`MenuPage`]s into a destination and lets a
//! single user move between pages by clicking reactions. The chat service is
//! reached only through the [`MenuClient`] trait so the navigation logic can
//! run against twilight in production and against a recording fake in tests.

/// Reaction actions a page can map a key to.
pub mod action;
/// Chat-service boundary consumed by the controller.
pub mod client;
/// Menu controller and its builder.
pub mod controller;
/// Error type shared by every menu operation.
pub mod error;
/// Typed page-transition notifications.
pub mod events;
/// Tunables for a single menu.
pub mod options;
/// Immutable page records.
pub mod page;
/// Advisory permission checks run when a menu is built.
pub mod preflight;
/// Emoji identifiers used as reaction keys.
pub mod reaction;
mod session;

#[cfg(test)]
mod testing;

pub use action::{MenuAction, MenuCallback};
pub use client::{
    CollectedReaction, Destination, MenuClient, MessageBody, MessageHandle, ReactionEvent,
    ReactionFeed, ReactionFilter, reaction_feed,
};
pub use controller::{Menu, MenuBuilder, MenuStatus, PageTarget};
pub use error::MenuError;
pub use events::{PageChanged, PageChanging};
pub use options::{DEFAULT_LOADING_MESSAGE, DEFAULT_TIMEOUT, MenuOptions};
pub use page::MenuPage;
pub use reaction::ReactionKey;
