use std::{fmt, future::Future, sync::Arc};

use futures::future::BoxFuture;

use crate::{controller::Menu, error::MenuError};

/// Callback invoked with the controller when its reaction is clicked.
pub type MenuCallback<D> =
    Arc<dyn Fn(Menu<D>) -> BoxFuture<'static, Result<(), MenuError>> + Send + Sync>;

/// What happens when the authorized user clicks a page reaction.
pub enum MenuAction<D = ()> {
    /// Jump to the first page.
    First,
    /// Jump to the last page.
    Last,
    /// Go back one page; ignored on the first page.
    Previous,
    /// Go forward one page; ignored on the last page.
    Next,
    /// End the session and tidy up reactions.
    Stop,
    /// End the session and delete the menu message.
    Delete,
    /// Jump to the page with this name.
    Page(String),
    /// Run caller code with the controller.
    Callback(MenuCallback<D>),
}

impl<D> MenuAction<D> {
    /// Jump to a page by name.
    pub fn page(name: impl Into<String>) -> Self {
        Self::Page(name.into())
    }

    /// Short label used in logs.
    pub fn label(&self) -> &str {
        match self {
            Self::First => "first",
            Self::Last => "last",
            Self::Previous => "previous",
            Self::Next => "next",
            Self::Stop => "stop",
            Self::Delete => "delete",
            Self::Page(name) => name,
            Self::Callback(_) => "callback",
        }
    }
}

impl<D: Send + Sync + 'static> MenuAction<D> {
    /// Wrap an async closure as a callback action.
    pub fn callback<F, Fut>(callback: F) -> Self
    where
        F: Fn(Menu<D>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), MenuError>> + Send + 'static,
    {
        Self::Callback(Arc::new(
            move |menu: Menu<D>| -> BoxFuture<'static, Result<(), MenuError>> {
                Box::pin(callback(menu))
            },
        ))
    }
}

impl<D> Clone for MenuAction<D> {
    fn clone(&self) -> Self {
        match self {
            Self::First => Self::First,
            Self::Last => Self::Last,
            Self::Previous => Self::Previous,
            Self::Next => Self::Next,
            Self::Stop => Self::Stop,
            Self::Delete => Self::Delete,
            Self::Page(name) => Self::Page(name.clone()),
            Self::Callback(callback) => Self::Callback(Arc::clone(callback)),
        }
    }
}

impl<D> fmt::Debug for MenuAction<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page(name) => f.debug_tuple("Page").field(name).finish(),
            Self::Callback(_) => f.write_str("Callback(..)"),
            other => f.write_str(other.label()),
        }
    }
}
