use std::time::Duration;

/// Idle time after which a reaction session ends on its own.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
/// Description shown while a page's reactions are being attached.
pub const DEFAULT_LOADING_MESSAGE: &str = "Loading, please be patient...";

/// Per-menu behavior switches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuOptions {
    /// Idle timeout of the reaction session. `None` or zero disables it.
    pub timeout: Option<Duration>,
    /// Delete the message when the session times out instead of clearing reactions.
    pub delete_on_timeout: bool,
    /// Mention the menu owner above the embed (ignored in direct messages).
    pub mention: bool,
    /// On `stop`, only remove the bot's own reaction marks.
    pub keep_user_reaction_on_stop: bool,
    /// Placeholder description rendered during page changes.
    pub loading_message: String,
}

impl MenuOptions {
    /// Effective idle timeout, treating zero as disabled.
    pub fn idle_timeout(&self) -> Option<Duration> {
        self.timeout.filter(|timeout| !timeout.is_zero())
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_delete_on_timeout(mut self, delete_on_timeout: bool) -> Self {
        self.delete_on_timeout = delete_on_timeout;
        self
    }

    pub fn with_mention(mut self, mention: bool) -> Self {
        self.mention = mention;
        self
    }

    pub fn with_keep_user_reaction_on_stop(mut self, keep: bool) -> Self {
        self.keep_user_reaction_on_stop = keep;
        self
    }

    pub fn with_loading_message(mut self, message: impl Into<String>) -> Self {
        self.loading_message = message.into();
        self
    }
}

impl Default for MenuOptions {
    fn default() -> Self {
        Self {
            timeout: Some(DEFAULT_TIMEOUT),
            delete_on_timeout: true,
            mention: true,
            keep_user_reaction_on_stop: true,
            loading_message: DEFAULT_LOADING_MESSAGE.to_owned(),
        }
    }
}
