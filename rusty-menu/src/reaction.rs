use std::{
    fmt,
    hash::{Hash, Hasher},
};

use twilight_model::id::{Id, marker::EmojiMarker};

/// Emoji identifier a page maps to an action.
///
/// Custom emoji compare by id only; the name is carried for display and for
/// building reaction requests.
#[derive(Clone, Debug)]
pub enum ReactionKey {
    /// A unicode emoji such as `▶`.
    Unicode(String),
    /// A guild custom emoji.
    Custom {
        id: Id<EmojiMarker>,
        name: Option<String>,
    },
}

impl ReactionKey {
    /// Build a unicode reaction key.
    pub fn unicode(name: impl Into<String>) -> Self {
        Self::Unicode(name.into())
    }

    /// Build a custom-emoji reaction key.
    pub fn custom(id: Id<EmojiMarker>, name: Option<&str>) -> Self {
        Self::Custom {
            id,
            name: name.map(ToOwned::to_owned),
        }
    }

    /// Parse a raw key (`<:name:id>`, `<a:name:id>`, `name:id`, or a unicode emoji).
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        parse_custom(trimmed).unwrap_or_else(|| Self::Unicode(trimmed.to_owned()))
    }

    /// Display name of the emoji, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Unicode(name) => Some(name),
            Self::Custom { name, .. } => name.as_deref(),
        }
    }

    /// Whether an incoming reaction selects this page key.
    ///
    /// A unicode key also selects a custom emoji carrying the same name.
    pub fn matches(&self, incoming: &ReactionKey) -> bool {
        match (self, incoming) {
            (Self::Unicode(key), Self::Unicode(name)) => key == name,
            (Self::Unicode(key), Self::Custom { name: Some(name), .. }) => key == name,
            (Self::Custom { id, .. }, Self::Custom { id: other, .. }) => id == other,
            _ => false,
        }
    }
}

fn parse_custom(raw: &str) -> Option<ReactionKey> {
    let inner = match raw.strip_prefix('<').and_then(|rest| rest.strip_suffix('>')) {
        Some(wrapped) => wrapped
            .strip_prefix("a:")
            .or_else(|| wrapped.strip_prefix(':'))?,
        None => raw,
    };

    let (name, id) = inner.rsplit_once(':')?;
    let id = id.parse::<u64>().ok().and_then(Id::new_checked)?;
    let name = (!name.is_empty()).then(|| name.to_owned());

    Some(ReactionKey::Custom { id, name })
}

impl PartialEq for ReactionKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Unicode(left), Self::Unicode(right)) => left == right,
            (Self::Custom { id: left, .. }, Self::Custom { id: right, .. }) => left == right,
            _ => false,
        }
    }
}

impl Eq for ReactionKey {}

impl Hash for ReactionKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Unicode(name) => {
                0_u8.hash(state);
                name.hash(state);
            }
            Self::Custom { id, .. } => {
                1_u8.hash(state);
                id.hash(state);
            }
        }
    }
}

impl fmt::Display for ReactionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unicode(name) => f.write_str(name),
            Self::Custom {
                id,
                name: Some(name),
            } => write!(f, "<:{name}:{id}>"),
            Self::Custom { id, name: None } => write!(f, "<:_:{id}>"),
        }
    }
}

impl From<&str> for ReactionKey {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for ReactionKey {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}
