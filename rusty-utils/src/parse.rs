use rusty_menu::ReactionKey;
use twilight_http::request::channel::reaction::RequestReactionType;
use twilight_model::channel::message::EmojiReactionType;

/// Parse a compact duration token like `30s`, `10m`, `2h`, `1d`, or plain seconds.
pub fn parse_duration_seconds(raw: &str) -> Option<u64> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    let mut chars = value.chars();
    let unit = chars.next_back();

    let (number_raw, multiplier) = match unit {
        Some('s') | Some('S') => (chars.as_str(), 1_u64),
        Some('m') | Some('M') => (chars.as_str(), 60_u64),
        Some('h') | Some('H') => (chars.as_str(), 60_u64 * 60),
        Some('d') | Some('D') => (chars.as_str(), 60_u64 * 60 * 24),
        Some(last) if last.is_ascii_digit() => (value, 1_u64),
        _ => return None,
    };

    let number = number_raw.parse::<u64>().ok()?;
    if number == 0 {
        return None;
    }

    number.checked_mul(multiplier)
}

/// Parse a one-based page argument.
///
/// Missing input means the first page; `0` and non-numbers are rejected.
pub fn parse_one_based_page(raw: Option<&str>) -> Option<usize> {
    match raw {
        Some(value) => value.trim().parse::<usize>().ok().filter(|page| *page >= 1),
        None => Some(1),
    }
}

/// Reaction key of an emoji delivered by the gateway.
pub fn reaction_key_from_emoji(emoji: &EmojiReactionType) -> ReactionKey {
    match emoji {
        EmojiReactionType::Custom { id, name, .. } => ReactionKey::custom(*id, name.as_deref()),
        EmojiReactionType::Unicode { name } => ReactionKey::unicode(name.as_str()),
    }
}

/// Borrow a reaction key as an HTTP reaction request.
pub fn request_reaction_type(key: &ReactionKey) -> RequestReactionType<'_> {
    match key {
        ReactionKey::Unicode(name) => RequestReactionType::Unicode { name: name.as_str() },
        ReactionKey::Custom { id, name } => RequestReactionType::Custom {
            id: *id,
            name: name.as_deref(),
        },
    }
}
