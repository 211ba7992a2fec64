pub mod utility;

use twilight_model::gateway::payload::incoming::MessageCreate;

use rusty_core::Context;
use rusty_utils::COMMAND_PREFIX;

// Global command meta data
pub struct CommandMeta {
    pub name: &'static str,
    pub desc: &'static str,
    pub category: &'static str,
    pub usage: &'static str,
}

pub const COMMANDS: &[CommandMeta] = &[
    utility::help::META,
    utility::menu::META,
    // Add new commands here
];

/// Split `!command arg rest...` into a lowercase command name and its first argument.
///
/// Returns `None` for messages without the command prefix.
fn split_command(content: &str) -> Option<(String, Option<&str>)> {
    let content = content.trim().strip_prefix(COMMAND_PREFIX)?.trim();
    let mut parts = content.split_whitespace();
    let cmd = parts.next().unwrap_or("").to_ascii_lowercase();
    Some((cmd, parts.next()))
}

pub async fn handle_message(ctx: Context, msg: Box<MessageCreate>) -> anyhow::Result<()> {
    if msg.author.bot {
        return Ok(());
    }

    let content_owned = msg.content.clone();
    let Some((cmd, arg1)) = split_command(&content_owned) else {
        return Ok(());
    };

    match cmd.as_str() {
        "help" => utility::help::run(ctx.clone(), msg).await?,
        "menu" => utility::menu::run(ctx.clone(), msg, arg1).await?,
        // Add new commands here
        _ => {}
    }

    Ok(())
}
