//! Twilight glue for reaction menus: the HTTP-backed `MenuClient`, the
//! gateway reaction hub, and small helpers shared by commands.

/// Single source of truth for the message-command prefix.
pub const COMMAND_PREFIX: char = '!';
/// Generic embed builders shared across commands.
pub mod embed;
/// `MenuClient` implementation over the Discord HTTP API.
pub mod menu_client;
/// Pure parser helpers.
pub mod parse;
/// Permission resolution for guild channels.
pub mod permissions;
/// Gateway reaction fan-out.
pub mod reactions;

pub use menu_client::TwilightMenuClient;
pub use reactions::ReactionHub;
