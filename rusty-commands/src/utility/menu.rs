use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use tracing::info;
use twilight_model::{
    gateway::payload::incoming::MessageCreate,
    id::{
        Id,
        marker::{ChannelMarker, GuildMarker, UserMarker},
    },
};

use crate::CommandMeta;
use rusty_core::Context;
use rusty_menu::{Destination, Menu, MenuAction, MenuBuilder, MenuClient, MenuPage};
use rusty_utils::{
    embed::{menu_page_embed, page_footer},
    parse::parse_one_based_page,
};

pub const META: CommandMeta = CommandMeta {
    name: "menu",
    desc: "Opens a reaction menu you can page through.",
    category: "utility",
    usage: "!menu [page|dm]",
};

const FOOTER_NOTE: &str = "React below to navigate";

/// Per-menu data reachable from callback reactions.
#[derive(Debug, Default)]
pub struct DemoStats {
    pub cheers: AtomicUsize,
}

/// Open the demo menu for the invoking user.
///
/// `!menu 3` starts on the third page; `!menu dm` sends it by direct message.
pub async fn run(ctx: Context, msg: Box<MessageCreate>, arg1: Option<&str>) -> anyhow::Result<()> {
    let http = &ctx.http;
    let direct = arg1.is_some_and(|arg| arg.eq_ignore_ascii_case("dm"));
    let page_arg = if direct { None } else { arg1 };

    let pages = demo_pages()?;
    let total = pages.len();

    let Some(requested_page) = parse_one_based_page(page_arg) else {
        let usage = format!("Usage: `{}` (page starts at 1)", META.usage);
        http.create_message(msg.channel_id).content(&usage).await?;
        return Ok(());
    };

    if requested_page > total {
        let out = format!("Page {requested_page} does not exist. Available pages: 1-{total}.");
        http.create_message(msg.channel_id).content(&out).await?;
        return Ok(());
    }

    let destination = destination_for(msg.guild_id, msg.channel_id, msg.author.id, direct);
    let client: Arc<dyn MenuClient> = ctx.menus.clone();
    let menu = MenuBuilder::with_data(client, destination, msg.author.id, DemoStats::default())
        .options(ctx.config.menu.clone())
        .pages(pages)
        .build()
        .await?;

    let user_id = msg.author.id;
    menu.on_page_changed(move |event| {
        info!(%user_id, page = event.page.name(), "demo menu page shown");
    });

    menu.set_page(requested_page - 1).await?;

    Ok(())
}

/// Guild messages open the menu in place unless `dm` asked for the author's DMs.
fn destination_for(
    guild_id: Option<Id<GuildMarker>>,
    channel_id: Id<ChannelMarker>,
    author_id: Id<UserMarker>,
    direct: bool,
) -> Destination {
    match guild_id {
        Some(_) if direct => Destination::User(author_id),
        Some(_) => Destination::Channel(channel_id),
        None => Destination::Direct(channel_id),
    }
}

const DEMO_PAGE_COUNT: usize = 4;

fn demo_page(index: usize, name: &str, title: &str, body: &str) -> anyhow::Result<MenuPage<DemoStats>> {
    let footer = page_footer(index + 1, DEMO_PAGE_COUNT, Some(FOOTER_NOTE));
    Ok(MenuPage::new(name, menu_page_embed(title, body, &footer)?))
}

fn demo_pages() -> anyhow::Result<Vec<MenuPage<DemoStats>>> {
    let overview = demo_page(
        0,
        "overview",
        "Overview",
        "This message is a reaction menu.\n\n▶ next page\n⏭ last page\n❓ how it works\n⏹ stop listening",
    )?;
    let navigation = demo_page(
        1,
        "navigation",
        "Navigation",
        "◀ and ▶ move one page at a time and do nothing at either end.\n\n🎉 cheers and jumps ahead",
    )?;
    let extras = demo_page(
        2,
        "extras",
        "Extras",
        "⏮ back to the start\n🗑 deletes this menu\n\nThe menu stops on its own after a while without reactions.",
    )?;
    let help = demo_page(
        3,
        "help",
        "How it works",
        "Only the person who opened the menu can drive it; other reactions are removed.\n\n↩ back to the overview",
    )?;

    Ok(vec![
        overview
            .reaction("▶", MenuAction::Next)
            .reaction("⏭", MenuAction::Last)
            .reaction("❓", MenuAction::page("help"))
            .reaction("⏹", MenuAction::Stop),
        navigation
            .reaction("◀", MenuAction::Previous)
            .reaction("▶", MenuAction::Next)
            .reaction(
                "🎉",
                MenuAction::callback(|menu: Menu<DemoStats>| async move {
                    let cheers = menu.data().cheers.fetch_add(1, Ordering::Relaxed) + 1;
                    info!(user_id = %menu.user_id(), cheers, "demo menu cheered");
                    menu.set_page("extras").await
                }),
            ),
        extras
            .reaction("⏮", MenuAction::First)
            .reaction("◀", MenuAction::Previous)
            .reaction("🗑", MenuAction::Delete),
        help.reaction("↩", MenuAction::page("overview")),
    ])
}
