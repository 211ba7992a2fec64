use twilight_model::channel::message::embed::Embed;
use twilight_util::builder::embed::{EmbedBuilder, EmbedFooterBuilder};

/// Default embed color used across the bot UI.
pub const DEFAULT_EMBED_COLOR: u32 = 0x90_54_30;

/// Footer text for page `page` of `total_pages`, with an optional note appended.
///
/// Single-page menus only show the note.
pub fn page_footer(page: usize, total_pages: usize, note: Option<&str>) -> String {
    let page = page.max(1);
    let total_pages = total_pages.max(1);
    let note = note.filter(|note| !note.is_empty());

    match (total_pages > 1, note) {
        (true, Some(note)) => format!("Page {page}/{total_pages} • {note}"),
        (true, None) => format!("Page {page}/{total_pages}"),
        (false, Some(note)) => note.to_owned(),
        (false, None) => String::new(),
    }
}

/// Build a menu page embed with the bot's standard styling.
pub fn menu_page_embed(
    title: &str,
    description: impl Into<String>,
    footer: &str,
) -> anyhow::Result<Embed> {
    let builder = EmbedBuilder::new()
        .title(title)
        .color(DEFAULT_EMBED_COLOR)
        .description(description);

    let embed = if footer.is_empty() {
        builder.validate()?.build()
    } else {
        let footer = EmbedFooterBuilder::new(footer).build();
        builder.footer(footer).validate()?.build()
    };

    Ok(embed)
}
