//! Markdown preview rendering

use pulldown_cmark::{html, Options, Parser};

/// Render document text as HTML with the GitHub-flavoured extensions the
/// editor preview supports: tables, strikethrough and task lists.
pub fn render_markdown(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(text, options);
    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
