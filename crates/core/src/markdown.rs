//! Markdown rendering for source descriptions.

use pulldown_cmark::{html, Options, Parser};

/// Render a description to HTML. `None` renders as an empty string.
///
/// Raw HTML in the input is passed through unchanged; callers that embed the
/// result in a page must sanitize it.
pub fn render_markdown(text: Option<&str>) -> String {
    let Some(text) = text else {
        return String::new();
    };
    let parser = Parser::new_ext(text, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH);
    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_empty() {
        assert_eq!(render_markdown(None), "");
    }

    #[test]
    fn renders_basic_markup() {
        let html = render_markdown(Some("**Orders** by _region_"));
        assert_eq!(html, "<p><strong>Orders</strong> by <em>region</em></p>\n");
    }

    #[test]
    fn renders_tables() {
        let html = render_markdown(Some("| a | b |\n|---|---|\n| 1 | 2 |\n"));
        assert!(html.contains("<table>"));
    }
}
