//! SVG preview cards.
//!
//! A card shows the source name, its type and bound dataset and the first
//! lines of the description. Output depends only on fields that feed the
//! source digest, so an unchanged digest means an unchanged card.

use sources_db::models::source::Source;

pub const CONTENT_TYPE: &str = "image/svg+xml";

const WIDTH: u32 = 400;
const HEIGHT: u32 = 225;
const MAX_NAME_CHARS: usize = 40;
const MAX_LINE_CHARS: usize = 56;
const MAX_DESCRIPTION_LINES: usize = 3;

/// Render the preview card for `source`.
pub fn render_card(source: &Source) -> Vec<u8> {
    let name = source
        .source_name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or("Untitled source");

    let kind = match (&source.source_type, &source.datasource_type, source.datasource_id) {
        (Some(t), Some(ds), Some(id)) => format!("{t} \u{00b7} {ds} #{id}"),
        (Some(t), _, _) => t.clone(),
        (None, Some(ds), Some(id)) => format!("{ds} #{id}"),
        _ => String::new(),
    };

    let mut svg = String::with_capacity(1024);
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH}\" height=\"{HEIGHT}\" \
         viewBox=\"0 0 {WIDTH} {HEIGHT}\">"
    ));
    svg.push_str(&format!(
        "<rect width=\"{WIDTH}\" height=\"{HEIGHT}\" rx=\"8\" fill=\"#f7f8fa\" stroke=\"#d0d5dd\"/>"
    ));
    svg.push_str(&text_line(20, 40, 20, "600", "#101828", &truncate(name, MAX_NAME_CHARS)));
    if !kind.is_empty() {
        svg.push_str(&text_line(20, 64, 12, "400", "#667085", &truncate(&kind, MAX_LINE_CHARS)));
    }

    let description = source.description.as_deref().unwrap_or_default();
    for (i, line) in wrap(description, MAX_LINE_CHARS)
        .into_iter()
        .take(MAX_DESCRIPTION_LINES)
        .enumerate()
    {
        let y = 100 + (i as u32) * 20;
        svg.push_str(&text_line(20, y, 13, "400", "#344054", &line));
    }

    let footer = format!("Source #{}", source.id);
    svg.push_str(&text_line(20, HEIGHT - 20, 11, "400", "#98a2b3", &footer));
    svg.push_str("</svg>");
    svg.into_bytes()
}

fn text_line(x: u32, y: u32, size: u32, weight: &str, fill: &str, text: &str) -> String {
    format!(
        "<text x=\"{x}\" y=\"{y}\" font-family=\"sans-serif\" font-size=\"{size}\" \
         font-weight=\"{weight}\" fill=\"{fill}\">{}</text>",
        escape_xml(text)
    )
}

/// Escape the five XML special characters.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if c.is_control() => out.push(' '),
            c => out.push(c),
        }
    }
    out
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars - 1).collect();
    out.push('\u{2026}');
    out
}

/// Greedy word wrap. Words longer than a line are truncated.
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let word = truncate(word, max_chars);
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
