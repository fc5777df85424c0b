//! Markdown rendering.
//!
//! The tree builder only needs "Markdown in, HTML out". The trait keeps the
//! renderer swappable; [`MarkdownRenderer`] is the pulldown-cmark default.
//! Bare `http(s)://` and `www.` URLs in text are turned into links.

use once_cell::sync::Lazy;
use pulldown_cmark::{
    html, CowStr, Event, LinkType, Options, Parser, Tag, TagEnd, TextMergeStream,
};
use regex::Regex;

/// Bare URL in running text. Trailing punctuation stays outside the link.
static BARE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:https?://|www\.)[^\s<>]*[^\s<>.,:;"')\]!?]"#)
        .expect("valid bare URL pattern")
});

/// Renders document source into an HTML fragment.
pub trait Renderer: Send + Sync {
    fn render(&self, markdown: &str) -> String;
}

/// CommonMark renderer with the usual GitHub-style extensions.
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    options: Options,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_SMART_PUNCTUATION);
        Self { options }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for MarkdownRenderer {
    fn render(&self, markdown: &str) -> String {
        let parser = TextMergeStream::new(Parser::new_ext(markdown, self.options));
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, linkify(parser).into_iter());
        out
    }
}

/// Replace bare URLs in text events with autolinks. Text inside links and
/// code blocks is left alone.
fn linkify<'a>(events: impl Iterator<Item = Event<'a>>) -> Vec<Event<'a>> {
    let mut out = Vec::new();
    let mut link_depth = 0usize;
    let mut in_code_block = false;

    for event in events {
        match event {
            Event::Start(Tag::Link { .. }) => link_depth += 1,
            Event::End(TagEnd::Link) => link_depth = link_depth.saturating_sub(1),
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => in_code_block = false,
            Event::Text(ref text) if link_depth == 0 && !in_code_block => {
                if BARE_URL.is_match(text) {
                    split_urls(text, &mut out);
                    continue;
                }
            }
            _ => {}
        }
        out.push(event);
    }
    out
}

fn split_urls<'a>(text: &str, out: &mut Vec<Event<'a>>) {
    let mut cursor = 0;
    for found in BARE_URL.find_iter(text) {
        if found.start() > cursor {
            out.push(Event::Text(CowStr::from(text[cursor..found.start()].to_string())));
        }
        let shown = found.as_str();
        let dest = if shown.starts_with("www.") {
            format!("http://{}", shown)
        } else {
            shown.to_string()
        };
        out.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: CowStr::from(dest),
            title: CowStr::Borrowed(""),
            id: CowStr::Borrowed(""),
        }));
        out.push(Event::Text(CowStr::from(shown.to_string())));
        out.push(Event::End(TagEnd::Link));
        cursor = found.end();
    }
    if cursor < text.len() {
        out.push(Event::Text(CowStr::from(text[cursor..].to_string())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_heading_and_emphasis() {
        let html = MarkdownRenderer::new().render("# Title\n\nSome *text*.");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<em>text</em>"));
    }

    #[test]
    fn test_render_table() {
        let html = MarkdownRenderer::new().render("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn test_render_smart_punctuation() {
        let html = MarkdownRenderer::new().render("\"quoted\" -- dash");
        assert!(html.contains('\u{201c}'));
        assert!(html.contains('\u{2013}'));
    }

    #[test]
    fn test_bare_urls_become_links() {
        let html = MarkdownRenderer::new()
            .render("See https://example.com/docs. Or www.rust-lang.org!");
        assert!(html.contains(r#"<a href="https://example.com/docs">https://example.com/docs</a>."#));
        assert!(html.contains(r#"<a href="http://www.rust-lang.org">www.rust-lang.org</a>!"#));
    }

    #[test]
    fn test_existing_links_and_code_untouched() {
        let html = MarkdownRenderer::new()
            .render("[docs](https://example.com)\n\n<https://a.example>\n\n```\nhttps://in.code\n```\n\n`https://in.span`");
        assert_eq!(html.matches("<a href").count(), 2);
        assert!(html.contains(r#"<a href="https://example.com">docs</a>"#));
        assert!(html.contains("https://in.code"));
        assert!(html.contains("<code>https://in.span</code>"));
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(MarkdownRenderer::new().render(""), "");
    }
}
