use std::{collections::HashSet, fmt::Write as _, sync::OnceLock};

use log::warn;
use maud::{html, Markup, PreEscaped};
use pulldown_cmark::{html as cmark_html, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use regex::{Captures, Regex};
use serde::Serialize;
use syntect::{
    html::{ClassStyle, ClassedHTMLGenerator},
    parsing::SyntaxSet,
    util::LinesWithEndings,
};

const TOC_MARKER: &str = "[TOC]";
const TOC_MAX_LEVEL: u8 = 5;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub(crate) struct Heading {
    pub level: u8,
    pub text: String,
    pub anchor: String,
}

#[derive(Serialize, Debug, Clone)]
pub(crate) struct Rendered {
    pub html: String,
    pub headings: Vec<Heading>,
}

fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    options
}

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(two_face::syntax::extra_newlines)
}

fn fragment_link() -> &'static Regex {
    static FRAGMENT_LINK: OnceLock<Regex> = OnceLock::new();
    FRAGMENT_LINK.get_or_init(|| Regex::new(r##"href="#([^"]+)""##).unwrap())
}

fn escape(text: &str) -> String {
    html! { (text) }.into_string()
}

/// Renders one article. `page_path` is the route the HTML will be served at;
/// in-page links are resolved against it.
pub(crate) fn render(source: &str, page_path: &str) -> Rendered {
    let mut events: Vec<Event> = Parser::new_ext(source, options()).collect();
    let headings = assign_anchors(&mut events);
    let events = rewrite(events, &headings);

    let mut body = String::new();
    cmark_html::push_html(&mut body, events.into_iter());

    Rendered {
        html: qualify_fragment_links(&body, page_path),
        headings,
    }
}

/// Same rules as `encodeURIComponent` over the trimmed, lower-cased text.
pub(crate) fn slugify(text: &str) -> String {
    let dashed = text
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");

    let mut slug = String::with_capacity(dashed.len());
    for byte in dashed.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => slug.push(byte as char),
            _ => {
                let _ = write!(slug, "%{byte:02X}");
            }
        }
    }
    slug
}

fn unique_anchor(slug: String, used: &HashSet<String>) -> String {
    let mut candidate = slug.clone();
    let mut n = 0;
    while used.contains(&candidate) {
        n += 1;
        candidate = format!("{slug}-{n}");
    }
    candidate
}

fn assign_anchors(events: &mut [Event]) -> Vec<Heading> {
    let mut used = HashSet::new();
    let mut headings = vec![];
    let mut open: Option<(usize, String)> = None;

    for idx in 0..events.len() {
        let closed_level = match &events[idx] {
            Event::Start(Tag::Heading { .. }) => {
                open = Some((idx, String::new()));
                None
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, buf)) = open.as_mut() {
                    buf.push_str(text);
                }
                None
            }
            Event::End(TagEnd::Heading(level)) => Some(*level as u8),
            _ => None,
        };

        let Some(level) = closed_level else {
            continue;
        };
        let Some((start, text)) = open.take() else {
            continue;
        };
        if let Event::Start(Tag::Heading { id, .. }) = &mut events[start] {
            let anchor = match id {
                Some(explicit) => explicit.to_string(),
                None => unique_anchor(slugify(&text), &used),
            };
            used.insert(anchor.clone());
            *id = Some(anchor.clone().into());
            headings.push(Heading {
                level,
                text: text.trim().to_string(),
                anchor,
            });
        }
    }

    headings
}

fn is_toc_marker(inner: &[Event]) -> bool {
    let mut text = String::new();
    for event in inner {
        match event {
            Event::Text(t) => text.push_str(t),
            _ => return false,
        }
    }
    text.trim().eq_ignore_ascii_case(TOC_MARKER)
}

fn inline_code(event: Event) -> Event {
    match event {
        Event::Code(code) => Event::InlineHtml(
            format!("<code class=\"hljs-keyword\">{}</code>", escape(&code)).into(),
        ),
        _ => event,
    }
}

fn rewrite<'a>(events: Vec<Event<'a>>, headings: &[Heading]) -> Vec<Event<'a>> {
    let mut out = Vec::with_capacity(events.len());
    let mut iter = events.into_iter();

    while let Some(event) = iter.next() {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().unwrap_or_default().to_string()
                    }
                    CodeBlockKind::Indented => String::new(),
                };
                let mut code = String::new();
                for inner in iter.by_ref() {
                    match inner {
                        Event::End(TagEnd::CodeBlock) => break,
                        Event::Text(text) => code.push_str(&text),
                        _ => {}
                    }
                }
                out.push(Event::Html(code_block(&code, &lang).into()));
            }
            Event::Start(Tag::Paragraph) => {
                let mut inner = vec![];
                for e in iter.by_ref() {
                    if matches!(e, Event::End(TagEnd::Paragraph)) {
                        break;
                    }
                    inner.push(e);
                }
                if is_toc_marker(&inner) {
                    out.push(Event::Html(table_of_contents(headings).into()));
                } else {
                    out.push(Event::Start(Tag::Paragraph));
                    out.extend(inner.into_iter().map(inline_code));
                    out.push(Event::End(TagEnd::Paragraph));
                }
            }
            other => out.push(inline_code(other)),
        }
    }

    out
}

/// Highlights `code` as `lang`. Unknown languages come back escaped.
pub(crate) fn highlight(code: &str, lang: &str) -> String {
    let ss = syntax_set();
    let Some(syntax) = Some(lang)
        .filter(|l| !l.is_empty())
        .and_then(|l| ss.find_syntax_by_token(l))
    else {
        return escape(code);
    };

    let mut generator = ClassedHTMLGenerator::new_with_class_style(
        syntax,
        ss,
        ClassStyle::SpacedPrefixed { prefix: "hljs-" },
    );
    for line in LinesWithEndings::from(code) {
        if let Err(e) = generator.parse_html_for_line_which_includes_newline(line) {
            warn!("Failed to highlight {lang} block: {e}");
            return escape(code);
        }
    }
    generator.finalize()
}

fn code_block(code: &str, lang: &str) -> String {
    let class = (!lang.is_empty()).then(|| format!("language-{lang}"));
    html! {
        pre { code class=[class] { (PreEscaped(highlight(code, lang))) } }
    }
    .into_string()
        + "\n"
}

struct TocEntry<'a> {
    heading: &'a Heading,
    children: Vec<TocEntry<'a>>,
}

// each heading owns the following deeper headings.
fn nest<'a>(items: &[&'a Heading]) -> Vec<TocEntry<'a>> {
    let mut entries = vec![];
    let mut rest = items;
    while let Some((first, tail)) = rest.split_first() {
        let end = tail
            .iter()
            .position(|h| h.level <= first.level)
            .unwrap_or(tail.len());
        entries.push(TocEntry {
            heading: first,
            children: nest(&tail[..end]),
        });
        rest = &tail[end..];
    }
    entries
}

fn toc_list(entries: &[TocEntry]) -> Markup {
    html! {
        ul {
            @for entry in entries {
                li {
                    a href={ "#" (entry.heading.anchor) } { (entry.heading.text) }
                    @if !entry.children.is_empty() {
                        (toc_list(&entry.children))
                    }
                }
            }
        }
    }
}

fn table_of_contents(headings: &[Heading]) -> String {
    let included: Vec<&Heading> = headings
        .iter()
        .filter(|h| h.level <= TOC_MAX_LEVEL)
        .collect();
    html! {
        div.table-of-contents { (toc_list(&nest(&included))) }
    }
    .into_string()
        + "\n"
}

fn qualify_fragment_links(html: &str, page_path: &str) -> String {
    fragment_link()
        .replace_all(html, |caps: &Captures| {
            format!("href=\"{}#{}\"", page_path, &caps[1])
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    use indoc::indoc;
    use pretty_assertions::assert_eq;

    const PAGE: &str = "/en/article/demo/";

    #[test]
    fn slugs_follow_uri_component_rules() {
        assert_eq!(slugify("  Hello   World "), "hello-world");
        assert_eq!(slugify("What's (new)?"), "what's-(new)%3F");
        assert_eq!(slugify("Introducción"), "introducci%C3%B3n");
    }

    #[test]
    fn headings_get_unique_anchors() {
        let rendered = render(
            indoc! {"
                # Hello World

                ## Hello World

                ## Setup {#install}
            "},
            PAGE,
        );
        let anchors: Vec<&str> = rendered.headings.iter().map(|h| h.anchor.as_str()).collect();
        assert_eq!(anchors, vec!["hello-world", "hello-world-1", "install"]);
        assert!(rendered.html.contains(r#"<h1 id="hello-world">Hello World</h1>"#));
        assert!(rendered.html.contains(r#"<h2 id="install">Setup</h2>"#));
    }

    #[test]
    fn toc_marker_becomes_nested_list() {
        let rendered = render(
            indoc! {"
                [TOC]

                # Intro

                ## Details

                ###### Too deep

                # Outro
            "},
            PAGE,
        );
        let expected = concat!(
            r#"<div class="table-of-contents"><ul>"#,
            r#"<li><a href="/en/article/demo/#intro">Intro</a>"#,
            r#"<ul><li><a href="/en/article/demo/#details">Details</a></li></ul></li>"#,
            r#"<li><a href="/en/article/demo/#outro">Outro</a></li>"#,
            r#"</ul></div>"#,
        );
        assert!(rendered.html.contains(expected), "{}", rendered.html);
        assert!(!rendered.html.contains("[TOC]"));
        assert_eq!(rendered.headings.len(), 4);
    }

    #[test]
    fn marker_inside_text_is_left_alone() {
        let rendered = render("see [TOC] below\n", PAGE);
        assert!(rendered.html.contains("see [TOC] below"));
        assert!(!rendered.html.contains("table-of-contents"));
    }

    #[test]
    fn code_blocks_are_highlighted() {
        let rendered = render(
            indoc! {"
                ```rust
                fn main() {}
                ```
            "},
            PAGE,
        );
        assert!(rendered.html.contains(r#"<pre><code class="language-rust">"#));
        assert!(rendered.html.contains("hljs-source hljs-rust"));
    }

    #[test]
    fn typescript_blocks_are_highlighted() {
        for lang in ["typescript", "ts"] {
            let html = highlight("const a: number = 1;\n", lang);
            assert!(html.contains(r#"class="hljs-source"#), "{lang}: {html}");
            assert!(!html.starts_with("const a"), "{lang}: {html}");
        }
    }

    #[test]
    fn unknown_language_is_escaped() {
        let rendered = render(
            indoc! {"
                ```nosuchlang
                a < b
                ```
            "},
            PAGE,
        );
        assert!(rendered
            .html
            .contains(r#"<code class="language-nosuchlang">a &lt; b"#));
        assert!(!rendered.html.contains("hljs-source"));
    }

    #[test]
    fn inline_code_is_keyword_styled() {
        let rendered = render("use `a < b` here\n", PAGE);
        assert_eq!(
            rendered.html,
            "<p>use <code class=\"hljs-keyword\">a &lt; b</code> here</p>\n"
        );
    }

    #[test]
    fn fragment_links_resolve_against_page() {
        let rendered = render("[jump](#later) and [out](https://example.com)\n", PAGE);
        assert!(rendered.html.contains(r#"href="/en/article/demo/#later""#));
        assert!(rendered.html.contains(r#"href="https://example.com""#));
    }

    #[test]
    fn task_lists_and_tables() {
        let rendered = render(
            indoc! {"
                - [x] done
                - [ ] todo

                | a | b |
                |---|---|
                | 1 | 2 |
            "},
            PAGE,
        );
        assert!(rendered.html.contains(r#"type="checkbox""#));
        assert!(rendered.html.contains("<table>"));
    }
}
