//! Text extraction from cached wiki articles.

use crate::error::Result;
use crate::model::ApiCollection;
use crate::parser::normalize::{self, WikiPage, WikiSection};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static SEL_HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1#firstHeading").unwrap());
static SEL_TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static SEL_CONTENT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.mw-parser-output").unwrap());
static SEL_H2: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h2").unwrap());

/// Parse a cached article into a collection tagged with `release`.
pub fn parse(html: &str, release: &semver::Version) -> Result<ApiCollection> {
    normalize::page(&extract(html), release)
}

/// Pull the title, lead paragraph and definition-list sections out of a page.
pub fn extract(html: &str) -> WikiPage {
    let document = Html::parse_document(html);
    let mut page = WikiPage {
        title: title(&document),
        ..Default::default()
    };

    let Some(content) = document.select(&SEL_CONTENT).next() else {
        return page;
    };

    let mut current: Option<WikiSection> = None;
    for child in content.children().filter_map(ElementRef::wrap) {
        if let Some(heading) = section_heading(child) {
            page.sections.extend(current.take());
            current = Some(WikiSection {
                heading,
                entries: Vec::new(),
            });
            continue;
        }
        match (child.value().name(), current.as_mut()) {
            ("p", None) if page.description.is_none() => {
                let text = text_of(child);
                if !text.is_empty() {
                    page.description = Some(text);
                }
            }
            ("dl", Some(section)) => section.entries.extend(definitions(child)),
            _ => {}
        }
    }
    page.sections.extend(current);
    page
}

fn title(document: &Html) -> Option<String> {
    if let Some(h1) = document.select(&SEL_HEADING).next() {
        return Some(text_of(h1));
    }
    // "<title>API GetTime - Some Wiki</title>"
    document.select(&SEL_TITLE).next().map(|t| {
        let text = text_of(t);
        match text.split_once(" - ") {
            Some((head, _)) => head.to_string(),
            None => text,
        }
    })
}

/// Heading text for a bare `<h2>` or a `<div class="mw-heading">` wrapping one.
fn section_heading(element: ElementRef) -> Option<String> {
    let h2 = if element.value().name() == "h2" {
        element
    } else if element.value().name() == "div" {
        element.select(&SEL_H2).next()?
    } else {
        return None;
    };
    Some(text_of(h2).replace("[edit]", "").trim().to_string())
}

/// `<dt>`/`<dd>` pairs of a definition list, in order. A term without a
/// definition gets an empty one.
fn definitions(dl: ElementRef) -> Vec<(String, String)> {
    let mut entries: Vec<(String, String)> = Vec::new();
    let mut pending: Option<String> = None;
    for item in dl.children().filter_map(ElementRef::wrap) {
        match item.value().name() {
            "dt" => {
                entries.extend(pending.take().map(|dt| (dt, String::new())));
                pending = Some(text_of(item));
            }
            "dd" => {
                if let Some(dt) = pending.take() {
                    entries.push((dt, text_of(item)));
                }
            }
            _ => {}
        }
    }
    entries.extend(pending.map(|dt| (dt, String::new())));
    entries
}

/// Whitespace-collapsed text content.
fn text_of(element: ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const FUNCTION_PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>API C_ChatInfo.GetChannelName - Wiki</title></head>
<body>
<h1 id="firstHeading">API C_ChatInfo.GetChannelName</h1>
<div class="mw-parser-output">
<p>Returns the name of a chat channel.</p>
<p>Second paragraph.</p>
<h2><span class="mw-headline">Arguments</span><span class="mw-editsection">[edit]</span></h2>
<dl><dt>channelIndex</dt><dd>number - 1-based index</dd></dl>
<div class="mw-heading mw-heading2"><h2>Returns</h2></div>
<dl>
  <dt>name</dt><dd>string?</dd>
  <dt>orphan</dt>
</dl>
</div>
</body></html>"#;

    #[test]
    fn extracts_function_page() {
        let page = extract(FUNCTION_PAGE);
        assert_eq!(page.title.as_deref(), Some("API C_ChatInfo.GetChannelName"));
        assert_eq!(
            page.description.as_deref(),
            Some("Returns the name of a chat channel.")
        );
        assert_eq!(page.sections.len(), 2);
        assert_eq!(page.sections[0].heading, "Arguments");
        assert_eq!(
            page.sections[0].entries,
            vec![("channelIndex".to_string(), "number - 1-based index".to_string())]
        );
        assert_eq!(page.sections[1].heading, "Returns");
        assert_eq!(page.sections[1].entries.len(), 2);
        assert_eq!(page.sections[1].entries[1].1, "");
    }

    #[test]
    fn title_tag_fallback() {
        let page = extract("<html><head><title>API GetTime - Wiki</title></head><body></body></html>");
        assert_eq!(page.title.as_deref(), Some("API GetTime"));
        assert!(page.sections.is_empty());
    }

    #[test]
    fn parses_into_collection() {
        let c = parse(FUNCTION_PAGE, &semver::Version::new(11, 0, 2)).unwrap();
        let f = &c.functions[0];
        assert_eq!(f.qualified_name(), "C_ChatInfo.GetChannelName");
        assert_eq!(f.parameters[0].description, "1-based index");
        assert!(f.returns[0].nilable);
    }

    #[test]
    fn untitled_page_fails() {
        assert!(parse("<html><body><p>nothing</p></body></html>", &semver::Version::new(1, 0, 0)).is_err());
    }
}
