//! Raw wiki page records → entities.
//!
//! [`crate::parser::wiki`] only pulls text out of the HTML; everything that
//! decides what the text means lives here so it can be tested without markup.

use crate::error::{Error, Result};
use crate::model::*;
use regex::Regex;
use std::sync::LazyLock;

/// `type[?] [: Mixin] [= default] [- description]`
static RE_DEFINITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)^(?P<ty>[A-Za-z_][\w.\[\]]*)(?P<nil>\?)?(?:\s*:\s*(?P<mixin>[A-Za-z_][\w.]*))?(?:\s*=\s*(?P<default>"[^"]*"|\S+))?(?:\s*-\s*(?P<desc>.*))?$"#,
    )
    .unwrap()
});

static RE_EVENT_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9_]*$").unwrap());

/// Text extracted from one cached wiki article.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WikiPage {
    pub title: Option<String>,
    pub description: Option<String>,
    pub sections: Vec<WikiSection>,
}

/// One `<h2>` section with its definition-list entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WikiSection {
    pub heading: String,
    /// `(term, definition)` pairs in page order.
    pub entries: Vec<(String, String)>,
}

impl WikiPage {
    fn section(&self, headings: &[&str]) -> Option<&WikiSection> {
        self.sections
            .iter()
            .find(|s| headings.iter().any(|h| s.heading.eq_ignore_ascii_case(h)))
    }

    fn signatures(&self, headings: &[&str]) -> Vec<VariableSignature> {
        self.section(headings)
            .map(|s| s.entries.iter().map(|(dt, dd)| definition(dt, dd)).collect())
            .unwrap_or_default()
    }
}

/// Turn an extracted page into a one-entity collection tagged with `release`.
pub fn page(page: &WikiPage, release: &semver::Version) -> Result<ApiCollection> {
    let title = page
        .title
        .as_deref()
        .map(|t| t.trim().trim_start_matches("API ").trim())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::missing("page", "title", "wiki page"))?;
    let version = Version::Point(release.clone());
    let mut collection = ApiCollection::new();

    if RE_EVENT_TITLE.is_match(title) {
        let event = ApiEvent::new(event_name(title), title, None, version)
            .with_description(page.description.clone())
            .with_payload(page.signatures(&["Payload"]));
        collection.add_event(event);
    } else {
        let (ns, name) = match title.rsplit_once('.') {
            Some((ns, name)) => (Some(ns), name),
            None => (None, title),
        };
        let events = page
            .section(&["Triggers", "Events"])
            .map(|s| {
                s.entries
                    .iter()
                    .map(|(dt, dd)| EventRef {
                        name: first_word(dt).to_string(),
                        description: dd.trim().to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        let function = ApiFunction::new(name, ns, version)
            .with_description(page.description.clone())
            .with_parameters(page.signatures(&["Arguments", "Parameters"]))
            .with_returns(page.signatures(&["Returns"]))
            .with_events(events);
        collection.add_function(function);
    }
    Ok(collection)
}

/// `CHAT_MSG_SAY` → `ChatMsgSay`.
pub fn event_name(literal: &str) -> String {
    literal
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let lower = part.to_ascii_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Build a signature from a `<dt>` name and its `<dd>` definition text.
pub fn definition(term: &str, text: &str) -> VariableSignature {
    let name = first_word(term);
    let text = text.trim();
    let Some(caps) = RE_DEFINITION.captures(text) else {
        return VariableSignature::new(name, "unknown").with_description(text);
    };

    let mut sig = VariableSignature::new(name, &caps["ty"]).nilable(caps.name("nil").is_some());
    sig.mixin = caps.name("mixin").map(|m| m.as_str().to_string());
    sig.default = caps.name("default").map(|m| literal(m.as_str()));
    if let Some(desc) = caps.name("desc") {
        sig.description = desc.as_str().trim().to_string();
    }
    sig
}

fn literal(text: &str) -> Literal {
    match text {
        "true" => Literal::Bool(true),
        "false" => Literal::Bool(false),
        _ => {
            if let Some(s) = text.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
                Literal::Str(s.to_string())
            } else if let Ok(i) = text.parse::<i64>() {
                Literal::Int(i)
            } else if let Ok(n) = text.parse::<f64>() {
                Literal::Number(n)
            } else {
                Literal::Str(text.to_string())
            }
        }
    }
}

fn first_word(text: &str) -> &str {
    text.split_whitespace().next().unwrap_or("")
}
