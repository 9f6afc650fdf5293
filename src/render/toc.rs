//! GitHub-flavored markdown anchors for the index.

/// Index entry linking to the heading `title`.
pub fn render_toc_item(title: &str) -> String {
    format!("* [{}](#{})", title, github_slug(title))
}

/// GitHub heading anchor slug.
///
/// Lowercase, drop everything but alphanumerics, spaces, `-` and `_`, then
/// turn spaces into hyphens.
pub fn github_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' {
            slug.push(c);
        }
    }
    slug.replace(' ', "-")
}
