//! HTML parser for extracting post links from the listing page
//!
//! Every anchor matching the configured selector becomes a candidate, in
//! document order. Titles are sanitised before they are embedded into an
//! HTML-formatted message.

use crate::RelayError;
use scraper::{ElementRef, Html, Selector};

/// A post link found on one fetch of the listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLink {
    /// Absolute post URL
    pub url: String,

    /// Visible anchor text with `<` and `>` removed
    pub title: String,
}

/// Extracts post links from the listing page
///
/// # Arguments
///
/// * `html` - The page content
/// * `base_url` - Prefix joined with each relative href
/// * `selector` - CSS selector identifying subject anchors (e.g. `a.a_subject`)
///
/// # Returns
///
/// * `Ok(Vec<CandidateLink>)` - Candidates in document order, possibly empty
/// * `Err(RelayError)` - The selector itself is invalid
///
/// # Example
///
/// ```
/// use forum_relay::relay::extract_links;
///
/// let html = r#"<a class="a_subject" href="t-1-1">Hello</a>"#;
/// let links = extract_links(html, "http://muchong.com/", "a.a_subject").unwrap();
/// assert_eq!(links[0].url, "http://muchong.com/t-1-1");
/// assert_eq!(links[0].title, "Hello");
/// ```
pub fn extract_links(
    html: &str,
    base_url: &str,
    selector: &str,
) -> Result<Vec<CandidateLink>, RelayError> {
    let selector = parse_selector(selector)?;
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    for element in document.select(&selector) {
        push_candidate(element, base_url, &mut links);
    }

    Ok(links)
}

/// Restricts extraction to listing rows carrying a given type tag
#[derive(Debug, Clone, Copy)]
pub struct TypeFilter<'a> {
    /// Selector for one listing row
    pub row_selector: &'a str,

    /// Selector for the type tag inside a row
    pub tag_selector: &'a str,

    /// Text the row's tag must contain
    pub text: &'a str,
}

/// Extracts post links from rows whose type tag contains `filter.text`
///
/// A row's tag text is the concatenated text of every tag element in it.
/// Rows without a matching tag are skipped, and so are subject anchors
/// outside any row.
pub fn extract_tagged_links(
    html: &str,
    base_url: &str,
    selector: &str,
    filter: &TypeFilter<'_>,
) -> Result<Vec<CandidateLink>, RelayError> {
    let link_selector = parse_selector(selector)?;
    let row_selector = parse_selector(filter.row_selector)?;
    let tag_selector = parse_selector(filter.tag_selector)?;

    let document = Html::parse_document(html);
    let mut links = Vec::new();

    for row in document.select(&row_selector) {
        let tag: String = row.select(&tag_selector).flat_map(|e| e.text()).collect();
        if !tag.contains(filter.text) {
            tracing::trace!("Skipping row tagged '{}'", tag.trim());
            continue;
        }

        for element in row.select(&link_selector) {
            push_candidate(element, base_url, &mut links);
        }
    }

    Ok(links)
}

fn parse_selector(selector: &str) -> Result<Selector, RelayError> {
    Selector::parse(selector).map_err(|e| RelayError::Selector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

fn push_candidate(element: ElementRef<'_>, base_url: &str, links: &mut Vec<CandidateLink>) {
    let href = match element.value().attr("href").map(str::trim) {
        Some(href) if !href.is_empty() => href,
        _ => {
            tracing::debug!("Skipping subject anchor without href");
            return;
        }
    };

    let text: String = element.text().collect();
    links.push(CandidateLink {
        url: resolve_post_url(base_url, href),
        title: sanitize_title(&text),
    });
}

/// Joins a post href onto the base URL
///
/// Relative hrefs are appended verbatim, so fingerprints stay identical to
/// history written by earlier versions. Hrefs that are already absolute are
/// kept as they are.
pub fn resolve_post_url(base_url: &str, href: &str) -> String {
    let lower = href.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        href.to_string()
    } else {
        format!("{}{}", base_url, href)
    }
}

/// Strips `<` and `>` and surrounding whitespace from a title
pub fn sanitize_title(text: &str) -> String {
    text.replace(['<', '>'], "").trim().to_string()
}
