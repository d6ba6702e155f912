//! Extracts post metadata from org-exported HTML content files. Org's HTML
//! export carries the title in `h1.title`, the date in a `.date` block, and
//! tags in `.tag` spans or a keywords meta element, but posts exported by
//! other tools (or by older org versions) scatter these differently, so
//! every field has a fallback chain ending in the index record.

use crate::index::PostInfo;
use chrono::NaiveDate;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

const EXCERPT_LIMIT: usize = 200;
const DEFAULT_TITLE: &str = "Untitled Post";
const DEFAULT_EXCERPT: &str = "Click to read this post...";

/// Metadata pulled out of a single content file, merged with its index
/// record. Tags are raw (not yet slugified) and deduplicated in first-seen
/// order.
#[derive(Debug)]
pub struct Metadata {
    pub title: String,
    pub slug: String,
    pub date: String,
    pub tags: Vec<String>,
    pub excerpt: String,
    pub body: String,
}

/// Holds the compiled selectors and patterns used for extraction so they're
/// built once per run rather than once per post.
pub struct Extractor {
    title_selectors: Vec<Selector>,
    date_selector: Selector,
    tag_selector: Selector,
    keywords_selector: Selector,
    paragraph_selector: Selector,
    content_selector: Selector,
    body_selector: Selector,
    filename_date: Regex,
    title_elements: Regex,
}

impl Extractor {
    pub fn new() -> Extractor {
        // The selectors and patterns are literals, so parsing them can't
        // fail.
        let sel = |s| Selector::parse(s).unwrap();
        Extractor {
            title_selectors: vec![sel("h1.title"), sel("title"), sel("h1")],
            date_selector: sel(r#".date, .timestamp, [class*="date"]"#),
            tag_selector: sel(r#".tag, .tags, [class*="tag-"]"#),
            keywords_selector: sel(r#"meta[name="keywords"]"#),
            paragraph_selector: sel("p"),
            content_selector: sel("#content, .content"),
            body_selector: sel("body"),
            filename_date: Regex::new(r"(\d{4}-\d{2}-\d{2})").unwrap(),
            title_elements: Regex::new(
                r#"(?is)<h1[^>]*class="[^"]*title[^"]*"[^>]*>.*?</h1>|<title>.*?</title>"#,
            )
            .unwrap(),
        }
    }

    /// Runs the full extraction for one post.
    pub fn extract(&self, html: &str, info: &PostInfo) -> Metadata {
        let doc = Html::parse_document(html);
        let title = self.extract_title(&doc, info);
        Metadata {
            slug: match info.slug.is_empty() {
                false => info.slug.clone(),
                true => slug::slugify(&title),
            },
            date: self.extract_date(&doc, info),
            tags: self.extract_tags(&doc, info),
            excerpt: self.extract_excerpt(&doc, info),
            body: self.extract_body(&doc),
            title,
        }
    }

    /// Title precedence: `h1.title`, then `<title>`, then any `<h1>`, then
    /// the index record, then a stock placeholder. Elements with empty text
    /// are passed over.
    fn extract_title(&self, doc: &Html, info: &PostInfo) -> String {
        for selector in &self.title_selectors {
            if let Some(element) = doc.select(selector).next() {
                let text = element_text(element);
                if !text.is_empty() {
                    return text;
                }
            }
        }
        match info.title.is_empty() {
            false => info.title.clone(),
            true => DEFAULT_TITLE.to_owned(),
        }
    }

    /// Date precedence: the first date-ish element whose text parses, then
    /// the index record, then a `YYYY-MM-DD` pattern in the filename, then
    /// today. Always normalized to ISO `YYYY-MM-DD`.
    fn extract_date(&self, doc: &Html, info: &PostInfo) -> String {
        for element in doc.select(&self.date_selector) {
            if let Some(date) = parse_date(&element_text(element)) {
                return date;
            }
        }
        if let Some(date) = parse_date(&info.date) {
            return date;
        }
        if let Some(captures) = self.filename_date.captures(&info.filename) {
            return captures[1].to_owned();
        }
        chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
    }

    /// Collects tags from `.tag`-style elements (split on commas and
    /// whitespace), the keywords meta element (split on commas), and the
    /// index record; empties dropped, duplicates removed in first-seen
    /// order.
    fn extract_tags(&self, doc: &Html, info: &PostInfo) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        for element in doc.select(&self.tag_selector) {
            let text: String = element.text().collect();
            tags.extend(
                text.split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|t| !t.is_empty())
                    .map(str::to_owned),
            );
        }
        if let Some(element) = doc.select(&self.keywords_selector).next() {
            if let Some(content) = element.value().attr("content") {
                tags.extend(
                    content
                        .split(',')
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(str::to_owned),
                );
            }
        }
        tags.extend(info.tags.iter().cloned());

        let mut seen = std::collections::HashSet::new();
        tags.retain(|tag| seen.insert(tag.clone()));
        tags
    }

    /// Excerpt precedence: the first paragraph (truncated), then the index
    /// record's description, then a stock placeholder.
    fn extract_excerpt(&self, doc: &Html, info: &PostInfo) -> String {
        if let Some(paragraph) = doc.select(&self.paragraph_selector).next() {
            let text = element_text(paragraph);
            if !text.is_empty() {
                return truncate(&text, EXCERPT_LIMIT);
            }
        }
        match info.description.is_empty() {
            false => info.description.clone(),
            true => DEFAULT_EXCERPT.to_owned(),
        }
    }

    /// Body precedence: the inner HTML of `#content`/`.content` (the usual
    /// org export container), then the document body. The title heading is
    /// stripped either way since the post template renders its own.
    fn extract_body(&self, doc: &Html) -> String {
        let container = doc
            .select(&self.content_selector)
            .next()
            .or_else(|| doc.select(&self.body_selector).next());
        match container {
            Some(element) => self
                .title_elements
                .replace_all(&element.inner_html(), "")
                .trim()
                .to_owned(),
            None => String::new(),
        }
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Extractor::new()
    }
}

/// The element's text content with whitespace collapsed, the way
/// `textContent.trim()` reads in the browser.
fn element_text(element: ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
}

/// Parses a human- or org-formatted date to ISO `YYYY-MM-DD`. Org
/// timestamps (`<2023-05-01 Mon>`) and a few long-form conventions are
/// accepted; anything else is rejected so the caller can fall through.
fn parse_date(text: &str) -> Option<String> {
    let cleaned = text
        .trim()
        .trim_start_matches(|c| c == '<' || c == '[')
        .trim_end_matches(|c| c == '>' || c == ']')
        .trim();
    if cleaned.is_empty() {
        return None;
    }
    const FORMATS: &[&str] = &["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y", "%Y/%m/%d", "%d %B %Y"];
    for format in FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(cleaned, format) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }
    // Org timestamps carry a day abbreviation after the date.
    if let Some(first) = cleaned.split_whitespace().next() {
        if let Ok(date) = NaiveDate::parse_from_str(first, "%Y-%m-%d") {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }
    None
}

/// Truncates to `limit` characters, appending an ellipsis when anything was
/// cut.
fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_owned();
    }
    let mut truncated: String = text.chars().take(limit).collect();
    truncated.push_str("...");
    truncated
}
