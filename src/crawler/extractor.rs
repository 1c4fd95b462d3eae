//! HTML extractor producing a `PageRecord`
//!
//! This module handles parsing HTML content to extract:
//! - Page title and metadata
//! - Paragraph text, word count and other text blocks
//! - Links and images (absolute, normalized URLs)
//! - Tables, forms and heading structure
//!
//! Extraction is total: malformed markup yields whatever the parser
//! recovers, missing attributes default to empty strings and absent
//! elements to empty sequences.

use crate::config::CrawlerConfig;
use crate::report::{
    FormInput, FormRecord, ImageRecord, LinkRecord, ListRecord, PageRecord, TableRecord,
    TextContent,
};
use crate::url::resolve_url;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use url::Url;

/// Elements whose text is page chrome rather than content
const BOILERPLATE: &[&str] = &["script", "style", "noscript", "nav", "header", "footer"];

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Tunables for extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Shortest paragraph kept, in characters
    pub min_paragraph_chars: usize,
    /// Link text is truncated to this many characters
    pub max_link_text_chars: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            min_paragraph_chars: 11,
            max_link_text_chars: 200,
        }
    }
}

impl ExtractOptions {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            min_paragraph_chars: config.min_paragraph_chars,
            ..Self::default()
        }
    }
}

/// Parses HTML content into a page record
///
/// # Link Extraction Rules
///
/// - Every `<a href>` in the document, including navigation and footers
/// - Hrefs are resolved against `page_url` and normalized
/// - `javascript:`, `mailto:`, `tel:`, `data:` and unparseable hrefs are dropped
/// - Duplicates are kept in document order
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `page_url` - The URL the page was fetched from, used to resolve relative URLs
/// * `options` - Extraction tunables
///
/// # Example
///
/// ```
/// use deep_crawl::crawler::{extract_page, ExtractOptions};
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let page_url = Url::parse("https://example.com/").unwrap();
/// let record = extract_page(html, &page_url, &ExtractOptions::default());
/// assert_eq!(record.title, "Test");
/// assert_eq!(record.links[0].url, "https://example.com/page");
/// ```
pub fn extract_page(html: &str, page_url: &Url, options: &ExtractOptions) -> PageRecord {
    let document = Html::parse_document(html);

    let text_content = extract_text_content(&document, options);
    let links = extract_links(&document, page_url, options);
    let images = extract_images(&document, page_url);
    let tables = extract_tables(&document);
    let forms = extract_forms(&document);

    PageRecord {
        url: page_url.to_string(),
        title: extract_title(&document),
        links_found: links.len(),
        images_found: images.len(),
        tables_found: tables.len(),
        forms_found: forms.len(),
        text_content,
        links,
        images,
        tables,
        forms,
        headings_structure: extract_headings(&document),
        metadata: extract_metadata(&document),
    }
}

/// Elements matching `css`, in document order
///
/// An invalid selector matches nothing.
fn select_all<'a>(document: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => document.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

fn select_within<'a>(element: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => element.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

/// Collapses runs of whitespace into single spaces and trims
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

fn has_ancestor(element: ElementRef<'_>, names: &[&str]) -> bool {
    element.ancestors().any(|node| {
        node.value()
            .as_element()
            .map_or(false, |e| names.contains(&e.name()))
    })
}

fn in_boilerplate(element: ElementRef<'_>) -> bool {
    has_ancestor(element, BOILERPLATE)
}

/// Non-empty texts of content elements matching `css`
fn content_texts(document: &Html, css: &str) -> Vec<String> {
    select_all(document, css)
        .into_iter()
        .filter(|el| !in_boilerplate(*el))
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect()
}

fn attr(element: ElementRef<'_>, name: &str) -> String {
    element.value().attr(name).unwrap_or_default().trim().to_string()
}

fn extract_title(document: &Html) -> String {
    select_all(document, "title")
        .into_iter()
        .next()
        .map(element_text)
        .unwrap_or_default()
}

fn extract_text_content(document: &Html, options: &ExtractOptions) -> TextContent {
    let paragraphs: Vec<String> = content_texts(document, "p")
        .into_iter()
        .filter(|p| p.chars().count() >= options.min_paragraph_chars)
        .collect();
    let total_word_count = paragraphs
        .iter()
        .map(|p| p.split_whitespace().count())
        .sum();

    let lists = select_all(document, "ul, ol")
        .into_iter()
        .filter(|el| !in_boilerplate(*el))
        .filter_map(|list| {
            let items: Vec<String> = list
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|child| child.value().name() == "li")
                .map(element_text)
                .filter(|text| !text.is_empty())
                .collect();
            (!items.is_empty()).then(|| ListRecord {
                kind: list.value().name().to_string(),
                items,
            })
        })
        .collect();

    let code_blocks = select_all(document, "pre, code")
        .into_iter()
        .filter(|el| !in_boilerplate(*el))
        .filter(|el| el.value().name() == "pre" || !has_ancestor(*el, &["pre"]))
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect();

    TextContent {
        paragraphs,
        total_word_count,
        lists,
        bold_text: content_texts(document, "b, strong"),
        italic_text: content_texts(document, "i, em"),
        code_blocks,
        quotes: content_texts(document, "blockquote, q"),
    }
}

fn extract_links(document: &Html, page_url: &Url, options: &ExtractOptions) -> Vec<LinkRecord> {
    select_all(document, "a[href]")
        .into_iter()
        .filter_map(|el| {
            let href = el.value().attr("href")?;
            let url = resolve_url(href, page_url).ok()?;
            let text: String = element_text(el)
                .chars()
                .take(options.max_link_text_chars)
                .collect();
            Some(LinkRecord {
                text,
                url: url.to_string(),
            })
        })
        .collect()
}

fn extract_images(document: &Html, page_url: &Url) -> Vec<ImageRecord> {
    select_all(document, "img[src]")
        .into_iter()
        .filter_map(|el| {
            let src = resolve_url(el.value().attr("src")?, page_url).ok()?;
            Some(ImageRecord {
                alt: attr(el, "alt"),
                src: src.to_string(),
            })
        })
        .collect()
}

fn extract_tables(document: &Html) -> Vec<TableRecord> {
    select_all(document, "table")
        .into_iter()
        .map(|table| {
            let caption = select_within(table, "caption")
                .into_iter()
                .next()
                .map(element_text)
                .unwrap_or_default();
            let headers = select_within(table, "th")
                .into_iter()
                .map(element_text)
                .collect();
            let rows = select_within(table, "tr")
                .into_iter()
                .map(|row| {
                    select_within(row, "td")
                        .into_iter()
                        .map(element_text)
                        .collect::<Vec<_>>()
                })
                .filter(|cells| !cells.is_empty())
                .collect();
            TableRecord {
                caption,
                headers,
                rows,
            }
        })
        .collect()
}

fn extract_forms(document: &Html) -> Vec<FormRecord> {
    select_all(document, "form")
        .into_iter()
        .map(|form| {
            let method = attr(form, "method").to_ascii_lowercase();
            let inputs = select_within(form, "input, textarea, select")
                .into_iter()
                .map(|input| {
                    let name = input.value().name();
                    let kind = if name == "input" {
                        let kind = attr(input, "type").to_ascii_lowercase();
                        if kind.is_empty() {
                            "text".to_string()
                        } else {
                            kind
                        }
                    } else {
                        name.to_string()
                    };
                    FormInput {
                        kind,
                        name: attr(input, "name"),
                        placeholder: attr(input, "placeholder"),
                        value: attr(input, "value"),
                        required: input.value().attr("required").is_some(),
                    }
                })
                .collect();
            FormRecord {
                action: attr(form, "action"),
                method: if method.is_empty() {
                    "get".to_string()
                } else {
                    method
                },
                inputs,
            }
        })
        .collect()
}

fn extract_headings(document: &Html) -> BTreeMap<String, Vec<String>> {
    HEADINGS
        .iter()
        .filter_map(|tag| {
            let texts = content_texts(document, tag);
            (!texts.is_empty()).then(|| (tag.to_string(), texts))
        })
        .collect()
}

fn extract_metadata(document: &Html) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();
    for meta in select_all(document, "meta[content]") {
        let key = meta
            .value()
            .attr("name")
            .or_else(|| meta.value().attr("property"))
            .map(str::trim)
            .filter(|k| !k.is_empty());
        if let Some(key) = key {
            metadata
                .entry(key.to_ascii_lowercase())
                .or_insert_with(|| attr(meta, "content"));
        }
    }
    metadata
}
