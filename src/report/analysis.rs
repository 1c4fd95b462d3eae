//! Derived views over the crawled pages: link structure and content makeup

use crate::report::page_map::PageMap;
use crate::report::types::{
    ContentAnalysis, ContentVolume, KeywordCount, LinkCount, SiteStructure,
};
use crate::url::extract_domain;
use std::collections::{BTreeSet, HashMap};
use url::Url;

const MOST_LINKED_LIMIT: usize = 10;
const KEYWORD_LIMIT: usize = 20;
const MIN_KEYWORD_CHARS: usize = 4;

/// Builds the link-graph view
///
/// A link is internal when its domain (host and any explicit port) equals
/// `base_domain`. Internal link
/// targets are ranked by how often they are linked; external hosts are
/// collected as a sorted set.
pub fn site_structure(pages: &PageMap, base_domain: &str) -> SiteStructure {
    let mut inbound: HashMap<&str, usize> = HashMap::new();
    let mut external = BTreeSet::new();

    for page in pages.values() {
        for link in &page.links {
            let Ok(parsed) = Url::parse(&link.url) else {
                continue;
            };
            match extract_domain(&parsed) {
                Some(domain) if domain == base_domain => {
                    *inbound.entry(link.url.as_str()).or_default() += 1;
                }
                Some(domain) => {
                    external.insert(domain);
                }
                None => {}
            }
        }
    }

    let mut most_linked: Vec<LinkCount> = inbound
        .into_iter()
        .map(|(url, count)| LinkCount {
            url: url.to_string(),
            count,
        })
        .collect();
    most_linked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.url.cmp(&b.url)));
    most_linked.truncate(MOST_LINKED_LIMIT);

    SiteStructure {
        most_linked_pages: most_linked,
        page_titles: pages
            .values()
            .filter(|page| !page.title.is_empty())
            .map(|page| page.title.clone())
            .collect(),
        unique_domains_linked: external.into_iter().collect(),
    }
}

/// Builds the content view: volume totals, kinds of content seen and the
/// most frequent words in paragraph text
pub fn content_analysis(pages: &PageMap) -> ContentAnalysis {
    let mut volume = ContentVolume::default();
    let mut types = BTreeSet::new();
    let mut words: HashMap<String, usize> = HashMap::new();

    for page in pages.values() {
        let text = &page.text_content;
        volume.words += text.total_word_count;
        volume.paragraphs += text.paragraphs.len();
        volume.images += page.images_found;
        volume.tables += page.tables_found;
        volume.forms += page.forms_found;

        if page.tables_found > 0 {
            types.insert("tables");
        }
        if page.images_found > 0 {
            types.insert("images");
        }
        if page.forms_found > 0 {
            types.insert("forms");
        }
        if !text.lists.is_empty() {
            types.insert("lists");
        }
        if !text.bold_text.is_empty() || !text.italic_text.is_empty() {
            types.insert("formatted_text");
        }
        if !text.code_blocks.is_empty() {
            types.insert("code");
        }
        if !text.quotes.is_empty() {
            types.insert("quotes");
        }

        for paragraph in &text.paragraphs {
            for word in keywords_in(paragraph) {
                *words.entry(word).or_default() += 1;
            }
        }
    }

    let mut common: Vec<KeywordCount> = words
        .into_iter()
        .map(|(word, count)| KeywordCount { word, count })
        .collect();
    common.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    common.truncate(KEYWORD_LIMIT);

    ContentAnalysis {
        total_content_volume: volume,
        content_types_present: types.into_iter().map(String::from).collect(),
        common_keywords: common,
    }
}

/// Lowercased alphabetic runs of at least four characters
fn keywords_in(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphabetic())
        .filter(|word| word.chars().count() >= MIN_KEYWORD_CHARS)
        .map(str::to_lowercase)
}
