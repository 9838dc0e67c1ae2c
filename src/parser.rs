// src/parser.rs
//! Tolerant extraction of job listings from a results page.
//!
//! Every field is read through an ordered list of selector strategies; the
//! first one producing a non-empty value wins. When no structured entry is
//! found at all, `application/ld+json` JobPosting blocks are used instead.

use crate::error::ParseError;
use crate::types::{Document, JobListing};
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info, warn};
use url::Url;

pub const SNIPPET_MAX_CHARS: usize = 300;

/// How to read one field out of an entry node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStrategy {
    /// Collapsed text of the first non-empty element matching the selector.
    Text(&'static str),
    /// Attribute value of the first matching element carrying it.
    Attr(&'static str, &'static str),
}

/// Selectors tied to a known results-page layout.
#[derive(Debug, Clone, Copy)]
pub struct PageLayout {
    pub entries: &'static [&'static str],
    pub title: &'static [FieldStrategy],
    pub location: &'static [FieldStrategy],
    pub link: &'static [FieldStrategy],
    pub snippet: &'static [FieldStrategy],
}

pub const CAREERS_LAYOUT: PageLayout = PageLayout {
    entries: &[
        "li.lLd3Je",
        "div.sMn82b",
        "[itemtype$='JobPosting']",
        "li[data-job-id]",
        "article",
    ],
    title: &[
        FieldStrategy::Text("h3.QJPWVe"),
        FieldStrategy::Text("h3"),
        FieldStrategy::Text("h2"),
        FieldStrategy::Text("[itemprop='title']"),
    ],
    location: &[
        FieldStrategy::Text("span.r0wTof"),
        FieldStrategy::Text("span.pwO9Dc"),
        FieldStrategy::Text("[itemprop='jobLocation']"),
        FieldStrategy::Text("[class*='location']"),
    ],
    link: &[
        FieldStrategy::Attr("a.WpHeLc", "href"),
        FieldStrategy::Attr("a[href*='jobs/results']", "href"),
        FieldStrategy::Attr("a[href]", "href"),
    ],
    snippet: &[
        FieldStrategy::Text("div.Xsxa1e"),
        FieldStrategy::Text("[itemprop='description']"),
        FieldStrategy::Text("[class*='qualifications']"),
        FieldStrategy::Text("p"),
    ],
};

struct CompiledStrategy {
    selector: Selector,
    attr: Option<&'static str>,
}

pub struct ListingParser {
    entries: Vec<Selector>,
    title: Vec<CompiledStrategy>,
    location: Vec<CompiledStrategy>,
    link: Vec<CompiledStrategy>,
    snippet: Vec<CompiledStrategy>,
    base_href: Selector,
    json_ld: Selector,
}

impl Default for ListingParser {
    fn default() -> Self {
        Self::with_layout(&CAREERS_LAYOUT)
    }
}

impl ListingParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(layout: &PageLayout) -> Self {
        Self {
            entries: layout.entries.iter().filter_map(|s| compile(s)).collect(),
            title: compile_strategies(layout.title),
            location: compile_strategies(layout.location),
            link: compile_strategies(layout.link),
            snippet: compile_strategies(layout.snippet),
            base_href: compile("base[href]").expect("static selector"),
            json_ld: compile("script[type='application/ld+json']").expect("static selector"),
        }
    }

    /// Extracts listings in document order, deduplicated by link.
    ///
    /// Listings whose link fell back to the page itself are never collapsed.
    pub fn parse(&self, document: &Document) -> Result<Vec<JobListing>, ParseError> {
        let body = document.body.trim();
        if body.is_empty() {
            return Err(ParseError::Empty);
        }
        if !body.contains('<') {
            return Err(ParseError::NotMarkup);
        }

        let html = Html::parse_document(body);
        let base = self.resolve_base(&html, &document.url);

        let mut listings = self.parse_entries(&html, &base);
        if listings.is_empty() {
            listings = self.parse_json_ld(&html, &base);
        }

        let listings = dedupe_by_link(listings, &base);
        info!("Parsed {} job listings from {}", listings.len(), document.url);
        Ok(listings)
    }

    fn resolve_base(&self, html: &Html, page_url: &Url) -> Url {
        html.select(&self.base_href)
            .next()
            .and_then(|base| base.value().attr("href"))
            .and_then(|href| page_url.join(href.trim()).ok())
            .filter(is_web_url)
            .unwrap_or_else(|| page_url.clone())
    }

    fn parse_entries(&self, html: &Html, base: &Url) -> Vec<JobListing> {
        let Some(entries) = self
            .entries
            .iter()
            .map(|selector| html.select(selector).collect::<Vec<_>>())
            .find(|found| !found.is_empty())
        else {
            debug!("No structured result entries found");
            return Vec::new();
        };

        let total = entries.len();
        let listings: Vec<JobListing> = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let listing = self.parse_entry(entry, base);
                if listing.is_none() {
                    debug!("Skipping result entry {} without a title", index);
                }
                listing
            })
            .collect();

        if listings.len() < total {
            warn!(
                "Skipped {} of {} result entries",
                total - listings.len(),
                total
            );
        }
        listings
    }

    fn parse_entry(&self, entry: ElementRef<'_>, base: &Url) -> Option<JobListing> {
        let title = first_match(entry, &self.title)?;
        let location = first_match(entry, &self.location).unwrap_or_default();
        let link = resolve_link(first_match(entry, &self.link).as_deref(), base);
        let snippet = first_match(entry, &self.snippet)
            .map(|text| truncate_chars(&text, SNIPPET_MAX_CHARS))
            .unwrap_or_default();

        Some(JobListing {
            title,
            location,
            link,
            snippet,
        })
    }

    fn parse_json_ld(&self, html: &Html, base: &Url) -> Vec<JobListing> {
        let mut listings = Vec::new();

        for script in html.select(&self.json_ld) {
            let raw = script.text().collect::<String>();
            let value: Value = match serde_json::from_str(raw.trim()) {
                Ok(value) => value,
                Err(e) => {
                    debug!("Skipping unparseable JSON-LD block: {}", e);
                    continue;
                }
            };

            for posting in job_postings(&value) {
                match listing_from_posting(posting, base) {
                    Some(listing) => listings.push(listing),
                    None => debug!("Skipping JobPosting without a title"),
                }
            }
        }

        if !listings.is_empty() {
            info!("Recovered {} listings from JSON-LD", listings.len());
        }
        listings
    }
}

fn compile(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!("Ignoring invalid selector {:?}: {:?}", selector, e);
            None
        }
    }
}

fn compile_strategies(strategies: &[FieldStrategy]) -> Vec<CompiledStrategy> {
    strategies
        .iter()
        .filter_map(|strategy| match *strategy {
            FieldStrategy::Text(selector) => compile(selector).map(|selector| CompiledStrategy {
                selector,
                attr: None,
            }),
            FieldStrategy::Attr(selector, attr) => {
                compile(selector).map(|selector| CompiledStrategy {
                    selector,
                    attr: Some(attr),
                })
            }
        })
        .collect()
}

fn first_match(entry: ElementRef<'_>, strategies: &[CompiledStrategy]) -> Option<String> {
    strategies.iter().find_map(|strategy| {
        entry.select(&strategy.selector).find_map(|element| {
            let value = match strategy.attr {
                Some(attr) => element.value().attr(attr).map(|v| v.trim().to_string()),
                None => Some(clean_text(&element.text().collect::<Vec<_>>().join(" "))),
            };
            value.filter(|v| !v.is_empty())
        })
    })
}

fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

fn is_web_url(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Absolute http(s) link for `href`, or the base page itself when there is none.
fn resolve_link(href: Option<&str>, base: &Url) -> String {
    href.and_then(|href| base.join(href).ok())
        .filter(is_web_url)
        .unwrap_or_else(|| base.clone())
        .to_string()
}

fn dedupe_by_link(listings: Vec<JobListing>, base: &Url) -> Vec<JobListing> {
    let mut seen = HashSet::new();
    listings
        .into_iter()
        .filter(|listing| listing.link == base.as_str() || seen.insert(listing.link.clone()))
        .collect()
}

fn is_job_posting(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(kind)) => kind == "JobPosting",
        Some(Value::Array(kinds)) => kinds.iter().any(|k| k.as_str() == Some("JobPosting")),
        _ => false,
    }
}

fn job_postings(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().flat_map(job_postings).collect(),
        Value::Object(map) => {
            if is_job_posting(value) {
                vec![value]
            } else if let Some(graph) = map.get("@graph") {
                job_postings(graph)
            } else {
                Vec::new()
            }
        }
        _ => Vec::new(),
    }
}

fn listing_from_posting(posting: &Value, base: &Url) -> Option<JobListing> {
    let text_of = |key: &str| {
        posting
            .get(key)
            .and_then(Value::as_str)
            .map(clean_text)
            .filter(|s| !s.is_empty())
    };

    let title = text_of("title").or_else(|| text_of("name"))?;
    let link = resolve_link(posting.get("url").and_then(Value::as_str), base);
    let location = posting
        .get("jobLocation")
        .map(posting_location)
        .unwrap_or_default();
    let snippet = text_of("description")
        .map(|description| truncate_chars(&strip_markup(&description), SNIPPET_MAX_CHARS))
        .unwrap_or_default();

    Some(JobListing {
        title,
        location,
        link,
        snippet,
    })
}

fn posting_location(job_location: &Value) -> String {
    let place = match job_location {
        Value::Array(places) => places.first(),
        other => Some(other),
    };
    let Some(address) = place.and_then(|p| p.get("address")) else {
        return String::new();
    };

    if let Some(text) = address.as_str() {
        return clean_text(text);
    }

    ["addressLocality", "addressRegion", "addressCountry"]
        .iter()
        .filter_map(|key| address.get(*key).and_then(Value::as_str))
        .map(clean_text)
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

fn strip_markup(text: &str) -> String {
    if !text.contains('<') {
        return text.to_string();
    }
    let fragment = Html::parse_fragment(text);
    clean_text(&fragment.root_element().text().collect::<Vec<_>>().join(" "))
}
