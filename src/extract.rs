//! Structural record extraction from listing-page markup.
//!
//! Extraction is the most volatile part of the pipeline: it is coupled to
//! the shape of third-party HTML. It lives behind this module so the
//! relevance and normalization logic never touch markup structure. Parsing
//! is purely structural; absent fields come out as `None`, never as errors.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::RawCandidate;

/// Minimum character length for a string to count as a usable title.
/// Shorter matches are badge text or truncated fragments.
const MIN_TITLE_LEN: usize = 10;

/// Extracts raw listing candidates from result-page markup.
///
/// Each field is located with a chain of fallback selectors because the
/// source rotates its markup between several layouts.
pub struct Extractor {
    base_url: String,
    cards: Selector,
    title_span: Selector,
    title_link: Selector,
    image: Selector,
    price_whole: Selector,
    price_offscreen: Selector,
    rating_label: Selector,
    rating_icon: Selector,
}

impl Extractor {
    /// Creates an extractor that resolves relative listing links against
    /// `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            cards: selector("div[data-component-type='s-search-result']"),
            title_span: selector("h2 span.a-text-normal"),
            title_link: selector("h2 a"),
            image: selector("img.s-image"),
            price_whole: selector(".a-price-whole"),
            price_offscreen: selector(".a-offscreen"),
            rating_label: selector("span[aria-label*='star']"),
            rating_icon: selector("i[class*='a-star']"),
        }
    }

    /// Parses one page of markup into raw candidates, in document order.
    ///
    /// Never fails: malformed markup simply yields fewer (or zero)
    /// candidates. Cards without a usable title are skipped.
    pub fn extract(&self, html: &str, source_page: u32) -> Vec<RawCandidate> {
        let document = Html::parse_document(html);
        let mut candidates = Vec::new();

        for card in document.select(&self.cards) {
            let Some(title) = self.title(&card) else {
                continue;
            };

            candidates.push(RawCandidate {
                title,
                price_text: self.price_text(&card),
                rating_text: self.rating_text(&card),
                url: self.listing_url(&card),
                source_page,
            });
        }

        debug!(
            page = source_page,
            count = candidates.len(),
            "extracted listing cards"
        );
        candidates
    }

    /// Title fallbacks: the h2 span, then the link's aria-label (the source
    /// puts the untruncated title there), then the link text, then the
    /// image alt text.
    fn title(&self, card: &ElementRef) -> Option<String> {
        if let Some(span) = card.select(&self.title_span).next() {
            let t = element_text(&span);
            if t.chars().count() > MIN_TITLE_LEN {
                return Some(t);
            }
        }

        if let Some(link) = card.select(&self.title_link).next() {
            if let Some(label) = link.value().attr("aria-label") {
                let label = label.trim();
                if label.chars().count() > MIN_TITLE_LEN {
                    return Some(label.to_string());
                }
            }
            let t = element_text(&link);
            if t.chars().count() > MIN_TITLE_LEN {
                return Some(t);
            }
        }

        if let Some(img) = card.select(&self.image).next() {
            if let Some(alt) = img.value().attr("alt") {
                let alt = alt.trim();
                if alt.chars().count() > MIN_TITLE_LEN {
                    return Some(alt.to_string());
                }
            }
        }

        None
    }

    /// Price text: the whole-number span first, then the offscreen
    /// accessibility price.
    fn price_text(&self, card: &ElementRef) -> Option<String> {
        for sel in [&self.price_whole, &self.price_offscreen] {
            if let Some(el) = card.select(sel).next() {
                let t = element_text(&el);
                if !t.is_empty() {
                    return Some(t);
                }
            }
        }
        None
    }

    /// Rating text: the starred aria-label span, then the star icon class.
    fn rating_text(&self, card: &ElementRef) -> Option<String> {
        if let Some(el) = card.select(&self.rating_label).next() {
            let t = element_text(&el);
            if !t.is_empty() {
                return Some(t);
            }
            if let Some(label) = el.value().attr("aria-label") {
                let label = label.trim();
                if !label.is_empty() {
                    return Some(label.to_string());
                }
            }
        }
        if let Some(el) = card.select(&self.rating_icon).next() {
            let t = element_text(&el);
            if !t.is_empty() {
                return Some(t);
            }
        }
        None
    }

    /// Listing href, resolved against the base URL when relative.
    /// Returns an empty string when the card has no link; the normalizer
    /// drops such candidates.
    fn listing_url(&self, card: &ElementRef) -> String {
        let Some(link) = card.select(&self.title_link).next() else {
            return String::new();
        };
        match link.value().attr("href") {
            Some(href) if href.starts_with("http") => href.to_string(),
            Some(href) if href.starts_with('/') => format!("{}{}", self.base_url, href),
            _ => String::new(),
        }
    }
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

fn element_text(el: &ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}
