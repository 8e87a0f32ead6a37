//! Candidate validation: price/rating parsing, URL checks, title dedup.

use std::collections::HashSet;

use chrono::Utc;
use regex::Regex;
use tracing::debug;
use url::Url;

use crate::product::{normalized_title, Product, RawCandidate};

/// Parses price text into a non-negative amount, rounded to 2 decimals.
///
/// Currency symbols and thousands separators are stripped; what remains
/// must parse as a decimal number. Unparsable text yields `None` — price
/// absence is not a rejection reason for the record.
pub fn parse_price(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    let value: f64 = cleaned.parse().ok()?;
    Some((value * 100.0).round() / 100.0)
}

/// Turns raw candidates into validated [`Product`]s.
pub struct Normalizer {
    platform: String,
    rating_re: Regex,
}

impl Normalizer {
    /// Creates a normalizer stamping records with the given platform name.
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            rating_re: Regex::new(r"\d+\.?\d*").expect("static pattern must parse"),
        }
    }

    /// Validates and deduplicates candidates, preserving first-seen order.
    ///
    /// Candidates without a well-formed absolute URL are dropped entirely;
    /// a product without a resolvable link has no evidential value. Later
    /// candidates whose normalized title was already seen are discarded.
    pub fn normalize(&self, candidates: Vec<RawCandidate>) -> Vec<Product> {
        let scraped_at = Utc::now();
        let mut seen = HashSet::new();
        let mut products = Vec::new();

        for candidate in candidates {
            if Url::parse(&candidate.url).is_err() {
                debug!(title = %candidate.title, "dropping candidate without a resolvable url");
                continue;
            }

            let key = normalized_title(&candidate.title);
            if key.is_empty() || !seen.insert(key) {
                continue;
            }

            products.push(Product {
                price: candidate.price_text.as_deref().and_then(parse_price),
                rating: candidate
                    .rating_text
                    .as_deref()
                    .and_then(|t| self.parse_rating(t)),
                title: candidate.title,
                url: candidate.url,
                platform: self.platform.clone(),
                scraped_at,
            });
        }

        products
    }

    /// Parses rating text like "4.5 out of 5 stars" into a value in [0, 5],
    /// rounded to 1 decimal. Out-of-range or unparsable ratings are absent.
    pub fn parse_rating(&self, text: &str) -> Option<f64> {
        let m = self.rating_re.find(text)?;
        let value: f64 = m.as_str().parse().ok()?;
        if !(0.0..=5.0).contains(&value) {
            return None;
        }
        Some((value * 10.0).round() / 10.0)
    }
}
