//! Query relevance filtering for scraped listings.
//!
//! Listing pages are noisy: a search for "sony headphones" returns cables,
//! cases, and screen protectors that merely mention the product in a
//! compatibility note. The filter here decides whether a listing title is
//! actually ABOUT the query. It is a pure function of (title, query) and is
//! independent of candidate ordering.

/// Query tokens that carry no filtering signal.
const STOP_WORDS: &[&str] = &[
    "for", "with", "and", "the", "a", "an", "in", "on", "of", "to", "is", "by", "or", "be", "at",
    "as", "it", "compatible",
];

/// Title prefixes that mark a listing as an accessory FOR a product rather
/// than the product itself.
const ACCESSORY_PREAMBLES: &[&str] = &[
    "compatible with",
    "compatible for",
    "cable for",
    "case for",
    "cover for",
    "strap for",
    "charger for",
    "charging cable",
    "charging cord",
    "screen protector for",
    "screen protector",
    "screen guard",
    "tempered glass",
    "mfi certified",
    "mfi-certified",
];

/// Character window at the start of a title in which the primary query
/// keyword must appear. Titles burying the primary term are low-relevance
/// or mis-tagged listings.
const PRIMARY_KEYWORD_WINDOW: usize = 60;

/// Extracts the meaningful filter keywords from a query.
///
/// Tokens are case-folded; stop words and tokens shorter than 3 characters
/// are dropped.
///
/// ```
/// use dealscope::relevance::keywords;
///
/// assert_eq!(keywords("Sony Headphones"), vec!["sony", "headphones"]);
/// assert_eq!(keywords("headphones for running"), vec!["headphones", "running"]);
/// ```
pub fn keywords(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .filter(|w| w.chars().count() > 2 && !STOP_WORDS.contains(&w.as_str()))
        .collect()
}

/// Returns the byte index of the earliest match of `keyword` in `title`,
/// treating a trailing "s" on the keyword as optional.
///
/// Both arguments must already be case-folded. A singular keyword matches a
/// pluralized occurrence for free via substring containment; a plural keyword
/// additionally matches its singular form.
fn keyword_position(title: &str, keyword: &str) -> Option<usize> {
    let mut best: Option<usize> = title.find(keyword);
    if let Some(singular) = keyword.strip_suffix('s') {
        if !singular.is_empty() {
            if let Some(pos) = title.find(singular) {
                best = Some(best.map_or(pos, |b| b.min(pos)));
            }
        }
    }
    best
}

/// Decides whether a listing title is a true match for the query.
///
/// Rules:
/// 1. Every query keyword must appear in the title (plural-insensitive).
/// 2. Accessory language ("compatible with ...", "case for ...") occurring
///    before the primary keyword marks the listing as an accessory FOR the
///    product, not the product itself — rejected even when every keyword is
///    present. A title that begins with a blocked phrase is always rejected.
/// 3. The first (primary) keyword must surface within the first 60
///    characters of the title.
///
/// An empty title, an empty query, or a query with no usable keywords is
/// never relevant.
pub fn is_relevant(title: &str, query: &str) -> bool {
    if title.trim().is_empty() || query.trim().is_empty() {
        return false;
    }

    let words = keywords(query);
    if words.is_empty() {
        return false;
    }

    let t = title.to_lowercase();

    if !words.iter().all(|w| keyword_position(&t, w).is_some()) {
        return false;
    }

    let Some(primary_pos) = keyword_position(&t, &words[0]) else {
        return false;
    };

    if ACCESSORY_PREAMBLES
        .iter()
        .any(|p| t.starts_with(p) || t.find(p).is_some_and(|pos| pos < primary_pos))
    {
        return false;
    }

    t[..primary_pos].chars().count() < PRIMARY_KEYWORD_WINDOW
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_basic() {
        assert_eq!(keywords("sony headphones"), vec!["sony", "headphones"]);
    }

    #[test]
    fn test_keywords_case_folds() {
        assert_eq!(keywords("Apple iPhones"), vec!["apple", "iphones"]);
    }

    #[test]
    fn test_keywords_removes_stop_words() {
        let words = keywords("headphones for running");
        assert!(!words.contains(&"for".to_string()));
        assert_eq!(words, vec!["headphones", "running"]);
    }

    #[test]
    fn test_keywords_removes_short_tokens() {
        assert_eq!(keywords("4k tv stand"), vec!["stand"]);
    }

    #[test]
    fn test_keywords_empty_query() {
        assert!(keywords("").is_empty());
        assert!(keywords("   ").is_empty());
    }

    #[test]
    fn test_relevant_good_title() {
        assert!(is_relevant("Apple iPhone 16 Pro 256GB", "apple iphone"));
    }

    #[test]
    fn test_relevant_is_idempotent() {
        let title = "Sony WH-1000XM5 Wireless Headphones";
        let query = "sony headphones";
        let first = is_relevant(title, query);
        for _ in 0..10 {
            assert_eq!(is_relevant(title, query), first);
        }
        assert!(first);
    }

    #[test]
    fn test_rejects_missing_keyword() {
        assert!(!is_relevant("Bose QuietComfort Headphones", "sony headphones"));
    }

    #[test]
    fn test_rejects_accessory_preamble() {
        assert!(!is_relevant(
            "Compatible with iPhone 15 Case Cover",
            "iphone"
        ));
        assert!(!is_relevant(
            "Compatible with iPhone 14 Case",
            "iphone case"
        ));
    }

    #[test]
    fn test_rejects_accessory_language_before_primary_keyword() {
        // The keyword appears early enough, but only inside a
        // compatibility note.
        assert!(!is_relevant(
            "USB Cable Compatible with Sony Headphones",
            "sony headphones"
        ));
        // The same phrase after the primary keyword is fine.
        assert!(is_relevant(
            "Sony WH-1000XM5 Headphones with Charging Cable",
            "sony headphones"
        ));
    }

    #[test]
    fn test_rejects_cable_listing() {
        assert!(!is_relevant(
            "USB C Cable Compatible with iPhone Apple MFi Certified",
            "apple iphone"
        ));
    }

    #[test]
    fn test_rejects_late_primary_keyword() {
        let title = "Fast Charging Cable USB C Braided Cord 6ft Extra Long Works with Apple iPhone";
        assert!(!is_relevant(title, "apple iphone"));
    }

    #[test]
    fn test_primary_keyword_position_boundary() {
        // Keyword starting at index 59 passes, at index 60 is rejected.
        let at_59 = format!("{}sony headphones", "z".repeat(59));
        let at_60 = format!("{}sony headphones", "z".repeat(60));
        assert!(is_relevant(&at_59, "sony headphones"));
        assert!(!is_relevant(&at_60, "sony headphones"));
    }

    #[test]
    fn test_plural_query_matches_singular_title() {
        assert!(is_relevant("Sony WH-CH520 Wireless Headphone", "headphones"));
    }

    #[test]
    fn test_singular_query_matches_plural_title() {
        assert!(is_relevant(
            "Sony WH-1000XM5 Wireless Headphones",
            "headphone"
        ));
    }

    #[test]
    fn test_empty_inputs_not_relevant() {
        assert!(!is_relevant("", "sony headphones"));
        assert!(!is_relevant("Sony WH-1000XM5", ""));
        assert!(!is_relevant("", ""));
    }

    #[test]
    fn test_stop_word_only_query_not_relevant() {
        assert!(!is_relevant("Sony WH-1000XM5", "for the with"));
    }

    #[test]
    fn test_order_independence_of_rules() {
        // Accessory preamble rejection applies even with all keywords present
        // and the primary keyword early in the title.
        assert!(!is_relevant("Case for Sony Headphones", "sony headphones"));
    }
}
