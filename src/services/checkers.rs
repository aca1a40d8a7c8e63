// src/services/checkers.rs

//! Content-relevance checkers.
//!
//! A checker is a pure predicate over fetched content: `(html, url) -> bool`,
//! true iff the page is topically relevant. Checkers are registered in a
//! closed table and looked up by name at startup, so an unknown name is
//! rejected before any crawling begins.

use std::sync::OnceLock;

use regex::Regex;
use scraper::{Html, Selector};

/// A pluggable relevance predicate. Must not mutate shared state.
pub type CheckerFn = fn(html: &str, url: &str) -> bool;

/// Registered checkers, looked up by CLI name.
const REGISTRY: &[(&str, CheckerFn)] = &[
    ("spektrum_ai", spektrum_ai),
    ("infoaktuell_ai", infoaktuell_ai),
    ("zeit_health", zeit_health),
];

/// Find a checker by name.
pub fn lookup(name: &str) -> Option<CheckerFn> {
    REGISTRY
        .iter()
        .find(|(id, _)| *id == name)
        .map(|(_, func)| *func)
}

/// All valid checker names, for the CLI's rejection message.
pub fn names() -> Vec<&'static str> {
    REGISTRY.iter().map(|(id, _)| *id).collect()
}

/// Multilingual (German/English) marker for AI coverage. Matched against
/// visible text and keyword meta tags.
const AI_PATTERN: &str = r"(?i)\b((künstlich|artifiziell|artificial|super)\w*( (generell\w*|general))?\s?intelligen\w*|(intelligent|autonom)\w* (system|mas?chine)\w*|(mas?chin|supervise|überwacht|reinforce|bestärk|verstärk|gegnerisch|adversarial|deep|tief)\w*\s?(lernen|learning)|neur\w* (netz|network)\w*|(chat)?-?gpt|openai|gemini|copilot|claude\s?\d|llama|(natural language processing|natürliche sprach-?verarbeitung|computer vision|bildverarbeitung|robot|deep\s?fake|large language model|sprachassisten|chatbot)\w*|\b(K|A)G?I\b|ML|NLP|LLM\b)";

fn ai_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(AI_PATTERN).expect("AI pattern must compile"))
}

fn trailing_digits() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[0-9]{3}$").expect("digit pattern must compile"))
}

/// Topic sections that are always relevant regardless of page text.
const SPEKTRUM_TOPICS: &[&str] = &[
    "/thema/kuenstliche-intelligenz",
    "/thema/informationstechnologie",
    "/thema/der-digitale-mensch",
    "/thema/roboter/",
];

/// Keyword meta-tag values of a parsed document.
fn meta_keywords(document: &Html) -> Vec<String> {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    let selector = SELECTOR
        .get_or_init(|| Selector::parse(r#"meta[name="keywords"]"#).expect("valid selector"));
    document
        .select(selector)
        .filter_map(|el| el.value().attr("content"))
        .flat_map(|content| content.split(", ").map(str::to_string))
        .collect()
}

/// Visible text of a parsed document, space-joined.
fn page_text(document: &Html) -> String {
    document
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ")
}

/// AI relevance for a popular-science news site.
///
/// Relevant when the URL sits under a known topic section, when it lacks the
/// trailing article number that only article pages carry, when any keyword
/// meta entry mentions AI, or when the visible text mentions it more than
/// twice.
fn spektrum_ai(html: &str, url: &str) -> bool {
    if SPEKTRUM_TOPICS.iter().any(|topic| url.contains(topic)) {
        return true;
    }
    if !trailing_digits().is_match(url) {
        return true;
    }

    let document = Html::parse_document(html);
    if meta_keywords(&document)
        .iter()
        .any(|keyword| ai_pattern().is_match(keyword))
    {
        return true;
    }

    ai_pattern().find_iter(&page_text(&document)).count() > 2
}

/// AI relevance for a news portal whose article pages end in `.html`.
///
/// Pages whose canonical link is not `.html`-shaped are overview pages and
/// always pass; otherwise keyword meta entries and a lower text threshold
/// decide.
fn infoaktuell_ai(html: &str, _url: &str) -> bool {
    static CANONICAL: OnceLock<Selector> = OnceLock::new();
    let canonical = CANONICAL
        .get_or_init(|| Selector::parse(r#"link[rel="canonical"]"#).expect("valid selector"));

    let document = Html::parse_document(html);
    let canonical_href = document
        .select(canonical)
        .next()
        .and_then(|el| el.value().attr("href"));
    if let Some(href) = canonical_href {
        if !href.ends_with(".html") {
            return true;
        }
    }

    if meta_keywords(&document)
        .iter()
        .any(|keyword| ai_pattern().is_match(keyword))
    {
        return true;
    }

    ai_pattern().find_iter(&page_text(&document)).count() > 1
}

const HEALTH_KEYWORDS: &[&str] = &[
    "gesundheit",
    "medizin",
    "psychologie",
    "krankenhaus",
    "ernaehrung",
    "pflege",
];

/// Health relevance via meta-tag contents.
fn zeit_health(html: &str, _url: &str) -> bool {
    static META: OnceLock<Selector> = OnceLock::new();
    let meta = META.get_or_init(|| Selector::parse("meta").expect("valid selector"));

    let document = Html::parse_document(html);
    document.select(meta).any(|el| {
        let content = el.value().attr("content").unwrap_or("").to_lowercase();
        HEALTH_KEYWORDS.iter().any(|keyword| content.contains(keyword))
    })
}
