// src/services/extract.rs

//! Link and image extraction from fetched HTML.

use std::collections::HashSet;
use std::sync::OnceLock;

use scraper::{Html, Selector};

fn link_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("a[href], link[href]").expect("valid selector"))
}

fn image_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("img[src]").expect("valid selector"))
}

/// All unique `href` values of anchor and link tags.
pub fn links_from_html(html: &str) -> HashSet<String> {
    let document = Html::parse_document(html);
    document
        .select(link_selector())
        .filter_map(|el| el.value().attr("href"))
        .map(str::to_string)
        .collect()
}

/// All unique `src` values of image tags.
pub fn images_from_html(html: &str) -> HashSet<String> {
    let document = Html::parse_document(html);
    document
        .select(image_selector())
        .filter_map(|el| el.value().attr("src"))
        .map(str::to_string)
        .collect()
}
