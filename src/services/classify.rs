// src/services/classify.rs

//! URL normalization and discovered-link classification.

use std::collections::HashSet;

use crate::models::SiteConfig;

/// Make one discovered link absolute against the site's base URL.
///
/// Rule order matters and each rule only fires on links the previous one
/// left unmodified: path-relative (`/...`) first, then the forum-relative
/// prefix (`./...`), then anything not carrying the site's scheme. Applying
/// the scheme rule earlier would double-prefix path-relative links.
pub fn absolutize(link: &str, site: &SiteConfig) -> String {
    if link.starts_with('/') {
        return format!("{}{}", site.base_url, link);
    }
    if let Some(rest) = link.strip_prefix("./") {
        return format!("{}{}/{}", site.base_url, site.forum_root, rest);
    }
    if !link.starts_with(site.scheme()) {
        return format!("{}{}", site.base_url, link);
    }
    link.to_string()
}

/// Absolutize a whole set of discovered links.
pub fn absolutize_all(links: HashSet<String>, site: &SiteConfig) -> HashSet<String> {
    links
        .into_iter()
        .map(|link| absolutize(&link, site))
        .collect()
}

/// Partition freshly discovered links into (relevant, irrelevant).
///
/// Relevant links start with an article or board shape and carry no
/// irrelevant marker; everything else is irrelevant. The relevant side is
/// then reduced by the visited set so already-processed URLs never re-enter
/// the frontier within a run. The irrelevant side is computed before that
/// subtraction, so together the two sides still cover every incoming link.
pub fn sort_incoming(
    links: HashSet<String>,
    site: &SiteConfig,
    visited: &HashSet<String>,
) -> (HashSet<String>, HashSet<String>) {
    let absolute = absolutize_all(links, site);

    let candidates: HashSet<String> = absolute
        .iter()
        .filter(|url| site.is_candidate(url))
        .cloned()
        .collect();
    let irrelevant: HashSet<String> = absolute
        .into_iter()
        .filter(|url| !candidates.contains(url))
        .collect();
    let relevant: HashSet<String> = candidates
        .into_iter()
        .filter(|url| !visited.contains(url))
        .collect();

    (relevant, irrelevant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SitePatterns;

    fn site() -> SiteConfig {
        SiteConfig::compile(SitePatterns {
            base_url: "https://site.example".to_string(),
            article_url: "https://site\\.example/a".to_string(),
            board_url: "https://site\\.example/b".to_string(),
            irrelevant_url: "forbidden".to_string(),
            forum_root: "/phpbb".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn path_relative_links_get_base_prefix() {
        assert_eq!(
            absolutize("/a/1", &site()),
            "https://site.example/a/1"
        );
    }

    #[test]
    fn dot_relative_links_resolve_under_forum_root() {
        assert_eq!(
            absolutize("./viewtopic.php?t=9", &site()),
            "https://site.example/phpbb/viewtopic.php?t=9"
        );
    }

    #[test]
    fn schemeless_links_get_base_prefix() {
        assert_eq!(
            absolutize("a/page.html", &site()),
            "https://site.examplea/page.html"
        );
    }

    #[test]
    fn absolutize_is_idempotent_on_absolute_urls() {
        let url = "https://site.example/a/1";
        assert_eq!(absolutize(url, &site()), url);
        assert_eq!(absolutize(&absolutize(url, &site()), &site()), url);
    }

    #[test]
    fn sort_incoming_is_a_partition() {
        let links: HashSet<String> = [
            "/a/1".to_string(),
            "/b/2".to_string(),
            "/other".to_string(),
            "/a/forbidden-1".to_string(),
        ]
        .into();
        let (relevant, irrelevant) = sort_incoming(links, &site(), &HashSet::new());

        assert_eq!(relevant.len() + irrelevant.len(), 4);
        assert!(relevant.is_disjoint(&irrelevant));
        assert!(relevant.contains("https://site.example/a/1"));
        assert!(relevant.contains("https://site.example/b/2"));
        assert!(irrelevant.contains("https://site.example/other"));
        assert!(irrelevant.contains("https://site.example/a/forbidden-1"));
    }

    #[test]
    fn sort_incoming_subtracts_visited_from_relevant_only() {
        let links: HashSet<String> = ["/a/1".to_string(), "/a/2".to_string()].into();
        let visited: HashSet<String> = ["https://site.example/a/1".to_string()].into();
        let (relevant, irrelevant) = sort_incoming(links, &site(), &visited);

        assert_eq!(
            relevant,
            HashSet::from(["https://site.example/a/2".to_string()])
        );
        assert!(irrelevant.is_empty());
    }
}
