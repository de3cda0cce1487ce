//! Pagination walking over "next page" links.
//!
//! Given a start URL, [`crawl_pages`] repeatedly fetches the current page,
//! extracts the next-page link using the site's selector candidates, and
//! accumulates the ordered list of page URLs. The walk terminates when a
//! URL would be revisited (cycle guard), no next link is found, or the
//! optional page cap is reached.
//!
//! Relative next-link hrefs are resolved against the **start** URL, not the
//! current page, to avoid drift on sites with inconsistent base paths. A
//! fetch failure mid-walk is fatal for the crawl and propagates; the pages
//! discovered so far are not returned partially.

use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::{info, instrument};
use url::Url;

use crate::extractors::Site;
use crate::fetch::{fetch_page, FetchError};

/// Supplies page bodies to the walk loop.
///
/// The live implementation wraps [`fetch_page`]; tests substitute static
/// HTML to exercise the cycle guard and page cap without a network.
trait PageSource {
    async fn get_page(&self, url: &str) -> Result<String, FetchError>;
}

struct HttpSource<'a> {
    client: &'a Client,
}

impl PageSource for HttpSource<'_> {
    async fn get_page(&self, url: &str) -> Result<String, FetchError> {
        fetch_page(self.client, url).await
    }
}

/// Walk the pagination chain starting at `start_url`.
///
/// Returns the ordered, deduplicated list of listing page URLs.
/// `max_pages: None` means unlimited.
#[instrument(level = "info", skip(client), fields(site = %site))]
pub async fn crawl_pages(
    client: &Client,
    site: Site,
    start_url: &str,
    max_pages: Option<usize>,
) -> Result<Vec<String>, FetchError> {
    walk_pages(&HttpSource { client }, site, start_url, max_pages).await
}

async fn walk_pages(
    source: &impl PageSource,
    site: Site,
    start_url: &str,
    max_pages: Option<usize>,
) -> Result<Vec<String>, FetchError> {
    let base = Url::parse(start_url).map_err(|source| FetchError::BadUrl {
        url: start_url.to_string(),
        source,
    })?;
    let selectors: Vec<Selector> = site
        .next_page_selectors()
        .iter()
        .map(|raw| Selector::parse(raw).unwrap())
        .collect();

    let mut pages: Vec<String> = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut current = start_url.to_string();

    loop {
        if !visited.insert(current.clone()) {
            info!(url = %current, "next page already visited; stopping walk");
            break;
        }
        if let Some(cap) = max_pages {
            if pages.len() >= cap {
                info!(cap, "reached max_pages limit");
                break;
            }
        }

        info!(page = pages.len() + 1, url = %current, "queueing listing page");
        pages.push(current.clone());

        let body = source.get_page(&current).await?;
        let doc = Html::parse_document(&body);

        match next_page_url(&doc, &selectors, &base) {
            Some(next) => current = next,
            None => {
                info!("no more pages");
                break;
            }
        }
    }

    info!(count = pages.len(), "pagination walk complete");
    Ok(pages)
}

/// Find the next-page URL on a parsed listing page.
///
/// Tries each selector candidate in priority order and resolves the first
/// matching href against `base`.
pub(crate) fn next_page_url(doc: &Html, selectors: &[Selector], base: &Url) -> Option<String> {
    for selector in selectors {
        if let Some(link) = doc.select(selector).next() {
            if let Some(href) = link.value().attr("href") {
                if let Ok(resolved) = base.join(href) {
                    return Some(resolved.to_string());
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves canned listing pages; unknown URLs answer 404.
    struct PageMap {
        pages: HashMap<String, String>,
        fetches: AtomicUsize,
    }

    impl PageMap {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(url, body)| (url.to_string(), body.to_string()))
                    .collect(),
                fetches: AtomicUsize::new(0),
            }
        }

        fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    impl PageSource for PageMap {
        async fn get_page(&self, url: &str) -> Result<String, FetchError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.pages.get(url).cloned().ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: StatusCode::NOT_FOUND,
                attempts: 1,
            })
        }
    }

    fn next_link_page(href: &str) -> String {
        format!(r#"<html><body><a class="next" href="{href}">Next</a></body></html>"#)
    }

    const LAST_PAGE: &str = "<html><body><p>last page</p></body></html>";

    #[tokio::test]
    async fn test_walk_stops_on_revisit_without_duplicates() {
        // Page 2 links back to the start URL; the walk must stop there,
        // with each URL queued exactly once.
        let start = "https://pakmcqs.com/category/english-mcqs";
        let page2 = "https://pakmcqs.com/category/english-mcqs/page/2";
        let source = PageMap::new(&[
            (start, &next_link_page("/category/english-mcqs/page/2")),
            (page2, &next_link_page("/category/english-mcqs")),
        ]);

        let pages = walk_pages(&source, Site::Pakmcqs, start, None).await.unwrap();
        assert_eq!(pages, vec![start.to_string(), page2.to_string()]);
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_walk_cut_at_max_pages() {
        let urls: Vec<String> = (1..=5)
            .map(|n| format!("https://pakmcqs.com/category/english-mcqs/page/{n}"))
            .collect();
        let bodies: Vec<String> = (2..=5)
            .map(|n| next_link_page(&format!("/category/english-mcqs/page/{n}")))
            .chain(std::iter::once(LAST_PAGE.to_string()))
            .collect();
        let pages: Vec<(&str, &str)> = urls
            .iter()
            .zip(bodies.iter())
            .map(|(u, b)| (u.as_str(), b.as_str()))
            .collect();
        let source = PageMap::new(&pages);

        let walked = walk_pages(&source, Site::Pakmcqs, &urls[0], Some(3)).await.unwrap();
        assert_eq!(walked, urls[..3].to_vec());
        assert_eq!(source.fetch_count(), 3);
    }

    #[tokio::test]
    async fn test_walk_fatal_fetch_propagates() {
        // The start page links onward but the second page is missing;
        // the whole walk fails rather than returning partial results.
        let start = "https://pakmcqs.com/category/english-mcqs";
        let source = PageMap::new(&[(start, &next_link_page("/category/english-mcqs/page/2"))]);

        let result = walk_pages(&source, Site::Pakmcqs, start, None).await;
        assert!(matches!(
            result,
            Err(FetchError::Status { status, .. }) if status == StatusCode::NOT_FOUND
        ));
    }

    #[tokio::test]
    async fn test_walk_single_page_no_next_link() {
        let start = "https://testpoint.pk/paper-mcqs/5622/ppsc-all-mcqs-2025";
        let source = PageMap::new(&[(start, LAST_PAGE)]);

        let pages = walk_pages(&source, Site::Testpoint, start, None).await.unwrap();
        assert_eq!(pages, vec![start.to_string()]);
    }

    fn selectors_for(site: Site) -> Vec<Selector> {
        site.next_page_selectors()
            .iter()
            .map(|raw| Selector::parse(raw).unwrap())
            .collect()
    }

    #[test]
    fn test_testpoint_rel_next_link() {
        let doc = Html::parse_document(
            r#"<html><body>
                 <ul class="pagination">
                   <li><a class="page-link" href="/paper-mcqs/5622?page=1">1</a></li>
                   <li><a class="page-link" rel="next" href="/paper-mcqs/5622?page=2">Next</a></li>
                 </ul>
               </body></html>"#,
        );
        let base = Url::parse("https://testpoint.pk/paper-mcqs/5622/ppsc-all-mcqs-2025").unwrap();
        assert_eq!(
            next_page_url(&doc, &selectors_for(Site::Testpoint), &base),
            Some("https://testpoint.pk/paper-mcqs/5622?page=2".to_string())
        );
    }

    #[test]
    fn test_testpoint_requires_rel_next() {
        // A page-link without rel="next" must not be followed
        let doc = Html::parse_document(
            r#"<ul class="pagination"><a class="page-link" href="?page=9">9</a></ul>"#,
        );
        let base = Url::parse("https://testpoint.pk/paper-mcqs/5622").unwrap();
        assert_eq!(next_page_url(&doc, &selectors_for(Site::Testpoint), &base), None);
    }

    #[test]
    fn test_pakmcqs_next_class() {
        let doc = Html::parse_document(
            r#"<a class="next" href="https://pakmcqs.com/category/english-mcqs/page/2">Next</a>"#,
        );
        let base = Url::parse("https://pakmcqs.com/category/english-mcqs").unwrap();
        assert_eq!(
            next_page_url(&doc, &selectors_for(Site::Pakmcqs), &base),
            Some("https://pakmcqs.com/category/english-mcqs/page/2".to_string())
        );
    }

    #[test]
    fn test_pakmcqs_page_numbers_fallback() {
        let doc = Html::parse_document(
            r#"<a class="page-numbers next" href="/category/english-mcqs/page/3">→</a>"#,
        );
        let base = Url::parse("https://pakmcqs.com/category/english-mcqs/page/2").unwrap();
        assert_eq!(
            next_page_url(&doc, &selectors_for(Site::Pakmcqs), &base),
            Some("https://pakmcqs.com/category/english-mcqs/page/3".to_string())
        );
    }

    #[test]
    fn test_pacegkacademy_rel_next_fallback() {
        let doc = Html::parse_document(r#"<a rel="next" href="?page=2">Next</a>"#);
        let base = Url::parse("https://www.pacegkacademy.com/mcqs/general-knowledge").unwrap();
        assert_eq!(
            next_page_url(&doc, &selectors_for(Site::Pacegkacademy), &base),
            Some("https://www.pacegkacademy.com/mcqs/general-knowledge?page=2".to_string())
        );
    }

    #[test]
    fn test_priority_order_prefers_first_candidate() {
        let doc = Html::parse_document(
            r#"<a class="next" href="/from-next">n</a>
               <a rel="next" href="/from-rel">r</a>"#,
        );
        let base = Url::parse("https://www.pacegkacademy.com/").unwrap();
        assert_eq!(
            next_page_url(&doc, &selectors_for(Site::Pacegkacademy), &base),
            Some("https://www.pacegkacademy.com/from-next".to_string())
        );
    }

    #[test]
    fn test_no_next_link() {
        let doc = Html::parse_document("<html><body><p>last page</p></body></html>");
        let base = Url::parse("https://pakmcqs.com/category/english-mcqs").unwrap();
        assert_eq!(next_page_url(&doc, &selectors_for(Site::Pakmcqs), &base), None);
    }
}
