//! Probing of adjacent listing pages. A probe fetches the page behind a
//! pagination link and reports whether it holds any post in the active
//! language; the controller uses the answer to decide whether the link is
//! worth showing.

use crate::document::{Direction, Document, Surface};
use crate::filter::{count_matches, ProbeOutcome};
use crate::href;
use crate::language::Language;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Fetches the markup of a page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> anyhow::Result<String>;
}

/// A [`PageFetcher`] over HTTP.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Builds a fetcher. Without a `timeout`, a stalled request waits as long
    /// as the underlying connection does.
    pub fn new(timeout: Option<Duration>) -> anyhow::Result<HttpFetcher> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(HttpFetcher {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> anyhow::Result<String> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Probes the pages behind the surface's previous and next links
/// concurrently and returns once both probes have finished. Directions
/// without a link, with an unusable href, or whose fetch fails are reported
/// as `false`.
///
/// An untagged post on a probed page only counts when `lang` is `default`.
pub async fn probe_adjacent<S, F>(
    surface: &S,
    fetcher: &F,
    lang: Language,
    default: Language,
) -> ProbeOutcome
where
    S: Surface + ?Sized,
    F: PageFetcher + ?Sized,
{
    let location = surface.location();
    let previous = surface.pager_href(Direction::Previous);
    let next = surface.pager_href(Direction::Next);

    let (previous, next) = futures::future::join(
        probe_one(fetcher, location, Direction::Previous, previous, lang, default),
        probe_one(fetcher, location, Direction::Next, next, lang, default),
    )
    .await;

    debug!(previous, next, lang = %lang, "adjacent page probes joined");
    ProbeOutcome { previous, next }
}

async fn probe_one<F>(
    fetcher: &F,
    location: &Url,
    direction: Direction,
    href: Option<&str>,
    lang: Language,
    default: Language,
) -> bool
where
    F: PageFetcher + ?Sized,
{
    let href = match href {
        Some(href) => href,
        None => return false,
    };

    let url = match href::resolve(location, href) {
        Ok(url) => url,
        Err(e) => {
            warn!(direction = direction.name(), href, error = %e, "skipping probe");
            return false;
        }
    };

    match fetcher.fetch(&url).await {
        Ok(markup) => {
            let page = Document::parse(url.clone(), &markup);
            let matches = count_matches(page.item_tags(), lang, default);
            debug!(direction = direction.name(), url = %url, matches, "probed adjacent page");
            matches > 0
        }
        Err(e) => {
            warn!(direction = direction.name(), url = %url, error = %e, "probe failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves canned pages by path; any other path fails.
    struct StubFetcher {
        pages: HashMap<String, String>,
        calls: AtomicUsize,
    }

    impl StubFetcher {
        fn new(pages: &[(&str, &str)]) -> Self {
            StubFetcher {
                pages: pages
                    .iter()
                    .map(|(path, markup)| (path.to_string(), markup.to_string()))
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PageFetcher for StubFetcher {
        async fn fetch(&self, url: &Url) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.pages
                .get(url.path())
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("connection refused: {}", url))
        }
    }

    fn listing(location: &str, previous: Option<&str>, next: Option<&str>) -> Document {
        let mut markup = String::from(r#"<ul class="pager">"#);
        if let Some(href) = previous {
            markup.push_str(&format!(r#"<li class="previous"><a href="{}">Newer</a></li>"#, href));
        }
        if let Some(href) = next {
            markup.push_str(&format!(r#"<li class="next"><a href="{}">Older</a></li>"#, href));
        }
        markup.push_str("</ul>");
        Document::parse(Url::parse(location).unwrap(), &markup)
    }

    const VI_ONLY: &str = r#"<div class="post-preview" data-post-lang="vi"></div>"#;
    const ONE_EN: &str = r#"<div class="post-preview" data-post-lang="vi"></div>
        <div class="post-preview" data-post-lang="en"></div>"#;
    const UNTAGGED: &str = r#"<div class="post-preview"></div>"#;

    #[tokio::test]
    async fn test_next_without_matches() {
        let fetcher = StubFetcher::new(&[("/page3/", VI_ONLY)]);
        let doc = listing("https://example.org/page2/", None, Some("/page3/"));
        let outcome = probe_adjacent(&doc, &fetcher, Language::En, Language::Vi).await;
        assert_eq!(ProbeOutcome::default(), outcome);
    }

    #[tokio::test]
    async fn test_next_with_one_match() {
        let fetcher = StubFetcher::new(&[("/page3/", ONE_EN)]);
        let doc = listing("https://example.org/page2/", None, Some("/page3/"));
        let outcome = probe_adjacent(&doc, &fetcher, Language::En, Language::Vi).await;
        assert_eq!(
            ProbeOutcome {
                previous: false,
                next: true
            },
            outcome
        );
    }

    #[tokio::test]
    async fn test_untagged_counts_for_default_only() {
        let fetcher = StubFetcher::new(&[("/page3/", UNTAGGED)]);
        let doc = listing("https://example.org/page2/", None, Some("/page3/"));
        assert!(!probe_adjacent(&doc, &fetcher, Language::En, Language::Vi).await.next);
        assert!(probe_adjacent(&doc, &fetcher, Language::Vi, Language::Vi).await.next);
    }

    #[tokio::test]
    async fn test_failed_previous_does_not_block_next() {
        let fetcher = StubFetcher::new(&[("/page3/", ONE_EN)]);
        let doc = listing(
            "https://example.org/page2/",
            Some("/index.html"),
            Some("/page3/"),
        );
        let outcome = probe_adjacent(&doc, &fetcher, Language::En, Language::Vi).await;
        assert_eq!(
            ProbeOutcome {
                previous: false,
                next: true
            },
            outcome
        );
        assert_eq!(2, fetcher.calls.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_no_links_no_fetches() {
        let fetcher = StubFetcher::new(&[]);
        let doc = listing("https://example.org/", None, None);
        let outcome = probe_adjacent(&doc, &fetcher, Language::En, Language::Vi).await;
        assert_eq!(ProbeOutcome::default(), outcome);
        assert_eq!(0, fetcher.calls.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_cross_origin_skipped() {
        let fetcher = StubFetcher::new(&[("/page3/", ONE_EN)]);
        let doc = listing(
            "https://example.org/page2/",
            None,
            Some("https://elsewhere.org/page3/"),
        );
        let outcome = probe_adjacent(&doc, &fetcher, Language::En, Language::Vi).await;
        assert!(!outcome.next);
        assert_eq!(0, fetcher.calls.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_http_fetcher() {
        let server = MockServer::start_async().await;
        let page_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/page3/");
                then.status(200)
                    .header("Content-Type", "text/html")
                    .body(ONE_EN);
            })
            .await;
        let missing_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/index.html");
                then.status(404);
            })
            .await;

        let fetcher = HttpFetcher::new(Some(Duration::from_secs(5))).unwrap();
        let doc = listing(&server.url("/page2/"), Some("/index.html"), Some("/page3/"));
        let outcome = probe_adjacent(&doc, &fetcher, Language::En, Language::Vi).await;

        page_mock.assert_async().await;
        missing_mock.assert_async().await;
        assert_eq!(
            ProbeOutcome {
                previous: false,
                next: true
            },
            outcome
        );
    }
}
