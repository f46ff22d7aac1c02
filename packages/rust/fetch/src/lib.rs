//! PEP page fetching and visible-text extraction.
//!
//! One synchronous-in-order GET per PEP number against the canonical URL
//! template, with the page's human-visible text pulled out via `scraper`.
//!
//! Failure policy at this call site: a non-2xx status becomes an empty
//! content string so one unreachable PEP does not abort the whole run;
//! network-level failures (DNS, connect, timeout) stay fatal.

use std::time::Duration;

use scraper::{Html, Node};
use tracing::{debug, instrument, warn};

use pepsum_shared::{FetchConfig, PepNumber, PepsumError, Result};

/// User-Agent string for fetch requests.
const USER_AGENT: &str = concat!("pepsum/", env!("CARGO_PKG_VERSION"));

/// Elements whose text is never human-visible.
const INVISIBLE_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];

// ---------------------------------------------------------------------------
// PepFetcher
// ---------------------------------------------------------------------------

/// HTTP client for the PEP index site, reused across all fetches in a run.
pub struct PepFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl PepFetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PepsumError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Canonical URL for a PEP page.
    ///
    /// The number is passed through unpadded; the live site serves
    /// zero-padded paths but redirects the unpadded form.
    pub fn pep_url(&self, number: PepNumber) -> String {
        format!("{}/pep-{}/", self.base_url, number)
    }

    /// Fetch one PEP page and return its visible text.
    ///
    /// Returns an empty string on any non-2xx status (soft failure).
    #[instrument(skip(self), fields(pep = %number))]
    pub async fn fetch_pep(&self, number: PepNumber) -> Result<String> {
        let url = self.pep_url(number);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PepsumError::Transport(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "PEP page unavailable, continuing with empty content");
            return Ok(String::new());
        }

        let body = response
            .text()
            .await
            .map_err(|e| PepsumError::Transport(format!("{url}: body read failed: {e}")))?;

        let text = extract_visible_text(&body);
        debug!(html_len = body.len(), text_len = text.len(), "PEP page fetched");
        Ok(text)
    }
}

// ---------------------------------------------------------------------------
// Text extraction
// ---------------------------------------------------------------------------

/// Extract all human-visible text from an HTML document.
///
/// Markup is discarded; text inside `script`/`style`/`noscript`/`template`
/// is skipped; runs of whitespace collapse to single spaces within a text
/// node, with one newline between nodes.
pub fn extract_visible_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut chunks: Vec<String> = Vec::new();

    for node in doc.tree.nodes() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let invisible = node.ancestors().any(|a| match a.value() {
            Node::Element(el) => INVISIBLE_TAGS.contains(&el.name()),
            _ => false,
        });
        if invisible {
            continue;
        }

        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if !collapsed.is_empty() {
            chunks.push(collapsed);
        }
    }

    chunks.join("\n")
}
