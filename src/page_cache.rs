use once_cell::unsync::OnceCell;
use reqwest::Url;
use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::error::{ScrapeError, ScrapeResult};

/// One fetched HTML document and the exact URL (query included) that
/// produced it.
#[derive(Debug, Clone)]
pub struct RawPage {
    pub key: String,
    pub body: String,
}

impl RawPage {
    pub fn new(key: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            body: body.into(),
        }
    }
}

pub fn build_url(url: &str, params: &[(&str, String)]) -> ScrapeResult<Url> {
    let invalid = |reason: String| ScrapeError::InvalidUrl {
        url: url.to_string(),
        reason,
    };
    if params.is_empty() {
        return Url::parse(url).map_err(|err| invalid(err.to_string()));
    }
    Url::parse_with_params(url, params.iter().map(|(k, v)| (*k, v.as_str())))
        .map_err(|err| invalid(err.to_string()))
}

/// One GET, no retry. Transport failures and non-2xx statuses are returned
/// as-is and abort the extraction of this page.
pub fn fetch_page(client: &Client, url: &str, params: &[(&str, String)]) -> ScrapeResult<RawPage> {
    let url = build_url(url, params)?;
    let key = url.to_string();
    info!(url = %key, "fetching page");

    let resp = client
        .get(url)
        .send()
        .map_err(|source| ScrapeError::Transport {
            url: key.clone(),
            source,
        })?;
    let status = resp.status();
    if !status.is_success() {
        return Err(ScrapeError::Status {
            url: key,
            status: status.as_u16(),
        });
    }
    let body = resp.text().map_err(|source| ScrapeError::Transport {
        url: key.clone(),
        source,
    })?;
    debug!(url = %key, bytes = body.len(), "page fetched");
    Ok(RawPage { key, body })
}

/// Page slot owned by one extractor. Filled on first use and never
/// refetched; dropped with the extractor.
#[derive(Debug, Default)]
pub struct LazyPage {
    slot: OnceCell<RawPage>,
}

impl LazyPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot that already holds `page`; no request is ever made.
    pub fn preloaded(page: RawPage) -> Self {
        let slot = OnceCell::new();
        let _ = slot.set(page);
        Self { slot }
    }

    pub fn is_loaded(&self) -> bool {
        self.slot.get().is_some()
    }

    pub fn get_or_fetch(
        &self,
        client: &Client,
        url: &str,
        params: &[(&str, String)],
    ) -> ScrapeResult<&RawPage> {
        self.slot.get_or_try_init(|| fetch_page(client, url, params))
    }

    /// The cached page, if any, without fetching.
    pub fn get(&self) -> Option<&RawPage> {
        self.slot.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_url_appends_params_in_order() {
        let url = build_url(
            "https://example.com/2021/top",
            &[("L", "46381".to_string()), ("YEAR", "2020".to_string())],
        )
        .unwrap();
        assert_eq!(url.as_str(), "https://example.com/2021/top?L=46381&YEAR=2020");
    }

    #[test]
    fn build_url_rejects_relative() {
        assert!(matches!(
            build_url("player?L=1", &[]),
            Err(ScrapeError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn preloaded_page_is_served_without_fetch() {
        let page = LazyPage::preloaded(RawPage::new("k", "<html></html>"));
        assert!(page.is_loaded());
        assert_eq!(page.get().map(|p| p.key.as_str()), Some("k"));
        assert!(!LazyPage::new().is_loaded());
    }
}
