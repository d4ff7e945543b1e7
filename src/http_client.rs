use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

use crate::config::ScrapeConfig;

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Process-wide blocking client. Transport defaults apply: no timeout
/// override, no retry, no rate limiting.
///
/// The client is built from the first `config` passed in; later calls
/// return that same client and ignore their argument.
pub fn http_client(config: &ScrapeConfig) -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .context("failed to build http client")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_config_builds_the_shared_client() {
        let first = http_client(&ScrapeConfig::default()).unwrap();
        let other = ScrapeConfig {
            base_url: "http://127.0.0.1/".to_string(),
            user_agent: "other-agent".to_string(),
        };
        let second = http_client(&other).unwrap();
        assert!(std::ptr::eq(first, second));
    }
}
