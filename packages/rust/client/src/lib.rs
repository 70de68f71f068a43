//! Fetches summoner pages for the extractor.
//!
//! One GET per page, no retries, no caching. Status and transport failures
//! surface as [`ScoutError::Network`].

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, instrument};
use url::Url;

use champscout_shared::{AppConfig, FetchConfig, Locale, Result, RiotId, ScoutError};

/// Which summoner page to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummonerPage {
    /// "Most played" champions with win/loss tallies.
    Champions,
    /// Champion mastery scores.
    Mastery,
}

impl SummonerPage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Champions => "champions",
            Self::Mastery => "mastery",
        }
    }
}

/// Raw HTML of both summoner pages.
#[derive(Debug, Clone)]
pub struct SummonerPages {
    pub champions: String,
    pub mastery: String,
}

/// HTTP client bound to one site, locale, and region.
pub struct PageClient {
    client: Client,
    base_url: Url,
    locale: Locale,
    region: String,
}

impl PageClient {
    /// Create a client from the `[fetch]` settings.
    pub fn new(fetch: &FetchConfig, locale: Locale, region: &str) -> Result<Self> {
        let base_url = Url::parse(&fetch.base_url)
            .map_err(|e| ScoutError::config(format!("invalid base_url '{}': {e}", fetch.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ScoutError::config(format!(
                "base_url '{}' cannot carry a path",
                fetch.base_url
            )));
        }

        let client = Client::builder()
            .user_agent(fetch.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(fetch.timeout_secs))
            .build()
            .map_err(|e| ScoutError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            locale,
            region: region.to_string(),
        })
    }

    /// Create a client from the full app config.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(&config.fetch, config.defaults.locale, &config.defaults.region)
    }

    /// `{base}/{locale}/lol/summoners/{region}/{name-tag}/{page}`, percent-encoded.
    pub fn page_url(&self, riot_id: &RiotId, page: SummonerPage) -> Url {
        let mut url = self.base_url.clone();
        let slug = riot_id.slug();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend([
                self.locale.as_str(),
                "lol",
                "summoners",
                self.region.as_str(),
                slug.as_str(),
                page.as_str(),
            ]);
        }
        url
    }

    /// GET one page and return its body.
    #[instrument(skip_all, fields(riot_id = %riot_id, page = page.as_str()))]
    pub async fn fetch_page(&self, riot_id: &RiotId, page: SummonerPage) -> Result<String> {
        let url = self.page_url(riot_id, page);
        debug!(%url, "fetching page");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| ScoutError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScoutError::Network(format!("{url}: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ScoutError::Network(format!("{url}: body read failed: {e}")))?;

        debug!(%url, bytes = body.len(), "page fetched");
        Ok(body)
    }

    /// Fetch the champions and mastery pages concurrently.
    pub async fn fetch_summoner(&self, riot_id: &RiotId) -> Result<SummonerPages> {
        let (champions, mastery) = tokio::try_join!(
            self.fetch_page(riot_id, SummonerPage::Champions),
            self.fetch_page(riot_id, SummonerPage::Mastery),
        )?;

        info!(%riot_id, "fetched summoner pages");
        Ok(SummonerPages { champions, mastery })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(base_url: &str) -> PageClient {
        let fetch = FetchConfig {
            base_url: base_url.to_string(),
            ..FetchConfig::default()
        };
        PageClient::new(&fetch, Locale::Ko, "kr").unwrap()
    }

    #[test]
    fn page_url_encodes_riot_id() {
        let client = client_for("https://op.gg");
        let id: RiotId = "Hide on bush#KR1".parse().unwrap();
        assert_eq!(
            client.page_url(&id, SummonerPage::Champions).as_str(),
            "https://op.gg/ko/lol/summoners/kr/Hide%20on%20bush-KR1/champions"
        );
        assert_eq!(
            client.page_url(&id, SummonerPage::Mastery).as_str(),
            "https://op.gg/ko/lol/summoners/kr/Hide%20on%20bush-KR1/mastery"
        );
    }

    #[test]
    fn invalid_base_url_is_a_config_error() {
        let fetch = FetchConfig {
            base_url: "not a url".into(),
            ..FetchConfig::default()
        };
        let err = PageClient::new(&fetch, Locale::Ko, "kr").err().unwrap();
        assert!(matches!(err, ScoutError::Config { .. }));
    }

    #[tokio::test]
    async fn fetches_both_pages() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/ko/lol/summoners/kr/Faker-KR1/champions"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("<p>champions</p>"))
            .mount(&server)
            .await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/ko/lol/summoners/kr/Faker-KR1/mastery"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("<p>mastery</p>"))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let id: RiotId = "Faker#KR1".parse().unwrap();
        let pages = client.fetch_summoner(&id).await.unwrap();

        assert_eq!(pages.champions, "<p>champions</p>");
        assert_eq!(pages.mastery, "<p>mastery</p>");
    }

    #[tokio::test]
    async fn non_success_status_is_a_network_error() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let id: RiotId = "Nobody#0000".parse().unwrap();
        let err = client
            .fetch_page(&id, SummonerPage::Champions)
            .await
            .unwrap_err();

        assert!(matches!(err, ScoutError::Network(_)));
        assert!(err.to_string().contains("404"));
    }
}
