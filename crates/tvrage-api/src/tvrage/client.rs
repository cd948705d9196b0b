//! `TvRageClient` - TVRage feed API client implementation.

use std::sync::OnceLock;

use anyhow::{Context, Result, bail};
use reqwest::Client;
use tracing::instrument;
use url::Url;

use super::api::LocalTvRageApi;
use super::types::{
    Countdown, CurrentShows, EpisodeInfo, EpisodeList, FullSchedule, Show, ShowInfo,
};
use super::xml::Element;

/// Default base URL for the feeds.
const DEFAULT_BASE_URL: &str = "http://services.tvrage.com/myfeeds/";

/// Default User-Agent.
const DEFAULT_USER_AGENT: &str = concat!("tvrage-api/", env!("CARGO_PKG_VERSION"));

/// Process-wide fallback API key. Written once, read-only thereafter.
static DEFAULT_API_KEY: OnceLock<String> = OnceLock::new();

/// Sets the process-wide fallback API key.
///
/// Clients built without an explicit key fall back to this value. Call it
/// once at process start; the default is immutable afterwards.
///
/// # Errors
///
/// Returns an error if a default key has already been set.
pub fn set_default_api_key(key: impl Into<String>) -> Result<()> {
    DEFAULT_API_KEY
        .set(key.into())
        .map_err(|_| anyhow::anyhow!("default API key is already set"))
}

/// TVRage feed API client.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct TvRageClient {
    /// HTTP client (reqwest, gzip enabled).
    http_client: Client,
    /// Base URL.
    base_url: Url,
    /// API key sent with every request.
    api_key: String,
}

/// Builder for `TvRageClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct TvRageClientBuilder {
    base_url: Option<Url>,
    api_key: Option<String>,
    user_agent: Option<String>,
}

impl TvRageClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            user_agent: None,
        }
    }

    /// Overrides the base URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the API key, overriding the process-wide default.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the User-Agent (default: `tvrage-api/<version>`).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - No API key is set, neither here nor via [`set_default_api_key`].
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<TvRageClient> {
        let api_key = self
            .api_key
            .or_else(|| DEFAULT_API_KEY.get().cloned())
            .context("api_key is required (set one on the builder or via set_default_api_key)")?;

        let base_url = if let Some(url) = self.base_url {
            url
        } else {
            let result = Url::parse(DEFAULT_BASE_URL);
            result.context("invalid default base URL")?
        };

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| String::from(DEFAULT_USER_AGENT));

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .gzip(true)
            .build()
            .context("failed to build HTTP client")?;

        Ok(TvRageClient {
            http_client,
            base_url,
            api_key,
        })
    }
}

impl TvRageClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> TvRageClientBuilder {
        TvRageClientBuilder::new()
    }

    /// First 500 characters of a response body, for error contexts and
    /// trace logs.
    fn preview(xml: &str) -> &str {
        match xml.char_indices().nth(500) {
            Some((boundary, _)) => xml.get(..boundary).unwrap_or(xml),
            None => xml,
        }
    }

    /// Builds an XML decode error with a preview of the response body.
    fn xml_decode_error(command: &str, xml: &str) -> String {
        format!(
            "{} XML decoding failed (len={}): {}",
            command,
            xml.len(),
            Self::preview(xml)
        )
    }

    /// Issues one GET for the given command and parses the response into an
    /// element tree. Transport failures and non-2xx statuses propagate
    /// unchanged apart from added context; there are no retries.
    async fn fetch(&self, command: &str, parameters: &[(&str, String)]) -> Result<Element> {
        let url = self
            .base_url
            .join(&format!("{command}.php"))
            .with_context(|| format!("failed to build {command} URL"))?;

        let response = self
            .http_client
            .get(url)
            .query(&[("key", self.api_key.as_str())])
            .query(parameters)
            .send()
            .await
            .with_context(|| format!("{command} request failed"))?;

        let status = response.status();
        tracing::trace!(%command, %status, "response received");
        if !status.is_success() {
            bail!("{command} failed with HTTP {status}");
        }

        let xml = response
            .text()
            .await
            .with_context(|| format!("failed to read {command} response"))?;
        tracing::debug!(%command, body_len = xml.len(), "response body received");
        tracing::trace!(%command, body_preview = Self::preview(&xml), "response body preview");

        Element::parse(&xml).with_context(|| Self::xml_decode_error(command, &xml))
    }
}

impl LocalTvRageApi for TvRageClient {
    #[instrument(skip_all)]
    async fn search(&self, show: &str) -> Result<Vec<Show>> {
        let root = self.fetch("search", &[("show", String::from(show))]).await?;
        root.children().iter().map(Show::from_element).collect()
    }

    #[instrument(skip_all)]
    async fn show_info(&self, show_id: u32) -> Result<ShowInfo> {
        let root = self.fetch("showinfo", &[("sid", show_id.to_string())]).await?;
        ShowInfo::from_element(&root)
    }

    #[instrument(skip_all)]
    async fn episode_list(&self, show_id: u32) -> Result<EpisodeList> {
        let root = self
            .fetch("episode_list", &[("sid", show_id.to_string())])
            .await?;
        EpisodeList::from_element(&root)
    }

    #[instrument(skip_all)]
    async fn episode_info(&self, show_id: u32, season: u32, episode: u32) -> Result<EpisodeInfo> {
        let root = self
            .fetch(
                "episodeinfo",
                &[
                    ("sid", show_id.to_string()),
                    ("ep", format!("{season}x{episode}")),
                ],
            )
            .await?;
        EpisodeInfo::from_element(&root)
    }

    #[instrument(skip_all)]
    async fn full_schedule(&self) -> Result<FullSchedule> {
        let root = self.fetch("fullschedule", &[]).await?;
        FullSchedule::from_element(&root)
    }

    #[instrument(skip_all)]
    async fn countdown(&self) -> Result<Countdown> {
        let root = self.fetch("countdown", &[]).await?;
        Countdown::from_element(&root)
    }

    #[instrument(skip_all)]
    async fn current_shows(&self) -> Result<CurrentShows> {
        let root = self.fetch("currentshows", &[]).await?;
        CurrentShows::from_element(&root)
    }
}
