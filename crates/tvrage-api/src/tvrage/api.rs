//! `TvRageApi` trait definition.
#![allow(clippy::future_not_send)]

use anyhow::Result;

use super::types::{
    Countdown, CurrentShows, EpisodeInfo, EpisodeList, FullSchedule, Show, ShowInfo,
};

/// TVRage feed API trait.
///
/// Abstracts the feed operations for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(TvRageApi: Send)]
pub trait LocalTvRageApi {
    /// Searches shows by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request, XML parsing, or model
    /// construction fails.
    async fn search(&self, show: &str) -> Result<Vec<Show>>;

    /// Fetches the detail record for one show.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request, XML parsing, or model
    /// construction fails.
    async fn show_info(&self, show_id: u32) -> Result<ShowInfo>;

    /// Fetches the full season/episode listing for one show.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request, XML parsing, or model
    /// construction fails.
    async fn episode_list(&self, show_id: u32) -> Result<EpisodeList>;

    /// Fetches the detail record for one episode of one show.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request, XML parsing, or model
    /// construction fails.
    async fn episode_info(&self, show_id: u32, season: u32, episode: u32) -> Result<EpisodeInfo>;

    /// Fetches the full broadcast schedule.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request, XML parsing, or model
    /// construction fails.
    async fn full_schedule(&self) -> Result<FullSchedule>;

    /// Fetches the per-country countdown of upcoming episodes.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request, XML parsing, or model
    /// construction fails.
    async fn countdown(&self) -> Result<Countdown>;

    /// Fetches the per-country listing of currently airing shows.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request, XML parsing, or model
    /// construction fails.
    async fn current_shows(&self) -> Result<CurrentShows>;
}
