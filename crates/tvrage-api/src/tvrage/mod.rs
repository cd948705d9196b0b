//! TVRage feed API client module.
//!
//! Handles HTTP requests to the TVRage `myfeeds` endpoints and maps each
//! XML response into a typed object graph.

mod api;
mod client;
mod dates;
mod types;
mod xml;

#[allow(clippy::module_name_repetitions)]
pub use api::{LocalTvRageApi, TvRageApi};
#[allow(clippy::module_name_repetitions)]
pub use client::{TvRageClient, TvRageClientBuilder, set_default_api_key};
pub use dates::{
    EPISODE_DATE_FORMAT, SCHEDULE_FORMAT, SHOW_DATE_FORMAT, parse_episode_date,
    parse_schedule_datetime, parse_show_date,
};
pub use types::{
    Countdown, CountdownShow, CurrentShow, CurrentShows, Episode, EpisodeInfo, EpisodeList,
    EpisodeSummary, FullSchedule, LatestEpisode, ScheduleShow, Season, Show, ShowInfo,
    UpcomingEpisode,
};
pub use xml::Element;
