//! Typed views over the feed responses.
//!
//! Every model is built once from one [`Element`] and is read-only after
//! construction. The feed may omit almost any leaf, so scalar fields are
//! `Option`; containers (`genres`, `network`, `akas`, `Episodelist`) and
//! record children are part of the shape contract and their absence is a
//! structural error.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};

use super::dates;
use super::xml::Element;

/// A single result from the `search` feed.
#[derive(Debug, Clone)]
pub struct Show {
    /// Show name.
    pub name: Option<String>,
    /// Show page URL.
    pub link: Option<String>,
    /// Airing status (e.g. "Ended").
    pub status: Option<String>,
    /// Programming classification (e.g. "Scripted").
    pub classification: Option<String>,
    /// Country of origin.
    pub country: Option<String>,
    /// Show ID.
    pub showid: Option<u32>,
    /// First airing year.
    pub started: Option<u32>,
    /// Last airing year.
    pub ended: Option<u32>,
    /// Number of seasons.
    pub seasons: Option<u32>,
    /// Genres in document order.
    pub genres: Vec<String>,
}

impl Show {
    /// Builds one search result from a `<show>` element.
    ///
    /// # Errors
    ///
    /// Returns an error if the `<genres>` container is missing.
    pub fn from_element(e: &Element) -> Result<Self> {
        Ok(Self {
            name: e.child_string("name"),
            link: e.child_string("link"),
            status: e.child_string("status"),
            classification: e.child_string("classification"),
            country: e.child_string("country"),
            showid: e.child_parsed("showid"),
            started: e.child_parsed("started"),
            ended: e.child_parsed("ended"),
            seasons: e.child_parsed("seasons"),
            genres: e.child_list("genres")?,
        })
    }
}

impl fmt::Display for Show {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name.as_deref().unwrap_or_default())
    }
}

/// The `showinfo` feed response.
#[derive(Debug, Clone)]
pub struct ShowInfo {
    /// Show name.
    pub showname: Option<String>,
    /// Show page URL.
    pub showlink: Option<String>,
    /// Poster image URL.
    pub image: Option<String>,
    /// Country of origin.
    pub origin_country: Option<String>,
    /// Airing status.
    pub status: Option<String>,
    /// Programming classification.
    pub classification: Option<String>,
    /// Air time of day (e.g. "20:00").
    pub airtime: Option<String>,
    /// Air day of week.
    pub airday: Option<String>,
    /// Broadcast timezone.
    pub timezone: Option<String>,
    /// Show ID.
    pub showid: Option<u32>,
    /// Number of seasons.
    pub seasons: Option<u32>,
    /// First airing year.
    pub started: Option<u32>,
    /// Episode runtime in minutes.
    pub runtime: Option<u32>,
    /// First airing date.
    pub startdate: Option<NaiveDate>,
    /// Last airing date.
    pub ended: Option<NaiveDate>,
    /// Genres in document order.
    pub genres: Vec<String>,
    /// Network per country code.
    pub network: HashMap<String, Option<String>>,
    /// Alternate titles per country code.
    pub akas: HashMap<String, Option<String>>,
}

impl ShowInfo {
    /// Builds the show detail model from the feed root.
    ///
    /// # Errors
    ///
    /// Returns an error if the `<genres>`, `<network>`, or `<akas>`
    /// container is missing.
    pub fn from_element(e: &Element) -> Result<Self> {
        Ok(Self {
            showname: e.child_string("showname"),
            showlink: e.child_string("showlink"),
            image: e.child_string("image"),
            origin_country: e.child_string("origin_country"),
            status: e.child_string("status"),
            classification: e.child_string("classification"),
            airtime: e.child_string("airtime"),
            airday: e.child_string("airday"),
            timezone: e.child_string("timezone"),
            showid: e.child_parsed("showid"),
            seasons: e.child_parsed("seasons"),
            started: e.child_parsed("started"),
            runtime: e.child_parsed("runtime"),
            startdate: e.child_text("startdate").and_then(dates::parse_show_date),
            ended: e.child_text("ended").and_then(dates::parse_show_date),
            genres: e.child_list("genres")?,
            network: e.child_dict("network", "country")?,
            akas: e.child_dict("akas", "country")?,
        })
    }
}

impl fmt::Display for ShowInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.showname.as_deref().unwrap_or_default())
    }
}

/// The `episode_list` feed response.
#[derive(Debug, Clone)]
pub struct EpisodeList {
    /// Show name.
    pub name: Option<String>,
    /// Total season count.
    pub totalseasons: Option<u32>,
    /// Seasons in document order.
    pub seasons: Vec<Season>,
}

impl EpisodeList {
    /// Builds the episode list model from the feed root.
    ///
    /// # Errors
    ///
    /// Returns an error if the `<Episodelist>` container is missing or a
    /// season is malformed.
    pub fn from_element(e: &Element) -> Result<Self> {
        let seasons = e
            .required_child("Episodelist")?
            .children()
            .iter()
            .map(Season::from_element)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            name: e.child_string("name"),
            totalseasons: e.child_parsed("totalseasons"),
            seasons,
        })
    }
}

impl fmt::Display for EpisodeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name.as_deref().unwrap_or_default())
    }
}

/// One season inside an [`EpisodeList`].
#[derive(Debug, Clone)]
pub struct Season {
    /// Season number, read from the `no` attribute.
    pub no: Option<u32>,
    /// Episodes in document order.
    pub episodes: Vec<Episode>,
}

impl Season {
    /// Builds a season from a `<Season>` element; every child node becomes
    /// an episode.
    ///
    /// # Errors
    ///
    /// Returns an error if the `no` attribute is present but not numeric.
    pub fn from_element(e: &Element) -> Result<Self> {
        Ok(Self {
            no: e.attr_parsed("no")?,
            episodes: e.children().iter().map(Episode::from_element).collect(),
        })
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.no.unwrap_or_default())
    }
}

/// One episode inside a [`Season`].
#[derive(Debug, Clone)]
pub struct Episode {
    /// Production number.
    pub prodnum: Option<String>,
    /// Episode page URL.
    pub link: Option<String>,
    /// Episode title.
    pub title: Option<String>,
    /// Screencap image URL.
    pub screencap: Option<String>,
    /// Absolute episode number.
    pub epnum: Option<u32>,
    /// Episode number within its season.
    pub seasonnum: Option<u32>,
    /// Viewer rating.
    pub rating: Option<f64>,
    /// Airdate; an unparseable value is `None`.
    pub airdate: Option<NaiveDate>,
}

impl Episode {
    /// Builds an episode from an `<episode>` element. Every field is
    /// optional, so this cannot fail.
    #[must_use]
    pub fn from_element(e: &Element) -> Self {
        Self {
            prodnum: e.child_string("prodnum"),
            link: e.child_string("link"),
            title: e.child_string("title"),
            screencap: e.child_string("screencap"),
            epnum: e.child_parsed("epnum"),
            seasonnum: e.child_parsed("seasonnum"),
            rating: e.child_parsed("rating"),
            airdate: e.child_text("airdate").and_then(dates::parse_episode_date),
        }
    }
}

impl fmt::Display for Episode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.seasonnum.unwrap_or_default())
    }
}

/// The queried episode inside an [`EpisodeInfo`].
#[derive(Debug, Clone)]
pub struct EpisodeSummary {
    /// Episode number as printed by the feed (e.g. "3x05").
    pub number: Option<String>,
    /// Episode title.
    pub title: Option<String>,
    /// Episode page URL.
    pub url: Option<String>,
    /// Airdate. Unlike every other date field, a value that fails to parse
    /// is an error here.
    pub airdate: NaiveDate,
}

impl EpisodeSummary {
    fn from_element(e: &Element) -> Result<Self> {
        let raw = e.required_text("airdate")?;
        let airdate = NaiveDate::parse_from_str(&raw, dates::EPISODE_DATE_FORMAT)
            .with_context(|| format!("invalid <airdate> {raw:?} under <{}>", e.name()))?;
        Ok(Self {
            number: e.record_field("number")?,
            title: e.record_field("title")?,
            url: e.record_field("url")?,
            airdate,
        })
    }
}

/// The most recently aired episode inside an [`EpisodeInfo`].
#[derive(Debug, Clone)]
pub struct LatestEpisode {
    /// Episode number as printed by the feed.
    pub number: Option<String>,
    /// Episode title.
    pub title: Option<String>,
    /// Airdate, parsed as strictly as [`EpisodeSummary::airdate`].
    pub airdate: NaiveDate,
}

impl LatestEpisode {
    fn from_element(e: &Element) -> Result<Self> {
        let raw = e.required_text("airdate")?;
        let airdate = NaiveDate::parse_from_str(&raw, dates::EPISODE_DATE_FORMAT)
            .with_context(|| format!("invalid <airdate> {raw:?} under <{}>", e.name()))?;
        Ok(Self {
            number: e.record_field("number")?,
            title: e.record_field("title")?,
            airdate,
        })
    }
}

/// The `episodeinfo` feed response.
#[derive(Debug, Clone)]
pub struct EpisodeInfo {
    /// Show name.
    pub name: Option<String>,
    /// Show page URL.
    pub link: Option<String>,
    /// Country of origin.
    pub country: Option<String>,
    /// Airing status.
    pub status: Option<String>,
    /// Programming classification.
    pub classification: Option<String>,
    /// Air time of day.
    pub airtime: Option<String>,
    /// Episode runtime in minutes.
    pub runtime: Option<u32>,
    /// Genres in document order.
    pub genres: Vec<String>,
    /// The queried episode.
    pub episode: EpisodeSummary,
    /// The most recently aired episode.
    pub latest_episode: LatestEpisode,
}

impl EpisodeInfo {
    /// Builds the episode detail model from the feed root.
    ///
    /// # Errors
    ///
    /// Returns an error if the `<genres>` container, the `<episode>` or
    /// `<latestepisode>` record, any of their fields, or either airdate is
    /// missing or malformed.
    pub fn from_element(e: &Element) -> Result<Self> {
        Ok(Self {
            name: e.child_string("name"),
            link: e.child_string("link"),
            country: e.child_string("country"),
            status: e.child_string("status"),
            classification: e.child_string("classification"),
            airtime: e.child_string("airtime"),
            runtime: e.child_parsed("runtime"),
            genres: e.child_list("genres")?,
            episode: EpisodeSummary::from_element(e.required_child("episode")?)?,
            latest_episode: LatestEpisode::from_element(e.required_child("latestepisode")?)?,
        })
    }
}

impl fmt::Display for EpisodeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name.as_deref().unwrap_or_default())
    }
}

/// One show entry in a [`FullSchedule`] time slot.
#[derive(Debug, Clone)]
pub struct ScheduleShow {
    /// Broadcasting network.
    pub network: Option<String>,
    /// Show title.
    pub title: Option<String>,
    /// Episode number as printed by the feed.
    pub ep: Option<String>,
    /// Show page URL.
    pub link: Option<String>,
}

/// The `fullschedule` feed response, keyed by air timestamp.
#[derive(Debug, Clone)]
pub struct FullSchedule {
    /// Shows on air, keyed by timestamp and then show name.
    pub dates: BTreeMap<NaiveDateTime, HashMap<String, ScheduleShow>>,
}

impl FullSchedule {
    /// Builds the schedule from the feed root: day elements carry the date
    /// in their `attr` attribute, time slots the 12-hour clock in theirs.
    ///
    /// # Errors
    ///
    /// Returns an error if a day, time, or show node is missing its key
    /// attribute, a timestamp does not parse, or a show record is missing
    /// a field.
    pub fn from_element(e: &Element) -> Result<Self> {
        let mut entries = BTreeMap::new();
        for day in e.children() {
            let date = day.required_attr("attr")?;
            for slot in day.children() {
                let clock = slot.required_attr("attr")?;
                let at = dates::parse_schedule_datetime(date, clock)?;
                let mut shows = HashMap::with_capacity(slot.children().len());
                for show in slot.children() {
                    let name = show.required_attr("name")?;
                    shows.insert(
                        String::from(name),
                        ScheduleShow {
                            network: show.record_field("network")?,
                            title: show.record_field("title")?,
                            ep: show.record_field("ep")?,
                            link: show.record_field("link")?,
                        },
                    );
                }
                entries.insert(at, shows);
            }
        }
        Ok(Self { dates: entries })
    }
}

/// The next episode of a [`CountdownShow`].
#[derive(Debug, Clone)]
pub struct UpcomingEpisode {
    /// Episode page URL.
    pub link: Option<String>,
    /// Episode title.
    pub title: Option<String>,
    /// Episode number as printed by the feed.
    pub epnum: Option<String>,
    /// Airdate; an unparseable value is `None`.
    pub airdate: Option<NaiveDate>,
    /// Human-readable distance (e.g. "In 7 days").
    pub relativedate: Option<String>,
}

/// One show entry in a [`Countdown`] country.
#[derive(Debug, Clone)]
pub struct CountdownShow {
    /// Show ID, as printed by the feed.
    pub showid: Option<String>,
    /// Show name.
    pub showname: Option<String>,
    /// Show page URL.
    pub showlink: Option<String>,
    /// The next episode to air.
    pub upcomingep: UpcomingEpisode,
}

/// The `countdown` feed response.
#[derive(Debug, Clone)]
pub struct Countdown {
    /// Upcoming shows, keyed by country name.
    pub countries: HashMap<String, Vec<CountdownShow>>,
}

impl Countdown {
    /// Builds the countdown from the feed root.
    ///
    /// # Errors
    ///
    /// Returns an error if a country is missing its `name` attribute or a
    /// show record is missing a field (including the whole `<upcomingep>`
    /// record or its `<airdate>` text).
    pub fn from_element(e: &Element) -> Result<Self> {
        let mut countries = HashMap::with_capacity(e.children().len());
        for country in e.children() {
            let name = country.required_attr("name")?;
            let mut shows = Vec::with_capacity(country.children().len());
            for show in country.children() {
                let upcoming = show.required_child("upcomingep")?;
                shows.push(CountdownShow {
                    showid: show.record_field("showid")?,
                    showname: show.record_field("showname")?,
                    showlink: show.record_field("showlink")?,
                    upcomingep: UpcomingEpisode {
                        link: upcoming.record_field("link")?,
                        title: upcoming.record_field("title")?,
                        epnum: upcoming.record_field("epnum")?,
                        airdate: dates::parse_show_date(&upcoming.required_text("airdate")?),
                        relativedate: upcoming.record_field("relativedate")?,
                    },
                });
            }
            countries.insert(String::from(name), shows);
        }
        Ok(Self { countries })
    }
}

/// One show entry in a [`CurrentShows`] country.
#[derive(Debug, Clone)]
pub struct CurrentShow {
    /// Show ID, as printed by the feed.
    pub showid: Option<String>,
    /// Show name.
    pub showname: Option<String>,
    /// Show page URL.
    pub showlink: Option<String>,
}

/// The `currentshows` feed response.
#[derive(Debug, Clone)]
pub struct CurrentShows {
    /// Currently airing shows, keyed by country name.
    pub countries: HashMap<String, Vec<CurrentShow>>,
}

impl CurrentShows {
    /// Builds the current-shows listing from the feed root.
    ///
    /// # Errors
    ///
    /// Returns an error if a country is missing its `name` attribute or a
    /// show record is missing a field.
    pub fn from_element(e: &Element) -> Result<Self> {
        let mut countries = HashMap::with_capacity(e.children().len());
        for country in e.children() {
            let name = country.required_attr("name")?;
            let mut shows = Vec::with_capacity(country.children().len());
            for show in country.children() {
                shows.push(CurrentShow {
                    showid: show.record_field("showid")?,
                    showname: show.record_field("showname")?,
                    showlink: show.record_field("showlink")?,
                });
            }
            countries.insert(String::from(name), shows);
        }
        Ok(Self { countries })
    }
}
