use serde::{Deserialize, Serialize};

use crate::catalog::api_types::{RawDetails, RawProviders, RawSummary, RawVideo};

pub const MAX_CAST: usize = 10;
pub const MAX_WRITERS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    /// Path segment used by the remote API.
    pub fn as_path(self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "movie" => Some(MediaKind::Movie),
            "tv" => Some(MediaKind::Tv),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaSummary {
    pub id: i64,
    pub title: String,
    pub media_type: MediaKind,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub overview: String,
    pub vote_average: f64,
    pub release_date: Option<String>,
}

impl MediaSummary {
    /// `fallback` applies when the record carries no `media_type`
    /// (trending/top-rated movie lists).
    pub fn from_raw(raw: RawSummary, fallback: MediaKind) -> Option<Self> {
        let media_type = match raw.media_type.as_deref() {
            Some(kind) => MediaKind::parse(kind)?,
            None => fallback,
        };
        let title = match media_type {
            MediaKind::Movie => raw.title.or(raw.name),
            MediaKind::Tv => raw.name.or(raw.title),
        }
        .unwrap_or_default();
        let release_date = match media_type {
            MediaKind::Movie => raw.release_date,
            MediaKind::Tv => raw.first_air_date,
        };
        Some(Self {
            id: raw.id,
            title,
            media_type,
            poster_path: raw.poster_path,
            backdrop_path: raw.backdrop_path,
            overview: raw.overview.unwrap_or_default(),
            vote_average: raw.vote_average.unwrap_or_default(),
            release_date: release_date.filter(|d| !d.is_empty()),
        })
    }
}

/// Multi-search results carry people too; only movies and series survive.
pub fn search_results(raw: Vec<RawSummary>) -> Vec<MediaSummary> {
    raw.into_iter()
        .filter(|r| matches!(r.media_type.as_deref(), Some("movie") | Some("tv")))
        .filter_map(|r| MediaSummary::from_raw(r, MediaKind::Movie))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    pub name: String,
    pub character: Option<String>,
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credit {
    pub name: String,
    pub job: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub provider_name: String,
    pub logo_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaDetails {
    pub id: i64,
    pub media_type: MediaKind,
    pub title: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub runtime: Option<i64>,
    pub vote_average: f64,
    pub vote_count: i64,
    pub genres: Vec<String>,
    pub tagline: Option<String>,
    pub status: Option<String>,
    pub budget: Option<i64>,
    pub revenue: Option<i64>,
    pub number_of_seasons: Option<i64>,
    pub number_of_episodes: Option<i64>,
    pub trailer_key: Option<String>,
    pub cast: Vec<CastMember>,
    pub directors: Vec<Credit>,
    pub writers: Vec<Credit>,
    #[serde(default)]
    pub providers: Vec<Provider>,
    #[serde(default)]
    pub in_watchlist: bool,
}

pub fn pick_trailer(videos: &[RawVideo]) -> Option<String> {
    videos
        .iter()
        .find(|v| v.kind.as_deref() == Some("Trailer") && v.site.as_deref() == Some("YouTube"))
        .and_then(|v| v.key.clone())
}

impl MediaDetails {
    pub fn from_raw(raw: RawDetails, kind: MediaKind) -> Self {
        let trailer_key = pick_trailer(&raw.videos.results);
        let cast = raw
            .credits
            .cast
            .into_iter()
            .filter_map(|c| {
                Some(CastMember {
                    name: c.name?,
                    character: c.character,
                    profile_path: c.profile_path,
                })
            })
            .take(MAX_CAST)
            .collect();

        let (title, release_date, runtime, directors, writers) = match kind {
            MediaKind::Movie => {
                let directors = raw
                    .credits
                    .crew
                    .iter()
                    .filter(|c| c.job.as_deref() == Some("Director"))
                    .filter_map(|c| {
                        Some(Credit {
                            name: c.name.clone()?,
                            job: c.job.clone(),
                        })
                    })
                    .collect();
                let writers = raw
                    .credits
                    .crew
                    .iter()
                    .filter(|c| c.department.as_deref() == Some("Writing"))
                    .filter_map(|c| {
                        Some(Credit {
                            name: c.name.clone()?,
                            job: c.job.clone(),
                        })
                    })
                    .take(MAX_WRITERS)
                    .collect();
                (
                    raw.title.or(raw.name),
                    raw.release_date,
                    raw.runtime,
                    directors,
                    writers,
                )
            }
            MediaKind::Tv => {
                let creators = raw
                    .created_by
                    .into_iter()
                    .filter_map(|p| {
                        Some(Credit {
                            name: p.name?,
                            job: Some("Creator".into()),
                        })
                    })
                    .collect();
                (
                    raw.name.or(raw.title),
                    raw.first_air_date,
                    raw.episode_run_time.first().copied(),
                    creators,
                    Vec::new(),
                )
            }
        };

        let (budget, revenue, seasons, episodes) = match kind {
            MediaKind::Movie => (raw.budget, raw.revenue, None, None),
            MediaKind::Tv => (None, None, raw.number_of_seasons, raw.number_of_episodes),
        };

        Self {
            id: raw.id,
            media_type: kind,
            title: title.unwrap_or_default(),
            overview: raw.overview.unwrap_or_default(),
            poster_path: raw.poster_path,
            backdrop_path: raw.backdrop_path,
            release_date: release_date.filter(|d| !d.is_empty()),
            runtime,
            vote_average: raw.vote_average.unwrap_or_default(),
            vote_count: raw.vote_count.unwrap_or_default(),
            genres: raw.genres.into_iter().map(|g| g.name).collect(),
            tagline: raw.tagline.filter(|t| !t.is_empty()),
            status: raw.status,
            budget,
            revenue,
            number_of_seasons: seasons,
            number_of_episodes: episodes,
            trailer_key,
            cast,
            directors,
            writers,
            providers: Vec::new(),
            in_watchlist: false,
        }
    }
}

pub fn region_providers(mut raw: RawProviders, region: &str) -> Vec<Provider> {
    raw.results
        .remove(region)
        .map(|r| r.flatrate)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| {
            Some(Provider {
                provider_name: p.provider_name?,
                logo_path: p.logo_path,
            })
        })
        .collect()
}

/// What the player page needs to embed a title.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerDescriptor {
    pub tmdb_id: i64,
    pub media_type: MediaKind,
    pub title: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_seasons: Option<i64>,
}

impl PlayerDescriptor {
    pub fn movie(details: &MediaDetails) -> Self {
        Self {
            tmdb_id: details.id,
            media_type: MediaKind::Movie,
            title: details.title.clone(),
            poster_path: details.poster_path.clone(),
            backdrop_path: details.backdrop_path.clone(),
            season: None,
            episode: None,
            total_seasons: None,
        }
    }

    pub fn episode(details: &MediaDetails, season: u32, episode: u32) -> Self {
        Self {
            tmdb_id: details.id,
            media_type: MediaKind::Tv,
            title: details.title.clone(),
            poster_path: details.poster_path.clone(),
            backdrop_path: details.backdrop_path.clone(),
            season: Some(season),
            episode: Some(episode),
            total_seasons: Some(details.number_of_seasons.unwrap_or(1)),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}
