use std::collections::HashMap;

use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
pub struct Paged<T> {
    #[serde(default)]
    pub results: Vec<T>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct RawSummary {
    pub id: i64,
    pub title: Option<String>,
    pub name: Option<String>,
    pub media_type: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub overview: Option<String>,
    pub vote_average: Option<f64>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RawDetails {
    pub id: i64,
    pub title: Option<String>,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub runtime: Option<i64>,
    pub episode_run_time: Vec<i64>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<i64>,
    pub genres: Vec<RawGenre>,
    pub tagline: Option<String>,
    pub status: Option<String>,
    pub budget: Option<i64>,
    pub revenue: Option<i64>,
    pub number_of_seasons: Option<i64>,
    pub number_of_episodes: Option<i64>,
    pub created_by: Vec<RawPerson>,
    pub credits: RawCredits,
    pub videos: Paged<RawVideo>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RawGenre {
    pub name: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RawCredits {
    pub cast: Vec<RawCast>,
    pub crew: Vec<RawCrew>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RawCast {
    pub name: Option<String>,
    pub character: Option<String>,
    pub profile_path: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RawCrew {
    pub name: Option<String>,
    pub job: Option<String>,
    pub department: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RawPerson {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RawVideo {
    pub key: Option<String>,
    pub site: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// `/{kind}/{id}/watch/providers`, keyed by region code.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RawProviders {
    pub results: HashMap<String, RawRegionProviders>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RawRegionProviders {
    pub flatrate: Vec<RawProvider>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RawProvider {
    pub provider_name: Option<String>,
    pub logo_path: Option<String>,
}
