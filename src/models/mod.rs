use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

pub mod tmdb;

/// Discriminator between film-type and series-type catalog entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    /// Path segment used by the upstream catalog for this kind
    pub fn as_path(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_path())
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "movie" | "film" => Ok(MediaKind::Movie),
            "tv" | "series" => Ok(MediaKind::Tv),
            other => Err(format!("unknown media kind '{}'", other)),
        }
    }
}

/// Identity of a catalog entity. Numeric ids are only unique within a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityKey {
    pub kind: MediaKind,
    pub id: u64,
}

impl Display for EntityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

/// A single film or series as returned by the upstream catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntity {
    pub kind: MediaKind,
    pub id: u64,
    pub title: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub popularity: f64,
    pub vote_average: Option<f64>,
    pub release_date: Option<NaiveDate>,
}

impl CatalogEntity {
    pub fn key(&self) -> EntityKey {
        EntityKey {
            kind: self.kind,
            id: self.id,
        }
    }
}

/// Closed set of promotional video type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VideoType {
    Trailer,
    Teaser,
    Clip,
    Featurette,
    BehindTheScenes,
    Bloopers,
    OpeningCredits,
    Other,
}

impl VideoType {
    /// Maps an upstream type tag; unrecognised tags become `Other`
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            "Trailer" => VideoType::Trailer,
            "Teaser" => VideoType::Teaser,
            "Clip" => VideoType::Clip,
            "Featurette" => VideoType::Featurette,
            "Behind the Scenes" => VideoType::BehindTheScenes,
            "Bloopers" => VideoType::Bloopers,
            "Opening Credits" => VideoType::OpeningCredits,
            _ => VideoType::Other,
        }
    }
}

/// A promotional video attached to one catalog entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromotionalVideo {
    pub key: String,
    pub name: String,
    pub site: String,
    pub video_type: VideoType,
    /// `None` when the upstream did not say
    pub official: Option<bool>,
    pub published_at: Option<DateTime<Utc>>,
}

impl PromotionalVideo {
    /// Link to the video on its hosting site, if the site is known
    pub fn watch_url(&self) -> Option<String> {
        match self.site.as_str() {
            "YouTube" => Some(format!("https://www.youtube.com/watch?v={}", self.key)),
            "Vimeo" => Some(format!("https://vimeo.com/{}", self.key)),
            _ => None,
        }
    }
}

/// One entity paired with the video chosen to represent its freshness
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RankedFeedItem {
    pub entity: CatalogEntity,
    pub video: PromotionalVideo,
    pub published_at: DateTime<Utc>,
    pub watch_url: Option<String>,
}

impl RankedFeedItem {
    pub fn new(entity: CatalogEntity, video: PromotionalVideo, published_at: DateTime<Utc>) -> Self {
        let watch_url = video.watch_url();
        Self {
            entity,
            video,
            published_at,
            watch_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind_parse() {
        assert_eq!("movie".parse::<MediaKind>(), Ok(MediaKind::Movie));
        assert_eq!("TV".parse::<MediaKind>(), Ok(MediaKind::Tv));
        assert_eq!("series".parse::<MediaKind>(), Ok(MediaKind::Tv));
        assert!("person".parse::<MediaKind>().is_err());
    }

    #[test]
    fn test_media_kind_serde() {
        let json = serde_json::to_string(&MediaKind::Tv).unwrap();
        assert_eq!(json, r#""tv""#);
    }

    #[test]
    fn test_entity_key_distinguishes_kind() {
        let movie = EntityKey {
            kind: MediaKind::Movie,
            id: 1399,
        };
        let series = EntityKey {
            kind: MediaKind::Tv,
            id: 1399,
        };
        assert_ne!(movie, series);
        assert_eq!(format!("{}", series), "tv/1399");
    }

    #[test]
    fn test_video_type_from_tag() {
        assert_eq!(VideoType::from_tag("Trailer"), VideoType::Trailer);
        assert_eq!(VideoType::from_tag("Teaser"), VideoType::Teaser);
        assert_eq!(
            VideoType::from_tag("Behind the Scenes"),
            VideoType::BehindTheScenes
        );
        assert_eq!(VideoType::from_tag("trailer"), VideoType::Other);
        assert_eq!(VideoType::from_tag(""), VideoType::Other);
    }

    #[test]
    fn test_watch_url() {
        let mut video = PromotionalVideo {
            key: "abc123".to_string(),
            name: "Official Trailer".to_string(),
            site: "YouTube".to_string(),
            video_type: VideoType::Trailer,
            official: Some(true),
            published_at: None,
        };
        assert_eq!(
            video.watch_url().as_deref(),
            Some("https://www.youtube.com/watch?v=abc123")
        );

        video.site = "Dailymotion".to_string();
        assert_eq!(video.watch_url(), None);
    }
}
