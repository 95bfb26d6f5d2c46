// ============================================================================
// TMDB API Types
// ============================================================================

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use super::{CatalogEntity, MediaKind, PromotionalVideo, VideoType};

/// Envelope of every TMDB list endpoint. Items stay raw so that one bad
/// item can be skipped without failing the page.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPage {
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
}

/// A movie or series as it appears in list and detail responses
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbTitle {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
}

impl TmdbTitle {
    /// Converts into a catalog entity of the given kind. `None` when the
    /// record has no usable display title.
    pub fn into_entity(self, kind: MediaKind) -> Option<CatalogEntity> {
        let (title, date) = match kind {
            MediaKind::Movie => (self.title.or(self.name), self.release_date),
            MediaKind::Tv => (self.name.or(self.title), self.first_air_date),
        };
        let title = title.filter(|t| !t.trim().is_empty())?;

        Some(CatalogEntity {
            kind,
            id: self.id,
            title,
            overview: self.overview.filter(|o| !o.is_empty()),
            poster_path: self.poster_path,
            backdrop_path: self.backdrop_path,
            popularity: self.popularity.unwrap_or_default(),
            vote_average: self.vote_average,
            release_date: date.as_deref().and_then(parse_date),
        })
    }

    /// Kind announced by mixed-kind endpoints (search/multi, trending/all)
    pub fn announced_kind(&self) -> Option<MediaKind> {
        match self.media_type.as_deref()? {
            "movie" => Some(MediaKind::Movie),
            "tv" => Some(MediaKind::Tv),
            _ => None,
        }
    }
}

/// Decodes one raw list item. With `kind` set the endpoint is single-kind;
/// otherwise the item must announce a movie or tv `media_type`.
pub fn decode_list_item(raw: serde_json::Value, kind: Option<MediaKind>) -> Option<CatalogEntity> {
    let title: TmdbTitle = match serde_json::from_value(raw) {
        Ok(title) => title,
        Err(e) => {
            tracing::debug!(error = %e, "Skipping undecodable catalog item");
            return None;
        }
    };
    let kind = kind.or_else(|| title.announced_kind())?;
    title.into_entity(kind)
}

/// Response from `/{kind}/{id}/videos`
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbVideos {
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbVideo {
    pub key: String,
    #[serde(default)]
    pub name: String,
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
    #[serde(default)]
    pub official: Option<bool>,
    #[serde(default)]
    pub published_at: Option<String>,
}

impl From<TmdbVideo> for PromotionalVideo {
    fn from(video: TmdbVideo) -> Self {
        PromotionalVideo {
            video_type: VideoType::from_tag(&video.video_type),
            published_at: video.published_at.as_deref().and_then(parse_timestamp),
            key: video.key,
            name: video.name,
            site: video.site,
            official: video.official,
        }
    }
}

pub fn decode_video(raw: serde_json::Value) -> Option<PromotionalVideo> {
    serde_json::from_value::<TmdbVideo>(raw)
        .map(PromotionalVideo::from)
        .map_err(|e| tracing::debug!(error = %e, "Skipping undecodable video"))
        .ok()
}

/// `YYYY-MM-DD`; empty or malformed values are treated as absent
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// RFC 3339 timestamp; malformed values are treated as absent
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|ts| ts.with_timezone(&Utc))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_movie_item_decoding() {
        let raw = json!({
            "id": 693134,
            "title": "Dune: Part Two",
            "poster_path": "/czembW0Rk1Ke7lCJGahbOhdCuhV.jpg",
            "backdrop_path": null,
            "popularity": 512.3,
            "vote_average": 8.2,
            "release_date": "2024-02-27"
        });

        let entity = decode_list_item(raw, Some(MediaKind::Movie)).unwrap();
        assert_eq!(entity.kind, MediaKind::Movie);
        assert_eq!(entity.id, 693134);
        assert_eq!(entity.title, "Dune: Part Two");
        assert_eq!(entity.backdrop_path, None);
        assert_eq!(entity.release_date, NaiveDate::from_ymd_opt(2024, 2, 27));
    }

    #[test]
    fn test_series_item_uses_name_and_air_date() {
        let raw = json!({
            "id": 1399,
            "name": "Game of Thrones",
            "first_air_date": "2011-04-17"
        });

        let entity = decode_list_item(raw, Some(MediaKind::Tv)).unwrap();
        assert_eq!(entity.title, "Game of Thrones");
        assert_eq!(entity.popularity, 0.0);
        assert_eq!(entity.release_date, NaiveDate::from_ymd_opt(2011, 4, 17));
    }

    #[test]
    fn test_malformed_date_is_absent() {
        let raw = json!({ "id": 1, "title": "Untitled", "release_date": "" });
        let entity = decode_list_item(raw, Some(MediaKind::Movie)).unwrap();
        assert_eq!(entity.release_date, None);

        let raw = json!({ "id": 2, "title": "Untitled", "release_date": "2024-13-45" });
        let entity = decode_list_item(raw, Some(MediaKind::Movie)).unwrap();
        assert_eq!(entity.release_date, None);
    }

    #[test]
    fn test_mixed_item_requires_media_type() {
        let person = json!({ "id": 287, "name": "Brad Pitt", "media_type": "person" });
        assert!(decode_list_item(person, None).is_none());

        let untagged = json!({ "id": 3, "title": "Mystery" });
        assert!(decode_list_item(untagged, None).is_none());

        let series = json!({ "id": 1399, "name": "Game of Thrones", "media_type": "tv" });
        assert_eq!(decode_list_item(series, None).unwrap().kind, MediaKind::Tv);
    }

    #[test]
    fn test_item_without_title_or_id_skipped() {
        assert!(decode_list_item(json!({ "id": 4 }), Some(MediaKind::Movie)).is_none());
        assert!(decode_list_item(json!({ "title": "No id" }), Some(MediaKind::Movie)).is_none());
        assert!(decode_list_item(json!("garbage"), Some(MediaKind::Movie)).is_none());
    }

    #[test]
    fn test_video_decoding() {
        let raw = json!({
            "iso_639_1": "en",
            "name": "Official Trailer",
            "key": "Way9Dexny3w",
            "site": "YouTube",
            "type": "Trailer",
            "official": true,
            "published_at": "2023-12-19T14:00:12.000Z"
        });

        let video = decode_video(raw).unwrap();
        assert_eq!(video.video_type, VideoType::Trailer);
        assert_eq!(video.official, Some(true));
        assert_eq!(
            video.published_at,
            Some(Utc.with_ymd_and_hms(2023, 12, 19, 14, 0, 12).unwrap())
        );
    }

    #[test]
    fn test_video_optional_fields() {
        let raw = json!({
            "key": "k",
            "site": "YouTube",
            "type": "Teaser",
            "published_at": "yesterday"
        });

        let video = decode_video(raw).unwrap();
        assert_eq!(video.video_type, VideoType::Teaser);
        assert_eq!(video.official, None);
        assert_eq!(video.published_at, None);
        assert_eq!(video.name, "");
    }
}
