//! Knowledge-service document parsing
//!
//! Documents are treated as opaque JSON dictionaries; only the keys read
//! here matter. Missing keys degrade to empty or default values rather than
//! failing the document.

use crate::model::{ArtistRecord, AreaField, AREA_TYPE_COUNTRY, RELATIONSHIP_TYPE_PART_OF};
use serde_json::Value;
use std::collections::BTreeSet;

const ISO_CODES_1: &str = "iso-3166-1-codes";
const ISO_CODES_2: &str = "iso-3166-2-codes";

pub const UNKNOWN_AREA_NAME: &str = "Unknown Name";
pub const UNKNOWN_AREA_TYPE: &str = "Unknown Area Type";

/// Selected elements of an area document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArea {
    pub id: String,
    pub name: String,
    pub country: String,
    pub area_type: String,
    pub type_text: String,
}

impl ParsedArea {
    pub fn is_country(&self) -> bool {
        self.area_type == AREA_TYPE_COUNTRY
    }
}

/// Direction of a `part of` relation as seen from the fetched area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationDirection {
    /// The fetched area is part of the related area
    Backward,
    /// The related area is part of the fetched area
    Forward,
    Other,
}

/// A `part of` relation with its related area parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaRelation {
    pub direction: RelationDirection,
    pub area: ParsedArea,
}

/// Artist identifiers credited on a track
#[derive(Debug, Clone, Default)]
pub struct TrackCredits {
    pub artist_ids: BTreeSet<String>,
    /// Expected elements that were missing from the payload
    pub missing: Vec<&'static str>,
}

fn non_empty_str<'a>(doc: &'a Value, key: &str) -> Option<&'a str> {
    doc.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn first_str<'a>(doc: &'a Value, key: &str) -> Option<&'a str> {
    doc.get(key)
        .and_then(Value::as_array)
        .and_then(|codes| codes.first())
        .and_then(Value::as_str)
}

/// Parse the area elements used by the hierarchy
///
/// A document without an `id` yields an all-empty result.
pub fn parse_area(doc: &Value) -> ParsedArea {
    let Some(id) = doc.get("id").and_then(Value::as_str) else {
        return ParsedArea::default();
    };

    let name = doc
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_AREA_NAME);
    let area_type = doc.get("type-id").and_then(Value::as_str).unwrap_or("");
    let type_text = doc
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_AREA_TYPE);

    let mut country = String::new();
    if area_type == AREA_TYPE_COUNTRY {
        if let Some(code) = first_str(doc, ISO_CODES_1) {
            country = code.to_string();
        } else if let Some(code) = first_str(doc, ISO_CODES_2) {
            country = code.chars().take(2).collect();
        }
    }

    ParsedArea {
        id: id.to_string(),
        name: name.to_string(),
        country,
        area_type: area_type.to_string(),
        type_text: type_text.to_string(),
    }
}

/// `part of` relations of an area document
///
/// Relations without a type, without an area object, of another type, or
/// whose related area has no identifier are dropped.
pub fn part_of_relations(doc: &Value) -> Vec<AreaRelation> {
    let Some(relations) = doc.get("relations").and_then(Value::as_array) else {
        return Vec::new();
    };

    relations
        .iter()
        .filter(|rel| {
            rel.get("type-id").and_then(Value::as_str) == Some(RELATIONSHIP_TYPE_PART_OF)
        })
        .filter_map(|rel| {
            let area = parse_area(rel.get("area")?);
            if area.id.is_empty() {
                return None;
            }
            let direction = match rel.get("direction").and_then(Value::as_str) {
                Some("backward") => RelationDirection::Backward,
                Some("forward") => RelationDirection::Forward,
                _ => RelationDirection::Other,
            };
            Some(AreaRelation { direction, area })
        })
        .collect()
}

/// Build an artist record from an artist document
pub fn parse_artist(artist_id: &str, doc: &Value) -> ArtistRecord {
    let text = |key: &str| non_empty_str(doc, key).map(str::to_string);

    let mut record = ArtistRecord {
        id: artist_id.to_string(),
        artist_type: text("type"),
        gender: text("gender"),
        name: text("name"),
        sort_name: text("sort-name"),
        disambiguation: text("disambiguation"),
        ..ArtistRecord::default()
    };

    if let Some(life_span) = doc.get("life-span") {
        record.begin = non_empty_str(life_span, "begin").map(str::to_string);
        record.end = non_empty_str(life_span, "end").map(str::to_string);
    }

    for field in AreaField::ALL {
        let area_id = doc
            .get(field.key())
            .and_then(|area| non_empty_str(area, "id"));
        if let Some(area_id) = area_id {
            record.set_area_id(field, area_id.to_string());
        }
    }

    record
}

/// Artist identifiers from a track's `artist-credit` list
pub fn track_credits(track: &Value) -> TrackCredits {
    let mut credits = TrackCredits::default();

    let Some(entries) = track.get("artist-credit").and_then(Value::as_array) else {
        credits.missing.push("artist-credit");
        return credits;
    };

    for entry in entries {
        match entry.get("artist") {
            Some(artist) => {
                if let Some(id) = artist.get("id").and_then(Value::as_str) {
                    credits.artist_ids.insert(id.to_string());
                }
            }
            None => credits.missing.push("artist-credit.artist"),
        }
    }

    credits
}

/// Track nodes of a release document (`media[].tracks[]`)
pub fn release_tracks(release: &Value) -> Vec<&Value> {
    release
        .get("media")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|medium| medium.get("tracks").and_then(Value::as_array))
        .flatten()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_area_without_id_is_empty() {
        let parsed = parse_area(&json!({"name": "Nowhere"}));
        assert_eq!(parsed, ParsedArea::default());
    }

    #[test]
    fn test_parse_area_defaults() {
        let parsed = parse_area(&json!({"id": "x"}));
        assert_eq!(parsed.name, UNKNOWN_AREA_NAME);
        assert_eq!(parsed.type_text, UNKNOWN_AREA_TYPE);
        assert_eq!(parsed.area_type, "");
        assert_eq!(parsed.country, "");
    }

    #[test]
    fn test_country_code_prefers_iso_1() {
        let parsed = parse_area(&json!({
            "id": "gb",
            "name": "United Kingdom",
            "type-id": AREA_TYPE_COUNTRY,
            "type": "Country",
            "iso-3166-1-codes": ["GB"],
            "iso-3166-2-codes": ["XX-ENG"],
        }));
        assert_eq!(parsed.country, "GB");
        assert!(parsed.is_country());
    }

    #[test]
    fn test_country_code_falls_back_to_iso_2_prefix() {
        let parsed = parse_area(&json!({
            "id": "eng",
            "type-id": AREA_TYPE_COUNTRY,
            "iso-3166-1-codes": [],
            "iso-3166-2-codes": ["GB-ENG"],
        }));
        assert_eq!(parsed.country, "GB");
    }

    #[test]
    fn test_country_code_only_for_country_type() {
        let parsed = parse_area(&json!({
            "id": "city",
            "type-id": "something-else",
            "iso-3166-1-codes": ["GB"],
        }));
        assert_eq!(parsed.country, "");
    }

    #[test]
    fn test_part_of_relations_filtering() {
        let doc = json!({
            "id": "city",
            "relations": [
                {"type-id": RELATIONSHIP_TYPE_PART_OF, "direction": "backward",
                 "area": {"id": "county", "name": "County"}},
                {"type-id": "other-type", "direction": "backward",
                 "area": {"id": "ignored"}},
                {"direction": "backward", "area": {"id": "no-type"}},
                {"type-id": RELATIONSHIP_TYPE_PART_OF, "direction": "forward"},
                {"type-id": RELATIONSHIP_TYPE_PART_OF, "direction": "forward",
                 "area": {"name": "no id"}},
                {"type-id": RELATIONSHIP_TYPE_PART_OF, "direction": "sideways",
                 "area": {"id": "odd"}},
            ]
        });

        let relations = part_of_relations(&doc);
        assert_eq!(relations.len(), 2);
        assert_eq!(relations[0].direction, RelationDirection::Backward);
        assert_eq!(relations[0].area.id, "county");
        assert_eq!(relations[1].direction, RelationDirection::Other);
    }

    #[test]
    fn test_parse_artist_fields() {
        let doc = json!({
            "id": "a1",
            "type": "Person",
            "gender": "Female",
            "name": "Alice",
            "sort-name": "Alice",
            "disambiguation": "",
            "life-span": {"begin": "1970-01-01", "end": null},
            "area": {"id": "area-1", "name": "Somewhere"},
            "begin-area": {"id": ""},
            "end-area": null,
        });

        let record = parse_artist("a1", &doc);
        assert_eq!(record.artist_type.as_deref(), Some("Person"));
        assert_eq!(record.sort_name.as_deref(), Some("Alice"));
        assert_eq!(record.disambiguation, None);
        assert_eq!(record.begin.as_deref(), Some("1970-01-01"));
        assert_eq!(record.end, None);
        assert_eq!(record.area.as_deref(), Some("area-1"));
        assert_eq!(record.begin_area, None);
        assert_eq!(record.end_area, None);
    }

    #[test]
    fn test_track_credits_missing_list() {
        let credits = track_credits(&json!({"title": "Song"}));
        assert!(credits.artist_ids.is_empty());
        assert_eq!(credits.missing, vec!["artist-credit"]);
    }

    #[test]
    fn test_track_credits_entries() {
        let credits = track_credits(&json!({
            "artist-credit": [
                {"artist": {"id": "a1"}},
                {"name": "feat."},
                {"artist": {"name": "no id"}},
                {"artist": {"id": "a2"}},
                {"artist": {"id": "a1"}},
            ]
        }));
        let ids: Vec<_> = credits.artist_ids.iter().map(String::as_str).collect();
        assert_eq!(ids, vec!["a1", "a2"]);
        assert_eq!(credits.missing, vec!["artist-credit.artist"]);
    }

    #[test]
    fn test_release_tracks_flattens_media() {
        let release = json!({
            "media": [
                {"tracks": [{"title": "one"}, {"title": "two"}]},
                {"tracks": [{"title": "three"}]},
                {"format": "CD"},
            ]
        });
        let titles: Vec<_> = release_tracks(&release)
            .into_iter()
            .filter_map(|t| t["title"].as_str())
            .collect();
        assert_eq!(titles, vec!["one", "two", "three"]);
    }
}
