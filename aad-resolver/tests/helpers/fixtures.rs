//! MusicBrainz-shaped documents

use aad_resolver::model::{
    AREA_TYPE_COUNTRY, AREA_TYPE_COUNTY, AREA_TYPE_MUNICIPALITY, RELATIONSHIP_TYPE_PART_OF,
};
use serde_json::{json, Value};

pub fn artist_doc(name: &str, area_id: Option<&str>) -> Value {
    let mut doc = json!({
        "name": name,
        "sort-name": name,
        "type": "Person",
    });
    if let Some(area_id) = area_id {
        doc["area"] = json!({"id": area_id, "name": "ignored"});
    }
    doc
}

pub fn part_of(direction: &str, area: Value) -> Value {
    json!({
        "type-id": RELATIONSHIP_TYPE_PART_OF,
        "type": "part of",
        "direction": direction,
        "area": area,
    })
}

/// Backward relation to country `x` (Xland, XL)
pub fn country_rel() -> Value {
    part_of(
        "backward",
        json!({
            "id": "x",
            "name": "Xland",
            "type-id": AREA_TYPE_COUNTRY,
            "type": "Country",
            "iso-3166-1-codes": ["XL"],
        }),
    )
}

/// County `county` (Shire), part of Xland
pub fn county_doc() -> Value {
    json!({
        "id": "county",
        "name": "Shire",
        "type-id": AREA_TYPE_COUNTY,
        "type": "County",
        "relations": [country_rel()],
    })
}

/// Municipality `town` (Hobbiton), part of the Shire
pub fn town_doc() -> Value {
    json!({
        "id": "town",
        "name": "Hobbiton",
        "type-id": AREA_TYPE_MUNICIPALITY,
        "type": "Municipality",
        "relations": [part_of("backward", json!({
            "id": "county",
            "name": "Shire",
            "type-id": AREA_TYPE_COUNTY,
            "type": "County",
        }))],
    })
}
