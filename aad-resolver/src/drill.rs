//! Area hierarchy drill-up
//!
//! Walks parent links from an area towards its country, collecting the
//! country code and a comma-separated location description, most specific
//! component first.

use crate::cache::AreaStore;
use crate::model::{AreaRecord, AREA_TYPE_COUNTY, AREA_TYPE_MUNICIPALITY, AREA_TYPE_SUBDIVISION};
use crate::options::LocationOptions;

/// Upper bound on parent hops; guards against cycles in malformed data
pub const MAX_DRILL_HOPS: usize = 7;

/// Whether a non-first node's name belongs in the location string
fn include_in_location(area: &AreaRecord, options: &LocationOptions) -> bool {
    match area.area_type.as_str() {
        AREA_TYPE_COUNTY => options.include_county,
        AREA_TYPE_MUNICIPALITY => options.include_municipality,
        AREA_TYPE_SUBDIVISION => options.include_subdivision,
        _ => true,
    }
}

/// Country code and location string for an area
///
/// An unresolved node ends the walk and adds nothing to the location. The
/// starting node is always part of the location; a node with an empty name
/// still counts as a hop but contributes no component.
pub fn drill_area(
    areas: &AreaStore,
    start_area_id: &str,
    options: &LocationOptions,
) -> (String, String) {
    let mut country = String::new();
    let mut location: Vec<&str> = Vec::new();
    let mut area_id = start_area_id;
    let mut first_hop = true;
    let mut hops = MAX_DRILL_HOPS;

    while hops > 0 && !area_id.is_empty() && country.is_empty() {
        hops -= 1;
        let Some(area) = areas.get(area_id) else {
            break;
        };

        country = area.country.clone();
        area_id = &area.parent;

        let include = first_hop || include_in_location(area, options);
        first_hop = false;
        if include && !area.name.is_empty() {
            location.push(&area.name);
        }
    }

    (country, location.join(", "))
}
