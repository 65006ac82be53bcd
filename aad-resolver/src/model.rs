//! Resolved entity records and MusicBrainz identifier constants
//!
//! Both record types are append-only cache values: once stored under an
//! identifier they are never replaced.

/// `part of` area-area relationship type
pub const RELATIONSHIP_TYPE_PART_OF: &str = "de7cc874-8b1b-3a05-8272-f3834c968fb7";

/// Area type: country
pub const AREA_TYPE_COUNTRY: &str = "06dd0ae4-8c74-30bb-b43d-95dcedf961de";
/// Area type: county
pub const AREA_TYPE_COUNTY: &str = "bcecec27-8bdb-3e00-8254-d948dda502fa";
/// Area type: municipality
pub const AREA_TYPE_MUNICIPALITY: &str = "17246454-5ac4-36a1-b81a-4753eb2dab20";
/// Area type: subdivision
pub const AREA_TYPE_SUBDIVISION: &str = "fd3d44c5-80a1-3842-9745-2c4972d35afa";

/// Kind of entity fetched from the knowledge service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Artist,
    Area,
}

impl EntityKind {
    /// Path segment used by the web service
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Artist => "artist",
            EntityKind::Area => "area",
        }
    }

    /// Prefix used in scheduler task identifiers
    pub fn task_label(&self) -> &'static str {
        match self {
            EntityKind::Artist => "Artist",
            EntityKind::Area => "Area",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Area-valued artist fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaField {
    Area,
    BeginArea,
    EndArea,
}

impl AreaField {
    pub const ALL: [AreaField; 3] = [AreaField::Area, AreaField::BeginArea, AreaField::EndArea];

    /// Key of the field in an artist document
    pub fn key(&self) -> &'static str {
        match self {
            AreaField::Area => "area",
            AreaField::BeginArea => "begin-area",
            AreaField::EndArea => "end-area",
        }
    }

    /// Output name for the drilled country code
    pub fn country_key(&self) -> &'static str {
        match self {
            AreaField::Area => "country",
            AreaField::BeginArea => "begin-country",
            AreaField::EndArea => "end-country",
        }
    }

    /// Output name for the composed location string
    pub fn location_key(&self) -> &'static str {
        match self {
            AreaField::Area => "location",
            AreaField::BeginArea => "begin-location",
            AreaField::EndArea => "end-location",
        }
    }
}

/// Resolved artist details
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtistRecord {
    pub id: String,
    pub artist_type: Option<String>,
    pub gender: Option<String>,
    pub name: Option<String>,
    pub sort_name: Option<String>,
    pub disambiguation: Option<String>,
    /// Life-span begin
    pub begin: Option<String>,
    /// Life-span end
    pub end: Option<String>,
    pub area: Option<String>,
    pub begin_area: Option<String>,
    pub end_area: Option<String>,
}

impl ArtistRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Non-area fields that are present, keyed by their document name
    pub fn plain_fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("type", &self.artist_type),
            ("gender", &self.gender),
            ("name", &self.name),
            ("sort-name", &self.sort_name),
            ("disambiguation", &self.disambiguation),
            ("begin", &self.begin),
            ("end", &self.end),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
        .collect()
    }

    pub fn area_id(&self, field: AreaField) -> Option<&str> {
        match field {
            AreaField::Area => self.area.as_deref(),
            AreaField::BeginArea => self.begin_area.as_deref(),
            AreaField::EndArea => self.end_area.as_deref(),
        }
    }

    pub fn set_area_id(&mut self, field: AreaField, area_id: String) {
        match field {
            AreaField::Area => self.area = Some(area_id),
            AreaField::BeginArea => self.begin_area = Some(area_id),
            AreaField::EndArea => self.end_area = Some(area_id),
        }
    }

    /// Area fields that are present
    pub fn area_fields(&self) -> Vec<(AreaField, &str)> {
        AreaField::ALL
            .into_iter()
            .filter_map(|field| self.area_id(field).map(|id| (field, id)))
            .collect()
    }
}

/// One node of the area hierarchy; `parent` is an identifier key, not a link
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AreaRecord {
    /// Parent area identifier (empty at a hierarchy root)
    pub parent: String,
    pub name: String,
    /// Two-letter country code (countries only)
    pub country: String,
    /// Area type identifier
    pub area_type: String,
    /// Human-readable area type
    pub type_text: String,
}

impl AreaRecord {
    pub fn is_country(&self) -> bool {
        self.area_type == AREA_TYPE_COUNTRY
    }
}
