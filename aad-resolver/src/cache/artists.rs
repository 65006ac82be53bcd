//! Resolved artist records

use crate::model::ArtistRecord;
use std::collections::HashMap;

/// Artist records keyed by artist identifier (append-only)
#[derive(Debug, Default)]
pub struct ArtistStore {
    artists: HashMap<String, ArtistRecord>,
}

impl ArtistStore {
    pub fn get(&self, artist_id: &str) -> Option<&ArtistRecord> {
        self.artists.get(artist_id)
    }

    pub fn contains(&self, artist_id: &str) -> bool {
        self.artists.contains_key(artist_id)
    }

    /// Store a record unless one is already present; returns true if stored
    pub fn put(&mut self, record: ArtistRecord) -> bool {
        if self.artists.contains_key(&record.id) {
            return false;
        }
        self.artists.insert(record.id.clone(), record);
        true
    }

    pub fn len(&self) -> usize {
        self.artists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artists.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_never_overwrites() {
        let mut store = ArtistStore::default();

        let mut first = ArtistRecord::new("a1");
        first.name = Some("First".to_string());
        let mut second = ArtistRecord::new("a1");
        second.name = Some("Second".to_string());

        assert!(store.put(first));
        assert!(!store.put(second));
        assert_eq!(store.get("a1").unwrap().name.as_deref(), Some("First"));
        assert_eq!(store.len(), 1);
    }
}
