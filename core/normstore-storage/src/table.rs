use indexmap::IndexMap;
use normstore_model::{CanonicalKey, Record};
use serde::{Deserialize, Serialize};

/// One entity type's storage: canonical key → record, in insertion order.
///
/// Serializes as `{"data": {"<key>": {...}}}`, the layout the host state
/// tree keeps per entity type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTable {
    data: IndexMap<CanonicalKey, Record>,
}

impl NormalizedTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Record stored at `key`.
    pub fn get(&self, key: &str) -> Option<&Record> {
        self.data.get(key)
    }

    /// Whether a record is stored at `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Inserts or replaces the record at `key`.
    ///
    /// A replaced record keeps its position; a new key is appended. Returns
    /// the previous record, if any.
    pub fn insert(&mut self, key: CanonicalKey, record: Record) -> Option<Record> {
        self.data.insert(key, record)
    }

    /// Removes the record at `key`, preserving the order of the rest.
    pub fn remove(&mut self, key: &str) -> Option<Record> {
        self.data.shift_remove(key)
    }

    /// Keeps only the entries for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&CanonicalKey, &Record) -> bool) {
        self.data.retain(|k, r| keep(k, r));
    }

    /// Key/record pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&CanonicalKey, &Record)> {
        self.data.iter()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &CanonicalKey> {
        self.data.keys()
    }

    /// Records in insertion order.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.data.values()
    }

    /// Position of `key` in iteration order.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.data.get_index_of(key)
    }
}

impl FromIterator<(CanonicalKey, Record)> for NormalizedTable {
    fn from_iter<I: IntoIterator<Item = (CanonicalKey, Record)>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for NormalizedTable {
    type Item = (CanonicalKey, Record);
    type IntoIter = indexmap::map::IntoIter<CanonicalKey, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}
