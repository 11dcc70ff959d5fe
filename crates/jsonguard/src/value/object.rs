use core::fmt;

use ahash::AHashMap;

use super::JsonValue;

// Objects with more keys than this get a hash index next to the ordered entries.
const INDEX_THRESHOLD: usize = 16;

/// An insertion-ordered JSON object with unique keys.
///
/// Small objects are scanned linearly; larger ones maintain a key index so lookups stay
/// constant-time without giving up the original key order.
#[derive(Clone, Default)]
pub struct Object {
    entries: Vec<(String, JsonValue)>,
    index: Option<AHashMap<String, usize>>,
}

impl Object {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: None,
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        match &self.index {
            Some(index) => index.get(key).copied(),
            None => self.entries.iter().position(|(k, _)| k == key),
        }
    }

    /// Insert a key-value pair.
    ///
    /// An existing key keeps its position and the previous value is returned.
    pub fn insert(&mut self, key: String, value: JsonValue) -> Option<JsonValue> {
        if let Some(position) = self.position(&key) {
            return Some(std::mem::replace(&mut self.entries[position].1, value));
        }
        let position = self.entries.len();
        if let Some(index) = &mut self.index {
            index.insert(key.clone(), position);
        } else if position >= INDEX_THRESHOLD {
            let mut index = AHashMap::with_capacity(position + 1);
            for (idx, (k, _)) in self.entries.iter().enumerate() {
                index.insert(k.clone(), idx);
            }
            index.insert(key.clone(), position);
            self.index = Some(index);
        }
        self.entries.push((key, value));
        None
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.position(key).map(|position| &self.entries[position].1)
    }

    #[must_use]
    pub fn get_key_value(&self, key: &str) -> Option<(&String, &JsonValue)> {
        self.position(key).map(|position| {
            let (k, v) = &self.entries[position];
            (k, v)
        })
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&String, &JsonValue)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl ExactSizeIterator<Item = &String> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl ExactSizeIterator<Item = &JsonValue> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key).is_some_and(|other| value == other))
    }
}

impl Eq for Object {}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl FromIterator<(String, JsonValue)> for Object {
    fn from_iter<T: IntoIterator<Item = (String, JsonValue)>>(iter: T) -> Self {
        let iter = iter.into_iter();
        let mut object = Object::with_capacity(iter.size_hint().0);
        for (key, value) in iter {
            object.insert(key, value);
        }
        object
    }
}
