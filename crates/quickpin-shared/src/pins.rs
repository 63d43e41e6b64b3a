use serde::{Deserialize, Serialize};

/// Ordered set of pinned snippets, most recently used first.
///
/// Stored as a plain JSON array. Decoding drops blank entries and later
/// duplicates so a hand-edited record cannot break the set invariant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct PinSet {
    items: Vec<String>,
}

impl PinSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.items.iter().any(|p| p == text)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    /// Inserts at the front. Returns false for blank or already pinned text.
    pub fn prepend(&mut self, text: &str) -> bool {
        if text.trim().is_empty() || self.contains(text) {
            return false;
        }
        self.items.insert(0, text.to_string());
        true
    }

    /// Moves `text` to the front, inserting it when absent.
    pub fn promote(&mut self, text: &str) {
        self.items.retain(|p| p != text);
        self.items.insert(0, text.to_string());
    }

    pub fn remove(&mut self, text: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|p| p != text);
        self.items.len() != before
    }
}

impl From<Vec<String>> for PinSet {
    fn from(raw: Vec<String>) -> Self {
        let mut set = PinSet::new();
        for text in raw {
            if !text.trim().is_empty() && !set.contains(&text) {
                set.items.push(text);
            }
        }
        set
    }
}

impl From<PinSet> for Vec<String> {
    fn from(set: PinSet) -> Self {
        set.items
    }
}

impl<'a> FromIterator<&'a str> for PinSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        PinSet::from(iter.into_iter().map(str::to_string).collect::<Vec<_>>())
    }
}
