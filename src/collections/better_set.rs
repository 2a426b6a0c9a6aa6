//! Identity-keyed ordered set
//!
//! Items are de-duplicated by a caller-supplied identity function and keep
//! their insertion order. Operations that "modify" the set come in two
//! flavours: persistent ones (`add_item`, `merge`, `remove`, `filter`) return
//! a new set, while `insert` updates in place.

use std::fmt;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

/// Function that maps an item to the key it is de-duplicated by
pub type IdentifyBy<T> = fn(&T) -> String;

/// Ordered set of unique items keyed by an identity function
#[derive(Clone)]
pub struct BetterSet<T> {
    items: IndexMap<String, T>,
    identify_by: IdentifyBy<T>,
}

impl<T> BetterSet<T> {
    /// Create an empty set keyed by `identify_by`
    pub fn new(identify_by: IdentifyBy<T>) -> Self {
        Self {
            items: IndexMap::new(),
            identify_by,
        }
    }

    /// Build a set from items; later items replace earlier ones with the same key
    pub fn from_items(items: impl IntoIterator<Item = T>, identify_by: IdentifyBy<T>) -> Self {
        let mut set = Self::new(identify_by);
        for item in items {
            set.insert(item);
        }
        set
    }

    /// The identity function this set is keyed by
    pub fn identify_by(&self) -> IdentifyBy<T> {
        self.identify_by
    }

    /// Key of an item under this set's identity function
    pub fn key_of(&self, item: &T) -> String {
        (self.identify_by)(item)
    }

    /// Insert in place. An item whose key is already present replaces the
    /// existing one at the same position.
    ///
    /// # Returns
    /// `true` if the key was new
    pub fn insert(&mut self, item: T) -> bool {
        let key = self.key_of(&item);
        self.items.insert(key, item).is_none()
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    pub fn has(&self, item: &T) -> bool {
        self.has_key(&self.key_of(item))
    }

    /// Look an item up by key
    pub fn get(&self, key: &str) -> Option<&T> {
        self.items.get(key)
    }

    /// First item (in insertion order) matching the predicate
    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<&T> {
        self.items.values().find(|item| predicate(item))
    }

    pub fn every(&self, predicate: impl Fn(&T) -> bool) -> bool {
        self.items.values().all(predicate)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = String> + '_ {
        self.items.keys().cloned()
    }

    /// True when both sets hold the same keys, regardless of order
    pub fn same_keys<U>(&self, other: &BetterSet<U>) -> bool {
        self.len() == other.len() && self.items.keys().all(|key| other.has_key(key))
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items.into_values().collect()
    }
}

impl<T: Clone> BetterSet<T> {
    /// Persistent insert: returns a new set containing `item`
    pub fn add_item(&self, item: T) -> Self {
        let mut set = self.clone();
        set.insert(item);
        set
    }

    /// Items of `self` followed by the items of `other` whose keys are unseen.
    /// On a key collision the item from `self` is kept.
    pub fn merge(&self, other: &BetterSet<T>) -> Self {
        let mut set = self.clone();
        for item in other.iter() {
            if !set.has(item) {
                set.insert(item.clone());
            }
        }
        set
    }

    /// Persistent removal by key; the remaining items keep their order
    pub fn remove(&self, key: &str) -> Self {
        let mut set = self.clone();
        set.items.shift_remove(key);
        set
    }

    pub fn filter(&self, predicate: impl Fn(&T) -> bool) -> Self {
        let mut set = self.clone();
        set.items.retain(|_, item| predicate(item));
        set
    }
}

impl<T> BetterSet<T> {
    /// Map every item into a new set keyed by `identify_by`
    pub fn map_to_new_set<U>(&self, f: impl Fn(&T) -> U, identify_by: IdentifyBy<U>) -> BetterSet<U> {
        BetterSet::from_items(self.items.values().map(f), identify_by)
    }
}

/// Key used for sets of plain strings
pub fn identify_string(value: &String) -> String {
    value.clone()
}

/// Set of string labels keyed by the label itself
pub type LabelSet = BetterSet<String>;

impl LabelSet {
    pub fn labels(labels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::from_items(labels.into_iter().map(Into::into), identify_string)
    }

    pub fn empty() -> Self {
        Self::new(identify_string)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.has_key(label)
    }
}

impl<T: PartialEq> PartialEq for BetterSet<T> {
    /// Ordered comparison; use `same_keys` for order-independent checks
    fn eq(&self, other: &Self) -> bool {
        self.items.values().eq(other.items.values())
    }
}

impl<T: fmt::Debug> fmt::Debug for BetterSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.items.values()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for BetterSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, item) in self.items.values().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", item)?;
        }
        write!(f, "}}")
    }
}

impl<T: Serialize> Serialize for BetterSet<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.items.values())
    }
}

impl<'a, T> IntoIterator for &'a BetterSet<T> {
    type Item = &'a T;
    type IntoIter = indexmap::map::Values<'a, String, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.values()
    }
}
