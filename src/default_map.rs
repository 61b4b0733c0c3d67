//! Hash map that answers reads of missing keys with a computed default.

use std::{
    borrow::Borrow,
    collections::hash_map::{self, HashMap},
    fmt::{self, Debug},
    hash::Hash,
};

/// A hash map whose lookups of absent keys yield a default value computed by
/// a caller-supplied factory, without inserting that key.
///
/// Reading never mutates the map: [`get()`](Self::get) on a missing key
/// calls the factory and hands back its result, but the key stays absent.
/// Writing through [`set()`](Self::set) always inserts or overwrites. The
/// only path that inserts on read is the explicitly named
/// [`get_or_insert_default()`](Self::get_or_insert_default).
///
/// Iteration only ever visits stored entries, never synthesized defaults.
/// Iteration order is unspecified, but stable for as long as the map is not
/// modified.
///
/// The map does not remove entries whose value happens to equal the default.
/// Such policies belong to the types built on top of it.
///
/// # Examples
///
/// ```
/// use tally_multiset::DefaultValuedMap;
///
/// let mut map = DefaultValuedMap::with_factory(|| 42);
/// assert_eq!(map.get("answer"), 42);
/// assert!(map.is_empty());
///
/// map.set("answer", 7);
/// assert_eq!(map.get("answer"), 7);
/// assert_eq!(map.len(), 1);
/// ```
#[derive(Clone)]
pub struct DefaultValuedMap<K, V, F = fn() -> V> {
    /// Explicitly stored entries
    entries: HashMap<K, V>,

    /// Source of values for keys that are not stored
    factory: F,
}
//
impl<K, V: Default> DefaultValuedMap<K, V> {
    /// Makes a new, empty map whose default value is [`V::default()`].
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_multiset::DefaultValuedMap;
    ///
    /// let map = DefaultValuedMap::<&str, u32>::new();
    /// assert_eq!(map.get("missing"), 0);
    /// ```
    #[must_use = "Only effect is to produce a result"]
    pub fn new() -> Self {
        Self::with_factory(V::default)
    }
}
//
impl<K, V, F> DefaultValuedMap<K, V, F> {
    /// Makes a new, empty map whose missing keys read as `factory()`.
    #[must_use = "Only effect is to produce a result"]
    pub fn with_factory(factory: F) -> Self {
        Self::from_map(HashMap::new(), factory)
    }

    /// Like [`with_factory()`](Self::with_factory), but preallocates room for
    /// at least `capacity` entries.
    #[must_use = "Only effect is to produce a result"]
    pub fn with_capacity_and_factory(capacity: usize, factory: F) -> Self {
        Self::from_map(HashMap::with_capacity(capacity), factory)
    }

    /// Adopts the entries of an existing map as-is.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use tally_multiset::DefaultValuedMap;
    ///
    /// let map = DefaultValuedMap::from_map(HashMap::from([("a", 1)]), || -1);
    /// assert_eq!(map.get("a"), 1);
    /// assert_eq!(map.get("b"), -1);
    /// ```
    #[must_use = "Only effect is to produce a result"]
    pub fn from_map(entries: HashMap<K, V>, factory: F) -> Self {
        Self { entries, factory }
    }

    /// Number of stored entries
    ///
    /// Keys that would only read as the default value are not counted.
    #[must_use = "Only effect is to produce a result"]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Truth that no entry is stored
    #[must_use = "Only effect is to produce a result"]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterator over the stored `(key, value)` pairs, in unspecified order
    #[must_use = "Only effect is to produce a result"]
    pub fn iter(&self) -> hash_map::Iter<'_, K, V> {
        self.entries.iter()
    }

    /// Iterator over the stored keys, in unspecified order
    #[must_use = "Only effect is to produce a result"]
    pub fn keys(&self) -> hash_map::Keys<'_, K, V> {
        self.entries.keys()
    }

    /// Iterator over the stored values, in unspecified order
    #[must_use = "Only effect is to produce a result"]
    pub fn values(&self) -> hash_map::Values<'_, K, V> {
        self.entries.values()
    }

    /// Removes all stored entries. The factory is kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Retains only the entries for which `f` returns `true`.
    pub fn retain(&mut self, f: impl FnMut(&K, &mut V) -> bool) {
        self.entries.retain(f);
    }
}
//
impl<K: Eq + Hash, V, F: Fn() -> V> DefaultValuedMap<K, V, F> {
    /// Value associated with `key`, or the factory's output if `key` is not
    /// stored. The map is left untouched either way.
    ///
    /// See also [`get_stored()`](Self::get_stored) if you need to tell a
    /// missing key apart from a stored one.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_multiset::DefaultValuedMap;
    ///
    /// let mut map = DefaultValuedMap::with_factory(Vec::new);
    /// map.set(1, vec!['a']);
    ///
    /// assert_eq!(map.get(&1), vec!['a']);
    /// assert_eq!(map.get(&2), Vec::<char>::new());
    /// assert!(!map.contains_key(&2));
    /// ```
    #[inline]
    #[must_use = "Only effect is to produce a result"]
    pub fn get<Q>(&self, key: &Q) -> V
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
        V: Clone,
    {
        match self.entries.get(key) {
            Some(value) => value.clone(),
            None => (self.factory)(),
        }
    }

    /// Stored value associated with `key`, if any
    #[inline]
    #[must_use = "Only effect is to produce a result"]
    pub fn get_stored<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.get(key)
    }

    /// Mutable access to the stored value associated with `key`, if any
    #[inline]
    #[must_use = "Only effect is to produce a result"]
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.get_mut(key)
    }

    /// Truth that a value is stored for `key`
    #[inline]
    #[must_use = "Only effect is to produce a result"]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Mutable access to the value associated with `key`, storing the
    /// factory's output first if `key` was missing.
    ///
    /// This is the only read-style accessor that inserts.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_multiset::DefaultValuedMap;
    ///
    /// let mut tally = DefaultValuedMap::<char, usize>::new();
    /// for c in "abca".chars() {
    ///     *tally.get_or_insert_default(c) += 1;
    /// }
    /// assert_eq!(tally.get(&'a'), 2);
    /// assert_eq!(tally.len(), 3);
    /// ```
    #[inline]
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V {
        let factory = &self.factory;
        self.entries.entry(key).or_insert_with(factory)
    }

    /// Stores `value` for `key`, returning the previously stored value.
    #[inline]
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        self.entries.insert(key, value)
    }

    /// Removes the entry for `key`, returning its value if it was stored.
    ///
    /// Removing a missing key is a no-op.
    #[inline]
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.remove(key)
    }
}

impl<K: Debug, V: Debug, F> Debug for DefaultValuedMap<K, V, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultValuedMap")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

impl<K, V: Default> Default for DefaultValuedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, V, F> Extend<(K, V)> for DefaultValuedMap<K, V, F> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl<K: Eq + Hash, V: Default> FromIterator<(K, V)> for DefaultValuedMap<K, V> {
    #[must_use = "Only effect is to produce a result"]
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut result = Self::new();
        result.extend(iter);
        result
    }
}

impl<'a, K, V, F> IntoIterator for &'a DefaultValuedMap<K, V, F> {
    type Item = (&'a K, &'a V);
    type IntoIter = hash_map::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<K, V, F> IntoIterator for DefaultValuedMap<K, V, F> {
    type Item = (K, V);
    type IntoIter = hash_map::IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Maps are equal when they store the same entries. Factories are not
/// compared.
impl<K: Eq + Hash, V: PartialEq, F> PartialEq for DefaultValuedMap<K, V, F> {
    #[must_use = "Only effect is to produce a result"]
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Eq + Hash, V: Eq, F> Eq for DefaultValuedMap<K, V, F> {}
