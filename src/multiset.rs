//! Hash-based multiset with algebraic combinators

use crate::{DefaultValuedMap, MultisetError};
use log::{debug, trace};
use std::{
    borrow::Borrow,
    cmp::Ordering,
    collections::hash_map,
    hash::Hash,
    iter::FusedIterator,
    ops::{Add, BitAnd, BitOr, Sub},
};

/// A multiset implementation based on a sparse hash histogram.
///
/// You can learn more about the design rationale and overall capabilities of
/// this data structure in the [crate-level documentation](index.html).
///
/// This data structure is based on [`DefaultValuedMap`], itself based on the
/// standard library's [`HashMap`](std::collections::HashMap), and many points
/// of the `HashMap` documentation also apply to it. In particular, it is a
/// logic error to modify the hash or equality of values stored inside of the
/// multiset using internal mutability tricks.
///
/// In all the following documentation, we will use the following terminology:
///
/// - "values" refers to a unique value as defined by equality of the
///   [`Eq`] implementation of type `T`
/// - "elements" refers to possibly duplicate occurences of a value within the
///   multiset.
/// - "multiplicity" refers to the number of occurences of a value within the
///   multiset, i.e. the number of elements that are equal to this value.
///
/// A value is either absent or present with a multiplicity of at least 1. No
/// operation ever leaves a value stored with a multiplicity of 0.
///
/// # Examples
///
/// ```
/// use tally_multiset::Multiset;
///
/// let mut set = Multiset::new();
///
/// // Insertion reports how many identical elements were already present
/// assert_eq!(set.insert("apple"), 0);
/// assert_eq!(set.insert("pear"), 0);
/// assert_eq!(set.insert("apple"), 1);
///
/// // Absent values simply have a multiplicity of 0
/// assert_eq!(set.multiplicity("apple"), 2);
/// assert_eq!(set.multiplicity("plum"), 0);
///
/// // Distinct values can be visited along with their multiplicities
/// for (fruit, multiplicity) in &set {
///     println!("{fruit} with multiplicity {multiplicity}");
/// }
/// ```
#[derive(Clone, Debug)]
pub struct Multiset<T> {
    /// Mapping from distinct values to their multiplicities
    value_to_multiplicity: DefaultValuedMap<T, usize>,

    /// Number of elements = sum of all multiplicities
    len: usize,
}
//
impl<T> Multiset<T> {
    /// Makes a new, empty `Multiset`.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_multiset::Multiset;
    ///
    /// let set = Multiset::<i32>::new();
    /// assert!(set.is_empty());
    /// ```
    #[must_use = "Only effect is to produce a result"]
    pub fn new() -> Self {
        Self {
            value_to_multiplicity: DefaultValuedMap::new(),
            len: 0,
        }
    }

    /// Clears the multiset, removing all elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_multiset::Multiset;
    ///
    /// let mut v = Multiset::from_iter([1, 2, 3]);
    /// v.clear();
    /// assert!(v.is_empty());
    /// ```
    pub fn clear(&mut self) {
        self.value_to_multiplicity.clear();
        self.len = 0;
    }

    /// Number of elements currently present in the multiset, including
    /// duplicate occurences of a value.
    ///
    /// See also [`num_values()`](Self::num_values) for a count of distinct
    /// values, ignoring duplicate elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_multiset::Multiset;
    ///
    /// let mut v = Multiset::new();
    /// assert_eq!(v.len(), 0);
    /// v.insert(1);
    /// assert_eq!(v.len(), 1);
    /// v.insert(1);
    /// assert_eq!(v.len(), 2);
    /// v.insert(2);
    /// assert_eq!(v.len(), 3);
    /// ```
    #[must_use = "Only effect is to produce a result"]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Number of distinct values currently present in the multiset
    ///
    /// See also [`len()`](Self::len) for a count of multiset elements,
    /// including duplicates of each value.
    #[must_use = "Only effect is to produce a result"]
    pub fn num_values(&self) -> usize {
        self.value_to_multiplicity.len()
    }

    /// Truth that the multiset contains no elements
    #[must_use = "Only effect is to produce a result"]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterator over all distinct values in the multiset, along with their
    /// multiplicities, in unspecified order.
    ///
    /// See also [`elements()`](Self::elements) if you need every occurence of
    /// each value to be emitted separately.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_multiset::Multiset;
    ///
    /// let set = Multiset::from_iter(['b', 'a', 'b']);
    ///
    /// let mut entries = set.iter().collect::<Vec<_>>();
    /// entries.sort();
    /// assert_eq!(entries, [(&'a', 1), (&'b', 2)]);
    /// ```
    #[must_use = "Only effect is to produce a result"]
    pub fn iter(&self) -> Iter<'_, T> {
        self.into_iter()
    }

    /// Iterator over all distinct values in the multiset, in unspecified
    /// order.
    #[must_use = "Only effect is to produce a result"]
    pub fn values(&self) -> impl ExactSizeIterator<Item = &T> + FusedIterator + Clone {
        self.value_to_multiplicity.keys()
    }

    /// Iterator over all elements of the multiset, where each value is
    /// repeated as many times as its multiplicity.
    ///
    /// Repeats of a given value are emitted contiguously, but the order in
    /// which distinct values are visited is unspecified. Every call produces
    /// a fresh iterator over the whole multiset.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_multiset::Multiset;
    ///
    /// let set = Multiset::from_iter(["a", "b", "a"]);
    ///
    /// let mut elements = set.elements().copied().collect::<Vec<_>>();
    /// elements.sort();
    /// assert_eq!(elements, ["a", "a", "b"]);
    /// assert_eq!(set.elements().count(), set.len());
    /// ```
    #[must_use = "Only effect is to produce a result"]
    pub fn elements(&self) -> impl Iterator<Item = &T> + FusedIterator + Clone {
        self.value_to_multiplicity
            .iter()
            .flat_map(|(value, &multiplicity)| std::iter::repeat_n(value, multiplicity))
    }

    /// The `n` values with the highest multiplicities, sorted by descending
    /// multiplicity.
    ///
    /// Values with equal multiplicities are ranked in an unspecified order,
    /// so when several values tie at the cutoff, which of them are returned
    /// is unspecified too. If `n` exceeds the number of distinct values, all
    /// of them are returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_multiset::Multiset;
    ///
    /// let set = Multiset::from_iter("abracadabra".chars());
    /// assert_eq!(set.most_common(1), [(&'a', 5)]);
    ///
    /// // 'b' and 'r' tie for second place
    /// let top = set.most_common(2);
    /// assert_eq!(top[0], (&'a', 5));
    /// assert!(top[1] == (&'b', 2) || top[1] == (&'r', 2));
    /// assert_eq!(set.most_common(100).len(), 5);
    /// ```
    #[must_use = "Only effect is to produce a result"]
    pub fn most_common(&self, n: usize) -> Vec<(&T, usize)> {
        let mut ranking = self.iter().collect::<Vec<_>>();
        if n < ranking.len() {
            // Partition the n highest multiplicities to the front, then only
            // sort these.
            ranking.select_nth_unstable_by(n, by_descending_multiplicity);
            ranking.truncate(n);
        }
        ranking.sort_by(by_descending_multiplicity);
        ranking
    }

    /// Update `self.len` to match `self.value_to_multiplicity` contents
    ///
    /// This `O(N)` operation should only be performed after calling map
    /// operations that do not provide the right hooks to update the length
    /// field more efficiently.
    fn reset_len(&mut self) {
        self.len = self.value_to_multiplicity.values().sum();
    }

    /// Pick the operand with the most distinct values, then the other one
    fn larger_then_smaller<'a>(&'a self, other: &'a Self) -> (&'a Self, &'a Self) {
        if self.num_values() < other.num_values() {
            (other, self)
        } else {
            (self, other)
        }
    }
}

impl<T: Eq + Hash> Multiset<T> {
    /// Builds a multiset from `(value, multiplicity)` pairs, rejecting
    /// non-positive multiplicities.
    ///
    /// Multiplicities of values that appear several times are summed.
    ///
    /// See also [`from_counts_lossy()`](Self::from_counts_lossy) if you would
    /// rather drop non-positive entries, and the
    /// [`FromIterator<(T, usize)>`](#impl-FromIterator<(T,+usize)>-for-Multiset<T>)
    /// implementation if your counts are already unsigned.
    ///
    /// # Errors
    ///
    /// - [`MultisetError::NonPositiveMultiplicity`] if any multiplicity is
    ///   zero or negative.
    /// - [`MultisetError::MultiplicityOverflow`] if the multiplicities do not
    ///   fit in a `usize` once summed.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use tally_multiset::{Multiset, MultisetError};
    ///
    /// let counts = HashMap::from([("a", 3), ("b", 1)]);
    /// let set = Multiset::try_from_counts(counts)?;
    /// assert_eq!(set.multiplicity("a"), 3);
    /// assert_eq!(set.len(), 4);
    ///
    /// assert_eq!(
    ///     Multiset::try_from_counts([("a", 3), ("b", 0)]),
    ///     Err(MultisetError::NonPositiveMultiplicity { count: 0 })
    /// );
    /// # Ok::<(), MultisetError>(())
    /// ```
    pub fn try_from_counts(
        counts: impl IntoIterator<Item = (T, isize)>,
    ) -> Result<Self, MultisetError> {
        let mut result = Self::new();
        for (value, count) in counts {
            let count = usize::try_from(count)
                .ok()
                .filter(|&count| count > 0)
                .ok_or(MultisetError::NonPositiveMultiplicity { count })?;
            let multiplicity = result.value_to_multiplicity.get_or_insert_default(value);
            *multiplicity = multiplicity
                .checked_add(count)
                .ok_or(MultisetError::MultiplicityOverflow)?;
            result.len = result
                .len
                .checked_add(count)
                .ok_or(MultisetError::MultiplicityOverflow)?;
        }
        Ok(result)
    }

    /// Builds a multiset from `(value, multiplicity)` pairs, silently
    /// dropping entries whose multiplicity is zero or negative.
    ///
    /// Multiplicities of values that appear several times are summed.
    ///
    /// # Panics
    ///
    /// Panics if the multiplicity of a value, or the total number of elements,
    /// overflows `usize`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_multiset::Multiset;
    ///
    /// let set = Multiset::from_counts_lossy([("a", 2), ("b", 0), ("c", -4)]);
    /// assert_eq!(set, Multiset::from_iter(["a", "a"]));
    /// ```
    #[must_use = "Only effect is to produce a result"]
    pub fn from_counts_lossy(counts: impl IntoIterator<Item = (T, isize)>) -> Self {
        let mut result = Self::new();
        let mut num_dropped = 0usize;
        for (value, count) in counts {
            match usize::try_from(count) {
                Ok(count) if count > 0 => {
                    result.insert_multiple(value, count);
                }
                _ => num_dropped += 1,
            }
        }
        if num_dropped > 0 {
            debug!("Dropped {num_dropped} non-positive multiplicities while building a multiset");
        }
        result
    }

    /// Returns `true` if the multiset contains at least one occurence of a
    /// value.
    ///
    /// See also [`multiplicity()`](Self::multiplicity) if you need to know how
    /// many occurences of a value are present inside of the multiset.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_multiset::Multiset;
    ///
    /// let set = Multiset::from_iter([1, 2, 2]);
    ///
    /// assert_eq!(set.contains(&1), true);
    /// assert_eq!(set.contains(&2), true);
    /// assert_eq!(set.contains(&3), false);
    /// ```
    #[inline]
    #[must_use = "Only effect is to produce a result"]
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.value_to_multiplicity.contains_key(value)
    }

    /// Returns the number of occurences of a value inside of the multiset,
    /// which is 0 if this value is not present.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_multiset::Multiset;
    ///
    /// let set = Multiset::from_iter([1, 2, 2]);
    ///
    /// assert_eq!(set.multiplicity(&1), 1);
    /// assert_eq!(set.multiplicity(&2), 2);
    /// assert_eq!(set.multiplicity(&3), 0);
    /// ```
    #[inline]
    #[must_use = "Only effect is to produce a result"]
    pub fn multiplicity<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.value_to_multiplicity.get(value)
    }

    /// Returns `true` if `self` has no elements in common with `other`. This is
    /// logically equivalent to checking for an empty intersection, but may be
    /// more efficient.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_multiset::Multiset;
    ///
    /// let a = Multiset::from_iter([1, 2, 2]);
    /// let mut b = Multiset::new();
    ///
    /// assert!(a.is_disjoint(&b));
    /// b.insert(3);
    /// assert!(a.is_disjoint(&b));
    /// b.insert(2);
    /// assert!(!a.is_disjoint(&b));
    /// ```
    #[must_use = "Only effect is to produce a result"]
    pub fn is_disjoint(&self, other: &Self) -> bool {
        let (larger, smaller) = self.larger_then_smaller(other);
        smaller.values().all(|value| !larger.contains(value))
    }

    /// Returns `true` if the set is a subset of another, i.e., `other` contains
    /// at least all the elements in `self`.
    ///
    /// In a multiset context, this means that if `self` contains N occurences
    /// of a certain value, then `other` must contain at least N occurences of
    /// that value.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_multiset::Multiset;
    ///
    /// let sup = Multiset::from_iter([1, 2, 2]);
    /// let mut set = Multiset::new();
    ///
    /// assert!(set.is_subset(&sup));
    /// set.insert(2);
    /// assert!(set.is_subset(&sup));
    /// set.insert(2);
    /// assert!(set.is_subset(&sup));
    /// set.insert(2);
    /// assert!(!set.is_subset(&sup));
    /// ```
    #[must_use = "Only effect is to produce a result"]
    pub fn is_subset(&self, other: &Self) -> bool {
        // A subset cannot hold more values or more elements than its superset
        if self.num_values() > other.num_values() || self.len > other.len {
            return false;
        }
        self.iter()
            .all(|(value, multiplicity)| other.multiplicity(value) >= multiplicity)
    }

    /// Returns `true` if the set is a superset of another, i.e., `self`
    /// contains at least all the elements in `other`.
    ///
    /// In a multiset context, this means that if `other` contains N occurences
    /// of a certain value, then `self` must contain at least N occurences of
    /// that value.
    #[must_use = "Only effect is to produce a result"]
    pub fn is_superset(&self, other: &Self) -> bool {
        other.is_subset(self)
    }

    /// Insert an element into the multiset, tell how many identical elements
    /// were already present in the multiset before insertion.
    ///
    /// See also [`insert_multiple()`](Self::insert_multiple) if you need to
    /// insert multiple copies of a value.
    ///
    /// # Panics
    ///
    /// Panics if the multiplicity of `value`, or the total number of
    /// elements, overflows `usize`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_multiset::Multiset;
    ///
    /// let mut set = Multiset::new();
    ///
    /// assert_eq!(set.insert(1), 0);
    /// assert_eq!(set.insert(1), 1);
    /// assert_eq!(set.insert(1), 2);
    /// assert_eq!(set.insert(2), 0);
    ///
    /// assert_eq!(set.len(), 4);
    /// assert_eq!(set.num_values(), 2);
    /// ```
    #[inline]
    pub fn insert(&mut self, value: T) -> usize {
        self.insert_multiple(value, 1)
    }

    /// Insert multiple copies of a value, tell how many identical elements were
    /// already present in the multiset.
    ///
    /// Inserting zero copies leaves the multiset unchanged.
    ///
    /// # Panics
    ///
    /// Panics if the multiplicity of `value`, or the total number of
    /// elements, overflows `usize`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_multiset::Multiset;
    ///
    /// let mut set = Multiset::new();
    ///
    /// assert_eq!(set.insert_multiple(1, 2), 0);
    /// assert_eq!(set.insert_multiple(1, 3), 2);
    /// assert_eq!(set.insert_multiple(2, 2), 0);
    /// assert_eq!(set.insert_multiple(3, 0), 0);
    ///
    /// assert_eq!(set.len(), 7);
    /// assert_eq!(set.num_values(), 2);
    /// ```
    #[inline]
    pub fn insert_multiple(&mut self, value: T, count: usize) -> usize {
        if count == 0 {
            return self.multiplicity(&value);
        }
        let new_len = self
            .len
            .checked_add(count)
            .expect("Multiplicity counter has overflown");
        let multiplicity = self.value_to_multiplicity.get_or_insert_default(value);
        let old_multiplicity = *multiplicity;
        *multiplicity = old_multiplicity
            .checked_add(count)
            .expect("Multiplicity counter has overflown");
        self.len = new_len;
        old_multiplicity
    }

    /// Attempt to remove one element from the multiset, tell how many
    /// identical elements were previously present in the multiset.
    ///
    /// See also [`remove_all()`](Self::remove_all) if you want to remove all
    /// occurences of a value from the multiset.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_multiset::Multiset;
    ///
    /// let mut set = Multiset::from_iter([1, 1, 2]);
    ///
    /// assert_eq!(set.remove(&1), 2);
    /// assert_eq!(set.remove(&1), 1);
    /// assert_eq!(set.remove(&1), 0);
    /// assert_eq!(set.remove(&2), 1);
    /// assert_eq!(set.remove(&2), 0);
    /// assert!(set.is_empty());
    /// ```
    #[inline]
    pub fn remove<Q>(&mut self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let Some(multiplicity) = self.value_to_multiplicity.get_mut(value) else {
            return 0;
        };
        let old_multiplicity = *multiplicity;
        if old_multiplicity > 1 {
            *multiplicity = old_multiplicity - 1;
        } else {
            self.value_to_multiplicity.remove(value);
        }
        self.len -= 1;
        old_multiplicity
    }

    /// Remove all occurences of a value from the multiset, tell how many
    /// elements were removed from the multiset.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_multiset::Multiset;
    ///
    /// let mut set = Multiset::from_iter([1, 1, 2]);
    ///
    /// assert_eq!(set.remove_all(&1), 2);
    /// assert_eq!(set.remove_all(&1), 0);
    /// assert_eq!(set.remove_all(&2), 1);
    /// assert_eq!(set.remove_all(&2), 0);
    /// ```
    #[inline]
    pub fn remove_all<Q>(&mut self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let old_multiplicity = self.value_to_multiplicity.remove(value).unwrap_or(0);
        self.len -= old_multiplicity;
        old_multiplicity
    }

    /// Retains only the elements specified by the predicate.
    ///
    /// For efficiency reasons, the filtering callback `f` is not run once per
    /// element, but once per distinct value present inside of the multiset.
    /// However, it is also provided with the number of occurences of that value
    /// within the multiset, which can be used as a filtering criterion.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_multiset::Multiset;
    ///
    /// let mut set = Multiset::<usize>::from_iter([1, 1, 2, 3, 4, 4, 5, 5, 5]);
    /// // Keep even values with an even multiplicity
    /// // and odd values with an odd multiplicity.
    /// set.retain(|value, multiplicity| value % 2 == multiplicity % 2);
    ///
    /// assert_eq!(set, Multiset::from_iter([3, 4, 4, 5, 5, 5]));
    /// ```
    pub fn retain(&mut self, mut f: impl FnMut(&T, usize) -> bool) {
        self.value_to_multiplicity
            .retain(|value, &mut multiplicity| f(value, multiplicity));
        self.reset_len();
    }
}

impl<T: Clone + Eq + Hash> Multiset<T> {
    /// Sum of two multisets, where the multiplicity of each value is the sum
    /// of its multiplicities in `self` and `other`.
    ///
    /// Also available as `&self + &other`.
    ///
    /// # Panics
    ///
    /// Panics if a resulting multiplicity, or the total number of elements,
    /// overflows `usize`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_multiset::Multiset;
    ///
    /// let a = Multiset::from_iter(["a", "a", "a", "b"]);
    /// let b = Multiset::from_iter(["b", "b", "c"]);
    /// assert_eq!(
    ///     a.sum(&b),
    ///     Multiset::from_iter(["a", "a", "a", "b", "b", "b", "c"])
    /// );
    /// ```
    #[must_use = "Only effect is to produce a result"]
    pub fn sum(&self, other: &Self) -> Self {
        let (larger, smaller) = self.larger_then_smaller(other);
        trace!(
            "Summing multisets with {} and {} distinct values",
            larger.num_values(),
            smaller.num_values()
        );
        let mut result = larger.clone();
        for (value, multiplicity) in smaller {
            result.insert_multiple(value.clone(), multiplicity);
        }
        result
    }

    /// Difference of two multisets, where the multiplicity of each value is
    /// its multiplicity in `self` minus its multiplicity in `other`. Values
    /// for which this is zero or less are not present in the result.
    ///
    /// Unlike the other combinators, this operation is not symmetric.
    ///
    /// Also available as `&self - &other`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_multiset::Multiset;
    ///
    /// let a = Multiset::from_iter(["a", "a", "a", "b"]);
    /// let b = Multiset::from_iter(["b", "b", "c"]);
    /// assert_eq!(a.difference(&b), Multiset::from_iter(["a", "a", "a"]));
    /// assert_eq!(b.difference(&a), Multiset::from_iter(["b", "c"]));
    /// ```
    #[must_use = "Only effect is to produce a result"]
    pub fn difference(&self, other: &Self) -> Self {
        trace!(
            "Subtracting a multiset with {} distinct values from one with {}",
            other.num_values(),
            self.num_values()
        );
        let mut result = Self::new();
        for (value, multiplicity) in self {
            let remainder = multiplicity.saturating_sub(other.multiplicity(value));
            if remainder > 0 {
                result.insert_multiple(value.clone(), remainder);
            }
        }
        result
    }

    /// Intersection of two multisets, where values present in both `self`
    /// and `other` get the smaller of their two multiplicities. Values that
    /// are only present on one side are not present in the result.
    ///
    /// Also available as `&self & &other`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_multiset::Multiset;
    ///
    /// let a = Multiset::from_iter(["a", "a", "a", "b"]);
    /// let b = Multiset::from_iter(["b", "b", "c"]);
    /// assert_eq!(a.intersect(&b), Multiset::from_iter(["b"]));
    /// ```
    #[must_use = "Only effect is to produce a result"]
    pub fn intersect(&self, other: &Self) -> Self {
        let (larger, smaller) = self.larger_then_smaller(other);
        trace!(
            "Intersecting multisets with {} and {} distinct values",
            larger.num_values(),
            smaller.num_values()
        );
        let mut result = Self::new();
        for (value, multiplicity) in smaller {
            let common = multiplicity.min(larger.multiplicity(value));
            if common > 0 {
                result.insert_multiple(value.clone(), common);
            }
        }
        result
    }

    /// Union of two multisets, where values present in either `self` or
    /// `other` get the larger of their two multiplicities, without counting
    /// values that are present in both multisets twice.
    ///
    /// Also available as `&self | &other`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_multiset::Multiset;
    ///
    /// let a = Multiset::from_iter(["a", "a", "a", "b"]);
    /// let b = Multiset::from_iter(["b", "b", "c"]);
    /// assert_eq!(
    ///     a.union(&b),
    ///     Multiset::from_iter(["a", "a", "a", "b", "b", "c"])
    /// );
    /// ```
    #[must_use = "Only effect is to produce a result"]
    pub fn union(&self, other: &Self) -> Self {
        let (larger, smaller) = self.larger_then_smaller(other);
        trace!(
            "Uniting multisets with {} and {} distinct values",
            larger.num_values(),
            smaller.num_values()
        );
        let mut result = larger.clone();
        for (value, multiplicity) in smaller {
            let current = larger.multiplicity(value);
            if multiplicity > current {
                result.insert_multiple(value.clone(), multiplicity - current);
            }
        }
        result
    }
}

/// Ordering that puts the highest multiplicities first
fn by_descending_multiplicity<T>(left: &(T, usize), right: &(T, usize)) -> Ordering {
    right.1.cmp(&left.1)
}

impl<T: Clone + Eq + Hash> Add<&Multiset<T>> for &Multiset<T> {
    type Output = Multiset<T>;

    /// Returns the sum of `self` and `rhs` as a new `Multiset<T>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_multiset::Multiset;
    ///
    /// let a = Multiset::from_iter([1, 1, 2]);
    /// let b = Multiset::from_iter([2, 3]);
    /// assert_eq!(&a + &b, Multiset::from_iter([1, 1, 2, 2, 3]));
    /// ```
    #[must_use = "Only effect is to produce a result"]
    fn add(self, rhs: &Multiset<T>) -> Self::Output {
        self.sum(rhs)
    }
}

impl<T: Clone + Eq + Hash> BitAnd<&Multiset<T>> for &Multiset<T> {
    type Output = Multiset<T>;

    /// Returns the intersection of `self` and `rhs` as a new `Multiset<T>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_multiset::Multiset;
    ///
    /// let a = Multiset::from_iter([1, 1, 2, 2, 3]);
    /// let b = Multiset::from_iter([2, 3, 4]);
    /// assert_eq!(&a & &b, Multiset::from_iter([2, 3]));
    /// ```
    #[must_use = "Only effect is to produce a result"]
    fn bitand(self, rhs: &Multiset<T>) -> Self::Output {
        self.intersect(rhs)
    }
}

impl<T: Clone + Eq + Hash> BitOr<&Multiset<T>> for &Multiset<T> {
    type Output = Multiset<T>;

    /// Returns the union of `self` and `rhs` as a new `Multiset<T>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_multiset::Multiset;
    ///
    /// let a = Multiset::from_iter([1, 1, 2, 2, 3]);
    /// let b = Multiset::from_iter([2, 3, 4]);
    /// assert_eq!(&a | &b, Multiset::from_iter([1, 1, 2, 2, 3, 4]));
    /// ```
    #[must_use = "Only effect is to produce a result"]
    fn bitor(self, rhs: &Multiset<T>) -> Self::Output {
        self.union(rhs)
    }
}

impl<T: Clone + Eq + Hash> Sub<&Multiset<T>> for &Multiset<T> {
    type Output = Multiset<T>;

    /// Returns the difference of `self` and `rhs` as a new `Multiset<T>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_multiset::Multiset;
    ///
    /// let a = Multiset::from_iter([1, 1, 2, 2, 3]);
    /// let b = Multiset::from_iter([2, 3, 4]);
    /// assert_eq!(&a - &b, Multiset::from_iter([1, 1, 2]));
    /// ```
    #[must_use = "Only effect is to produce a result"]
    fn sub(self, rhs: &Multiset<T>) -> Self::Output {
        self.difference(rhs)
    }
}

impl<T> Default for Multiset<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Eq + Hash> Extend<T> for Multiset<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for element in iter {
            self.insert(element);
        }
    }
}

impl<T: Eq + Hash> Extend<(T, usize)> for Multiset<T> {
    /// More efficient alternative to [`Extend<T>`] for cases where you know in
    /// advance that you are going to insert several copies of a value
    ///
    /// Entries with a multiplicity of zero are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_multiset::Multiset;
    ///
    /// let mut set = Multiset::<i32>::from_iter([1, 2, 3]);
    /// set.extend([(3, 3), (4, 2), (5, 0)]);
    /// assert_eq!(set, Multiset::from_iter([1, 2, 3, 3, 3, 3, 4, 4]));
    /// ```
    fn extend<I: IntoIterator<Item = (T, usize)>>(&mut self, iter: I) {
        for (value, count) in iter {
            self.insert_multiple(value, count);
        }
    }
}

impl<T: Eq + Hash> FromIterator<T> for Multiset<T> {
    #[must_use = "Only effect is to produce a result"]
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut result = Self::new();
        result.extend(iter);
        result
    }
}

impl<T: Eq + Hash> FromIterator<(T, usize)> for Multiset<T> {
    /// More efficient alternative to [`FromIterator<T>`] for cases where you
    /// know in advance that you are going to insert several copies of a value
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_multiset::Multiset;
    ///
    /// assert_eq!(
    ///     Multiset::from_iter([1, 2, 2, 2, 3, 3]),
    ///     Multiset::<i32>::from_iter([(1, 1), (2, 3), (3, 2)])
    /// );
    /// ```
    #[must_use = "Only effect is to produce a result"]
    fn from_iter<I: IntoIterator<Item = (T, usize)>>(iter: I) -> Self {
        let mut result = Self::new();
        result.extend(iter);
        result
    }
}

impl<'a, T> IntoIterator for &'a Multiset<T> {
    type Item = (&'a T, usize);
    type IntoIter = Iter<'a, T>;

    #[must_use = "Only effect is to produce a result"]
    fn into_iter(self) -> Self::IntoIter {
        Iter(self.value_to_multiplicity.iter())
    }
}
//
/// An iterator over the entries of a [`Multiset`], in unspecified order.
///
/// This `struct` is created by the [`iter()`](Multiset::iter) method on
/// [`Multiset`]. See its documentation for more.
#[derive(Clone, Debug)]
pub struct Iter<'a, T>(hash_map::Iter<'a, T, usize>);
//
impl<T> ExactSizeIterator for Iter<'_, T> {
    #[must_use = "Only effect is to produce a result"]
    fn len(&self) -> usize {
        self.0.len()
    }
}
//
impl<T> FusedIterator for Iter<'_, T> {}
//
impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (&'a T, usize);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(k, &v)| (k, v))
    }

    #[must_use = "Only effect is to produce a result"]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }

    fn count(self) -> usize
    where
        Self: Sized,
    {
        self.0.count()
    }
}

impl<T> IntoIterator for Multiset<T> {
    type Item = (T, usize);
    type IntoIter = IntoIter<T>;

    /// Gets an iterator for moving out the `Multiset`’s contents, in
    /// unspecified order.
    ///
    /// # Examples
    ///
    /// ```
    /// use tally_multiset::Multiset;
    ///
    /// let set = Multiset::from_iter([3, 1, 2, 2]);
    /// let mut entries = set.into_iter().collect::<Vec<_>>();
    /// entries.sort();
    /// assert_eq!(entries, [(1, 1), (2, 2), (3, 1)]);
    /// ```
    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self.value_to_multiplicity.into_iter())
    }
}
//
/// An owning iterator over the entries of a [`Multiset`], in unspecified
/// order.
///
/// This struct is created by the [`into_iter`](IntoIterator::into_iter) method
/// on [`Multiset`] (provided by the [`IntoIterator`] trait). See its
/// documentation for more.
#[derive(Debug)]
pub struct IntoIter<T>(hash_map::IntoIter<T, usize>);
//
impl<T> ExactSizeIterator for IntoIter<T> {
    #[must_use = "Only effect is to produce a result"]
    fn len(&self) -> usize {
        self.0.len()
    }
}
//
impl<T> FusedIterator for IntoIter<T> {}
//
impl<T> Iterator for IntoIter<T> {
    type Item = (T, usize);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }

    #[must_use = "Only effect is to produce a result"]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }

    fn count(self) -> usize
    where
        Self: Sized,
    {
        self.0.count()
    }
}

impl<T: Eq + Hash> PartialEq for Multiset<T> {
    #[must_use = "Only effect is to produce a result"]
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.value_to_multiplicity == other.value_to_multiplicity
    }
}

impl<T: Eq + Hash> Eq for Multiset<T> {}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;
    use std::{collections::HashMap, fmt::Debug};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn histogram<T: Clone + Eq + Hash>(contents: &[T]) -> HashMap<T, usize> {
        let mut histogram = HashMap::new();
        for value in contents {
            *histogram.entry(value.clone()).or_default() += 1;
        }
        histogram
    }

    fn check_histogram<T: Clone + Debug + Eq + Hash>(
        set: &Multiset<T>,
        expected: &HashMap<T, usize>,
    ) {
        let actual = set
            .iter()
            .map(|(value, multiplicity)| (value.clone(), multiplicity))
            .collect::<HashMap<_, _>>();
        assert_eq!(&actual, expected);
    }

    fn check_canonical<T>(set: &Multiset<T>) {
        assert!(set.iter().all(|(_, multiplicity)| multiplicity > 0));
        assert_eq!(set.len(), set.iter().map(|(_, mul)| mul).sum::<usize>());
        assert_eq!(set.num_values(), set.iter().len());
    }

    fn check_any_set_pair(set1: &Multiset<u8>, set2: &Multiset<u8>) {
        let all_values = set1.values().chain(set2.values()).copied().collect::<Vec<_>>();

        let sum = set1 + set2;
        check_canonical(&sum);
        assert_eq!(sum, set1.sum(set2));
        assert_eq!(sum, set2.sum(set1));
        assert_eq!(sum.len(), set1.len() + set2.len());
        for &val in &all_values {
            assert_eq!(
                sum.multiplicity(&val),
                set1.multiplicity(&val) + set2.multiplicity(&val)
            );
        }

        let difference = set1 - set2;
        check_canonical(&difference);
        assert_eq!(difference, set1.difference(set2));
        for &val in &all_values {
            assert_eq!(
                difference.multiplicity(&val),
                set1.multiplicity(&val).saturating_sub(set2.multiplicity(&val))
            );
        }
        assert!(difference.is_subset(set1));

        let intersection = set1 & set2;
        check_canonical(&intersection);
        assert_eq!(intersection, set1.intersect(set2));
        assert_eq!(intersection, set2.intersect(set1));
        for &val in &all_values {
            assert_eq!(
                intersection.multiplicity(&val),
                set1.multiplicity(&val).min(set2.multiplicity(&val))
            );
        }

        let union = set1 | set2;
        check_canonical(&union);
        assert_eq!(union, set1.union(set2));
        assert_eq!(union, set2.union(set1));
        for &val in &all_values {
            assert_eq!(
                union.multiplicity(&val),
                set1.multiplicity(&val).max(set2.multiplicity(&val))
            );
            assert_eq!(
                intersection.multiplicity(&val) + union.multiplicity(&val),
                set1.multiplicity(&val) + set2.multiplicity(&val)
            );
        }

        // Difference and intersection partition the left operand
        assert_eq!(&difference + &intersection, *set1);

        assert_eq!(set1.is_disjoint(set2), intersection.is_empty());
        assert_eq!(set1.is_subset(set2), difference.is_empty());
        assert_eq!(set1.is_subset(set2), set2.is_superset(set1));

        // Operands are left untouched
        let (copy1, copy2) = (set1.clone(), set2.clone());
        let _ = (set1 + set2, set1 - set2, set1 & set2, set1 | set2);
        assert_eq!(copy1, *set1);
        assert_eq!(copy2, *set2);
    }

    fn check_any_set(set: &Multiset<u8>, contents: &[u8]) {
        let contents_histogram = histogram(contents);

        check_canonical(set);
        check_histogram(set, &contents_histogram);
        assert_eq!(set.len(), contents.len());
        assert_eq!(set.num_values(), contents_histogram.len());
        assert_eq!(set.is_empty(), contents.is_empty());

        for (val, &mul) in &contents_histogram {
            assert!(set.contains(val));
            assert_eq!(set.multiplicity(val), mul);
        }

        // Tallying the elements back gives the input counts, and repeats
        // of a value are contiguous.
        let elements = set.elements().copied().collect::<Vec<_>>();
        assert_eq!(histogram(&elements), contents_histogram);
        let mut runs = elements.clone();
        runs.dedup();
        assert_eq!(runs.len(), set.num_values());
        assert_eq!(set.elements().collect::<Vec<_>>(), set.elements().collect::<Vec<_>>());

        let owned = set.clone().into_iter().collect::<HashMap<_, _>>();
        assert_eq!(owned, contents_histogram);
        assert_eq!(
            set.iter().map(|(&val, mul)| (val, mul)).collect::<Multiset<u8>>(),
            *set
        );

        let most_common = set.most_common(usize::MAX);
        assert_eq!(most_common.len(), set.num_values());
        assert!(most_common.windows(2).all(|w| w[0].1 >= w[1].1));
        for n in 0..=set.num_values() {
            let top = set.most_common(n);
            assert_eq!(top.len(), n);
            // Only ties may differ from the full ranking
            for (rank, &(val, mul)) in top.iter().enumerate() {
                assert_eq!(mul, most_common[rank].1);
                assert_eq!(set.multiplicity(val), mul);
            }
        }

        let mut mutable = set.clone();
        for &val in contents {
            let before = mutable.multiplicity(&val);
            assert_eq!(mutable.remove(&val), before);
            assert_eq!(mutable.multiplicity(&val), before - 1);
            check_canonical(&mutable);
        }
        assert!(mutable.is_empty());
        assert_eq!(mutable.num_values(), 0);
        for (&val, &mul) in &contents_histogram {
            assert_eq!(mutable.insert_multiple(val, mul), 0);
        }
        assert_eq!(mutable, *set);
        for (val, &mul) in &contents_histogram {
            assert_eq!(mutable.remove_all(val), mul);
            assert_eq!(mutable.remove_all(val), 0);
        }
        assert!(mutable.is_empty());

        let mut retain_all = set.clone();
        retain_all.retain(|_, _| true);
        assert_eq!(retain_all, *set);

        let mut retain_nothing = set.clone();
        retain_nothing.retain(|_, _| false);
        assert!(retain_nothing.is_empty());

        let mut cleared = set.clone();
        cleared.clear();
        check_empty_set(&cleared);
    }

    fn check_empty_set(empty: &Multiset<u8>) {
        assert_eq!(empty.len(), 0);
        assert_eq!(empty.num_values(), 0);
        assert!(empty.is_empty());
        assert_eq!(empty.iter().next(), None);
        assert_eq!(empty.values().next(), None);
        assert_eq!(empty.elements().next(), None);
        assert!(empty.most_common(3).is_empty());
        assert_eq!(empty.multiplicity(&0), 0);

        let mut mutable = empty.clone();
        assert_eq!(mutable.remove(&0), 0);
        assert_eq!(mutable.remove_all(&0), 0);
        assert!(mutable.is_empty());
    }

    /// {a:3, b:1} and {b:2, c:4}
    fn scenario() -> (Multiset<char>, Multiset<char>) {
        (
            Multiset::<char>::from_iter([('a', 3), ('b', 1)]),
            Multiset::<char>::from_iter([('b', 2), ('c', 4)]),
        )
    }

    #[test]
    fn empty() {
        check_empty_set(&Multiset::default());
        let set = Multiset::<u8>::new();
        check_empty_set(&set);
        check_any_set(&set, &[]);
        check_any_set_pair(&set, &set);
    }

    #[test]
    fn scenario_sum() {
        let (a, b) = scenario();
        let expected: Multiset<char> = Multiset::from_iter([('a', 3), ('b', 3), ('c', 4)]);
        assert_eq!(a.sum(&b), expected);
        assert_eq!(&b + &a, expected);
    }

    #[test]
    fn scenario_difference() {
        let (a, b) = scenario();
        let difference = a.difference(&b);
        assert_eq!(difference, Multiset::<char>::from_iter([('a', 3)]));
        assert!(!difference.contains(&'b'));
        assert!(!difference.contains(&'c'));

        // b - a keeps what b has in excess, even though b is not smaller
        assert_eq!(
            b.difference(&a),
            Multiset::<char>::from_iter([('b', 1), ('c', 4)])
        );
    }

    #[test]
    fn difference_does_not_depend_on_operand_sizes() {
        let small = Multiset::<char>::from_iter([('x', 5)]);
        let large = Multiset::<char>::from_iter([('x', 2), ('y', 1), ('z', 1)]);
        assert_eq!(
            small.difference(&large),
            Multiset::<char>::from_iter([('x', 3)])
        );
        assert_eq!(
            large.difference(&small),
            Multiset::<char>::from_iter([('y', 1), ('z', 1)])
        );
    }

    #[test]
    fn scenario_intersect() {
        let (a, b) = scenario();
        let expected = Multiset::<char>::from_iter([('b', 1)]);
        assert_eq!(a.intersect(&b), expected);
        assert_eq!(&b & &a, expected);
    }

    #[test]
    fn scenario_union() {
        let (a, b) = scenario();
        let expected = Multiset::<char>::from_iter([('a', 3), ('b', 2), ('c', 4)]);
        assert_eq!(a.union(&b), expected);
        assert_eq!(&b | &a, expected);
    }

    #[test]
    fn most_common_accepts_either_tied_winner() {
        let set = Multiset::<char>::from_iter([('x', 5), ('y', 5), ('z', 1)]);
        let top = set.most_common(1);
        assert_eq!(top.len(), 1);
        assert!(top == [(&'x', 5)] || top == [(&'y', 5)], "{top:?}");

        let top2 = set.most_common(2);
        assert!(top2.iter().all(|&(_, mul)| mul == 5));
        assert_eq!(set.most_common(3)[2], (&'z', 1));
        assert!(set.most_common(0).is_empty());
    }

    #[test]
    fn elements_of_small_set() {
        let set = Multiset::<&str>::from_iter([("a", 2), ("b", 1)]);
        let mut elements = set.elements().copied().collect::<Vec<_>>();
        elements.sort_unstable();
        assert_eq!(elements, ["a", "a", "b"]);
    }

    #[test]
    fn borrowed_lookups() {
        let mut set = Multiset::from_iter(["ab".to_owned(), "ab".to_owned(), "c".to_owned()]);
        assert_eq!(set.multiplicity("ab"), 2);
        assert!(set.contains("c"));
        assert_eq!(set.remove("ab"), 2);
        assert_eq!(set.remove_all("c"), 1);
        assert_eq!(set, Multiset::from_iter(["ab".to_owned()]));
    }

    #[test]
    fn validated_construction() {
        let set = Multiset::try_from_counts([('a', 3), ('b', 1), ('a', 2)]).unwrap();
        assert_eq!(set, Multiset::<char>::from_iter([('a', 5), ('b', 1)]));
        assert_eq!(set.len(), 6);

        assert_eq!(
            Multiset::try_from_counts([('a', 3), ('b', -2)]),
            Err(MultisetError::NonPositiveMultiplicity { count: -2 })
        );
        assert_eq!(
            Multiset::try_from_counts([('a', 0)]),
            Err(MultisetError::NonPositiveMultiplicity { count: 0 })
        );
        assert_eq!(
            Multiset::try_from_counts([('a', isize::MAX), ('b', isize::MAX), ('c', isize::MAX)]),
            Err(MultisetError::MultiplicityOverflow)
        );
        assert_eq!(
            Multiset::<char>::try_from_counts([]),
            Ok(Multiset::new())
        );
    }

    #[test]
    fn lossy_construction() {
        init_logger();
        let counts = HashMap::from([('a', 3), ('b', 0), ('c', -1), ('d', 1)]);
        let set = Multiset::from_counts_lossy(counts);
        check_canonical(&set);
        assert_eq!(set, Multiset::<char>::from_iter([('a', 3), ('d', 1)]));
        assert!(!set.contains(&'b'));
        assert!(!set.contains(&'c'));
    }

    #[test]
    #[should_panic(expected = "Multiplicity counter has overflown")]
    fn insertion_overflow() {
        let mut set = Multiset::<char>::from_iter([('a', usize::MAX)]);
        set.insert('a');
    }

    #[test]
    #[should_panic(expected = "Multiplicity counter has overflown")]
    fn sum_length_overflow() {
        let a = Multiset::<char>::from_iter([('a', usize::MAX)]);
        let b = Multiset::<char>::from_iter([('b', 1)]);
        let _ = a.sum(&b);
    }

    #[test]
    fn failed_insertion_leaves_set_consistent() {
        let mut set = Multiset::<char>::from_iter([('a', usize::MAX)]);
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            set.insert('b');
        }));
        assert!(outcome.is_err());
        assert_eq!(set.len(), usize::MAX);
        assert_eq!(set.num_values(), 1);
        assert!(!set.contains(&'b'));
        check_canonical(&set);
    }

    fn contents() -> impl Strategy<Value = Vec<u8>> {
        // Small value range so that pairs of sets often share values
        prop::collection::vec(0u8..16, 0..64)
    }

    fn set() -> impl Strategy<Value = Multiset<u8>> {
        contents().prop_map(|v| v.into_iter().collect())
    }

    proptest! {
        #[test]
        fn single(contents in contents()) {
            init_logger();
            let set = contents.iter().copied().collect::<Multiset<u8>>();
            check_any_set(&set, &contents);
            check_any_set_pair(&set, &set);
            let empty = Multiset::default();
            check_any_set_pair(&set, &empty);
            check_any_set_pair(&empty, &set);
            prop_assert_eq!(&set + &empty, set.clone());
            prop_assert_eq!(&set - &set, empty.clone());
            prop_assert_eq!(&set & &set, set.clone());
            prop_assert_eq!(&set | &set, set);
        }

        #[test]
        fn pair(set1 in set(), set2 in set()) {
            init_logger();
            check_any_set_pair(&set1, &set2);
        }

        #[test]
        fn signed_counts(counts in prop::collection::vec((0u8..16, -3isize..4), 0..32)) {
            let lossy = Multiset::from_counts_lossy(counts.iter().copied());
            check_canonical(&lossy);
            let positive = counts.iter().copied().filter(|&(_, count)| count > 0);
            prop_assert_eq!(
                &lossy,
                &positive
                    .clone()
                    .map(|(val, count)| (val, count as usize))
                    .collect::<Multiset<u8>>()
            );

            match Multiset::try_from_counts(counts.iter().copied()) {
                Ok(validated) => {
                    prop_assert!(counts.iter().all(|&(_, count)| count > 0));
                    prop_assert_eq!(validated, lossy);
                }
                Err(MultisetError::NonPositiveMultiplicity { count }) => {
                    prop_assert!(count <= 0);
                    prop_assert!(counts.iter().any(|&(_, c)| c == count));
                }
                Err(MultisetError::MultiplicityOverflow) => {
                    prop_assert!(false, "small counts cannot overflow");
                }
            }
        }
    }
}
