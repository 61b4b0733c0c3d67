//! A hash-based multiset with algebraic combinators, and the default-valued
//! map it is built upon.
//!
//! This crate implements a kind of multiset, which is a generalization of the
//! notion of mathematical set where multiple elements that are equal to each
//! other can be present simulatneously. Some also call this data structure a
//! bag, or a counter.
//!
//! Two types are provided:
//!
//! - [`DefaultValuedMap`] is a hash map whose reads of missing keys yield a
//!   value computed by a factory, without inserting anything. Writes insert
//!   and overwrite as usual.
//! - [`Multiset`] counts occurences of values using a `DefaultValuedMap` of
//!   multiplicities. It never stores a multiplicity of zero: a value whose
//!   last occurence goes away is removed from the underlying map.
//!
//! Multisets can be combined with four operators, each of which produces a
//! new multiset and leaves its operands untouched:
//!
//! | Operation                               | Operator | Multiplicity of `v`  |
//! |-----------------------------------------|----------|----------------------|
//! | [`sum()`](Multiset::sum)                | `&a + &b`| `a[v] + b[v]`        |
//! | [`difference()`](Multiset::difference)  | `&a - &b`| `max(0, a[v] - b[v])`|
//! | [`intersect()`](Multiset::intersect)    | `&a & &b`| `min(a[v], b[v])`    |
//! | [`union()`](Multiset::union)            | `&a \| &b`| `max(a[v], b[v])`   |
//!
//! Since the implementation is hash-based, iteration order is unspecified.
//! Consequently, queries that rank values, like
//! [`most_common()`](Multiset::most_common), do not specify how ties are
//! broken.
//!
//! # Examples
//!
//! ```
//! use tally_multiset::Multiset;
//!
//! let words = "the cat and the hat and the bat".split(' ');
//! let counts = Multiset::from_iter(words);
//! assert_eq!(counts.most_common(1), [(&"the", 3)]);
//!
//! let seen = Multiset::from_iter(["the", "the", "cat", "dog"]);
//! assert_eq!(
//!     &counts - &seen,
//!     Multiset::from_iter(["the", "and", "hat", "and", "bat"])
//! );
//! ```

mod default_map;
mod multiset;

pub use default_map::DefaultValuedMap;
pub use multiset::{IntoIter, Iter, Multiset};

use thiserror::Error;

/// Error raised when building a [`Multiset`] from signed multiplicities
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
pub enum MultisetError {
    /// A value was given a multiplicity that is zero or negative
    #[error("multiplicity {count} is not positive")]
    NonPositiveMultiplicity { count: isize },

    /// Summing multiplicities overflowed `usize`
    #[error("multiplicity counter has overflown")]
    MultiplicityOverflow,
}
