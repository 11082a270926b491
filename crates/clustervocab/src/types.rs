//! # Common Types

/// Type Alias for hash maps in this crate.
///
/// `ahash::AHashMap` is a specialization of `std::collections::HashMap`;
/// it is a performance win on many/(most?) modern CPUs.
pub type CVHashMap<K, V> = ahash::AHashMap<K, V>;

/// Type Alias for hash sets in this crate.
pub type CVHashSet<V> = ahash::AHashSet<V>;

/// A cluster identifier.
///
/// Cluster ids are small positive integers, 1-indexed and contiguous
/// within one clustering run.
pub type ClusterId = usize;

/// A language identifier (an ISO code or corpus file stem).
pub type LanguageId = String;

/// A binary vocabulary-membership vector.
///
/// One `u8` bit per union-vocabulary dimension; 1 iff the language's
/// vocabulary contains the subword at that index.
pub type MembershipVector = Vec<u8>;
