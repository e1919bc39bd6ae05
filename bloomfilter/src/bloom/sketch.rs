// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::f64::consts::LN_2;
use std::hash::Hash;

use super::BloomParams;
use super::bit_array::BitArray;
use crate::error::Error;
use crate::hash::HashFamily;
use crate::hash::Murmur3Family;

/// A Bloom filter for probabilistic set membership testing.
///
/// Provides membership queries with:
/// - No false negatives (inserted items always return `true`)
/// - A false positive rate bounded by the target error rate while the filter holds at most
///   `capacity` elements
/// - A bit array whose length is fixed at construction
///
/// Insertion of single items is copy-producing: [`insert()`](Self::insert) returns a new
/// filter and leaves the receiver untouched, so a filter can be shared and extended by
/// several owners independently. Bulk insertion goes through
/// [`populate()`](Self::populate), which is allowed once per empty filter.
///
/// Use [`super::BloomFilterBuilder`] or [`BloomFilter::new`] to construct instances.
#[derive(Debug, Clone, PartialEq)]
pub struct BloomFilter<H = Murmur3Family> {
    params: BloomParams,
    bits: BitArray,
    /// Number of insertions, duplicates included
    len: u64,
    hasher: H,
}

impl BloomFilter {
    /// Creates an empty filter for `capacity` elements at `target_error_rate`, using the
    /// derived hash count and the default hash family.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if `capacity` is 0 or `target_error_rate` is not in
    /// (0, 1).
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomfilter::bloom::BloomFilter;
    /// let filter = BloomFilter::new(1000, 0.01).unwrap();
    /// assert_eq!(filter.num_bits(), 9586);
    /// assert_eq!(filter.num_hashes(), 7);
    /// ```
    pub fn new(capacity: u64, target_error_rate: f64) -> Result<Self, Error> {
        super::BloomFilterBuilder::with_accuracy(capacity, target_error_rate).build()
    }
}

impl<H: HashFamily> BloomFilter<H> {
    pub(super) fn from_params(params: BloomParams, hasher: H) -> Self {
        BloomFilter {
            params,
            bits: BitArray::new(params.num_bits),
            len: 0,
            hasher,
        }
    }

    /// Tests whether an item is possibly in the set.
    ///
    /// Returns:
    /// - `true`: Item was **possibly** inserted (or false positive)
    /// - `false`: Item was **definitely not** inserted
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomfilter::bloom::BloomFilter;
    /// let filter = BloomFilter::new(100, 0.01).unwrap().insert("apple");
    ///
    /// assert!(filter.contains("apple"));
    /// assert!(!filter.contains("grape"));
    /// ```
    pub fn contains<T: Hash + ?Sized>(&self, item: &T) -> bool {
        if self.bits.count_ones() == 0 {
            return false;
        }

        (0..self.params.num_hashes)
            .all(|seed| self.bits.get_bit(self.bit_index(item, seed)))
    }

    /// Returns a copy of this filter with `item` added.
    ///
    /// The receiver is left unmodified. The copy costs O(m) in the bit length; use
    /// [`populate()`](Self::populate) or [`merge()`](Self::merge) to add many items.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomfilter::bloom::BloomFilter;
    /// let empty = BloomFilter::new(100, 0.01).unwrap();
    /// let one = empty.insert("apple");
    ///
    /// assert_eq!(empty.len(), 0);
    /// assert_eq!(one.len(), 1);
    /// assert!(one.contains("apple"));
    /// ```
    #[must_use = "insert returns a new filter and leaves this one unchanged"]
    pub fn insert<T: Hash + ?Sized>(&self, item: &T) -> Self {
        let mut derived = self.clone();
        derived.add_item(item);
        derived.len += 1;
        derived
    }

    /// Adds every element of `elements` to this filter in place.
    ///
    /// Population is only allowed while no bit is set. A filter built with non-empty
    /// initial elements, or populated before with at least one element, rejects any further
    /// call, including one with no elements.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyPopulated` if any bit is already set. The filter is not modified in
    /// that case.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomfilter::bloom::BloomFilter;
    /// # use bloomfilter::error::ErrorKind;
    /// let mut filter = BloomFilter::new(100, 0.01).unwrap();
    /// filter.populate(["apple", "banana"]).unwrap();
    /// assert_eq!(filter.len(), 2);
    ///
    /// let err = filter.populate(Vec::<&str>::new()).unwrap_err();
    /// assert_eq!(err.kind(), ErrorKind::AlreadyPopulated);
    /// ```
    pub fn populate<I>(&mut self, elements: I) -> Result<(), Error>
    where
        I: IntoIterator,
        I::Item: Hash,
    {
        if self.bits.any_set() {
            log::debug!(
                "rejecting populate: {} of {} bits already set",
                self.bits.count_ones(),
                self.bits.len()
            );
            return Err(
                Error::already_populated(self.bits.count_ones()).with_context("len", self.len)
            );
        }

        let added = self.add_all(elements);
        log::debug!("populated bloom filter with {added} elements");
        Ok(())
    }

    /// Combines two filters into a new one recognizing items from either.
    ///
    /// The bit arrays are OR-ed together and the element counts are summed. Items inserted
    /// into both operands are counted twice.
    ///
    /// # Errors
    ///
    /// Returns `IncompatibleFilter` if the filters differ in hash count or bit length.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomfilter::bloom::BloomFilter;
    /// let f1 = BloomFilter::new(100, 0.01).unwrap().insert("a");
    /// let f2 = BloomFilter::new(100, 0.01).unwrap().insert("b");
    ///
    /// let merged = f1.merge(&f2).unwrap();
    /// assert!(merged.contains("a"));
    /// assert!(merged.contains("b"));
    /// assert_eq!(merged.len(), 2);
    /// ```
    pub fn merge(&self, other: &BloomFilter<H>) -> Result<Self, Error> {
        if self.params.num_hashes != other.params.num_hashes {
            return Err(Error::incompatible_filter(
                "num_hashes",
                self.params.num_hashes,
                other.params.num_hashes,
            ));
        }
        if self.params.num_bits != other.params.num_bits {
            return Err(Error::incompatible_filter(
                "num_bits",
                self.params.num_bits,
                other.params.num_bits,
            ));
        }

        let mut merged = self.clone();
        merged.bits.or_in_place(&other.bits);
        merged.len += other.len;
        log::debug!(
            "merged bloom filters: len={}, bits_used={}",
            merged.len,
            merged.bits.count_ones()
        );
        Ok(merged)
    }

    /// Checks if two filters are compatible for merging.
    ///
    /// Filters are compatible if they have the same:
    /// - Number of hash functions
    /// - Number of bits
    pub fn is_compatible(&self, other: &BloomFilter<H>) -> bool {
        self.params.num_hashes == other.params.num_hashes
            && self.params.num_bits == other.params.num_bits
    }

    /// Returns the number of insertions, counting duplicates.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Returns whether nothing has been inserted.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Estimates the current false positive probability from the element count.
    ///
    /// Formula: `0.5 ^ ((m / len) * ln(2))`, or 0 when the filter is empty. The estimate
    /// approaches the target error rate as `len` approaches the capacity. Lightly filled
    /// filters underflow to exactly 0.
    pub fn actual_error_rate(&self) -> f64 {
        if self.len == 0 {
            return 0.0;
        }
        let ratio = self.params.num_bits as f64 / self.len as f64;
        0.5f64.powf(ratio * LN_2)
    }

    /// Exports the bit array in index order, `num_bits()` entries long.
    pub fn export_bits(&self) -> Vec<bool> {
        self.bits.to_vec()
    }

    /// Returns the expected number of elements the filter was sized for.
    pub fn capacity(&self) -> u64 {
        self.params.capacity
    }

    /// Returns the false positive probability requested at construction.
    pub fn target_error_rate(&self) -> f64 {
        self.params.target_error_rate
    }

    /// Returns the bits per expected element derived from the target error rate.
    pub fn bits_per_element(&self) -> f64 {
        self.params.bits_per_element
    }

    /// Returns the number of hash functions used.
    pub fn num_hashes(&self) -> u16 {
        self.params.num_hashes
    }

    /// Returns the total number of bits in the filter.
    pub fn num_bits(&self) -> u64 {
        self.params.num_bits
    }

    /// Returns the derived parameters of this filter.
    pub fn params(&self) -> &BloomParams {
        &self.params
    }

    /// Returns the number of bits set to 1.
    pub fn bits_used(&self) -> u64 {
        self.bits.count_ones()
    }

    /// Returns the current load factor (fraction of bits set).
    ///
    /// Values near 0.5 indicate the filter is at its designed capacity.
    pub fn load_factor(&self) -> f64 {
        self.bits.count_ones() as f64 / self.params.num_bits as f64
    }

    /// Returns the hash family.
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Sets the bits of every element and counts them, without the populate guard.
    pub(super) fn add_all<I>(&mut self, elements: I) -> u64
    where
        I: IntoIterator,
        I::Item: Hash,
    {
        let mut added = 0;
        for element in elements {
            self.add_item(&element);
            added += 1;
        }
        self.len += added;
        added
    }

    fn add_item<T: Hash + ?Sized>(&mut self, item: &T) {
        for seed in 0..self.params.num_hashes {
            let bit_index = self.bit_index(item, seed);
            self.bits.set_bit(bit_index);
        }
    }

    /// Position of `item` under hash function `seed`: `hash(item, seed) % m`.
    fn bit_index<T: Hash + ?Sized>(&self, item: &T, seed: u16) -> u64 {
        self.hasher.hash_with_seed(item, u32::from(seed)) % self.params.num_bits
    }
}

#[cfg(test)]
mod tests {
    use googletest::assert_that;
    use googletest::prelude::gt;
    use googletest::prelude::lt;
    use googletest::prelude::near;

    use super::BloomFilter;
    use crate::bloom::BloomFilterBuilder;
    use crate::error::ErrorKind;

    #[test]
    fn test_new_filter() {
        let filter = BloomFilter::new(1000, 0.01).unwrap();
        assert_eq!(filter.capacity(), 1000);
        assert_eq!(filter.num_hashes(), 7);
        assert_eq!(filter.num_bits(), 9586);
        assert!(filter.is_empty());
        assert_eq!(filter.bits_used(), 0);
        assert_eq!(filter.actual_error_rate(), 0.0);
        assert!(!filter.contains("anything"));
    }

    #[test]
    fn test_insert_and_contains() {
        let filter = BloomFilter::new(100, 0.01).unwrap();
        assert!(!filter.contains("apple"));

        let filter = filter.insert("apple").insert(&42_u64);
        assert!(filter.contains("apple"));
        assert!(filter.contains(&42_u64));
        assert_eq!(filter.len(), 2);
        assert!(!filter.is_empty());
    }

    #[test]
    fn test_insert_leaves_original_untouched() {
        let original = BloomFilter::new(100, 0.01).unwrap().insert("apple");
        let snapshot = original.clone();

        let derived = original.insert("banana");
        assert_eq!(original, snapshot);
        assert_eq!(original.len(), 1);
        assert_eq!(derived.len(), 2);
        assert!(derived.contains("banana"));
        assert!(derived.contains("apple"));
    }

    #[test]
    fn test_duplicate_inserts_are_counted() {
        let filter = BloomFilter::new(100, 0.01).unwrap();
        let once = filter.insert("apple");
        let twice = once.insert("apple");
        assert_eq!(twice.len(), 2);
        assert_eq!(once.export_bits(), twice.export_bits());
    }

    #[test]
    fn test_insert_sets_at_most_k_bits() {
        let filter = BloomFilter::new(1000, 0.01).unwrap().insert("apple");
        assert!(filter.bits_used() >= 1);
        assert!(filter.bits_used() <= u64::from(filter.num_hashes()));
    }

    #[test]
    fn test_populate_once() {
        let mut filter = BloomFilter::new(100, 0.01).unwrap();
        filter.populate(["a", "b", "c", "a"]).unwrap();
        assert_eq!(filter.len(), 4);
        for item in ["a", "b", "c"] {
            assert!(filter.contains(item));
        }

        let before = filter.clone();
        let err = filter.populate(["d"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyPopulated);
        assert_eq!(filter, before);
    }

    #[test]
    fn test_populate_with_nothing_keeps_filter_open() {
        let mut filter = BloomFilter::new(100, 0.01).unwrap();
        filter.populate(Vec::<u64>::new()).unwrap();
        assert!(filter.is_empty());

        filter.populate([1_u64, 2, 3]).unwrap();
        assert_eq!(filter.len(), 3);
    }

    #[test]
    fn test_initial_elements_count_as_populated() {
        let mut filter = BloomFilterBuilder::with_accuracy(100, 0.01)
            .build_with(["x"])
            .unwrap();
        let err = filter.populate(Vec::<&str>::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyPopulated);
    }

    #[test]
    fn test_inserted_filter_rejects_populate() {
        let mut filter = BloomFilter::new(100, 0.01).unwrap().insert("x");
        assert!(filter.populate(["y"]).is_err());
    }

    #[test]
    fn test_merge() {
        let f1 = BloomFilter::new(100, 0.01).unwrap().insert("a");
        let f2 = BloomFilter::new(100, 0.01).unwrap().insert("b").insert("a");

        let merged = f1.merge(&f2).unwrap();
        assert!(merged.contains("a"));
        assert!(merged.contains("b"));
        assert_eq!(merged.len(), 3);

        // operands untouched
        assert_eq!(f1.len(), 1);
        assert_eq!(f2.len(), 2);
    }

    #[test]
    fn test_merge_is_commutative() {
        let f1 = BloomFilter::new(100, 0.01).unwrap().insert("a").insert("c");
        let f2 = BloomFilter::new(100, 0.01).unwrap().insert("b");

        let left = f1.merge(&f2).unwrap();
        let right = f2.merge(&f1).unwrap();
        assert_eq!(left.export_bits(), right.export_bits());
        assert_eq!(left.len(), right.len());
    }

    #[test]
    fn test_merge_incompatible() {
        let f1 = BloomFilter::new(100, 0.01).unwrap();
        let more_bits = BloomFilter::new(200, 0.01).unwrap();
        let more_hashes = BloomFilterBuilder::with_accuracy(100, 0.01)
            .num_hashes(3)
            .build()
            .unwrap();

        assert!(!f1.is_compatible(&more_bits));
        assert!(!f1.is_compatible(&more_hashes));

        let err = f1.merge(&more_bits).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncompatibleFilter);
        assert_eq!(err.message(), "num_bits mismatch: expected 959, got 1918");

        let err = f1.merge(&more_hashes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncompatibleFilter);
        assert_eq!(err.message(), "num_hashes mismatch: expected 7, got 3");
    }

    #[test]
    fn test_statistics() {
        let filter = BloomFilter::new(1000, 0.01).unwrap();
        assert_eq!(filter.load_factor(), 0.0);

        let filter = filter.insert("test");
        assert!(filter.bits_used() > 0);
        assert!(filter.load_factor() > 0.0);
        // 0.5^(9586 * ln 2) is far below the smallest f64
        assert_eq!(filter.actual_error_rate(), 0.0);
        assert!((filter.bits_per_element() - 9.585058).abs() < 1e-6);
        assert_eq!(filter.target_error_rate(), 0.01);
    }

    #[test]
    fn test_actual_error_rate_half_full() {
        let mut filter = BloomFilter::new(1000, 0.01).unwrap();
        filter.populate(0..500_u64).unwrap();

        let expected = 0.5f64.powf(9586.0 / 500.0 * std::f64::consts::LN_2);
        assert_that!(filter.actual_error_rate(), gt(0.0));
        assert_that!(filter.actual_error_rate(), near(expected, 1e-12));
        assert_that!(filter.actual_error_rate(), lt(filter.target_error_rate()));
    }

    #[test]
    fn test_export_bits() {
        let filter = BloomFilter::new(50, 0.1).unwrap();
        let exported = filter.export_bits();
        assert_eq!(exported.len() as u64, filter.num_bits());
        assert!(exported.iter().all(|&b| !b));

        let filter = filter.insert("apple");
        let exported = filter.export_bits();
        assert_eq!(exported.len() as u64, filter.num_bits());
        assert_eq!(
            exported.iter().filter(|&&b| b).count() as u64,
            filter.bits_used()
        );
    }
}
