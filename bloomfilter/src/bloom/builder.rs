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

use super::BloomFilter;
use crate::error::Error;
use crate::hash::HashFamily;
use crate::hash::Murmur3Family;

/// Capacity used when none is configured.
pub const DEFAULT_CAPACITY: u64 = 100_000;
/// Target error rate used when none is configured.
pub const DEFAULT_TARGET_ERROR_RATE: f64 = 0.001;
/// Largest supported bit array length, 16 GiB of storage.
///
/// This is an allocation limit only; filters are never persisted.
pub const MAX_NUM_BITS: u64 = i32::MAX as u64 * 64;
/// Largest supported hash count.
pub const MAX_NUM_HASHES: u16 = i16::MAX as u16;

/// Sizing of a filter derived from its capacity and target error rate.
///
/// Use [`BloomParams::derive`] or [`BloomFilterBuilder::params`] to obtain one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomParams {
    /// Expected number of elements (n)
    pub capacity: u64,
    /// Desired false positive probability at capacity (ε)
    pub target_error_rate: f64,
    /// Bits of storage per expected element (b)
    pub bits_per_element: f64,
    /// Number of hash functions (k)
    pub num_hashes: u16,
    /// Length of the bit array (m)
    pub num_bits: u64,
}

impl BloomParams {
    /// Derives filter parameters.
    ///
    /// - `b = -ln(ε) / ln(2)²`
    /// - `k = ceil(b * ln(2))`, or `num_hashes` when it is non-zero
    /// - `m = ceil(n * b)`
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidConfiguration`](crate::error::ErrorKind::InvalidConfiguration)
    /// if `capacity` is 0, `target_error_rate` is not in (0, 1), or the resulting bit array
    /// or hash count is too large.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomfilter::bloom::BloomParams;
    /// let params = BloomParams::derive(1000, 0.01, 0).unwrap();
    /// assert_eq!(params.num_hashes, 7);
    /// assert_eq!(params.num_bits, 9586);
    /// ```
    pub fn derive(capacity: u64, target_error_rate: f64, num_hashes: u16) -> Result<Self, Error> {
        if capacity == 0 {
            return Err(Error::invalid_configuration("capacity must be greater than 0"));
        }
        // written so that NaN is rejected too
        if !(target_error_rate > 0.0 && target_error_rate < 1.0) {
            return Err(
                Error::invalid_configuration("target error rate must be in range (0, 1)")
                    .with_context("target_error_rate", target_error_rate),
            );
        }
        if num_hashes > MAX_NUM_HASHES {
            return Err(
                Error::invalid_configuration(format!(
                    "num_hashes must not exceed {MAX_NUM_HASHES}"
                ))
                .with_context("num_hashes", num_hashes),
            );
        }

        let bits_per_element = Self::suggest_bits_per_element(target_error_rate);
        let num_bits = unclamped_num_bits(capacity, bits_per_element);
        if num_bits > MAX_NUM_BITS as f64 {
            return Err(
                Error::invalid_configuration(format!("num_bits must not exceed {MAX_NUM_BITS}"))
                    .with_context("capacity", capacity)
                    .with_context("target_error_rate", target_error_rate),
            );
        }

        let num_hashes = if num_hashes == 0 {
            Self::suggest_num_hashes(bits_per_element)
        } else {
            num_hashes
        };

        Ok(BloomParams {
            capacity,
            target_error_rate,
            bits_per_element,
            num_hashes,
            num_bits: num_bits as u64,
        })
    }

    /// Optimal bits per element for a target error rate: `-ln(ε) / ln(2)²`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomfilter::bloom::BloomParams;
    /// let b = BloomParams::suggest_bits_per_element(0.01);
    /// assert!((b - 9.585).abs() < 0.001);
    /// ```
    pub fn suggest_bits_per_element(target_error_rate: f64) -> f64 {
        -target_error_rate.ln() / (LN_2 * LN_2)
    }

    /// Optimal number of hash functions for a bits-per-element ratio: `ceil(b * ln(2))`.
    ///
    /// Ceil to avoid selecting too few hashes.
    pub fn suggest_num_hashes(bits_per_element: f64) -> u16 {
        (bits_per_element * LN_2)
            .ceil()
            .clamp(1.0, f64::from(MAX_NUM_HASHES)) as u16
    }

    /// Bit array length for a capacity and bits-per-element ratio: `ceil(n * b)`.
    ///
    /// The result is clamped to `1..=MAX_NUM_BITS`.
    pub fn suggest_num_bits(capacity: u64, bits_per_element: f64) -> u64 {
        unclamped_num_bits(capacity, bits_per_element).clamp(1.0, MAX_NUM_BITS as f64) as u64
    }
}

/// `ceil(n * b)` before any range check.
fn unclamped_num_bits(capacity: u64, bits_per_element: f64) -> f64 {
    (capacity as f64 * bits_per_element).ceil()
}

/// Builder for creating [`BloomFilter`] instances.
///
/// Defaults: capacity 100,000, target error rate 0.001, hash count derived from the
/// error rate, MurmurHash3 hash family. Validation happens in [`build()`](Self::build),
/// [`build_with()`](Self::build_with) and [`params()`](Self::params).
#[derive(Debug, Clone)]
pub struct BloomFilterBuilder<H = Murmur3Family> {
    capacity: u64,
    target_error_rate: f64,
    num_hashes: u16,
    hasher: H,
}

impl BloomFilterBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        BloomFilterBuilder {
            capacity: DEFAULT_CAPACITY,
            target_error_rate: DEFAULT_TARGET_ERROR_RATE,
            num_hashes: 0,
            hasher: Murmur3Family,
        }
    }

    /// Creates a builder sized for `capacity` elements at `target_error_rate`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomfilter::bloom::BloomFilterBuilder;
    /// let filter = BloomFilterBuilder::with_accuracy(10_000, 0.01).build().unwrap();
    /// assert_eq!(filter.num_hashes(), 7);
    /// ```
    pub fn with_accuracy(capacity: u64, target_error_rate: f64) -> Self {
        Self::new()
            .capacity(capacity)
            .target_error_rate(target_error_rate)
    }
}

impl Default for BloomFilterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: HashFamily> BloomFilterBuilder<H> {
    /// Sets the expected number of elements.
    pub fn capacity(mut self, capacity: u64) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the false positive probability expected once `capacity` elements are inserted.
    pub fn target_error_rate(mut self, target_error_rate: f64) -> Self {
        self.target_error_rate = target_error_rate;
        self
    }

    /// Overrides the derived hash count. `0` restores the derived value.
    pub fn num_hashes(mut self, num_hashes: u16) -> Self {
        self.num_hashes = num_hashes;
        self
    }

    /// Replaces the hash family.
    ///
    /// Filters built with different hash family types cannot be merged.
    pub fn hasher<G: HashFamily>(self, hasher: G) -> BloomFilterBuilder<G> {
        BloomFilterBuilder {
            capacity: self.capacity,
            target_error_rate: self.target_error_rate,
            num_hashes: self.num_hashes,
            hasher,
        }
    }

    /// Derives the filter parameters without allocating the filter.
    pub fn params(&self) -> Result<BloomParams, Error> {
        BloomParams::derive(self.capacity, self.target_error_rate, self.num_hashes)
    }

    /// Builds an empty filter.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the settings cannot produce a filter.
    pub fn build(self) -> Result<BloomFilter<H>, Error> {
        let params = self.params()?;
        log::debug!(
            "building bloom filter: capacity={}, target_error_rate={}, num_hashes={}, num_bits={}",
            params.capacity,
            params.target_error_rate,
            params.num_hashes,
            params.num_bits
        );
        Ok(BloomFilter::from_params(params, self.hasher))
    }

    /// Builds a filter holding `elements`.
    ///
    /// The resulting filter counts as populated when `elements` is non-empty, so
    /// [`BloomFilter::populate`] will reject it.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomfilter::bloom::BloomFilterBuilder;
    /// let filter = BloomFilterBuilder::with_accuracy(100, 0.01)
    ///     .build_with(["apple", "banana"])
    ///     .unwrap();
    /// assert_eq!(filter.len(), 2);
    /// assert!(filter.contains("apple"));
    /// ```
    pub fn build_with<I>(self, elements: I) -> Result<BloomFilter<H>, Error>
    where
        I: IntoIterator,
        I::Item: Hash,
    {
        let mut filter = self.build()?;
        let added = filter.add_all(elements);
        log::debug!("bloom filter built with {added} initial elements");
        Ok(filter)
    }
}
