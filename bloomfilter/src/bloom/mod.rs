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

//! Bloom filter for probabilistic set membership testing.
//!
//! A Bloom filter is a space-efficient probabilistic data structure used to test whether
//! an element is a member of a set. False positive matches are possible, but false negatives
//! are not. In other words, a query returns either "possibly in set" or "definitely not in set".
//!
//! # Properties
//!
//! - **No false negatives**: If an item was inserted, `contains()` will always return `true`
//! - **Possible false positives**: `contains()` may return `true` for items never inserted
//! - **Fixed size**: The bit array length is derived once, at construction
//! - **No deletion**: Bits are only ever set, never cleared
//!
//! # Usage
//!
//! ```rust
//! use bloomfilter::bloom::BloomFilterBuilder;
//!
//! // Sized for 1000 items with a 1% false positive rate, seeded with two items
//! let filter = BloomFilterBuilder::with_accuracy(1000, 0.01)
//!     .build_with(["apple", "banana"])
//!     .unwrap();
//!
//! // Insertion returns a new filter
//! let filter = filter.insert("cherry");
//!
//! assert!(filter.contains("apple"));
//! assert!(filter.contains("cherry"));
//! assert_eq!(filter.len(), 3);
//!
//! println!("Bits: {}", filter.num_bits());
//! println!("Est. FPP: {:.4}%", filter.actual_error_rate() * 100.0);
//! ```
//!
//! # Sizing
//!
//! For a capacity `n` and target error rate `ε`:
//!
//! - bits per element `b = -ln(ε) / ln(2)²`
//! - hash count `k = ceil(b * ln(2))`, unless overridden
//! - bit length `m = ceil(n * b)`
//!
//! # Growing a Filter
//!
//! - [`BloomFilter::insert`] returns a copy with one more item. The original is unchanged, so
//!   a filter can be shared freely while each owner derives its own extensions.
//! - [`BloomFilter::populate`] adds a batch in place, once. It fails with
//!   [`ErrorKind::AlreadyPopulated`](crate::error::ErrorKind::AlreadyPopulated) as soon as any
//!   bit is set, including bits set by initial elements or by `insert`.
//! - [`BloomFilter::merge`] ORs two filters with the same hash count and bit length into a
//!   new one.
//!
//! ```rust
//! # use bloomfilter::bloom::BloomFilter;
//! let mut f1 = BloomFilter::new(100, 0.01).unwrap();
//! f1.populate(["a", "b"]).unwrap();
//!
//! let f2 = BloomFilter::new(100, 0.01).unwrap().insert("c");
//!
//! let merged = f1.merge(&f2).unwrap();
//! assert!(merged.contains("a"));
//! assert!(merged.contains("c"));
//! assert_eq!(merged.len(), 3);
//! ```
//!
//! # Concurrency
//!
//! `contains`, `insert` and `merge` borrow the filter immutably and may run from many
//! threads at once. `populate` needs `&mut self`; wrap the filter in a lock if several
//! threads must populate it.
//!
//! # Implementation Details
//!
//! - Hashing goes through a [`HashFamily`](crate::hash::HashFamily); the default is
//!   MurmurHash3 x64/128 seeded with the hash function index
//! - Bit `i` of the `j`-th hash function is `hash(item, j) % m`
//! - Bits packed in `u64` words
//!
//! # References
//!
//! - Bloom, Burton H. (1970). "Space/time trade-offs in hash coding with allowable errors"

mod bit_array;
mod builder;
mod sketch;

pub use self::builder::BloomFilterBuilder;
pub use self::builder::BloomParams;
pub use self::builder::DEFAULT_CAPACITY;
pub use self::builder::DEFAULT_TARGET_ERROR_RATE;
pub use self::builder::MAX_NUM_BITS;
pub use self::builder::MAX_NUM_HASHES;
pub use self::sketch::BloomFilter;
