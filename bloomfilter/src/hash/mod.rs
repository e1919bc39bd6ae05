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

//! Seeded hash families used to place items in a bit array.
//!
//! A filter with `k` hash functions asks its [`HashFamily`] for
//! `hash_with_seed(item, i)` for every `i` in `0..k` and reduces each value modulo the bit
//! length. Any family works as long as it is deterministic (same item and seed, same value)
//! and its outputs for different seeds look independent and uniformly distributed.
//!
//! The default family, [`Murmur3Family`], is pinned so that bit arrays are reproducible:
//!
//! - algorithm: MurmurHash3 x64/128
//! - seed: the hash function index `i`, widened to 64 bits
//! - value: the low 64 bits (`h1`) of the 128-bit digest
//! - input: the item as fed through [`std::hash::Hash`], with integers written little-endian
//!   and `usize` length prefixes widened to 64 bits
//!
//! Strings, byte slices and scalar integers therefore land on the same bits on every target.
//! Slices of multi-byte integers are hashed by `std` as raw memory and remain endian-dependent;
//! types with hand-written `Hash` impls are only as stable as those impls.

mod murmurhash;

use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;

pub use self::murmurhash::MurmurHash3X64128;

/// A family of seeded, non-cryptographic hash functions.
pub trait HashFamily: Clone + fmt::Debug {
    /// Hashes `item` with the function selected by `seed`.
    fn hash_with_seed<T: Hash + ?Sized>(&self, item: &T, seed: u32) -> u64;
}

/// MurmurHash3 x64/128 seeded with the hash function index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Murmur3Family;

impl HashFamily for Murmur3Family {
    fn hash_with_seed<T: Hash + ?Sized>(&self, item: &T, seed: u32) -> u64 {
        let mut hasher = MurmurHash3X64128::with_seed(u64::from(seed));
        item.hash(&mut hasher);
        hasher.finish()
    }
}
