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

/// Fixed-length bit vector packed into `u64` words.
///
/// Bits past `len` in the last word are always zero. All index operations panic when the
/// index is outside `0..len`, since positions come from hashes already reduced modulo `len`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BitArray {
    words: Box<[u64]>,
    len: u64,
    /// Count of bits set to 1, kept in step with `words`
    num_bits_set: u64,
}

impl BitArray {
    /// Creates an all-zero array of `len` bits.
    pub fn new(len: u64) -> Self {
        let num_words = len.div_ceil(64) as usize;
        BitArray {
            words: vec![0u64; num_words].into_boxed_slice(),
            len,
            num_bits_set: 0,
        }
    }

    /// Number of bits.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn get_bit(&self, bit_index: u64) -> bool {
        let (word_index, mask) = self.locate(bit_index);
        (self.words[word_index] & mask) != 0
    }

    /// Sets a bit, returning whether it was previously clear.
    pub fn set_bit(&mut self, bit_index: u64) -> bool {
        let (word_index, mask) = self.locate(bit_index);
        let word = &mut self.words[word_index];
        if *word & mask != 0 {
            return false;
        }
        *word |= mask;
        self.num_bits_set += 1;
        true
    }

    /// Bitwise OR of `other` into `self`.
    ///
    /// # Panics
    ///
    /// Panics if the two arrays differ in length.
    pub fn or_in_place(&mut self, other: &BitArray) {
        assert_eq!(
            self.len, other.len,
            "cannot OR bit arrays of different lengths"
        );
        // Count bits during the OR (single pass)
        let mut num_bits_set = 0;
        for (word, other_word) in self.words.iter_mut().zip(other.words.iter()) {
            *word |= *other_word;
            num_bits_set += u64::from(word.count_ones());
        }
        self.num_bits_set = num_bits_set;
    }

    /// Returns whether at least one bit is set.
    pub fn any_set(&self) -> bool {
        self.num_bits_set != 0
    }

    /// Number of bits set to 1.
    pub fn count_ones(&self) -> u64 {
        self.num_bits_set
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.get_bit(i))
    }

    /// Exports the bits in index order.
    pub fn to_vec(&self) -> Vec<bool> {
        self.iter().collect()
    }

    fn locate(&self, bit_index: u64) -> (usize, u64) {
        assert!(
            bit_index < self.len,
            "bit index {bit_index} out of range for length {}",
            self.len
        );
        let word_index = (bit_index >> 6) as usize; // bit_index / 64
        let mask = 1u64 << (bit_index & 63); // bit_index % 64
        (word_index, mask)
    }
}

#[cfg(test)]
mod tests {
    use super::BitArray;

    #[test]
    fn test_new_is_clear() {
        let bits = BitArray::new(130);
        assert_eq!(bits.len(), 130);
        assert!(!bits.any_set());
        assert_eq!(bits.count_ones(), 0);
        assert_eq!(bits.to_vec(), vec![false; 130]);
    }

    #[test]
    fn test_set_and_get() {
        let mut bits = BitArray::new(130);
        for i in [0, 63, 64, 129] {
            assert!(bits.set_bit(i));
        }
        assert!(!bits.set_bit(64));

        assert!(bits.any_set());
        assert_eq!(bits.count_ones(), 4);
        assert!(bits.get_bit(0));
        assert!(bits.get_bit(63));
        assert!(bits.get_bit(64));
        assert!(bits.get_bit(129));
        assert!(!bits.get_bit(1));
        assert!(!bits.get_bit(128));

        let exported = bits.to_vec();
        assert_eq!(exported.len(), 130);
        let set: Vec<usize> = exported
            .iter()
            .enumerate()
            .filter_map(|(i, &b)| b.then_some(i))
            .collect();
        assert_eq!(set, vec![0, 63, 64, 129]);
    }

    #[test]
    fn test_or_in_place() {
        let mut left = BitArray::new(100);
        let mut right = BitArray::new(100);
        left.set_bit(3);
        left.set_bit(70);
        right.set_bit(70);
        right.set_bit(99);

        left.or_in_place(&right);
        assert_eq!(left.count_ones(), 3);
        assert_eq!(left.iter().filter(|&b| b).count(), 3);
        assert!(left.get_bit(3) && left.get_bit(70) && left.get_bit(99));
        // operand untouched
        assert_eq!(right.count_ones(), 2);
    }

    #[test]
    #[should_panic(expected = "cannot OR bit arrays of different lengths")]
    fn test_or_length_mismatch() {
        let mut left = BitArray::new(100);
        left.or_in_place(&BitArray::new(101));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_get_out_of_range() {
        // 100 bits still occupy two words; index 100 must be rejected anyway
        let bits = BitArray::new(100);
        bits.get_bit(100);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_set_out_of_range() {
        let mut bits = BitArray::new(1);
        bits.set_bit(1);
    }
}
