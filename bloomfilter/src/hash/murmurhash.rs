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

use std::hash::Hasher;

use byteorder::ByteOrder;
use byteorder::LE;

const C1: u64 = 0x87c37b91114253d5;
const C2: u64 = 0x4cf5ad432745937f;
const BLOCK_LEN: usize = 16;

/// Streaming MurmurHash3 (x64, 128-bit variant).
///
/// Bytes are buffered until a full 16 byte block is available, so the result
/// does not depend on how the input is split across [`Hasher::write`] calls.
///
/// Integers are written in little-endian order and `usize`/`isize` are widened to 64 bits,
/// so values fed through [`std::hash::Hash`] (including length prefixes) hash the same on
/// every target.
#[derive(Debug, Clone)]
pub struct MurmurHash3X64128 {
    h1: u64,
    h2: u64,
    total: u64,
    buf: [u8; BLOCK_LEN],
    buf_len: usize,
}

impl MurmurHash3X64128 {
    /// Creates a hasher whose two lanes both start at `seed`.
    pub fn with_seed(seed: u64) -> Self {
        MurmurHash3X64128 {
            h1: seed,
            h2: seed,
            total: 0,
            buf: [0; BLOCK_LEN],
            buf_len: 0,
        }
    }

    /// Returns both 64-bit halves of the digest.
    pub fn finish128(&self) -> (u64, u64) {
        let mut h1 = self.h1;
        let mut h2 = self.h2;

        let tail = &self.buf[..self.buf_len];
        if tail.len() > 8 {
            h2 ^= mix_k2(read_partial(&tail[8..]));
        }
        if !tail.is_empty() {
            h1 ^= mix_k1(read_partial(&tail[..tail.len().min(8)]));
        }

        let total = self.total + self.buf_len as u64;
        h1 ^= total;
        h2 ^= total;
        h1 = h1.wrapping_add(h2);
        h2 = h2.wrapping_add(h1);
        h1 = fmix64(h1);
        h2 = fmix64(h2);
        h1 = h1.wrapping_add(h2);
        h2 = h2.wrapping_add(h1);
        (h1, h2)
    }

    #[inline]
    fn process_block(&mut self, block: &[u8]) {
        let k1 = LE::read_u64(&block[..8]);
        let k2 = LE::read_u64(&block[8..]);

        self.h1 ^= mix_k1(k1);
        self.h1 = self
            .h1
            .rotate_left(27)
            .wrapping_add(self.h2)
            .wrapping_mul(5)
            .wrapping_add(0x52dce729);

        self.h2 ^= mix_k2(k2);
        self.h2 = self
            .h2
            .rotate_left(31)
            .wrapping_add(self.h1)
            .wrapping_mul(5)
            .wrapping_add(0x38495ab5);

        self.total += BLOCK_LEN as u64;
    }
}

impl Hasher for MurmurHash3X64128 {
    fn finish(&self) -> u64 {
        self.finish128().0
    }

    fn write_u16(&mut self, i: u16) {
        self.write(&i.to_le_bytes());
    }

    fn write_u32(&mut self, i: u32) {
        self.write(&i.to_le_bytes());
    }

    fn write_u64(&mut self, i: u64) {
        self.write(&i.to_le_bytes());
    }

    fn write_u128(&mut self, i: u128) {
        self.write(&i.to_le_bytes());
    }

    fn write_usize(&mut self, i: usize) {
        self.write_u64(i as u64);
    }

    fn write_i16(&mut self, i: i16) {
        self.write_u16(i as u16);
    }

    fn write_i32(&mut self, i: i32) {
        self.write_u32(i as u32);
    }

    fn write_i64(&mut self, i: i64) {
        self.write_u64(i as u64);
    }

    fn write_i128(&mut self, i: i128) {
        self.write_u128(i as u128);
    }

    fn write_isize(&mut self, i: isize) {
        self.write_u64(i as i64 as u64);
    }

    fn write(&mut self, mut bytes: &[u8]) {
        if self.buf_len > 0 {
            let wanted = (BLOCK_LEN - self.buf_len).min(bytes.len());
            self.buf[self.buf_len..self.buf_len + wanted].copy_from_slice(&bytes[..wanted]);
            self.buf_len += wanted;
            bytes = &bytes[wanted..];

            if self.buf_len < BLOCK_LEN {
                return;
            }
            let block = self.buf;
            self.process_block(&block);
            self.buf_len = 0;
        }

        let mut blocks = bytes.chunks_exact(BLOCK_LEN);
        for block in &mut blocks {
            self.process_block(block);
        }

        let rest = blocks.remainder();
        self.buf[..rest.len()].copy_from_slice(rest);
        self.buf_len = rest.len();
    }
}

#[inline]
fn mix_k1(k1: u64) -> u64 {
    k1.wrapping_mul(C1).rotate_left(31).wrapping_mul(C2)
}

#[inline]
fn mix_k2(k2: u64) -> u64 {
    k2.wrapping_mul(C2).rotate_left(33).wrapping_mul(C1)
}

/// Reads up to 8 bytes as a little-endian u64, zero padded.
#[inline]
fn read_partial(bytes: &[u8]) -> u64 {
    LE::read_uint(bytes, bytes.len())
}

/// Finalization mix: force all bits of a hash block to avalanche.
#[inline]
fn fmix64(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51afd7ed558ccd);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ceb9fe1a85ec53);
    k ^ (k >> 33)
}
