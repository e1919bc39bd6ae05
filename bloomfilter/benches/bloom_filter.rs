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

use criterion::Criterion;
use criterion::Throughput;
use criterion::black_box;
use criterion::criterion_group;
use criterion::criterion_main;

use bloomfilter::bloom::BloomFilter;
use bloomfilter::bloom::BloomFilterBuilder;

fn populated(capacity: u64) -> BloomFilter {
    BloomFilterBuilder::with_accuracy(capacity, 0.01)
        .build_with(0..capacity)
        .unwrap()
}

fn bench_bloom(c: &mut Criterion) {
    let mut group = c.benchmark_group("bloom_filter");

    group.throughput(Throughput::Elements(100_000));
    group.bench_function("populate", |b| {
        b.iter(|| {
            let mut filter = BloomFilter::new(100_000, 0.01).unwrap();
            filter.populate(0..100_000_u64).unwrap();
            black_box(filter)
        });
    });

    group.throughput(Throughput::Elements(1));
    group.bench_function("insert_copy", |b| {
        let filter = populated(10_000);
        let mut i = 0u64;
        b.iter(|| {
            let derived = filter.insert(&i);
            i = i.wrapping_add(1);
            black_box(derived)
        });
    });

    group.bench_function("contains_hit", |b| {
        let filter = populated(100_000);
        let mut i = 0u64;
        b.iter(|| {
            let result = filter.contains(&(i % 100_000));
            i = i.wrapping_add(1);
            black_box(result)
        });
    });

    group.bench_function("contains_miss", |b| {
        let filter = populated(100_000);
        let mut i = 1_000_000u64;
        b.iter(|| {
            let result = filter.contains(&i);
            i = i.wrapping_add(1);
            black_box(result)
        });
    });

    group.bench_function("merge", |b| {
        let left = populated(100_000);
        let right = BloomFilterBuilder::with_accuracy(100_000, 0.01)
            .build_with(100_000..200_000_u64)
            .unwrap();
        b.iter(|| black_box(left.merge(black_box(&right)).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_bloom);
criterion_main!(benches);
