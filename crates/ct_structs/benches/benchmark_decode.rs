// Copyright (c) 2025 Cloudflare, Inc.
// Licensed under the BSD-3-Clause license found in the LICENSE file or at https://opensource.org/licenses/BSD-3-Clause

use criterion::{criterion_group, criterion_main, Criterion};
use ct_structs::{LogEntry, MerkleTreeLeaf, SignedTreeHead};
use std::hint::black_box;

fn benchmark_decode(c: &mut Criterion) {
    let leaf_input = include_bytes!("../tests/leaf_input");
    let leaf_input_precert = include_bytes!("../tests/leaf_input_precert");
    let get_entries = include_str!("../tests/get_entries");
    let sth = include_str!("../tests/json_sth");
    let log = ct_structs::LogDescriptor::from_json(include_str!("../tests/log.json")).unwrap();

    c.bench_function("MerkleTreeLeaf x509", |b| {
        b.iter(|| MerkleTreeLeaf::from_bytes(black_box(leaf_input)).unwrap());
    });

    c.bench_function("MerkleTreeLeaf precert", |b| {
        b.iter(|| MerkleTreeLeaf::from_bytes(black_box(leaf_input_precert)).unwrap());
    });

    c.bench_function("get-entries", |b| {
        b.iter(|| {
            let entries = LogEntry::from_get_entries_json(black_box(get_entries)).unwrap();
            assert_eq!(entries.len(), 2);
        });
    });

    c.bench_function("get-sth verify", |b| {
        b.iter(|| {
            let sth = SignedTreeHead::from_json(black_box(sth)).unwrap();
            assert!(log.verify_tree_head(&sth).unwrap());
        });
    });
}

criterion_group!(benches, benchmark_decode);
criterion_main!(benches);
