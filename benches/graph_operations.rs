use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cortex_graph::graph::store::GraphStore;
use cortex_graph::hash_table::HashTable;
use cortex_graph::kmer::BinaryKmer;
use cortex_graph::paths::PathStore;

const K: usize = 31;

fn sample_kmers(n: usize) -> Vec<BinaryKmer> {
    (0..n)
        .map(|i| {
            let bases = [b'A', b'C', b'G', b'T'];
            let s: String = (0..K).map(|j| bases[(i + j) % 4] as char).collect();
            BinaryKmer::encode(&s, K).unwrap().canonical(K)
        })
        .collect()
}

fn bench_hash_table_insert(c: &mut Criterion) {
    let kmers = sample_kmers(4096);
    c.bench_function("hash_table_find_or_insert", |b| {
        b.iter(|| {
            let table = HashTable::new(K, 1024, 8);
            for bk in &kmers {
                black_box(table.find_or_insert(bk).unwrap());
            }
        });
    });
}

fn bench_hash_table_find(c: &mut Criterion) {
    let kmers = sample_kmers(4096);
    let table = HashTable::new(K, 1024, 8);
    for bk in &kmers {
        table.find_or_insert(bk).unwrap();
    }
    c.bench_function("hash_table_find", |b| {
        b.iter(|| {
            for bk in &kmers {
                black_box(table.find(bk));
            }
        });
    });
}

fn bench_graph_store_add_covg(c: &mut Criterion) {
    let table = HashTable::new(K, 1024, 8);
    let store = GraphStore::new(K, 1, 1, table.capacity());
    let kmers = sample_kmers(4096);
    let slots: Vec<_> = kmers
        .iter()
        .map(|bk| match table.find_or_insert(bk).unwrap() {
            cortex_graph::hash_table::InsertResult::Inserted(s) => s,
            cortex_graph::hash_table::InsertResult::Found(s) => s,
        })
        .collect();
    c.bench_function("graph_store_add_covg", |b| {
        b.iter(|| {
            for &slot in &slots {
                store.add_covg(slot, 0, black_box(1));
            }
        });
    });
}

fn bench_path_store_add_and_link(c: &mut Criterion) {
    let store = PathStore::new(64 << 20, 4096, 1);
    let seq = [0b0001_1011u8; 8];
    c.bench_function("path_store_add_and_link", |b| {
        b.iter(|| {
            black_box(store.add_and_link(0, 32, &seq, &[0b1]).unwrap());
        });
    });
}

criterion_group!(
    benches,
    bench_hash_table_insert,
    bench_hash_table_find,
    bench_graph_store_add_covg,
    bench_path_store_add_and_link
);
criterion_main!(benches);
