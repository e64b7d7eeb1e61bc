use criterion::{criterion_group, criterion_main};

mod order_book;
mod rbtree;

use order_book::register_benchmarks as register_order_book_benchmarks;
use rbtree::register_benchmarks as register_rbtree_benchmarks;

criterion_group!(
    benches,
    register_order_book_benchmarks,
    register_rbtree_benchmarks,
);

criterion_main!(benches);
