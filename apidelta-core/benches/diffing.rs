//! Benchmark for snapshot diffing.

use apidelta_core::{diff, ApiSnapshot, DeclarationNode, DiffOptions, NodeKind};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// `exports` interfaces with `members` properties each.
fn wide_snapshot(exports: usize, members: usize, member_type: &str) -> ApiSnapshot {
    ApiSnapshot::new(
        (0..exports)
            .map(|i| {
                (0..members).fold(
                    DeclarationNode::new(&format!("Model{}", i), NodeKind::Interface),
                    |node, j| {
                        node.with_child(
                            DeclarationNode::new(&format!("field{}", j), NodeKind::Property)
                                .with_signature(member_type),
                        )
                    },
                )
            })
            .collect(),
    )
}

fn bench_diff_identical(c: &mut Criterion) {
    let tree = wide_snapshot(500, 20, "string");
    let options = DiffOptions::default();

    c.bench_function("diff_identical_500x20", |b| {
        b.iter(|| black_box(diff(&tree, &tree, &options).len()))
    });
}

fn bench_diff_all_members_changed(c: &mut Criterion) {
    let old = wide_snapshot(500, 20, "string");
    let new = wide_snapshot(500, 20, "string | number");
    let options = DiffOptions::default();

    c.bench_function("diff_widened_500x20", |b| {
        b.iter(|| black_box(diff(&old, &new, &options).len()))
    });
}

fn bench_rename_detection(c: &mut Criterion) {
    let old = wide_snapshot(200, 5, "number");
    let renamed = ApiSnapshot::new(
        old.exports
            .iter()
            .map(|e| {
                e.children.iter().fold(
                    DeclarationNode::new(&format!("{}Dto", e.name), NodeKind::Interface),
                    |node, child| node.with_child(child.clone()),
                )
            })
            .collect(),
    );
    let options = DiffOptions::default().with_rename_threshold(0.6);

    c.bench_function("diff_renamed_200", |b| {
        b.iter(|| black_box(diff(&old, &renamed, &options).len()))
    });
}

criterion_group!(
    benches,
    bench_diff_identical,
    bench_diff_all_members_changed,
    bench_rename_detection
);
criterion_main!(benches);
