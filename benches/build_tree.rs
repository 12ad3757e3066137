//! Benchmarks for import tree construction and pruning
//!
//! Uses synthetic layered package graphs where every package imports a few
//! packages of the next layer, so most packages are shared by several
//! importers.

use std::collections::HashSet;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use imptree::graph::{GraphBuilder, ImportTree};
use imptree::loader::{LoadedPackages, StaticLoader};
use imptree::ui::TreeNode;

/// Create a layered package set with `layers * width` packages below the root
fn create_layered_packages(layers: usize, width: usize, fan_out: usize) -> LoadedPackages {
    let mut pkgs = LoadedPackages::new();
    let root = pkgs.add_unit("app");
    pkgs.mark_top_level(root);

    let mut previous = vec![root];
    for layer in 0..layers {
        let current: Vec<_> = (0..width)
            .map(|i| pkgs.add_unit(format!("app/l{layer}/p{i}")))
            .collect();

        for (i, &from) in previous.iter().enumerate() {
            for k in 0..fan_out {
                pkgs.add_import(from, current[(i + k) % width]);
            }
        }
        previous = current;
    }
    pkgs
}

fn build(pkgs: &LoadedPackages) -> ImportTree {
    GraphBuilder::new(StaticLoader::new(pkgs.clone()))
        .build("app", |_| true)
        .unwrap()
}

/// Benchmark building the tree from a loaded package set
fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_tree");

    for width in [10, 50, 100, 200].iter() {
        let pkgs = create_layered_packages(10, *width, 3);

        group.bench_with_input(BenchmarkId::new("packages", width * 10), &pkgs, |b, pkgs| {
            b.iter(|| black_box(build(pkgs)));
        });
    }

    group.finish();
}

/// Benchmark cascading removal of a package in the first layer
fn bench_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove_recursively");

    for width in [10, 50, 100, 200].iter() {
        let tree = build(&create_layered_packages(10, *width, 3));
        let Some(target) = tree.find("app/l0/p0") else {
            continue;
        };

        group.bench_with_input(BenchmarkId::new("packages", width * 10), &tree, |b, tree| {
            b.iter(|| {
                let mut tree = tree.clone();
                tree.remove_node_recursively(target);
                black_box(tree.node_count())
            });
        });
    }

    group.finish();
}

/// Benchmark flattening the display tree for rendering
fn bench_flatten(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_flatten");

    for width in [10, 50, 100].iter() {
        let tree = build(&create_layered_packages(10, *width, 3));
        let all: HashSet<String> = tree
            .nodes()
            .into_iter()
            .filter_map(|id| tree.identifier(id).map(str::to_string))
            .collect();
        let mut display = TreeNode::from_import_tree(&tree);
        display.restore_expanded(&all);

        group.bench_with_input(BenchmarkId::new("packages", width * 10), &display, |b, d| {
            b.iter(|| black_box(d.flatten()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build, bench_remove, bench_flatten);
criterion_main!(benches);
