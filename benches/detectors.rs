use divan::{Bencher, black_box};
use syntaxmine::{Tree, Treebank, detect_all, is_inversion, is_passive, is_preposing};

fn main() {
    divan::main();
}

fn sample_trees() -> Vec<Tree> {
    Treebank::from_file("tests/data/sample.conllu").into_iter().collect()
}

#[divan::bench]
fn preposing(bencher: Bencher) {
    let trees = sample_trees();
    bencher.bench_local(|| trees.iter().filter(|t| is_preposing(black_box(t)).matched).count());
}

#[divan::bench]
fn passive(bencher: Bencher) {
    let trees = sample_trees();
    bencher.bench_local(|| trees.iter().filter(|t| is_passive(black_box(t)).matched).count());
}

#[divan::bench]
fn inversion(bencher: Bencher) {
    let trees = sample_trees();
    bencher.bench_local(|| trees.iter().filter(|t| is_inversion(black_box(t)).matched).count());
}

#[divan::bench]
fn all_detectors(bencher: Bencher) {
    let trees = sample_trees();
    bencher.bench_local(|| {
        for tree in &trees {
            black_box(detect_all(black_box(tree)));
        }
    });
}
