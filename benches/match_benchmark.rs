use criterion::{criterion_group, criterion_main, Criterion};

use grpr::MatcherBuilder;

/// A deterministic pseudo-text corpus of about 2 MiB, word-shaped and
/// line-broken so the scanners have realistic work to do.
fn corpus() -> Vec<u8> {
    let mut out = Vec::with_capacity(2 << 20);
    let mut state = 0x2545f4914f6cdd1du64;
    let mut step = || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 57) as u8
    };
    while out.len() < 2 << 20 {
        for _ in 0..12 {
            let len = 2 + (step() as usize) % 10;
            for _ in 0..len {
                out.push(b'a' + step() % 26);
            }
            out.push(b' ');
        }
        out.push(b'\n');
    }
    out
}

fn match_benchmark(c: &mut Criterion) {
    let corpus = corpus();

    let mut matcher = MatcherBuilder::new()
        .pattern("q[a-z]*j")
        .build()
        .unwrap();
    c.bench_function("grpr_count", |b| {
        b.iter(|| matcher.count(&corpus[..]).unwrap());
    });

    let regex = regex::bytes::Regex::new("q[a-z]*j").unwrap();
    c.bench_function("regex_count", |b| {
        b.iter(|| {
            corpus
                .split(|&b| b == b'\n')
                .filter(|line| regex.is_match(line))
                .count()
        });
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(50);
    targets = match_benchmark
}

criterion_main!(benches);
