use criterion::{criterion_group, criterion_main, Criterion};
use spliceloc::location::{union, Location, Strand};
use spliceloc::mapper::{convert_location, get_convert_to_local_segments};

/// Synthetic exon structure with `count` exons of length `exon_len` spaced by `step`.
fn exons(count: i64, offset: i64, exon_len: i64, step: i64) -> Location {
    let ranges = (0..count)
        .map(|i| (offset + i * step, offset + i * step + exon_len))
        .collect::<Vec<_>>();
    Location::from_ranges(&ranges, Some(Strand::Forward))
}

fn criterion_benchmark(c: &mut Criterion) {
    let a = exons(10_000, 0, 120, 300);
    let b = exons(10_000, 50, 90, 300);

    c.bench_function("union 10k x 10k", |bencher| {
        bencher.iter(|| union(&a, &b).unwrap())
    });

    let segments = get_convert_to_local_segments(&a).unwrap();
    c.bench_function("convert_location 10k", |bencher| {
        bencher.iter(|| convert_location(&b, &segments).unwrap())
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
