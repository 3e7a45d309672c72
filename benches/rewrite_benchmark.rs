//! Criterion measurements of the per-statement middleware overhead: scanning and
//! rewriting repeated placeholders at prepare time, and fanning parameters out at
//! execute time. Statement sizes scale with `BENCH_PLACEHOLDERS` (default 64).

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use sql_cipher_middleware::placeholders::{expand_params, rewrite, scan};
use sql_cipher_middleware::{ParameterSet, RowValues};
use std::fmt::Write;
use std::hint::black_box;

fn placeholder_count() -> usize {
    std::env::var("BENCH_PLACEHOLDERS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(64)
}

/// A WHERE clause that reuses `distinct` names round-robin across `sites` sites,
/// with literals and comments mixed in so the scanner has to switch states.
fn build_statement(sites: usize, distinct: usize) -> String {
    let mut sql = String::from("SELECT id, name FROM people /* :ignored */ WHERE 1 = 1");
    for i in 0..sites {
        let _ = write!(sql, " OR (c{i} = :p{} AND note <> ':lit')", i % distinct);
    }
    sql.push_str(" -- :trailing");
    sql
}

fn bench_scan_and_rewrite(c: &mut Criterion) {
    let sites = placeholder_count();
    let mut group = c.benchmark_group("scan_and_rewrite");
    group.throughput(Throughput::Elements(sites as u64));

    for distinct in [sites, sites / 4, 1] {
        let sql = build_statement(sites, distinct.max(1));
        group.bench_with_input(BenchmarkId::from_parameter(distinct), &sql, |b, sql| {
            b.iter(|| {
                let found = scan(black_box(sql));
                black_box(rewrite(sql, &found).expansions.len())
            });
        });
    }
    group.finish();
}

fn bench_expand_params(c: &mut Criterion) {
    let sites = placeholder_count();
    let mut group = c.benchmark_group("expand_params");
    group.throughput(Throughput::Elements(sites as u64));

    for distinct in [sites / 4, 1] {
        let distinct = distinct.max(1);
        let sql = build_statement(sites, distinct);
        let table = rewrite(&sql, &scan(&sql)).expansions;
        let params: ParameterSet = (0..distinct)
            .map(|i| (format!("p{i}"), RowValues::Text(format!("value-{i}"))))
            .collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(distinct),
            &params,
            |b, params| {
                b.iter(|| black_box(expand_params(params.clone(), &table).len()));
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_scan_and_rewrite, bench_expand_params);
criterion_main!(benches);
