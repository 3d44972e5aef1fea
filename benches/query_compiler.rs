use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use shapehouse::query::{compile, parse_criteria, QueryParams};

/// Parse and compile criteria of growing size
fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");

    for terms in [1usize, 8, 32].iter() {
        let where_clause = (0..*terms)
            .map(|i| format!("ex:p{}>={}", i, i))
            .collect::<Vec<_>>()
            .join(" and ");
        let select = (0..*terms)
            .map(|i| format!("ex:s{}{{ex:name}}", i))
            .collect::<Vec<_>>()
            .join(",");
        let params = QueryParams {
            prefix: Some("ex=<http://example.org/>".to_string()),
            select: Some(select),
            where_clause: Some(where_clause),
            order_by: Some("-ex:p0".to_string()),
        };
        let graphs = vec!["urn:people".to_string(), "urn:projects".to_string()];

        group.bench_with_input(BenchmarkId::from_parameter(terms), &params, |b, params| {
            b.iter(|| {
                let criteria = parse_criteria(black_box(params)).unwrap();
                compile(&criteria, "http://localhost:8080/oslc/acme/query", &graphs).unwrap()
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_compile);
criterion_main!(benches);
