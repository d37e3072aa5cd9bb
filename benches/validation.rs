use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use xmlschema_datatypes::{
    get_builtin_type, DeclaredFacets, DerivationMethod, EmptyContext, FacetMask, SimpleTypeDecl,
};

fn restricted(base: &str, facets: &DeclaredFacets) -> SimpleTypeDecl {
    let mut decl = SimpleTypeDecl::restriction(
        get_builtin_type(base).expect("built-in type"),
        Some("Bench"),
        None,
        DerivationMethod::empty(),
        vec![],
    );
    decl.apply_facets(facets, facets.present(), FacetMask::empty(), &mut EmptyContext)
        .expect("valid facets");
    decl
}

fn bench_builtins(c: &mut Criterion) {
    let mut group = c.benchmark_group("builtins");
    for (name, value) in [
        ("string", "some text"),
        ("decimal", "12345.6789"),
        ("int", "-2147483648"),
        ("double", "6.02214076E23"),
        ("dateTime", "2024-02-29T12:34:56.789+05:30"),
        ("duration", "P1Y2M3DT4H5M6.7S"),
        ("NCName", "element-name"),
        ("base64Binary", "SGVsbG8sIHdvcmxkIQ=="),
    ] {
        let decl = get_builtin_type(name).expect("built-in type");
        group.bench_function(name, |b| {
            b.iter(|| decl.validate(black_box(value), &mut EmptyContext))
        });
    }
    group.finish();
}

fn bench_facets(c: &mut Criterion) {
    let mut group = c.benchmark_group("facets");

    let range = restricted(
        "integer",
        &DeclaredFacets::new()
            .with_min_exclusive("0")
            .with_max_inclusive("32767"),
    );
    group.bench_function("range", |b| {
        b.iter(|| range.validate(black_box("1024"), &mut EmptyContext))
    });

    let pattern = restricted(
        "string",
        &DeclaredFacets::new().with_pattern("[A-Z]{3}-\\d{4}"),
    );
    group.bench_function("pattern", |b| {
        b.iter(|| pattern.validate(black_box("ABC-1234"), &mut EmptyContext))
    });

    let mut enumeration = DeclaredFacets::new();
    for i in 0..50 {
        enumeration = enumeration.with_enumeration(format!("value{}", i));
    }
    let enumeration = restricted("token", &enumeration);
    group.bench_function("enumeration", |b| {
        b.iter(|| enumeration.validate(black_box("value49"), &mut EmptyContext))
    });

    group.bench_function("restriction", |b| {
        let facets = DeclaredFacets::new()
            .with_min_length(1)
            .with_max_length(64)
            .with_pattern("[a-z]+");
        b.iter(|| restricted("string", black_box(&facets)))
    });

    group.finish();
}

fn bench_compound(c: &mut Criterion) {
    let mut group = c.benchmark_group("compound");

    let list = SimpleTypeDecl::list(
        None,
        None,
        DerivationMethod::empty(),
        get_builtin_type("int").expect("built-in type"),
        vec![],
    )
    .expect("list type");
    let values: Vec<String> = (0..100).map(|i| i.to_string()).collect();
    let values = values.join(" ");
    group.bench_function("list_100", |b| {
        b.iter(|| list.validate(black_box(&values), &mut EmptyContext))
    });

    let members: Vec<Arc<SimpleTypeDecl>> = ["boolean", "date", "decimal", "string"]
        .iter()
        .map(|name| get_builtin_type(name).expect("built-in type"))
        .collect();
    let union = SimpleTypeDecl::union(None, None, DerivationMethod::empty(), members, vec![])
        .expect("union type");
    group.bench_function("union_last_member", |b| {
        b.iter(|| union.validate(black_box("not a number"), &mut EmptyContext))
    });

    group.finish();
}

criterion_group!(builtins, bench_builtins);

criterion_group!(facets, bench_facets);

criterion_group!(compound, bench_compound);

criterion_main!(builtins, facets, compound);
