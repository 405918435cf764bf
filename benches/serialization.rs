use cd_json::{composite, from_str, parse, to_string, to_string_pretty, Codec, Dyn, TypeRegistry};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

#[derive(Debug, Default, Clone)]
struct User {
    id: u32,
    name: String,
    email: String,
    active: bool,
}

composite! {
    User => "bench.User" { id: u32, name: String, email: String, active: bool }
}

#[derive(Debug, Default, Clone)]
struct Product {
    sku: String,
    name: String,
    price: f64,
    quantity: u32,
}

composite! {
    Product => "bench.Product" { sku: String, name: String, price: f64, quantity: u32 }
}

#[derive(Debug, Default)]
struct Catalog {
    owner: Option<Box<User>>,
    products: Vec<Product>,
}

composite! {
    Catalog => "bench.Catalog" { owner: Option<Box<User>>, products: Vec<Product> }
}

#[derive(Debug, Default)]
struct Node {
    weight: f64,
}

composite! {
    Node => "bench.Node" { weight: f64 }
}

#[derive(Debug, Default)]
struct Branch {
    node: Node,
    children: Vec<Dyn<Node>>,
}

composite! {
    Branch => "bench.Branch" extends Node [node] { children: Vec<Dyn<Node>> }
}

fn registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry.register::<User>().unwrap();
    registry.register::<Product>().unwrap();
    registry.register::<Catalog>().unwrap();
    registry.register::<Node>().unwrap();
    registry.register::<Branch>().unwrap();
    registry
}

fn user() -> User {
    User {
        id: 123,
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
        active: true,
    }
}

fn catalog(size: u32) -> Catalog {
    Catalog {
        owner: Some(Box::new(user())),
        products: (0..size)
            .map(|i| Product {
                sku: format!("SKU{}", i),
                name: format!("Product {}", i),
                price: 9.99 + f64::from(i),
                quantity: i,
            })
            .collect(),
    }
}

/// A tree `depth` levels deep with `fanout` children per branch.
fn tree(depth: usize, fanout: usize) -> Dyn<Node> {
    if depth == 0 {
        return Dyn::new(Node { weight: 1.0 }).unwrap();
    }
    Dyn::new(Branch {
        node: Node {
            weight: depth as f64,
        },
        children: (0..fanout).map(|_| tree(depth - 1, fanout)).collect(),
    })
    .unwrap()
}

fn benchmark_serialize_simple(c: &mut Criterion) {
    let user = user();

    c.bench_function("serialize_simple_struct", |b| {
        b.iter(|| to_string(black_box(&user)))
    });
}

fn benchmark_deserialize_simple(c: &mut Criterion) {
    let registry = registry();
    let text = r#"{"cd_json_type":"bench.User","id":123,"name":"Alice","email":"alice@example.com","active":true}"#;

    c.bench_function("deserialize_simple_struct", |b| {
        b.iter(|| from_str::<User>(&registry, black_box(text)))
    });
}

fn benchmark_serialize_collection(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize_collection");

    for size in [10, 50, 100, 500].iter() {
        let catalog = catalog(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| to_string(black_box(&catalog)))
        });
    }
    group.finish();
}

fn benchmark_deserialize_collection(c: &mut Criterion) {
    let registry = registry();
    let mut group = c.benchmark_group("deserialize_collection");

    for size in [10, 50, 100, 500].iter() {
        let text = to_string(&catalog(*size)).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, text| {
            b.iter(|| from_str::<Catalog>(&registry, black_box(text)))
        });
    }
    group.finish();
}

fn benchmark_polymorphic_tree(c: &mut Criterion) {
    let registry = registry();
    let codec = Codec::new(&registry);
    let mut group = c.benchmark_group("polymorphic_tree");

    for depth in [2usize, 4, 6].iter() {
        let root = tree(*depth, 3);
        let text = to_string(root.get()).unwrap();

        group.bench_with_input(BenchmarkId::new("serialize", depth), depth, |b, _| {
            b.iter(|| to_string(black_box(root.get())))
        });
        group.bench_with_input(BenchmarkId::new("deserialize", depth), &text, |b, text| {
            b.iter(|| codec.deserialize_as::<Node>(black_box(text)))
        });
    }
    group.finish();
}

fn benchmark_parse_only(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    let compact = to_string(&catalog(100)).unwrap();
    let pretty = to_string_pretty(&catalog(100)).unwrap();

    group.bench_function("compact", |b| b.iter(|| parse(black_box(&compact))));
    group.bench_function("pretty", |b| b.iter(|| parse(black_box(&pretty))));

    group.finish();
}

fn benchmark_comparison_with_json(c: &mut Criterion) {
    let text = to_string(&catalog(100)).unwrap();

    let mut group = c.benchmark_group("comparison");

    group.bench_function("cd_json_parse", |b| b.iter(|| parse(black_box(&text))));

    group.bench_function("json_parse", |b| {
        b.iter(|| serde_json::from_str::<serde_json::Value>(black_box(&text)))
    });

    group.finish();
}

fn benchmark_roundtrip(c: &mut Criterion) {
    let registry = registry();
    let user = user();

    c.bench_function("roundtrip_simple", |b| {
        b.iter(|| {
            let serialized = to_string(black_box(&user)).unwrap();
            let _deserialized: User = from_str(&registry, black_box(&serialized)).unwrap();
        })
    });
}

criterion_group!(
    benches,
    benchmark_serialize_simple,
    benchmark_deserialize_simple,
    benchmark_serialize_collection,
    benchmark_deserialize_collection,
    benchmark_polymorphic_tree,
    benchmark_parse_only,
    benchmark_comparison_with_json,
    benchmark_roundtrip
);
criterion_main!(benches);
