//! Request binding benchmarks.
//!
//! Run with: `cargo bench -p heron-binding`

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use heron_binding::{resolve, BindingOptions, HandlerSignature, ParamDefault, RouteBinding};
use heron_core::fixtures::{meta_model, user_model};
use heron_core::{ParamSource, TypeDesc};
use heron_extract::RequestContext;
use http::{Method, Uri};

fn route() -> RouteBinding {
    let signature = HandlerSignature::new("update_user")
        .param("id", TypeDesc::Integer, ParamDefault::Missing)
        .param("verbose", TypeDesc::Boolean, ParamSource::query(false))
        .param("user", TypeDesc::model(user_model()), ParamSource::body_required())
        .param("meta", TypeDesc::model(meta_model()), ParamSource::body_required());
    let resolved = resolve(&signature, "/users/<int:id>", &[]).expect("resolves");
    // keep the path value on POST
    let options = BindingOptions {
        preserve_sources_on_body_methods: true,
        ..BindingOptions::default()
    };
    RouteBinding::new(resolved, options).expect("binds")
}

fn bench_bind_get(c: &mut Criterion) {
    let binding = route();
    let ctx = RequestContext::builder()
        .uri(Uri::from_static("/users/42?verbose=true"))
        .path_param("id", "42")
        .build();

    c.bench_function("bind_get", |b| {
        b.iter(|| black_box(binding.bind(black_box(&ctx))));
    });
}

fn bench_bind_post(c: &mut Criterion) {
    let binding = route();
    let body = br#"{"user": {"name": "alice", "age": 30}, "meta": {"trace": "abc", "priority": 2, "tags": ["red", "blue"]}}"#;
    let ctx = RequestContext::builder()
        .method(Method::POST)
        .uri(Uri::from_static("/users/42"))
        .path_param("id", "42")
        .header("content-type", "application/json")
        .body(Bytes::from_static(body))
        .build();

    c.bench_function("bind_post_two_bodies", |b| {
        b.iter(|| black_box(binding.bind(black_box(&ctx))));
    });
}

criterion_group!(benches, bench_bind_get, bench_bind_post);
criterion_main!(benches);
