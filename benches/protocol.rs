//! Benchmarks for the PSI cardinality protocol steps
//!
//! Each step scales linearly in its input: one hash-to-curve and one scalar
//! multiplication per item, plus k Bloom filter probes per lookup.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use psi_cardinality::{PsiClient, PsiServer};

fn inputs(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("Element{}", i)).collect()
}

fn benchmark_server_setup(c: &mut Criterion) {
    let server = PsiServer::new_with_random_key().unwrap();
    let mut group = c.benchmark_group("server_setup");

    for n in [100usize, 1_000, 10_000] {
        let items = inputs(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &items, |b, items| {
            b.iter(|| server.create_setup_for_queries(black_box(items), 0.001, 10_000).unwrap());
        });
    }

    group.finish();
}

fn benchmark_client_create_request(c: &mut Criterion) {
    let mut group = c.benchmark_group("client_create_request");

    for n in [100usize, 1_000] {
        let items = inputs(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &items, |b, items| {
            let mut client = PsiClient::new();
            b.iter(|| client.create_request(black_box(items)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_server_process_request(c: &mut Criterion) {
    let server = PsiServer::new_with_random_key().unwrap();
    let mut group = c.benchmark_group("server_process_request");

    for n in [100usize, 1_000] {
        let request = PsiClient::new().create_request(&inputs(n)).unwrap();
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &request, |b, request| {
            b.iter(|| server.process_request(black_box(request)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_client_process_response(c: &mut Criterion) {
    let server = PsiServer::new_with_random_key().unwrap();
    let mut group = c.benchmark_group("client_process_response");

    for n in [100usize, 1_000] {
        let items = inputs(n);
        let setup = server.create_setup(&items, 1e-6).unwrap();
        group.throughput(Throughput::Elements(n as u64));

        group.bench_function(BenchmarkId::from_parameter(n), |b| {
            // The ephemeral scalar is single-use, so each iteration needs a fresh request
            b.iter_batched(
                || {
                    let mut client = PsiClient::new();
                    let request = client.create_request(&items).unwrap();
                    let response = server.process_request(&request).unwrap();
                    (client, response)
                },
                |(mut client, response)| client.process_response(&setup, &response).unwrap(),
                criterion::BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_server_setup,
    benchmark_client_create_request,
    benchmark_server_process_request,
    benchmark_client_process_response
);
criterion_main!(benches);
