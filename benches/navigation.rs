//! Navigation benchmark suite.
//!
//! Benchmarks the hot paths of the shell:
//! - Metadata projection at different record counts
//! - Bridge round trips over the in-process pipe
//! - Full navigations through a headless host (zero-length slides)
//!
//! Run with: cargo bench --bench navigation
//! Results saved to: target/criterion/

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use serde_json::{Value, json};
use tokio::runtime::Runtime;

use frame_shell::protocol::Command;
use frame_shell::{
    Browser, BridgeService, EmbeddedContext, FrameHost, HeadlessSurface, MetaRecord, Result,
    pipe, project,
};

// ============================================================================
// Benchmark Parameters
// ============================================================================

const RECORD_COUNTS: &[usize] = &[10, 100, 1000];
const NAVIGATION_COUNTS: &[usize] = &[10, 50];

// ============================================================================
// Headless Host
// ============================================================================

/// Spawns frames whose content answers every call with empty results.
struct BlankHost;

#[async_trait]
impl FrameHost for BlankHost {
    async fn spawn(&self, _url: &str) -> Result<EmbeddedContext> {
        let (connection, service) = pipe();
        tokio::spawn(serve_blank(service));
        Ok(EmbeddedContext {
            surface: Arc::new(HeadlessSurface::new()),
            connection,
        })
    }
}

async fn serve_blank(mut service: BridgeService) {
    while let Some(request) = service.next_request().await {
        let result = match request.command {
            Command::GetMetaData | Command::QuerySelectorAll(_) => json!([]),
            _ => Value::Null,
        };
        service.respond(request.id, Ok(result));
    }
}

// ============================================================================
// Benchmark: Metadata Projection
// ============================================================================

fn records(count: usize) -> Vec<MetaRecord> {
    (0..count)
        .map(|i| {
            MetaRecord::new(
                format!("ns{}:group{}:key{i}", i % 4, i % 16),
                format!("value{i}"),
            )
        })
        .collect()
}

fn bench_projection(c: &mut Criterion) {
    let mut group = c.benchmark_group("projection");

    for &count in RECORD_COUNTS {
        let input = records(count);
        group.bench_with_input(BenchmarkId::new("project", count), &input, |b, input| {
            b.iter(|| project(input.iter().cloned()));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Bridge Round Trip
// ============================================================================

fn bench_round_trip(c: &mut Criterion) {
    let rt = Runtime::new().expect("runtime");
    let connection = rt.block_on(async {
        let (connection, service) = pipe();
        tokio::spawn(serve_blank(service));
        connection
    });

    c.bench_function("bridge_round_trip", |b| {
        b.to_async(&rt)
            .iter(|| async { connection.call(Command::GetMetaData).await });
    });
}

// ============================================================================
// Benchmark: Navigation
// ============================================================================

fn bench_navigation(c: &mut Criterion) {
    let rt = Runtime::new().expect("runtime");

    let mut group = c.benchmark_group("navigation");
    group.sample_size(20);

    for &count in NAVIGATION_COUNTS {
        group.bench_with_input(BenchmarkId::new("navigate", count), &count, |b, &count| {
            b.to_async(&rt).iter(|| async move {
                let browser = Browser::builder()
                    .transition_duration(Duration::ZERO)
                    .build(Arc::new(BlankHost))
                    .expect("build");

                for i in 0..count {
                    let _ = browser.navigate(&format!("/page/{}", i % 8)).await;
                }
                browser.close();
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_projection, bench_round_trip, bench_navigation);
criterion_main!(benches);
