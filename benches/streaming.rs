//! Performance benchmarks for a3s-chat
//!
//! Run with: cargo bench

use a3s_chat::gateway::{ServerEvent, StreamPacing};
use a3s_chat::{
    AgentDefinition, CalculateSquare, ChatEngine, LocalRunnerFactory, Role, SessionStore,
};
use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use std::time::Duration;

fn bench_chunking(c: &mut Criterion) {
    let ascii = "The square of 12 is 144. ".repeat(160);
    let mixed = "新会话 square 🦀 ".repeat(200);

    let mut group = c.benchmark_group("chunking");
    for size in [1, 8, 64] {
        let pacing = StreamPacing::new(size, Duration::ZERO);
        group.bench_function(format!("ascii, {} chars/chunk", size), |b| {
            b.iter(|| pacing.chunks(&ascii).len());
        });
        group.bench_function(format!("mixed, {} chars/chunk", size), |b| {
            b.iter(|| pacing.chunks(&mixed).len());
        });
    }
    group.finish();
}

fn bench_event_serialization(c: &mut Criterion) {
    let token = ServerEvent::token("a");
    c.bench_function("token_stream serialize", |b| {
        b.iter(|| serde_json::to_string(&token).unwrap());
    });
}

fn bench_store_append(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    let mut group = c.benchmark_group("store_append");
    for count in [10, 100, 1000] {
        group.bench_function(format!("{} messages", count), |b| {
            b.to_async(&rt).iter(|| async {
                let store = SessionStore::new();
                let id = store.create("bench").await;
                for i in 0..count {
                    let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
                    store.append_message(&id, role, "hello", None).await;
                }
            });
        });
    }
    group.finish();
}

fn bench_turn(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    let def = AgentDefinition::new("square_agent").with_tool(Arc::new(CalculateSquare));
    let engine = ChatEngine::new(Arc::new(LocalRunnerFactory::new(def, "bench")))
        .with_pacing(StreamPacing::immediate());
    let id = rt.block_on(engine.create_session(None));

    c.bench_function("local turn (tool call, no pacing)", |b| {
        b.to_async(&rt).iter(|| async {
            let mut events: Vec<ServerEvent> = Vec::new();
            engine
                .run_turn(&id, "What is the square of 12?", &mut events)
                .await
                .unwrap();
            events.len()
        });
    });
}

criterion_group!(
    benches,
    bench_chunking,
    bench_event_serialization,
    bench_store_append,
    bench_turn,
);
criterion_main!(benches);
