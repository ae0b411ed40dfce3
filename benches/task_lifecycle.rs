use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use tokio::runtime::Runtime;

use bounty_verifier::adapters::agreement::{Evaluator, LocalAgreement, VALIDATION_PREAMBLE};
use bounty_verifier::adapters::judgment::{MockJudgmentEngine, MockResponse};
use bounty_verifier::adapters::memory::InMemoryTaskRepository;
use bounty_verifier::adapters::web::StaticEvidenceFetcher;
use bounty_verifier::{Identity, TaskLifecycleService};

const PROOF_URL: &str = "https://example.com/proof";

fn service(evaluators: usize) -> TaskLifecycleService<InMemoryTaskRepository> {
    let evidence = "The change set adds the requested endpoint and its tests. ".repeat(20);
    let fetcher = Arc::new(StaticEvidenceFetcher::new().with_page(PROOF_URL, evidence));
    let engine = Arc::new(
        MockJudgmentEngine::with_default_response(MockResponse::success("VERIFIED: complete"))
            .with_response_containing(VALIDATION_PREAMBLE, MockResponse::success("ACCEPT")),
    );

    let panel = (0..evaluators)
        .map(|_| Evaluator::new(fetcher.clone(), engine.clone()))
        .collect();
    let agreement = LocalAgreement::new(panel).expect("non-empty panel");
    TaskLifecycleService::new(Arc::new(InMemoryTaskRepository::new()), Arc::new(agreement))
}

fn bench_full_lifecycle(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");
    let creator = Identity::new("alice");
    let worker = Identity::new("bob");

    let mut group = c.benchmark_group("full_lifecycle");
    for evaluators in [1usize, 3, 7] {
        let service = service(evaluators);
        group.bench_with_input(BenchmarkId::from_parameter(evaluators), &evaluators, |b, _| {
            b.to_async(&rt).iter(|| async {
                let id = service
                    .create_task(&creator, "Add endpoint", "", "Endpoint and tests exist", 10)
                    .await
                    .unwrap();
                service.claim_task(&worker, id).await.unwrap();
                service.submit_proof(&worker, id, PROOF_URL).await.unwrap();
                service.verify_completion(id).await.unwrap()
            });
        });
    }
    group.finish();
}

fn bench_status_lookup(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");
    let service = service(1);
    let creator = Identity::new("alice");
    rt.block_on(async {
        for i in 0..1000 {
            service
                .create_task(&creator, format!("Task {i}"), "", "Criteria", 1)
                .await
                .unwrap();
        }
    });

    c.bench_function("get_task_status", |b| {
        b.to_async(&rt).iter(|| async { service.get_task_status(500).await.unwrap() });
    });
}

criterion_group!(benches, bench_full_lifecycle, bench_status_lookup);
criterion_main!(benches);
