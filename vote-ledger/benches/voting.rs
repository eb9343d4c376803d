use criterion::{Criterion, black_box, criterion_group, criterion_main};
use serde_json::json;
use std::sync::Arc;
use tokio::runtime::Runtime;
use vote_ledger::{Dependencies, Settings};
use vote_ledger_core::VoteLedger;
use vote_ledger_repository::{InMemoryVoteRepository, VoteRepository};
use vote_ledger_shared::types::{ItemDocument, ItemRef, VoteDirection, VoterId};

fn make_item(i: usize) -> ItemRef {
    ItemRef::new("campgrounds/acadia/reviews", format!("review-{i}"))
}

/// Builds a ledger over an in-memory repository seeded with `items` items.
async fn make_ledger(items: usize) -> Arc<VoteLedger> {
    let repository = Arc::new(InMemoryVoteRepository::new());
    for i in 0..items {
        repository
            .put_item(
                &make_item(i),
                &ItemDocument::from_value(json!({"upvotes": 0, "downvotes": 0})),
            )
            .await
            .unwrap();
    }
    Dependencies::with_repository(repository, &Settings::default()).ledger
}

/// Benchmark a single voter toggling an upvote on one item
fn single_vote(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let ledger = rt.block_on(make_ledger(1));
    let voter = VoterId::new("camper-0");

    c.bench_function("vote_toggle_single_item", |b| {
        b.to_async(&rt).iter(|| async {
            ledger
                .vote(black_box(&make_item(0)), Some(&voter), VoteDirection::Up)
                .await
                .unwrap()
        })
    });
}

/// Benchmark many voters hitting the same item concurrently
fn contended_votes(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("contended_votes");

    for voters in [10usize, 100] {
        group.bench_function(format!("{voters}_voters_one_item"), |b| {
            b.to_async(&rt).iter(|| async move {
                let ledger = make_ledger(1).await;
                let tasks: Vec<_> = (0..voters)
                    .map(|i| {
                        let ledger = ledger.clone();
                        tokio::spawn(async move {
                            let voter = VoterId::new(format!("camper-{i}"));
                            let direction = if i % 3 == 0 {
                                VoteDirection::Down
                            } else {
                                VoteDirection::Up
                            };
                            ledger.vote(&make_item(0), Some(&voter), direction).await.unwrap();
                        })
                    })
                    .collect();
                for task in tasks {
                    task.await.unwrap();
                }
            })
        });
    }

    group.finish();
}

/// Benchmark batch lookups of a voter's votes
fn batch_lookup(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let ledger = rt.block_on(make_ledger(50));
    let voter = VoterId::new("camper-0");
    let items: Vec<ItemRef> = (0..50).map(make_item).collect();
    rt.block_on(async {
        for item in items.iter().step_by(2) {
            ledger.vote(item, Some(&voter), VoteDirection::Up).await.unwrap();
        }
    });

    c.bench_function("get_user_votes_50_items", |b| {
        b.to_async(&rt).iter(|| async {
            ledger
                .get_user_votes(black_box(&items), Some(&voter))
                .await
                .unwrap()
        })
    });
}

criterion_group!(benches, single_vote, contended_votes, batch_lookup);
criterion_main!(benches);
