use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use curation_shared::types::{
    Permission, TargetKind, VoteDirection, VoteTransition, VotesCount, parse_permissions,
};
use uuid::Uuid;

const STATES: [Option<VoteDirection>; 3] = [
    None,
    Some(VoteDirection::Upvote),
    Some(VoteDirection::Downvote),
];

/// Benchmark planning and applying a single vote transition
fn single_transition(c: &mut Criterion) {
    let target = Uuid::new_v4();

    c.bench_function("plan_and_apply_transition", |b| {
        b.iter_batched(
            || VotesCount::new(target, TargetKind::Website, 5, 2),
            |mut count| {
                let transition =
                    VoteTransition::plan(black_box(Some(VoteDirection::Upvote)), VoteDirection::Downvote);
                count.apply(transition.delta());
                count.outcome(transition.resulting_vote())
            },
            BatchSize::SmallInput,
        )
    });
}

/// Benchmark replaying a long sequence of casts against one counter
fn replayed_transitions(c: &mut Criterion) {
    let requests: Vec<(Option<VoteDirection>, VoteDirection)> = (0..1000)
        .map(|i| {
            let requested = if i % 3 == 0 {
                VoteDirection::Downvote
            } else {
                VoteDirection::Upvote
            };
            (STATES[i % 3], requested)
        })
        .collect();
    let target = Uuid::new_v4();

    c.bench_function("replay_1000_transitions", |b| {
        b.iter(|| {
            let mut count = VotesCount::new(target, TargetKind::Comment, 0, 0);
            for (existing, requested) in black_box(&requests) {
                count.apply(VoteTransition::plan(*existing, *requested).delta());
            }
            count
        })
    });
}

/// Benchmark validating a role's permission list
fn permission_parsing(c: &mut Criterion) {
    let mut names: Vec<&str> = Permission::ALL.iter().map(|p| p.as_str()).collect();
    names.extend(["WEBSITE_VIEW", "CATEGORY_MANAGE", "USER_BAN"]);

    c.bench_function("parse_full_catalog", |b| {
        b.iter(|| parse_permissions(black_box(&names)))
    });
}

criterion_group!(
    benches,
    single_transition,
    replayed_transitions,
    permission_parsing
);
criterion_main!(benches);
