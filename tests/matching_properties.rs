//! Property tests for the quadratic matching engine.
//!
//! Vote batches are generated from a seeded ChaCha RNG, so every run sees
//! the same batches. Each property is checked over many seeds.
//!
//! ```bash
//! cargo test --test matching_properties -- --nocapture
//! ```

use qf_match::engine::score_votes;
use qf_match::types::amount::{approx_eq, EPSILON};
use qf_match::{compute_matches, Denominated, QfError, RateTable, Round, Vote};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;

// ============================================================================
// TEST CONSTANTS
// ============================================================================

/// Seeds checked per property
const SEEDS: u64 = 64;

/// Tolerance for comparing shares across batches
const SHARE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 9);

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Rates for eth (denomination), dai and ftm over epochs 0..4.
fn rates() -> Denominated<RateTable> {
    let mut table = RateTable::new();
    let dai = ["0.00083", "0.00077", "0.00091", "0.00125"];
    let ftm = ["0.019", "0.021", "0.009", "0.044"];
    for epoch in 0..4u64 {
        table
            .insert("dai", epoch, dai[epoch as usize].parse().unwrap())
            .unwrap();
        table
            .insert("ftm", epoch, ftm[epoch as usize].parse().unwrap())
            .unwrap();
    }
    Denominated::new("eth", table)
}

/// Generate a deterministic batch over `project_count` projects.
///
/// Amounts are 0.01..=500.00 with two decimal places.
fn generate_votes(count: usize, project_count: usize, seed: u64) -> Vec<Vote> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let tokens = ["eth", "dai", "ftm"];

    (0..count)
        .map(|i| {
            let project = rng.gen_range(0..project_count);
            let cents: i64 = rng.gen_range(1..=50_000);
            Vote::new(
                rng.gen_range(0..4),
                project.to_string(),
                format!("voter-{}", rng.gen_range(0..200)),
                Decimal::new(cents, 2),
                tokens[i % tokens.len()],
            )
        })
        .collect()
}

fn matches_of(round: &Round) -> Vec<Decimal> {
    round.projects.iter().map(|p| p.match_amount).collect()
}

// ============================================================================
// PROPERTIES
// ============================================================================

/// Σ match == matching pool whenever something was donated.
#[test]
fn matches_sum_to_pool() {
    let pool = Decimal::from(10_000);
    for seed in 0..SEEDS {
        let round = Round::new(pool, "eth", 8).unwrap();
        let votes = generate_votes(200, 8, seed);

        let outcome = compute_matches(&round, &votes, &rates()).unwrap();

        assert!(outcome.receipt.distributed());
        let total = outcome.round.total_match().unwrap();
        assert!(
            approx_eq(total, pool, EPSILON),
            "seed {seed}: total match {total} != pool {pool}"
        );
        for project in &outcome.round.projects {
            assert!(!project.match_amount.is_sign_negative());
            assert!(!project.donated.is_sign_negative());
        }
    }
}

/// One project with every vote gets the entire pool.
#[test]
fn single_project_takes_everything() {
    let pool = Decimal::new(12345, 2);
    for seed in 0..SEEDS {
        let round = Round::new(pool, "eth", 5).unwrap();
        let target = (seed % 5).to_string();
        let votes: Vec<Vote> = generate_votes(50, 1, seed)
            .into_iter()
            .map(|mut v| {
                v.project_ref = target.clone();
                v
            })
            .collect();

        let outcome = compute_matches(&round, &votes, &rates()).unwrap();

        let winner = outcome.round.project(&target).unwrap();
        assert!(approx_eq(winner.match_amount, pool, EPSILON), "seed {seed}");
        assert_eq!(outcome.receipt.projects_updated, 1);
    }
}

/// Doubling every amount leaves the match shares unchanged.
#[test]
fn doubling_amounts_preserves_shares() {
    let pool = Decimal::from(1_000);
    for seed in 0..SEEDS {
        let round = Round::new(pool, "eth", 6).unwrap();
        let votes = generate_votes(120, 6, seed);
        let doubled: Vec<Vote> = votes
            .iter()
            .cloned()
            .map(|mut v| {
                v.amount *= Decimal::TWO;
                v
            })
            .collect();

        let base = compute_matches(&round, &votes, &rates()).unwrap();
        let scaled = compute_matches(&round, &doubled, &rates()).unwrap();

        for (a, b) in matches_of(&base.round).iter().zip(matches_of(&scaled.round)) {
            assert!(approx_eq(*a, b, SHARE_TOLERANCE), "seed {seed}: {a} vs {b}");
        }
        for (a, b) in base.round.projects.iter().zip(&scaled.round.projects) {
            assert_eq!(a.donated * Decimal::TWO, b.donated, "seed {seed}");
        }
    }
}

/// Many small donations outscore one large donation of equal total.
#[test]
fn broad_support_outscores_single_whale() {
    let identity = |_: &str, _: u64| -> qf_match::Result<Decimal> { Ok(Decimal::ONE) };

    let broad: Vec<Vote> = (0..100)
        .map(|i| Vote::new(0, "0", format!("small-{i}"), Decimal::ONE, "eth"))
        .collect();
    let whale = vec![Vote::new(0, "1", "whale", Decimal::from(100), "eth")];

    let a = score_votes(&broad, &identity).unwrap();
    let b = score_votes(&whale, &identity).unwrap();

    assert_eq!(a.donated, b.donated);
    assert!(approx_eq(a.raw_match, Decimal::from(10_000), EPSILON));
    assert!(approx_eq(b.raw_match, Decimal::from(100), EPSILON));
    assert!(a.raw_match > b.raw_match);

    let round = Round::new(Decimal::from(101), "eth", 2).unwrap();
    let all: Vec<Vote> = broad.into_iter().chain(whale).collect();
    let outcome = compute_matches(&round, &all, &identity).unwrap();

    // 10000 : 100 of a 101 pool
    let projects = &outcome.round.projects;
    assert!(approx_eq(projects[0].match_amount, Decimal::from(100), EPSILON));
    assert!(approx_eq(projects[1].match_amount, Decimal::ONE, EPSILON));
}

/// Votes for unknown projects change nothing.
#[test]
fn unknown_project_votes_are_ignored() {
    for seed in 0..SEEDS {
        let round = Round::new(Decimal::from(500), "eth", 4).unwrap();
        let votes = generate_votes(80, 4, seed);
        let mut noisy = votes.clone();
        noisy.extend(generate_votes(20, 4, seed + 1_000).into_iter().map(|mut v| {
            v.project_ref = format!("ghost-{}", v.project_ref);
            v
        }));

        let clean = compute_matches(&round, &votes, &rates()).unwrap();
        let with_noise = compute_matches(&round, &noisy, &rates()).unwrap();

        assert_eq!(clean.round, with_noise.round, "seed {seed}");
        assert_eq!(with_noise.receipt.votes_ignored, 20);
        assert_eq!(clean.receipt.state_root, with_noise.receipt.state_root);
    }
}

/// Same inputs, same state root; different inputs, different root.
#[test]
fn state_root_is_deterministic() {
    let round = Round::new(Decimal::from(100), "eth", 10).unwrap();

    let first = compute_matches(&round, &generate_votes(500, 10, 7), &rates()).unwrap();
    let second = compute_matches(&round, &generate_votes(500, 10, 7), &rates()).unwrap();
    let other = compute_matches(&round, &generate_votes(500, 10, 8), &rates()).unwrap();

    assert_eq!(first.receipt.state_root, second.receipt.state_root);
    assert_ne!(first.receipt.state_root, other.receipt.state_root);
}

/// A rate miss anywhere in the batch fails the whole batch.
#[test]
fn missing_rate_fails_atomically() {
    let mut round = Round::new(Decimal::from(100), "eth", 3).unwrap();
    round.vote(&generate_votes(30, 3, 1), &rates()).unwrap();
    let before = round.clone();

    let mut votes = generate_votes(30, 3, 2);
    votes.push(Vote::new(9, "1", "late", Decimal::ONE, "dai"));

    let err = round.vote(&votes, &rates()).unwrap_err();

    assert!(matches!(err, QfError::UnknownRate { ref token, epoch: 9 } if token == "dai"));
    assert_eq!(round, before);
}

/// The worked two-project example.
#[test]
fn two_project_reference_scenario() {
    let mut round = Round::new(Decimal::from(100), "eth", 2).unwrap();
    let votes = vec![
        Vote::new(0, "0", "a", Decimal::from(4), "eth"),
        Vote::new(0, "0", "b", Decimal::from(4), "eth"),
        Vote::new(0, "1", "c", Decimal::from(16), "eth"),
    ];

    let receipt = round.vote(&votes, &rates()).unwrap();

    assert_eq!(round.projects[0].donated, Decimal::from(8));
    assert_eq!(round.projects[1].donated, Decimal::from(16));
    assert!(approx_eq(round.projects[0].match_amount, Decimal::from(50), EPSILON));
    assert!(approx_eq(round.projects[1].match_amount, Decimal::from(50), EPSILON));
    assert!(approx_eq(receipt.total_raw_match, Decimal::from(32), EPSILON));
}

/// Empty batch on a fresh round: no distribution, no fault.
#[test]
fn empty_batch_distributes_nothing() {
    let mut round = Round::new(Decimal::from(100), "eth", 4).unwrap();

    let receipt = round.vote(&[], &rates()).unwrap();

    assert!(!receipt.distributed());
    assert_eq!(round.total_match().unwrap(), Decimal::ZERO);
    assert_eq!(round.total_donated().unwrap(), Decimal::ZERO);
}
