use super::common::*;
use crate::verifier::intent::{weights_for_mode, RankMode};
use crate::verifier::ranker::{rank_alternatives, AlternativeTag, RankedAlternative};

const MODES: [RankMode; 4] = [
    RankMode::Balanced,
    RankMode::DemandFirst,
    RankMode::TrustFirst,
    RankMode::EconomicsFirst,
];

#[test]
fn demand_first_weight_is_contractual() {
    assert_eq!(weights_for_mode(RankMode::DemandFirst).product_viability, 0.55);
}

#[test]
fn hard_stopped_candidate_never_wins_in_any_mode() {
    for mode in MODES {
        let output = rank_alternatives(ten_candidates(), mode, Some(&category_stats()));

        assert_eq!(output.ranked[0].id(), "alt-01", "{mode:?}");
        assert!(!output.ranked[0].winner_eligible);
        assert_eq!(output.winner.as_deref(), Some("alt-00"), "{mode:?}");
    }
}

#[test]
fn mode_changes_ordering() {
    let demand_heavy = candidate("demand", 95.0, 40.0, 40.0);
    let trust_heavy = candidate("trust", 40.0, 95.0, 40.0);

    let demand = rank_alternatives(
        vec![trust_heavy.clone(), demand_heavy.clone()],
        RankMode::DemandFirst,
        None,
    );
    assert_eq!(demand.ranked[0].id(), "demand");

    let trust = rank_alternatives(vec![demand_heavy, trust_heavy], RankMode::TrustFirst, None);
    assert_eq!(trust.ranked[0].id(), "trust");
    assert_eq!(trust.mode, RankMode::TrustFirst);
}

#[test]
fn rank_scores_are_bounded_and_sorted() {
    let mut extreme = candidate("extreme", 100.0, 100.0, 100.0);
    extreme.trend_score = 5.0;
    extreme.coverage = 5.0;
    extreme.risk = 0.0;
    let mut negative = candidate("negative", 0.0, 0.0, 0.0);
    negative.risk = 10.0;

    for mode in MODES {
        let output = rank_alternatives(
            vec![negative.clone(), extreme.clone()],
            mode,
            None,
        );
        assert_eq!(output.ranked[0].rank_score, 100);
        assert_eq!(output.ranked[1].rank_score, 0);
        assert!(output
            .ranked
            .windows(2)
            .all(|pair| pair[0].rank_score >= pair[1].rank_score));
    }
}

#[test]
fn ranking_does_not_alter_candidate_records() {
    let candidates = ten_candidates();
    let output = rank_alternatives(candidates.clone(), RankMode::Balanced, None);

    for alternative in &output.ranked {
        let original = candidates
            .iter()
            .find(|candidate| candidate.id == alternative.id())
            .expect("candidate present");
        assert_eq!(&alternative.candidate, original);
    }
}

#[test]
fn tags_never_exceed_four() {
    let output = rank_alternatives(ten_candidates(), RankMode::Balanced, Some(&category_stats()));
    assert!(output
        .ranked
        .iter()
        .all(|alternative: &RankedAlternative| alternative.tags.len() <= 4));

    let cheapest = output
        .ranked
        .iter()
        .find(|alternative| alternative.id() == "alt-00")
        .expect("alt-00 ranked");
    assert!(cheapest.tags.contains(&AlternativeTag::TrustedMerchant));
}
