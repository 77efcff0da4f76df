use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::intent::BucketStrategy;
use super::ranker::RankedAlternative;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketKind {
    Safe,
    Upside,
    Budget,
    Trending,
}

impl BucketKind {
    /// Fill and output order.
    pub const ALL: [BucketKind; 4] = [
        BucketKind::Safe,
        BucketKind::Upside,
        BucketKind::Budget,
        BucketKind::Trending,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Safe => "Safe bets",
            Self::Upside => "Higher upside",
            Self::Budget => "Budget picks",
            Self::Trending => "Trending now",
        }
    }

    /// Eligibility used to top up a bucket, independent of the ranker's hint.
    fn accepts(self, alternative: &RankedAlternative) -> bool {
        let candidate = &alternative.candidate;
        let scores = &candidate.scores;
        match self {
            Self::Safe => {
                scores.offer_merchant >= 65.0
                    && candidate.risk < 0.4
                    && scores.product_viability >= 50.0
                    && candidate.hard_stop_flags.is_empty()
            }
            Self::Upside => {
                (scores.economics >= 70.0 || candidate.aov.is_some_and(|aov| aov >= 80.0))
                    && candidate.risk < 0.6
            }
            Self::Budget => {
                alternative
                    .price_percentile
                    .is_some_and(|percentile| percentile <= 0.4)
                    && scores.product_viability >= 45.0
            }
            Self::Trending => candidate.trend_eligible && candidate.trend_score >= 0.5,
        }
    }

    fn hint_matches(self, alternative: &RankedAlternative) -> bool {
        if alternative.bucket_hint != Some(self) {
            return false;
        }
        self != Self::Safe || alternative.candidate.hard_stop_flags.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketizerConfig {
    pub items_per_bucket: usize,
    pub bucket_strategy: BucketStrategy,
    pub show_trending: bool,
}

impl Default for BucketizerConfig {
    fn default() -> Self {
        Self {
            items_per_bucket: 3,
            bucket_strategy: BucketStrategy::Balanced,
            show_trending: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket<'a> {
    pub kind: BucketKind,
    pub label: &'static str,
    pub items: Vec<&'a RankedAlternative>,
    pub eligible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketizerOutput<'a> {
    pub winner: Option<&'a RankedAlternative>,
    pub buckets: Vec<Bucket<'a>>,
    pub total_candidates: usize,
    pub overflow: Vec<&'a RankedAlternative>,
}

impl BucketizerOutput<'_> {
    pub fn bucket(&self, kind: BucketKind) -> Option<&Bucket<'_>> {
        self.buckets.iter().find(|bucket| bucket.kind == kind)
    }

    pub fn bucketed_count(&self) -> usize {
        self.buckets.iter().map(|bucket| bucket.items.len()).sum()
    }
}

const CONSERVATIVE_CAP: usize = 2;

/// Group ranked alternatives into display buckets around the winner.
pub fn bucketize<'a>(
    ranked: &'a [RankedAlternative],
    winner: Option<&'a RankedAlternative>,
    config: &BucketizerConfig,
) -> BucketizerOutput<'a> {
    let winner_id = winner.map(RankedAlternative::id);
    let pool: Vec<&'a RankedAlternative> = ranked
        .iter()
        .filter(|alternative| Some(alternative.id()) != winner_id)
        .collect();

    let capacity = config.items_per_bucket;
    let kinds: Vec<BucketKind> = BucketKind::ALL
        .into_iter()
        .filter(|kind| *kind != BucketKind::Trending || config.show_trending)
        .collect();
    let mut filled: Vec<(BucketKind, Vec<&'a RankedAlternative>)> =
        kinds.iter().map(|kind| (*kind, Vec::new())).collect();
    let mut assigned: HashSet<&str> = HashSet::new();

    // Pass 1: ranker hints, in ranked order.
    for &alternative in &pool {
        let Some(slot) = filled
            .iter_mut()
            .find(|(kind, items)| kind.hint_matches(alternative) && items.len() < capacity)
        else {
            continue;
        };
        slot.1.push(alternative);
        assigned.insert(alternative.id());
    }

    // Pass 2: top up from unassigned items that meet each bucket's own bar.
    let mut by_score = pool.clone();
    by_score.sort_by(|a, b| b.rank_score.cmp(&a.rank_score));
    for (kind, items) in filled.iter_mut() {
        for &alternative in &by_score {
            if items.len() >= capacity {
                break;
            }
            if assigned.contains(alternative.id()) || !kind.accepts(alternative) {
                continue;
            }
            items.push(alternative);
            assigned.insert(alternative.id());
        }
    }

    if config.bucket_strategy == BucketStrategy::Conservative {
        for (kind, items) in filled.iter_mut() {
            if matches!(kind, BucketKind::Upside | BucketKind::Budget) {
                items.truncate(CONSERVATIVE_CAP);
            }
        }
    }

    let buckets: Vec<Bucket<'a>> = filled
        .into_iter()
        .filter(|(_, items)| !items.is_empty())
        .map(|(kind, items)| Bucket {
            kind,
            label: kind.label(),
            items,
            eligible: true,
        })
        .collect();

    let placed: HashSet<&str> = buckets
        .iter()
        .flat_map(|bucket| bucket.items.iter().map(|item| item.id()))
        .collect();
    let overflow = pool
        .iter()
        .copied()
        .filter(|alternative| !placed.contains(alternative.id()))
        .collect();

    BucketizerOutput {
        winner,
        buckets,
        total_candidates: ranked.len(),
        overflow,
    }
}
