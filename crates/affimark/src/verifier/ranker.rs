use serde::{Deserialize, Serialize};

use super::bucketizer::BucketKind;
use super::domain::{CategoryStats, ConfidenceLevel, PillarScores};
use super::intent::{weights_for_mode, RankMode, RankWeights};

const MAX_TAGS: usize = 4;

/// Alternative product considered next to the analysed URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankerCandidate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    pub merchant: String,
    pub scores: PillarScores,
    #[serde(default)]
    pub price: Option<f32>,
    #[serde(default)]
    pub aov: Option<f32>,
    #[serde(default)]
    pub cookie_days: Option<u32>,
    /// Fraction of scoring inputs backed by real data, 0-1.
    pub coverage: f32,
    /// Composite risk, 0-1.
    #[serde(default)]
    pub risk: f32,
    #[serde(default)]
    pub refund_rate: Option<f32>,
    #[serde(default)]
    pub trend_score: f32,
    #[serde(default)]
    pub trend_eligible: bool,
    #[serde(default)]
    pub program_confidence: Option<ConfidenceLevel>,
    #[serde(default)]
    pub hard_stop_flags: Vec<String>,
}

impl RankerCandidate {
    fn refund_rate_or_zero(&self) -> f32 {
        self.refund_rate.unwrap_or(0.0)
    }

    fn is_trending(&self) -> bool {
        self.trend_eligible && self.trend_score >= 0.6
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlternativeTag {
    TrustedMerchant,
    StrongDemand,
    HighMargin,
    HighAov,
    LowAov,
    LongCookie,
    ShortCookie,
    ProgramVerified,
    LowProof,
    RefundRisk,
    Trending,
    BudgetPick,
    Premium,
}

impl AlternativeTag {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TrustedMerchant => "trusted_merchant",
            Self::StrongDemand => "strong_demand",
            Self::HighMargin => "high_margin",
            Self::HighAov => "high_aov",
            Self::LowAov => "low_aov",
            Self::LongCookie => "long_cookie",
            Self::ShortCookie => "short_cookie",
            Self::ProgramVerified => "program_verified",
            Self::LowProof => "low_proof",
            Self::RefundRisk => "refund_risk",
            Self::Trending => "trending",
            Self::BudgetPick => "budget_pick",
            Self::Premium => "premium",
        }
    }
}

/// A candidate after scoring; ranking never mutates the input record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedAlternative {
    #[serde(flatten)]
    pub candidate: RankerCandidate,
    pub rank_score: u8,
    pub tags: Vec<AlternativeTag>,
    pub winner_eligible: bool,
    pub bucket_hint: Option<BucketKind>,
    pub price_percentile: Option<f32>,
}

impl RankedAlternative {
    pub fn id(&self) -> &str {
        &self.candidate.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankerOutput {
    pub ranked: Vec<RankedAlternative>,
    /// Id of the first winner-eligible alternative after sorting.
    pub winner: Option<String>,
    pub mode: RankMode,
}

impl RankerOutput {
    pub fn winner(&self) -> Option<&RankedAlternative> {
        let id = self.winner.as_deref()?;
        self.ranked.iter().find(|alternative| alternative.id() == id)
    }
}

fn rank_score(candidate: &RankerCandidate, weights: &RankWeights) -> u8 {
    let scores = &candidate.scores;
    let raw = weights.product_viability * scores.product_viability / 100.0
        + weights.offer_merchant * scores.offer_merchant / 100.0
        + weights.economics * scores.economics / 100.0
        + weights.trend * candidate.trend_score
        + weights.coverage * candidate.coverage
        - weights.risk_penalty * candidate.risk;
    (raw * 100.0).clamp(0.0, 100.0).round() as u8
}

fn winner_eligible(candidate: &RankerCandidate) -> bool {
    candidate.hard_stop_flags.is_empty()
        && candidate.coverage >= 0.3
        && candidate.scores.product_viability >= 30.0
        && candidate.scores.offer_merchant >= 30.0
        && candidate.scores.economics >= 25.0
}

fn tags(candidate: &RankerCandidate, price_percentile: Option<f32>) -> Vec<AlternativeTag> {
    let scores = &candidate.scores;
    let aov_tag = candidate.aov.and_then(|aov| {
        if aov >= 100.0 {
            Some(AlternativeTag::HighAov)
        } else if aov <= 30.0 {
            Some(AlternativeTag::LowAov)
        } else {
            None
        }
    });
    let cookie_tag = candidate.cookie_days.and_then(|days| {
        if days >= 60 {
            Some(AlternativeTag::LongCookie)
        } else if days <= 14 {
            Some(AlternativeTag::ShortCookie)
        } else {
            None
        }
    });
    let price_tag = price_percentile.and_then(|percentile| {
        if percentile <= 0.25 {
            Some(AlternativeTag::BudgetPick)
        } else if percentile >= 0.75 {
            Some(AlternativeTag::Premium)
        } else {
            None
        }
    });

    let checks = [
        (scores.offer_merchant >= 75.0).then_some(AlternativeTag::TrustedMerchant),
        (scores.product_viability >= 75.0).then_some(AlternativeTag::StrongDemand),
        (scores.economics >= 80.0).then_some(AlternativeTag::HighMargin),
        aov_tag,
        cookie_tag,
        (candidate.program_confidence == Some(ConfidenceLevel::High))
            .then_some(AlternativeTag::ProgramVerified),
        (candidate.coverage < 0.4).then_some(AlternativeTag::LowProof),
        (candidate.refund_rate_or_zero() >= 0.10).then_some(AlternativeTag::RefundRisk),
        candidate.is_trending().then_some(AlternativeTag::Trending),
        price_tag,
    ];

    checks.into_iter().flatten().take(MAX_TAGS).collect()
}

fn bucket_hint(candidate: &RankerCandidate, price_percentile: Option<f32>) -> Option<BucketKind> {
    let scores = &candidate.scores;

    if candidate.is_trending() {
        return Some(BucketKind::Trending);
    }
    if scores.offer_merchant >= 70.0 && candidate.risk < 0.3 && scores.product_viability >= 60.0 {
        return Some(BucketKind::Safe);
    }
    let high_value = scores.economics >= 75.0 || candidate.aov.is_some_and(|aov| aov >= 100.0);
    if high_value && candidate.risk < 0.5 {
        return Some(BucketKind::Upside);
    }
    if price_percentile.is_some_and(|percentile| percentile <= 0.35)
        && scores.product_viability >= 50.0
        && candidate.refund_rate_or_zero() < 0.10
    {
        return Some(BucketKind::Budget);
    }
    None
}

fn rank_one(
    candidate: RankerCandidate,
    weights: &RankWeights,
    category_stats: Option<&CategoryStats>,
) -> RankedAlternative {
    let price_percentile = category_stats
        .zip(candidate.price)
        .map(|(stats, price)| stats.price_percentile(price));

    RankedAlternative {
        rank_score: rank_score(&candidate, weights),
        tags: tags(&candidate, price_percentile),
        winner_eligible: winner_eligible(&candidate),
        bucket_hint: bucket_hint(&candidate, price_percentile),
        price_percentile,
        candidate,
    }
}

/// Score, tag and order alternatives for the given mode.
pub fn rank_alternatives(
    candidates: Vec<RankerCandidate>,
    mode: RankMode,
    category_stats: Option<&CategoryStats>,
) -> RankerOutput {
    let weights = weights_for_mode(mode);
    let mut ranked: Vec<RankedAlternative> = candidates
        .into_iter()
        .map(|candidate| rank_one(candidate, &weights, category_stats))
        .collect();

    // Stable: ties keep input order.
    ranked.sort_by(|a, b| b.rank_score.cmp(&a.rank_score));

    let winner = ranked
        .iter()
        .find(|alternative| alternative.winner_eligible)
        .map(|alternative| alternative.id().to_string());

    RankerOutput {
        ranked,
        winner,
        mode,
    }
}
