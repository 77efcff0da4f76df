use serde::{Deserialize, Serialize};

use super::domain::{ConfidenceLevel, Pillar, PillarScores};
use super::verdict::VerdictStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankMode {
    Balanced,
    DemandFirst,
    TrustFirst,
    EconomicsFirst,
}

impl RankMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Balanced => "balanced",
            Self::DemandFirst => "demand_first",
            Self::TrustFirst => "trust_first",
            Self::EconomicsFirst => "economics_first",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketStrategy {
    Conservative,
    #[default]
    Balanced,
    Aggressive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryRoute {
    TestFirst,
    Avoid,
    Improve,
    Approve,
}

/// Why a RED product should be avoided; drives which alternatives to surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvoidCause {
    Merchant,
    Demand,
    Economics,
    Multiple,
}

impl AvoidCause {
    fn rank_mode(self) -> RankMode {
        match self {
            Self::Merchant => RankMode::TrustFirst,
            Self::Demand => RankMode::DemandFirst,
            Self::Economics => RankMode::EconomicsFirst,
            Self::Multiple => RankMode::Balanced,
        }
    }

    fn from_pillar(pillar: Pillar) -> Self {
        match pillar {
            Pillar::ProductViability => Self::Demand,
            Pillar::OfferMerchant => Self::Merchant,
            Pillar::Economics => Self::Economics,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentRouterInput {
    pub verdict: VerdictStatus,
    pub scores: PillarScores,
    pub confidence: ConfidenceLevel,
    pub coverage: f32,
    #[serde(default)]
    pub hard_stop_flags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentRouterOutput {
    pub primary_route: PrimaryRoute,
    pub rank_mode: RankMode,
    pub bucket_strategy: BucketStrategy,
    pub show_trending: bool,
    pub suppress_winner: bool,
    pub banner: Option<String>,
    pub reason: String,
}

/// Pillar weights consumed by the alternatives ranker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankWeights {
    pub product_viability: f32,
    pub offer_merchant: f32,
    pub economics: f32,
    pub trend: f32,
    pub coverage: f32,
    pub risk_penalty: f32,
}

pub fn weights_for_mode(mode: RankMode) -> RankWeights {
    match mode {
        RankMode::Balanced => RankWeights {
            product_viability: 0.30,
            offer_merchant: 0.30,
            economics: 0.25,
            trend: 0.05,
            coverage: 0.10,
            risk_penalty: 0.15,
        },
        RankMode::DemandFirst => RankWeights {
            product_viability: 0.55,
            offer_merchant: 0.20,
            economics: 0.15,
            trend: 0.05,
            coverage: 0.05,
            risk_penalty: 0.10,
        },
        RankMode::TrustFirst => RankWeights {
            product_viability: 0.20,
            offer_merchant: 0.55,
            economics: 0.15,
            trend: 0.0,
            coverage: 0.10,
            risk_penalty: 0.25,
        },
        RankMode::EconomicsFirst => RankWeights {
            product_viability: 0.20,
            offer_merchant: 0.20,
            economics: 0.50,
            trend: 0.05,
            coverage: 0.05,
            risk_penalty: 0.10,
        },
    }
}

/// Weakest pillar; ties resolve in product, merchant, economics order.
pub fn weakest_pillar(scores: &PillarScores) -> (Pillar, f32) {
    scores.weakest()
}

pub fn rank_mode_from_weakest_pillar(scores: &PillarScores) -> RankMode {
    let (pillar, score) = weakest_pillar(scores);
    if score >= 50.0 {
        return RankMode::Balanced;
    }
    match pillar {
        Pillar::ProductViability => RankMode::DemandFirst,
        Pillar::OfferMerchant => RankMode::TrustFirst,
        Pillar::Economics => RankMode::EconomicsFirst,
    }
}

const MERCHANT_FLAG_MARKERS: &[&str] = &["MERCHANT"];
const DEMAND_FLAG_MARKERS: &[&str] = &["DEMAND", "PRODUCT_PAGE", "OUT_OF_STOCK"];
const ECONOMICS_FLAG_MARKERS: &[&str] = &["ECONOMICS", "COMMISSION", "AFFILIATE"];

pub fn avoid_cause(scores: &PillarScores, hard_stop_flags: &[String]) -> AvoidCause {
    let flagged = |markers: &[&str]| {
        hard_stop_flags.iter().any(|flag| {
            let flag = flag.to_ascii_uppercase();
            markers.iter().any(|marker| flag.contains(marker))
        })
    };

    if flagged(MERCHANT_FLAG_MARKERS) {
        return AvoidCause::Merchant;
    }
    if flagged(DEMAND_FLAG_MARKERS) {
        return AvoidCause::Demand;
    }
    if flagged(ECONOMICS_FLAG_MARKERS) {
        return AvoidCause::Economics;
    }

    let (pillar, score) = weakest_pillar(scores);
    if score < 35.0 {
        return AvoidCause::from_pillar(pillar);
    }
    if scores.count_below(50.0) >= 2 {
        return AvoidCause::Multiple;
    }
    AvoidCause::from_pillar(pillar)
}

pub fn show_trending(input: &IntentRouterInput) -> bool {
    input.coverage >= 0.6
        && matches!(input.confidence, ConfidenceLevel::Med | ConfidenceLevel::High)
        && input.verdict != VerdictStatus::Red
}

/// Choose ranking mode and presentation for the alternatives of one verdict.
pub fn route_intent(input: &IntentRouterInput) -> IntentRouterOutput {
    let show_trending = show_trending(input);
    let (weakest, weakest_score) = weakest_pillar(&input.scores);

    if input.verdict == VerdictStatus::TestFirst || input.confidence == ConfidenceLevel::Low {
        let suppress_winner = input.coverage < 0.4;
        return IntentRouterOutput {
            primary_route: PrimaryRoute::TestFirst,
            rank_mode: rank_mode_from_weakest_pillar(&input.scores),
            bucket_strategy: BucketStrategy::Conservative,
            show_trending,
            suppress_winner,
            banner: Some(
                "Not enough evidence yet. Start with a small test before scaling.".to_string(),
            ),
            reason: format!(
                "{} confidence with {:.0}% data coverage",
                input.confidence.label(),
                input.coverage * 100.0
            ),
        };
    }

    match input.verdict {
        VerdictStatus::Red => {
            let cause = avoid_cause(&input.scores, &input.hard_stop_flags);
            let banner = match cause {
                AvoidCause::Merchant => {
                    "This merchant carries serious risk. Safer brands are listed below."
                }
                AvoidCause::Demand => {
                    "Demand for this product looks weak. Proven sellers are listed below."
                }
                AvoidCause::Economics => {
                    "The payout on this offer is poor. Better-paying options are listed below."
                }
                AvoidCause::Multiple => {
                    "Several signals are weak. Balanced alternatives are listed below."
                }
            };
            IntentRouterOutput {
                primary_route: PrimaryRoute::Avoid,
                rank_mode: cause.rank_mode(),
                bucket_strategy: BucketStrategy::Balanced,
                show_trending,
                suppress_winner: false,
                banner: Some(banner.to_string()),
                reason: format!("avoid: {cause:?} risk").to_lowercase(),
            }
        }
        VerdictStatus::Yellow => IntentRouterOutput {
            primary_route: PrimaryRoute::Improve,
            rank_mode: rank_mode_from_weakest_pillar(&input.scores),
            bucket_strategy: BucketStrategy::Balanced,
            show_trending,
            suppress_winner: false,
            banner: Some(format!(
                "Promising, but {} is holding it back. Compare these alternatives.",
                weakest.label().to_lowercase()
            )),
            reason: format!(
                "weakest pillar {} at {:.0}",
                weakest.label().to_lowercase(),
                weakest_score
            ),
        },
        VerdictStatus::Green | VerdictStatus::TestFirst => IntentRouterOutput {
            primary_route: PrimaryRoute::Approve,
            rank_mode: RankMode::Balanced,
            bucket_strategy: BucketStrategy::Balanced,
            show_trending,
            suppress_winner: false,
            banner: None,
            reason: "all pillars clear the approval bar".to_string(),
        },
    }
}
