mod hard_stops;
mod insights;
mod policy;

pub use hard_stops::HardStopFlag;
pub use insights::{Pro, Risk};
pub use policy::{PrimaryAction, VerdictStatus};

use super::domain::{
    CommissionData, ConfidenceLevel, ReputationData, ScoreResult, ScrapedProductData,
};
use serde::{Deserialize, Serialize};

/// Thresholds behind the hard-stop checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerdictConfig {
    pub merchant_rating_floor: f32,
    pub min_evidence_points: u32,
    pub banned_claims: Vec<String>,
}

impl Default for VerdictConfig {
    fn default() -> Self {
        Self {
            merchant_rating_floor: 2.0,
            min_evidence_points: 2,
            banned_claims: [
                "cure for",
                "cures all",
                "miracle",
                "guaranteed weight loss",
                "lose weight fast",
                "fda approved",
                "clinically proven to cure",
                "risk-free",
                "get rich",
                "guaranteed income",
                "no side effects",
                "reverses aging",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
        }
    }
}

/// Everything the verdict depends on for one product.
#[derive(Debug, Clone, Copy)]
pub struct VerdictInput<'a> {
    pub score: &'a ScoreResult,
    pub confidence: ConfidenceLevel,
    pub evidence_points: u32,
    pub product: Option<&'a ScrapedProductData>,
    pub reputation: Option<&'a ReputationData>,
    pub commission: Option<&'a CommissionData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerdictResult {
    pub status: VerdictStatus,
    pub primary_action: PrimaryAction,
    pub hard_stop_flags: Vec<HardStopFlag>,
    pub top_pros: Vec<Pro>,
    pub top_risks: Vec<Risk>,
    pub key_assumptions: Vec<String>,
}

impl VerdictResult {
    pub fn flag_names(&self) -> Vec<String> {
        self.hard_stop_flags
            .iter()
            .map(|flag| flag.as_str().to_string())
            .collect()
    }
}

/// Stateless engine that turns pillar scores and hard stops into a verdict.
#[derive(Debug, Clone, Default)]
pub struct VerdictEngine {
    config: VerdictConfig,
}

impl VerdictEngine {
    pub fn new(config: VerdictConfig) -> Self {
        Self { config }
    }

    pub fn evaluate(&self, input: &VerdictInput<'_>) -> VerdictResult {
        let flags = hard_stops::detect_hard_stops(input, &self.config);
        let scores = &input.score.scores;
        let status = policy::decide_status(scores, input.confidence, &flags);
        let primary_action = policy::decide_action(status, scores, &flags);

        VerdictResult {
            status,
            primary_action,
            top_pros: insights::top_pros(&input.score.breakdowns),
            top_risks: insights::top_risks(input, &flags),
            key_assumptions: insights::key_assumptions(input),
            hard_stop_flags: flags,
        }
    }
}
