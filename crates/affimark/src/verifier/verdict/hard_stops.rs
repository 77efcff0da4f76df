use serde::{Deserialize, Serialize};

use super::super::domain::{Availability, ConfidenceLevel};
use super::{VerdictConfig, VerdictInput};

/// Conditions that force or strongly bias the verdict toward avoiding a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HardStopFlag {
    MerchantRiskExtreme,
    ComplianceRiskHigh,
    InsufficientEvidence,
    ProductPageNotFound,
    OutOfStock,
}

impl HardStopFlag {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MerchantRiskExtreme => "MERCHANT_RISK_EXTREME",
            Self::ComplianceRiskHigh => "COMPLIANCE_RISK_HIGH",
            Self::InsufficientEvidence => "INSUFFICIENT_EVIDENCE",
            Self::ProductPageNotFound => "PRODUCT_PAGE_NOT_FOUND",
            Self::OutOfStock => "OUT_OF_STOCK",
        }
    }

    /// Flags that make the verdict RED regardless of scores.
    pub const fn forces_red(self) -> bool {
        matches!(
            self,
            Self::MerchantRiskExtreme | Self::ComplianceRiskHigh | Self::ProductPageNotFound
        )
    }

    pub(crate) const fn risk(self) -> (&'static str, u8) {
        match self {
            Self::MerchantRiskExtreme => ("Merchant rating is below 2 stars", 100),
            Self::ComplianceRiskHigh => ("Product claims may breach advertising rules", 95),
            Self::ProductPageNotFound => ("Product page could not be verified", 90),
            Self::InsufficientEvidence => ("Too little evidence to support a decision", 75),
            Self::OutOfStock => ("Product is currently out of stock", 70),
        }
    }
}

/// Evaluate every hard-stop predicate in order; several flags may coexist.
pub(crate) fn detect_hard_stops(
    input: &VerdictInput<'_>,
    config: &VerdictConfig,
) -> Vec<HardStopFlag> {
    let mut flags = Vec::new();

    if input
        .reputation
        .and_then(|reputation| reputation.overall_rating)
        .is_some_and(|rating| rating < config.merchant_rating_floor)
    {
        flags.push(HardStopFlag::MerchantRiskExtreme);
    }

    if let Some(product) = input.product {
        let mut corpus = product.description.clone().unwrap_or_default();
        for claim in &product.claims {
            corpus.push('\n');
            corpus.push_str(claim);
        }
        let corpus = corpus.to_lowercase();
        if config
            .banned_claims
            .iter()
            .any(|phrase| corpus.contains(&phrase.to_lowercase()))
        {
            flags.push(HardStopFlag::ComplianceRiskHigh);
        }
    }

    if input.confidence == ConfidenceLevel::Low
        && input.evidence_points <= config.min_evidence_points
    {
        flags.push(HardStopFlag::InsufficientEvidence);
    }

    if !input.product.is_some_and(|product| product.page_found()) {
        flags.push(HardStopFlag::ProductPageNotFound);
    }

    if input
        .product
        .is_some_and(|product| product.availability == Availability::OutOfStock)
    {
        flags.push(HardStopFlag::OutOfStock);
    }

    flags
}
