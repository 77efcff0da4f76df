use serde::{Deserialize, Serialize};

use super::super::domain::{ConfidenceLevel, Pillar, PillarScores};
use super::hard_stops::HardStopFlag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerdictStatus {
    Green,
    Yellow,
    Red,
    TestFirst,
}

impl VerdictStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Green => "GREEN",
            Self::Yellow => "YELLOW",
            Self::Red => "RED",
            Self::TestFirst => "TEST_FIRST",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrimaryAction {
    Approve,
    TestFirst,
    AltBrand,
    AltProduct,
}

impl PrimaryAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "APPROVE",
            Self::TestFirst => "TEST_FIRST",
            Self::AltBrand => "ALT_BRAND",
            Self::AltProduct => "ALT_PRODUCT",
        }
    }
}

const RED_FLOOR: f32 = 40.0;
const GREEN_FLOOR: f32 = 65.0;
const YELLOW_AVERAGE: f32 = 50.0;

pub(crate) fn decide_status(
    scores: &PillarScores,
    confidence: ConfidenceLevel,
    flags: &[HardStopFlag],
) -> VerdictStatus {
    if flags.iter().any(|flag| flag.forces_red()) {
        return VerdictStatus::Red;
    }

    if confidence == ConfidenceLevel::Low {
        return VerdictStatus::TestFirst;
    }

    if scores.min() < RED_FLOOR {
        return VerdictStatus::Red;
    }

    if flags.contains(&HardStopFlag::OutOfStock) {
        return VerdictStatus::Yellow;
    }

    if Pillar::ALL
        .iter()
        .all(|pillar| scores.get(*pillar) >= GREEN_FLOOR)
    {
        return VerdictStatus::Green;
    }

    if scores.average() >= YELLOW_AVERAGE {
        VerdictStatus::Yellow
    } else {
        VerdictStatus::Red
    }
}

pub(crate) fn decide_action(
    status: VerdictStatus,
    scores: &PillarScores,
    flags: &[HardStopFlag],
) -> PrimaryAction {
    match status {
        VerdictStatus::TestFirst => PrimaryAction::TestFirst,
        VerdictStatus::Green => PrimaryAction::Approve,
        VerdictStatus::Yellow | VerdictStatus::Red => {
            if flags.contains(&HardStopFlag::MerchantRiskExtreme) {
                return PrimaryAction::AltBrand;
            }
            match scores.weakest().0 {
                Pillar::ProductViability => PrimaryAction::AltProduct,
                Pillar::OfferMerchant | Pillar::Economics => PrimaryAction::AltBrand,
            }
        }
    }
}
