use serde::{Deserialize, Serialize};

use super::domain::Pillar;
use super::intent::RankMode;
use super::verdict::{PrimaryAction, VerdictStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybookSource {
    Generated,
    Fallback,
}

/// Next steps shown to the affiliate after a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playbook {
    pub source: PlaybookSource,
    pub headline: String,
    pub steps: Vec<String>,
    pub success_metrics: Vec<String>,
}

/// Facts a playbook is written from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybookContext {
    pub merchant: String,
    pub status: VerdictStatus,
    pub primary_action: PrimaryAction,
    pub weakest_pillar: Pillar,
    pub rank_mode: RankMode,
    pub winner_name: Option<String>,
    pub top_risks: Vec<String>,
}

/// Optional generation backend; `None` means the caller falls back.
pub trait PlaybookGenerator: Send + Sync {
    fn try_generate(&self, context: &PlaybookContext) -> Option<Playbook>;

    /// Whether a backend is configured at all.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Generator used when no generation backend is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledPlaybookGenerator;

impl PlaybookGenerator for DisabledPlaybookGenerator {
    fn try_generate(&self, _context: &PlaybookContext) -> Option<Playbook> {
        None
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

fn pillar_step(pillar: Pillar) -> &'static str {
    match pillar {
        Pillar::ProductViability => {
            "Check search volume and recent reviews before writing long-form content"
        }
        Pillar::OfferMerchant => "Read the merchant's return and shipping terms before linking",
        Pillar::Economics => "Ask the program manager about commission tiers and cookie length",
    }
}

/// Deterministic playbook keyed on verdict, action and weakest pillar.
pub fn fallback_playbook(context: &PlaybookContext) -> Playbook {
    let alternative = context
        .winner_name
        .clone()
        .unwrap_or_else(|| "the top-ranked alternative".to_string());

    let (headline, mut steps, success_metrics) = match (context.status, context.primary_action) {
        (VerdictStatus::Green, _) => (
            format!("Promote {} with confidence", context.merchant),
            vec![
                "Add the link to your highest-traffic placement".to_string(),
                "Publish a comparison or review within the first week".to_string(),
            ],
            vec![
                "Click-through rate above 2%".to_string(),
                "First commissions within the cookie window".to_string(),
            ],
        ),
        (VerdictStatus::TestFirst, _) | (_, PrimaryAction::TestFirst) => (
            format!("Run a small test with {}", context.merchant),
            vec![
                "Place the link in one low-risk slot for two weeks".to_string(),
                "Track clicks and conversions before scaling".to_string(),
            ],
            vec![
                "At least 100 tracked clicks".to_string(),
                "Conversion rate at or above your current average".to_string(),
            ],
        ),
        (_, PrimaryAction::AltBrand) => (
            format!("Switch to a stronger brand such as {alternative}"),
            vec![
                format!("Replace existing {} links with {alternative}", context.merchant),
                "Keep the original as a secondary option only if results hold".to_string(),
            ],
            vec!["Earnings per click match or beat the original".to_string()],
        ),
        (_, PrimaryAction::AltProduct | PrimaryAction::Approve) => (
            format!("Promote {alternative} instead"),
            vec![
                format!("Feature {alternative} in place of the analysed product"),
                "Reuse the existing content angle with the new product".to_string(),
            ],
            vec!["Conversion rate above the analysed product's baseline".to_string()],
        ),
    };

    if context.status != VerdictStatus::Green {
        steps.push(pillar_step(context.weakest_pillar).to_string());
    }
    if let Some(risk) = context.top_risks.first() {
        steps.push(format!("Watch for: {risk}"));
    }

    Playbook {
        source: PlaybookSource::Fallback,
        headline,
        steps,
        success_metrics,
    }
}

/// Try the generator first and fall back when it declines.
pub fn playbook_for<G>(generator: &G, context: &PlaybookContext) -> Playbook
where
    G: PlaybookGenerator + ?Sized,
{
    match generator.try_generate(context) {
        Some(mut playbook) => {
            playbook.source = PlaybookSource::Generated;
            playbook
        }
        None => fallback_playbook(context),
    }
}
