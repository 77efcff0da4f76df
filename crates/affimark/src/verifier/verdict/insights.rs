use serde::{Deserialize, Serialize};

use super::super::domain::{ConfidenceLevel, Pillar, ScoreBreakdowns};
use super::hard_stops::HardStopFlag;
use super::VerdictInput;

const TOP_N: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pro {
    pub text: String,
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Risk {
    pub text: String,
    pub severity: u8,
}

fn percent(points: f32, max: f32) -> u8 {
    ((points / max) * 100.0).clamp(0.0, 100.0).round() as u8
}

// (points, max, threshold, text)
type Rule = (f32, f32, f32, &'static str);

fn pro_rules(breakdowns: &ScoreBreakdowns) -> [Rule; 9] {
    let pv = &breakdowns.product_viability;
    let om = &breakdowns.offer_merchant;
    let ec = &breakdowns.economics;
    [
        (pv.demand_signals, 25.0, 18.0, "Strong buyer demand for this product"),
        (pv.review_quality, 25.0, 18.0, "Consistently positive customer reviews"),
        (
            pv.price_competitiveness,
            25.0,
            18.0,
            "Competitively priced against similar products",
        ),
        (om.reputation, 40.0, 30.0, "Merchant has a strong reputation"),
        (om.policies, 30.0, 22.0, "Customer-friendly returns and shipping"),
        (om.trust_signals, 30.0, 22.0, "Clear trust signals on the storefront"),
        (ec.commission, 40.0, 28.0, "Commission rate above category average"),
        (
            ec.cookie_window,
            20.0,
            15.0,
            "Long cookie window captures delayed purchases",
        ),
        (ec.order_value, 25.0, 18.0, "High order value lifts earnings per sale"),
    ]
}

fn risk_rules(breakdowns: &ScoreBreakdowns) -> [Rule; 7] {
    let pv = &breakdowns.product_viability;
    let om = &breakdowns.offer_merchant;
    let ec = &breakdowns.economics;
    [
        (pv.demand_signals, 25.0, 8.0, "Weak demand signals"),
        (pv.review_quality, 25.0, 8.0, "Mixed or thin customer reviews"),
        (om.reputation, 40.0, 15.0, "Merchant reputation is weak"),
        (om.policies, 30.0, 10.0, "Restrictive return or shipping policies"),
        (ec.commission, 40.0, 12.0, "Commission rate below category average"),
        (
            ec.cookie_window,
            20.0,
            5.0,
            "Short cookie window loses delayed purchases",
        ),
        (ec.program_access, 15.0, 4.0, "Affiliate program is hard to join"),
    ]
}

pub(crate) fn top_pros(breakdowns: &ScoreBreakdowns) -> Vec<Pro> {
    let mut pros: Vec<Pro> = pro_rules(breakdowns)
        .into_iter()
        .filter(|(points, _, threshold, _)| points >= threshold)
        .map(|(points, max, _, text)| Pro {
            text: text.to_string(),
            score: percent(points, max),
        })
        .collect();

    // Stable: equal scores keep rule order.
    pros.sort_by(|a, b| b.score.cmp(&a.score));
    pros.truncate(TOP_N);
    pros
}

pub(crate) fn top_risks(input: &VerdictInput<'_>, flags: &[HardStopFlag]) -> Vec<Risk> {
    let mut risks: Vec<Risk> = flags
        .iter()
        .map(|flag| {
            let (text, severity) = flag.risk();
            Risk {
                text: text.to_string(),
                severity,
            }
        })
        .collect();

    risks.extend(
        risk_rules(&input.score.breakdowns)
            .into_iter()
            .filter(|(points, _, threshold, _)| points <= threshold)
            .map(|(points, max, _, text)| Risk {
                text: text.to_string(),
                severity: 100 - percent(points, max),
            }),
    );

    for pillar in Pillar::ALL {
        if input.score.scores.get(pillar) < 40.0 {
            risks.push(Risk {
                text: format!("{} score is below 40", pillar.label()),
                severity: 80,
            });
        }
    }

    risks.sort_by(|a, b| b.severity.cmp(&a.severity));
    risks.truncate(TOP_N);
    risks
}

pub(crate) fn key_assumptions(input: &VerdictInput<'_>) -> Vec<String> {
    let mut assumptions = Vec::new();

    if !input.commission.is_some_and(|terms| terms.has_rate()) {
        assumptions.push("Commission assumed at category average".to_string());
    }
    if !input.reputation.is_some_and(|reputation| reputation.has_data()) {
        assumptions.push("Merchant reputation assumed neutral".to_string());
    }
    if input
        .product
        .and_then(|product| product.review_count)
        .is_none()
    {
        assumptions.push("Demand estimated without review data".to_string());
    }
    if input
        .commission
        .and_then(|terms| terms.cookie_days)
        .is_none()
    {
        assumptions.push("Cookie window assumed to be 30 days".to_string());
    }
    if input
        .commission
        .and_then(|terms| terms.requires_application)
        .unwrap_or(false)
    {
        assumptions.push("Approval into the affiliate program is assumed".to_string());
    }
    if input.confidence != ConfidenceLevel::High {
        assumptions.push("Scores may shift as more evidence arrives".to_string());
    }

    assumptions.truncate(TOP_N);
    assumptions
}
