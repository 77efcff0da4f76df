use serde::{Deserialize, Serialize};

use super::domain::{CategoryStats, CommissionData, ReputationData, ScrapedProductData};

/// Snapshot of which scoring inputs were backed by real data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageInput {
    pub has_product_page: bool,
    pub has_price: bool,
    pub has_rating: bool,
    pub review_count: u32,
    pub has_availability: bool,
    pub has_reputation_data: bool,
    pub reputation_source_count: u32,
    pub has_return_policy: bool,
    pub has_shipping_info: bool,
    pub has_affiliate_program: bool,
    pub has_commission_rate: bool,
    pub has_cookie_duration: bool,
    pub has_category_benchmark: bool,
}

impl CoverageInput {
    pub fn from_sources(
        product: Option<&ScrapedProductData>,
        reputation: Option<&ReputationData>,
        commission: Option<&CommissionData>,
        category_stats: Option<&CategoryStats>,
    ) -> Self {
        let product_page = product.filter(|product| product.page_found());
        let reputation = reputation.filter(|reputation| reputation.has_data());

        Self {
            has_product_page: product_page.is_some(),
            has_price: product_page.is_some_and(|product| product.price.is_some()),
            has_rating: product_page.is_some_and(|product| product.rating.is_some()),
            review_count: product_page
                .and_then(|product| product.review_count)
                .unwrap_or(0),
            has_availability: product_page.is_some_and(|product| {
                product.availability != super::domain::Availability::Unknown
            }),
            has_reputation_data: reputation.is_some(),
            reputation_source_count: reputation
                .map(|reputation| reputation.sources.len() as u32)
                .unwrap_or(0),
            has_return_policy: product_page.is_some_and(|product| product.has_return_policy),
            has_shipping_info: product_page.is_some_and(|product| product.has_shipping_info),
            has_affiliate_program: commission.is_some_and(CommissionData::program_found),
            has_commission_rate: commission.is_some_and(CommissionData::has_rate),
            has_cookie_duration: commission.is_some_and(|terms| terms.cookie_days.is_some()),
            has_category_benchmark: category_stats.is_some(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataQuality {
    High,
    Medium,
    Low,
}

impl DataQuality {
    pub fn from_score(score: f32) -> Self {
        if score >= 0.7 {
            Self::High
        } else if score >= 0.4 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PillarCoverage {
    pub product_viability: f32,
    pub offer_merchant: f32,
    pub economics: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageResult {
    pub overall_score: f32,
    pub by_pillar: PillarCoverage,
    pub missing_signals: Vec<String>,
    pub data_quality: DataQuality,
    pub recommendation: String,
}

pub const MISSING_PRODUCT_PAGE: &str = "product page could not be loaded";
pub const MISSING_PRICE: &str = "price not found";
pub const MISSING_RATING: &str = "no product rating";
pub const MISSING_REVIEWS: &str = "few or no reviews";
pub const MISSING_AVAILABILITY: &str = "availability unknown";
pub const MISSING_REPUTATION: &str = "no merchant reputation data";
pub const MISSING_SECOND_SOURCE: &str = "single reputation source";
pub const MISSING_RETURN_POLICY: &str = "return policy unknown";
pub const MISSING_SHIPPING: &str = "shipping info unknown";
pub const MISSING_AFFILIATE_PROGRAM: &str = "no affiliate program found";
pub const MISSING_COMMISSION_RATE: &str = "commission rate unknown";
pub const MISSING_COOKIE: &str = "cookie duration unknown";
pub const MISSING_BENCHMARK: &str = "no category benchmark";

const OVERALL_WEIGHTS: (f32, f32, f32) = (0.35, 0.35, 0.30);

struct PillarTally {
    score: f32,
    missing: Vec<String>,
}

impl PillarTally {
    fn new() -> Self {
        Self {
            score: 0.0,
            missing: Vec::new(),
        }
    }

    fn signal(&mut self, present: bool, weight: f32, missing: &str) {
        if present {
            self.score += weight;
        } else {
            self.missing.push(missing.to_string());
        }
    }
}

fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

fn product_coverage(input: &CoverageInput) -> PillarTally {
    let mut tally = PillarTally::new();
    tally.signal(input.has_product_page, 0.30, MISSING_PRODUCT_PAGE);
    tally.signal(input.has_price, 0.20, MISSING_PRICE);
    tally.signal(input.has_rating, 0.20, MISSING_RATING);
    match input.review_count {
        0 => tally.signal(false, 0.20, MISSING_REVIEWS),
        1..=9 => {
            tally.score += 0.10;
            tally.missing.push(MISSING_REVIEWS.to_string());
        }
        _ => tally.signal(true, 0.20, MISSING_REVIEWS),
    }
    tally.signal(input.has_availability, 0.10, MISSING_AVAILABILITY);
    tally
}

fn merchant_coverage(input: &CoverageInput) -> PillarTally {
    let mut tally = PillarTally::new();
    tally.signal(input.has_reputation_data, 0.40, MISSING_REPUTATION);
    // Only meaningful once at least one source exists.
    if input.has_reputation_data {
        tally.signal(
            input.reputation_source_count >= 2,
            0.25,
            MISSING_SECOND_SOURCE,
        );
    }
    tally.signal(input.has_return_policy, 0.20, MISSING_RETURN_POLICY);
    tally.signal(input.has_shipping_info, 0.15, MISSING_SHIPPING);
    tally
}

fn economics_coverage(input: &CoverageInput) -> PillarTally {
    let mut tally = PillarTally::new();
    tally.signal(input.has_affiliate_program, 0.40, MISSING_AFFILIATE_PROGRAM);
    tally.signal(input.has_commission_rate, 0.30, MISSING_COMMISSION_RATE);
    tally.signal(input.has_cookie_duration, 0.15, MISSING_COOKIE);
    tally.signal(input.has_category_benchmark, 0.15, MISSING_BENCHMARK);
    tally
}

/// Score how much of the verdict rests on real data rather than defaults.
pub fn calculate_coverage(input: &CoverageInput) -> CoverageResult {
    let product = product_coverage(input);
    let merchant = merchant_coverage(input);
    let economics = economics_coverage(input);

    let by_pillar = PillarCoverage {
        product_viability: round2(product.score.clamp(0.0, 1.0)),
        offer_merchant: round2(merchant.score.clamp(0.0, 1.0)),
        economics: round2(economics.score.clamp(0.0, 1.0)),
    };

    let (w_product, w_merchant, w_economics) = OVERALL_WEIGHTS;
    let overall_score = round2(
        (w_product * by_pillar.product_viability
            + w_merchant * by_pillar.offer_merchant
            + w_economics * by_pillar.economics)
            .clamp(0.0, 1.0),
    );

    let missing_signals: Vec<String> = product
        .missing
        .into_iter()
        .chain(merchant.missing)
        .chain(economics.missing)
        .collect();

    let data_quality = DataQuality::from_score(overall_score);
    let recommendation = recommend(data_quality, &missing_signals).to_string();

    CoverageResult {
        overall_score,
        by_pillar,
        missing_signals,
        data_quality,
        recommendation,
    }
}

fn recommend(quality: DataQuality, missing: &[String]) -> &'static str {
    let missing_signal = |signal: &str| missing.iter().any(|entry| entry == signal);

    match quality {
        DataQuality::High if missing.is_empty() => {
            "Data coverage is complete. Scores reflect real signals."
        }
        DataQuality::High => {
            "Coverage is strong. Remaining gaps are minor and unlikely to change the verdict."
        }
        DataQuality::Medium if missing_signal(MISSING_AFFILIATE_PROGRAM) => {
            "No affiliate program was found for this merchant. Confirm the program exists before promoting."
        }
        DataQuality::Medium if missing_signal(MISSING_PRODUCT_PAGE) => {
            "The product page could not be read. Check price and availability by hand."
        }
        DataQuality::Medium if missing_signal(MISSING_REPUTATION) => {
            "Merchant reputation is unverified. Review independent ratings before committing."
        }
        DataQuality::Medium => {
            "Coverage is moderate. Treat scores as directional and validate with a small test."
        }
        DataQuality::Low if missing_signal(MISSING_PRODUCT_PAGE) => {
            "Too little data to score reliably. Provide a direct product URL and run the analysis again."
        }
        DataQuality::Low => {
            "Most scores rely on fallback defaults. Run a small test campaign before scaling."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_input() -> CoverageInput {
        CoverageInput {
            has_product_page: true,
            has_price: true,
            has_rating: true,
            review_count: 250,
            has_availability: true,
            has_reputation_data: true,
            reputation_source_count: 3,
            has_return_policy: true,
            has_shipping_info: true,
            has_affiliate_program: true,
            has_commission_rate: true,
            has_cookie_duration: true,
            has_category_benchmark: true,
        }
    }

    #[test]
    fn full_coverage_scores_one_with_no_missing_signals() {
        let result = calculate_coverage(&full_input());
        assert_eq!(result.overall_score, 1.0);
        assert_eq!(result.by_pillar.product_viability, 1.0);
        assert_eq!(result.by_pillar.offer_merchant, 1.0);
        assert_eq!(result.by_pillar.economics, 1.0);
        assert!(result.missing_signals.is_empty());
        assert_eq!(result.data_quality, DataQuality::High);
        assert_eq!(
            result.recommendation,
            "Data coverage is complete. Scores reflect real signals."
        );
    }

    #[test]
    fn empty_input_is_low_quality_and_lists_all_pillars_in_order() {
        let result = calculate_coverage(&CoverageInput::default());
        assert_eq!(result.overall_score, 0.0);
        assert_eq!(result.data_quality, DataQuality::Low);
        assert_eq!(result.missing_signals.first().map(String::as_str), Some(MISSING_PRODUCT_PAGE));
        assert_eq!(result.missing_signals.last().map(String::as_str), Some(MISSING_BENCHMARK));
        let reputation_at = result
            .missing_signals
            .iter()
            .position(|signal| signal == MISSING_REPUTATION)
            .expect("merchant gap listed");
        let program_at = result
            .missing_signals
            .iter()
            .position(|signal| signal == MISSING_AFFILIATE_PROGRAM)
            .expect("economics gap listed");
        assert!(reputation_at < program_at);
        assert!(result.recommendation.contains("direct product URL"));
    }

    #[test]
    fn missing_affiliate_program_at_medium_tier_gets_program_advice() {
        let input = CoverageInput {
            has_affiliate_program: false,
            has_commission_rate: false,
            ..full_input()
        };

        let result = calculate_coverage(&input);
        // 0.35 + 0.35 + 0.30 * 0.30
        assert_eq!(result.overall_score, 0.79);
        assert_eq!(result.data_quality, DataQuality::High);

        let input = CoverageInput {
            has_return_policy: false,
            has_shipping_info: false,
            reputation_source_count: 1,
            ..input
        };
        let result = calculate_coverage(&input);
        assert_eq!(result.overall_score, 0.58);
        assert_eq!(result.data_quality, DataQuality::Medium);
        assert!(result.recommendation.starts_with("No affiliate program was found"));
    }

    #[test]
    fn partial_reviews_earn_half_weight() {
        let input = CoverageInput {
            review_count: 4,
            ..full_input()
        };
        let result = calculate_coverage(&input);
        assert_eq!(result.by_pillar.product_viability, 0.9);
        assert!(result.missing_signals.contains(&MISSING_REVIEWS.to_string()));
    }

    #[test]
    fn overall_score_stays_in_unit_range_for_every_flag_combination() {
        for mask in 0u32..(1 << 12) {
            let bit = |n: u32| mask & (1 << n) != 0;
            let input = CoverageInput {
                has_product_page: bit(0),
                has_price: bit(1),
                has_rating: bit(2),
                review_count: if bit(3) { 25 } else { 0 },
                has_availability: bit(4),
                has_reputation_data: bit(5),
                reputation_source_count: if bit(6) { 2 } else { 1 },
                has_return_policy: bit(7),
                has_shipping_info: bit(8),
                has_affiliate_program: bit(9),
                has_commission_rate: bit(10),
                has_cookie_duration: bit(11),
                has_category_benchmark: bit(3),
            };

            let result = calculate_coverage(&input);
            assert!((0.0..=1.0).contains(&result.overall_score));
            assert_eq!(result.data_quality, DataQuality::from_score(result.overall_score));
        }
    }

    fn no_product_page() -> CoverageInput {
        CoverageInput {
            has_product_page: false,
            has_price: false,
            has_rating: false,
            review_count: 0,
            has_availability: false,
            ..full_input()
        }
    }

    #[test]
    fn recommendation_follows_tier_and_missing_signals() {
        let cases = [
            (
                CoverageInput {
                    has_category_benchmark: false,
                    ..full_input()
                },
                DataQuality::High,
                "Coverage is strong.",
            ),
            // 0.35 * 0 + 0.35 + 0.30
            (
                no_product_page(),
                DataQuality::Medium,
                "The product page could not be read.",
            ),
            // 0.35 + 0.35 * 0 + 0.30
            (
                CoverageInput {
                    has_reputation_data: false,
                    reputation_source_count: 0,
                    has_return_policy: false,
                    has_shipping_info: false,
                    ..full_input()
                },
                DataQuality::Medium,
                "Merchant reputation is unverified.",
            ),
            // 0.35 * 0.6 + 0.35 + 0.30 * 0.4
            (
                CoverageInput {
                    has_price: false,
                    has_rating: false,
                    has_commission_rate: false,
                    has_cookie_duration: false,
                    has_category_benchmark: false,
                    ..full_input()
                },
                DataQuality::Medium,
                "Coverage is moderate.",
            ),
            // 0.35 * 0.3
            (
                CoverageInput {
                    has_product_page: true,
                    ..CoverageInput::default()
                },
                DataQuality::Low,
                "Most scores rely on fallback defaults.",
            ),
        ];

        for (input, quality, prefix) in cases {
            let result = calculate_coverage(&input);
            assert_eq!(result.data_quality, quality, "score {}", result.overall_score);
            assert!(
                result.recommendation.starts_with(prefix),
                "expected '{prefix}', got '{}'",
                result.recommendation
            );
        }
    }

    #[test]
    fn missing_product_page_outranks_missing_reputation_at_medium() {
        let input = CoverageInput {
            has_reputation_data: false,
            reputation_source_count: 0,
            ..no_product_page()
        };

        let result = calculate_coverage(&input);
        // 0 + 0.35 * 0.35 + 0.30
        assert_eq!(result.data_quality, DataQuality::Medium);
        assert!(result.recommendation.starts_with("The product page could not be read."));
    }
}
