use serde::{Deserialize, Serialize};

use super::domain::{
    Availability, CommissionData, ConfidenceLevel, ReputationData, ScrapedProductData,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceSourceKind {
    ProductPage,
    Reputation,
    #[serde(rename = "affiliate_db")]
    AffiliateDatabase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceQuality {
    High,
    Medium,
    Low,
}

/// One typed piece of evidence gathered for a single analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceSource {
    pub source: EvidenceSourceKind,
    pub label: String,
    pub data_points: u32,
    pub recency_days: u32,
    pub quality: EvidenceQuality,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub snippets: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceSummary {
    pub total_data_points: u32,
    pub source_count: u32,
    pub cross_source_agreement: ConfidenceLevel,
    pub confidence: ConfidenceLevel,
    pub confidence_explanation: String,
    pub gaps: Vec<String>,
    pub strengths: Vec<String>,
    pub sources: Vec<EvidenceSource>,
}

const LOW_REVIEW_VOLUME: u32 = 10;
const HIGH_REVIEW_VOLUME: u32 = 100;
const STALE_AFTER_DAYS: u32 = 30;
const FRESH_WITHIN_DAYS: u32 = 7;
const UNKNOWN_REVIEW_AGE_DAYS: u32 = 90;
const UNKNOWN_PROGRAM_AGE_DAYS: u32 = 30;
const MAX_SNIPPETS: usize = 3;

/// Accumulates evidence for one request; finalize with [`EvidenceBuilder::summary`].
#[derive(Debug, Clone, Default)]
pub struct EvidenceBuilder {
    sources: Vec<EvidenceSource>,
    review_volume: u32,
}

impl EvidenceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sources(&self) -> &[EvidenceSource] {
        &self.sources
    }

    pub fn add_source(&mut self, source: EvidenceSource) -> &mut Self {
        self.sources.push(source);
        self
    }

    /// Adds the scraped product page. Pages without a title or price add nothing.
    pub fn add_product_page_evidence(
        &mut self,
        product: &ScrapedProductData,
        url: Option<&str>,
    ) -> &mut Self {
        if !product.page_found() {
            return self;
        }

        let fields = [
            product.title.is_some(),
            product.price.is_some(),
            product.rating.is_some(),
            product.availability != Availability::Unknown,
            product.description.is_some(),
        ];
        let present = fields.iter().filter(|present| **present).count() as u32;
        let completeness = present as f32 / fields.len() as f32;
        let reviews = product.review_count.unwrap_or(0);
        self.review_volume = self.review_volume.saturating_add(reviews);

        let quality = if completeness >= 0.8 && reviews >= LOW_REVIEW_VOLUME {
            EvidenceQuality::High
        } else if completeness >= 0.6 {
            EvidenceQuality::Medium
        } else {
            EvidenceQuality::Low
        };

        self.add_source(EvidenceSource {
            source: EvidenceSourceKind::ProductPage,
            label: "Product page".to_string(),
            data_points: present + (reviews / 10).min(10),
            recency_days: 0,
            quality,
            snippets: product.claims.iter().take(MAX_SNIPPETS).cloned().collect(),
            url: url.map(str::to_string),
        })
    }

    /// Adds one source per reputation platform, or an aggregate when only a rating exists.
    pub fn add_reputation_evidence(&mut self, reputation: &ReputationData) -> &mut Self {
        if reputation.sources.is_empty() {
            if reputation.overall_rating.is_some() {
                self.add_source(EvidenceSource {
                    source: EvidenceSourceKind::Reputation,
                    label: "Aggregated rating".to_string(),
                    data_points: 1,
                    recency_days: UNKNOWN_REVIEW_AGE_DAYS,
                    quality: EvidenceQuality::Low,
                    snippets: Vec::new(),
                    url: None,
                });
            }
            return self;
        }

        self.review_volume = self.review_volume.saturating_add(reputation.total_reviews());
        for entry in &reputation.sources {
            let quality = if entry.review_count >= HIGH_REVIEW_VOLUME && entry.rating.is_some() {
                EvidenceQuality::High
            } else if entry.review_count >= LOW_REVIEW_VOLUME {
                EvidenceQuality::Medium
            } else {
                EvidenceQuality::Low
            };

            let snippets = entry
                .rating
                .map(|rating| {
                    vec![format!(
                        "{rating:.1}/5 from {} reviews on {}",
                        entry.review_count, entry.source
                    )]
                })
                .unwrap_or_default();

            self.add_source(EvidenceSource {
                source: EvidenceSourceKind::Reputation,
                label: entry.source.clone(),
                data_points: u32::from(entry.rating.is_some()) + (entry.review_count / 10).min(25),
                recency_days: entry.last_review_days.unwrap_or(UNKNOWN_REVIEW_AGE_DAYS),
                quality,
                snippets,
                url: entry.url.clone(),
            });
        }
        self
    }

    /// Adds affiliate program terms. Nothing is added when no program was found.
    pub fn add_affiliate_db_evidence(&mut self, commission: &CommissionData) -> &mut Self {
        if !commission.program_found() && commission.cookie_days.is_none() {
            return self;
        }

        let has_rate = commission.has_rate();
        let fields = [
            has_rate,
            commission.rate_low.is_some() && commission.rate_high.is_some(),
            commission.cookie_days.is_some(),
            commission.network.is_some(),
            commission.requires_application.is_some(),
        ];
        let data_points = fields.iter().filter(|present| **present).count() as u32;

        let quality = if has_rate
            && commission.cookie_days.is_some()
            && commission.network.is_some()
        {
            EvidenceQuality::High
        } else if has_rate {
            EvidenceQuality::Medium
        } else {
            EvidenceQuality::Low
        };

        let mut snippets = Vec::new();
        match (commission.rate_low, commission.rate_high) {
            (Some(low), Some(high)) if (high - low).abs() > f32::EPSILON => {
                snippets.push(format!("{low:.1}%-{high:.1}% commission"))
            }
            (Some(rate), _) | (None, Some(rate)) => {
                snippets.push(format!("{rate:.1}% commission"))
            }
            (None, None) => {}
        }
        if let Some(days) = commission.cookie_days {
            snippets.push(format!("{days}-day cookie"));
        }

        self.add_source(EvidenceSource {
            source: EvidenceSourceKind::AffiliateDatabase,
            label: commission
                .network
                .clone()
                .unwrap_or_else(|| "Affiliate program database".to_string()),
            data_points,
            recency_days: commission
                .last_verified_days
                .unwrap_or(UNKNOWN_PROGRAM_AGE_DAYS),
            quality,
            snippets,
            url: None,
        })
    }

    pub fn summary(&self) -> EvidenceSummary {
        let source_count = self.sources.len() as u32;
        let total_data_points = self
            .sources
            .iter()
            .fold(0u32, |total, source| total.saturating_add(source.data_points));
        let high_quality = self
            .sources
            .iter()
            .filter(|source| source.quality == EvidenceQuality::High)
            .count();
        let usable = self
            .sources
            .iter()
            .filter(|source| source.quality != EvidenceQuality::Low)
            .count();
        let has_fresh = self
            .sources
            .iter()
            .any(|source| source.recency_days <= FRESH_WITHIN_DAYS);

        let cross_source_agreement = if high_quality >= 2 && source_count >= 3 {
            ConfidenceLevel::High
        } else if usable >= 2 {
            ConfidenceLevel::Med
        } else {
            ConfidenceLevel::Low
        };

        let confidence = if source_count >= 3
            && total_data_points >= 20
            && cross_source_agreement != ConfidenceLevel::Low
            && high_quality >= 1
            && has_fresh
        {
            ConfidenceLevel::High
        } else if source_count >= 2
            && total_data_points >= 10
            && (high_quality >= 1 || cross_source_agreement != ConfidenceLevel::Low)
        {
            ConfidenceLevel::Med
        } else {
            ConfidenceLevel::Low
        };

        EvidenceSummary {
            total_data_points,
            source_count,
            cross_source_agreement,
            confidence,
            confidence_explanation: explain(confidence, source_count, total_data_points),
            gaps: self.gaps(),
            strengths: self.strengths(cross_source_agreement),
            sources: self.sources.clone(),
        }
    }

    fn has_kind(&self, kind: EvidenceSourceKind) -> bool {
        self.sources.iter().any(|source| source.source == kind)
    }

    fn gaps(&self) -> Vec<String> {
        let mut gaps = Vec::new();
        if !self.has_kind(EvidenceSourceKind::ProductPage) {
            gaps.push("Product page data unavailable".to_string());
        }
        if !self.has_kind(EvidenceSourceKind::Reputation) {
            gaps.push("No independent merchant reviews".to_string());
        }
        if !self.has_kind(EvidenceSourceKind::AffiliateDatabase) {
            gaps.push("Affiliate terms not confirmed".to_string());
        }
        if self.review_volume < LOW_REVIEW_VOLUME {
            gaps.push(format!("Fewer than {LOW_REVIEW_VOLUME} reviews found"));
        }

        let mut reputation = self
            .sources
            .iter()
            .filter(|source| source.source == EvidenceSourceKind::Reputation)
            .peekable();
        if reputation.peek().is_some()
            && reputation.all(|source| source.recency_days > STALE_AFTER_DAYS)
        {
            gaps.push(format!(
                "Latest merchant reviews are more than {STALE_AFTER_DAYS} days old"
            ));
        }
        gaps
    }

    fn strengths(&self, agreement: ConfidenceLevel) -> Vec<String> {
        let mut strengths = Vec::new();
        if self.review_volume >= HIGH_REVIEW_VOLUME {
            strengths.push(format!("Over {HIGH_REVIEW_VOLUME} reviews analyzed"));
        }
        if self.sources.iter().any(|source| {
            source.source == EvidenceSourceKind::AffiliateDatabase
                && source.quality == EvidenceQuality::High
        }) {
            strengths.push("Affiliate terms confirmed in the program database".to_string());
        }
        if self
            .sources
            .iter()
            .any(|source| source.recency_days <= FRESH_WITHIN_DAYS)
        {
            strengths.push(format!("Includes data from the last {FRESH_WITHIN_DAYS} days"));
        }
        if agreement == ConfidenceLevel::High {
            strengths.push("Multiple high-quality sources agree".to_string());
        }
        strengths
    }
}

fn explain(confidence: ConfidenceLevel, sources: u32, points: u32) -> String {
    match confidence {
        ConfidenceLevel::High => format!(
            "{sources} sources with {points} data points agree, including data from the last {FRESH_WITHIN_DAYS} days."
        ),
        ConfidenceLevel::Med => format!(
            "{sources} sources with {points} data points. More independent sources would raise confidence."
        ),
        ConfidenceLevel::Low if sources == 0 => "No evidence could be collected.".to_string(),
        ConfidenceLevel::Low if sources == 1 => {
            "Only one source of evidence was found.".to_string()
        }
        ConfidenceLevel::Low if points < 10 => {
            format!("Only {points} data points were found across {sources} sources.")
        }
        ConfidenceLevel::Low => "Sources disagree or are mostly low quality.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verifier::domain::ReputationSource;

    fn product() -> ScrapedProductData {
        ScrapedProductData {
            title: Some("Trail Running Shoe".to_string()),
            price: Some(129.0),
            rating: Some(4.6),
            review_count: Some(420),
            availability: Availability::InStock,
            claims: vec!["Waterproof".to_string(), "Lightweight".to_string()],
            description: Some("All-terrain running shoe".to_string()),
            has_return_policy: true,
            has_shipping_info: true,
        }
    }

    fn reputation(days: u32) -> ReputationData {
        ReputationData {
            overall_rating: Some(4.3),
            sources: vec![
                ReputationSource {
                    source: "Trustpilot".to_string(),
                    rating: Some(4.4),
                    review_count: 1800,
                    last_review_days: Some(days),
                    url: None,
                },
                ReputationSource {
                    source: "Sitejabber".to_string(),
                    rating: Some(4.1),
                    review_count: 35,
                    last_review_days: Some(days),
                    url: None,
                },
            ],
        }
    }

    fn commission() -> CommissionData {
        CommissionData {
            rate_low: Some(6.0),
            rate_high: Some(8.0),
            cookie_days: Some(30),
            network: Some("Impact".to_string()),
            requires_application: Some(true),
            last_verified_days: Some(5),
        }
    }

    #[test]
    fn rich_evidence_reaches_high_confidence() {
        let mut builder = EvidenceBuilder::new();
        builder
            .add_product_page_evidence(&product(), Some("https://shoes.example/p/trail"))
            .add_reputation_evidence(&reputation(3))
            .add_affiliate_db_evidence(&commission());

        let summary = builder.summary();
        assert_eq!(summary.source_count, 4);
        assert!(summary.total_data_points >= 20);
        assert_eq!(summary.cross_source_agreement, ConfidenceLevel::High);
        assert_eq!(summary.confidence, ConfidenceLevel::High);
        assert!(summary
            .strengths
            .iter()
            .any(|strength| strength.starts_with("Over 100 reviews")));
        assert!(summary.gaps.is_empty());
    }

    #[test]
    fn high_confidence_requires_fresh_data() {
        let mut builder = EvidenceBuilder::new();
        builder.add_reputation_evidence(&reputation(45));
        builder.add_affiliate_db_evidence(&CommissionData {
            last_verified_days: Some(60),
            ..commission()
        });
        builder.add_source(EvidenceSource {
            source: EvidenceSourceKind::ProductPage,
            label: "Cached product page".to_string(),
            data_points: 15,
            recency_days: 20,
            quality: EvidenceQuality::High,
            snippets: Vec::new(),
            url: None,
        });

        let summary = builder.summary();
        assert_eq!(summary.cross_source_agreement, ConfidenceLevel::High);
        assert_eq!(summary.confidence, ConfidenceLevel::Med);
        assert!(summary
            .gaps
            .iter()
            .any(|gap| gap.contains("more than 30 days old")));
    }

    #[test]
    fn single_thin_source_is_low_confidence() {
        let mut builder = EvidenceBuilder::new();
        builder.add_product_page_evidence(
            &ScrapedProductData {
                title: Some("Mystery gadget".to_string()),
                ..ScrapedProductData::default()
            },
            None,
        );

        let summary = builder.summary();
        assert_eq!(summary.source_count, 1);
        assert_eq!(summary.sources[0].quality, EvidenceQuality::Low);
        assert_eq!(summary.cross_source_agreement, ConfidenceLevel::Low);
        assert_eq!(summary.confidence, ConfidenceLevel::Low);
        assert_eq!(
            summary.confidence_explanation,
            "Only one source of evidence was found."
        );
        assert!(summary.gaps.contains(&"Fewer than 10 reviews found".to_string()));
    }

    #[test]
    fn missing_page_and_program_add_no_sources() {
        let mut builder = EvidenceBuilder::new();
        builder
            .add_product_page_evidence(&ScrapedProductData::default(), None)
            .add_affiliate_db_evidence(&CommissionData::default());

        let summary = builder.summary();
        assert_eq!(summary.source_count, 0);
        assert_eq!(summary.confidence_explanation, "No evidence could be collected.");
        assert_eq!(summary.gaps.len(), 4);
    }

    #[test]
    fn rating_without_sources_becomes_aggregate_evidence() {
        let mut builder = EvidenceBuilder::new();
        builder.add_reputation_evidence(&ReputationData {
            overall_rating: Some(3.9),
            sources: Vec::new(),
        });

        let sources = builder.sources();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].label, "Aggregated rating");
        assert_eq!(sources[0].quality, EvidenceQuality::Low);
    }

    #[test]
    fn huge_review_counts_saturate_instead_of_overflowing() {
        let mut builder = EvidenceBuilder::new();
        builder
            .add_product_page_evidence(
                &ScrapedProductData {
                    review_count: Some(u32::MAX),
                    ..product()
                },
                None,
            )
            .add_reputation_evidence(&ReputationData {
                overall_rating: Some(4.0),
                sources: vec![ReputationSource {
                    source: "Trustpilot".to_string(),
                    rating: Some(4.0),
                    review_count: 1,
                    last_review_days: Some(1),
                    url: None,
                }],
            });

        let summary = builder.summary();
        assert_eq!(summary.source_count, 2);
        assert!(summary
            .strengths
            .contains(&"Over 100 reviews analyzed".to_string()));
        assert!(!summary
            .gaps
            .contains(&"Fewer than 10 reviews found".to_string()));
    }

    #[test]
    fn total_reviews_saturates() {
        let reputation = ReputationData {
            overall_rating: None,
            sources: vec![
                ReputationSource {
                    review_count: u32::MAX,
                    ..ReputationSource::default()
                },
                ReputationSource {
                    review_count: 7,
                    ..ReputationSource::default()
                },
            ],
        };
        assert_eq!(reputation.total_reviews(), u32::MAX);
    }

    // Three of five page fields and a rate-only program: both usable, neither high.
    fn medium_page(reviews: u32) -> ScrapedProductData {
        ScrapedProductData {
            title: Some("Desk lamp".to_string()),
            price: Some(39.0),
            rating: Some(4.2),
            review_count: Some(reviews),
            ..ScrapedProductData::default()
        }
    }

    fn rate_only_program() -> CommissionData {
        CommissionData {
            rate_low: Some(4.0),
            ..CommissionData::default()
        }
    }

    #[test]
    fn usable_sources_without_high_quality_agree_at_medium() {
        let mut builder = EvidenceBuilder::new();
        builder
            .add_product_page_evidence(&medium_page(5), None)
            .add_affiliate_db_evidence(&rate_only_program());

        let summary = builder.summary();
        assert!(summary
            .sources
            .iter()
            .all(|source| source.quality == EvidenceQuality::Medium));
        assert_eq!(summary.cross_source_agreement, ConfidenceLevel::Med);
        assert_eq!(summary.total_data_points, 4);
        assert_eq!(summary.confidence, ConfidenceLevel::Low);
        assert_eq!(
            summary.confidence_explanation,
            "Only 4 data points were found across 2 sources."
        );
    }

    #[test]
    fn medium_agreement_alone_lifts_confidence_to_medium() {
        let mut builder = EvidenceBuilder::new();
        builder
            .add_product_page_evidence(&medium_page(100), None)
            .add_affiliate_db_evidence(&rate_only_program());

        let summary = builder.summary();
        assert!(summary
            .sources
            .iter()
            .all(|source| source.quality != EvidenceQuality::High));
        assert_eq!(summary.total_data_points, 14);
        assert_eq!(summary.cross_source_agreement, ConfidenceLevel::Med);
        assert_eq!(summary.confidence, ConfidenceLevel::Med);
    }
}
