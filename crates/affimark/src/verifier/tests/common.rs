use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::verifier::domain::{
    Availability, CategoryStats, CommissionData, EconomicsBreakdown, OfferMerchantBreakdown,
    PillarScores, ProductViabilityBreakdown, ReputationData, ReputationSource, ScoreBreakdowns,
    ScoreResult, ScrapedProductData,
};
use crate::verifier::playbook::{Playbook, PlaybookContext, PlaybookGenerator, PlaybookSource};
use crate::verifier::ranker::RankerCandidate;
use crate::verifier::repository::{
    AnalysisId, AnalysisRepository, ProductAnalysis, RepositoryError,
};
use crate::verifier::service::{AnalysisRequest, VerifierService, VerifierSettings};
use crate::verifier::DisabledPlaybookGenerator;

pub(super) fn candidate(id: &str, pv: f32, om: f32, ec: f32) -> RankerCandidate {
    RankerCandidate {
        id: id.to_string(),
        name: format!("Alternative {id}"),
        url: Some(format!("https://shop.example.com/products/{id}")),
        merchant: format!("merchant-{id}"),
        scores: PillarScores::new(pv, om, ec),
        price: None,
        aov: None,
        cookie_days: Some(30),
        coverage: 0.8,
        risk: 0.2,
        refund_rate: Some(0.02),
        trend_score: 0.0,
        trend_eligible: false,
        program_confidence: None,
        hard_stop_flags: Vec::new(),
    }
}

/// Ten alternatives of decreasing strength; `alt-01` is hard-stopped.
pub(super) fn ten_candidates() -> Vec<RankerCandidate> {
    (0..10)
        .map(|index| {
            let strength = 95.0 - index as f32 * 5.0;
            let mut candidate = candidate(&format!("alt-{index:02}"), strength, strength, strength);
            candidate.price = Some(20.0 + index as f32 * 10.0);
            if index == 1 {
                candidate.scores = PillarScores::new(99.0, 99.0, 99.0);
                candidate.hard_stop_flags = vec!["x".to_string()];
            }
            candidate
        })
        .collect()
}

pub(super) fn category_stats() -> CategoryStats {
    CategoryStats {
        p25_price: 40.0,
        median_price: 70.0,
        p75_price: 110.0,
        median_aov: Some(85.0),
    }
}

pub(super) fn strong_breakdowns() -> ScoreBreakdowns {
    ScoreBreakdowns {
        product_viability: ProductViabilityBreakdown {
            demand_signals: 20.0,
            review_quality: 21.0,
            price_competitiveness: 17.0,
            market_fit: 18.0,
        },
        offer_merchant: OfferMerchantBreakdown {
            reputation: 32.0,
            policies: 20.0,
            trust_signals: 20.0,
        },
        economics: EconomicsBreakdown {
            commission: 26.0,
            cookie_window: 12.0,
            order_value: 16.0,
            program_access: 10.0,
        },
    }
}

pub(super) fn product() -> ScrapedProductData {
    ScrapedProductData {
        title: Some("Ergonomic standing desk".to_string()),
        price: Some(349.0),
        rating: Some(4.6),
        review_count: Some(1250),
        availability: Availability::InStock,
        claims: vec!["Supports up to 150kg".to_string()],
        description: Some("Dual-motor electric standing desk".to_string()),
        has_return_policy: true,
        has_shipping_info: true,
    }
}

pub(super) fn reputation(rating: f32) -> ReputationData {
    ReputationData {
        overall_rating: Some(rating),
        sources: vec![
            ReputationSource {
                source: "trustpilot".to_string(),
                rating: Some(rating),
                review_count: 840,
                last_review_days: Some(2),
                url: None,
            },
            ReputationSource {
                source: "sitejabber".to_string(),
                rating: Some(rating),
                review_count: 120,
                last_review_days: Some(5),
                url: None,
            },
        ],
    }
}

pub(super) fn commission() -> CommissionData {
    CommissionData {
        rate_low: Some(6.0),
        rate_high: Some(9.0),
        cookie_days: Some(30),
        network: Some("Impact".to_string()),
        requires_application: Some(false),
        last_verified_days: Some(3),
    }
}

pub(super) fn request(pv: f32, om: f32, ec: f32) -> AnalysisRequest {
    AnalysisRequest {
        url: "https://www.amazon.de/dp/B08N5WRWNW?tag=abc-21&utm_source=ig".to_string(),
        product: Some(product()),
        reputation: Some(reputation(4.5)),
        commission: Some(commission()),
        category_stats: Some(category_stats()),
        scores: ScoreResult {
            scores: PillarScores::new(pv, om, ec),
            breakdowns: strong_breakdowns(),
        },
        alternatives: ten_candidates(),
    }
}

pub(super) fn build_service() -> (
    VerifierService<MemoryRepository, DisabledPlaybookGenerator>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let service = VerifierService::new(
        repository.clone(),
        Arc::new(DisabledPlaybookGenerator),
        VerifierSettings::default(),
    );
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<AnalysisId, ProductAnalysis>>>,
}

impl AnalysisRepository for MemoryRepository {
    fn insert(&self, analysis: ProductAnalysis) -> Result<ProductAnalysis, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&analysis.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(analysis.id.clone(), analysis.clone());
        Ok(analysis)
    }

    fn fetch(&self, id: &AnalysisId) -> Result<Option<ProductAnalysis>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn recent(&self, limit: usize) -> Result<Vec<ProductAnalysis>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut analyses: Vec<ProductAnalysis> = guard.values().cloned().collect();
        analyses.sort_by(|a, b| b.id.cmp(&a.id));
        analyses.truncate(limit);
        Ok(analyses)
    }
}

pub(super) struct ConflictRepository;

impl AnalysisRepository for ConflictRepository {
    fn insert(&self, _analysis: ProductAnalysis) -> Result<ProductAnalysis, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn fetch(&self, _id: &AnalysisId) -> Result<Option<ProductAnalysis>, RepositoryError> {
        Ok(None)
    }

    fn recent(&self, _limit: usize) -> Result<Vec<ProductAnalysis>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableRepository;

impl AnalysisRepository for UnavailableRepository {
    fn insert(&self, _analysis: ProductAnalysis) -> Result<ProductAnalysis, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &AnalysisId) -> Result<Option<ProductAnalysis>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn recent(&self, _limit: usize) -> Result<Vec<ProductAnalysis>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Generator that always succeeds with a fixed headline.
pub(super) struct CannedGenerator;

impl PlaybookGenerator for CannedGenerator {
    fn try_generate(&self, context: &PlaybookContext) -> Option<Playbook> {
        Some(Playbook {
            source: PlaybookSource::Generated,
            headline: format!("Tailored plan for {}", context.merchant),
            steps: vec!["Draft a comparison post".to_string()],
            success_metrics: Vec::new(),
        })
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}
