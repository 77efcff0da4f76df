use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::bucketizer::{bucketize, BucketizerConfig};
use super::coverage::{calculate_coverage, CoverageInput};
use super::domain::{
    CategoryStats, CommissionData, Pillar, ReputationData, ScoreResult, ScrapedProductData,
};
use super::evidence::EvidenceBuilder;
use super::export::{alternatives_csv, ExportError};
use super::intent::{route_intent, IntentRouterInput};
use super::normalizer::normalize_url;
use super::playbook::{playbook_for, PlaybookContext, PlaybookGenerator, PlaybookSource};
use super::ranker::{rank_alternatives, RankerCandidate};
use super::repository::{AnalysisId, AnalysisRepository, ProductAnalysis, RepositoryError};
use super::verdict::{VerdictConfig, VerdictEngine, VerdictInput};

/// Tunables for one service instance.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifierSettings {
    pub items_per_bucket: usize,
    pub verdict: VerdictConfig,
}

impl Default for VerifierSettings {
    fn default() -> Self {
        Self {
            items_per_bucket: 3,
            verdict: VerdictConfig::default(),
        }
    }
}

/// Everything known about one product URL plus the alternatives to weigh against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub url: String,
    #[serde(default)]
    pub product: Option<ScrapedProductData>,
    #[serde(default)]
    pub reputation: Option<ReputationData>,
    #[serde(default)]
    pub commission: Option<CommissionData>,
    #[serde(default)]
    pub category_stats: Option<CategoryStats>,
    pub scores: ScoreResult,
    #[serde(default)]
    pub alternatives: Vec<RankerCandidate>,
}

/// Service running the verifier pipeline and persisting each analysis.
pub struct VerifierService<R, G> {
    repository: Arc<R>,
    generator: Arc<G>,
    verdicts: Arc<VerdictEngine>,
    items_per_bucket: usize,
}

static ANALYSIS_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_analysis_id() -> AnalysisId {
    let id = ANALYSIS_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AnalysisId(format!("ana-{id:06}"))
}

fn validate(request: &AnalysisRequest) -> Result<(), VerifierServiceError> {
    if request.url.trim().is_empty() {
        return Err(VerifierServiceError::InvalidRequest(
            "url must not be empty".to_string(),
        ));
    }

    let pillar_in_range = |score: f32| (0.0..=100.0).contains(&score);
    if let Some(pillar) = Pillar::ALL
        .into_iter()
        .find(|pillar| !pillar_in_range(request.scores.scores.get(*pillar)))
    {
        return Err(VerifierServiceError::InvalidRequest(format!(
            "{} score must be between 0 and 100",
            pillar.label()
        )));
    }

    if let Some(candidate) = request.alternatives.iter().find(|candidate| {
        Pillar::ALL
            .into_iter()
            .any(|pillar| !pillar_in_range(candidate.scores.get(pillar)))
    }) {
        return Err(VerifierServiceError::InvalidRequest(format!(
            "alternative {} has a score outside 0-100",
            candidate.id
        )));
    }

    Ok(())
}

impl<R, G> VerifierService<R, G>
where
    R: AnalysisRepository + 'static,
    G: PlaybookGenerator + 'static,
{
    pub fn new(repository: Arc<R>, generator: Arc<G>, settings: VerifierSettings) -> Self {
        Self {
            repository,
            generator,
            verdicts: Arc::new(VerdictEngine::new(settings.verdict)),
            items_per_bucket: settings.items_per_bucket,
        }
    }

    /// Run every pipeline stage for one request and store the result.
    pub fn analyze(
        &self,
        request: AnalysisRequest,
    ) -> Result<ProductAnalysis, VerifierServiceError> {
        validate(&request)?;

        let url = normalize_url(&request.url);
        debug!(
            merchant = %url.merchant,
            platform = ?url.platform,
            product_page = url.is_product_page,
            "normalized url"
        );

        let mut builder = EvidenceBuilder::new();
        if let Some(product) = &request.product {
            builder.add_product_page_evidence(product, Some(&url.normalized));
        }
        if let Some(reputation) = &request.reputation {
            builder.add_reputation_evidence(reputation);
        }
        if let Some(commission) = &request.commission {
            builder.add_affiliate_db_evidence(commission);
        }
        let evidence = builder.summary();
        debug!(
            sources = evidence.source_count,
            data_points = evidence.total_data_points,
            confidence = evidence.confidence.label(),
            "evidence summarized"
        );

        let coverage = calculate_coverage(&CoverageInput::from_sources(
            request.product.as_ref(),
            request.reputation.as_ref(),
            request.commission.as_ref(),
            request.category_stats.as_ref(),
        ));
        debug!(
            overall = coverage.overall_score,
            missing = coverage.missing_signals.len(),
            "coverage calculated"
        );

        let verdict = self.verdicts.evaluate(&VerdictInput {
            score: &request.scores,
            confidence: evidence.confidence,
            evidence_points: evidence.total_data_points,
            product: request.product.as_ref(),
            reputation: request.reputation.as_ref(),
            commission: request.commission.as_ref(),
        });

        let intent = route_intent(&IntentRouterInput {
            verdict: verdict.status,
            scores: request.scores.scores,
            confidence: evidence.confidence,
            coverage: coverage.overall_score,
            hard_stop_flags: verdict.flag_names(),
        });
        debug!(
            route = ?intent.primary_route,
            rank_mode = intent.rank_mode.as_str(),
            suppress_winner = intent.suppress_winner,
            "intent routed"
        );

        let ranking = rank_alternatives(
            request.alternatives,
            intent.rank_mode,
            request.category_stats.as_ref(),
        );
        let winner = if intent.suppress_winner {
            None
        } else {
            ranking.winner()
        };

        let bucketed = bucketize(
            &ranking.ranked,
            winner,
            &BucketizerConfig {
                items_per_bucket: self.items_per_bucket,
                bucket_strategy: intent.bucket_strategy,
                show_trending: intent.show_trending,
            },
        );
        let (buckets, overflow_ids) = ProductAnalysis::store_buckets(&bucketed);
        let winner_id = winner.map(|alternative| alternative.id().to_string());
        let winner_name = winner.map(|alternative| alternative.candidate.name.clone());
        debug!(
            ranked = ranking.ranked.len(),
            bucketed = bucketed.bucketed_count(),
            overflow = overflow_ids.len(),
            "alternatives bucketed"
        );

        let context = PlaybookContext {
            merchant: url.merchant.clone(),
            status: verdict.status,
            primary_action: verdict.primary_action,
            weakest_pillar: request.scores.scores.weakest().0,
            rank_mode: intent.rank_mode,
            winner_name,
            top_risks: verdict
                .top_risks
                .iter()
                .map(|risk| risk.text.clone())
                .collect(),
        };
        let playbook = playbook_for(self.generator.as_ref(), &context);
        if playbook.source == PlaybookSource::Fallback {
            if self.generator.is_enabled() {
                warn!(merchant = %url.merchant, "playbook generator declined, using fallback");
            } else {
                debug!(
                    merchant = %url.merchant,
                    "no playbook generator configured, using fallback"
                );
            }
        }

        let analysis = ProductAnalysis {
            id: next_analysis_id(),
            analyzed_at: Utc::now(),
            url,
            evidence,
            coverage,
            verdict,
            intent,
            ranked: ranking.ranked,
            winner_id,
            buckets,
            overflow_ids,
            playbook,
        };

        let stored = self.repository.insert(analysis)?;
        info!(
            analysis_id = %stored.id,
            status = stored.verdict.status.as_str(),
            action = stored.verdict.primary_action.as_str(),
            rank_mode = stored.intent.rank_mode.as_str(),
            "product analysis stored"
        );
        Ok(stored)
    }

    /// Fetch a stored analysis.
    pub fn get(&self, analysis_id: &AnalysisId) -> Result<ProductAnalysis, VerifierServiceError> {
        let analysis = self
            .repository
            .fetch(analysis_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(analysis)
    }

    pub fn recent(&self, limit: usize) -> Result<Vec<ProductAnalysis>, VerifierServiceError> {
        Ok(self.repository.recent(limit)?)
    }

    /// CSV of the ranked alternatives for a stored analysis.
    pub fn export_alternatives(
        &self,
        analysis_id: &AnalysisId,
    ) -> Result<String, VerifierServiceError> {
        let analysis = self.get(analysis_id)?;
        Ok(alternatives_csv(&analysis)?)
    }
}

/// Error raised by the verifier service.
#[derive(Debug, thiserror::Error)]
pub enum VerifierServiceError {
    #[error("invalid analysis request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Export(#[from] ExportError),
}
