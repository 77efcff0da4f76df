use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::bucketizer::{BucketKind, BucketizerOutput};
use super::coverage::CoverageResult;
use super::evidence::EvidenceSummary;
use super::intent::IntentRouterOutput;
use super::normalizer::NormalizedUrl;
use super::playbook::Playbook;
use super::ranker::RankedAlternative;
use super::verdict::{PrimaryAction, VerdictResult, VerdictStatus};

/// Identifier wrapper for stored analyses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnalysisId(pub String);

impl std::fmt::Display for AnalysisId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bucket contents stored as alternative ids so the record owns its data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBucket {
    pub kind: BucketKind,
    pub label: String,
    pub item_ids: Vec<String>,
}

/// Persisted outcome of one verifier run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductAnalysis {
    pub id: AnalysisId,
    pub analyzed_at: DateTime<Utc>,
    pub url: NormalizedUrl,
    pub evidence: EvidenceSummary,
    pub coverage: CoverageResult,
    pub verdict: VerdictResult,
    pub intent: IntentRouterOutput,
    pub ranked: Vec<RankedAlternative>,
    pub winner_id: Option<String>,
    pub buckets: Vec<StoredBucket>,
    pub overflow_ids: Vec<String>,
    pub playbook: Playbook,
}

impl ProductAnalysis {
    pub(crate) fn store_buckets(output: &BucketizerOutput<'_>) -> (Vec<StoredBucket>, Vec<String>) {
        let buckets = output
            .buckets
            .iter()
            .map(|bucket| StoredBucket {
                kind: bucket.kind,
                label: bucket.label.to_string(),
                item_ids: bucket.items.iter().map(|item| item.id().to_string()).collect(),
            })
            .collect();
        let overflow = output
            .overflow
            .iter()
            .map(|item| item.id().to_string())
            .collect();
        (buckets, overflow)
    }

    pub fn winner(&self) -> Option<&RankedAlternative> {
        let id = self.winner_id.as_deref()?;
        self.ranked.iter().find(|alternative| alternative.id() == id)
    }

    pub fn summary_view(&self) -> AnalysisSummaryView {
        AnalysisSummaryView {
            analysis_id: self.id.clone(),
            analyzed_at: self.analyzed_at,
            url: self.url.normalized.clone(),
            merchant: self.url.merchant.clone(),
            status: self.verdict.status,
            primary_action: self.verdict.primary_action,
            coverage: self.coverage.overall_score,
            winner_id: self.winner_id.clone(),
        }
    }
}

/// Storage abstraction so the service can be exercised without a database.
pub trait AnalysisRepository: Send + Sync {
    fn insert(&self, analysis: ProductAnalysis) -> Result<ProductAnalysis, RepositoryError>;
    fn fetch(&self, id: &AnalysisId) -> Result<Option<ProductAnalysis>, RepositoryError>;
    /// Most recent analyses first.
    fn recent(&self, limit: usize) -> Result<Vec<ProductAnalysis>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("analysis already exists")]
    Conflict,
    #[error("analysis not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Listing row for recent analyses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSummaryView {
    pub analysis_id: AnalysisId,
    pub analyzed_at: DateTime<Utc>,
    pub url: String,
    pub merchant: String,
    pub status: VerdictStatus,
    pub primary_action: PrimaryAction,
    pub coverage: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_id: Option<String>,
}
