//! Product verifier: decides whether a product is worth promoting and which
//! alternatives to surface instead.
//!
//! Stages run leaves first: URL normalization, coverage and evidence, the
//! verdict, intent routing, then ranking and bucketing of alternatives. Every
//! stage is a pure function over its inputs; only [`VerifierService`] touches
//! storage.

pub mod bucketizer;
pub mod coverage;
pub mod domain;
pub mod evidence;
pub mod export;
pub mod intent;
pub mod normalizer;
pub mod playbook;
pub mod ranker;
pub mod repository;
pub mod router;
pub mod service;
pub mod verdict;

#[cfg(test)]
mod tests;

pub use bucketizer::{bucketize, Bucket, BucketKind, BucketizerConfig, BucketizerOutput};
pub use coverage::{calculate_coverage, CoverageInput, CoverageResult, DataQuality, PillarCoverage};
pub use domain::{
    Availability, CategoryStats, CommissionData, ConfidenceLevel, EconomicsBreakdown,
    OfferMerchantBreakdown, Pillar, PillarScores, ProductViabilityBreakdown, ReputationData,
    ReputationSource, ScoreBreakdowns, ScoreResult, ScrapedProductData,
};
pub use evidence::{
    EvidenceBuilder, EvidenceQuality, EvidenceSource, EvidenceSourceKind, EvidenceSummary,
};
pub use export::{alternatives_csv, ExportError};
pub use intent::{
    avoid_cause, rank_mode_from_weakest_pillar, route_intent, weakest_pillar, weights_for_mode,
    AvoidCause, BucketStrategy, IntentRouterInput, IntentRouterOutput, PrimaryRoute, RankMode,
    RankWeights,
};
pub use normalizer::{normalize_url, NormalizedUrl, Platform};
pub use playbook::{
    fallback_playbook, playbook_for, DisabledPlaybookGenerator, Playbook, PlaybookContext,
    PlaybookGenerator, PlaybookSource,
};
pub use ranker::{
    rank_alternatives, AlternativeTag, RankedAlternative, RankerCandidate, RankerOutput,
};
pub use repository::{
    AnalysisId, AnalysisRepository, AnalysisSummaryView, ProductAnalysis, RepositoryError,
    StoredBucket,
};
pub use router::verifier_router;
pub use service::{AnalysisRequest, VerifierService, VerifierServiceError, VerifierSettings};
pub use verdict::{
    HardStopFlag, PrimaryAction, Pro, Risk, VerdictConfig, VerdictEngine, VerdictInput,
    VerdictResult, VerdictStatus,
};
