use affimark::verifier::{AnalysisId, AnalysisRepository, ProductAnalysis, RepositoryError};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-lifetime store; nothing is evicted.
#[derive(Default, Clone)]
pub(crate) struct InMemoryAnalysisRepository {
    records: Arc<Mutex<HashMap<AnalysisId, ProductAnalysis>>>,
}

impl InMemoryAnalysisRepository {
    fn lock(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<AnalysisId, ProductAnalysis>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

impl AnalysisRepository for InMemoryAnalysisRepository {
    fn insert(&self, analysis: ProductAnalysis) -> Result<ProductAnalysis, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.contains_key(&analysis.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(analysis.id.clone(), analysis.clone());
        Ok(analysis)
    }

    fn fetch(&self, id: &AnalysisId) -> Result<Option<ProductAnalysis>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard.get(id).cloned())
    }

    fn recent(&self, limit: usize) -> Result<Vec<ProductAnalysis>, RepositoryError> {
        let guard = self.lock()?;
        let mut analyses: Vec<ProductAnalysis> = guard.values().cloned().collect();
        analyses.sort_by(|a, b| {
            b.analyzed_at
                .cmp(&a.analyzed_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        analyses.truncate(limit);
        Ok(analyses)
    }
}
