use serde::Serialize;

use super::repository::ProductAnalysis;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv output is not valid utf-8")]
    Encoding(#[from] std::string::FromUtf8Error),
    #[error("failed to flush csv output: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Serialize)]
struct AlternativeRow<'a> {
    position: usize,
    id: &'a str,
    name: &'a str,
    merchant: &'a str,
    url: &'a str,
    rank_score: u8,
    bucket: &'a str,
    winner: bool,
    winner_eligible: bool,
    product_viability: f32,
    offer_merchant: f32,
    economics: f32,
    price: Option<f32>,
    tags: String,
}

/// Render the ranked alternatives of an analysis as CSV, one row per alternative.
pub fn alternatives_csv(analysis: &ProductAnalysis) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    for (index, alternative) in analysis.ranked.iter().enumerate() {
        let id = alternative.id();
        let bucket = analysis
            .buckets
            .iter()
            .find(|bucket| bucket.item_ids.iter().any(|item| item == id))
            .map(|bucket| bucket.label.as_str())
            .unwrap_or_default();
        let tags = alternative
            .tags
            .iter()
            .map(|tag| tag.as_str())
            .collect::<Vec<_>>()
            .join("|");

        let candidate = &alternative.candidate;
        writer.serialize(AlternativeRow {
            position: index + 1,
            id,
            name: &candidate.name,
            merchant: &candidate.merchant,
            url: candidate.url.as_deref().unwrap_or_default(),
            rank_score: alternative.rank_score,
            bucket,
            winner: analysis.winner_id.as_deref() == Some(id),
            winner_eligible: alternative.winner_eligible,
            product_viability: candidate.scores.product_viability,
            offer_merchant: candidate.scores.offer_merchant,
            economics: candidate.scores.economics,
            price: candidate.price,
            tags,
        })?;
    }

    writer.flush()?;
    let bytes = writer.into_inner().map_err(|error| error.into_error())?;
    Ok(String::from_utf8(bytes)?)
}
