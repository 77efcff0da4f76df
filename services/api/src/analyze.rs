use crate::infra::InMemoryAnalysisRepository;
use affimark::config::VerifierConfig;
use affimark::error::AppError;
use affimark::verifier::{
    normalize_url, AnalysisRequest, DisabledPlaybookGenerator, ProductAnalysis, VerifierService,
};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct AnalyzeArgs {
    /// JSON file containing the analysis request
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Print the ranked alternatives as CSV after the summary
    #[arg(long)]
    pub(crate) csv: bool,
    /// Print the full analysis as JSON instead of the summary
    #[arg(long)]
    pub(crate) json: bool,
    /// Alternatives shown per bucket
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(1..=10))]
    pub(crate) items_per_bucket: u8,
}

#[derive(Args, Debug)]
pub(crate) struct NormalizeArgs {
    /// Product URL to normalize
    pub(crate) url: String,
}

pub(crate) fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let AnalyzeArgs {
        input,
        csv,
        json,
        items_per_bucket,
    } = args;

    let raw = std::fs::read_to_string(input)?;
    let request: AnalysisRequest = serde_json::from_str(&raw)?;

    let settings = VerifierConfig {
        items_per_bucket: usize::from(items_per_bucket),
    }
    .settings();
    let service = VerifierService::new(
        Arc::new(InMemoryAnalysisRepository::default()),
        Arc::new(DisabledPlaybookGenerator),
        settings,
    );

    let analysis = service.analyze(request)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        render_analysis(&analysis);
    }

    if csv {
        let export = service.export_alternatives(&analysis.id)?;
        println!("\n{export}");
    }

    Ok(())
}

pub(crate) fn run_normalize(args: NormalizeArgs) -> Result<(), AppError> {
    let normalized = normalize_url(&args.url);
    println!("{}", serde_json::to_string_pretty(&normalized)?);
    Ok(())
}

fn render_analysis(analysis: &ProductAnalysis) {
    println!("Product verifier analysis {}", analysis.id);
    println!(
        "URL: {} ({:?}, merchant {})",
        analysis.url.normalized, analysis.url.platform, analysis.url.merchant
    );
    println!(
        "Verdict: {} -> {}",
        analysis.verdict.status.as_str(),
        analysis.verdict.primary_action.as_str()
    );
    println!(
        "Evidence: {} sources, {} data points, confidence {}",
        analysis.evidence.source_count,
        analysis.evidence.total_data_points,
        analysis.evidence.confidence.label()
    );
    println!(
        "Coverage: {:.0}% | {}",
        analysis.coverage.overall_score * 100.0,
        analysis.coverage.recommendation
    );

    if !analysis.verdict.hard_stop_flags.is_empty() {
        println!("Hard stops: {}", analysis.verdict.flag_names().join(", "));
    }

    if !analysis.verdict.top_pros.is_empty() {
        println!("\nPros");
        for pro in &analysis.verdict.top_pros {
            println!("- {} ({})", pro.text, pro.score);
        }
    }
    if !analysis.verdict.top_risks.is_empty() {
        println!("\nRisks");
        for risk in &analysis.verdict.top_risks {
            println!("- {} (severity {})", risk.text, risk.severity);
        }
    }

    println!(
        "\nAlternatives ranked in {} mode",
        analysis.intent.rank_mode.as_str()
    );
    if let Some(banner) = &analysis.intent.banner {
        println!("{banner}");
    }
    match analysis.winner() {
        Some(winner) => println!(
            "Winner: {} ({}, score {})",
            winner.candidate.name, winner.candidate.merchant, winner.rank_score
        ),
        None => println!("Winner: none"),
    }
    for bucket in &analysis.buckets {
        println!("- {}: {}", bucket.label, bucket.item_ids.join(", "));
    }
    if !analysis.overflow_ids.is_empty() {
        println!("- Other: {}", analysis.overflow_ids.join(", "));
    }

    println!("\nPlaybook: {}", analysis.playbook.headline);
    for step in &analysis.playbook.steps {
        println!("- {step}");
    }
}
