use anyhow::{Context, Result, anyhow};
use review_pipeline::analytics::{AnalyticsRequest, QueryFacade};
use review_pipeline::config::{PipelineConfig, SourceEntry};
use review_pipeline::processor::{EntityNormalizer, FieldResolver};
use review_pipeline::source;
use review_pipeline::storage::{EntityStore, ReportWriter};
use std::env;
use std::path::Path;
use tracing::{error, info, warn};

const DEFAULT_CONFIG_PATH: &str = "src/configs/pipeline.toml";

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();

    let config_path = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    if !Path::new(&config_path).exists() {
        return Err(anyhow!("Pipeline config not found: {}", config_path));
    }

    let config = PipelineConfig::from_file(&config_path)
        .context("Failed to load pipeline configuration")?;

    info!("🚀 Starting Review Analytics Pipeline: {}", config.pipeline.name);

    // Initialize shared components
    let resolver = FieldResolver::new();
    let normalizer = EntityNormalizer::new();
    let mut store = EntityStore::new();

    // Normalize each source into the shared entity store
    let mut total_records = 0;
    let mut successful_sources = 0;

    for entry in &config.sources {
        info!("\n=== Processing Source: {} ===", entry.name);

        match process_single_source(entry, &resolver, &normalizer, &mut store) {
            Ok(records_count) => {
                info!(
                    "✅ Successfully normalized {} records from {}",
                    records_count, entry.name
                );
                total_records += records_count;
                successful_sources += 1;
            }
            Err(e) => {
                error!("❌ Failed to process {}: {}", entry.name, e);
                // Continue with other sources even if one fails
            }
        }
    }

    info!("\n=== Normalization Summary ===");
    info!(
        "✅ Successfully processed {} out of {} sources",
        successful_sources,
        config.sources.len()
    );
    info!(
        "📊 {} records normalized into {} products, {} users, {} reviews",
        total_records,
        store.product_count(),
        store.user_count(),
        store.review_count()
    );

    if successful_sources == 0 {
        warn!("⚠️ No sources were processed successfully");
        return Ok(());
    }

    // Analytics pass over the normalized snapshot
    let snapshot = store.joined_reviews();
    info!("Running analytics over {} joined reviews", snapshot.len());

    let facade = QueryFacade::new(&snapshot, config.top_k());
    let writer = ReportWriter::new(&config.pipeline.report_dir);

    for request in AnalyticsRequest::ALL {
        let response = facade.run(request);
        writer
            .write_report(request.name(), &response)
            .with_context(|| format!("Failed to store {} report", request.name()))?;
    }

    info!("🎉 Review analytics pipeline completed successfully!");

    Ok(())
}

fn process_single_source(
    entry: &SourceEntry,
    resolver: &FieldResolver,
    normalizer: &EntityNormalizer,
    store: &mut EntityStore,
) -> Result<usize> {
    let records = source::load_source(entry)?;
    let records_count = records.len();

    if records_count == 0 {
        warn!("No records loaded from {}", entry.name);
        return Ok(0);
    }

    info!("Loaded {} records from {}", records_count, entry.name);

    let mut rejected_count = 0;
    for record in &records {
        let canonical = resolver.canonicalize(record);
        match normalizer.normalize_record(&canonical) {
            Ok(upserts) => store.apply(upserts),
            Err(e) => {
                rejected_count += 1;
                warn!("Rejected record: {}", e);
            }
        }
    }

    if rejected_count > 0 {
        warn!(
            "{} of {} records rejected from {}",
            rejected_count, records_count, entry.name
        );
    }

    Ok(records_count)
}
