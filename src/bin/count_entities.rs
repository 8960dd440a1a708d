use anyhow::Result;
use review_pipeline::config::PipelineConfig;
use review_pipeline::processor::{EntityNormalizer, FieldResolver};
use review_pipeline::source;
use review_pipeline::storage::EntityStore;
use std::env;

fn main() -> Result<()> {
    let config_path = env::args()
        .nth(1)
        .unwrap_or_else(|| "src/configs/pipeline.toml".to_string());
    let config = PipelineConfig::from_file(&config_path)?;

    println!("Analyzing configured sources...\n");

    let resolver = FieldResolver::new();
    let normalizer = EntityNormalizer::new();
    let mut store = EntityStore::new();

    let mut total_records = 0;
    let mut total_rejected = 0;

    for entry in &config.sources {
        let records = match source::load_source(entry) {
            Ok(records) => records,
            Err(e) => {
                println!("❌ {}: failed to load ({})", entry.name, e);
                continue;
            }
        };

        let mut rejected = 0;
        let mut review_lists = 0;
        for record in &records {
            let canonical = resolver.canonicalize(record);
            if canonical
                .get("review_id")
                .map(|ids| !ids.trim().is_empty())
                .unwrap_or(false)
            {
                review_lists += 1;
            }
            match normalizer.normalize_record(&canonical) {
                Ok(upserts) => store.apply(upserts),
                Err(_) => rejected += 1,
            }
        }

        println!(
            "Source {}: {} records ({} with reviews, {} rejected)",
            entry.name,
            records.len(),
            review_lists,
            rejected
        );
        total_records += records.len();
        total_rejected += rejected;
    }

    println!("\n=== SUMMARY ===");
    println!("Total records read: {}", total_records);
    println!("Total records rejected: {}", total_rejected);
    println!("Products stored: {}", store.product_count());
    println!("Users stored: {}", store.user_count());
    println!("Reviews stored: {}", store.review_count());

    let joined = store.joined_reviews();
    println!("Joined reviews available to analytics: {}", joined.len());

    if joined.len() == store.review_count() {
        println!("✅ Every stored review resolves to its product");
    } else {
        println!(
            "⚠️  {} reviews reference a product missing from the store",
            store.review_count() - joined.len()
        );
    }

    Ok(())
}
