use anyhow::Result;
use review_pipeline::analytics::{AnalyticsRequest, QueryFacade};
use review_pipeline::processor::{EntityNormalizer, FieldResolver};
use review_pipeline::source::JsonSource;
use review_pipeline::storage::EntityStore;
use serde_json::json;

fn main() -> Result<()> {
    println!("=== TESTING ANALYTICS QUERIES ===\n");

    // Create test data covering several categories, price bands and
    // review lengths
    let test_data = vec![
        json!({
            "product_id": "B001",
            "product_name": "Braided USB-C Cable",
            "category": "Electronics,Cables,USB",
            "actual_price_usd": "24.99",
            "discounted_price_usd": "9.99",
            "discount_percentage": "60% off",
            "user_id": "u1,u2,u3",
            "user_name": "Asha,Bilal,Chen",
            "review_id": "r1,r2,r3",
            "review_title": "Great,Solid,Works",
            "review_content": "Charges fast and feels durable,Good for the price,Does the job",
            "rating": "4.6",
            "sentiment_score": "0.91",
            "sentiment_label": "positive"
        }),
        json!({
            "product_id": "B002",
            "product_name": "Stainless Electric Kettle",
            "category": "Home,Kitchen",
            "actual_price_usd": "89.99",
            "discounted_price_usd": "59.99",
            "discount_percentage": "33%",
            "user_id": "u4",
            "user_name": "Dana",
            "review_id": "r4,r5",
            "review_title": "Boils fast,Lid issue",
            "review_content": "Boils a full liter in under three minutes which is quicker than the old stovetop kettle we replaced,The lid hinge started squeaking after two weeks",
            "rating": "3.9",
            "sentiment_score": "0.55",
            "sentiment_label": "neutral"
        }),
        json!({
            "product_id": "B003",
            "product_name": "4K HDMI Switch",
            "category": "Electronics,Video",
            "actual_price_usd": "349.00",
            "discounted_price_usd": "299.00",
            "discount_percentage": "14",
            "user_id": "u5",
            "user_name": "Elif",
            "review_id": "r6",
            "review_title": "Pricey but reliable",
            "review_content": "No signal drops after a month of daily use",
            "rating": "4.9",
            "sentiment_score": "0.97",
            "sentiment_label": "positive"
        }),
        json!({
            "product_id": "B004",
            "product_name": "Basic HDMI Cable",
            "category": "Electronics,Cables",
            "actual_price_usd": "12.00",
            "discounted_price_usd": "6.00",
            "discount_percentage": "50",
            "review_id": "",
            "rating": "4.0"
        }),
    ];

    // Run the full pipeline: flatten -> canonicalize -> normalize
    let records = JsonSource::new().records(&test_data);
    println!("1. Flattened {} JSON items into records", records.len());

    let resolver = FieldResolver::new();
    let normalizer = EntityNormalizer::new();
    let mut store = EntityStore::new();

    let mut rejected = 0;
    for record in &records {
        let canonical = resolver.canonicalize(record);
        match normalizer.normalize_record(&canonical) {
            Ok(upserts) => store.apply(upserts),
            Err(e) => {
                rejected += 1;
                println!("   Rejected record: {}", e);
            }
        }
    }

    println!(
        "2. Normalized into {} products, {} users, {} reviews ({} rejected)\n",
        store.product_count(),
        store.user_count(),
        store.review_count(),
        rejected
    );

    // Run every named analytics request and print the JSON output
    let snapshot = store.joined_reviews();
    let facade = QueryFacade::new(&snapshot, 5);

    for request in AnalyticsRequest::ALL {
        let response = facade.run(request);
        println!("--- {} ---", request.name());
        println!("{}\n", serde_json::to_string_pretty(&response)?);
    }

    // Passthrough queries over the store
    println!("--- product search: \"hdmi cable\" ---");
    for hit in store.search_products("hdmi cable", 20) {
        println!(
            "  {} {} (avg {:.2}, {} reviews)",
            hit.product_id, hit.product_name, hit.avg_rating, hit.review_count
        );
    }

    println!("\n--- reviews for B002 ---");
    let page = store.product_reviews("B002", 5, 0);
    for review in &page.reviews {
        println!(
            "  {} [{:.1}] {}",
            review.review_id,
            review.rating,
            review.review_title.as_deref().unwrap_or("-")
        );
    }
    println!("  total: {}, has_more: {}", page.total, page.has_more);

    println!("\n✅ Analytics query run completed");
    Ok(())
}
