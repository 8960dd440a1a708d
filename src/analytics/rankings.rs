use serde::Serialize;
use std::collections::HashMap;

use super::engine::{AggregationEngine, mean};

pub const BEST_VALUE_LIMIT: usize = 5;
pub const CONSISTENCY_LIMIT: usize = 20;
pub const COMPARISON_LIMIT: usize = 30;

/// Multipliers applied to the normalized rating when classifying
/// sentiment/rating divergence. The asymmetry (1.0 above, 0.8 below)
/// is contractual and must not be evened out.
pub const SENTIMENT_HIGHER_MULTIPLIER: f64 = 1.0;
pub const RATING_HIGHER_MULTIPLIER: f64 = 0.8;

#[derive(Debug, Clone, Serialize)]
pub struct BestValueProduct {
    pub product_id: String,
    pub product_name: String,
    pub category: Option<String>,
    pub discounted_price: f64,
    pub avg_rating: f64,
    pub review_count: usize,
    /// (mean rating / discounted price) × 1000
    pub value_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RatingConsistency {
    pub product_id: String,
    pub product_name: String,
    pub category: Option<String>,
    pub avg_rating: f64,
    pub rating_stddev: f64,
    pub review_count: usize,
    pub min_rating: f64,
    pub max_rating: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SentimentComparison {
    pub product_id: String,
    pub product_name: String,
    pub category: Option<String>,
    pub avg_rating: f64,
    pub avg_sentiment: f64,
    pub review_count: usize,
    pub comparison: String,
}

/// Compare the mean sentiment against the mean rating normalized to
/// [0, 1], with asymmetric thresholds.
pub fn classify_comparison(avg_sentiment: f64, avg_rating: f64) -> &'static str {
    let normalized_rating = avg_rating / 5.0;
    if avg_sentiment > normalized_rating * SENTIMENT_HIGHER_MULTIPLIER {
        "Sentiment Higher"
    } else if avg_sentiment < normalized_rating * RATING_HIGHER_MULTIPLIER {
        "Rating Higher"
    } else {
        "Aligned"
    }
}

struct ValueAccumulator {
    product_name: String,
    category: Option<String>,
    discounted_price: f64,
    rating_sum: f64,
    review_count: usize,
}

struct SpreadAccumulator {
    product_name: String,
    category: Option<String>,
    rating_sum: f64,
    rating_square_sum: f64,
    min_rating: f64,
    max_rating: f64,
    review_count: usize,
}

struct SentimentAccumulator {
    product_name: String,
    category: Option<String>,
    rating_sum: f64,
    sentiment_sum: f64,
    review_count: usize,
}

impl<'a> AggregationEngine<'a> {
    /// Whole-dataset ranking by value score, computed over reviews
    /// with a rating on products with a positive discounted price.
    /// Descending value score, tie descending mean rating, then
    /// product id ascending.
    pub fn best_value(&self, limit: usize) -> Vec<BestValueProduct> {
        let mut per_product: HashMap<String, ValueAccumulator> = HashMap::new();

        for entry in self.snapshot {
            let rating = match entry.review.rating {
                Some(rating) => rating,
                None => continue,
            };
            let price = match entry.product.discounted_price {
                Some(price) if price > 0.0 => price,
                _ => continue,
            };

            let accumulator = per_product
                .entry(entry.product.product_id.clone())
                .or_insert_with(|| ValueAccumulator {
                    product_name: entry.product.product_name.clone(),
                    category: entry.product.category.clone(),
                    discounted_price: price,
                    rating_sum: 0.0,
                    review_count: 0,
                });
            accumulator.rating_sum += rating;
            accumulator.review_count += 1;
        }

        let mut rows: Vec<BestValueProduct> = per_product
            .into_iter()
            .map(|(product_id, accumulator)| {
                let avg_rating = mean(accumulator.rating_sum, accumulator.review_count);
                BestValueProduct {
                    product_id,
                    product_name: accumulator.product_name,
                    category: accumulator.category,
                    discounted_price: accumulator.discounted_price,
                    avg_rating,
                    review_count: accumulator.review_count,
                    value_score: (avg_rating / accumulator.discounted_price) * 1000.0,
                }
            })
            .collect();

        rows.sort_by(|a, b| {
            b.value_score
                .total_cmp(&a.value_score)
                .then_with(|| b.avg_rating.total_cmp(&a.avg_rating))
                .then_with(|| a.product_id.cmp(&b.product_id))
        });
        rows.truncate(limit);
        rows
    }

    /// Whole-dataset ranking by population standard deviation of the
    /// rating, most consistent products first. Ascending stddev, tie
    /// descending mean rating, then product id ascending.
    pub fn rating_consistency(&self, limit: usize) -> Vec<RatingConsistency> {
        let mut per_product: HashMap<String, SpreadAccumulator> = HashMap::new();

        for entry in self.snapshot {
            let rating = match entry.review.rating {
                Some(rating) => rating,
                None => continue,
            };

            let accumulator = per_product
                .entry(entry.product.product_id.clone())
                .or_insert_with(|| SpreadAccumulator {
                    product_name: entry.product.product_name.clone(),
                    category: entry.product.category.clone(),
                    rating_sum: 0.0,
                    rating_square_sum: 0.0,
                    min_rating: rating,
                    max_rating: rating,
                    review_count: 0,
                });
            accumulator.rating_sum += rating;
            accumulator.rating_square_sum += rating * rating;
            accumulator.min_rating = accumulator.min_rating.min(rating);
            accumulator.max_rating = accumulator.max_rating.max(rating);
            accumulator.review_count += 1;
        }

        let mut rows: Vec<RatingConsistency> = per_product
            .into_iter()
            .map(|(product_id, accumulator)| {
                let count = accumulator.review_count as f64;
                let avg_rating = accumulator.rating_sum / count;
                let variance =
                    (accumulator.rating_square_sum / count - avg_rating * avg_rating).max(0.0);
                RatingConsistency {
                    product_id,
                    product_name: accumulator.product_name,
                    category: accumulator.category,
                    avg_rating,
                    rating_stddev: variance.sqrt(),
                    review_count: accumulator.review_count,
                    min_rating: accumulator.min_rating,
                    max_rating: accumulator.max_rating,
                }
            })
            .collect();

        rows.sort_by(|a, b| {
            a.rating_stddev
                .total_cmp(&b.rating_stddev)
                .then_with(|| b.avg_rating.total_cmp(&a.avg_rating))
                .then_with(|| a.product_id.cmp(&b.product_id))
        });
        rows.truncate(limit);
        rows
    }

    /// Whole-dataset divergence between mean sentiment and normalized
    /// mean rating, most divergent products first.
    pub fn sentiment_comparison(&self, limit: usize) -> Vec<SentimentComparison> {
        let mut per_product: HashMap<String, SentimentAccumulator> = HashMap::new();

        for entry in self.snapshot {
            let (rating, sentiment) = match (entry.review.rating, entry.review.sentiment_score) {
                (Some(rating), Some(sentiment)) => (rating, sentiment),
                _ => continue,
            };

            let accumulator = per_product
                .entry(entry.product.product_id.clone())
                .or_insert_with(|| SentimentAccumulator {
                    product_name: entry.product.product_name.clone(),
                    category: entry.product.category.clone(),
                    rating_sum: 0.0,
                    sentiment_sum: 0.0,
                    review_count: 0,
                });
            accumulator.rating_sum += rating;
            accumulator.sentiment_sum += sentiment;
            accumulator.review_count += 1;
        }

        let mut rows: Vec<(f64, SentimentComparison)> = per_product
            .into_iter()
            .map(|(product_id, accumulator)| {
                let avg_rating = mean(accumulator.rating_sum, accumulator.review_count);
                let avg_sentiment = mean(accumulator.sentiment_sum, accumulator.review_count);
                let divergence = (avg_sentiment - avg_rating / 5.0).abs();
                let row = SentimentComparison {
                    product_id,
                    product_name: accumulator.product_name,
                    category: accumulator.category,
                    avg_rating,
                    avg_sentiment,
                    review_count: accumulator.review_count,
                    comparison: classify_comparison(avg_sentiment, avg_rating).to_string(),
                };
                (divergence, row)
            })
            .collect();

        rows.sort_by(|a, b| {
            b.0.total_cmp(&a.0)
                .then_with(|| a.1.product_id.cmp(&b.1.product_id))
        });
        rows.truncate(limit);
        rows.into_iter().map(|(_, row)| row).collect()
    }
}
