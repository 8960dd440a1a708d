use crate::storage::JoinedReview;
use serde::Serialize;
use std::collections::HashMap;

use super::buckets::BucketPolicy;

pub const DEFAULT_TOP_K: usize = 5;

/// How the summary rows of a bucketed result are ordered for display.
/// Band buckets render in their fixed ascending order; category
/// buckets are ordered by a computed aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayOrder {
    BandAscending,
    AvgRatingDescending,
    AvgSentimentDescending,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopProduct {
    pub product_id: String,
    pub product_name: String,
    pub avg_rating: f64,
    pub review_count: usize,
}

/// One bucket's summary statistics plus its ranked top-K products.
/// Undefined aggregates (no qualifying rows carrying the value)
/// default to 0.0 rather than propagating an absent marker.
#[derive(Debug, Clone, Serialize)]
pub struct BucketSummary {
    pub bucket: String,
    pub avg_rating: f64,
    pub avg_sentiment: f64,
    pub avg_length: f64,
    pub review_count: usize,
    pub product_count: usize,
    pub top_products: Vec<TopProduct>,
}

/// Pure read computation over a point-in-time Review⋈Product snapshot.
pub struct AggregationEngine<'a> {
    pub(crate) snapshot: &'a [JoinedReview<'a>],
}

impl<'a> AggregationEngine<'a> {
    pub fn new(snapshot: &'a [JoinedReview<'a>]) -> Self {
        AggregationEngine { snapshot }
    }

    /// Group qualifying reviews by the policy's bucketing key, compute
    /// per-bucket summary stats and the ranked top-K products. Buckets
    /// with zero qualifying reviews never appear.
    pub fn bucketed<F>(
        &self,
        policy: BucketPolicy,
        qualifies: F,
        order: DisplayOrder,
        top_k: usize,
    ) -> Vec<BucketSummary>
    where
        F: Fn(&JoinedReview<'_>) -> bool,
    {
        let mut buckets: HashMap<String, BucketAccumulator> = HashMap::new();

        for entry in self.snapshot {
            if !qualifies(entry) {
                continue;
            }
            if let Some((ordinal, label)) = policy.bucket_for(entry) {
                buckets
                    .entry(label)
                    .or_insert_with(|| BucketAccumulator::new(ordinal))
                    .push(entry);
            }
        }

        let mut rows: Vec<(usize, BucketSummary)> = buckets
            .into_iter()
            .map(|(label, accumulator)| {
                let ordinal = accumulator.ordinal;
                (ordinal, accumulator.finish(label, top_k))
            })
            .collect();

        match order {
            DisplayOrder::BandAscending => rows.sort_by(|a, b| a.0.cmp(&b.0)),
            DisplayOrder::AvgRatingDescending => rows.sort_by(|a, b| {
                b.1.avg_rating
                    .total_cmp(&a.1.avg_rating)
                    .then_with(|| a.1.bucket.cmp(&b.1.bucket))
            }),
            DisplayOrder::AvgSentimentDescending => rows.sort_by(|a, b| {
                b.1.avg_sentiment
                    .total_cmp(&a.1.avg_sentiment)
                    .then_with(|| a.1.bucket.cmp(&b.1.bucket))
            }),
        }

        rows.into_iter().map(|(_, summary)| summary).collect()
    }
}

/// Mean over the values seen, 0.0 when none were.
pub(crate) fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 { 0.0 } else { sum / count as f64 }
}

struct ProductAccumulator {
    product_name: String,
    rating_sum: f64,
    rating_count: usize,
    review_count: usize,
}

struct BucketAccumulator {
    ordinal: usize,
    review_count: usize,
    rating_sum: f64,
    rating_count: usize,
    sentiment_sum: f64,
    sentiment_count: usize,
    length_sum: usize,
    products: HashMap<String, ProductAccumulator>,
}

impl BucketAccumulator {
    fn new(ordinal: usize) -> Self {
        BucketAccumulator {
            ordinal,
            review_count: 0,
            rating_sum: 0.0,
            rating_count: 0,
            sentiment_sum: 0.0,
            sentiment_count: 0,
            length_sum: 0,
            products: HashMap::new(),
        }
    }

    fn push(&mut self, entry: &JoinedReview<'_>) {
        self.review_count += 1;
        if let Some(rating) = entry.review.rating {
            self.rating_sum += rating;
            self.rating_count += 1;
        }
        if let Some(sentiment) = entry.review.sentiment_score {
            self.sentiment_sum += sentiment;
            self.sentiment_count += 1;
        }
        self.length_sum += entry.review.review_length;

        let product = self
            .products
            .entry(entry.product.product_id.clone())
            .or_insert_with(|| ProductAccumulator {
                product_name: entry.product.product_name.clone(),
                rating_sum: 0.0,
                rating_count: 0,
                review_count: 0,
            });
        product.review_count += 1;
        if let Some(rating) = entry.review.rating {
            product.rating_sum += rating;
            product.rating_count += 1;
        }
    }

    fn finish(self, label: String, top_k: usize) -> BucketSummary {
        let review_count = self.review_count;
        let product_count = self.products.len();

        let mut top_products: Vec<TopProduct> = self
            .products
            .into_iter()
            .map(|(product_id, accumulator)| TopProduct {
                product_id,
                product_name: accumulator.product_name,
                avg_rating: mean(accumulator.rating_sum, accumulator.rating_count),
                review_count: accumulator.review_count,
            })
            .collect();
        // Rank: mean rating desc, review count desc, product id asc as
        // the deterministic final tie-break.
        top_products.sort_by(|a, b| {
            b.avg_rating
                .total_cmp(&a.avg_rating)
                .then_with(|| b.review_count.cmp(&a.review_count))
                .then_with(|| a.product_id.cmp(&b.product_id))
        });
        top_products.truncate(top_k);

        BucketSummary {
            bucket: label,
            avg_rating: mean(self.rating_sum, self.rating_count),
            avg_sentiment: mean(self.sentiment_sum, self.sentiment_count),
            avg_length: mean(self.length_sum as f64, review_count),
            review_count,
            product_count,
            top_products,
        }
    }
}
