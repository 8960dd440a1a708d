use serde::Serialize;

use crate::storage::JoinedReview;

use super::buckets::BucketPolicy;
use super::engine::{AggregationEngine, BucketSummary, DisplayOrder};
use super::rankings::{
    BEST_VALUE_LIMIT, BestValueProduct, COMPARISON_LIMIT, CONSISTENCY_LIMIT, RatingConsistency,
    SentimentComparison,
};

/// The named analytic requests exposed to callers. Each maps to a
/// bucketing policy plus qualifying predicate, or to one of the
/// whole-dataset rankings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticsRequest {
    TopRatedByCategory,
    SentimentByCategory,
    SentimentByPriceRange,
    DiscountReviewQuality,
    ReviewLengthRating,
    BestValueProducts,
    RatingVariance,
    SentimentRatingComparison,
}

impl AnalyticsRequest {
    pub const ALL: [AnalyticsRequest; 8] = [
        AnalyticsRequest::TopRatedByCategory,
        AnalyticsRequest::SentimentByCategory,
        AnalyticsRequest::SentimentByPriceRange,
        AnalyticsRequest::DiscountReviewQuality,
        AnalyticsRequest::ReviewLengthRating,
        AnalyticsRequest::BestValueProducts,
        AnalyticsRequest::RatingVariance,
        AnalyticsRequest::SentimentRatingComparison,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AnalyticsRequest::TopRatedByCategory => "top-rated-by-category",
            AnalyticsRequest::SentimentByCategory => "sentiment-by-category",
            AnalyticsRequest::SentimentByPriceRange => "sentiment-by-price-range",
            AnalyticsRequest::DiscountReviewQuality => "discount-review-quality",
            AnalyticsRequest::ReviewLengthRating => "review-length-rating",
            AnalyticsRequest::BestValueProducts => "best-value-products",
            AnalyticsRequest::RatingVariance => "rating-variance",
            AnalyticsRequest::SentimentRatingComparison => "sentiment-rating-comparison",
        }
    }
}

/// Engine output for one request, ready for serialization.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AnalyticsResponse {
    Buckets(Vec<BucketSummary>),
    BestValue(Vec<BestValueProduct>),
    Consistency(Vec<RatingConsistency>),
    Comparison(Vec<SentimentComparison>),
}

/// Thin mapping from named requests to engine invocations.
pub struct QueryFacade<'a> {
    engine: AggregationEngine<'a>,
    top_k: usize,
}

impl<'a> QueryFacade<'a> {
    pub fn new(snapshot: &'a [JoinedReview<'a>], top_k: usize) -> Self {
        QueryFacade {
            engine: AggregationEngine::new(snapshot),
            top_k,
        }
    }

    pub fn run(&self, request: AnalyticsRequest) -> AnalyticsResponse {
        match request {
            AnalyticsRequest::TopRatedByCategory => AnalyticsResponse::Buckets(
                self.engine.bucketed(
                    BucketPolicy::Category,
                    has_category,
                    DisplayOrder::AvgRatingDescending,
                    self.top_k,
                ),
            ),
            AnalyticsRequest::SentimentByCategory => AnalyticsResponse::Buckets(
                self.engine.bucketed(
                    BucketPolicy::Category,
                    |entry| has_category(entry) && entry.review.sentiment_score.is_some(),
                    DisplayOrder::AvgSentimentDescending,
                    self.top_k,
                ),
            ),
            AnalyticsRequest::SentimentByPriceRange => AnalyticsResponse::Buckets(
                self.engine.bucketed(
                    BucketPolicy::PriceRange,
                    |entry| {
                        entry.product.discounted_price.is_some()
                            && entry.review.sentiment_score.is_some()
                    },
                    DisplayOrder::BandAscending,
                    self.top_k,
                ),
            ),
            AnalyticsRequest::DiscountReviewQuality => AnalyticsResponse::Buckets(
                self.engine.bucketed(
                    BucketPolicy::DiscountRange,
                    |entry| {
                        entry.product.discount_percentage.is_some()
                            && entry.review.rating.is_some()
                    },
                    DisplayOrder::BandAscending,
                    self.top_k,
                ),
            ),
            AnalyticsRequest::ReviewLengthRating => AnalyticsResponse::Buckets(
                self.engine.bucketed(
                    BucketPolicy::ReviewLength,
                    |entry| entry.review.rating.is_some(),
                    DisplayOrder::BandAscending,
                    self.top_k,
                ),
            ),
            AnalyticsRequest::BestValueProducts => {
                AnalyticsResponse::BestValue(self.engine.best_value(BEST_VALUE_LIMIT))
            }
            AnalyticsRequest::RatingVariance => {
                AnalyticsResponse::Consistency(self.engine.rating_consistency(CONSISTENCY_LIMIT))
            }
            AnalyticsRequest::SentimentRatingComparison => {
                AnalyticsResponse::Comparison(self.engine.sentiment_comparison(COMPARISON_LIMIT))
            }
        }
    }
}

fn has_category(entry: &JoinedReview<'_>) -> bool {
    entry
        .product
        .category
        .as_deref()
        .is_some_and(|category| !category.is_empty())
}
