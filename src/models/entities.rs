use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One denormalized source row: field name -> raw string value.
///
/// Multi-valued fields (user_id, review_id, ...) carry comma-joined
/// lists inside a single value; the record parser splits them.
pub type SourceRecord = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    pub product_name: String,
    /// Pipe-delimited category path; the first segment is the primary
    /// grouping key for analytics.
    pub category: Option<String>,
    pub actual_price: Option<f64>,
    pub discounted_price: Option<f64>,
    pub discount_percentage: Option<f64>,
    pub about_product: Option<String>,
    pub img_link: Option<String>,
    pub product_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub user_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub review_id: String,
    pub product_id: String,
    pub user_id: String,
    pub review_title: Option<String>,
    pub review_content: Option<String>,
    /// Clamped into [1.0, 5.0] at ingestion; absent stays absent.
    pub rating: Option<f64>,
    pub sentiment_score: Option<f64>,
    pub sentiment_label: Option<String>,
    /// Character count of review_content, 0 when absent.
    pub review_length: usize,
    pub review_date: Option<NaiveDate>,
}

/// A single entity write produced by the normalizer.
///
/// Emission order matters: the Product of a record comes first, and
/// each User precedes the Review that references it, so applying the
/// upserts in order keeps referential integrity within a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityUpsert {
    Product(Product),
    User(User),
    Review(Review),
}
