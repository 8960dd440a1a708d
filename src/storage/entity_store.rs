use crate::models::{EntityUpsert, Product, Review, User};
use serde::Serialize;
use std::collections::HashMap;

/// A review joined to its owning product, the engine's input row.
#[derive(Debug, Clone, Copy)]
pub struct JoinedReview<'a> {
    pub review: &'a Review,
    pub product: &'a Product,
}

/// In-memory entity store keyed by natural keys.
///
/// Upserts are insert-or-overwrite: the new value replaces every
/// non-key field, with no field-level merge, so re-applying the same
/// upserts is idempotent and convergent.
#[derive(Debug, Default)]
pub struct EntityStore {
    products: HashMap<String, Product>,
    users: HashMap<String, User>,
    reviews: HashMap<String, Review>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a batch of upserts in emission order.
    pub fn apply(&mut self, upserts: Vec<EntityUpsert>) {
        for upsert in upserts {
            match upsert {
                EntityUpsert::Product(product) => self.upsert_product(product),
                EntityUpsert::User(user) => self.upsert_user(user),
                EntityUpsert::Review(review) => self.upsert_review(review),
            }
        }
    }

    pub fn upsert_product(&mut self, product: Product) {
        self.products.insert(product.product_id.clone(), product);
    }

    pub fn upsert_user(&mut self, user: User) {
        self.users.insert(user.user_id.clone(), user);
    }

    pub fn upsert_review(&mut self, review: Review) {
        self.reviews.insert(review.review_id.clone(), review);
    }

    pub fn product(&self, product_id: &str) -> Option<&Product> {
        self.products.get(product_id)
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn review_count(&self) -> usize {
        self.reviews.len()
    }

    /// Point-in-time Review⋈Product snapshot for one aggregation pass.
    /// Reviews whose product is not in the store are left out.
    pub fn joined_reviews(&self) -> Vec<JoinedReview<'_>> {
        self.reviews
            .values()
            .filter_map(|review| {
                self.products
                    .get(&review.product_id)
                    .map(|product| JoinedReview { review, product })
            })
            .collect()
    }

    /// Products whose name contains every whitespace-separated query
    /// word (case-insensitive), annotated with rating stats. Ordered by
    /// product id for stable output.
    pub fn search_products(&self, query: &str, limit: usize) -> Vec<ProductSummary> {
        let words: Vec<String> = query
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();
        if words.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<ProductSummary> = self
            .products
            .values()
            .filter(|product| {
                let name = product.product_name.to_lowercase();
                words.iter().all(|word| name.contains(word))
            })
            .map(|product| self.summarize_product(product))
            .collect();

        matches.sort_by(|a, b| a.product_id.cmp(&b.product_id));
        matches.truncate(limit);
        matches
    }

    /// One product with its rating stats.
    pub fn product_detail(&self, product_id: &str) -> Option<ProductSummary> {
        self.products
            .get(product_id)
            .map(|product| self.summarize_product(product))
    }

    /// A page of a product's reviews with the reviewer's display name,
    /// ordered rating descending then review id ascending.
    pub fn product_reviews(&self, product_id: &str, limit: usize, offset: usize) -> ReviewPage {
        let mut entries: Vec<&Review> = self
            .reviews
            .values()
            .filter(|review| review.product_id == product_id)
            .collect();
        entries.sort_by(|a, b| {
            b.rating
                .unwrap_or(0.0)
                .total_cmp(&a.rating.unwrap_or(0.0))
                .then_with(|| a.review_id.cmp(&b.review_id))
        });

        let total = entries.len();
        let reviews: Vec<ReviewWithUser> = entries
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|review| ReviewWithUser {
                review_id: review.review_id.clone(),
                review_title: review.review_title.clone(),
                review_content: review.review_content.clone(),
                rating: review.rating.unwrap_or(0.0),
                sentiment_label: review.sentiment_label.clone(),
                user_name: self
                    .users
                    .get(&review.user_id)
                    .and_then(|user| user.user_name.clone()),
            })
            .collect();

        let has_more = offset + reviews.len() < total;
        ReviewPage {
            reviews,
            total,
            limit,
            offset,
            has_more,
        }
    }

    fn summarize_product(&self, product: &Product) -> ProductSummary {
        let mut rating_sum = 0.0;
        let mut rating_n = 0usize;
        let mut review_count = 0usize;
        for review in self.reviews.values() {
            if review.product_id != product.product_id {
                continue;
            }
            review_count += 1;
            if let Some(rating) = review.rating {
                rating_sum += rating;
                rating_n += 1;
            }
        }

        ProductSummary {
            product_id: product.product_id.clone(),
            product_name: product.product_name.clone(),
            category: product.category.clone(),
            actual_price: product.actual_price,
            discounted_price: product.discounted_price,
            discount_percentage: product.discount_percentage,
            about_product: product.about_product.clone(),
            img_link: product.img_link.clone(),
            product_link: product.product_link.clone(),
            avg_rating: if rating_n > 0 {
                rating_sum / rating_n as f64
            } else {
                0.0
            },
            review_count,
        }
    }
}

/// A product annotated with its aggregate rating stats.
#[derive(Debug, Clone, Serialize)]
pub struct ProductSummary {
    pub product_id: String,
    pub product_name: String,
    pub category: Option<String>,
    pub actual_price: Option<f64>,
    pub discounted_price: Option<f64>,
    pub discount_percentage: Option<f64>,
    pub about_product: Option<String>,
    pub img_link: Option<String>,
    pub product_link: Option<String>,
    pub avg_rating: f64,
    pub review_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewWithUser {
    pub review_id: String,
    pub review_title: Option<String>,
    pub review_content: Option<String>,
    pub rating: f64,
    pub sentiment_label: Option<String>,
    pub user_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewPage {
    pub reviews: Vec<ReviewWithUser>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
    pub has_more: bool,
}
