use anyhow::{Result, anyhow};
use crate::models::{EntityUpsert, Product, Review, SourceRecord, User};
use super::record_parser::RecordParser;

pub const RATING_MIN: f64 = 1.0;
pub const RATING_MAX: f64 = 5.0;

/// Turns one parsed source record into entity upserts, preserving
/// referential integrity and defined behavior when the parallel lists
/// are misaligned.
pub struct EntityNormalizer {
    parser: RecordParser,
}

impl EntityNormalizer {
    pub fn new() -> Self {
        EntityNormalizer {
            parser: RecordParser::new(),
        }
    }

    /// Normalize a record into upserts: the Product first, then for
    /// each review its User followed by the Review itself.
    ///
    /// A record missing product_id or product_name is rejected; every
    /// other data-quality issue degrades to absent/zero values.
    pub fn normalize_record(&self, record: &SourceRecord) -> Result<Vec<EntityUpsert>> {
        let product = self.build_product(record)?;
        let product_id = product.product_id.clone();
        let mut upserts = vec![EntityUpsert::Product(product)];

        let user_ids = self.parser.multi_values(record, "user_id");
        let user_names = self.parser.multi_values(record, "user_name");
        let review_ids = self.parser.multi_values(record, "review_id");
        let review_titles = self.parser.multi_values(record, "review_title");
        let review_contents = self.parser.multi_values(record, "review_content");

        // Record-level values shared by every review of this record.
        // The rating is clamped, not rejected; sentiment is per-product
        // in the source data and applied to all of its reviews.
        let rating = self
            .parser
            .safe_float(record, "rating")
            .map(|value| value.clamp(RATING_MIN, RATING_MAX));
        let sentiment_score = self.parser.safe_float(record, "sentiment_score");
        let sentiment_label = self.parser.single_value(record, "sentiment_label");
        let review_date = self.parser.parse_date(record, "review_date");

        for (index, review_id) in review_ids.iter().enumerate() {
            // Match user by index; a record with fewer users than
            // reviews attributes the overflow reviews to the first
            // listed user. No users at all means no reviews.
            let (user_id, user_name) = if index < user_ids.len() {
                (user_ids[index].clone(), user_names.get(index).cloned())
            } else if let Some(first_user) = user_ids.first() {
                (first_user.clone(), user_names.first().cloned())
            } else {
                continue;
            };

            let review_content = review_contents.get(index).cloned();
            let review_length = review_content
                .as_deref()
                .map(|content| content.chars().count())
                .unwrap_or(0);

            upserts.push(EntityUpsert::User(User {
                user_id: user_id.clone(),
                user_name,
            }));
            upserts.push(EntityUpsert::Review(Review {
                review_id: review_id.clone(),
                product_id: product_id.clone(),
                user_id,
                review_title: review_titles.get(index).cloned(),
                review_content,
                rating,
                sentiment_score,
                sentiment_label: sentiment_label.clone(),
                review_length,
                review_date,
            }));
        }

        Ok(upserts)
    }

    fn build_product(&self, record: &SourceRecord) -> Result<Product> {
        let product_id = self
            .parser
            .single_value(record, "product_id")
            .ok_or_else(|| anyhow!("Source record is missing product_id"))?;
        let product_name = self
            .parser
            .single_value(record, "product_name")
            .ok_or_else(|| anyhow!("Source record {} is missing product_name", product_id))?;

        let category = self
            .parser
            .single_value(record, "category")
            .map(|raw| normalize_category(&raw))
            .filter(|path| !path.is_empty());

        // Pipes inside the description collide with the category path
        // delimiter; rewrite them as sentence breaks.
        let about_product = self
            .parser
            .single_value(record, "about_product")
            .map(|raw| raw.replace('|', ". "));

        Ok(Product {
            product_id,
            product_name,
            category,
            actual_price: self.parser.clean_price(record, "actual_price"),
            discounted_price: self.parser.clean_price(record, "discounted_price"),
            discount_percentage: self.parser.clean_percentage(record, "discount_percentage"),
            about_product,
            img_link: self.parser.single_value(record, "img_link"),
            product_link: self.parser.single_value(record, "product_link"),
        })
    }
}

/// Comma separators in the raw category encoding are path separators;
/// store the canonical pipe-delimited form with trimmed segments.
pub fn normalize_category(raw: &str) -> String {
    raw.replace(',', "|")
        .split('|')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("|")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[(&str, &str)]) -> SourceRecord {
        fields
            .iter()
            .map(|(field, value)| (field.to_string(), value.to_string()))
            .collect()
    }

    fn reviews_of(upserts: &[EntityUpsert]) -> Vec<&Review> {
        upserts
            .iter()
            .filter_map(|upsert| match upsert {
                EntityUpsert::Review(review) => Some(review),
                _ => None,
            })
            .collect()
    }

    fn users_of(upserts: &[EntityUpsert]) -> Vec<&User> {
        upserts
            .iter()
            .filter_map(|upsert| match upsert {
                EntityUpsert::User(user) => Some(user),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_record_without_reviews_emits_product_only() {
        let normalizer = EntityNormalizer::new();
        let rec = record(&[
            ("product_id", "P1"),
            ("product_name", "USB Cable"),
            ("review_id", ""),
        ]);

        let upserts = normalizer.normalize_record(&rec).unwrap();
        assert_eq!(upserts.len(), 1);
        assert!(matches!(upserts[0], EntityUpsert::Product(_)));
    }

    #[test]
    fn test_missing_product_id_is_rejected() {
        let normalizer = EntityNormalizer::new();
        let rec = record(&[("product_name", "USB Cable")]);

        assert!(normalizer.normalize_record(&rec).is_err());
    }

    #[test]
    fn test_missing_product_name_is_rejected() {
        let normalizer = EntityNormalizer::new();
        let rec = record(&[("product_id", "P1"), ("product_name", "  ")]);

        assert!(normalizer.normalize_record(&rec).is_err());
    }

    #[test]
    fn test_rating_is_clamped_not_rejected() {
        let normalizer = EntityNormalizer::new();
        for (raw, expected) in [("7.2", 5.0), ("0.3", 1.0), ("4.2", 4.2)] {
            let rec = record(&[
                ("product_id", "P1"),
                ("product_name", "USB Cable"),
                ("user_id", "u1"),
                ("review_id", "r1"),
                ("rating", raw),
            ]);

            let upserts = normalizer.normalize_record(&rec).unwrap();
            let reviews = reviews_of(&upserts);
            assert_eq!(reviews[0].rating, Some(expected));
        }
    }

    #[test]
    fn test_malformed_rating_stays_absent() {
        let normalizer = EntityNormalizer::new();
        let rec = record(&[
            ("product_id", "P1"),
            ("product_name", "USB Cable"),
            ("user_id", "u1"),
            ("review_id", "r1"),
            ("rating", "five stars"),
        ]);

        let upserts = normalizer.normalize_record(&rec).unwrap();
        assert_eq!(reviews_of(&upserts)[0].rating, None);
    }

    #[test]
    fn test_overflow_reviews_fall_back_to_first_user() {
        let normalizer = EntityNormalizer::new();
        let rec = record(&[
            ("product_id", "P1"),
            ("product_name", "USB Cable"),
            ("user_id", "u1"),
            ("user_name", "Asha"),
            ("review_id", "r1,r2,r3"),
        ]);

        let upserts = normalizer.normalize_record(&rec).unwrap();
        let reviews = reviews_of(&upserts);
        assert_eq!(reviews.len(), 3);
        assert!(reviews.iter().all(|review| review.user_id == "u1"));

        let users = users_of(&upserts);
        assert!(users.iter().all(|user| user.user_name.as_deref() == Some("Asha")));
    }

    #[test]
    fn test_reviews_without_any_user_are_skipped() {
        let normalizer = EntityNormalizer::new();
        let rec = record(&[
            ("product_id", "P1"),
            ("product_name", "USB Cable"),
            ("review_id", "r1,r2"),
        ]);

        let upserts = normalizer.normalize_record(&rec).unwrap();
        assert_eq!(upserts.len(), 1);
        assert!(matches!(upserts[0], EntityUpsert::Product(_)));
    }

    #[test]
    fn test_index_aligned_titles_and_contents() {
        let normalizer = EntityNormalizer::new();
        let rec = record(&[
            ("product_id", "P1"),
            ("product_name", "USB Cable"),
            ("user_id", "u1,u2"),
            ("user_name", "Asha,Bilal"),
            ("review_id", "r1,r2"),
            ("review_title", "Great,Meh"),
            ("review_content", "Works well"),
        ]);

        let upserts = normalizer.normalize_record(&rec).unwrap();
        let reviews = reviews_of(&upserts);
        assert_eq!(reviews[0].review_title.as_deref(), Some("Great"));
        assert_eq!(reviews[0].review_content.as_deref(), Some("Works well"));
        assert_eq!(reviews[0].review_length, 10);
        assert_eq!(reviews[1].review_title.as_deref(), Some("Meh"));
        assert_eq!(reviews[1].review_content, None);
        assert_eq!(reviews[1].review_length, 0);
        assert_eq!(reviews[1].user_id, "u2");
    }

    #[test]
    fn test_sentiment_applies_to_every_review_of_the_record() {
        let normalizer = EntityNormalizer::new();
        let rec = record(&[
            ("product_id", "P1"),
            ("product_name", "USB Cable"),
            ("user_id", "u1,u2"),
            ("review_id", "r1,r2"),
            ("rating", "4.5"),
            ("sentiment_score", "0.87"),
            ("sentiment_label", "positive"),
        ]);

        let upserts = normalizer.normalize_record(&rec).unwrap();
        for review in reviews_of(&upserts) {
            assert_eq!(review.rating, Some(4.5));
            assert_eq!(review.sentiment_score, Some(0.87));
            assert_eq!(review.sentiment_label.as_deref(), Some("positive"));
        }
    }

    #[test]
    fn test_category_commas_become_pipes() {
        let normalizer = EntityNormalizer::new();
        let rec = record(&[
            ("product_id", "P1"),
            ("product_name", "USB Cable"),
            ("category", "Electronics, Cables ,USB"),
        ]);

        let upserts = normalizer.normalize_record(&rec).unwrap();
        match &upserts[0] {
            EntityUpsert::Product(product) => {
                assert_eq!(product.category.as_deref(), Some("Electronics|Cables|USB"));
            }
            other => panic!("expected product upsert, got {:?}", other),
        }
    }

    #[test]
    fn test_about_product_pipes_become_sentence_breaks() {
        let normalizer = EntityNormalizer::new();
        let rec = record(&[
            ("product_id", "P1"),
            ("product_name", "USB Cable"),
            ("about_product", "Fast charging|Braided cord"),
        ]);

        let upserts = normalizer.normalize_record(&rec).unwrap();
        match &upserts[0] {
            EntityUpsert::Product(product) => {
                assert_eq!(
                    product.about_product.as_deref(),
                    Some("Fast charging. Braided cord")
                );
            }
            other => panic!("expected product upsert, got {:?}", other),
        }
    }

    #[test]
    fn test_emission_order_keeps_referential_integrity() {
        let normalizer = EntityNormalizer::new();
        let rec = record(&[
            ("product_id", "P1"),
            ("product_name", "USB Cable"),
            ("user_id", "u1,u2"),
            ("review_id", "r1,r2"),
        ]);

        let upserts = normalizer.normalize_record(&rec).unwrap();
        assert!(matches!(upserts[0], EntityUpsert::Product(_)));
        assert!(matches!(upserts[1], EntityUpsert::User(_)));
        assert!(matches!(upserts[2], EntityUpsert::Review(_)));
        assert!(matches!(upserts[3], EntityUpsert::User(_)));
        assert!(matches!(upserts[4], EntityUpsert::Review(_)));
    }

    #[test]
    fn test_review_length_counts_characters() {
        let normalizer = EntityNormalizer::new();
        let rec = record(&[
            ("product_id", "P1"),
            ("product_name", "USB Cable"),
            ("user_id", "u1"),
            ("review_id", "r1"),
            ("review_content", "Déjà vu"),
        ]);

        let upserts = normalizer.normalize_record(&rec).unwrap();
        assert_eq!(reviews_of(&upserts)[0].review_length, 7);
    }

    #[test]
    fn test_normalizing_twice_converges_to_the_same_state() {
        use crate::storage::EntityStore;

        let normalizer = EntityNormalizer::new();
        let rec = record(&[
            ("product_id", "P1"),
            ("product_name", "USB Cable"),
            ("user_id", "u1,u2"),
            ("user_name", "Asha,Bilal"),
            ("review_id", "r1,r2"),
            ("review_content", "Good,Bad"),
            ("rating", "4.0"),
        ]);

        let mut once = EntityStore::new();
        once.apply(normalizer.normalize_record(&rec).unwrap());

        let mut twice = EntityStore::new();
        twice.apply(normalizer.normalize_record(&rec).unwrap());
        twice.apply(normalizer.normalize_record(&rec).unwrap());

        assert_eq!(once.product_count(), twice.product_count());
        assert_eq!(once.user_count(), twice.user_count());
        assert_eq!(once.review_count(), twice.review_count());
        assert_eq!(once.product("P1"), twice.product("P1"));
    }

    #[test]
    fn test_prices_cleaned_from_decorated_strings() {
        let normalizer = EntityNormalizer::new();
        let rec = record(&[
            ("product_id", "P1"),
            ("product_name", "USB Cable"),
            ("actual_price", "₹1,099"),
            ("discounted_price", "₹399"),
            ("discount_percentage", "64% off"),
        ]);

        let upserts = normalizer.normalize_record(&rec).unwrap();
        match &upserts[0] {
            EntityUpsert::Product(product) => {
                assert_eq!(product.actual_price, Some(1099.0));
                assert_eq!(product.discounted_price, Some(399.0));
                assert_eq!(product.discount_percentage, Some(64.0));
            }
            other => panic!("expected product upsert, got {:?}", other),
        }
    }
}
