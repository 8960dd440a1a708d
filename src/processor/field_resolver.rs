use crate::models::SourceRecord;
use std::collections::HashMap;

/// Maps the column spellings seen across source exports onto the
/// canonical field names the normalizer expects.
pub struct FieldResolver {
    aliases: HashMap<String, String>,
}

impl FieldResolver {
    pub fn new() -> Self {
        let mut aliases = HashMap::new();

        let mut alias = |from: &str, to: &str| {
            aliases.insert(from.to_string(), to.to_string());
        };

        // Identity mappings for the canonical names
        for field in [
            "product_id",
            "product_name",
            "category",
            "actual_price",
            "discounted_price",
            "discount_percentage",
            "about_product",
            "img_link",
            "product_link",
            "user_id",
            "user_name",
            "review_id",
            "review_title",
            "review_content",
            "rating",
            "sentiment_score",
            "sentiment_label",
            "review_date",
        ] {
            alias(field, field);
        }

        // USD-suffixed price columns from the converted export
        alias("actual_price_usd", "actual_price");
        alias("discounted_price_usd", "discounted_price");

        // Common variations
        alias("id", "product_id");
        alias("name", "product_name");
        alias("title", "product_name");
        alias("price", "discounted_price");
        alias("special_price", "discounted_price");
        alias("mrp", "actual_price");
        alias("original_price", "actual_price");
        alias("discount_percent", "discount_percentage");
        alias("percent_off", "discount_percentage");
        alias("discount", "discount_percentage");
        alias("about", "about_product");
        alias("description", "about_product");
        alias("image_link", "img_link");

        FieldResolver { aliases }
    }

    /// Canonical name for a source column, by exact match first, then
    /// by case/underscore-insensitive comparison. Unknown columns map
    /// to themselves.
    pub fn resolve<'a>(&'a self, field: &'a str) -> &'a str {
        if let Some(canonical) = self.aliases.get(field) {
            return canonical;
        }

        let normalized = Self::normalize_field_name(field);
        for (pattern, canonical) in &self.aliases {
            if Self::normalize_field_name(pattern) == normalized {
                return canonical;
            }
        }

        field
    }

    /// Rewrite a record onto canonical field names. An alias never
    /// clobbers a non-empty value already present under the canonical
    /// name.
    pub fn canonicalize(&self, record: &SourceRecord) -> SourceRecord {
        let mut canonical = SourceRecord::new();

        for (field, value) in record {
            let key = self.resolve(field).to_string();
            let slot = canonical.entry(key).or_default();
            if slot.is_empty() {
                *slot = value.clone();
            }
        }

        canonical
    }

    fn normalize_field_name(name: &str) -> String {
        name.to_lowercase()
            .replace('_', "")
            .replace('-', "")
            .replace(' ', "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usd_columns_resolve_to_canonical_prices() {
        let resolver = FieldResolver::new();

        assert_eq!(resolver.resolve("actual_price_usd"), "actual_price");
        assert_eq!(resolver.resolve("discounted_price_usd"), "discounted_price");
        assert_eq!(resolver.resolve("actual_price"), "actual_price");
    }

    #[test]
    fn test_normalized_matching() {
        let resolver = FieldResolver::new();

        assert_eq!(resolver.resolve("Product-ID"), "product_id");
        assert_eq!(resolver.resolve("Review Content"), "review_content");
    }

    #[test]
    fn test_unknown_columns_pass_through() {
        let resolver = FieldResolver::new();

        assert_eq!(resolver.resolve("warehouse_zone"), "warehouse_zone");
    }

    #[test]
    fn test_canonicalize_does_not_clobber_existing_value() {
        let resolver = FieldResolver::new();
        let record: SourceRecord = [
            ("product_name".to_string(), "USB Cable".to_string()),
            ("warehouse_zone".to_string(), "A3".to_string()),
        ]
        .into_iter()
        .collect();

        let canonical = resolver.canonicalize(&record);
        assert_eq!(canonical.get("product_name").unwrap(), "USB Cable");
        assert_eq!(canonical.get("warehouse_zone").unwrap(), "A3");
    }

    #[test]
    fn test_canonicalize_moves_alias_value() {
        let resolver = FieldResolver::new();
        let record: SourceRecord = [(
            "discounted_price_usd".to_string(),
            "19.99".to_string(),
        )]
        .into_iter()
        .collect();

        let canonical = resolver.canonicalize(&record);
        assert_eq!(canonical.get("discounted_price").unwrap(), "19.99");
        assert!(!canonical.contains_key("discounted_price_usd"));
    }
}
