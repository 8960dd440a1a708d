use crate::storage::JoinedReview;

/// Named bucketing policies. Each defines the grouping key of a
/// joined review and the fixed display position of each band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketPolicy {
    /// First pipe-delimited segment of the product category.
    Category,
    /// Price band over the discounted price.
    PriceRange,
    /// Discount band over the discount percentage.
    DiscountRange,
    /// Length band over the review character count.
    ReviewLength,
}

impl BucketPolicy {
    /// Bucket for one joined review as (band ordinal, display label),
    /// or None when the review has no value for the bucketed
    /// attribute. Category buckets share ordinal 0; their display
    /// order is computed from the aggregates instead.
    pub fn bucket_for(&self, entry: &JoinedReview<'_>) -> Option<(usize, String)> {
        match self {
            BucketPolicy::Category => {
                let category = entry.product.category.as_deref()?;
                let first_segment = category.split('|').next()?.trim();
                if first_segment.is_empty() {
                    return None;
                }
                Some((0, first_segment.to_string()))
            }
            BucketPolicy::PriceRange => entry.product.discounted_price.map(price_band),
            BucketPolicy::DiscountRange => entry.product.discount_percentage.map(discount_band),
            BucketPolicy::ReviewLength => Some(length_band(entry.review.review_length)),
        }
    }
}

/// Half-open price bands over the discounted price, ascending.
pub fn price_band(price: f64) -> (usize, String) {
    let (ordinal, label) = if price < 50.0 {
        (0, "$0-$50")
    } else if price < 150.0 {
        (1, "$50-$150")
    } else if price < 300.0 {
        (2, "$150-$300")
    } else if price < 500.0 {
        (3, "$300-$500")
    } else {
        (4, "$500+")
    };
    (ordinal, label.to_string())
}

/// Half-open discount bands over the discount percentage, ascending.
pub fn discount_band(percentage: f64) -> (usize, String) {
    let (ordinal, label) = if percentage < 25.0 {
        (0, "0-25% off")
    } else if percentage < 50.0 {
        (1, "25-50% off")
    } else if percentage < 75.0 {
        (2, "50-75% off")
    } else {
        (3, "75%+ off")
    };
    (ordinal, label.to_string())
}

/// Half-open review-length bands, ascending.
pub fn length_band(length: usize) -> (usize, String) {
    let (ordinal, label) = if length < 100 {
        (0, "Short (<100 chars)")
    } else if length < 500 {
        (1, "Medium (100-500 chars)")
    } else if length < 1000 {
        (2, "Long (500-1000 chars)")
    } else {
        (3, "Very Long (1000+ chars)")
    };
    (ordinal, label.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_band_edges_are_half_open() {
        assert_eq!(price_band(0.0).1, "$0-$50");
        assert_eq!(price_band(49.99).1, "$0-$50");
        assert_eq!(price_band(50.0).1, "$50-$150");
        assert_eq!(price_band(150.0).1, "$150-$300");
        assert_eq!(price_band(300.0).1, "$300-$500");
        assert_eq!(price_band(500.0).1, "$500+");
        assert_eq!(price_band(2000.0).1, "$500+");
    }

    #[test]
    fn test_discount_band_edges() {
        assert_eq!(discount_band(0.0).1, "0-25% off");
        assert_eq!(discount_band(24.9).1, "0-25% off");
        assert_eq!(discount_band(25.0).1, "25-50% off");
        assert_eq!(discount_band(50.0).1, "50-75% off");
        assert_eq!(discount_band(75.0).1, "75%+ off");
        assert_eq!(discount_band(99.0).1, "75%+ off");
    }

    #[test]
    fn test_length_band_edges() {
        assert_eq!(length_band(0).1, "Short (<100 chars)");
        assert_eq!(length_band(99).1, "Short (<100 chars)");
        assert_eq!(length_band(100).1, "Medium (100-500 chars)");
        assert_eq!(length_band(500).1, "Long (500-1000 chars)");
        assert_eq!(length_band(1000).1, "Very Long (1000+ chars)");
    }

    #[test]
    fn test_band_ordinals_ascend() {
        assert!(price_band(10.0).0 < price_band(60.0).0);
        assert!(discount_band(10.0).0 < discount_band(80.0).0);
        assert!(length_band(10).0 < length_band(1200).0);
    }
}
