//! Receipt codes of the form `PREFIX-YYYYMMDD-NNNNNN`.
//!
//! The random suffix is six digits drawn from `100000..=999999`, so two
//! orders created on the same day can receive the same code. Callers that
//! need uniqueness must check the store (see `order_service::create_order`).

use chrono::{NaiveDate, Utc};
use rand::Rng;

pub const DEFAULT_RECEIPT_PREFIX: &str = "BE";

pub fn generate_receipt(prefix: &str) -> String {
    generate_receipt_with(prefix, Utc::now().date_naive(), &mut rand::thread_rng())
}

pub fn generate_receipt_with<R: Rng>(prefix: &str, date: NaiveDate, rng: &mut R) -> String {
    let number: u32 = rng.gen_range(100_000..=999_999);
    format!("{}-{}-{}", prefix, date.format("%Y%m%d"), number)
}

pub fn is_valid_prefix(prefix: &str) -> bool {
    prefix.len() == 2 && prefix.bytes().all(|b| b.is_ascii_uppercase())
}

/// Checks the `^[A-Z]{2}-\d{8}-\d{6}$` shape.
pub fn is_valid_receipt(receipt: &str) -> bool {
    let mut parts = receipt.split('-');
    let (Some(prefix), Some(date), Some(number), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    is_valid_prefix(prefix)
        && date.len() == 8
        && date.bytes().all(|b| b.is_ascii_digit())
        && number.len() == 6
        && number.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn default_prefix_matches_format() {
        for _ in 0..100 {
            let receipt = generate_receipt(DEFAULT_RECEIPT_PREFIX);
            assert!(is_valid_receipt(&receipt), "bad receipt {receipt}");
            assert!(receipt.starts_with("BE-"));
        }
    }

    #[test]
    fn embeds_the_creation_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let receipt = generate_receipt_with("BE", date, &mut rng);
        assert!(receipt.starts_with("BE-20240307-"));
        let suffix: u32 = receipt[12..].parse().unwrap();
        assert!((100_000..=999_999).contains(&suffix));
    }

    #[test]
    fn codes_are_not_unique_by_construction() {
        // Same date and same random stream give the same code.
        let date = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        let a = generate_receipt_with("BE", date, &mut StdRng::seed_from_u64(42));
        let b = generate_receipt_with("BE", date, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);

        // And with only 900k suffixes per day, a few thousand draws collide.
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = std::collections::HashSet::new();
        let collided =
            (0..20_000).any(|_| !seen.insert(generate_receipt_with("BE", date, &mut rng)));
        assert!(collided);
    }

    #[test]
    fn rejects_malformed_receipts() {
        assert!(!is_valid_receipt("BE-2024030-123456"));
        assert!(!is_valid_receipt("be-20240307-123456"));
        assert!(!is_valid_receipt("BE-20240307-12345"));
        assert!(!is_valid_receipt("BE-20240307-123456-1"));
        assert!(!is_valid_receipt("BEE-20240307-123456"));
    }
}
