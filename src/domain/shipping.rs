use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Couriers offered at checkout, each with a flat shipping fee in rupiah.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShippingMethod {
    Jne,
    Jnt,
    Sicepat,
    PosIndonesia,
    Tiki,
}

string_enum!(ShippingMethod, "shipping method", {
    Jne => "JNE",
    Jnt => "JNT",
    Sicepat => "SICEPAT",
    PosIndonesia => "POS_INDONESIA",
    Tiki => "TIKI",
});

impl ShippingMethod {
    pub fn cost(&self) -> i64 {
        match self {
            ShippingMethod::Jne => 15_000,
            ShippingMethod::Jnt => 14_000,
            ShippingMethod::Sicepat => 16_000,
            ShippingMethod::PosIndonesia => 18_000,
            ShippingMethod::Tiki => 17_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinePrice {
    pub unit_price: i64,
    pub quantity: i32,
}

/// Order total: line subtotals plus the shipping fee. `None` on overflow.
pub fn order_total(lines: &[LinePrice], shipping: ShippingMethod) -> Option<i64> {
    lines
        .iter()
        .try_fold(0i64, |acc, line| {
            line.unit_price
                .checked_mul(i64::from(line.quantity))
                .and_then(|sub| acc.checked_add(sub))
        })
        .and_then(|subtotal| subtotal.checked_add(shipping.cost()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn costs() {
        assert_eq!(ShippingMethod::Jne.cost(), 15_000);
        assert_eq!(ShippingMethod::PosIndonesia.cost(), 18_000);
        assert_eq!(ShippingMethod::PosIndonesia.as_str(), "POS_INDONESIA");
    }

    #[test]
    fn total_includes_shipping() {
        let lines = [LinePrice {
            unit_price: 100_000,
            quantity: 2,
        }];
        assert_eq!(order_total(&lines, ShippingMethod::Jne), Some(215_000));
        assert_eq!(order_total(&[], ShippingMethod::Tiki), Some(17_000));
    }

    #[test]
    fn total_overflow_is_reported() {
        let lines = [LinePrice {
            unit_price: i64::MAX,
            quantity: 2,
        }];
        assert_eq!(order_total(&lines, ShippingMethod::Jne), None);
    }
}
