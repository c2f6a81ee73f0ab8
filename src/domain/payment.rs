use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cod,
    BankTransfer,
}

string_enum!(PaymentMethod, "payment method", {
    Cod => "COD",
    BankTransfer => "BANK_TRANSFER",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Bank {
    Bri,
    Bni,
    Mandiri,
}

string_enum!(Bank, "bank", {
    Bri => "BRI",
    Bni => "BNI",
    Mandiri => "MANDIRI",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
}

string_enum!(PaymentStatus, "payment status", {
    Pending => "PENDING",
    Completed => "COMPLETED",
});

impl PaymentMethod {
    /// A bank is chosen exactly when paying by transfer.
    pub fn check_bank(&self, bank: Option<Bank>) -> Result<(), &'static str> {
        match (self, bank) {
            (PaymentMethod::BankTransfer, None) => Err("bank is required for BANK_TRANSFER"),
            (PaymentMethod::Cod, Some(_)) => Err("bank must not be set for COD"),
            _ => Ok(()),
        }
    }
}
