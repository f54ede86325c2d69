//! Business-rule validation of parsed transactions.

use crate::transaction::{
    Transaction, CUSTOMER_ID_PREFIX, PRODUCT_ID_PREFIX, TRANSACTION_ID_PREFIX,
};
use log::debug;
use rust_decimal::Decimal;

/// Outcome of validating a batch of transactions.
///
/// Rejected records are only counted, never retained.
#[derive(Debug, Default)]
pub struct Validation {
    /// Valid records in their original order.
    pub valid: Vec<Transaction>,

    /// Number of records that failed a rule.
    pub invalid: usize,
}

/// Counts describing a validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
}

impl Validation {
    pub fn summary(&self) -> ValidationSummary {
        ValidationSummary {
            total: self.valid.len() + self.invalid,
            valid: self.valid.len(),
            invalid: self.invalid,
        }
    }
}

/// Why a transaction was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NonPositiveQuantity,
    NonPositivePrice,
    BadTransactionId,
    BadProductId,
    BadCustomerId,
}

/// Checks one transaction against the business rules, stopping at the first
/// failure.
pub fn check(tx: &Transaction) -> Result<(), Rejection> {
    if tx.quantity <= 0 {
        return Err(Rejection::NonPositiveQuantity);
    }
    if tx.unit_price <= Decimal::ZERO {
        return Err(Rejection::NonPositivePrice);
    }
    if !tx.transaction_id.starts_with(TRANSACTION_ID_PREFIX) {
        return Err(Rejection::BadTransactionId);
    }
    if !tx.product_id.starts_with(PRODUCT_ID_PREFIX) {
        return Err(Rejection::BadProductId);
    }
    if !tx.customer_id.starts_with(CUSTOMER_ID_PREFIX) {
        return Err(Rejection::BadCustomerId);
    }
    Ok(())
}

/// Splits `transactions` into valid records and a count of invalid ones.
pub fn validate_and_filter(transactions: Vec<Transaction>) -> Validation {
    let mut validation = Validation::default();

    for tx in transactions {
        match check(&tx) {
            Ok(()) => validation.valid.push(tx),
            Err(reason) => {
                debug!("Transaction {}: rejected ({:?})", tx.transaction_id, reason);
                validation.invalid += 1;
            }
        }
    }

    validation
}
