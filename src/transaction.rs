//! Transaction models and line parsing.

use crate::money::Money;
use log::debug;
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;

/// Field separator of the sales data file and the enriched export.
pub const FIELD_DELIMITER: char = '|';

/// Number of fields on every well-formed sales line.
pub const FIELD_COUNT: usize = 8;

/// Leading characters required by the business rules.
pub const TRANSACTION_ID_PREFIX: char = 'T';
pub const PRODUCT_ID_PREFIX: char = 'P';
pub const CUSTOMER_ID_PREFIX: char = 'C';

/// Offset subtracted from a product id's numeric suffix to get its catalog id.
pub const CATALOG_ID_OFFSET: i64 = 100;

/// A sales transaction parsed from one line of the input file.
///
/// Only well-formed lines become a `Transaction`; business rules are checked
/// separately by the validator.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub transaction_id: String,

    /// Kept as written; only ever compared lexically.
    pub date: String,

    pub product_id: String,

    /// Product name with commas removed.
    pub product_name: String,

    pub quantity: i64,

    pub unit_price: Decimal,

    pub customer_id: String,

    /// Empty when the source line left it blank.
    pub region: String,
}

impl Transaction {
    /// Parses a raw pipe-delimited line.
    ///
    /// Returns `None` unless the line has exactly eight fields and both the
    /// quantity and unit price convert to numbers.
    pub fn parse(line: &str) -> Option<Transaction> {
        let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
        if fields.len() != FIELD_COUNT {
            return None;
        }

        let quantity = fields[4].trim().parse::<i64>().ok()?;
        let unit_price = parse_unit_price(fields[5])?;

        Some(Transaction {
            transaction_id: fields[0].to_string(),
            date: fields[1].to_string(),
            product_id: fields[2].to_string(),
            product_name: fields[3].replace(',', ""),
            quantity,
            unit_price,
            customer_id: fields[6].to_string(),
            region: fields[7].to_string(),
        })
    }

    /// Quantity times unit price.
    pub fn revenue(&self) -> Money {
        Money::line_total(self.quantity, self.unit_price)
    }

    /// Catalog id derived from the product id: numeric suffix minus 100.
    ///
    /// `None` when the suffix is empty or not an integer.
    pub fn catalog_key(&self) -> Option<i64> {
        let mut chars = self.product_id.chars();
        chars.next()?;
        let suffix = chars.as_str().trim().parse::<i64>().ok()?;
        suffix.checked_sub(CATALOG_ID_OFFSET)
    }
}

/// Parses a unit price, ignoring `,` thousands separators.
fn parse_unit_price(raw: &str) -> Option<Decimal> {
    let cleaned = raw.replace(',', "");
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// Parses every line, dropping the malformed ones. Order is preserved.
pub fn parse_transactions<S: AsRef<str>>(lines: &[S]) -> Vec<Transaction> {
    lines
        .iter()
        .enumerate()
        .filter_map(|(idx, line)| {
            let parsed = Transaction::parse(line.as_ref());
            if parsed.is_none() {
                debug!("Line {}: discarding malformed record", idx + 2);
            }
            parsed
        })
        .collect()
}

/// A valid transaction annotated with whether its product is in the catalog.
///
/// Field order here is the column order of the enriched export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedTransaction {
    #[serde(rename = "TransactionID")]
    pub transaction_id: String,

    #[serde(rename = "Date")]
    pub date: String,

    #[serde(rename = "ProductID")]
    pub product_id: String,

    #[serde(rename = "ProductName")]
    pub product_name: String,

    #[serde(rename = "Quantity")]
    pub quantity: i64,

    #[serde(rename = "UnitPrice")]
    pub unit_price: Decimal,

    #[serde(rename = "CustomerID")]
    pub customer_id: String,

    #[serde(rename = "Region")]
    pub region: String,

    #[serde(rename = "API_Match")]
    pub api_match: bool,
}

impl EnrichedTransaction {
    /// Copies `tx` and attaches the match flag.
    pub fn from_transaction(tx: &Transaction, api_match: bool) -> Self {
        EnrichedTransaction {
            transaction_id: tx.transaction_id.clone(),
            date: tx.date.clone(),
            product_id: tx.product_id.clone(),
            product_name: tx.product_name.clone(),
            quantity: tx.quantity,
            unit_price: tx.unit_price,
            customer_id: tx.customer_id.clone(),
            region: tx.region.clone(),
            api_match,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_well_formed_line() {
        let tx = Transaction::parse("T1|2024-01-01|P101|Widget|2|10.00|C1|North").unwrap();
        assert_eq!(tx.transaction_id, "T1");
        assert_eq!(tx.date, "2024-01-01");
        assert_eq!(tx.product_id, "P101");
        assert_eq!(tx.product_name, "Widget");
        assert_eq!(tx.quantity, 2);
        assert_eq!(tx.unit_price, dec("10.00"));
        assert_eq!(tx.customer_id, "C1");
        assert_eq!(tx.region, "North");
        assert_eq!(tx.revenue().grouped(), "20.00");
    }

    #[test]
    fn test_parse_strips_commas() {
        let tx = Transaction::parse("T2|2024-01-02|P102|Mouse, Wireless|1|1,299.50|C2|South")
            .unwrap();
        assert_eq!(tx.product_name, "Mouse Wireless");
        assert_eq!(tx.unit_price, dec("1299.50"));
    }

    #[test]
    fn test_parse_keeps_empty_region() {
        let tx = Transaction::parse("T3|2024-01-03|P103|Cable|4|5|C3|").unwrap();
        assert_eq!(tx.region, "");
    }

    #[test]
    fn test_parse_rejects_wrong_field_count() {
        assert!(Transaction::parse("T1|2024-01-01|P101|Widget|2|10.00|C1").is_none());
        assert!(Transaction::parse("T1|2024-01-01|P101|Widget|2|10.00|C1|North|x").is_none());
        assert!(Transaction::parse("").is_none());
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        assert!(Transaction::parse("T1|2024-01-01|P101|Widget|two|10.00|C1|North").is_none());
        assert!(Transaction::parse("T1|2024-01-01|P101|Widget|2.5|10.00|C1|North").is_none());
        assert!(Transaction::parse("T1|2024-01-01|P101|Widget|2|ten|C1|North").is_none());
        assert!(Transaction::parse("T1|2024-01-01|P101|Widget|2||C1|North").is_none());
    }

    #[test]
    fn test_parse_accepts_signed_and_scientific() {
        let tx = Transaction::parse("T1|d|P101|W|-3|1.5e2|C1|N").unwrap();
        assert_eq!(tx.quantity, -3);
        assert_eq!(tx.unit_price, dec("150"));
    }

    #[test]
    fn test_parse_rejects_non_finite_and_out_of_range() {
        for price in ["inf", "-inf", "Infinity", "nan", "123456789012345678901234567890"] {
            let line = format!("T1|d|P101|W|1|{}|C1|N", price);
            assert!(Transaction::parse(&line).is_none(), "price: {}", price);
        }
        for quantity in ["1_000", "99999999999999999999"] {
            let line = format!("T1|d|P101|W|{}|1|C1|N", quantity);
            assert!(Transaction::parse(&line).is_none(), "quantity: {}", quantity);
        }
    }

    #[test]
    fn test_parse_transactions_preserves_order() {
        let lines = vec![
            "T1|d|P101|A|1|1|C1|N",
            "garbage",
            "T2|d|P102|B|1|1|C1|N",
        ];
        let parsed = parse_transactions(&lines);
        let ids: Vec<_> = parsed.iter().map(|t| t.transaction_id.as_str()).collect();
        assert_eq!(ids, vec!["T1", "T2"]);
    }

    #[test]
    fn test_catalog_key() {
        let mut tx = Transaction::parse("T1|d|P101|A|1|1|C1|N").unwrap();
        assert_eq!(tx.catalog_key(), Some(1));

        tx.product_id = "P99".to_string();
        assert_eq!(tx.catalog_key(), Some(-1));

        tx.product_id = "PABC".to_string();
        assert_eq!(tx.catalog_key(), None);

        tx.product_id = "P".to_string();
        assert_eq!(tx.catalog_key(), None);

        tx.product_id = String::new();
        assert_eq!(tx.catalog_key(), None);
    }

    #[test]
    fn test_enriched_copies_fields() {
        let tx = Transaction::parse("T1|d|P101|A|1|1|C1|N").unwrap();
        let enriched = EnrichedTransaction::from_transaction(&tx, true);
        assert_eq!(enriched.transaction_id, tx.transaction_id);
        assert_eq!(enriched.unit_price, tx.unit_price);
        assert!(enriched.api_match);
    }
}
