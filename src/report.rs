//! Sales analytics report.
//!
//! Aggregation and rendering are separate: [`SalesReport::build`] computes
//! every figure once, [`SalesReport::render`] lays them out. Rendering is
//! deterministic for a fixed timestamp.

use crate::error::Result;
use crate::money::{format_percent, Money, CURRENCY_SYMBOL};
use crate::transaction::{EnrichedTransaction, Transaction};
use chrono::{Local, NaiveDateTime, Timelike};
use log::info;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Number of entries in the top products and top customers lists.
pub const TOP_N: usize = 5;

const RULE_WIDTH: usize = 60;

/// Revenue share of one region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionStat {
    pub region: String,
    pub revenue: Money,
    /// Percent of total revenue.
    pub share: Decimal,
    pub transactions: usize,
}

/// Units sold and revenue of one product name.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductStat {
    pub name: String,
    pub quantity: i64,
    pub revenue: Money,
}

/// Spend and order count of one customer.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerStat {
    pub customer_id: String,
    pub spent: Money,
    pub orders: usize,
}

/// Every figure that appears in the report.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesReport {
    pub records: usize,
    pub total_revenue: Money,
    pub average_order_value: Money,
    /// Lexically smallest and largest dates, `None` without records.
    pub date_range: Option<(String, String)>,
    /// Sorted by revenue, highest first.
    pub regions: Vec<RegionStat>,
    /// At most [`TOP_N`], sorted by quantity, highest first.
    pub top_products: Vec<ProductStat>,
    /// At most [`TOP_N`], sorted by spend, highest first.
    pub top_customers: Vec<CustomerStat>,
    pub matched: usize,
    /// Percent of enriched records with a catalog match.
    pub match_rate: Decimal,
}

/// Groups items by key, keeping groups in first-seen order.
struct Grouped<V> {
    index: HashMap<String, usize>,
    groups: Vec<(String, V)>,
}

impl<V: Default> Grouped<V> {
    fn new() -> Self {
        Grouped {
            index: HashMap::new(),
            groups: Vec::new(),
        }
    }

    fn entry(&mut self, key: &str) -> &mut V {
        let idx = match self.index.get(key) {
            Some(&idx) => idx,
            None => {
                self.groups.push((key.to_string(), V::default()));
                self.index.insert(key.to_string(), self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        &mut self.groups[idx].1
    }

    fn into_groups(self) -> Vec<(String, V)> {
        self.groups
    }
}

impl SalesReport {
    /// Aggregates `transactions` (the valid set) and `enriched`.
    pub fn build(transactions: &[Transaction], enriched: &[EnrichedTransaction]) -> Self {
        let records = transactions.len();
        let total_revenue: Money = transactions.iter().map(Transaction::revenue).sum();
        let average_order_value = total_revenue.average_over(records);

        let date_range = transactions
            .iter()
            .map(|t| t.date.as_str())
            .min()
            .zip(transactions.iter().map(|t| t.date.as_str()).max())
            .map(|(first, last)| (first.to_string(), last.to_string()));

        let mut regions: Grouped<(Money, usize)> = Grouped::new();
        let mut products: Grouped<(i64, Money)> = Grouped::new();
        let mut customers: Grouped<(Money, usize)> = Grouped::new();

        for tx in transactions {
            let revenue = tx.revenue();

            if !tx.region.is_empty() {
                let region = regions.entry(&tx.region);
                region.0 += revenue;
                region.1 += 1;
            }

            let product = products.entry(&tx.product_name);
            product.0 = product.0.saturating_add(tx.quantity);
            product.1 += revenue;

            let customer = customers.entry(&tx.customer_id);
            customer.0 += revenue;
            customer.1 += 1;
        }

        let mut regions: Vec<RegionStat> = regions
            .into_groups()
            .into_iter()
            .map(|(region, (revenue, transactions))| RegionStat {
                region,
                revenue,
                share: revenue.percent_of(total_revenue),
                transactions,
            })
            .collect();
        regions.sort_by(|a, b| b.revenue.cmp(&a.revenue));

        let mut top_products: Vec<ProductStat> = products
            .into_groups()
            .into_iter()
            .map(|(name, (quantity, revenue))| ProductStat {
                name,
                quantity,
                revenue,
            })
            .collect();
        top_products.sort_by(|a, b| b.quantity.cmp(&a.quantity));
        top_products.truncate(TOP_N);

        let mut top_customers: Vec<CustomerStat> = customers
            .into_groups()
            .into_iter()
            .map(|(customer_id, (spent, orders))| CustomerStat {
                customer_id,
                spent,
                orders,
            })
            .collect();
        top_customers.sort_by(|a, b| b.spent.cmp(&a.spent));
        top_customers.truncate(TOP_N);

        let matched = enriched.iter().filter(|e| e.api_match).count();
        let match_rate = if enriched.is_empty() {
            Decimal::ZERO
        } else {
            Decimal::from(matched) / Decimal::from(enriched.len()) * Decimal::ONE_HUNDRED
        };

        SalesReport {
            records,
            total_revenue,
            average_order_value,
            date_range,
            regions,
            top_products,
            top_customers,
            matched,
            match_rate,
        }
    }

    /// Writes the report text to `out`, stamped with `generated_at`.
    pub fn render<W: Write>(&self, out: &mut W, generated_at: NaiveDateTime) -> Result<()> {
        let rule = "=".repeat(RULE_WIDTH);

        writeln!(out, "SALES ANALYTICS REPORT")?;
        writeln!(out, "{}", rule)?;
        writeln!(out, "Generated: {}", format_timestamp(generated_at))?;
        writeln!(out, "Records Processed: {}", self.records)?;
        writeln!(out, "{}", rule)?;
        writeln!(out)?;

        writeln!(out, "OVERALL SUMMARY")?;
        writeln!(out, "Total Revenue: {}", self.total_revenue)?;
        writeln!(out, "Average Order Value: {}", self.average_order_value)?;
        match &self.date_range {
            Some((first, last)) => writeln!(out, "Date Range: {} to {}", first, last)?,
            None => writeln!(out, "Date Range: N/A")?,
        }
        writeln!(out)?;

        writeln!(out, "REGION-WISE PERFORMANCE")?;
        writeln!(
            out,
            "{:<10}{:>15}{:>12}{:>15}",
            "Region", "Sales", "% Total", "Transactions"
        )?;
        for region in &self.regions {
            writeln!(
                out,
                "{:<10}{}{:>14}{:>11}%{:>15}",
                region.region,
                CURRENCY_SYMBOL,
                region.revenue.grouped(),
                format_percent(region.share),
                region.transactions
            )?;
        }
        writeln!(out)?;

        writeln!(out, "TOP {} PRODUCTS", TOP_N)?;
        for (rank, product) in self.top_products.iter().enumerate() {
            writeln!(
                out,
                "{}. {} - {} units - {}",
                rank + 1,
                product.name,
                product.quantity,
                product.revenue
            )?;
        }
        writeln!(out)?;

        writeln!(out, "TOP {} CUSTOMERS", TOP_N)?;
        for (rank, customer) in self.top_customers.iter().enumerate() {
            writeln!(
                out,
                "{}. {} - {} ({} orders)",
                rank + 1,
                customer.customer_id,
                customer.spent,
                customer.orders
            )?;
        }
        writeln!(out)?;

        writeln!(out, "API ENRICHMENT SUMMARY")?;
        writeln!(out, "Enriched Records: {}", self.matched)?;
        writeln!(out, "Success Rate: {}%", format_percent(self.match_rate))?;

        Ok(())
    }

    /// Renders into a string.
    pub fn to_text(&self, generated_at: NaiveDateTime) -> Result<String> {
        let mut buf = Vec::new();
        self.render(&mut buf, generated_at)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Local time as `YYYY-MM-DD HH:MM:SS[.ffffff]`; the fraction is left off
/// when it is zero.
fn format_timestamp(at: NaiveDateTime) -> String {
    if at.nanosecond() / 1_000 == 0 {
        at.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        at.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
    }
}

/// Builds the report and writes it to `path`, replacing any previous report.
pub fn generate_sales_report(
    path: &Path,
    transactions: &[Transaction],
    enriched: &[EnrichedTransaction],
) -> Result<SalesReport> {
    let report = SalesReport::build(transactions, enriched);

    let mut out = BufWriter::new(File::create(path)?);
    report.render(&mut out, Local::now().naive_local())?;
    out.flush()?;

    info!("Wrote sales report to {}", path.display());
    Ok(report)
}
