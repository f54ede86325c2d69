//! Product catalog lookup and transaction enrichment.
//!
//! The catalog is optional annotation: if it cannot be fetched every
//! transaction is simply marked as unmatched.

use crate::transaction::{EnrichedTransaction, Transaction};
use log::{info, warn};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Default products endpoint.
pub const DEFAULT_CATALOG_URL: &str = "https://dummyjson.com/products";

/// Number of products requested from the catalog.
pub const CATALOG_LIMIT: u32 = 100;

/// Default bound on the catalog request.
pub const DEFAULT_CATALOG_TIMEOUT: Duration = Duration::from_secs(10);

/// The catalog could not be fetched. The cause is logged, not carried.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("product catalog unavailable")]
pub struct CatalogUnavailable;

/// A catalog entry. Only `id` is interpreted; everything else is kept as-is.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Product {
    pub id: i64,

    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Product {
    /// Builds a product from one element of the catalog's `products` list.
    pub fn from_value(value: &Value) -> Option<Product> {
        serde_json::from_value(value.clone()).ok()
    }

    pub fn title(&self) -> Option<&str> {
        self.attributes.get("title").and_then(Value::as_str)
    }
}

/// Extracts the products from a catalog response body.
///
/// A body without a `products` list yields no products; list elements
/// without an integer `id` are skipped.
pub fn products_from_body(body: &Value) -> Vec<Product> {
    match body.get("products").and_then(Value::as_array) {
        Some(items) => items.iter().filter_map(Product::from_value).collect(),
        None => Vec::new(),
    }
}

/// Somewhere products can be fetched from.
pub trait CatalogSource {
    fn fetch_products(&self) -> Result<Vec<Product>, CatalogUnavailable>;
}

/// Fetches the catalog over HTTP with a single GET request.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    url: String,
    timeout: Duration,
}

impl HttpCatalog {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        HttpCatalog {
            url: url.into(),
            timeout,
        }
    }
}

impl CatalogSource for HttpCatalog {
    fn fetch_products(&self) -> Result<Vec<Product>, CatalogUnavailable> {
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| {
                warn!("Could not build HTTP client: {}", e);
                CatalogUnavailable
            })?;

        let body: Value = client
            .get(&self.url)
            .query(&[("limit", CATALOG_LIMIT)])
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.json())
            .map_err(|e| {
                warn!("Catalog request to {} failed: {}", self.url, e);
                CatalogUnavailable
            })?;

        Ok(products_from_body(&body))
    }
}

/// Fetches products from `source`, falling back to none on failure.
pub fn fetch_all_products<S: CatalogSource + ?Sized>(source: &S) -> Vec<Product> {
    match source.fetch_products() {
        Ok(products) => {
            info!("Fetched {} products from catalog", products.len());
            products
        }
        Err(e) => {
            warn!("{}, continuing without enrichment", e);
            Vec::new()
        }
    }
}

/// Products indexed by catalog id.
#[derive(Debug, Default)]
pub struct ProductCatalog {
    by_id: HashMap<i64, Product>,
}

impl ProductCatalog {
    /// Indexes `products` by id. A later product replaces an earlier one
    /// with the same id.
    pub fn from_products(products: Vec<Product>) -> Self {
        let by_id = products.into_iter().map(|p| (p.id, p)).collect();
        ProductCatalog { by_id }
    }

    pub fn get(&self, id: i64) -> Option<&Product> {
        self.by_id.get(&id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Whether the transaction's derived catalog key is present.
    pub fn matches(&self, tx: &Transaction) -> bool {
        tx.catalog_key()
            .map(|key| self.by_id.contains_key(&key))
            .unwrap_or(false)
    }

    /// Annotates one transaction with its match flag.
    pub fn enrich(&self, tx: &Transaction) -> EnrichedTransaction {
        EnrichedTransaction::from_transaction(tx, self.matches(tx))
    }
}

/// Annotates every transaction, preserving order.
pub fn enrich_sales_data(
    transactions: &[Transaction],
    catalog: &ProductCatalog,
) -> Vec<EnrichedTransaction> {
    transactions.iter().map(|tx| catalog.enrich(tx)).collect()
}
