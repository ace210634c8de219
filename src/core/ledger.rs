//! Quotation ledger - priced line items and a running total
//!
//! The ledger prices joints against a borrowed [`Catalog`]:
//!
//! ```text
//! joint price = sphere price + flange price * flange quantity
//! line total  = joint price * joint quantity
//! ```
//!
//! Unknown selections price at 0.0; the ledger trusts its caller to have
//! checked selections against the catalog.

use log::{error, info};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::core::catalog::Catalog;
use crate::core::document::{self, QuotationDocument, StoreError, QUOTATION_REQUIRED_FIELD};

/// A chosen (category, model) pair within one family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub category: String,
    pub model: String,
}

impl Selection {
    pub fn new(category: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            model: model.into(),
        }
    }
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.category, self.model)
    }
}

/// One joint configuration: a sphere plus `flange_qty` flanges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JointSpec {
    pub sphere: Selection,
    pub flange: Selection,
    pub flange_qty: u32,
}

/// One quotation row.
///
/// Prices are copied from the catalog when the item is created and are never
/// looked up again, so later catalog price changes do not alter existing
/// quotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub sphere_type: String,
    pub sphere_model: String,
    pub flange_type: String,
    pub flange_model: String,
    pub flange_quantity: u32,
    pub joint_quantity: u32,
    pub sphere_price: f64,
    pub flange_price: f64,
    pub joint_price: f64,
    pub total_price: f64,
}

impl LineItem {
    /// "category - model" label for the sphere
    pub fn sphere_label(&self) -> String {
        format!("{} - {}", self.sphere_type, self.sphere_model)
    }

    /// "category - model" label for the flange
    pub fn flange_label(&self) -> String {
        format!("{} - {}", self.flange_type, self.flange_model)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("no quotation item at index {index} (quotation has {len} item(s))")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Ordered line items plus their cached total
#[derive(Debug)]
pub struct Ledger<'c> {
    catalog: &'c Catalog,
    items: Vec<LineItem>,
    total: f64,
}

impl<'c> Ledger<'c> {
    /// An empty quotation priced against `catalog`
    pub fn new(catalog: &'c Catalog) -> Self {
        Self {
            catalog,
            items: Vec::new(),
            total: 0.0,
        }
    }

    /// Unit price of one joint at current catalog prices
    pub fn price_joint(&self, spec: &JointSpec) -> f64 {
        let (sphere_price, flange_price) = self.component_prices(spec);
        sphere_price + flange_price * f64::from(spec.flange_qty)
    }

    /// Price a joint, append it as a new line and return the line total
    pub fn add_item(&mut self, spec: JointSpec, joint_qty: u32) -> f64 {
        let (sphere_price, flange_price) = self.component_prices(&spec);
        let joint_price = sphere_price + flange_price * f64::from(spec.flange_qty);
        let total_price = joint_price * f64::from(joint_qty);

        // Snapshot by value: the item owns its prices from here on.
        self.items.push(LineItem {
            sphere_type: spec.sphere.category,
            sphere_model: spec.sphere.model,
            flange_type: spec.flange.category,
            flange_model: spec.flange.model,
            flange_quantity: spec.flange_qty,
            joint_quantity: joint_qty,
            sphere_price,
            flange_price,
            joint_price,
            total_price,
        });
        self.recompute_total();
        total_price
    }

    /// Remove the item at `index` (0-based)
    pub fn delete_item(&mut self, index: usize) -> Result<LineItem, LedgerError> {
        if index >= self.items.len() {
            return Err(LedgerError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        let removed = self.items.remove(index);
        self.recompute_total();
        Ok(removed)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.total = 0.0;
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Sum of all line totals
    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn to_document(&self) -> QuotationDocument {
        QuotationDocument {
            quotation_items: self.items.clone(),
            total_price: self.total,
            save_date: Some(document::now()),
            version: document::FORMAT_VERSION.to_string(),
        }
    }

    /// Write the quotation to `path`
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        document::write_json(path, &self.to_document())
            .inspect(|_| {
                info!(
                    "event=quotation_save module=ledger status=ok items={} path={}",
                    self.items.len(),
                    path.display()
                );
            })
            .inspect_err(|e| {
                error!("event=quotation_save module=ledger status=error error={}", e);
            })
    }

    /// Replace the quotation with the contents of `path`.
    ///
    /// The stored total is ignored and recomputed from the loaded items.
    pub fn load(&mut self, path: &Path) -> Result<(), StoreError> {
        let doc = document::read_value(path)
            .and_then(|value| {
                document::require_fields(path, &value, &[QUOTATION_REQUIRED_FIELD])?;
                document::from_value::<QuotationDocument>(path, value)
            })
            .inspect_err(|e| {
                error!("event=quotation_load module=ledger status=error error={}", e);
            })?;
        self.items = doc.quotation_items;
        self.recompute_total();
        info!(
            "event=quotation_load module=ledger status=ok items={} path={}",
            self.items.len(),
            path.display()
        );
        Ok(())
    }

    fn component_prices(&self, spec: &JointSpec) -> (f64, f64) {
        (
            self.catalog
                .sphere_price(&spec.sphere.category, &spec.sphere.model),
            self.catalog
                .flange_price(&spec.flange.category, &spec.flange.model),
        )
    }

    fn recompute_total(&mut self) {
        // `Sum` over no items yields -0.0; start the fold from +0.0.
        self.total = self
            .items
            .iter()
            .fold(0.0, |acc, item| acc + item.total_price);
    }
}
