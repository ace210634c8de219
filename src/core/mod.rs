//! Core module - catalog, quotation ledger and their persistence

pub mod catalog;
pub mod config;
pub mod document;
pub mod ledger;
pub mod ordered;
pub mod paths;

pub use catalog::{Catalog, CatalogEntry, CatalogError, Family, FamilyKind};
pub use config::{Config, ConfigError};
pub use document::{CatalogDocument, QuotationDocument, StoreError, FORMAT_VERSION};
pub use ledger::{JointSpec, Ledger, LedgerError, LineItem, Selection};
pub use ordered::OrderedMap;
pub use paths::{DataDir, PathError};
