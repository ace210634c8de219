//! Product catalog - sphere and flange families with priced models
//!
//! Each family is a set of named categories, each owning an ordered list of
//! `(model, price)` entries. Both families share one implementation
//! ([`Family`]) and are persisted together as a single [`CatalogDocument`].
//!
//! A [`Catalog`] opened on a file saves after every successful mutation.
//! Validation failures are returned as [`CatalogError`] and never logged;
//! I/O failures are logged and returned as [`StoreError`].

use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::document::{self, CatalogDocument, StoreError, CATALOG_REQUIRED_FIELDS};
use crate::core::ordered::OrderedMap;

/// A priced model within a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub model: String,
    pub price: f64,
}

/// Component family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FamilyKind {
    Sphere,
    Flange,
}

impl FamilyKind {
    pub const ALL: [FamilyKind; 2] = [FamilyKind::Sphere, FamilyKind::Flange];
}

impl std::fmt::Display for FamilyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FamilyKind::Sphere => write!(f, "sphere"),
            FamilyKind::Flange => write!(f, "flange"),
        }
    }
}

impl std::str::FromStr for FamilyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sphere" => Ok(FamilyKind::Sphere),
            "flange" => Ok(FamilyKind::Flange),
            _ => Err(format!("Invalid family: {}. Use 'sphere' or 'flange'", s)),
        }
    }
}

/// Validation failures for catalog mutations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("category name cannot be empty")]
    EmptyCategory,

    #[error("category '{0}' already exists")]
    DuplicateCategory(String),

    #[error("category '{0}' does not exist")]
    UnknownCategory(String),

    #[error("model name cannot be empty")]
    EmptyModel,

    #[error("model '{model}' already exists in category '{category}'")]
    DuplicateModel { category: String, model: String },

    #[error("model '{model}' does not exist in category '{category}'")]
    UnknownModel { category: String, model: String },
}

/// One component family: categories in creation order, each with its models
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Family {
    categories: OrderedMap<Vec<CatalogEntry>>,
}

impl Family {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty category
    pub fn add_category(&mut self, name: &str) -> Result<(), CatalogError> {
        if name.is_empty() {
            return Err(CatalogError::EmptyCategory);
        }
        if !self.categories.insert(name.to_string(), Vec::new()) {
            return Err(CatalogError::DuplicateCategory(name.to_string()));
        }
        Ok(())
    }

    /// Append a model to an existing category.
    ///
    /// Model names are unique per category (exact, case-sensitive match).
    /// The price is stored as given; zero and negative prices are accepted.
    pub fn add_model(&mut self, category: &str, model: &str, price: f64) -> Result<(), CatalogError> {
        let entries = self
            .categories
            .get_mut(category)
            .ok_or_else(|| CatalogError::UnknownCategory(category.to_string()))?;
        if model.is_empty() {
            return Err(CatalogError::EmptyModel);
        }
        if entries.iter().any(|e| e.model == model) {
            return Err(CatalogError::DuplicateModel {
                category: category.to_string(),
                model: model.to_string(),
            });
        }
        entries.push(CatalogEntry {
            model: model.to_string(),
            price,
        });
        Ok(())
    }

    /// Remove a category together with all of its models
    pub fn delete_category(&mut self, name: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
        self.categories
            .remove(name)
            .ok_or_else(|| CatalogError::UnknownCategory(name.to_string()))
    }

    /// Remove one model from a category
    pub fn delete_model(&mut self, category: &str, model: &str) -> Result<CatalogEntry, CatalogError> {
        let entries = self
            .categories
            .get_mut(category)
            .ok_or_else(|| CatalogError::UnknownCategory(category.to_string()))?;
        let pos = entries
            .iter()
            .position(|e| e.model == model)
            .ok_or_else(|| CatalogError::UnknownModel {
                category: category.to_string(),
                model: model.to_string(),
            })?;
        Ok(entries.remove(pos))
    }

    /// Price of a model, or 0.0 when the category or model is unknown.
    ///
    /// Callers cannot tell "not found" from "free" through this call; use
    /// [`Family::contains_model`] when the difference matters.
    pub fn price(&self, category: &str, model: &str) -> f64 {
        self.categories
            .get(category)
            .and_then(|entries| entries.iter().find(|e| e.model == model))
            .map_or(0.0, |e| e.price)
    }

    pub fn contains_category(&self, category: &str) -> bool {
        self.categories.contains_key(category)
    }

    pub fn contains_model(&self, category: &str, model: &str) -> bool {
        self.entries(category).iter().any(|e| e.model == model)
    }

    /// Category names in creation order
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys()
    }

    /// Model names of a category in insertion order (empty if unknown)
    pub fn models(&self, category: &str) -> Vec<&str> {
        self.entries(category)
            .iter()
            .map(|e| e.model.as_str())
            .collect()
    }

    /// Entries of a category in insertion order (empty if unknown)
    pub fn entries(&self, category: &str) -> &[CatalogEntry] {
        self.categories
            .get(category)
            .map_or(&[][..], Vec::as_slice)
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn model_count(&self) -> usize {
        self.categories.iter().map(|(_, e)| e.len()).sum()
    }

    /// Rebuild a family from its serialized name list and model map.
    ///
    /// Listed names without a map entry get an empty list; map keys missing
    /// from the list are appended. Repeated names and repeated models within
    /// a category keep their first occurrence.
    fn from_parts(
        names: Vec<String>,
        mut models: BTreeMap<String, Vec<CatalogEntry>>,
    ) -> Self {
        let mut family = Family::new();
        let listed = names
            .into_iter()
            .map(|name| {
                let entries = models.remove(&name).unwrap_or_default();
                (name, entries)
            })
            .collect::<Vec<_>>();

        for (name, entries) in listed.into_iter().chain(models) {
            let mut unique: Vec<CatalogEntry> = Vec::with_capacity(entries.len());
            for entry in entries {
                if !unique.iter().any(|e| e.model == entry.model) {
                    unique.push(entry);
                }
            }
            family.categories.insert(name, unique);
        }
        family
    }

    fn to_parts(&self) -> (Vec<String>, BTreeMap<String, Vec<CatalogEntry>>) {
        let names = self.categories.keys().map(str::to_string).collect();
        let models = self
            .categories
            .iter()
            .map(|(name, entries)| (name.to_string(), entries.clone()))
            .collect();
        (names, models)
    }
}

/// Both component families plus the file they persist to
#[derive(Debug)]
pub struct Catalog {
    spheres: Family,
    flanges: Family,
    store: Option<PathBuf>,
}

impl Catalog {
    /// An empty catalog that never touches the filesystem
    pub fn in_memory() -> Self {
        Self {
            spheres: Family::new(),
            flanges: Family::new(),
            store: None,
        }
    }

    /// Open the catalog stored at `path`.
    ///
    /// A missing or unreadable file is not an error: the catalog starts empty
    /// and the problem is logged.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let mut catalog = Self {
            store: Some(path.into()),
            ..Self::in_memory()
        };
        match catalog.load() {
            Ok(()) => {}
            Err(StoreError::Io { ref source, ref path })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                info!(
                    "event=catalog_load module=catalog status=empty path={}",
                    path.display()
                );
            }
            // load() has already logged the failure; keep the unreadable
            // file before the next save replaces it.
            Err(_) => {
                if let Some(path) = &catalog.store {
                    backup_unreadable(path);
                }
            }
        }
        catalog
    }

    /// Where [`Catalog::open`] copies a catalog file it could not read
    pub fn backup_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_os_string();
        name.push(".bak");
        PathBuf::from(name)
    }

    pub fn family(&self, kind: FamilyKind) -> &Family {
        match kind {
            FamilyKind::Sphere => &self.spheres,
            FamilyKind::Flange => &self.flanges,
        }
    }

    fn family_mut(&mut self, kind: FamilyKind) -> &mut Family {
        match kind {
            FamilyKind::Sphere => &mut self.spheres,
            FamilyKind::Flange => &mut self.flanges,
        }
    }

    pub fn spheres(&self) -> &Family {
        &self.spheres
    }

    pub fn flanges(&self) -> &Family {
        &self.flanges
    }

    pub fn add_category(&mut self, kind: FamilyKind, name: &str) -> Result<(), CatalogError> {
        self.family_mut(kind).add_category(name)?;
        self.persist();
        Ok(())
    }

    pub fn add_model(
        &mut self,
        kind: FamilyKind,
        category: &str,
        model: &str,
        price: f64,
    ) -> Result<(), CatalogError> {
        self.family_mut(kind).add_model(category, model, price)?;
        self.persist();
        Ok(())
    }

    pub fn delete_category(&mut self, kind: FamilyKind, name: &str) -> Result<(), CatalogError> {
        let removed = self.family_mut(kind).delete_category(name)?;
        info!(
            "event=category_deleted module=catalog family={} models_removed={}",
            kind,
            removed.len()
        );
        self.persist();
        Ok(())
    }

    pub fn delete_model(
        &mut self,
        kind: FamilyKind,
        category: &str,
        model: &str,
    ) -> Result<(), CatalogError> {
        self.family_mut(kind).delete_model(category, model)?;
        self.persist();
        Ok(())
    }

    /// Price lookup; 0.0 when not found
    pub fn price(&self, kind: FamilyKind, category: &str, model: &str) -> f64 {
        self.family(kind).price(category, model)
    }

    pub fn sphere_price(&self, category: &str, model: &str) -> f64 {
        self.spheres.price(category, model)
    }

    pub fn flange_price(&self, category: &str, model: &str) -> f64 {
        self.flanges.price(category, model)
    }

    pub fn list_models(&self, kind: FamilyKind, category: &str) -> Vec<&str> {
        self.family(kind).models(category)
    }

    /// Snapshot of both families as a document stamped with the current time
    pub fn to_document(&self) -> CatalogDocument {
        let (sphere_types, sphere_models) = self.spheres.to_parts();
        let (flange_types, flange_models) = self.flanges.to_parts();
        CatalogDocument {
            sphere_types,
            sphere_models,
            flange_types,
            flange_models,
            export_date: Some(document::now()),
            version: document::FORMAT_VERSION.to_string(),
        }
    }

    fn apply_document(&mut self, doc: CatalogDocument) {
        self.spheres = Family::from_parts(doc.sphere_types, doc.sphere_models);
        self.flanges = Family::from_parts(doc.flange_types, doc.flange_models);
    }

    /// Save to the catalog's own file
    pub fn save(&self) -> Result<(), StoreError> {
        let path = self.store.as_deref().ok_or(StoreError::StorageUnavailable)?;
        self.write_to(path).inspect_err(|e| {
            error!("event=catalog_save module=catalog status=error error={}", e);
        })
    }

    /// Reload from the catalog's own file, replacing in-memory state on success
    pub fn load(&mut self) -> Result<(), StoreError> {
        let path = self
            .store
            .clone()
            .ok_or(StoreError::StorageUnavailable)?;
        let doc = document::read_value(&path)
            .and_then(|value| document::from_value::<CatalogDocument>(&path, value))
            .inspect_err(|e| {
                if !is_not_found(e) {
                    error!("event=catalog_load module=catalog status=error error={}", e);
                }
            })?;
        self.apply_document(doc);
        info!(
            "event=catalog_load module=catalog status=ok spheres={} flanges={} path={}",
            self.spheres.category_count(),
            self.flanges.category_count(),
            path.display()
        );
        Ok(())
    }

    /// Write the catalog to a caller-chosen file
    pub fn export(&self, path: &Path) -> Result<(), StoreError> {
        self.write_to(path)
            .inspect(|_| {
                info!(
                    "event=catalog_export module=catalog status=ok path={}",
                    path.display()
                );
            })
            .inspect_err(|e| {
                error!("event=catalog_export module=catalog status=error error={}", e);
            })
    }

    /// Replace both families with the contents of a caller-chosen file.
    ///
    /// The document must carry all four family fields, otherwise nothing
    /// changes. A successful import is saved to the catalog's own file.
    pub fn import(&mut self, path: &Path) -> Result<(), StoreError> {
        let doc = document::read_value(path)
            .and_then(|value| {
                document::require_fields(path, &value, &CATALOG_REQUIRED_FIELDS)?;
                document::from_value::<CatalogDocument>(path, value)
            })
            .inspect_err(|e| {
                error!("event=catalog_import module=catalog status=error error={}", e);
            })?;
        self.apply_document(doc);
        info!(
            "event=catalog_import module=catalog status=ok path={}",
            path.display()
        );
        self.persist();
        Ok(())
    }

    /// End-of-session save; a no-op for in-memory catalogs
    pub fn close(self) -> Result<(), StoreError> {
        if self.store.is_some() {
            self.save()?;
        }
        Ok(())
    }

    fn write_to(&self, path: &Path) -> Result<(), StoreError> {
        document::write_json(path, &self.to_document())
    }

    /// Save after a mutation. A failed save is logged; the mutation stands.
    fn persist(&self) {
        if self.store.is_none() {
            return;
        }
        if let Err(e) = self.save() {
            warn!(
                "event=catalog_persist module=catalog status=error detail=\"mutation kept in memory\" error={}",
                e
            );
        }
    }
}

fn backup_unreadable(path: &Path) {
    let backup = Catalog::backup_path(path);
    match std::fs::copy(path, &backup) {
        Ok(_) => warn!(
            "event=catalog_backup module=catalog status=ok path={}",
            backup.display()
        ),
        Err(e) => error!(
            "event=catalog_backup module=catalog status=error path={} error={}",
            backup.display(),
            e
        ),
    }
}

fn is_not_found(err: &StoreError) -> bool {
    matches!(err, StoreError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
}
