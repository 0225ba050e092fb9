//! Maps a human-supplied path or project name to a registry record.
//!
//! Path resolution is two-pass: an exact match on the normalized project
//! root always wins; otherwise the record whose root is the longest proper
//! ancestor of the input wins, so the most specific project is picked when
//! roots are nested. Name lookup is exact-match in whatever order the
//! directory listing yields.

use std::path::Path;

use tracing::debug;

use intrig_types::DiscoveryMetadata;

use crate::discovery::registry::{RegistryStore, normalize_path};
use crate::error::Result;

pub struct Resolver {
    store: RegistryStore,
}

impl Resolver {
    pub fn new(store: RegistryStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &RegistryStore {
        &self.store
    }

    /// Resolve a filesystem path to the record of the project containing it.
    ///
    /// Exact root match has top precedence. Failing that, among records whose
    /// root is a proper ancestor directory of the input, the longest root
    /// wins. Returns `None` when no registered root covers the path.
    pub fn resolve_by_path(&self, input: &Path) -> Result<Option<DiscoveryMetadata>> {
        let target = normalize_path(input);
        let records = self.store.scan()?;

        let mut candidates: Vec<(std::path::PathBuf, DiscoveryMetadata)> = records
            .into_iter()
            .map(|record| (normalize_path(&record.path), record))
            .collect();

        if let Some(index) = candidates.iter().position(|(root, _)| *root == target) {
            return Ok(Some(candidates.swap_remove(index).1));
        }

        let best = candidates
            .into_iter()
            .filter(|(root, _)| target.starts_with(root) && *root != target)
            .max_by_key(|(root, _)| root.as_os_str().len())
            .map(|(_, record)| record);

        if best.is_none() {
            debug!("no registry record covers {}", target.display());
        }
        Ok(best)
    }

    /// First record whose `projectName` equals `name` exactly.
    ///
    /// When several instances share a name the winner depends on directory
    /// listing order, which is filesystem-dependent and unspecified.
    pub fn find_by_name(&self, name: &str) -> Result<Option<DiscoveryMetadata>> {
        let records = self.store.scan()?;
        Ok(records.into_iter().find(|r| r.project_name == name))
    }

    /// Resolve an identifier that may be a path or a project name.
    pub fn resolve_identifier(&self, identifier: &str) -> Result<Option<DiscoveryMetadata>> {
        if let Some(record) = self.resolve_by_path(Path::new(identifier))? {
            return Ok(Some(record));
        }
        self.find_by_name(identifier)
    }
}
