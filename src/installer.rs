use std::collections::HashSet;

use tracing::warn;

use crate::catalog::PackageDescriptor;
use crate::errors::AppResult;
use crate::manifest::{ChangeOutcome, ManifestStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageStatus<'a> {
    pub package: &'a PackageDescriptor,
    pub installed: bool,
}

/// Catalog level operations over a manifest. A package counts as installed when its identifier
/// is a key of `dependencies`, whether it comes from a registry or a repository.
pub struct Installer<'a> {
    store: &'a ManifestStore,
    packages: &'a [PackageDescriptor],
}

impl<'a> Installer<'a> {
    pub fn new(store: &'a ManifestStore, packages: &'a [PackageDescriptor]) -> Self {
        Self { store, packages }
    }

    /// Installed state of every catalog package, read from a single snapshot of the manifest.
    pub fn status(&self) -> Vec<PackageStatus<'a>> {
        let installed: HashSet<String> = match self.store.dependencies() {
            Ok(Some(dependencies)) => dependencies.into_keys().collect(),
            Ok(None) => HashSet::new(),
            Err(err) => {
                warn!("Showing every package as not installed: {err}");
                HashSet::new()
            }
        };

        self.packages
            .iter()
            .map(|package| PackageStatus {
                package,
                installed: installed.contains(package.identifier()),
            })
            .collect()
    }

    pub fn install(&self, package: &PackageDescriptor) -> AppResult<ChangeOutcome> {
        self.store.add(package.identifier(), package.specifier())
    }

    pub fn uninstall(&self, package: &PackageDescriptor) -> AppResult<ChangeOutcome> {
        self.store.remove(package.identifier())
    }

    pub fn toggle(&self, package: &PackageDescriptor) -> AppResult<ChangeOutcome> {
        if self.store.contains(package.identifier()) {
            self.uninstall(package)
        } else {
            self.install(package)
        }
    }
}
