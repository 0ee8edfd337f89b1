mod package;

use serde::Deserialize;

use crate::errors::AppResult;

pub use package::*;

/// Installable packages and reference links, as read from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub registry: Vec<RegistryEntry>,
    #[serde(default)]
    pub source: Vec<SourceEntry>,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegistryEntry {
    pub name: String,
    /// `identifier:version`
    pub coordinate: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceEntry {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Link {
    pub name: String,
    pub url: String,
}

impl Catalog {
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty() && self.source.is_empty() && self.links.is_empty()
    }

    /// Resolves every entry into a descriptor, registry packages first.
    pub fn packages(&self) -> AppResult<Vec<PackageDescriptor>> {
        let registry = self
            .registry
            .iter()
            .map(|entry| PackageDescriptor::registry(&entry.name, &entry.coordinate));
        let source = self
            .source
            .iter()
            .map(|entry| PackageDescriptor::source(&entry.name, &entry.url));
        registry.chain(source).collect()
    }

    pub fn find_link(&self, name: &str) -> Option<&Link> {
        self.links
            .iter()
            .find(|link| link.name.eq_ignore_ascii_case(name.trim()))
    }
}

/// Looks a package up by display name (ignoring case), then by identifier.
pub fn find<'a>(packages: &'a [PackageDescriptor], query: &str) -> Option<&'a PackageDescriptor> {
    let query = query.trim();
    packages
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(query))
        .or_else(|| packages.iter().find(|p| p.identifier() == query))
}
