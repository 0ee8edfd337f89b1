use crate::errors::{AppError, AppResult};
use crate::manifest::derive_identifier;

/// A catalog package with its manifest key resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDescriptor {
    pub name: String,
    pub source: PackageSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageSource {
    Registry { identifier: String, version: String },
    Source { identifier: String, url: String },
}

impl PackageDescriptor {
    pub fn registry(name: &str, coordinate: &str) -> AppResult<Self> {
        let (identifier, version) = parse_coordinate(coordinate)?;
        Ok(Self {
            name: name.to_string(),
            source: PackageSource::Registry {
                identifier,
                version,
            },
        })
    }

    pub fn source(name: &str, url: &str) -> AppResult<Self> {
        Ok(Self {
            name: name.to_string(),
            source: PackageSource::Source {
                identifier: derive_identifier(url)?,
                url: url.to_string(),
            },
        })
    }

    /// Key of the package in the manifest's `dependencies`.
    pub fn identifier(&self) -> &str {
        match &self.source {
            PackageSource::Registry { identifier, .. } => identifier,
            PackageSource::Source { identifier, .. } => identifier,
        }
    }

    /// Value written for the package: a version or a repository url.
    pub fn specifier(&self) -> &str {
        match &self.source {
            PackageSource::Registry { version, .. } => version,
            PackageSource::Source { url, .. } => url,
        }
    }

    pub fn is_source(&self) -> bool {
        matches!(self.source, PackageSource::Source { .. })
    }
}

/// Splits an `identifier:version` coordinate at its first `:`.
pub fn parse_coordinate(coordinate: &str) -> AppResult<(String, String)> {
    match coordinate.trim().split_once(':') {
        Some((identifier, version)) if !identifier.is_empty() && !version.is_empty() => {
            Ok((identifier.to_string(), version.to_string()))
        }
        _ => Err(AppError::InvalidCoordinate(coordinate.to_string())),
    }
}
