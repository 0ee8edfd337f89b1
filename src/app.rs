use std::path::PathBuf;

use tracing::{debug, error, info, warn};

use crate::action::Action;
use crate::catalog::{self, PackageDescriptor};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::installer::Installer;
use crate::manifest::{derive_identifier, ChangeOutcome};
use crate::project::Project;

pub struct App {
    config: Config,
    project: Project,
}

impl App {
    pub fn new(config: Config, proj_dir: PathBuf, manifest: Option<PathBuf>) -> Self {
        let project = match manifest {
            Some(manifest) => Project::with_manifest(manifest),
            None => Project::locate(&proj_dir, &config.manifest_path),
        };

        debug!(
            "Config directory {}, data directory {}",
            config.config.config_dir.display(),
            config.config.data_dir.display()
        );
        info!("Project root: {}", project.root.display());

        Self { config, project }
    }

    /// Runs each action in turn. A failing action does not stop the ones after it.
    pub fn run(&self, actions: Vec<Action>) -> AppResult<()> {
        let total = actions.len();
        let mut failed = 0;
        let mut changed = 0;

        for action in actions {
            info!("Got action: {action:?}");
            match self.handle_action(&action) {
                Ok(Some(outcome)) if outcome.changed() => changed += 1,
                Ok(_) => {}
                Err(err) => {
                    error!("{action} failed: {err}");
                    failed += 1;
                }
            }
        }

        if changed > 0 {
            info!("{changed} manifest edit(s) written");
        }

        if failed > 0 {
            return Err(AppError::Unknown(format!(
                "{failed} of {total} operations failed"
            )));
        }

        Ok(())
    }

    /// Runs one action, returning the manifest outcome for actions that edit it.
    fn handle_action(&self, action: &Action) -> AppResult<Option<ChangeOutcome>> {
        let outcome = match action {
            Action::List => {
                self.list()?;
                None
            }
            Action::Install(name) => {
                let package = self.find_package(name)?;
                let outcome = self.installer(&package).install(&package)?;
                report_package(&package, outcome);
                Some(outcome)
            }
            Action::Uninstall(name) => {
                let package = self.find_package(name)?;
                let outcome = self.installer(&package).uninstall(&package)?;
                report_package(&package, outcome);
                Some(outcome)
            }
            Action::Toggle(name) => {
                let package = self.find_package(name)?;
                let outcome = self.installer(&package).toggle(&package)?;
                report_package(&package, outcome);
                Some(outcome)
            }
            Action::Add {
                identifier,
                specifier,
            } => {
                let outcome = self.project.store.add(identifier, specifier)?;
                report(identifier, outcome);
                Some(outcome)
            }
            Action::Remove(identifier) => {
                let outcome = self.project.store.remove(identifier)?;
                report(identifier, outcome);
                Some(outcome)
            }
            Action::AddSource(url) => {
                let identifier = derive_identifier(url)?;
                let outcome = self.project.store.add(&identifier, url)?;
                report(&identifier, outcome);
                Some(outcome)
            }
            Action::RemoveSource(url) => {
                let identifier = derive_identifier(url)?;
                let outcome = self.project.store.remove(&identifier)?;
                report(&identifier, outcome);
                Some(outcome)
            }
            Action::Contains(identifier) => {
                println!("{}", self.project.store.contains(identifier));
                None
            }
            Action::DeriveIdentifier(url) => {
                println!("{}", derive_identifier(url)?);
                None
            }
            Action::OpenManifest => {
                let path = self.project.store.path();
                if !self.project.store.exists() {
                    warn!("{} not found, nothing to open", path.display());
                    println!("{}: {}", path.display(), ChangeOutcome::ManifestMissing);
                    return Ok(None);
                }
                open::that(path)?;
                None
            }
            Action::OpenLink(name) => {
                let link = self
                    .config
                    .catalog
                    .find_link(name)
                    .ok_or_else(|| AppError::UnknownPackage(name.clone()))?;
                info!("Opening {}", link.url);
                open::that(&link.url)?;
                None
            }
        };

        Ok(outcome)
    }

    fn list(&self) -> AppResult<()> {
        let packages = self.config.catalog.packages()?;
        let installer = Installer::new(&self.project.store, &packages);
        let statuses = installer.status();

        let manifest = self.project.store.path().display();
        if self.project.store.exists() {
            println!("Manifest: {manifest}");
        } else {
            println!("Manifest: {manifest} ({})", ChangeOutcome::ManifestMissing);
        }

        let width = packages
            .iter()
            .map(|p| p.name.len())
            .chain(self.config.catalog.links.iter().map(|l| l.name.len()))
            .max()
            .unwrap_or_default();

        for (title, source) in [("Registry packages", false), ("Source packages", true)] {
            let rows: Vec<_> = statuses
                .iter()
                .filter(|s| s.package.is_source() == source)
                .collect();
            if rows.is_empty() {
                continue;
            }

            println!();
            println!("{title}");
            for status in rows {
                let mark = if status.installed { "x" } else { " " };
                let package = status.package;
                if source {
                    println!("  [{mark}] {:width$}  {}", package.name, package.identifier());
                } else {
                    println!(
                        "  [{mark}] {:width$}  {}@{}",
                        package.name,
                        package.identifier(),
                        package.specifier()
                    );
                }
            }
        }

        if !self.config.catalog.links.is_empty() {
            println!();
            println!("Links");
            for link in &self.config.catalog.links {
                println!("      {:width$}  {}", link.name, link.url);
            }
        }

        Ok(())
    }

    fn find_package(&self, name: &str) -> AppResult<PackageDescriptor> {
        let packages = self.config.catalog.packages()?;
        catalog::find(&packages, name)
            .cloned()
            .ok_or_else(|| AppError::UnknownPackage(name.to_string()))
    }

    fn installer<'a>(&'a self, package: &'a PackageDescriptor) -> Installer<'a> {
        Installer::new(&self.project.store, std::slice::from_ref(package))
    }
}

fn report_package(package: &PackageDescriptor, outcome: ChangeOutcome) {
    println!("{} ({}): {outcome}", package.name, package.identifier());
}

fn report(identifier: &str, outcome: ChangeOutcome) {
    println!("{identifier}: {outcome}");
}
