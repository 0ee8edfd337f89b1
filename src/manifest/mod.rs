mod identifier;
mod store;

use strum::Display;

pub use identifier::derive_identifier;
pub use store::ManifestStore;

/// Result of an add or remove. Only `Added` and `Removed` touch the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ChangeOutcome {
    #[strum(to_string = "added")]
    Added,
    #[strum(to_string = "removed")]
    Removed,
    #[strum(to_string = "already present")]
    AlreadyPresent,
    #[strum(to_string = "not present")]
    NotPresent,
    #[strum(to_string = "manifest not found")]
    ManifestMissing,
}

impl ChangeOutcome {
    pub fn changed(&self) -> bool {
        matches!(self, ChangeOutcome::Added | ChangeOutcome::Removed)
    }
}
