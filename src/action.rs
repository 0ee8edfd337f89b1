use strum::Display;

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum Action {
    List,

    Install(String),
    Uninstall(String),
    Toggle(String),

    Add { identifier: String, specifier: String },
    Remove(String),
    AddSource(String),
    RemoveSource(String),

    Contains(String),
    DeriveIdentifier(String),

    OpenManifest,
    OpenLink(String),
}
