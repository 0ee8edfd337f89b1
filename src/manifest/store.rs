use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::errors::{AppError, AppResult};
use crate::manifest::ChangeOutcome;

const DEPENDENCIES: &str = "dependencies";

/// Reads and rewrites the `dependencies` object of a JSON manifest file.
///
/// Every operation is a full read, parse, mutate and write cycle. The file is owned by whoever
/// created it; a missing file is never created here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestStore {
    path: PathBuf,
}

struct Document {
    root: Map<String, Value>,
    trailing_newline: bool,
}

impl ManifestStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Whether `identifier` is a key of `dependencies`. A missing or unreadable manifest counts
    /// as not found.
    pub fn contains(&self, identifier: &str) -> bool {
        let document = match self.read() {
            Ok(Some(document)) => document,
            Ok(None) => return false,
            Err(err) => {
                warn!("Treating '{identifier}' as not found: {err}");
                return false;
            }
        };

        match self.dependencies_of(&document) {
            Ok(dependencies) => dependencies.contains_key(identifier),
            Err(err) => {
                warn!("Treating '{identifier}' as not found: {err}");
                false
            }
        }
    }

    pub fn add(&self, identifier: &str, specifier: &str) -> AppResult<ChangeOutcome> {
        if identifier.is_empty() {
            return Err(AppError::InvalidEntry("identifier is empty".into()));
        }
        if identifier
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(AppError::InvalidEntry(format!(
                "identifier {identifier:?} contains whitespace or control characters"
            )));
        }
        if specifier.trim().is_empty() {
            return Err(AppError::InvalidEntry(format!(
                "'{identifier}' has an empty version"
            )));
        }

        let Some(mut document) = self.read()? else {
            warn!("{} not found, '{identifier}' was not added", self.path.display());
            return Ok(ChangeOutcome::ManifestMissing);
        };

        let dependencies = self.dependencies_of_mut(&mut document)?;
        if dependencies.contains_key(identifier) {
            warn!("'{identifier}' already present in {}", self.path.display());
            return Ok(ChangeOutcome::AlreadyPresent);
        }
        dependencies.insert(identifier.to_string(), Value::String(specifier.to_string()));

        self.write(&document)?;
        info!("Package '{identifier}' added to {}", self.path.display());
        Ok(ChangeOutcome::Added)
    }

    pub fn remove(&self, identifier: &str) -> AppResult<ChangeOutcome> {
        let Some(mut document) = self.read()? else {
            warn!("{} not found, '{identifier}' was not removed", self.path.display());
            return Ok(ChangeOutcome::ManifestMissing);
        };

        let dependencies = self.dependencies_of_mut(&mut document)?;
        if dependencies.shift_remove(identifier).is_none() {
            warn!("'{identifier}' is not present in {}", self.path.display());
            return Ok(ChangeOutcome::NotPresent);
        }

        self.write(&document)?;
        info!("Package '{identifier}' removed from {}", self.path.display());
        Ok(ChangeOutcome::Removed)
    }

    /// Snapshot of the `dependencies` entries in file order, or `None` if the manifest is
    /// missing. Values that are not strings are rendered as JSON.
    pub fn dependencies(&self) -> AppResult<Option<IndexMap<String, String>>> {
        let Some(document) = self.read()? else {
            return Ok(None);
        };

        let entries = self
            .dependencies_of(&document)?
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), value)
            })
            .collect();

        Ok(Some(entries))
    }

    fn read(&self) -> AppResult<Option<Document>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("{} does not exist", self.path.display());
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        let root = match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(root)) => root,
            Ok(_) => return Err(self.malformed("top level value is not an object")),
            Err(err) => return Err(self.malformed(err)),
        };

        Ok(Some(Document {
            root,
            trailing_newline: text.ends_with('\n'),
        }))
    }

    fn write(&self, document: &Document) -> AppResult<()> {
        // Serialize fully before touching the file so a failure leaves it intact.
        let mut text = serde_json::to_string_pretty(&document.root)?;
        if document.trailing_newline {
            text.push('\n');
        }
        fs::write(&self.path, text)?;
        Ok(())
    }

    fn dependencies_of<'a>(&self, document: &'a Document) -> AppResult<&'a Map<String, Value>> {
        match document.root.get(DEPENDENCIES) {
            Some(Value::Object(dependencies)) => Ok(dependencies),
            Some(_) => Err(self.malformed("'dependencies' is not an object")),
            None => Err(self.malformed("'dependencies' is missing")),
        }
    }

    fn dependencies_of_mut<'a>(
        &self,
        document: &'a mut Document,
    ) -> AppResult<&'a mut Map<String, Value>> {
        match document.root.get_mut(DEPENDENCIES) {
            Some(Value::Object(dependencies)) => Ok(dependencies),
            Some(_) => Err(self.malformed("'dependencies' is not an object")),
            None => Err(self.malformed("'dependencies' is missing")),
        }
    }

    fn malformed(&self, reason: impl ToString) -> AppError {
        AppError::MalformedManifest {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"{
  "dependencies": {
    "com.unity.timeline": "1.8.8",
    "com.unity.ugui": "2.0.0",
    "com.cysharp.unitask": "https://github.com/Cysharp/UniTask.git?path=src/UniTask/Assets/Plugins/UniTask"
  },
  "scopedRegistries": [
    {
      "name": "package.openupm.com",
      "url": "https://package.openupm.com",
      "scopes": [
        "com.openupm"
      ]
    }
  ]
}
"#;

    fn store_with(contents: &str) -> (TempDir, ManifestStore) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manifest.json");
        fs::write(&path, contents).unwrap();
        (dir, ManifestStore::new(path))
    }

    fn keys(store: &ManifestStore) -> Vec<String> {
        store
            .dependencies()
            .unwrap()
            .unwrap()
            .keys()
            .cloned()
            .collect()
    }

    fn read_json(store: &ManifestStore) -> Value {
        serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap()
    }

    #[test]
    fn test_contains() {
        let (_dir, store) = store_with(MANIFEST);
        assert!(store.contains("com.unity.timeline"));
        assert!(store.contains("com.cysharp.unitask"));
        assert!(!store.contains("com.unity.splines"));
        // Values and unrelated fields are not keys.
        assert!(!store.contains("1.8.8"));
        assert!(!store.contains("com.openupm"));
    }

    #[test]
    fn test_contains_missing_manifest() {
        let dir = TempDir::new().unwrap();
        let store = ManifestStore::new(dir.path().join("manifest.json"));
        assert!(!store.contains("com.unity.timeline"));
    }

    #[test]
    fn test_contains_malformed_manifest() {
        let (_dir, store) = store_with(r#"{ "dependencies": { "com.unity.timeline": "#);
        assert!(!store.contains("com.unity.timeline"));

        let (_dir, store) = store_with(r#"{ "dependencies": ["com.unity.timeline"] }"#);
        assert!(!store.contains("com.unity.timeline"));
    }

    #[test]
    fn test_add() {
        let (_dir, store) = store_with(MANIFEST);
        let before = read_json(&store);

        let outcome = store.add("com.unity.splines", "2.6.1").unwrap();

        assert_eq!(outcome, ChangeOutcome::Added);
        assert!(store.contains("com.unity.splines"));
        assert_eq!(
            keys(&store),
            vec![
                "com.unity.timeline",
                "com.unity.ugui",
                "com.cysharp.unitask",
                "com.unity.splines",
            ]
        );
        let after = read_json(&store);
        assert_eq!(after["dependencies"]["com.unity.splines"], "2.6.1");
        assert_eq!(after["scopedRegistries"], before["scopedRegistries"]);
    }

    #[test]
    fn test_add_twice_is_a_noop() {
        let (_dir, store) = store_with(MANIFEST);
        store.add("com.unity.splines", "2.6.1").unwrap();
        let once = fs::read_to_string(store.path()).unwrap();

        let outcome = store.add("com.unity.splines", "9.9.9").unwrap();

        assert_eq!(outcome, ChangeOutcome::AlreadyPresent);
        assert_eq!(fs::read_to_string(store.path()).unwrap(), once);
    }

    #[test]
    fn test_add_missing_manifest() {
        let dir = TempDir::new().unwrap();
        let store = ManifestStore::new(dir.path().join("manifest.json"));

        let outcome = store.add("com.unity.splines", "2.6.1").unwrap();

        assert_eq!(outcome, ChangeOutcome::ManifestMissing);
        assert!(!store.exists());
    }

    #[test]
    fn test_add_malformed_manifest_is_not_written() {
        let broken = r#"{ "dependencies": { "com.unity.timeline": "1.8.8", }"#;
        let (_dir, store) = store_with(broken);

        let err = store.add("com.unity.splines", "2.6.1").unwrap_err();

        assert!(matches!(err, AppError::MalformedManifest { .. }));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), broken);
    }

    #[test]
    fn test_add_without_dependencies_object() {
        let (_dir, store) = store_with(r#"{ "testables": [] }"#);
        let err = store.add("com.unity.splines", "2.6.1").unwrap_err();
        assert!(matches!(err, AppError::MalformedManifest { .. }));
    }

    #[test]
    fn test_add_rejects_empty_entries() {
        let (_dir, store) = store_with(MANIFEST);
        assert!(matches!(
            store.add("", "1.0.0").unwrap_err(),
            AppError::InvalidEntry(_)
        ));
        assert!(matches!(
            store.add("com.unity.splines", " ").unwrap_err(),
            AppError::InvalidEntry(_)
        ));
        assert!(!store.contains(""));
        assert!(!store.contains("com.unity.splines"));
    }

    #[test]
    fn test_remove() {
        let (_dir, store) = store_with(MANIFEST);
        let before = read_json(&store);

        let outcome = store.remove("com.unity.timeline").unwrap();

        assert_eq!(outcome, ChangeOutcome::Removed);
        assert!(!store.contains("com.unity.timeline"));
        assert_eq!(keys(&store), vec!["com.unity.ugui", "com.cysharp.unitask"]);
        let after = read_json(&store);
        assert_eq!(
            after["dependencies"]["com.cysharp.unitask"],
            before["dependencies"]["com.cysharp.unitask"]
        );
        assert_eq!(after["dependencies"]["com.unity.ugui"], "2.0.0");
    }

    #[test]
    fn test_remove_absent_is_a_noop() {
        let (_dir, store) = store_with(MANIFEST);

        let outcome = store.remove("com.unity.splines").unwrap();

        assert_eq!(outcome, ChangeOutcome::NotPresent);
        assert_eq!(fs::read_to_string(store.path()).unwrap(), MANIFEST);
    }

    #[test]
    fn test_remove_missing_manifest() {
        let dir = TempDir::new().unwrap();
        let store = ManifestStore::new(dir.path().join("manifest.json"));
        assert_eq!(
            store.remove("com.unity.timeline").unwrap(),
            ChangeOutcome::ManifestMissing
        );
    }

    #[test]
    fn test_add_then_remove_restores_key_set() {
        let (_dir, store) = store_with(MANIFEST);
        let original = keys(&store);

        store.add("com.demigiant.dotween", "https://github.com/Demigiant/dotween.git").unwrap();
        store.remove("com.demigiant.dotween").unwrap();

        assert_eq!(keys(&store), original);
        assert_eq!(fs::read_to_string(store.path()).unwrap(), MANIFEST);
    }

    #[test]
    fn test_trailing_newline_is_kept_as_found() {
        let (_dir, store) = store_with(r#"{"dependencies":{}}"#);
        store.add("com.unity.timeline", "1.8.8").unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        assert_eq!(
            text,
            "{\n  \"dependencies\": {\n    \"com.unity.timeline\": \"1.8.8\"\n  }\n}"
        );
    }

    #[test]
    fn test_dependencies_renders_non_string_values() {
        let (_dir, store) = store_with(r#"{"dependencies":{"a.b.c":"1.0.0","d.e.f":{"v":1}}}"#);
        let dependencies = store.dependencies().unwrap().unwrap();
        assert_eq!(dependencies["a.b.c"], "1.0.0");
        assert_eq!(dependencies["d.e.f"], r#"{"v":1}"#);
    }

    #[test]
    fn test_add_rejects_whitespace_in_identifier() {
        let (_dir, store) = store_with(MANIFEST);

        for identifier in [" com.x ", "com.y\t", "com. z", "com.w\u{7}"] {
            assert!(
                matches!(
                    store.add(identifier, "1.0.0").unwrap_err(),
                    AppError::InvalidEntry(_)
                ),
                "{identifier:?}"
            );
        }
        assert_eq!(fs::read_to_string(store.path()).unwrap(), MANIFEST);
    }

    #[test]
    fn test_numbers_outside_dependencies_are_kept() {
        let manifest = r#"{
  "dependencies": {
    "com.unity.timeline": "1.8.8"
  },
  "big": 18446744073709551616,
  "ratio": 1.50,
  "negative": -12,
  "exponent": 1e3
}
"#;
        let (_dir, store) = store_with(manifest);

        store.add("com.unity.splines", "2.6.1").unwrap();
        let added = fs::read_to_string(store.path()).unwrap();
        assert!(added.contains("\"big\": 18446744073709551616"));
        assert!(added.contains("\"ratio\": 1.50"));

        store.remove("com.unity.splines").unwrap();
        assert_eq!(fs::read_to_string(store.path()).unwrap(), manifest);
    }

    #[test]
    fn test_remove_malformed_manifest_is_not_written() {
        for broken in [
            r#"{ "dependencies": ["#,
            r#"["com.unity.timeline"]"#,
            r#"{ "testables": [] }"#,
            r#"{ "dependencies": "com.unity.timeline" }"#,
        ] {
            let (_dir, store) = store_with(broken);

            let err = store.remove("com.unity.timeline").unwrap_err();

            assert!(matches!(err, AppError::MalformedManifest { .. }), "{broken}");
            assert_eq!(fs::read_to_string(store.path()).unwrap(), broken);
        }
    }
}
