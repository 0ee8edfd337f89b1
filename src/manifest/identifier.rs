use url::Url;

use crate::errors::{AppError, AppResult};

const SOURCE_SCHEMES: [&str; 7] = [
    "http", "https", "git", "ssh", "git+http", "git+https", "git+ssh",
];

/// Derives the `com.<owner>.<repo>` identifier used as the manifest key for a package fetched
/// from a source repository.
///
/// Accepts `scheme://host/owner/repo`, the scp-like `user@host:owner/repo` and a bare
/// `host/owner/repo` whose host contains a `.`. Query and fragment are ignored, and the
/// repository name is cut at its first `.` so that `Repo.git` and `Repo` map to the same key.
///
/// Only the first two path segments are used, so a nested group such as
/// `https://gitlab.com/group/sub/repo.git` gives `com.group.sub`.
pub fn derive_identifier(url: &str) -> AppResult<String> {
    let unrecognized = || AppError::UnrecognizedUrl(url.to_string());

    let trimmed = url.trim();
    let path = if trimmed.contains("://") {
        let parsed = Url::parse(trimmed).map_err(|_| unrecognized())?;
        if !SOURCE_SCHEMES.contains(&parsed.scheme()) || parsed.host_str().is_none() {
            return Err(unrecognized());
        }
        parsed.path().to_string()
    } else {
        scp_path(trimmed)
            .or_else(|| bare_host_path(trimmed))
            .ok_or_else(unrecognized)?
    };

    let mut segments = path.split('/').filter(|s| !s.is_empty());
    let owner = segments.next().ok_or_else(unrecognized)?;
    let repo = segments
        .next()
        .and_then(|s| s.split('.').next())
        .filter(|s| !s.is_empty())
        .ok_or_else(unrecognized)?;

    Ok(format!(
        "com.{}.{}",
        owner.to_lowercase(),
        repo.to_lowercase()
    ))
}

/// Returns the path part of an scp-like address such as `git@github.com:owner/repo.git`.
fn scp_path(address: &str) -> Option<String> {
    let address = address.split(['?', '#']).next()?;
    let (user_host, path) = address.split_once(':')?;
    let (user, host) = user_host.split_once('@')?;
    if user.is_empty() || host.is_empty() || host.contains('/') {
        return None;
    }
    Some(path.to_string())
}

/// Returns the path part of a scheme-less address such as `github.com/owner/repo.git`.
fn bare_host_path(address: &str) -> Option<String> {
    let address = address.split(['?', '#']).next()?;
    let (host, path) = address.split_once('/')?;
    let is_hostname = host.contains('.')
        && !host.starts_with('.')
        && !host.ends_with('.')
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    if !is_hostname {
        return None;
    }
    Some(path.to_string())
}
