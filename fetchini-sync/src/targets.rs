//! Target list resolution.
//!
//! Sources, first non-empty wins:
//! 1. projects given on the command line
//! 2. `projects` in the settings file
//! 3. every remote file matching the file pattern

use std::collections::HashSet;

use fetchini_core::{Credentials, ProjectId, RemoteError, RemoteSource, Settings};

/// Drop repeated targets, keeping first occurrences in order.
pub fn dedup(targets: impl IntoIterator<Item = ProjectId>) -> Vec<ProjectId> {
    let mut seen = HashSet::new();
    targets
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// List the remote directory and keep the names matching the file pattern.
pub fn discover<S: RemoteSource>(
    source: &S,
    settings: &Settings,
    auth: Option<&Credentials>,
) -> Result<Vec<ProjectId>, RemoteError> {
    let mut found: Vec<ProjectId> = source
        .list(&settings.remote_dir_url(), auth)?
        .iter()
        .filter_map(|name| settings.file_pattern.extract(name))
        .collect();
    found.sort();
    tracing::debug!("discovered {} remote project(s)", found.len());
    Ok(dedup(found))
}

/// Resolve the final, de-duplicated target list.
pub fn resolve<S: RemoteSource>(
    requested: Vec<ProjectId>,
    source: &S,
    settings: &Settings,
    auth: Option<&Credentials>,
) -> Result<Vec<ProjectId>, RemoteError> {
    if !requested.is_empty() {
        return Ok(dedup(requested));
    }
    if !settings.projects.is_empty() {
        return Ok(dedup(settings.projects.iter().cloned()));
    }
    discover(source, settings, auth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fetchini_core::RemoteDescriptor;

    struct Listing(Vec<&'static str>);

    impl RemoteSource for Listing {
        fn metadata(
            &self,
            url: &str,
            _auth: Option<&Credentials>,
        ) -> Result<RemoteDescriptor, RemoteError> {
            Err(RemoteError::NotFound { url: url.into() })
        }

        fn content(
            &self,
            url: &str,
            _auth: Option<&Credentials>,
        ) -> Result<Vec<u8>, RemoteError> {
            Err(RemoteError::NotFound { url: url.into() })
        }

        fn list(&self, _url: &str, _auth: Option<&Credentials>) -> Result<Vec<String>, RemoteError> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    fn ids(names: &[&str]) -> Vec<ProjectId> {
        names.iter().map(|n| ProjectId::from(*n)).collect()
    }

    #[test]
    fn dedup_keeps_first_occurrence_order() {
        assert_eq!(
            dedup(ids(&["cordex", "cmip6", "cordex", "cmip5"])),
            ids(&["cordex", "cmip6", "cmip5"])
        );
    }

    #[test]
    fn requested_targets_win() {
        let settings = Settings {
            projects: ids(&["input4mips"]),
            ..Settings::default()
        };
        let source = Listing(vec!["esg.cmip6.ini"]);
        let targets = resolve(ids(&["cordex"]), &source, &settings, None).unwrap();
        assert_eq!(targets, ids(&["cordex"]));
    }

    #[test]
    fn settings_projects_used_when_none_requested() {
        let settings = Settings {
            projects: ids(&["input4mips", "cmip6"]),
            ..Settings::default()
        };
        let source = Listing(vec![]);
        let targets = resolve(vec![], &source, &settings, None).unwrap();
        assert_eq!(targets, ids(&["input4mips", "cmip6"]));
    }

    #[test]
    fn discovery_filters_by_pattern_and_sorts() {
        let source = Listing(vec![
            "esg.cordex.ini",
            "README.md",
            "esg.cmip6.ini",
            "esg.ini",
        ]);
        let targets = resolve(vec![], &source, &Settings::default(), None).unwrap();
        assert_eq!(targets, ids(&["cmip6", "cordex"]));
    }
}
