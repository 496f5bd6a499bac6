use std::str::FromStr;

use crate::access::DomainAllowList;
use crate::citation::{DEFAULT_LIST_LIMIT, RenderMode, RenderOptions, UnresolvedMarkers};
use crate::convert::{DEFAULT_SUMMARY_RESULT_COUNT, GenerationOptions};
use crate::error::DiscoveryError;

pub const GLOBAL_LOCATION: &str = "global";
const DEFAULT_COLLECTION: &str = "default_collection";
const API_HOST: &str = "discoveryengine.googleapis.com";

/// Which Discovery Engine surface answers chat queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Conversations with `:converse` and a summary spec.
    #[default]
    Converse,
    /// Sessions with `:answer` and an answer generation spec.
    Answer,
}

impl FromStr for BackendKind {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "converse" | "conversation" => Ok(BackendKind::Converse),
            "answer" | "answers" => Ok(BackendKind::Answer),
            other => Err(DiscoveryError::Config(format!("unknown search backend `{other}`"))),
        }
    }
}

impl FromStr for UnresolvedMarkers {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keep" => Ok(UnresolvedMarkers::Keep),
            "drop" => Ok(UnresolvedMarkers::Drop),
            other => Err(DiscoveryError::Config(format!(
                "unknown unresolved citation policy `{other}`"
            ))),
        }
    }
}

/// Connection, generation and rendering settings for one deployment.
///
/// Read from the environment with [`Settings::from_env`]:
///
/// | variable | default |
/// |---|---|
/// | `PROJECT_ID` | required |
/// | `LOCATION` | `global` |
/// | `DATA_STORE_ID` | required |
/// | `SEARCH_BACKEND` | `converse` (`converse` or `answer`) |
/// | `MODEL_VERSION` | `gemini-1.5-flash-001/answer_gen/v1` |
/// | `PREAMBLE` | bulleted-list answer preamble |
/// | `SUMMARY_RESULT_COUNT` | `3` |
/// | `CITATION_MODE` | `inline` for `converse`, `list` for `answer` (`inline`, `list` or `bare`) |
/// | `CITATION_LIMIT` | `5` |
/// | `UNRESOLVED_CITATIONS` | `keep` (`keep` or `drop`) |
/// | `AUTHORIZED_DOMAINS` | empty, comma separated |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub project_id: String,
    pub location: String,
    pub data_store_id: String,
    pub backend: BackendKind,
    pub generation: GenerationOptions,
    pub render: RenderOptions,
    pub authorized_domains: DomainAllowList,
}

impl Settings {
    pub fn new(
        project_id: impl Into<String>,
        location: impl Into<String>,
        data_store_id: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            location: location.into(),
            data_store_id: data_store_id.into(),
            backend: BackendKind::default(),
            generation: GenerationOptions::default(),
            render: RenderOptions::default(),
            authorized_domains: DomainAllowList::default(),
        }
    }

    pub fn from_env() -> Result<Self, DiscoveryError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DiscoveryError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| DiscoveryError::Config(format!("{key} is not set")))
        };

        let mut settings = Settings::new(
            required("PROJECT_ID")?,
            get("LOCATION").unwrap_or_else(|| GLOBAL_LOCATION.to_string()),
            required("DATA_STORE_ID")?,
        );

        if let Some(backend) = get("SEARCH_BACKEND") {
            settings.backend = backend.parse()?;
        }
        if let Some(version) = get("MODEL_VERSION") {
            settings.generation.model_version = version;
        }
        if let Some(preamble) = get("PREAMBLE") {
            settings.generation.preamble = preamble;
        }
        settings.generation.summary_result_count = parse_number(
            "SUMMARY_RESULT_COUNT",
            get("SUMMARY_RESULT_COUNT"),
            DEFAULT_SUMMARY_RESULT_COUNT,
        )?;

        let limit = parse_number("CITATION_LIMIT", get("CITATION_LIMIT"), DEFAULT_LIST_LIMIT)?;
        // Answer API text carries no inline markers, so its citations only show as a list.
        let mode = get("CITATION_MODE").map(|m| m.trim().to_ascii_lowercase());
        settings.render.mode = match mode.as_deref() {
            None if settings.backend == BackendKind::Answer => RenderMode::TrailingList { limit },
            None | Some("inline") => RenderMode::Inline,
            Some("list" | "trailing" | "trailing-list") => RenderMode::TrailingList { limit },
            Some("bare") => RenderMode::BareLinks,
            Some(other) => {
                return Err(DiscoveryError::Config(format!("unknown citation mode `{other}`")));
            }
        };
        if let Some(policy) = get("UNRESOLVED_CITATIONS") {
            settings.render.unresolved = policy.parse()?;
        }
        if let Some(domains) = get("AUTHORIZED_DOMAINS") {
            settings.authorized_domains = DomainAllowList::parse(&domains);
        }

        Ok(settings)
    }

    /// API host for the configured location. Multi-region data stores are
    /// served from a regional endpoint.
    pub fn api_host(&self) -> String {
        if self.location == GLOBAL_LOCATION {
            API_HOST.to_string()
        } else {
            format!("{}-{}", self.location, API_HOST)
        }
    }

    pub fn data_store_path(&self) -> String {
        format!(
            "projects/{}/locations/{}/collections/{}/dataStores/{}",
            self.project_id, self.location, DEFAULT_COLLECTION, self.data_store_id
        )
    }

    pub fn serving_config_path(&self, serving_config: &str) -> String {
        format!("{}/servingConfigs/{}", self.data_store_path(), serving_config)
    }
}

fn parse_number<T: FromStr>(
    key: &str,
    value: Option<String>,
    default: T,
) -> Result<T, DiscoveryError> {
    match value {
        None => Ok(default),
        Some(v) => v.trim().parse().map_err(|_| {
            DiscoveryError::Config(format!("{key} must be a non-negative integer, got `{v}`"))
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings_from(vars: &[(&str, &str)]) -> Result<Settings, DiscoveryError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let settings = settings_from(&[("PROJECT_ID", "p"), ("DATA_STORE_ID", "ds")]).unwrap();
        assert_eq!(settings.location, "global");
        assert_eq!(settings.backend, BackendKind::Converse);
        assert_eq!(settings.render, RenderOptions::default());
        assert_eq!(settings.generation, GenerationOptions::default());
        assert!(!settings.authorized_domains.is_enabled());
    }

    #[test]
    fn test_answer_backend_defaults_to_trailing_list() {
        let settings = settings_from(&[
            ("PROJECT_ID", "p"),
            ("DATA_STORE_ID", "ds"),
            ("SEARCH_BACKEND", "answer"),
        ])
        .unwrap();
        assert_eq!(
            settings.render.mode,
            RenderMode::TrailingList {
                limit: DEFAULT_LIST_LIMIT
            }
        );

        let inline = settings_from(&[
            ("PROJECT_ID", "p"),
            ("DATA_STORE_ID", "ds"),
            ("SEARCH_BACKEND", "answer"),
            ("CITATION_MODE", "inline"),
        ])
        .unwrap();
        assert_eq!(inline.render.mode, RenderMode::Inline);
    }

    #[test]
    fn test_missing_required_variable() {
        let err = settings_from(&[("PROJECT_ID", "p"), ("DATA_STORE_ID", " ")]).unwrap_err();
        assert!(matches!(err, DiscoveryError::Config(ref m) if m.contains("DATA_STORE_ID")));
    }

    #[test]
    fn test_overrides() {
        let settings = settings_from(&[
            ("PROJECT_ID", "p"),
            ("DATA_STORE_ID", "ds"),
            ("LOCATION", "eu"),
            ("SEARCH_BACKEND", "answer"),
            ("CITATION_MODE", "list"),
            ("CITATION_LIMIT", "3"),
            ("UNRESOLVED_CITATIONS", "drop"),
            ("SUMMARY_RESULT_COUNT", "5"),
            ("AUTHORIZED_DOMAINS", "google.com,example.org"),
        ])
        .unwrap();
        assert_eq!(settings.backend, BackendKind::Answer);
        assert_eq!(settings.render.mode, RenderMode::TrailingList { limit: 3 });
        assert_eq!(settings.render.unresolved, UnresolvedMarkers::Drop);
        assert_eq!(settings.generation.summary_result_count, 5);
        assert!(settings.authorized_domains.permits("google", Some("example.org")));
    }

    #[test]
    fn test_invalid_values() {
        let base = [("PROJECT_ID", "p"), ("DATA_STORE_ID", "ds")];
        for bad in [
            ("CITATION_MODE", "footnotes"),
            ("CITATION_LIMIT", "-1"),
            ("UNRESOLVED_CITATIONS", "hide"),
            ("SEARCH_BACKEND", "grpc"),
        ] {
            let mut vars = base.to_vec();
            vars.push(bad);
            assert!(
                matches!(settings_from(&vars), Err(DiscoveryError::Config(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_resource_paths() {
        let settings = Settings::new("p", "global", "ds");
        assert_eq!(settings.api_host(), "discoveryengine.googleapis.com");
        assert_eq!(
            settings.serving_config_path("default_config"),
            "projects/p/locations/global/collections/default_collection/dataStores/ds/servingConfigs/default_config"
        );

        let regional = Settings::new("p", "us", "ds");
        assert_eq!(regional.api_host(), "us-discoveryengine.googleapis.com");
        assert!(regional.data_store_path().starts_with("projects/p/locations/us/"));
    }
}
