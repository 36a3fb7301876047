//! Declarative tool registry.
//!
//! Maps canonical tool names to their static installation metadata. The
//! registry document is embedded in the binary and parsed fresh per run;
//! after loading it is read-only reference data.

use std::collections::HashMap;

use crate::error::Result;
use crate::tools::{InstallKind, ToolConfig, ToolMetadata};

const TOOLS_JSON: &str = include_str!("configs/tools.json");

/// Registry of supported tools.
#[derive(Debug)]
pub struct ToolRegistry {
    entries: HashMap<String, ToolConfig>,
}

impl ToolRegistry {
    /// Parse the embedded registry document.
    pub fn load() -> Result<Self> {
        Ok(Self {
            entries: serde_json::from_str(TOOLS_JSON)?,
        })
    }

    /// Resolve a raw tool name to metadata.
    ///
    /// Lookup order: exact canonical-name match, alias match, `org/repo`
    /// synthesis as a composer package, then a minimal record carrying
    /// just the name. Never fails — unsupported-tool detection is
    /// deferred to the dispatcher so it can be reported as a per-tool
    /// diagnostic instead of aborting the batch.
    #[must_use]
    pub fn resolve(&self, name: &str) -> ToolMetadata {
        if let Some(config) = self.entries.get(name) {
            return ToolMetadata {
                tool: name.to_string(),
                config: config.clone(),
            };
        }
        if let Some((canonical, config)) = self
            .entries
            .iter()
            .find(|(_, config)| config.alias.as_deref() == Some(name))
        {
            return ToolMetadata {
                tool: canonical.clone(),
                config: config.clone(),
            };
        }
        if let Some(package) = name.split('/').nth(1) {
            return ToolMetadata {
                tool: package.to_string(),
                config: ToolConfig {
                    repository: Some(name.to_string()),
                    kind: Some(InstallKind::Composer),
                    ..ToolConfig::default()
                },
            };
        }
        ToolMetadata {
            tool: name.to_string(),
            config: ToolConfig::default(),
        }
    }

    /// Number of declared tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolFunction;

    #[allow(clippy::expect_used)]
    fn registry() -> ToolRegistry {
        ToolRegistry::load().expect("embedded registry must parse")
    }

    #[test]
    fn test_exact_match() {
        let meta = registry().resolve("phpstan");
        assert_eq!(meta.tool, "phpstan");
        assert_eq!(meta.config.kind, Some(InstallKind::Phar));
        assert_eq!(meta.config.repository.as_deref(), Some("phpstan/phpstan"));
    }

    #[test]
    fn test_alias_resolves_to_canonical_name() {
        let meta = registry().resolve("wp");
        assert_eq!(meta.tool, "wp-cli");
        assert_eq!(meta.config.function, Some(ToolFunction::WpCli));
    }

    #[test]
    fn test_org_repo_synthesizes_composer_package() {
        let meta = registry().resolve("some/thing");
        assert_eq!(meta.tool, "thing");
        assert_eq!(meta.config.kind, Some(InstallKind::Composer));
        assert_eq!(meta.config.repository.as_deref(), Some("some/thing"));
    }

    #[test]
    fn test_unknown_name_degrades_to_minimal_record() {
        let meta = registry().resolve("does-not-exist");
        assert_eq!(meta.tool, "does-not-exist");
        assert!(meta.config.kind.is_none());
        assert!(meta.config.repository.is_none());
    }

    #[test]
    fn test_custom_function_entries_declare_a_function() {
        let registry = registry();
        for (tool, config) in &registry.entries {
            if config.kind == Some(InstallKind::CustomFunction) {
                assert!(
                    config.function.is_some(),
                    "{tool} declares custom-function without a function id"
                );
            }
        }
    }
}
