//! Harvest configuration

use crate::client::ApiConfig;
use crate::error::HarvestError;
use std::path::PathBuf;
use std::time::Duration;

/// Default catalog name
pub const DEFAULT_CATALOG: &str = "harmonyos-guides";

/// Default language code
pub const DEFAULT_LANGUAGE: &str = "cn";

/// Default pause between requests
pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

/// Settings for one harvest run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestConfig {
    /// Category index file
    pub input: PathBuf,
    /// Root directory for markdown files
    pub output_dir: PathBuf,
    /// Full result file
    pub documents_file: PathBuf,
    /// Summary file
    pub summary_file: PathBuf,
    /// Catalog name sent with each request
    pub catalog: String,
    /// Language code sent with each request
    pub language: String,
    /// Pause between requests
    pub delay: Duration,
    /// Skip tasks whose markdown file exists
    pub skip_existing: bool,
    /// Write per-document markdown files
    pub save_markdown: bool,
    /// Document service connection
    pub api: ApiConfig,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("category.json"),
            output_dir: PathBuf::from("docs"),
            documents_file: PathBuf::from("documents.json"),
            summary_file: PathBuf::from("documents_summary.json"),
            catalog: DEFAULT_CATALOG.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            delay: DEFAULT_DELAY,
            skip_existing: true,
            save_markdown: true,
            api: ApiConfig::default(),
        }
    }
}

impl HarvestConfig {
    /// Create a new config builder
    pub fn builder() -> HarvestConfigBuilder {
        HarvestConfigBuilder::default()
    }

    /// Reject settings the document service cannot work with
    pub fn validate(&self) -> Result<(), HarvestError> {
        if self.catalog.trim().is_empty() {
            return Err(HarvestError::Config("catalog must not be empty".to_string()));
        }
        if self.language.trim().is_empty() {
            return Err(HarvestError::Config("language must not be empty".to_string()));
        }
        if self.api.timeout.is_zero() {
            return Err(HarvestError::Config("timeout must be positive".to_string()));
        }
        Ok(())
    }
}

/// Builder for [`HarvestConfig`]
#[derive(Debug, Clone, Default)]
pub struct HarvestConfigBuilder {
    config: HarvestConfig,
}

impl HarvestConfigBuilder {
    /// Set the category index file
    pub fn input(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.input = path.into();
        self
    }

    /// Set the markdown output root
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_dir = path.into();
        self
    }

    /// Set the full result file
    pub fn documents_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.documents_file = path.into();
        self
    }

    /// Set the summary file
    pub fn summary_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.summary_file = path.into();
        self
    }

    /// Set the catalog name
    pub fn catalog(mut self, catalog: impl Into<String>) -> Self {
        self.config.catalog = catalog.into();
        self
    }

    /// Set the language code
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.config.language = language.into();
        self
    }

    /// Set the pause between requests
    pub fn delay(mut self, delay: Duration) -> Self {
        self.config.delay = delay;
        self
    }

    /// Enable or disable skipping of existing outputs
    pub fn skip_existing(mut self, enable: bool) -> Self {
        self.config.skip_existing = enable;
        self
    }

    /// Enable or disable markdown files
    pub fn save_markdown(mut self, enable: bool) -> Self {
        self.config.save_markdown = enable;
        self
    }

    /// Set the document service endpoint
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.api.endpoint = endpoint.into();
        self
    }

    /// Set a custom User-Agent
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.api.user_agent = ua.into();
        self
    }

    /// Set the per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.api.timeout = timeout;
        self
    }

    /// Build the config
    pub fn build(self) -> HarvestConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = HarvestConfig::default();
        assert_eq!(config.input, PathBuf::from("category.json"));
        assert_eq!(config.output_dir, PathBuf::from("docs"));
        assert_eq!(config.catalog, "harmonyos-guides");
        assert_eq!(config.language, "cn");
        assert_eq!(config.delay, Duration::from_millis(500));
        assert!(config.skip_existing);
        assert!(config.save_markdown);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = HarvestConfig::builder()
            .input("tree.json")
            .output_dir("out")
            .catalog("harmonyos-references")
            .language("en")
            .delay(Duration::ZERO)
            .skip_existing(false)
            .save_markdown(false)
            .endpoint("http://localhost:8080/doc")
            .user_agent("TestAgent/1.0")
            .timeout(Duration::from_secs(3))
            .build();

        assert_eq!(config.input, PathBuf::from("tree.json"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.catalog, "harmonyos-references");
        assert_eq!(config.language, "en");
        assert!(config.delay.is_zero());
        assert!(!config.skip_existing);
        assert!(!config.save_markdown);
        assert_eq!(config.api.endpoint, "http://localhost:8080/doc");
        assert_eq!(config.api.user_agent, "TestAgent/1.0");
        assert_eq!(config.api.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_config_validation() {
        let config = HarvestConfig::builder().catalog(" ").build();
        assert!(matches!(config.validate(), Err(HarvestError::Config(_))));

        let config = HarvestConfig::builder().language("").build();
        assert!(matches!(config.validate(), Err(HarvestError::Config(_))));

        let config = HarvestConfig::builder().timeout(Duration::ZERO).build();
        assert!(matches!(config.validate(), Err(HarvestError::Config(_))));
    }
}
