use crate::config::types::Config;
use crate::ConfigError;
use url::Url;

/// Validates a parsed configuration
///
/// Checks value ranges and that every catalog link is a well-formed
/// HTTP(S) URL.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.crawler.max_fetch_attempts == 0 {
        return Err(ConfigError::Validation(
            "max-fetch-attempts must be at least 1".to_string(),
        ));
    }

    if config.crawler.max_concurrent_walkers == 0 {
        return Err(ConfigError::Validation(
            "max-concurrent-walkers must be at least 1".to_string(),
        ));
    }

    if config.output.cache_db_path.is_empty() {
        return Err(ConfigError::Validation(
            "cache-db-path must not be empty".to_string(),
        ));
    }

    if config.output.export_path.is_empty() {
        return Err(ConfigError::Validation(
            "export-path must not be empty".to_string(),
        ));
    }

    for entry in &config.catalog {
        if entry.name.is_empty() {
            return Err(ConfigError::Validation(
                "catalog entries must be named".to_string(),
            ));
        }

        if entry.links.is_empty() {
            return Err(ConfigError::Validation(format!(
                "catalog '{}' has no listing links",
                entry.name
            )));
        }

        for link in &entry.links {
            let url = Url::parse(link).map_err(|_| ConfigError::InvalidUrl(link.clone()))?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(ConfigError::InvalidUrl(link.clone()));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{CatalogEntry, CrawlerConfig, OutputConfig};

    fn valid_config() -> Config {
        Config {
            crawler: CrawlerConfig::default(),
            output: OutputConfig {
                cache_db_path: "./cache.db".to_string(),
                export_path: "./books.json".to_string(),
            },
            catalog: vec![CatalogEntry {
                name: "english".to_string(),
                links: vec!["https://books.example.com/language/english".to_string()],
            }],
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_zero_fetch_attempts_rejected() {
        let mut config = valid_config();
        config.crawler.max_fetch_attempts = 0;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_zero_walkers_rejected() {
        let mut config = valid_config();
        config.crawler.max_concurrent_walkers = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_catalog_links_rejected() {
        let mut config = valid_config();
        config.catalog[0].links.clear();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_malformed_link_rejected() {
        let mut config = valid_config();
        config.catalog[0].links = vec!["not a url".to_string()];
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        let mut config = valid_config();
        config.catalog[0].links = vec!["ftp://books.example.com/".to_string()];
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_empty_catalog_is_valid() {
        // Entry points may arrive via --links instead of the config
        let mut config = valid_config();
        config.catalog.clear();
        assert!(validate(&config).is_ok());
    }
}
