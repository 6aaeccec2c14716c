/// Runtime configuration, read from environment variables.
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | ACTOR_BUFFER_SIZE | 32 | mailbox capacity of each resource actor |
/// | LOW_STOCK_THRESHOLD | 5 | low-stock threshold when the caller gives none |
/// | SEED_CATALOG | true | load the demo catalog at startup |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub actor_buffer_size: usize,
    pub low_stock_threshold: u32,
    pub seed_catalog: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            actor_buffer_size: 32,
            low_stock_threshold: 5,
            seed_catalog: true,
        }
    }
}

impl Config {
    /// Unset or unparsable variables fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            actor_buffer_size: lookup("ACTOR_BUFFER_SIZE")
                .and_then(|v| v.parse().ok())
                .filter(|&size| size > 0)
                .unwrap_or(defaults.actor_buffer_size),
            low_stock_threshold: lookup("LOW_STOCK_THRESHOLD")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.low_stock_threshold),
            seed_catalog: lookup("SEED_CATALOG")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.seed_catalog),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_from_lookup_overrides_and_falls_back() {
        let env: HashMap<&str, &str> = [
            ("ACTOR_BUFFER_SIZE", "0"),
            ("LOW_STOCK_THRESHOLD", "12"),
            ("SEED_CATALOG", "false"),
        ]
        .into_iter()
        .collect();

        let config = Config::from_lookup(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.actor_buffer_size, 32);
        assert_eq!(config.low_stock_threshold, 12);
        assert!(!config.seed_catalog);
    }
}
