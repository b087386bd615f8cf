use serde::Deserialize;

/// Gateway-level limits applied to caller input.
///
/// Loading this from files or the environment is left to the embedding process.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Window size for bulk mutations when the caller gives none.
    pub default_batch_size: usize,
    /// Smallest window a caller may request.
    pub min_batch_size: usize,
    /// Largest window a caller may request.
    pub max_batch_size: usize,
    /// `search_read` limit when the caller gives none.
    pub default_search_limit: u32,
    /// Upper bound on caller-supplied search limits.
    pub max_search_limit: u32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            default_batch_size: 100,
            min_batch_size: 1,
            max_batch_size: 1000,
            default_search_limit: 80,
            max_search_limit: 1000,
        }
    }
}

impl GatewayConfig {
    /// Resolves the caller's batch size, clamped into `[min_batch_size, max_batch_size]`.
    ///
    /// Never returns 0, even when a deserialized config sets a zero bound.
    #[must_use]
    pub fn batch_size(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_batch_size)
            .max(self.min_batch_size)
            .min(self.max_batch_size)
            .max(1)
    }

    /// Resolves the caller's search limit, capped at `max_search_limit`.
    #[must_use]
    pub fn search_limit(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_search_limit)
            .min(self.max_search_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_config_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.default_batch_size, 100);
        assert_eq!(config.min_batch_size, 1);
        assert_eq!(config.max_batch_size, 1000);
        assert_eq!(config.default_search_limit, 80);
    }

    #[test]
    fn batch_size_is_clamped() {
        let config = GatewayConfig::default();
        assert_eq!(config.batch_size(None), 100);
        assert_eq!(config.batch_size(Some(0)), 1);
        assert_eq!(config.batch_size(Some(250)), 250);
        assert_eq!(config.batch_size(Some(5000)), 1000);
    }

    #[test]
    fn zero_bounds_still_yield_a_window() {
        let config: GatewayConfig =
            serde_json::from_value(serde_json::json!({"max_batch_size": 0})).unwrap();
        assert_eq!(config.batch_size(None), 1);

        let config: GatewayConfig = serde_json::from_value(
            serde_json::json!({"min_batch_size": 0, "default_batch_size": 0}),
        )
        .unwrap();
        assert_eq!(config.batch_size(None), 1);
    }

    #[test]
    fn search_limit_is_capped() {
        let config = GatewayConfig::default();
        assert_eq!(config.search_limit(None), 80);
        assert_eq!(config.search_limit(Some(10)), 10);
        assert_eq!(config.search_limit(Some(50_000)), 1000);
    }

    #[test]
    fn partial_config_deserializes_over_defaults() {
        let config: GatewayConfig =
            serde_json::from_value(serde_json::json!({"default_batch_size": 25})).unwrap();
        assert_eq!(config.default_batch_size, 25);
        assert_eq!(config.max_batch_size, 1000);
    }
}
