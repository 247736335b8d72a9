use std::path::PathBuf;

pub const ENV_DATA: &str = "DASHBOARD_DATA";
pub const ENV_HISTOGRAM_BINS: &str = "DASHBOARD_HISTOGRAM_BINS";

const DEFAULT_HISTOGRAM_BINS: usize = 20;
const DEFAULT_DENSITY_POINTS: usize = 200;

/// Runtime knobs for the dashboard pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// Bins of the purchase-amount histogram.
    pub histogram_bins: usize,
    /// Samples along the density curve drawn over the histogram.
    pub density_points: usize,
    /// File loaded at start-up, before any dialog is opened.
    pub initial_file: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            density_points: DEFAULT_DENSITY_POINTS,
            initial_file: None,
        }
    }
}

impl DashboardConfig {
    /// Read overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DATA).filter(|p| !p.trim().is_empty()) {
            config.initial_file = Some(PathBuf::from(path.trim()));
        }

        if let Some(raw) = lookup(ENV_HISTOGRAM_BINS) {
            match raw.trim().parse::<usize>() {
                Ok(bins) if bins > 0 => config.histogram_bins = bins,
                _ => log::warn!(
                    "{ENV_HISTOGRAM_BINS}={raw:?} is not a positive integer, using {DEFAULT_HISTOGRAM_BINS}"
                ),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        assert_eq!(DashboardConfig::from_lookup(lookup(&[])), DashboardConfig::default());
    }

    #[test]
    fn overrides_are_applied() {
        let config = DashboardConfig::from_lookup(lookup(&[
            (ENV_DATA, "data/customers.csv"),
            (ENV_HISTOGRAM_BINS, "35"),
        ]));
        assert_eq!(config.histogram_bins, 35);
        assert_eq!(config.initial_file, Some(PathBuf::from("data/customers.csv")));
    }

    #[test]
    fn invalid_bins_fall_back() {
        for raw in ["zero", "0", "-3"] {
            let config = DashboardConfig::from_lookup(lookup(&[(ENV_HISTOGRAM_BINS, raw)]));
            assert_eq!(config.histogram_bins, DEFAULT_HISTOGRAM_BINS);
        }
    }
}
