use std::{env, net::IpAddr, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub host: IpAddr,
    pub port: u16,
    pub rollover_tick: Duration,
    pub reminder_interval: Duration,
    pub history_limit: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            host: IpAddr::from([127, 0, 0, 1]),
            port: 8080,
            rollover_tick: Duration::from_secs(60),
            reminder_interval: Duration::from_secs(90 * 60),
            history_limit: None,
        }
    }
}

impl Config {
    /// Reads overrides from the environment. Unset or unparseable values
    /// keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let secs = |key: &str| {
            parsed::<u64>(&lookup, key)
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
        };

        Self {
            data_dir: lookup("APP_DATA_DIR")
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            host: parsed(&lookup, "HOST").unwrap_or(defaults.host),
            port: parsed(&lookup, "PORT").unwrap_or(defaults.port),
            rollover_tick: secs("ROLLOVER_TICK_SECS").unwrap_or(defaults.rollover_tick),
            reminder_interval: secs("REMINDER_INTERVAL_SECS").unwrap_or(defaults.reminder_interval),
            history_limit: parsed::<usize>(&lookup, "HISTORY_LIMIT")
                .filter(|limit| *limit > 0)
                .or(defaults.history_limit),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|value| value.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config_from(&[]);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.addr(), "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.rollover_tick, Duration::from_secs(60));
        assert_eq!(config.reminder_interval, Duration::from_secs(5400));
        assert_eq!(config.history_limit, None);
    }

    #[test]
    fn overrides_are_applied() {
        let config = config_from(&[
            ("APP_DATA_DIR", "/tmp/hydro"),
            ("HOST", "0.0.0.0"),
            ("PORT", "9000"),
            ("ROLLOVER_TICK_SECS", "5"),
            ("REMINDER_INTERVAL_SECS", "120"),
            ("HISTORY_LIMIT", "365"),
        ]);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/hydro"));
        assert_eq!(config.addr(), "0.0.0.0:9000".parse().unwrap());
        assert_eq!(config.rollover_tick, Duration::from_secs(5));
        assert_eq!(config.reminder_interval, Duration::from_secs(120));
        assert_eq!(config.history_limit, Some(365));
    }

    #[test]
    fn bad_values_fall_back() {
        let config = config_from(&[
            ("PORT", "eighty"),
            ("ROLLOVER_TICK_SECS", "0"),
            ("HISTORY_LIMIT", "-3"),
            ("APP_DATA_DIR", "  "),
        ]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.rollover_tick, Duration::from_secs(60));
        assert_eq!(config.history_limit, None);
        assert_eq!(config.data_dir, PathBuf::from("data"));
    }
}
