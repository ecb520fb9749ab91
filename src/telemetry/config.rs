/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Filter used when `RUST_LOG` is not set
    pub default_filter: String,
}

impl LoggingConfig {
    /// Read `LOG_FORMAT` and map the `-v` count onto a default filter
    pub fn from_env(verbosity: u8) -> Self {
        let format = match std::env::var("LOG_FORMAT") {
            Ok(value) if value.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Self {
            format,
            default_filter: Self::filter_for(verbosity).to_string(),
        }
    }

    fn filter_for(verbosity: u8) -> &'static str {
        match verbosity {
            0 => "pm2insomnia=warn",
            1 => "pm2insomnia=info",
            _ => "pm2insomnia=debug",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_filters() {
        assert_eq!(LoggingConfig::filter_for(0), "pm2insomnia=warn");
        assert_eq!(LoggingConfig::filter_for(1), "pm2insomnia=info");
        assert_eq!(LoggingConfig::filter_for(5), "pm2insomnia=debug");
    }
}
