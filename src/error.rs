use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("Invalid date \"{input}\" (expected RFC 3339 or YYYY-MM-DD)")]
    InvalidDate { input: String },

    #[error("Invalid timezone: {input}")]
    InvalidTimezone { input: String },

    #[error("Unsupported locale: {input}")]
    UnsupportedLocale { input: String },

    #[error("Unknown source \"{input}\" (expected claude, codex or all)")]
    UnknownSource { input: String },

    #[error("Invalid week start: {input}")]
    InvalidWeekStart { input: String },

    #[error("Minimum days in first week must be between 1 and 7, got {value}")]
    InvalidMinDays { value: u8 },

    #[error("Home directory unavailable and no log directories configured")]
    HomeDirUnavailable,
}

#[derive(Debug, Error)]
pub(crate) enum PricingError {
    #[error("Pricing request failed: {0}")]
    Http(#[from] ureq::Error),

    #[error("Pricing server returned HTTP {code}")]
    Status { code: u16 },

    #[error("Failed to decode pricing table: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Failed to read pricing file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_error_display_date() {
        let e = AppError::InvalidDate {
            input: "abc".to_string(),
        };
        assert_eq!(
            e.to_string(),
            r#"Invalid date "abc" (expected RFC 3339 or YYYY-MM-DD)"#
        );
    }

    #[test]
    fn app_error_display_timezone() {
        let e = AppError::InvalidTimezone {
            input: "Mars/Olympus".to_string(),
        };
        assert_eq!(e.to_string(), "Invalid timezone: Mars/Olympus");
    }

    #[test]
    fn app_error_display_locale() {
        let e = AppError::UnsupportedLocale {
            input: "xx".to_string(),
        };
        assert_eq!(e.to_string(), "Unsupported locale: xx");
    }

    #[test]
    fn app_error_display_min_days() {
        let e = AppError::InvalidMinDays { value: 9 };
        assert_eq!(
            e.to_string(),
            "Minimum days in first week must be between 1 and 7, got 9"
        );
    }

    #[test]
    fn pricing_error_status() {
        let e = PricingError::Status { code: 503 };
        assert_eq!(e.to_string(), "Pricing server returned HTTP 503");
    }

    #[test]
    fn pricing_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let e: PricingError = json_err.into();
        assert!(e.to_string().starts_with("Failed to decode pricing table"));
    }

    #[test]
    fn pricing_error_read_names_path() {
        let e = PricingError::Read {
            path: PathBuf::from("/tmp/prices.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(
            e.to_string(),
            "Failed to read pricing file /tmp/prices.json: missing"
        );
    }

    #[test]
    fn config_error_parse_names_path() {
        let source = toml::from_str::<toml::Table>("offline = ").unwrap_err();
        let e = ConfigError::Parse {
            path: PathBuf::from("/tmp/tokenbar.toml"),
            source,
        };
        assert!(e.to_string().starts_with("Invalid config /tmp/tokenbar.toml: "));
    }
}
