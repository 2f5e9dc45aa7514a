use std::{fmt, str::FromStr};

use crate::config::Settings;

/// Формат вывода логов.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let s = match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub with_ansi: bool,
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            with_ansi: true,
            with_target: true,
        }
    }
}

impl LoggingConfig {
    /// Собирает конфигурацию из общих настроек; неизвестный формат
    /// заменяется на `compact`.
    pub fn from_settings(settings: &Settings) -> Self {
        let format = settings.log_format.parse().unwrap_or_else(|err| {
            eprintln!("{err}; falling back to 'compact'");
            LogFormat::Compact
        });
        Self {
            level: settings.log_level.clone(),
            format,
            ..Self::default()
        }
    }

    /// Директива для `EnvFilter`, например `localbus=debug`.
    pub fn build_filter_directive(&self) -> String {
        format!("{}={}", env!("CARGO_CRATE_NAME"), self.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("pretty".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert!("xml".parse::<LogFormat>().is_err());
        assert_eq!(LogFormat::Compact.to_string(), "compact");
    }

    #[test]
    fn test_filter_directive() {
        let cfg = LoggingConfig {
            level: "debug".into(),
            ..Default::default()
        };
        assert_eq!(cfg.build_filter_directive(), "localbus=debug");
    }

    #[test]
    fn test_from_settings_falls_back_to_compact() {
        let settings = Settings {
            log_format: "yaml".into(),
            log_level: "warn".into(),
            ..Settings::default()
        };
        let cfg = LoggingConfig::from_settings(&settings);
        assert_eq!(cfg.format, LogFormat::Compact);
        assert_eq!(cfg.level, "warn");
    }
}
