use serde::{Deserialize, Serialize};

use config::{Config, ConfigError, Environment};

use crate::pubsub::DEFAULT_ROOT_TOKEN;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Зарезервированный корневой токен: топик, равный ему, считается пустым.
    pub root_token: String,
    /// Зерно для выбора получателя в очереди; `None` — случайный выбор.
    pub rng_seed: Option<u64>,
    pub log_level: String,
    /// `compact`, `pretty` или `json`.
    pub log_format: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root_token: DEFAULT_ROOT_TOKEN.to_string(),
            rng_seed: None,
            log_level: "info".to_string(),
            log_format: "compact".to_string(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Environment::with_prefix("LOCALBUS"))
    }

    fn load_from(env: Environment) -> Result<Self, ConfigError> {
        let cfg = Config::builder()
            // Добавляем значения по умолчанию
            .set_default("root_token", DEFAULT_ROOT_TOKEN)?
            .set_default("log_level", "info")?
            .set_default("log_format", "compact")?
            // Переменные окружения с префиксом LOCALBUS_
            .add_source(env)
            .build()?;

        // Десериализуем конфигурацию в нашу структуру
        cfg.try_deserialize()
    }
}
