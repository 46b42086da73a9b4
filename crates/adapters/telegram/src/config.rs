//! Telegram bot configuration.

use serde::Deserialize;

/// Configuration for the Telegram bot.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot API token issued by `@BotFather`.
    pub token: Option<String>,
    /// The only chat the bot serves and notifies.
    pub chat_id: Option<i64>,
    /// Long-poll duration of each `getUpdates` call, in seconds.
    pub poll_timeout_secs: u64,
    /// Bot API base URL.
    pub api_base: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: None,
            chat_id: None,
            poll_timeout_secs: 30,
            api_base: "https://api.telegram.org".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_have_sensible_defaults() {
        let config = TelegramConfig::default();
        assert_eq!(config.token, None);
        assert_eq!(config.chat_id, None);
        assert_eq!(config.poll_timeout_secs, 30);
        assert_eq!(config.api_base, "https://api.telegram.org");
    }

    #[test]
    fn should_deserialize_from_toml() {
        let toml = r#"
            token = "123:abc"
            chat_id = -100200
            poll_timeout_secs = 50
        "#;
        let config: TelegramConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.token.as_deref(), Some("123:abc"));
        assert_eq!(config.chat_id, Some(-100_200));
        assert_eq!(config.poll_timeout_secs, 50);
        assert_eq!(config.api_base, "https://api.telegram.org");
    }
}
