use anyhow::{Context, Result, bail};
use helia_common::models::{DEFAULT_CHAT_MODEL, find_chat_model};
use std::env;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Chat model id preselected for new chats.
    pub chat_model: String,
    /// Load development fixtures into the store on startup.
    pub seed_mock_data: bool,
}

impl Config {
    /// Reads `HELIA_CHAT_MODEL` and `HELIA_SEED_MOCK_DATA`, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let chat_model = lookup("HELIA_CHAT_MODEL").unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string());
        if find_chat_model(&chat_model).is_none() {
            bail!("HELIA_CHAT_MODEL '{chat_model}' is not a known chat model");
        }

        let seed_mock_data = match lookup("HELIA_SEED_MOCK_DATA") {
            Some(raw) => parse_flag(&raw)
                .with_context(|| format!("Invalid HELIA_SEED_MOCK_DATA value: {raw}"))?,
            None => true,
        };

        Ok(Self {
            chat_model,
            seed_mock_data,
        })
    }
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("expected a boolean, got '{other}'"),
    }
}
