//! Configuration for the MindScribe server, provider and input limits

use serde::{Deserialize, Serialize};
use log::{debug, info};

/// Env var naming an optional JSON config file
pub const CONFIG_PATH_ENV: &str = "MINDSCRIBE_CONFIG";
pub const BIND_ENV: &str = "MINDSCRIBE_BIND";
pub const INPUT_LIMIT_ENV: &str = "MINDSCRIBE_INPUT_LIMIT";

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig
{   /// Socket address to listen on
    pub bind: String
}

impl Default for ServerConfig
{   fn default() -> Self
    {   ServerConfig
        {   bind: "127.0.0.1:3000".to_string()
        }
    }
}

/// Completion provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig
{   /// Which OpenAI-compatible backend to talk to
    pub provider: crate::Provider
  , /// API base URL (if custom)
    pub api_base: Option<String>
  , /// Env var holding the API key (provider default if unset)
    pub api_key_env: Option<String>
  , /// Model used for the LIGHT tier
    pub light_model: String
  , /// Model used for the HEAVY tier
    pub heavy_model: String
  , /// Request timeout in seconds
    pub timeout_secs: u64
  , /// Connect timeout in seconds
    pub connect_timeout_secs: u64
}

impl ProviderConfig
{   pub fn api_base(&self) -> String
    {   self.api_base.clone()
          .unwrap_or_else(|| self.provider.default_api_base().to_string())
    }

    pub fn api_key_env(&self) -> String
    {   self.api_key_env.clone()
          .unwrap_or_else(|| self.provider.default_api_key_env().to_string())
    }
}

impl Default for ProviderConfig
{   fn default() -> Self
    {   ProviderConfig
        {   provider: crate::Provider::Groq
          , api_base: None
          , api_key_env: None
          , light_model: "llama-3.1-8b-instant".to_string()
          , heavy_model: "llama-3.3-70b-versatile".to_string()
          , timeout_secs: 60
          , connect_timeout_secs: 10
        }
    }
}

/// Bounds applied to request content and provider calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig
{   /// Max characters of `text` forwarded to the model
    pub input_char_limit: usize
  , /// Characters of trailing context used by `continue`
    pub continue_tail_chars: usize
  , /// Max characters of concatenated notes for ask-your-notes
    pub knowledge_base_char_limit: usize
  , /// Upper bound on a single completion call
    pub request_timeout_secs: u64
}

impl Default for LimitsConfig
{   fn default() -> Self
    {   LimitsConfig
        {   input_char_limit: 15_000
          , continue_tail_chars: 1_000
          , knowledge_base_char_limit: 20_000
          , request_timeout_secs: 60
        }
    }
}

/// MindScribe configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MindScribeConfig
{   pub server: ServerConfig
  , pub provider: ProviderConfig
  , pub limits: LimitsConfig
}

impl MindScribeConfig
{   /// Load from `MINDSCRIBE_CONFIG` (if set), then apply env overrides
    pub fn load() -> Result<Self, crate::error::Error>
    {   let mut config = match std::env::var(CONFIG_PATH_ENV)
        {   Ok(path) => {
              info!("Loading config from {}", path);
              let raw = std::fs::read_to_string(&path)
                .map_err(|e| {
                  crate::error::Error::InvalidConfiguration(
                    format!("cannot read {}: {}", path, e)
                  )
                })?;
              Self::from_json_str(&raw)?
            }
          , Err(_) => {
              debug!("No {} set, using defaults", CONFIG_PATH_ENV);
              MindScribeConfig::default()
            }
        };

        if let Ok(bind) = std::env::var(BIND_ENV)
        {   config.server.bind = bind;
        }
        if let Ok(limit) = std::env::var(INPUT_LIMIT_ENV)
        {   config.limits.input_char_limit = limit.parse()
              .map_err(|_| {
                crate::error::Error::InvalidConfiguration(
                  format!("{} is not a number: {}", INPUT_LIMIT_ENV, limit)
                )
              })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document; missing sections keep their defaults
    pub fn from_json_str(raw: &str)
      -> Result<Self, crate::error::Error>
    {   serde_json::from_str(raw).map_err(|e| {
          crate::error::Error::InvalidConfiguration(e.to_string())
        })
    }

    pub fn validate(&self) -> Result<(), crate::error::Error>
    {   let invalid = |msg: &str| {
          Err(crate::error::Error::InvalidConfiguration(msg.to_string()))
        };
        if self.limits.input_char_limit == 0
        {   return invalid("limits.input_char_limit must be positive");
        }
        if self.limits.continue_tail_chars == 0
        {   return invalid("limits.continue_tail_chars must be positive");
        }
        if self.limits.knowledge_base_char_limit == 0
        {   return invalid(
              "limits.knowledge_base_char_limit must be positive"
            );
        }
        if self.limits.request_timeout_secs == 0
          || self.provider.timeout_secs == 0
        {   return invalid("timeouts must be positive");
        }
        if self.provider.light_model.is_empty()
          || self.provider.heavy_model.is_empty()
        {   return invalid("provider models must be named");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn defaults_are_valid()
    {   let config = MindScribeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.limits.input_char_limit, 15_000);
        assert_eq!(config.provider.api_base(), "https://api.groq.com/openai/v1");
        assert_eq!(config.provider.api_key_env(), "GROQ_API_KEY");
    }

    #[test]
    fn partial_json_keeps_defaults()
    {   let config = MindScribeConfig::from_json_str(
          r#"{ "limits": { "input_char_limit": 500 },
               "provider": { "provider": "OpenAI", "heavy_model": "gpt-4o" } }"#
        ).unwrap();
        assert_eq!(config.limits.input_char_limit, 500);
        assert_eq!(config.limits.continue_tail_chars, 1_000);
        assert_eq!(config.provider.heavy_model, "gpt-4o");
        assert_eq!(config.provider.light_model, "llama-3.1-8b-instant");
        assert_eq!(config.server.bind, "127.0.0.1:3000");
        assert_eq!(config.provider.api_key_env(), "OPENAI_API_KEY");
    }

    #[test]
    fn zero_limit_is_rejected()
    {   let mut config = MindScribeConfig::default();
        config.limits.input_char_limit = 0;
        assert!(matches!(
          config.validate()
        , Err(crate::error::Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn malformed_json_is_configuration_error()
    {   let err = MindScribeConfig::from_json_str("{ nope").unwrap_err();
        assert!(matches!(err, crate::error::Error::InvalidConfiguration(_)));
    }
}
