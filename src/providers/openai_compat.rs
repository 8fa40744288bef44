use std::time::Duration;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use log::{debug, trace, error};

// ===== Message Types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , pub content: String
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseFormat
{   #[serde(rename = "type")]
    pub kind: String
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest
{   pub model: String
  , pub messages: Vec<ChatMessage>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse
{   pub choices: Vec<Choice>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice
{   pub message: ResponseMessage
  , pub finish_reason: Option<String>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage
{   #[serde(default)]
    pub content: Option<String>
}

// ===== Client =====

/// Chat-completions client for any OpenAI-compatible endpoint.
///
/// Cheap to clone; the underlying `reqwest::Client` pools connections
/// so concurrent requests do not queue behind each other.
#[derive(Clone)]
pub struct ChatClient
{   provider: crate::Provider
  , api_base: String
  , api_key: Option<String>
  , light_model: String
  , heavy_model: String
  , http_client: reqwest::Client
}

impl ChatClient
{   /// Build a client; the key is read from the configured env var
    pub fn from_config(config: &crate::config::ProviderConfig)
      -> Result<Self, crate::error::Error>
    {   let api_key = std::env::var(config.api_key_env()).ok();
        Self::new(config, api_key)
    }

    pub fn new(
      config: &crate::config::ProviderConfig
    , api_key: Option<String>
    ) -> Result<Self, crate::error::Error>
    {   debug!("Creating ChatClient for {:?}", config.provider);
        let http_client = reqwest::Client::builder()
          .timeout(Duration::from_secs(config.timeout_secs))
          .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
          .build()
          .map_err(|e| {
            crate::error::Error::InvalidConfiguration(
              format!("HTTP client: {}", e)
            )
          })?;

        Ok(ChatClient
        {   provider: config.provider.clone()
          , api_base: config.api_base().trim_end_matches('/').to_string()
          , api_key
          , light_model: config.light_model.clone()
          , heavy_model: config.heavy_model.clone()
          , http_client
        })
    }

    pub fn has_api_key(&self) -> bool
    {   self.api_key.is_some()
    }

    pub fn model_for(&self, tier: crate::modes::ModelTier) -> &str
    {   match tier
        {   crate::modes::ModelTier::Light => &self.light_model
          , crate::modes::ModelTier::Heavy => &self.heavy_model
        }
    }

    fn get_api_key(&self) -> Result<&str, crate::error::Error>
    {   match (&self.api_key, self.provider.requires_api_key())
        {   (Some(key), _) => Ok(key.as_str())
          , (None, false) => Ok("")
          , (None, true) => {
              error!("No API key for {:?}", self.provider);
              Err(crate::error::Error::MissingApiKey(
                format!("{:?}", self.provider)
              ))
            }
        }
    }

    /// Wire request for a routed completion
    pub fn build_request(
      &self
    , request: &crate::request::CompletionRequest
    ) -> ChatCompletionRequest
    {   ChatCompletionRequest
        {   model: self.model_for(request.model).to_string()
          , messages: vec![
              ChatMessage
              {   role: "system".to_string()
                , content: request.system_prompt.clone()
              }
            , ChatMessage
              {   role: "user".to_string()
                , content: request.user_content.clone()
              }
            ]
          , max_tokens: Some(request.max_output_tokens)
          , temperature: Some(request.temperature)
          , response_format: if request.json_mode
            {   Some(ResponseFormat { kind: "json_object".to_string() })
            } else
            {   None
            }
          , stream: Some(false)
        }
    }

    async fn send_chat(
      &self
    , request: &ChatCompletionRequest
    ) -> Result<String, crate::error::Error>
    {   let api_key = self.get_api_key()?;
        trace!("{:?} request: {:?}", self.provider, request);

        let mut builder = self.http_client
          .post(format!("{}/chat/completions", self.api_base))
          .header("Content-Type", "application/json")
          .json(request);
        if !api_key.is_empty()
        {   builder = builder
              .header("Authorization", format!("Bearer {}", api_key));
        }

        let response = builder
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error: {}", e);
            if e.is_timeout()
            {   crate::error::Error::Timeout
            } else
            {   crate::error::Error::HttpError(e.to_string())
            }
          })?;

        let status = response.status();
        trace!("{:?} response status: {}", self.provider, status);

        if !status.is_success()
        {   let error_text = response.text().await
              .unwrap_or_else(|_|
                "Unknown error".to_string()
              );
            error!("{:?} API error ({}): {}", self.provider, status, error_text);
            return Err(match status.as_u16()
            {   401 => crate::error::Error::ApiError(
                  format!("{:?} rejected the API key", self.provider)
                )
              , 429 => crate::error::Error::RateLimitExceeded
              , _ => crate::error::Error::ApiError(
                  format!("{:?} error ({}): {}", self.provider, status, error_text)
                )
            });
        }

        let chat_response: ChatCompletionResponse
          = response.json().await.map_err(|e| {
            error!("Parse error: {}", e);
            crate::error::Error::ParseError(e.to_string())
          })?;

        chat_response.choices.into_iter()
          .next()
          .and_then(|c| c.message.content)
          .ok_or_else(|| {
            error!("No choices in response");
            crate::error::Error::NoChoicesInResponse
          })
    }
}

#[async_trait]
impl super::CompletionService for ChatClient
{   async fn complete(
      &self
    , request: crate::request::CompletionRequest
    ) -> Result<String, crate::error::Error>
    {   debug!(
          "complete: tier={:?} model={} json={}"
        , request.model
        , self.model_for(request.model)
        , request.json_mode
        );
        let wire = self.build_request(&request);
        self.send_chat(&wire).await
    }

    fn name(&self) -> &str
    {   self.provider.display_name()
    }
}

#[cfg(test)]
mod tests
{   use super::*;
    use crate::modes::ModelTier;

    fn sample(json_mode: bool) -> crate::request::CompletionRequest
    {   crate::request::CompletionRequest
        {   system_prompt: "sys".to_string()
          , user_content: "user".to_string()
          , model: ModelTier::Heavy
          , temperature: 0.2
          , max_output_tokens: 600
          , json_mode
        }
    }

    #[test]
    fn wire_request_maps_tier_and_json_mode()
    {   let client = ChatClient::new(
          &crate::config::ProviderConfig::default()
        , Some("k".to_string())
        ).unwrap();
        let wire = client.build_request(&sample(true));
        assert_eq!(wire.model, "llama-3.3-70b-versatile");
        assert_eq!(wire.messages.len(), 2);
        assert_eq!(wire.messages[0].role, "system");
        assert_eq!(wire.max_tokens, Some(600));

        let body = serde_json::to_value(&wire).unwrap();
        assert_eq!(body["response_format"]["type"], "json_object");

        let plain = serde_json::to_value(
          client.build_request(&sample(false))
        ).unwrap();
        assert!(plain.get("response_format").is_none());
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request()
    {   use crate::providers::CompletionService;
        let client = ChatClient::new(
          &crate::config::ProviderConfig::default()
        , None
        ).unwrap();
        let err = client.complete(sample(false)).await.unwrap_err();
        assert!(matches!(err, crate::error::Error::MissingApiKey(_)));
    }
}
