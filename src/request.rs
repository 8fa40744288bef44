//! Request and response types for the MindScribe AI endpoints

use serde::{Deserialize, Serialize};

/// Result text for requests that arrive without content
pub const NO_CONTENT_RESULT: &str = "No content provided.";

/// Body of `POST /api/ai`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest
{   /// Requested operation, e.g. "summary"
    #[serde(default)]
    pub mode: String
  , /// Optional style within the mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_mode: Option<String>
  , /// Content to operate on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>
  , /// Grading modes: the question that was asked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>
  , /// Grading modes: what the user answered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_answer: Option<String>
}

impl GenerationRequest
{   pub fn new(mode: impl Into<String>) -> Self
    {   GenerationRequest
        {   mode: mode.into()
          , ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self
    {   self.text = Some(text.into());
        self
    }

    pub fn with_sub_mode(mut self, sub_mode: impl Into<String>) -> Self
    {   self.sub_mode = Some(sub_mode.into());
        self
    }

    pub fn with_answer(
      mut self
    , question: impl Into<String>
    , user_answer: impl Into<String>
    ) -> Self
    {   self.question = Some(question.into());
        self.user_answer = Some(user_answer.into());
        self
    }
}

/// Successful payload of `POST /api/ai`
///
/// Callers tell structured output from raw text by shape: a structured
/// result is the model's JSON object flattened into the body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GenerationResult
{   Text
    {   result: String
    }
  , Structured(serde_json::Map<String, serde_json::Value>)
}

impl GenerationResult
{   pub fn text(result: impl Into<String>) -> Self
    {   GenerationResult::Text { result: result.into() }
    }

    pub fn no_content() -> Self
    {   GenerationResult::text(NO_CONTENT_RESULT)
    }

    pub fn as_text(&self) -> Option<&str>
    {   match self
        {   GenerationResult::Text { result } => Some(result)
          , GenerationResult::Structured(_) => None
        }
    }

    pub fn as_object(&self)
      -> Option<&serde_json::Map<String, serde_json::Value>>
    {   match self
        {   GenerationResult::Structured(map) => Some(map)
          , GenerationResult::Text { .. } => None
        }
    }
}

/// What the completion service is asked to do
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest
{   pub system_prompt: String
  , pub user_content: String
  , pub model: crate::modes::ModelTier
  , pub temperature: f32
  , pub max_output_tokens: u32
  , pub json_mode: bool
}

impl CompletionRequest
{   pub fn new(
      config: crate::modes::GenerationConfig
    , user_content: String
    ) -> Self
    {   CompletionRequest
        {   system_prompt: config.system_prompt
          , user_content
          , model: config.model
          , temperature: config.temperature
          , max_output_tokens: config.max_output_tokens
          , json_mode: config.json_mode
        }
    }
}

/// Body of `POST /api/ai/ask`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AskRequest
{   #[serde(default)]
    pub question: Option<String>
}

/// Reply of `POST /api/ai/ask`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskResponse
{   pub answer: String
}

/// Error body for every endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse
{   pub error: String
}

// ===== Structured shapes produced by JSON modes =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flashcard
{   pub front: String
  , pub back: String
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashcardDeck
{   pub flashcards: Vec<Flashcard>
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizGrade
{   pub score: u8
  , pub feedback: String
  , pub correct_answer: String
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewFeedback
{   pub rating: String
  , pub feedback: String
  , pub better_answer: String
}
