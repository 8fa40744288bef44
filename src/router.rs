//! AI request router
//!
//! Each request runs one linear pass:
//! normalize -> resolve config -> bound input -> invoke -> post-process.
//! Validation failures are reported before the provider is touched; the
//! provider call is the only await point and is bounded by a timeout.
//! Nothing is retried.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use log::{debug, trace, error, info};

use crate::bounding;
use crate::config::LimitsConfig;
use crate::error::Error;
use crate::modes::{InputRequirement, Mode, ModelTier, GenerationConfig};
use crate::postprocess;
use crate::providers::CompletionService;
use crate::request::{AskResponse, CompletionRequest, GenerationRequest, GenerationResult};

/// User content for grading modes that arrive without notes
const NO_REFERENCE_NOTES: &str = "(No reference notes were provided.)";

/// Starts the live question in an `interview-assist` transcript
pub const INTERVIEWER_SAID: &str = "INTERVIEWER SAID:";

/// A request that passed validation
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized<'a>
{   /// Nothing to work on; answer without calling the provider
    NoContent
  , /// Text modes
    Text
    {   mode: Mode
      , text: &'a str
    }
  , /// Grading modes
    Graded
    {   mode: Mode
      , question: &'a str
      , user_answer: &'a str
      , notes: Option<&'a str>
    }
}

fn non_blank(value: &Option<String>) -> Option<&str>
{   value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Check the fields the requested mode needs
pub fn normalize(request: &GenerationRequest)
  -> Result<Normalized<'_>, Error>
{   if request.mode.trim().is_empty()
    {   return Err(Error::MissingRequiredField("mode".to_string()));
    }
    let mode = Mode::from_str(request.mode.trim())?;

    match mode.input_requirement()
    {   InputRequirement::Text => {
          Ok(match non_blank(&request.text)
          {   Some(text) => Normalized::Text { mode, text }
            , None => Normalized::NoContent
          })
        }
      , InputRequirement::GradedAnswer => {
          let question = non_blank(&request.question)
            .ok_or_else(|| {
              Error::MissingRequiredField("question".to_string())
            })?;
          let user_answer = non_blank(&request.user_answer)
            .ok_or_else(|| {
              Error::MissingRequiredField("userAnswer".to_string())
            })?;
          Ok(Normalized::Graded
          {   mode
            , question
            , user_answer
            , notes: non_blank(&request.text)
          })
        }
    }
}

/// Stateless request router; share it behind an `Arc`
pub struct AiRouter
{   completion: Arc<dyn CompletionService>
  , limits: LimitsConfig
}

impl AiRouter
{   pub fn new(
      completion: Arc<dyn CompletionService>
    , limits: LimitsConfig
    ) -> Self
    {   debug!("Creating AiRouter backed by {}", completion.name());
        AiRouter
        {   completion
          , limits
        }
    }

    /// Build the completion call for a validated request
    pub fn prepare(
      &self
    , normalized: &Normalized<'_>
    , sub_mode: Option<&str>
    ) -> Option<CompletionRequest>
    {   match *normalized
        {   Normalized::NoContent => None
          , Normalized::Text { mode, text } => {
              let config = crate::modes::config_for(mode, sub_mode);
              let limit = self.limits.input_char_limit;
              let content = match mode
              {   Mode::Continue => bounding::bound(
                    bounding::tail(text, self.limits.continue_tail_chars)
                  , limit
                  )
                , Mode::InterviewAssist => {
                    bounding::bound_before_last(text, INTERVIEWER_SAID, limit)
                  }
                , _ => bounding::bound(text, limit)
              };
              Some(CompletionRequest::new(config, content))
            }
          , Normalized::Graded { mode, question, user_answer, notes } => {
              let config = crate::modes::config_for(mode, sub_mode)
                .with_graded_answer(question, user_answer);
              let content = match notes
              {   Some(notes) => {
                    bounding::bound(notes, self.limits.input_char_limit)
                  }
                , None => NO_REFERENCE_NOTES.to_string()
              };
              Some(CompletionRequest::new(config, content))
            }
        }
    }

    /// Handle one `POST /api/ai` request
    pub async fn generate(&self, request: &GenerationRequest)
      -> Result<GenerationResult, Error>
    {   let normalized = normalize(request).map_err(|e| {
          info!("Rejected {:?} request: {}", request.mode, e);
          e
        })?;
        debug!("Validated mode {:?}", request.mode);

        let completion = match self.prepare(
          &normalized
        , request.sub_mode.as_deref()
        )
        {   Some(completion) => completion
          , None => {
              debug!("No content for {:?}, skipping provider", request.mode);
              return Ok(GenerationResult::no_content());
            }
        };
        let json_mode = completion.json_mode;
        debug!(
          "Configured {}: tier={:?} json={} input_chars={}"
        , request.mode
        , completion.model
        , json_mode
        , completion.user_content.chars().count()
        );

        let raw = self.invoke(completion).await?;
        Ok(postprocess::post_process(&raw, json_mode))
    }

    /// Answer a question from the whole notes collection
    pub async fn ask(
      &self
    , question: Option<&str>
    , notes: &[crate::notes::Note]
    ) -> Result<AskResponse, Error>
    {   let question = question
          .map(str::trim)
          .filter(|q| !q.is_empty())
          .ok_or_else(|| Error::MissingRequiredField("question".to_string()))?;

        let knowledge_base = bounding::bound(
          &knowledge_base(notes)
        , self.limits.knowledge_base_char_limit
        );
        debug!(
          "ask: {} notes, {} chars of context"
        , notes.len()
        , knowledge_base.chars().count()
        );

        let config = ask_config(question, &knowledge_base);
        let answer = self
          .invoke(CompletionRequest::new(config, question.to_string()))
          .await?;
        Ok(AskResponse { answer })
    }

    async fn invoke(&self, completion: CompletionRequest)
      -> Result<String, Error>
    {   trace!("Invoking {} with {:?}", self.completion.name(), completion);
        let timeout = Duration::from_secs(self.limits.request_timeout_secs);
        match tokio::time::timeout(timeout, self.completion.complete(completion)).await
        {   Ok(Ok(raw)) => {
              trace!("Provider returned {} chars", raw.len());
              Ok(raw)
            }
          , Ok(Err(e)) => {
              error!("Provider {} failed: {}", self.completion.name(), e);
              Err(e)
            }
          , Err(_) => {
              error!(
                "Provider {} timed out after {:?}"
              , self.completion.name()
              , timeout
              );
              Err(Error::Timeout)
            }
        }
    }
}

/// Notes joined into one searchable block
pub fn knowledge_base(notes: &[crate::notes::Note]) -> String
{   notes.iter()
      .map(|n| format!("Title: {}\nContent: {}", n.title, n.content))
      .collect::<Vec<_>>()
      .join("\n\n---\n\n")
}

fn ask_config(question: &str, knowledge_base: &str) -> GenerationConfig
{   GenerationConfig
    {   system_prompt: format!(
          "You are the user's personal \"Second Brain\" AI.\n\
           You have access to their personal database of notes below.\n\n\
           User's Question: \"{}\"\n\n\
           Instructions:\n\
           1. Search the USER NOTES below for the answer.\n\
           2. If the answer is found, explain it clearly using the notes.\n\
           3. If the answer is NOT in the notes, say: \"I couldn't find that \
           in your notes, but generally...\" and then give a general answer.\n\
           4. Keep answers concise and helpful.\n\n\
           USER NOTES DATABASE:\n{}"
        , question
        , knowledge_base
        )
      , model: ModelTier::Heavy
      , temperature: 0.3
      , max_output_tokens: 1024
      , json_mode: false
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn blank_text_short_circuits()
    {   let req = GenerationRequest::new("summary").with_text("   ");
        assert_eq!(normalize(&req).unwrap(), Normalized::NoContent);
    }

    #[test]
    fn unknown_mode_wins_over_missing_text()
    {   let req = GenerationRequest::new("poetry");
        assert_eq!(
          normalize(&req)
        , Err(Error::InvalidMode("poetry".to_string()))
        );
    }

    #[test]
    fn empty_mode_is_missing_field()
    {   let req = GenerationRequest::default();
        assert_eq!(
          normalize(&req)
        , Err(Error::MissingRequiredField("mode".to_string()))
        );
    }

    #[test]
    fn graded_mode_needs_answer()
    {   let mut req = GenerationRequest::new("interview-feedback");
        req.question = Some("Why Rust?".to_string());
        assert_eq!(
          normalize(&req)
        , Err(Error::MissingRequiredField("userAnswer".to_string()))
        );
    }

    #[test]
    fn knowledge_base_joins_notes()
    {   let now = chrono::Utc::now();
        let note = |title: &str, content: &str| crate::notes::Note
        {   id: title.to_string()
          , title: title.to_string()
          , content: content.to_string()
          , created_at: now
          , updated_at: now
        };
        let kb = knowledge_base(&[note("A", "one"), note("B", "two")]);
        assert_eq!(kb, "Title: A\nContent: one\n\n---\n\nTitle: B\nContent: two");
    }
}
