use std::fmt;

/// Custom error type for MindScribe operations
/// Implements Clone for sending through channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Requested mode is not in the mode table
    InvalidMode(String)
  , /// A field the mode needs is absent or blank
    MissingRequiredField(String)
  , /// Request body could not be understood
    InvalidRequest(String)
  , /// No note with this id
    NoteNotFound(String)
  , /// API key is missing for a provider
    MissingApiKey(String)
  , /// HTTP request error
    HttpError(String)
  , /// API returned an error response
    ApiError(String)
  , /// Failed to parse API response
    ParseError(String)
  , /// No choices in API response
    NoChoicesInResponse
  , /// Rate limit exceeded
    RateLimitExceeded
  , /// Invalid configuration
    InvalidConfiguration(String)
  , /// Timeout error
    Timeout
  , /// Background task is gone
    BackendDisconnected(String)
  , /// Generic error
    Other(String)
}

impl Error
{   /// Failures caused by the caller's request (surfaced as 4xx)
    pub fn is_client_error(&self) -> bool
    {   matches!(
          self
        , Error::InvalidMode(_)
          | Error::MissingRequiredField(_)
          | Error::InvalidRequest(_)
          | Error::NoteNotFound(_)
        )
    }

    pub fn is_not_found(&self) -> bool
    {   matches!(self, Error::NoteNotFound(_))
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::InvalidMode(mode) => {
              write!(f, "Invalid mode: {}", mode)
            }
          , Error::MissingRequiredField(field) => {
              write!(f, "Missing required field: {}", field)
            }
          , Error::InvalidRequest(msg) => {
              write!(f, "Invalid request: {}", msg)
            }
          , Error::NoteNotFound(id) => {
              write!(f, "Note not found: {}", id)
            }
          , Error::MissingApiKey(provider) => {
              write!(f, "Missing API key for: {}", provider)
            }
          , Error::HttpError(msg) => {
              write!(f, "HTTP error: {}", msg)
            }
          , Error::ApiError(msg) => {
              write!(f, "API error: {}", msg)
            }
          , Error::ParseError(msg) => {
              write!(f, "Parse error: {}", msg)
            }
          , Error::NoChoicesInResponse => {
              write!(f, "API response contained no choices")
            }
          , Error::RateLimitExceeded => {
              write!(f, "API rate limit exceeded")
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::Timeout => {
              write!(f, "Request timed out")
            }
          , Error::BackendDisconnected(what) => {
              write!(f, "Backend disconnected: {}", what)
            }
          , Error::Other(msg) => {
              write!(f, "Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<String> for Error
{   fn from(s: String) -> Self
    {   Error::Other(s)
    }
}

impl From<&str> for Error
{   fn from(s: &str) -> Self
    {   Error::Other(s.to_string())
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn client_errors_are_classified()
    {   assert!(Error::InvalidMode("x".into()).is_client_error());
        assert!(
          Error::MissingRequiredField("question".into())
            .is_client_error()
        );
        assert!(Error::NoteNotFound("1".into()).is_not_found());
        assert!(!Error::Timeout.is_client_error());
        assert!(!Error::RateLimitExceeded.is_client_error());
    }

    #[test]
    fn display_carries_provider_message()
    {   let err = Error::ApiError("Groq error (500): boom".into());
        assert_eq!(err.to_string(), "API error: Groq error (500): boom");
    }
}
