pub mod error;
pub mod config;
pub mod modes;
pub mod bounding;
pub mod postprocess;
pub mod providers;
pub mod request;
pub mod router;
pub mod notes;
pub mod server;
use serde::{Deserialize, Serialize};

/*

mindscribe: the AI backend behind MindScribe notes. One POST endpoint
takes a generic "mode" request, picks the model tier, system prompt and
sampling settings from a static table, bounds the input, calls the
completion provider and shapes the reply (JSON modes get recovered from
fenced / chatty output).

mindscribe/
├── Cargo.toml
├── src/
│   ├── lib.rs            # Re-exports, Provider
│   ├── main.rs           # Binary: config + logging + serve
│   ├── error.rs          # Error enum shared by every layer
│   ├── config.rs         # Server / provider / limits configuration
│   ├── modes.rs          # Mode table and GenerationConfig
│   ├── bounding.rs       # Input truncation
│   ├── postprocess.rs    # JSON recovery and raw-text fallback
│   ├── request.rs        # Wire types
│   ├── router.rs         # normalize -> route -> bound -> invoke -> post-process
│   ├── notes.rs          # In-memory notes store (actor)
│   ├── server.rs         # axum routes
│   └── providers/
│       ├── mod.rs        # CompletionService trait
│       └── openai_compat.rs
└── tests/

*/

pub use error::Error;
pub use config::MindScribeConfig;
pub use modes::{GenerationConfig, Mode, ModelTier};
pub use providers::CompletionService;
pub use request::{GenerationRequest, GenerationResult};
pub use router::AiRouter;
pub use notes::{NotesBackend, Note, NoteSummary};

/// OpenAI-compatible chat-completions backends.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Hash)]
pub enum Provider
{   /// Groq (hosts Llama models)
    Groq
  , /// OpenAI (GPT models)
    OpenAI
  , /// Mistral AI
    MistralAi
  , /// Local/self-hosted server (Ollama, LM Studio, vLLM)
    Local
}

impl Provider
{   pub fn default_api_base(&self) -> &'static str
    {   match self
        {   Provider::Groq => "https://api.groq.com/openai/v1"
          , Provider::OpenAI => "https://api.openai.com/v1"
          , Provider::MistralAi => "https://api.mistral.ai/v1"
          , Provider::Local => "http://127.0.0.1:11434/v1"
        }
    }

    pub fn default_api_key_env(&self) -> &'static str
    {   match self
        {   Provider::Groq => "GROQ_API_KEY"
          , Provider::OpenAI => "OPENAI_API_KEY"
          , Provider::MistralAi => "MISTRAL_API_KEY"
          , Provider::Local => "LOCAL_LLM_API_KEY"
        }
    }

    /// Local servers usually run without auth
    pub fn requires_api_key(&self) -> bool
    {   !matches!(self, Provider::Local)
    }

    pub fn display_name(&self) -> &'static str
    {   match self
        {   Provider::Groq => "groq"
          , Provider::OpenAI => "openai"
          , Provider::MistralAi => "mistral"
          , Provider::Local => "local"
        }
    }
}
