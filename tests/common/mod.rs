//! Shared test doubles

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use async_trait::async_trait;

use mindscribe::config::LimitsConfig;
use mindscribe::error::Error;
use mindscribe::providers::CompletionService;
use mindscribe::request::CompletionRequest;
use mindscribe::router::AiRouter;

/// Completion service that replays a canned reply and records calls
pub struct ScriptedCompletion
{   reply: Result<String, Error>
  , delay: Option<Duration>
  , calls: AtomicUsize
  , seen: Mutex<Vec<CompletionRequest>>
}

impl ScriptedCompletion
{   pub fn replying(text: &str) -> Arc<Self>
    {   Arc::new(ScriptedCompletion
        {   reply: Ok(text.to_string())
          , delay: None
          , calls: AtomicUsize::new(0)
          , seen: Mutex::new(vec![])
        })
    }

    pub fn failing(err: Error) -> Arc<Self>
    {   Arc::new(ScriptedCompletion
        {   reply: Err(err)
          , delay: None
          , calls: AtomicUsize::new(0)
          , seen: Mutex::new(vec![])
        })
    }

    pub fn slow(text: &str, delay: Duration) -> Arc<Self>
    {   Arc::new(ScriptedCompletion
        {   reply: Ok(text.to_string())
          , delay: Some(delay)
          , calls: AtomicUsize::new(0)
          , seen: Mutex::new(vec![])
        })
    }

    pub fn calls(&self) -> usize
    {   self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest>
    {   self.seen.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion
{   async fn complete(&self, request: CompletionRequest)
      -> Result<String, Error>
    {   self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(request);
        if let Some(delay) = self.delay
        {   tokio::time::sleep(delay).await;
        }
        self.reply.clone()
    }

    fn name(&self) -> &str
    {   "scripted"
    }
}

pub fn router_with(fake: Arc<ScriptedCompletion>) -> AiRouter
{   AiRouter::new(fake, LimitsConfig::default())
}

pub fn router_with_limits(
  fake: Arc<ScriptedCompletion>
, limits: LimitsConfig
) -> AiRouter
{   AiRouter::new(fake, limits)
}
