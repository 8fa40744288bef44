//! HTTP surface: `/api/ai`, `/api/ai/ask`, `/api/notes`, `/health`

use std::sync::Arc;
use axum::
{   extract::{rejection::JsonRejection, Query, State}
  , http::StatusCode
  , response::{IntoResponse, Response}
  , routing::{get, post}
  , Json
  , Router
};
use serde::{Deserialize, Serialize};
use log::{debug, error, info, warn};

use crate::error::Error;
use crate::request::{AskRequest, ErrorResponse, GenerationRequest};

/// Shared handler state
#[derive(Clone)]
pub struct AppState
{   pub router: Arc<crate::router::AiRouter>
  , pub notes: crate::notes::NotesBackend
}

impl AppState
{   pub fn new(
      router: crate::router::AiRouter
    , notes: crate::notes::NotesBackend
    ) -> Self
    {   AppState
        {   router: Arc::new(router)
          , notes
        }
    }
}

/// Error wrapper that renders as `{ "error": msg }`
pub struct ApiError(pub Error);

impl ApiError
{   pub fn status(&self) -> StatusCode
    {   if self.0.is_not_found()
        {   StatusCode::NOT_FOUND
        } else if self.0.is_client_error()
        {   StatusCode::BAD_REQUEST
        } else
        {   StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<Error> for ApiError
{   fn from(e: Error) -> Self
    {   ApiError(e)
    }
}

impl From<JsonRejection> for ApiError
{   fn from(rejection: JsonRejection) -> Self
    {   ApiError(Error::InvalidRequest(rejection.body_text()))
    }
}

impl IntoResponse for ApiError
{   fn into_response(self) -> Response
    {   let status = self.status();
        if status.is_server_error()
        {   error!("Request failed: {}", self.0);
        } else
        {   warn!("Request rejected ({}): {}", status, self.0);
        }
        (status, Json(ErrorResponse { error: self.0.to_string() })).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Deserialize)]
pub struct IdQuery
{   pub id: Option<String>
}

#[derive(Debug, Deserialize)]
pub struct CreateNoteBody
{   #[serde(default)]
    pub title: Option<String>
  , #[serde(default)]
    pub content: Option<String>
}

#[derive(Debug, Deserialize)]
pub struct UpdateNoteBody
{   #[serde(default)]
    pub id: Option<String>
  , #[serde(default)]
    pub title: Option<String>
  , #[serde(default)]
    pub content: Option<String>
}

#[derive(Debug, Serialize)]
pub struct DeleteReply
{   pub success: bool
}

#[derive(Debug, Serialize)]
pub struct HealthReply
{   pub status: &'static str
}

fn required_id(id: Option<String>) -> Result<String, Error>
{   id.filter(|id| !id.trim().is_empty())
      .ok_or_else(|| Error::MissingRequiredField("id".to_string()))
}

async fn ai_handler(
  State(state): State<AppState>
, body: Result<Json<GenerationRequest>, JsonRejection>
) -> Result<Json<crate::request::GenerationResult>, ApiError>
{   let Json(request) = body?;
    debug!("POST /api/ai mode={:?}", request.mode);
    let result = state.router.generate(&request).await?;
    Ok(Json(result))
}

async fn ask_handler(
  State(state): State<AppState>
, body: Result<Json<AskRequest>, JsonRejection>
) -> ApiResult<crate::request::AskResponse>
{   let Json(request) = body?;
    let notes = state.notes.all().await?;
    let answer = state.router
      .ask(request.question.as_deref(), &notes)
      .await?;
    Ok(Json(answer))
}

async fn get_notes(
  State(state): State<AppState>
, Query(query): Query<IdQuery>
) -> Result<Response, ApiError>
{   match query.id.filter(|id| !id.is_empty())
    {   Some(id) => {
          let note = state.notes.get(&id).await?;
          Ok(Json(note).into_response())
        }
      , None => {
          let notes = state.notes.list().await?;
          Ok(Json(notes).into_response())
        }
    }
}

async fn create_note(
  State(state): State<AppState>
, body: Result<Json<CreateNoteBody>, JsonRejection>
) -> ApiResult<crate::notes::Note>
{   let Json(body) = body?;
    let note = state.notes.create(body.title, body.content).await?;
    Ok(Json(note))
}

async fn update_note(
  State(state): State<AppState>
, body: Result<Json<UpdateNoteBody>, JsonRejection>
) -> ApiResult<crate::notes::Note>
{   let Json(body) = body?;
    let id = required_id(body.id)?;
    let note = state.notes.update(&id, body.title, body.content).await?;
    Ok(Json(note))
}

async fn delete_note(
  State(state): State<AppState>
, Query(query): Query<IdQuery>
) -> ApiResult<DeleteReply>
{   let id = required_id(query.id)?;
    state.notes.delete(&id).await?;
    Ok(Json(DeleteReply { success: true }))
}

async fn health() -> Json<HealthReply>
{   Json(HealthReply { status: "ok" })
}

/// All routes bound to `state`
pub fn build_app(state: AppState) -> Router
{   Router::new()
      .route("/api/ai", post(ai_handler))
      .route("/api/ai/ask", post(ask_handler))
      .route(
        "/api/notes"
      , get(get_notes)
          .post(create_note)
          .put(update_note)
          .delete(delete_note)
      )
      .route("/health", get(health))
      .with_state(state)
}

/// Serve on an already-bound listener until the task is dropped
pub async fn serve_on(
  listener: tokio::net::TcpListener
, state: AppState
) -> Result<(), Error>
{   let app = build_app(state);
    axum::serve(listener, app)
      .await
      .map_err(|e| Error::Other(format!("server error: {}", e)))
}

/// Bind `config.server.bind` and serve
pub async fn serve(
  config: &crate::config::MindScribeConfig
, state: AppState
) -> Result<(), Error>
{   let listener = tokio::net::TcpListener::bind(&config.server.bind)
      .await
      .map_err(|e| {
        Error::InvalidConfiguration(
          format!("cannot bind {}: {}", config.server.bind, e)
        )
      })?;
    let local_addr = listener.local_addr()
      .map_err(|e| Error::Other(e.to_string()))?;
    info!("Serving MindScribe AI API on http://{}/api/ai", local_addr);
    info!("Health endpoint: http://{}/health", local_addr);
    serve_on(listener, state).await
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn errors_map_to_status_codes()
    {   assert_eq!(
          ApiError(Error::InvalidMode("x".into())).status()
        , StatusCode::BAD_REQUEST
        );
        assert_eq!(
          ApiError(Error::NoteNotFound("x".into())).status()
        , StatusCode::NOT_FOUND
        );
        assert_eq!(
          ApiError(Error::RateLimitExceeded).status()
        , StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
