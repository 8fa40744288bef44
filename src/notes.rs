//! In-memory notes store owned by a background task
//!
//! Callers hold a cloneable `NotesBackend` (the hand); the task owns the
//! map and drains one channel per command (the foot). Mutations are
//! therefore serialized without any lock.

use std::collections::HashMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use log::{debug, error, info};

pub const DEFAULT_TITLE: &str = "Untitled Note";

/// A stored note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note
{   pub id: String
  , pub title: String
  , pub content: String
  , pub created_at: DateTime<Utc>
  , pub updated_at: DateTime<Utc>
}

/// Sidebar listing entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteSummary
{   pub id: String
  , pub title: String
  , pub updated_at: DateTime<Utc>
}

impl From<&Note> for NoteSummary
{   fn from(note: &Note) -> Self
    {   NoteSummary
        {   id: note.id.clone()
          , title: note.title.clone()
          , updated_at: note.updated_at
        }
    }
}

pub type NoteReply = Result<Note, crate::error::Error>;
pub type NoteReplySender = mpsc::UnboundedSender<NoteReply>;

// ===== Commands =====

pub struct GetNoteArgs
{   pub id: String
  , pub reply: NoteReplySender
}

pub struct ListNotesArgs
{   pub reply: mpsc::UnboundedSender<Vec<NoteSummary>>
}

pub struct ListNoteContentsArgs
{   pub reply: mpsc::UnboundedSender<Vec<Note>>
}

pub struct CreateNoteArgs
{   pub title: Option<String>
  , pub content: Option<String>
  , pub reply: NoteReplySender
}

pub struct UpdateNoteArgs
{   pub id: String
  , pub title: Option<String>
  , pub content: Option<String>
  , pub reply: NoteReplySender
}

pub struct DeleteNoteArgs
{   pub id: String
  , pub reply: mpsc::UnboundedSender<bool>
}

pub struct ShutdownArgs
{   pub reply: mpsc::UnboundedSender<()>
}

// ===== NotesHand (sender side) =====

#[derive(Clone)]
pub struct NotesHand
{   pub get_tx: mpsc::UnboundedSender<GetNoteArgs>
  , pub list_tx: mpsc::UnboundedSender<ListNotesArgs>
  , pub list_contents_tx: mpsc::UnboundedSender<ListNoteContentsArgs>
  , pub create_tx: mpsc::UnboundedSender<CreateNoteArgs>
  , pub update_tx: mpsc::UnboundedSender<UpdateNoteArgs>
  , pub delete_tx: mpsc::UnboundedSender<DeleteNoteArgs>
  , pub shutdown_tx: mpsc::UnboundedSender<ShutdownArgs>
}

// ===== NotesFoot (receiver side) =====

pub struct NotesFoot
{   pub get_rx: mpsc::UnboundedReceiver<GetNoteArgs>
  , pub list_rx: mpsc::UnboundedReceiver<ListNotesArgs>
  , pub list_contents_rx: mpsc::UnboundedReceiver<ListNoteContentsArgs>
  , pub create_rx: mpsc::UnboundedReceiver<CreateNoteArgs>
  , pub update_rx: mpsc::UnboundedReceiver<UpdateNoteArgs>
  , pub delete_rx: mpsc::UnboundedReceiver<DeleteNoteArgs>
  , pub shutdown_rx: mpsc::UnboundedReceiver<ShutdownArgs>
}

/// State owned by the notes task
#[derive(Default)]
pub struct NotesState
{   notes: HashMap<String, Note>
}

impl NotesState
{   fn get(&self, id: &str) -> NoteReply
    {   self.notes.get(id)
          .cloned()
          .ok_or_else(|| crate::error::Error::NoteNotFound(id.to_string()))
    }

    /// Newest first
    fn sorted(&self) -> Vec<&Note>
    {   let mut notes: Vec<&Note> = self.notes.values().collect();
        notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        notes
    }

    fn create(&mut self, title: Option<String>, content: Option<String>)
      -> Note
    {   let now = Utc::now();
        let note = Note
        {   id: uuid::Uuid::new_v4().to_string()
          , title: title
              .filter(|t| !t.trim().is_empty())
              .unwrap_or_else(|| DEFAULT_TITLE.to_string())
          , content: content.unwrap_or_default()
          , created_at: now
          , updated_at: now
        };
        debug!("Created note {}", note.id);
        self.notes.insert(note.id.clone(), note.clone());
        note
    }

    fn update(
      &mut self
    , id: &str
    , title: Option<String>
    , content: Option<String>
    ) -> NoteReply
    {   let note = self.notes.get_mut(id)
          .ok_or_else(|| crate::error::Error::NoteNotFound(id.to_string()))?;
        if let Some(title) = title
        {   note.title = title;
        }
        if let Some(content) = content
        {   note.content = content;
        }
        note.updated_at = Utc::now();
        debug!("Updated note {}", id);
        Ok(note.clone())
    }

    fn delete(&mut self, id: &str) -> bool
    {   let existed = self.notes.remove(id).is_some();
        debug!("Delete note {} (existed: {})", id, existed);
        existed
    }
}

/// Public API for the notes store - owns the task
#[derive(Clone)]
pub struct NotesBackend
{   hand: NotesHand
}

fn disconnected<T>(_: T) -> crate::error::Error
{   error!("Notes backend channel closed");
    crate::error::Error::BackendDisconnected("notes".to_string())
}

async fn await_reply<T>(mut rx: mpsc::UnboundedReceiver<T>)
  -> Result<T, crate::error::Error>
{   rx.recv().await.ok_or_else(|| {
      error!("Notes backend dropped reply");
      crate::error::Error::BackendDisconnected("notes".to_string())
    })
}

impl NotesBackend
{   /// Create and spawn a new notes backend
    /// Returns immediately - spawns background task
    pub fn spawn() -> Self
    {   debug!("Creating NotesBackend");
        let (get_tx, get_rx) = mpsc::unbounded_channel();
        let (list_tx, list_rx) = mpsc::unbounded_channel();
        let (list_contents_tx, list_contents_rx) = mpsc::unbounded_channel();
        let (create_tx, create_rx) = mpsc::unbounded_channel();
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let (delete_tx, delete_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::unbounded_channel();

        let hand = NotesHand
        {   get_tx
          , list_tx
          , list_contents_tx
          , create_tx
          , update_tx
          , delete_tx
          , shutdown_tx
        };
        let foot = NotesFoot
        {   get_rx
          , list_rx
          , list_contents_rx
          , create_rx
          , update_rx
          , delete_rx
          , shutdown_rx
        };

        tokio::spawn(async move {
          run_notes_loop(foot).await
        });

        NotesBackend { hand }
    }

    pub async fn get(&self, id: &str) -> NoteReply
    {   let (reply, rx) = mpsc::unbounded_channel();
        self.hand.get_tx
          .send(GetNoteArgs { id: id.to_string(), reply })
          .map_err(disconnected)?;
        await_reply(rx).await?
    }

    /// Summaries, newest first
    pub async fn list(&self)
      -> Result<Vec<NoteSummary>, crate::error::Error>
    {   let (reply, rx) = mpsc::unbounded_channel();
        self.hand.list_tx
          .send(ListNotesArgs { reply })
          .map_err(disconnected)?;
        await_reply(rx).await
    }

    /// Full notes, newest first
    pub async fn all(&self) -> Result<Vec<Note>, crate::error::Error>
    {   let (reply, rx) = mpsc::unbounded_channel();
        self.hand.list_contents_tx
          .send(ListNoteContentsArgs { reply })
          .map_err(disconnected)?;
        await_reply(rx).await
    }

    pub async fn create(
      &self
    , title: Option<String>
    , content: Option<String>
    ) -> NoteReply
    {   let (reply, rx) = mpsc::unbounded_channel();
        self.hand.create_tx
          .send(CreateNoteArgs { title, content, reply })
          .map_err(disconnected)?;
        await_reply(rx).await?
    }

    pub async fn update(
      &self
    , id: &str
    , title: Option<String>
    , content: Option<String>
    ) -> NoteReply
    {   let (reply, rx) = mpsc::unbounded_channel();
        self.hand.update_tx
          .send(UpdateNoteArgs { id: id.to_string(), title, content, reply })
          .map_err(disconnected)?;
        await_reply(rx).await?
    }

    /// Returns whether the note existed
    pub async fn delete(&self, id: &str)
      -> Result<bool, crate::error::Error>
    {   let (reply, rx) = mpsc::unbounded_channel();
        self.hand.delete_tx
          .send(DeleteNoteArgs { id: id.to_string(), reply })
          .map_err(disconnected)?;
        await_reply(rx).await
    }

    /// Stop the background task
    pub async fn shutdown(&self) -> Result<(), crate::error::Error>
    {   debug!("Shutting down NotesBackend");
        let (reply, rx) = mpsc::unbounded_channel();
        self.hand.shutdown_tx
          .send(ShutdownArgs { reply })
          .map_err(disconnected)?;
        await_reply(rx).await
    }
}

/// Main notes event loop
async fn run_notes_loop(foot: NotesFoot)
{   debug!("Starting notes event loop");
    let mut state = NotesState::default();
    let NotesFoot
    {   mut get_rx
      , mut list_rx
      , mut list_contents_rx
      , mut create_rx
      , mut update_rx
      , mut delete_rx
      , mut shutdown_rx
    } = foot;

    loop
    { tokio::select!
      { Some(cmd) = get_rx.recv() => {
          let _ = cmd.reply.send(state.get(&cmd.id));
        }
      , Some(cmd) = list_rx.recv() => {
          let summaries = state.sorted()
            .into_iter()
            .map(NoteSummary::from)
            .collect();
          let _ = cmd.reply.send(summaries);
        }
      , Some(cmd) = list_contents_rx.recv() => {
          let notes = state.sorted()
            .into_iter()
            .cloned()
            .collect();
          let _ = cmd.reply.send(notes);
        }
      , Some(cmd) = create_rx.recv() => {
          let note = state.create(cmd.title, cmd.content);
          let _ = cmd.reply.send(Ok(note));
        }
      , Some(cmd) = update_rx.recv() => {
          let result = state.update(&cmd.id, cmd.title, cmd.content);
          let _ = cmd.reply.send(result);
        }
      , Some(cmd) = delete_rx.recv() => {
          let _ = cmd.reply.send(state.delete(&cmd.id));
        }
      , Some(cmd) = shutdown_rx.recv() => {
          let _ = cmd.reply.send(());
          info!("NotesBackend shutting down");
          break;
        }
      , else => {
          debug!("All notes channels closed");
          break;
        }
      }
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    #[tokio::test]
    async fn create_defaults_title_and_content()
    {   let notes = NotesBackend::spawn();
        let note = notes.create(None, None).await.unwrap();
        assert_eq!(note.title, DEFAULT_TITLE);
        assert_eq!(note.content, "");
        assert_eq!(notes.get(&note.id).await.unwrap(), note);
        let _ = notes.shutdown().await;
    }

    #[tokio::test]
    async fn list_is_newest_first()
    {   let notes = NotesBackend::spawn();
        let first = notes.create(Some("first".into()), None).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = notes.create(Some("second".into()), None).await.unwrap();
        let listed = notes.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        notes.update(&first.id, None, Some("edited".into())).await.unwrap();
        let listed = notes.list().await.unwrap();
        assert_eq!(listed[0].id, first.id);
        let _ = notes.shutdown().await;
    }

    #[tokio::test]
    async fn missing_notes_are_not_found()
    {   let notes = NotesBackend::spawn();
        assert!(notes.get("nope").await.unwrap_err().is_not_found());
        assert!(notes.update("nope", None, None).await.unwrap_err().is_not_found());
        assert!(!notes.delete("nope").await.unwrap());
        let _ = notes.shutdown().await;
    }

    #[tokio::test]
    async fn calls_after_shutdown_report_disconnect()
    {   let notes = NotesBackend::spawn();
        notes.shutdown().await.unwrap();
        tokio::task::yield_now().await;
        let err = notes.list().await.unwrap_err();
        assert!(matches!(err, crate::error::Error::BackendDisconnected(_)));
    }
}
