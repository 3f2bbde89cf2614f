//! Events emitted by aggregate writes and consumed by the notifier.
//!
//! A mutating operation returns an [`Outcome`]: the value it wrote plus the events
//! the write produced. [`commit`] hands the events to the notifier on the same
//! transaction and only then commits, so a card/comment write and the
//! notifications derived from it land together or not at all.

use sqlx::{Postgres, Transaction};

use super::error::BoardResult;
use super::notifier;
use crate::models::{Role, UserIdentity};

/// The card an event is about, with enough context to word a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRef {
    pub card_id: i32,
    pub board_id: i32,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    CommentCreated {
        card: CardRef,
        author: UserIdentity,
        text: String,
    },
    /// `old` is empty for a newly created card.
    CardDescriptionChanged {
        card: CardRef,
        actor: UserIdentity,
        old: String,
        new: String,
    },
    /// `old` is empty for a newly created card.
    CardAssigneesChanged {
        card: CardRef,
        actor: UserIdentity,
        old: Vec<i32>,
        new: Vec<i32>,
    },
    MemberAdded {
        board_id: i32,
        board_title: String,
        actor: UserIdentity,
        user_id: i32,
        role: Role,
    },
}

/// A written value and the events its write emitted.
#[derive(Debug)]
pub struct Outcome<T> {
    pub value: T,
    pub events: Vec<BoardEvent>,
}

impl<T> Outcome<T> {
    pub fn with_events(value: T, events: Vec<BoardEvent>) -> Self {
        Outcome { value, events }
    }
}

/// Runs the notifier over `outcome.events` inside `tx`, then commits.
pub async fn commit<T>(mut tx: Transaction<'_, Postgres>, outcome: Outcome<T>) -> BoardResult<T> {
    if !outcome.events.is_empty() {
        let written = notifier::handle_all(&mut tx, &outcome.events).await?;
        log::debug!(
            "{} event(s) produced {} notification(s)",
            outcome.events.len(),
            written
        );
    }
    tx.commit().await?;
    Ok(outcome.value)
}
