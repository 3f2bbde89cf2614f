//! Mention & assignment notifier.
//!
//! Consumes [`BoardEvent`]s and writes one notification per newly mentioned or newly
//! assigned user. Runs on the caller's transaction (see `events::commit`).
//!
//! # Rules
//! - A mention is `@handle` where the handle uses ASCII letters, digits, `_`, `-`
//!   and `.`, and the `@` starts the text or follows a character outside that
//!   alphabet (so `bob@example.com` is not a mention). Trailing dots are dropped.
//! - Handles are deduplicated per text. Unknown handles are ignored.
//! - Card descriptions notify only for handles present in the new text and absent
//!   from the previous one. Removing and re-adding a handle notifies again.
//! - Assignment notifies every user in the new assignee set that was not in the
//!   previously stored set.
//! - Mentions never notify the acting user.

use lazy_static::lazy_static;
use regex::Regex;
use sqlx::PgConnection;
use std::collections::BTreeSet;

use super::error::BoardResult;
use super::events::{BoardEvent, CardRef};
use super::identity;
use crate::models::{NewNotification, NotificationKind, UserIdentity};

lazy_static! {
    static ref MENTION_REGEX: Regex =
        Regex::new(r"(?:^|[^A-Za-z0-9_.@-])@([A-Za-z0-9_.-]+)").unwrap();
}

/// Distinct handles mentioned in `text`, without the `@`.
pub fn extract_mentions(text: &str) -> BTreeSet<String> {
    MENTION_REGEX
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim_end_matches('.'))
        .filter(|handle| !handle.is_empty())
        .map(str::to_string)
        .collect()
}

/// Handles mentioned in `new` but not in `old`.
pub fn added_mentions(old: &str, new: &str) -> BTreeSet<String> {
    let before = extract_mentions(old);
    extract_mentions(new)
        .into_iter()
        .filter(|handle| !before.contains(handle))
        .collect()
}

/// Users present in `new` but not in `old`.
pub fn added_assignees(old: &[i32], new: &[i32]) -> BTreeSet<i32> {
    new.iter()
        .copied()
        .filter(|user_id| !old.contains(user_id))
        .collect()
}

/// Where a mention was written; only changes the wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentionSource {
    Comment,
    Description,
}

/// One `mention` notification per resolved user other than the actor.
pub fn mention_notifications(
    mentioned: &[UserIdentity],
    actor: &UserIdentity,
    card: &CardRef,
    source: MentionSource,
) -> Vec<NewNotification> {
    let message = match source {
        MentionSource::Comment => format!(
            "{} mentioned you in a comment on \"{}\"",
            actor.username, card.title
        ),
        MentionSource::Description => {
            format!("{} mentioned you on card \"{}\"", actor.username, card.title)
        }
    };
    mentioned
        .iter()
        .filter(|user| user.id != actor.id)
        .map(|user| NewNotification {
            user_id: user.id,
            kind: NotificationKind::Mention,
            message: message.clone(),
            board_id: Some(card.board_id),
            card_id: Some(card.card_id),
        })
        .collect()
}

/// One `card_assigned` notification per added assignee.
pub fn assignment_notifications(
    added: &BTreeSet<i32>,
    actor: &UserIdentity,
    card: &CardRef,
) -> Vec<NewNotification> {
    added
        .iter()
        .map(|&user_id| NewNotification {
            user_id,
            kind: NotificationKind::CardAssigned,
            message: format!("{} assigned you to card \"{}\"", actor.username, card.title),
            board_id: Some(card.board_id),
            card_id: Some(card.card_id),
        })
        .collect()
}

/// Notifications an event calls for. Mentioned handles are resolved on `conn`.
pub async fn plan(conn: &mut PgConnection, event: &BoardEvent) -> BoardResult<Vec<NewNotification>> {
    let planned = match event {
        BoardEvent::CommentCreated { card, author, text } => {
            let handles: Vec<String> = extract_mentions(text).into_iter().collect();
            let mentioned = identity::resolve_handles(conn, &handles).await?;
            mention_notifications(&mentioned, author, card, MentionSource::Comment)
        }
        BoardEvent::CardDescriptionChanged {
            card,
            actor,
            old,
            new,
        } => {
            let handles: Vec<String> = added_mentions(old, new).into_iter().collect();
            let mentioned = identity::resolve_handles(conn, &handles).await?;
            mention_notifications(&mentioned, actor, card, MentionSource::Description)
        }
        BoardEvent::CardAssigneesChanged {
            card,
            actor,
            old,
            new,
        } => assignment_notifications(&added_assignees(old, new), actor, card),
        BoardEvent::MemberAdded {
            board_id,
            board_title,
            actor,
            user_id,
            role,
        } => vec![NewNotification {
            user_id: *user_id,
            kind: NotificationKind::MemberAdded,
            message: format!(
                "{} added you to board \"{}\" as {}",
                actor.username, board_title, role
            ),
            board_id: Some(*board_id),
            card_id: None,
        }],
    };
    Ok(planned)
}

/// Plans and writes notifications for every event. Returns how many were written.
pub async fn handle_all(conn: &mut PgConnection, events: &[BoardEvent]) -> BoardResult<usize> {
    let mut written = 0;
    for event in events {
        let planned = plan(conn, event).await?;
        for notification in &planned {
            insert(conn, notification).await?;
        }
        written += planned.len();
    }
    Ok(written)
}

async fn insert(conn: &mut PgConnection, notification: &NewNotification) -> BoardResult<()> {
    sqlx::query(
        "INSERT INTO notifications (user_id, kind, message, board_id, card_id)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(notification.user_id)
    .bind(notification.kind)
    .bind(&notification.message)
    .bind(notification.board_id)
    .bind(notification.card_id)
    .execute(&mut *conn)
    .await?;
    log::debug!(
        "notified user {} ({:?})",
        notification.user_id,
        notification.kind
    );
    Ok(())
}
