//! The board core: access policy, membership ledger, aggregate store operations and
//! the mention/assignment notifier.
//!
//! Operations take a `&mut PgConnection` so the caller decides the transaction
//! boundary. Every mutating operation is meant to run inside one transaction that is
//! closed with [`events::commit`], which feeds the emitted [`events::BoardEvent`]s to
//! the notifier before committing.

pub mod attachments;
pub mod boards;
pub mod cards;
pub mod checklists;
pub mod comments;
pub mod error;
pub mod events;
pub mod guard;
pub mod identity;
pub mod labels;
pub mod lists;
pub mod membership;
pub mod notifications;
pub mod notifier;

pub use error::{BoardError, BoardResult};
pub use events::{BoardEvent, Outcome};
