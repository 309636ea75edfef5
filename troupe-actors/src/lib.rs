// Copyright (C) 2024 Troupe, Inc.
//
// Troupe is offered under the AGPL v3.0 and as commercial software.
// For commercial licensing, contact us at hello@troupe.dev.
//
// AGPL:
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.

#![deny(clippy::disallowed_methods)]

//! troupe-actors is a small actor runtime backed by a fixed pool of OS
//! threads.
//!
//! It solves the following problem:
//! - run many actors on a handful of worker threads, one message at a time
//!   per actor
//! - keep senders non-blocking: a send against a full mailbox fails instead
//!   of parking the caller
//! - shut the whole system down cooperatively, either when every actor has
//!   died or when an interrupt arrives
//!
//! Each actor owns a bounded mailbox and a [`Role`], an indexed table of
//! message handlers. Actors with pending messages queue up in a global ready
//! queue drained by the workers; a supervisor thread sequences startup and
//! shutdown. See [`ActorSystem`] for the entry point, and
//! [`send_message`], [`spawn`] and [`actor_id_self`] for the API available
//! inside handlers.

mod actor;
mod config;
mod context;
mod mailbox;
mod message;
mod ready_queue;
mod registry;
mod role;
pub(crate) mod scheduler;
mod signal;
mod supervisor;
mod system;
mod worker;

use thiserror::Error;

pub use self::config::RuntimeConfig;
pub use self::context::{actor_id_self, send_message, spawn};
pub use self::message::{Message, Payload};
pub use self::role::{Handler, Role, UserState};
pub use self::system::ActorSystem;

/// Identifier of an actor. Ids are dense and allocated sequentially from 0;
/// actor 0 is the one passed to [`ActorSystem::create`].
pub type ActorId = usize;

/// Default number of worker threads.
pub const POOL_SIZE: usize = 4;

/// Default mailbox capacity. A send against an actor holding this many
/// undelivered messages fails with [`SendError::MailboxFull`].
pub const ACTOR_QUEUE_LIMIT: usize = 1024;

/// Error returned by a failed send.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
pub enum SendError {
    /// The target id was never allocated.
    #[error("actor {0} does not exist")]
    NotFound(ActorId),
    /// The target processed a GODIE, or the system has begun shutting down.
    #[error("actor {0} is dead or the system is shutting down")]
    DeadOrShutdown(ActorId),
    /// The target's mailbox is at capacity. The runtime never retries;
    /// the sender decides.
    #[error("mailbox of actor {0} is full")]
    MailboxFull(ActorId),
}
