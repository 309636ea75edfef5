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

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::role::Role;
use crate::ActorId;

/// Opaque payload of a user message. Ownership moves into the receiving
/// handler.
pub type Payload = Option<Box<dyn Any + Send>>;

/// A message delivered to an actor's mailbox.
///
/// The three built-in kinds are consumed by the runtime itself or dispatched
/// specially; `User` messages are dispatched to the handler the tag indexes.
pub enum Message {
    /// Birth notification, delivered automatically as the first message of
    /// every actor. Dispatched to handler 0 with the spawner's id boxed as
    /// payload.
    Hello(ActorId),
    /// Asks the runtime to create a new actor with the given role. The new
    /// actor receives a [`Message::Hello`] carrying the requester's id.
    Spawn(Arc<Role>),
    /// Marks the receiving actor dead. Messages already queued behind it are
    /// still dispatched; later sends fail.
    GoDie,
    /// Application message, dispatched to `role.handlers[tag]`.
    User(u32, Payload),
}

impl Message {
    /// Shorthand for a user message carrying a boxed `value`.
    pub fn user<T: Any + Send>(tag: u32, value: T) -> Message {
        Message::User(tag, Some(Box::new(value)))
    }

    /// Shorthand for a payload-less user message.
    pub fn user_empty(tag: u32) -> Message {
        Message::User(tag, None)
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Hello(spawner) => f.debug_tuple("Hello").field(spawner).finish(),
            Message::Spawn(role) => f.debug_tuple("Spawn").field(role).finish(),
            Message::GoDie => f.write_str("GoDie"),
            Message::User(tag, payload) => f
                .debug_struct("User")
                .field("tag", tag)
                .field("has_payload", &payload.is_some())
                .finish(),
        }
    }
}
