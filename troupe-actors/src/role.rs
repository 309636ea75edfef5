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

use crate::message::Payload;

/// Per-actor state slot. Starts empty; only the handler currently running on
/// behalf of the owning actor may read or replace it.
pub type UserState = Option<Box<dyn Any + Send>>;

/// A message handler. Receives the actor's state slot and the message
/// payload. Handlers may call [`crate::send_message`], [`crate::spawn`] and
/// [`crate::actor_id_self`].
pub type Handler = Box<dyn Fn(&mut UserState, Payload) + Send + Sync>;

/// The behavior of an actor: an indexed table of message handlers.
///
/// Handler 0 doubles as the HELLO handler. Roles are immutable and shared by
/// reference; spawning many actors from one `Arc<Role>` is the intended use.
pub struct Role {
    handlers: Vec<Handler>,
}

impl Role {
    pub fn new(handlers: Vec<Handler>) -> Role {
        Role { handlers }
    }

    /// Number of user-defined handlers. User tags are valid in
    /// `[0, nprompts)`.
    pub fn nprompts(&self) -> usize {
        self.handlers.len()
    }

    pub(crate) fn handler(&self, index: usize) -> Option<&Handler> {
        self.handlers.get(index)
    }
}

impl fmt::Debug for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Role")
            .field("nprompts", &self.nprompts())
            .finish()
    }
}
