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

//! The API visible from inside a message handler.
//!
//! While a worker invokes a handler it publishes the executing actor in a
//! thread-local slot; the free functions below resolve it. Outside a
//! handler they are usage errors, except for sends, which remain available
//! through the [`crate::ActorSystem`] handle.

use std::cell::RefCell;
use std::sync::Arc;

use crate::message::Message;
use crate::role::Role;
use crate::scheduler::Scheduler;
use crate::{ActorId, SendError};

thread_local! {
    static ACTIVE: RefCell<Option<ActiveActor>> = const { RefCell::new(None) };
}

struct ActiveActor {
    scheduler: Arc<Scheduler>,
    actor_id: ActorId,
}

/// Clears the thread-local slot when the dispatch ends, panics included.
pub(crate) struct HandlerScope;

impl HandlerScope {
    pub(crate) fn enter(scheduler: Arc<Scheduler>, actor_id: ActorId) -> HandlerScope {
        ACTIVE.with(|slot| {
            *slot.borrow_mut() = Some(ActiveActor {
                scheduler,
                actor_id,
            });
        });
        HandlerScope
    }
}

impl Drop for HandlerScope {
    fn drop(&mut self) {
        ACTIVE.with(|slot| slot.borrow_mut().take());
    }
}

fn with_active<T>(operation: &str, f: impl FnOnce(&ActiveActor) -> T) -> T {
    ACTIVE.with(|slot| {
        let active = slot.borrow();
        let active = active
            .as_ref()
            .unwrap_or_else(|| panic!("`{operation}` called outside of a message handler"));
        f(active)
    })
}

/// Id of the actor whose handler is executing on the calling thread.
///
/// # Panics
///
/// Panics when called from a thread that is not currently running a
/// handler; there is no executing actor to name there.
pub fn actor_id_self() -> ActorId {
    with_active("actor_id_self", |active| active.actor_id)
}

/// Sends `message` to `target` on behalf of the executing actor.
///
/// # Panics
///
/// Panics outside of a handler. Use
/// [`ActorSystem::send_message`](crate::ActorSystem::send_message) from
/// ordinary threads.
pub fn send_message(target: ActorId, message: Message) -> Result<(), SendError> {
    with_active("send_message", |active| {
        active.scheduler.send(target, message)
    })
}

/// Asks the runtime to create a new actor with `role` by sending a SPAWN
/// message to the executing actor. The child's first message is a HELLO
/// carrying this actor's id.
///
/// # Panics
///
/// Panics outside of a handler.
pub fn spawn(role: Arc<Role>) -> Result<(), SendError> {
    with_active("spawn", |active| {
        active
            .scheduler
            .send(active.actor_id, Message::Spawn(role))
    })
}
