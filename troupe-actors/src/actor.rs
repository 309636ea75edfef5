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

use std::sync::Arc;

use parking_lot::Mutex;

use crate::mailbox::Mailbox;
use crate::role::{Role, UserState};
use crate::ActorId;

/// One live actor: its identity, behavior, mailbox and scheduling state.
pub(crate) struct ActorRecord {
    id: ActorId,
    role: Arc<Role>,
    mailbox: Mailbox,
    cell: Mutex<ActorCell>,
    user_state: Mutex<UserState>,
}

/// Scheduling state, guarded by the actor-record lock.
///
/// `scheduled` is true iff the actor's id sits in the ready queue or a
/// worker is currently draining it. It stays set from enqueue until the
/// worker that processed a message observes the mailbox empty, so an actor
/// is never queued twice and never runs on two workers at once.
struct ActorCell {
    dead: bool,
    scheduled: bool,
}

impl ActorRecord {
    pub(crate) fn new(id: ActorId, role: Arc<Role>, mailbox_capacity: usize) -> ActorRecord {
        ActorRecord {
            id,
            role,
            mailbox: Mailbox::new(mailbox_capacity),
            cell: Mutex::new(ActorCell {
                dead: false,
                scheduled: false,
            }),
            user_state: Mutex::new(None),
        }
    }

    pub(crate) fn id(&self) -> ActorId {
        self.id
    }

    pub(crate) fn role(&self) -> &Arc<Role> {
        &self.role
    }

    pub(crate) fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }

    pub(crate) fn is_dead(&self) -> bool {
        self.cell.lock().dead
    }

    /// Marks the actor dead. Returns true only on the false→true
    /// transition, so callers decrement the alive counter exactly once per
    /// actor no matter how many GODIEs were queued.
    pub(crate) fn kill(&self) -> bool {
        let mut cell = self.cell.lock();
        if cell.dead {
            return false;
        }
        cell.dead = true;
        true
    }

    /// Marks the actor as queued if it is not already scheduled and has
    /// pending messages. Caller must hold the ready-queue lock.
    pub(crate) fn try_schedule(&self) -> bool {
        let mut cell = self.cell.lock();
        if cell.scheduled || self.mailbox.is_empty() {
            return false;
        }
        cell.scheduled = true;
        true
    }

    /// Called by the worker that just processed one message. Keeps the actor
    /// scheduled (returns true, meaning "requeue me") while the mailbox is
    /// non-empty; otherwise clears the flag. Caller must hold the
    /// ready-queue lock.
    pub(crate) fn finish_processing(&self) -> bool {
        let mut cell = self.cell.lock();
        if self.mailbox.is_empty() {
            cell.scheduled = false;
            false
        } else {
            true
        }
    }

    pub(crate) fn user_state(&self) -> &Mutex<UserState> {
        &self.user_state
    }
}
