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

use parking_lot::Mutex;

use crate::message::Message;

/// Bounded FIFO of undelivered messages, one per actor.
///
/// `push` fails instead of blocking when the buffer is full; `pop` never
/// blocks because the ready-queue protocol only schedules actors whose
/// mailbox is non-empty.
pub(crate) struct Mailbox {
    ring: Mutex<Ring>,
}

struct Ring {
    slots: Vec<Option<Message>>,
    start: usize,
    len: usize,
}

impl Mailbox {
    pub(crate) fn new(capacity: usize) -> Mailbox {
        assert!(capacity > 0, "mailbox capacity must be positive");
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Mailbox {
            ring: Mutex::new(Ring {
                slots,
                start: 0,
                len: 0,
            }),
        }
    }

    /// Returns false iff the mailbox is full.
    pub(crate) fn push(&self, message: Message) -> bool {
        let mut ring = self.ring.lock();
        if ring.len == ring.slots.len() {
            return false;
        }
        let slot = (ring.start + ring.len) % ring.slots.len();
        ring.slots[slot] = Some(message);
        ring.len += 1;
        true
    }

    pub(crate) fn pop(&self) -> Option<Message> {
        let mut ring = self.ring.lock();
        if ring.len == 0 {
            return None;
        }
        let start = ring.start;
        let message = ring.slots[start].take();
        ring.start = (start + 1) % ring.slots.len();
        ring.len -= 1;
        message
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.ring.lock().len == 0
    }
}
