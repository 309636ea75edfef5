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

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::actor::ActorRecord;
use crate::role::Role;
use crate::ActorId;

/// Append-only table of every actor ever spawned, indexed by id.
///
/// Records are kept until the system is destroyed; death only flips the
/// record's flag. The allocated count is published separately so existence
/// checks do not take the table lock.
pub(crate) struct ActorRegistry {
    actors: Mutex<Vec<Arc<ActorRecord>>>,
    count: AtomicUsize,
}

impl ActorRegistry {
    pub(crate) fn new() -> ActorRegistry {
        ActorRegistry {
            actors: Mutex::new(Vec::new()),
            count: AtomicUsize::new(0),
        }
    }

    /// Allocates the next id and appends a fresh record under the table
    /// lock.
    pub(crate) fn register(&self, role: Arc<Role>, mailbox_capacity: usize) -> Arc<ActorRecord> {
        let mut actors = self.actors.lock();
        let id = actors.len();
        let record = Arc::new(ActorRecord::new(id, role, mailbox_capacity));
        actors.push(Arc::clone(&record));
        self.count.store(actors.len(), Ordering::SeqCst);
        record
    }

    pub(crate) fn get(&self, id: ActorId) -> Option<Arc<ActorRecord>> {
        self.actors.lock().get(id).cloned()
    }

    /// Number of ids allocated so far. Lock-free; an id is valid iff it is
    /// below this count.
    pub(crate) fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}
