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

//! The shared core of one actor system: actor table, ready queue, counters
//! and the condition variables tying workers and supervisor together.
//!
//! Lock order, outermost first: ready-queue lock, actor-record lock, control
//! lock. The actor-table lock, mailbox locks and user-state locks are
//! leaves; a mailbox lock is additionally taken for the emptiness check
//! while the first two are held during a ready-queue join.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, warn};
use troupe_common::ShutdownSwitch;

use crate::actor::ActorRecord;
use crate::config::RuntimeConfig;
use crate::message::Message;
use crate::ready_queue::ReadyRing;
use crate::registry::ActorRegistry;
use crate::role::Role;
use crate::{ActorId, SendError};

/// Startup/shutdown bookkeeping, guarded by the control lock.
struct Control {
    started: bool,
    interrupted: bool,
    finished_workers: usize,
}

pub(crate) struct Scheduler {
    config: RuntimeConfig,
    registry: ActorRegistry,
    ready: Mutex<ReadyRing>,
    /// Signaled on every ready-queue push and broadcast at shutdown.
    pub(crate) ready_cond: Condvar,
    /// The `finished` flag: no dispatch begins once engaged.
    shutdown: ShutdownSwitch,
    alive: AtomicUsize,
    control: Mutex<Control>,
    start_cond: Condvar,
    interrupt_cond: Condvar,
    workers_done_cond: Condvar,
}

impl Scheduler {
    /// Builds the core with the first actor already registered and counted
    /// as alive. No threads are started here.
    pub(crate) fn new(config: RuntimeConfig, first_role: Arc<Role>) -> (Arc<Scheduler>, ActorId) {
        let scheduler = Scheduler {
            registry: ActorRegistry::new(),
            ready: Mutex::new(ReadyRing::new()),
            ready_cond: Condvar::new(),
            shutdown: ShutdownSwitch::default(),
            alive: AtomicUsize::new(0),
            control: Mutex::new(Control {
                started: false,
                interrupted: false,
                finished_workers: 0,
            }),
            start_cond: Condvar::new(),
            interrupt_cond: Condvar::new(),
            workers_done_cond: Condvar::new(),
            config,
        };
        let record = scheduler
            .registry
            .register(first_role, scheduler.config.mailbox_capacity);
        scheduler.alive.store(1, Ordering::SeqCst);
        (Arc::new(scheduler), record.id())
    }

    pub(crate) fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub(crate) fn registry(&self) -> &ActorRegistry {
        &self.registry
    }

    pub(crate) fn shutdown_switch(&self) -> &ShutdownSwitch {
        &self.shutdown
    }

    pub(crate) fn alive_count(&self) -> usize {
        self.alive.load(Ordering::SeqCst)
    }

    /// The send protocol. Callable from handlers, the creating thread, or
    /// any other thread holding the system handle.
    pub(crate) fn send(&self, target: ActorId, message: Message) -> Result<(), SendError> {
        if target >= self.registry.count() {
            return Err(SendError::NotFound(target));
        }
        let record = self
            .registry
            .get(target)
            .expect("an id below the published count is always registered");
        if self.shutdown.is_engaged() || record.is_dead() {
            return Err(SendError::DeadOrShutdown(target));
        }
        if !record.mailbox().push(message) {
            return Err(SendError::MailboxFull(target));
        }
        self.schedule(&record);
        Ok(())
    }

    /// Sender-side ready-queue join: enqueue the actor unless it is already
    /// scheduled (queued or being drained by a worker).
    fn schedule(&self, record: &Arc<ActorRecord>) {
        let mut ready = self.ready.lock();
        if record.try_schedule() {
            ready.push(record.id());
            self.ready_cond.notify_one();
        }
    }

    /// Completion-side ready-queue join, run by the worker after every
    /// dispatched message regardless of its kind. Requeues the actor while
    /// its mailbox is non-empty; otherwise the actor leaves the scheduled
    /// state and a later send may enqueue it again.
    pub(crate) fn reschedule_after_processing(&self, record: &Arc<ActorRecord>) {
        let mut ready = self.ready.lock();
        if record.finish_processing() {
            ready.push(record.id());
            self.ready_cond.notify_one();
        }
    }

    /// Pops the next ready actor together with one message from its
    /// mailbox. Returns `None` when the queue is empty.
    pub(crate) fn pop_ready(&self) -> Option<(Arc<ActorRecord>, Message)> {
        let mut ready = self.ready.lock();
        let id = ready.pop()?;
        let record = self
            .registry
            .get(id)
            .expect("a queued id is always registered");
        let message = record
            .mailbox()
            .pop()
            .expect("a scheduled actor has a non-empty mailbox");
        Some((record, message))
    }

    pub(crate) fn ready_lock(&self) -> &Mutex<ReadyRing> {
        &self.ready
    }

    /// Handles a SPAWN message: registers a sibling for `role` and delivers
    /// its birth notification. Ignored once shutdown has begun.
    pub(crate) fn spawn_actor(&self, spawner: ActorId, role: Arc<Role>) {
        if self.shutdown.is_engaged() {
            return;
        }
        let record = self.registry.register(role, self.config.mailbox_capacity);
        self.alive.fetch_add(1, Ordering::SeqCst);
        debug!(actor_id = record.id(), spawner, "spawn-actor");
        if let Err(error) = self.send(record.id(), Message::Hello(spawner)) {
            // Only possible if shutdown raced the registration.
            debug!(actor_id = record.id(), %error, "hello-dropped");
        }
    }

    /// Handles a GODIE message.
    pub(crate) fn kill_actor(&self, record: &ActorRecord) {
        if record.kill() {
            let remaining = self.alive.fetch_sub(1, Ordering::SeqCst) - 1;
            debug!(actor_id = record.id(), alive = remaining, "actor-death");
        } else {
            warn!(actor_id = record.id(), "godie-for-dead-actor");
        }
    }

    // Start gate: workers block here until the supervisor opens it.

    pub(crate) fn wait_for_start(&self) {
        let mut control = self.control.lock();
        while !control.started {
            self.start_cond.wait(&mut control);
        }
    }

    pub(crate) fn release_start_gate(&self) {
        let mut control = self.control.lock();
        control.started = true;
        self.start_cond.notify_all();
    }

    // Interrupt plumbing: raised by a worker observing all actors dead, by
    // the SIGINT listener, or programmatically; consumed by the supervisor.

    pub(crate) fn raise_interrupt(&self) {
        let mut control = self.control.lock();
        if !control.interrupted {
            control.interrupted = true;
            self.interrupt_cond.notify_one();
        }
    }

    pub(crate) fn await_interrupt(&self) {
        let mut control = self.control.lock();
        while !control.interrupted {
            self.interrupt_cond.wait(&mut control);
        }
    }

    /// Engages the terminal flag and wakes every worker. The flag is set
    /// under the ready-queue lock so a worker checking its wait predicate
    /// cannot miss the broadcast.
    pub(crate) fn begin_shutdown(&self) {
        let _ready = self.ready.lock();
        self.shutdown.engage();
        self.ready_cond.notify_all();
    }

    /// Used when system creation fails halfway: lets any already-running
    /// workers exit through their normal path.
    pub(crate) fn abort_startup(&self) {
        self.begin_shutdown();
        self.release_start_gate();
        self.raise_interrupt();
    }

    pub(crate) fn note_worker_finished(&self) {
        let mut control = self.control.lock();
        control.finished_workers += 1;
        if control.finished_workers == self.config.pool_size {
            self.workers_done_cond.notify_one();
        }
    }

    pub(crate) fn await_workers_done(&self) {
        let mut control = self.control.lock();
        while control.finished_workers < self.config.pool_size {
            self.workers_done_cond.wait(&mut control);
        }
    }
}
