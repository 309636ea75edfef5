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

use std::io;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::{debug, error, warn};

use crate::actor::ActorRecord;
use crate::context::HandlerScope;
use crate::message::{Message, Payload};
use crate::scheduler::Scheduler;

pub(crate) fn spawn_workers(scheduler: &Arc<Scheduler>) -> io::Result<Vec<JoinHandle<()>>> {
    let pool_size = scheduler.config().pool_size;
    let mut handles = Vec::with_capacity(pool_size);
    for worker in 0..pool_size {
        let spawn_result = std::thread::Builder::new()
            .name(format!("troupe-worker-{worker}"))
            .spawn({
                let scheduler = Arc::clone(scheduler);
                move || worker_loop(scheduler, worker)
            });
        match spawn_result {
            Ok(handle) => handles.push(handle),
            Err(error) => {
                scheduler.abort_startup();
                return Err(error);
            }
        }
    }
    Ok(handles)
}

fn worker_loop(scheduler: Arc<Scheduler>, worker: usize) {
    scheduler.wait_for_start();
    debug!(worker, "worker-start");
    loop {
        {
            let mut ready = scheduler.ready_lock().lock();
            while ready.is_empty()
                && !scheduler.shutdown_switch().is_engaged()
                && scheduler.alive_count() > 0
            {
                scheduler.ready_cond.wait(&mut ready);
            }
            if scheduler.shutdown_switch().is_engaged() {
                break;
            }
            // Messages queued behind a GODIE still get dispatched: the
            // all-dead exit only fires once the ready queue has drained.
            if ready.is_empty() && scheduler.alive_count() == 0 {
                drop(ready);
                debug!(worker, "all-actors-dead");
                scheduler.raise_interrupt();
                // One final round: the supervisor's shutdown broadcast is
                // what wakes us, unless it already happened.
                let mut ready = scheduler.ready_lock().lock();
                if !scheduler.shutdown_switch().is_engaged() {
                    scheduler.ready_cond.wait(&mut ready);
                }
                break;
            }
        }
        let Some((record, message)) = scheduler.pop_ready() else {
            // Another worker drained the queue between our wakeup and the
            // pop. Go back to waiting.
            continue;
        };
        dispatch(&scheduler, &record, message);
        scheduler.reschedule_after_processing(&record);
    }
    debug!(worker, "worker-exit");
    scheduler.note_worker_finished();
}

fn dispatch(scheduler: &Arc<Scheduler>, record: &Arc<ActorRecord>, message: Message) {
    let _scope = HandlerScope::enter(Arc::clone(scheduler), record.id());
    match message {
        Message::GoDie => scheduler.kill_actor(record),
        Message::Spawn(role) => scheduler.spawn_actor(record.id(), role),
        Message::Hello(spawner) => {
            invoke_handler(scheduler, record, 0, Some(Box::new(spawner)));
        }
        Message::User(tag, payload) => {
            invoke_handler(scheduler, record, tag as usize, payload);
        }
    }
}

fn invoke_handler(
    scheduler: &Scheduler,
    record: &ActorRecord,
    index: usize,
    payload: Payload,
) {
    let Some(handler) = record.role().handler(index) else {
        warn!(
            actor_id = record.id(),
            index,
            nprompts = record.role().nprompts(),
            "unknown-message-type"
        );
        return;
    };
    let mut state = record.user_state().lock();
    let outcome = catch_unwind(AssertUnwindSafe(|| handler(&mut state, payload)));
    if outcome.is_err() {
        // The panic payload was already printed by the default hook. The
        // actor is beyond recovery; terminate it and keep the pool alive.
        error!(actor_id = record.id(), index, "handler-panicked");
        scheduler.kill_actor(record);
    }
}
