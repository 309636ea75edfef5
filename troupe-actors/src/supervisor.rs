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
use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::{debug, info};

use crate::scheduler::Scheduler;
use crate::signal::SignalListener;

/// Starts the supervisor thread. It opens the start gate, parks until the
/// interrupt is raised, then drives the shutdown sequence and reclaims
/// every runtime thread.
pub(crate) fn spawn_supervisor(
    scheduler: Arc<Scheduler>,
    workers: Vec<JoinHandle<()>>,
    signal_listener: Option<SignalListener>,
) -> io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("troupe-supervisor".to_string())
        .spawn(move || supervise(scheduler, workers, signal_listener))
}

fn supervise(
    scheduler: Arc<Scheduler>,
    workers: Vec<JoinHandle<()>>,
    signal_listener: Option<SignalListener>,
) {
    scheduler.release_start_gate();
    debug!("supervisor-start");

    // Raised by a worker that found every actor dead, by the SIGINT
    // listener, or through `ActorSystem::interrupt`.
    scheduler.await_interrupt();

    scheduler.begin_shutdown();
    scheduler.await_workers_done();
    for worker in workers {
        // A worker can only have died from a bug in the runtime itself;
        // handler panics are contained before they unwind this far.
        if worker.join().is_err() {
            debug!("worker-thread-poisoned");
        }
    }
    if let Some(listener) = signal_listener {
        listener.stop();
    }
    info!("runtime-stopped");
}
