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

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::config::RuntimeConfig;
use crate::message::Message;
use crate::role::Role;
use crate::scheduler::Scheduler;
use crate::signal::SignalListener;
use crate::supervisor::spawn_supervisor;
use crate::worker::spawn_workers;
use crate::{ActorId, SendError};

/// Handle to one running actor system.
///
/// Creating a system allocates actor 0 with the supplied role, starts the
/// worker pool and the supervisor, and delivers actor 0's HELLO. Several
/// systems can coexist in one process; each owns its threads and actors.
///
/// The system shuts down when every actor has died, when [`interrupt`] is
/// called, or when a SIGINT arrives while `catch_interrupt` is configured.
/// [`join`] blocks until the shutdown sequence has completed.
///
/// [`interrupt`]: ActorSystem::interrupt
/// [`join`]: ActorSystem::join
pub struct ActorSystem {
    scheduler: Arc<Scheduler>,
    supervisor: Mutex<Option<JoinHandle<()>>>,
}

impl ActorSystem {
    /// Starts a system with the default [`RuntimeConfig`] and returns the
    /// handle together with the id of actor 0.
    pub fn create(role: Arc<Role>) -> io::Result<(ActorSystem, ActorId)> {
        Self::create_with_config(role, RuntimeConfig::default())
    }

    pub fn create_with_config(
        role: Arc<Role>,
        config: RuntimeConfig,
    ) -> io::Result<(ActorSystem, ActorId)> {
        if config.pool_size == 0 || config.mailbox_capacity == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "pool_size and mailbox_capacity must be positive",
            ));
        }
        info!(
            pool_size = config.pool_size,
            mailbox_capacity = config.mailbox_capacity,
            "runtime-start"
        );
        let (scheduler, root_id) = Scheduler::new(config, role);
        let signal_listener = if scheduler.config().catch_interrupt {
            match SignalListener::spawn(Arc::clone(&scheduler)) {
                Ok(listener) => Some(listener),
                Err(error) => {
                    scheduler.abort_startup();
                    return Err(error);
                }
            }
        } else {
            None
        };
        let workers = match spawn_workers(&scheduler) {
            Ok(workers) => workers,
            Err(error) => {
                if let Some(listener) = signal_listener {
                    listener.stop();
                }
                return Err(error);
            }
        };
        let supervisor = match spawn_supervisor(Arc::clone(&scheduler), workers, signal_listener) {
            Ok(handle) => handle,
            Err(error) => {
                scheduler.abort_startup();
                return Err(error);
            }
        };
        let system = ActorSystem {
            scheduler,
            supervisor: Mutex::new(Some(supervisor)),
        };
        // Birth notification of the root actor; its spawner is itself.
        if let Err(error) = system.scheduler.send(root_id, Message::Hello(root_id)) {
            warn!(%error, "root-hello-undeliverable");
        }
        Ok((system, root_id))
    }

    /// Sends a message from outside any handler. Inside handlers, the free
    /// [`crate::send_message`] resolves the sender automatically.
    pub fn send_message(&self, target: ActorId, message: Message) -> Result<(), SendError> {
        self.scheduler.send(target, message)
    }

    /// Triggers orderly shutdown, exactly as an external SIGINT would:
    /// in-flight handlers finish, no further dispatch happens, and every
    /// later send fails with [`SendError::DeadOrShutdown`].
    pub fn interrupt(&self) {
        self.scheduler.raise_interrupt();
    }

    /// Blocks until the whole system has shut down, whichever actor is
    /// named. An id that was never allocated is rejected with a warning and
    /// no join happens. Once the system has been joined, further calls
    /// return immediately.
    pub fn join(&self, actor: ActorId) {
        if actor >= self.scheduler.registry().count() {
            warn!(actor_id = actor, "join-unknown-actor");
            return;
        }
        let supervisor = self.supervisor.lock().take();
        if let Some(handle) = supervisor {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use troupe_common::setup_logging_for_tests;

    use super::ActorSystem;
    use crate::message::Message;
    use crate::role::{Role, UserState};
    use crate::{send_message, Payload, SendError};

    fn small_config() -> crate::RuntimeConfig {
        crate::RuntimeConfig {
            pool_size: 2,
            mailbox_capacity: 16,
            catch_interrupt: false,
        }
    }

    #[test]
    fn test_create_join_lifecycle() {
        setup_logging_for_tests();
        // Actor 0 dies on its own HELLO; all-dead shutdown follows.
        let role = Role::new(vec![Box::new(
            |_state: &mut UserState, _payload: Payload| {
                send_message(crate::actor_id_self(), Message::GoDie).unwrap();
            },
        )]);
        let (system, root) = ActorSystem::create_with_config(Arc::new(role), small_config())
            .expect("system must start");
        assert_eq!(root, 0);
        system.join(root);
        assert_eq!(
            system.send_message(root, Message::user_empty(0)),
            Err(SendError::DeadOrShutdown(0))
        );
    }

    #[test]
    fn test_join_rejects_unknown_actor() {
        setup_logging_for_tests();
        let hellos = Arc::new(AtomicUsize::new(0));
        let role = {
            let hellos = Arc::clone(&hellos);
            Role::new(vec![Box::new(move |_state: &mut UserState, _p: Payload| {
                hellos.fetch_add(1, Ordering::SeqCst);
                send_message(crate::actor_id_self(), Message::GoDie).unwrap();
            })])
        };
        let (system, root) = ActorSystem::create_with_config(Arc::new(role), small_config())
            .expect("system must start");
        // Never allocated: returns without blocking on the supervisor.
        system.join(4096);
        system.join(root);
        system.join(root);
        assert_eq!(hellos.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_zero_pool_size_is_rejected() {
        let role = Arc::new(Role::new(Vec::new()));
        let config = crate::RuntimeConfig {
            pool_size: 0,
            ..small_config()
        };
        assert!(ActorSystem::create_with_config(role, config).is_err());
    }
}
