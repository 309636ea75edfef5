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

//! Interrupt-driven shutdown against an actor that would otherwise run
//! forever.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use troupe_actors::{
    actor_id_self, send_message, ActorSystem, Handler, Message, Payload, Role, RuntimeConfig,
    SendError, UserState,
};
use troupe_common::setup_logging_for_tests;

const TICK: u32 = 1;

/// An actor that keeps itself alive with delayed self-sends.
fn ticking_role(ticks: Arc<AtomicUsize>) -> Arc<Role> {
    let hello: Handler = Box::new(|_state: &mut UserState, _payload: Payload| {
        send_message(actor_id_self(), Message::user_empty(TICK)).unwrap();
    });
    let tick: Handler = Box::new(move |_state: &mut UserState, _payload: Payload| {
        ticks.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(10));
        // Shutdown may have started while we slept; the failed send is the
        // expected way out of the loop.
        let _ = send_message(actor_id_self(), Message::user_empty(TICK));
    });
    Arc::new(Role::new(vec![hello, tick]))
}

#[test]
fn test_programmatic_interrupt_stops_idle_loop() {
    setup_logging_for_tests();
    let ticks = Arc::new(AtomicUsize::new(0));
    let config = RuntimeConfig {
        pool_size: 2,
        mailbox_capacity: 16,
        catch_interrupt: false,
    };
    let (system, root) =
        ActorSystem::create_with_config(ticking_role(Arc::clone(&ticks)), config).unwrap();
    std::thread::sleep(Duration::from_millis(50));
    let before_join = Instant::now();
    system.interrupt();
    system.join(root);
    assert!(
        before_join.elapsed() < Duration::from_secs(5),
        "join did not return in bounded time"
    );
    // The loop made progress before the interrupt, then everything fails.
    assert!(ticks.load(Ordering::SeqCst) > 0);
    assert_eq!(
        system.send_message(root, Message::user_empty(TICK)),
        Err(SendError::DeadOrShutdown(root))
    );
    let after_shutdown = ticks.load(Ordering::SeqCst);
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(ticks.load(Ordering::SeqCst), after_shutdown);
}

#[test]
fn test_sigint_triggers_orderly_shutdown() {
    setup_logging_for_tests();
    let ticks = Arc::new(AtomicUsize::new(0));
    let config = RuntimeConfig {
        pool_size: 2,
        mailbox_capacity: 16,
        catch_interrupt: true,
    };
    let (system, root) =
        ActorSystem::create_with_config(ticking_role(Arc::clone(&ticks)), config).unwrap();
    std::thread::sleep(Duration::from_millis(50));
    signal_hook::low_level::raise(signal_hook::consts::SIGINT).unwrap();
    system.join(root);
    assert!(ticks.load(Ordering::SeqCst) > 0);
    assert_eq!(
        system.send_message(root, Message::user_empty(TICK)),
        Err(SendError::DeadOrShutdown(root))
    );
}
