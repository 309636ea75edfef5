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

//! A chain of actors computing a factorial.
//!
//! Actor 0 receives the running state, spawns a child, waits for the
//! child's introduction, multiplies the accumulator and hands the state
//! down the chain. The last link publishes the result and every actor takes
//! its own life once its part is done.

use std::sync::{Arc, Mutex, OnceLock};

use troupe_actors::{
    actor_id_self, send_message, spawn, ActorId, ActorSystem, Handler, Message, Payload, Role,
    RuntimeConfig, UserState,
};
use troupe_common::setup_logging_for_tests;

struct Running {
    n: u64,
    k: u64,
    acc: u64,
}

const FORWARD: u32 = 1;
const INTRODUCE: u32 = 2;

fn suicide() {
    send_message(actor_id_self(), Message::GoDie).unwrap();
}

fn factorial_role(result: Arc<Mutex<Option<u64>>>) -> Arc<Role> {
    let shared_role: Arc<OnceLock<Arc<Role>>> = Arc::new(OnceLock::new());

    let hello: Handler = Box::new(|_state: &mut UserState, payload: Payload| {
        let spawner = *payload
            .expect("hello carries the spawner id")
            .downcast::<ActorId>()
            .unwrap();
        if spawner == actor_id_self() {
            // Root birth notification; the chain starts with FORWARD.
            return;
        }
        send_message(spawner, Message::user(INTRODUCE, actor_id_self())).unwrap();
    });

    let forward: Handler = {
        let shared_role = Arc::clone(&shared_role);
        let result = Arc::clone(&result);
        Box::new(move |state: &mut UserState, payload: Payload| {
            let running = payload
                .expect("forward carries the running state")
                .downcast::<Running>()
                .unwrap();
            if running.k == running.n {
                *result.lock().unwrap() = Some(running.acc);
                suicide();
                return;
            }
            *state = Some(running);
            spawn(Arc::clone(shared_role.get().unwrap())).unwrap();
        })
    };

    let introduce: Handler = Box::new(|state: &mut UserState, payload: Payload| {
        let child = *payload
            .expect("introduce carries the child id")
            .downcast::<ActorId>()
            .unwrap();
        let mut running = state
            .take()
            .expect("running state was stored by forward")
            .downcast::<Running>()
            .unwrap();
        running.k += 1;
        running.acc *= running.k;
        send_message(child, Message::User(FORWARD, Some(running))).unwrap();
        suicide();
    });

    let role = Arc::new(Role::new(vec![hello, forward, introduce]));
    shared_role.set(Arc::clone(&role)).unwrap();
    role
}

#[test]
fn test_factorial_of_ten() {
    setup_logging_for_tests();
    let result = Arc::new(Mutex::new(None));
    let role = factorial_role(Arc::clone(&result));
    let config = RuntimeConfig {
        pool_size: 3,
        mailbox_capacity: 64,
        catch_interrupt: false,
    };
    let (system, root) = ActorSystem::create_with_config(role, config).unwrap();
    system
        .send_message(root, Message::user(FORWARD, Running { n: 10, k: 1, acc: 1 }))
        .unwrap();
    system.join(root);
    assert_eq!(*result.lock().unwrap(), Some(3628800));
}

#[test]
fn test_factorial_of_one_terminates_immediately() {
    setup_logging_for_tests();
    let result = Arc::new(Mutex::new(None));
    let role = factorial_role(Arc::clone(&result));
    let (system, root) = ActorSystem::create_with_config(
        role,
        RuntimeConfig {
            pool_size: 2,
            mailbox_capacity: 16,
            catch_interrupt: false,
        },
    )
    .unwrap();
    system
        .send_message(root, Message::user(FORWARD, Running { n: 1, k: 1, acc: 1 }))
        .unwrap();
    system.join(root);
    assert_eq!(*result.lock().unwrap(), Some(1));
}
