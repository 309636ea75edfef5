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

use signal_hook::consts::SIGINT;
use signal_hook::iterator::backend::Handle;
use signal_hook::iterator::Signals;
use tracing::info;

use crate::scheduler::Scheduler;

/// Background thread consuming SIGINT on behalf of the supervisor. Every
/// delivery raises the runtime's internal interrupt; the thread itself is
/// stopped during supervisor teardown.
pub(crate) struct SignalListener {
    handle: Handle,
    thread: JoinHandle<()>,
}

impl SignalListener {
    pub(crate) fn spawn(scheduler: Arc<Scheduler>) -> io::Result<SignalListener> {
        let mut signals = Signals::new([SIGINT])?;
        let handle = signals.handle();
        let thread = std::thread::Builder::new()
            .name("troupe-signals".to_string())
            .spawn(move || {
                for signal in signals.forever() {
                    info!(signal, "interrupt-received");
                    scheduler.raise_interrupt();
                }
            })?;
        Ok(SignalListener { handle, thread })
    }

    /// Unblocks and joins the listener thread.
    pub(crate) fn stop(self) {
        self.handle.close();
        let _ = self.thread.join();
    }
}
