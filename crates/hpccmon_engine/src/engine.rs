use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use monitor_logging::{monitor_debug, monitor_error};

use crate::{EngineEvent, UpdateOrchestrator};

enum EngineCommand {
    Trigger,
    Shutdown,
}

/// Background worker that runs update cycles one at a time.
///
/// Triggers that arrive while a cycle is in flight collapse into a single
/// follow-up cycle.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    worker: Option<JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(orchestrator: Arc<UpdateOrchestrator>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        let worker = thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    monitor_error!("Failed to start engine runtime: {}", err);
                    return;
                }
            };
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Shutdown => break,
                    EngineCommand::Trigger => {
                        let (coalesced, shutdown) = drain_triggers(&cmd_rx);
                        if coalesced > 0 {
                            monitor_debug!("Coalesced {} pending triggers", coalesced);
                        }
                        let report = runtime.block_on(orchestrator.run_cycle_report());
                        if event_tx
                            .send(EngineEvent::CycleCompleted { report, coalesced })
                            .is_err()
                            || shutdown
                        {
                            break;
                        }
                    }
                }
            }
        });

        Self {
            cmd_tx,
            event_rx,
            worker: Some(worker),
        }
    }

    /// Request one cycle. Never blocks.
    pub fn trigger(&self) {
        let _ = self.cmd_tx.send(EngineCommand::Trigger);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// Stop after the in-flight cycle, if any, and wait for the worker.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn drain_triggers(cmd_rx: &mpsc::Receiver<EngineCommand>) -> (usize, bool) {
    let mut coalesced = 0;
    while let Ok(command) = cmd_rx.try_recv() {
        match command {
            EngineCommand::Trigger => coalesced += 1,
            EngineCommand::Shutdown => return (coalesced, true),
        }
    }
    (coalesced, false)
}
