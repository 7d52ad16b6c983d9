//! Cover worker that owns the session's [`CoverController`].
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle) and
//! applies them sequentially, so a session is only ever mutated by this
//! task.

use std::ops::ControlFlow;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use cover_core::{CoverError, CoverRecord, DispatchReport, HostEvent, SettingChange, TokenId};

use crate::controller::{CoverController, CoverSnapshot};

/// Commands that can be sent to the cover worker
pub enum Command {
    /// Route a host event through the engine.
    Dispatch {
        event: HostEvent,
        reply: oneshot::Sender<DispatchReport>,
    },
    /// Write one cover setting.
    UpdateSetting {
        change: SettingChange,
        reply: oneshot::Sender<DispatchReport>,
    },
    /// Query cover of a defender against one attacker.
    CoverFrom {
        defender: TokenId,
        attacker: TokenId,
        reply: oneshot::Sender<Result<CoverRecord, CoverError>>,
    },
    /// Query the displayed state (read-only).
    QueryState { reply: oneshot::Sender<CoverSnapshot> },
    /// Hand over the privileged writes spawned so far.
    TakeInFlight {
        reply: oneshot::Sender<Vec<JoinHandle<()>>>,
    },
    /// Stop the worker even if handles are still alive.
    Shutdown { reply: oneshot::Sender<()> },
}

/// Background task that processes cover commands.
pub struct CoverWorker {
    controller: CoverController,
    command_rx: mpsc::Receiver<Command>,
}

impl CoverWorker {
    pub fn new(controller: CoverController, command_rx: mpsc::Receiver<Command>) -> Self {
        tracing::info!(
            "CoverWorker initialized with {} tokens, storage strategy '{}'",
            controller.state().scene.len(),
            controller.store().strategy().system_id
        );

        Self {
            controller,
            command_rx,
        }
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(cmd) = self.command_rx.recv() => {
                    if self.handle_command(cmd).is_break() {
                        break;
                    }
                }
                else => break,
            }
        }
        debug!("CoverWorker stopped");
    }

    fn handle_command(&mut self, cmd: Command) -> ControlFlow<()> {
        match cmd {
            Command::Dispatch { event, reply } => {
                let report = self.controller.dispatch(event);
                if reply.send(report).is_err() {
                    debug!("Dispatch reply channel closed (caller dropped)");
                }
            }
            Command::UpdateSetting { change, reply } => {
                let report = self.controller.update_setting(change);
                if reply.send(report).is_err() {
                    debug!("UpdateSetting reply channel closed (caller dropped)");
                }
            }
            Command::CoverFrom {
                defender,
                attacker,
                reply,
            } => {
                let result = self.controller.cover_from(defender, attacker);
                if reply.send(result).is_err() {
                    debug!("CoverFrom reply channel closed (caller dropped)");
                }
            }
            Command::QueryState { reply } => {
                if reply.send(self.controller.snapshot()).is_err() {
                    debug!("QueryState reply channel closed (caller dropped)");
                }
            }
            Command::TakeInFlight { reply } => {
                let tasks = self.controller.store_mut().take_in_flight();
                if reply.send(tasks).is_err() {
                    debug!("TakeInFlight reply channel closed (caller dropped)");
                }
            }
            Command::Shutdown { reply } => {
                if reply.send(()).is_err() {
                    debug!("Shutdown reply channel closed (caller dropped)");
                }
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }
}
