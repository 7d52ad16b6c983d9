//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! dispatching host events, querying cover, or streaming events from
//! specific topics.
use tokio::sync::{broadcast, mpsc, oneshot};

use cover_core::{CoverRecord, DispatchReport, HostEvent, SettingChange, TokenId};

use super::errors::{Result, RuntimeError};
use crate::controller::CoverSnapshot;
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Route a host event through the cover engine.
    ///
    /// Per-token failures are reported in the returned report, not as errors.
    pub async fn dispatch(&self, event: HostEvent) -> Result<DispatchReport> {
        self.request(|reply| Command::Dispatch { event, reply }).await
    }

    /// Write one cover setting and recompute what it affects.
    pub async fn update_setting(&self, change: SettingChange) -> Result<DispatchReport> {
        self.request(|reply| Command::UpdateSetting { change, reply }).await
    }

    /// Cover of `defender` against a single attacker.
    pub async fn cover_from(&self, defender: TokenId, attacker: TokenId) -> Result<CoverRecord> {
        let record = self
            .request(|reply| Command::CoverFrom {
                defender,
                attacker,
                reply,
            })
            .await??;
        Ok(record)
    }

    /// Query the displayed cover state (read-only snapshot)
    pub async fn query_state(&self) -> Result<CoverSnapshot> {
        self.request(|reply| Command::QueryState { reply }).await
    }

    /// Wait for every privileged write spawned so far to complete.
    pub async fn settle(&self) -> Result<()> {
        let tasks = self.request(|reply| Command::TakeInFlight { reply }).await?;
        for task in tasks {
            task.await.map_err(RuntimeError::WorkerJoin)?;
        }
        Ok(())
    }

    /// Stop the cover worker. Later requests fail with
    /// [`RuntimeError::CommandChannelClosed`].
    pub(crate) async fn stop_worker(&self) -> Result<()> {
        self.request(|reply| Command::Shutdown { reply }).await
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Cover` - Displayed cover and attacker set changes
    /// - `Topic::Privileged` - Document writes and their failures
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use cover_runtime::Topic;
    ///
    /// let mut cover_rx = handle.subscribe(Topic::Cover);
    /// while let Ok(event) = cover_rx.recv().await {
    ///     // Handle cover events
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
