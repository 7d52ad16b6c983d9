//! Runtime orchestration for cover tracking sessions.
//!
//! This crate wires the `cover-core` engine to its collaborators: a scripted
//! visibility oracle, a persisted effect store writing through a privileged
//! port, and a topic-based event bus. Consumers embed [`Runtime`] to deliver
//! host events, query cover, and subscribe to changes through
//! [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`controller`] owns one session's state and collaborators
//! - [`privileged`], [`storage`] and [`store`] persist cover effects
//! - [`oracle`] provides the scripted visibility table
//! - [`scenario`] replays scripted sessions
//! - [`workers`] keeps background tasks internal to the crate
pub mod api;
pub mod config;
pub mod controller;
pub mod events;
pub mod oracle;
pub mod privileged;
pub mod runtime;
pub mod scenario;
pub mod storage;
pub mod store;

mod workers;

pub use api::{Result, RuntimeError, RuntimeHandle};
pub use config::RuntimeConfig;
pub use controller::{CoverController, CoverSnapshot, TokenCoverSnapshot};
pub use events::{CoverEvent, Event, EventBus, PrivilegedEvent, PrivilegedOperation, Topic};
pub use oracle::{CoverLine, ScriptedVisibility};
pub use privileged::{
    DocumentData, DocumentHostHandle, DocumentId, DocumentKind, PrivilegedError, PrivilegedPort,
    ProxyPort,
};
pub use runtime::{Runtime, RuntimeBuilder};
pub use scenario::{ReportSummary, Scenario, ScenarioStep, StepOutcome};
pub use storage::{DocumentIndex, StorageStrategy};
pub use store::PersistedEffectStore;
