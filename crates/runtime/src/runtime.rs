//! High-level runtime orchestrator.
//!
//! The runtime owns background workers, wires up command/event channels, and
//! exposes a builder-based API for clients to drive a cover session.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use cover_content::{CatalogLoader, ContentFactory, SettingsLoader};
use cover_core::{CoverCatalog, CoverSettings, CoverState, HostEvent, Token, VisibilityOracle};

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::config::RuntimeConfig;
use crate::controller::CoverController;
use crate::events::EventBus;
use crate::oracle::{CoverLine, ScriptedVisibility};
use crate::privileged::{DocumentHostHandle, PrivilegedPort, ProxyPort};
use crate::storage::StorageStrategy;
use crate::store::PersistedEffectStore;
use crate::workers::{Command, CoverWorker};

/// Main runtime that hosts one cover session
///
/// Design: Runtime owns workers and coordinates shutdown.
/// [`RuntimeHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    catalog: Arc<CoverCatalog>,
    scripted: Option<Arc<ScriptedVisibility>>,
    host: Option<DocumentHostHandle>,
    proxy: Option<ProxyPort>,

    // Background workers
    cover_worker_handle: JoinHandle<()>,
    host_worker_handle: Option<JoinHandle<()>>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    pub fn catalog(&self) -> &CoverCatalog {
        &self.catalog
    }

    /// Scripted visibility table, unless a custom oracle was installed.
    pub fn scripted_visibility(&self) -> Option<&Arc<ScriptedVisibility>> {
        self.scripted.as_ref()
    }

    /// In-process document host, unless a custom port was installed.
    pub fn document_host(&self) -> Option<&DocumentHostHandle> {
        self.host.as_ref()
    }

    /// Forwarding port used by non-authoritative sessions.
    pub fn proxy(&self) -> Option<&ProxyPort> {
        self.proxy.as_ref()
    }

    /// Shutdown the runtime gracefully
    ///
    /// Pending privileged writes complete first. Handles cloned from this
    /// runtime stop working afterwards.
    pub async fn shutdown(self) -> Result<()> {
        self.handle.settle().await?;
        self.handle.stop_worker().await?;
        drop(self.handle);

        self.cover_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;

        drop(self.host);
        drop(self.proxy);
        if let Some(host_handle) = self.host_worker_handle {
            host_handle.await.map_err(RuntimeError::WorkerJoin)?;
        }

        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    settings: Option<CoverSettings>,
    catalog: Option<CoverCatalog>,
    visibility: Option<Arc<dyn VisibilityOracle>>,
    cover_lines: Vec<CoverLine>,
    tokens: Vec<Token>,
    port: Option<Arc<dyn PrivilegedPort>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            settings: None,
            catalog: None,
            visibility: None,
            cover_lines: Vec::new(),
            tokens: Vec::new(),
            port: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Use these settings instead of loading them.
    pub fn settings(mut self, settings: CoverSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Use this catalog instead of loading one for the system.
    pub fn catalog(mut self, catalog: CoverCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Install a custom visibility oracle (replaces the scripted table).
    pub fn visibility(mut self, visibility: Arc<dyn VisibilityOracle>) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Seed the scripted visibility table.
    pub fn cover_lines(mut self, lines: impl IntoIterator<Item = CoverLine>) -> Self {
        self.cover_lines.extend(lines);
        self
    }

    /// Tokens present when the session starts.
    pub fn tokens(mut self, tokens: impl IntoIterator<Item = Token>) -> Self {
        self.tokens.extend(tokens);
        self
    }

    /// Install a custom privileged port (replaces the in-process host).
    pub fn privileged_port(mut self, port: Arc<dyn PrivilegedPort>) -> Self {
        self.port = Some(port);
        self
    }

    fn load_settings(config: &RuntimeConfig) -> Result<CoverSettings> {
        let loaded = match &config.settings_path {
            Some(path) => SettingsLoader::load(path),
            None => ContentFactory::bundled().load_settings(),
        };
        loaded.map_err(|err| RuntimeError::InvalidConfig(format!("{err:#}")))
    }

    fn load_catalog(config: &RuntimeConfig) -> Result<CoverCatalog> {
        let loaded = match &config.catalog_path {
            Some(path) => CatalogLoader::load(path).map(|file| file.into_catalog()),
            None => ContentFactory::bundled().load_catalog(&config.system_id),
        };
        loaded.map_err(|err| RuntimeError::InvalidConfig(format!("{err:#}")))
    }

    /// Build the runtime
    ///
    /// Initial tokens are loaded as a scene, so attackers and displayed
    /// cover are derived before `build` returns.
    pub async fn build(self) -> Result<Runtime> {
        let config = self.config;
        if config.system_id.is_empty() {
            return Err(RuntimeError::InvalidConfig("system id is empty".into()));
        }

        let settings = match self.settings {
            Some(settings) => settings,
            None => Self::load_settings(&config)?,
        };
        let catalog = Arc::new(match self.catalog {
            Some(catalog) => catalog,
            None => Self::load_catalog(&config)?,
        });

        let (scripted, visibility) = match self.visibility {
            Some(visibility) => (None, visibility),
            None => {
                let scripted = Arc::new(ScriptedVisibility::with_lines(
                    Arc::clone(&catalog),
                    self.cover_lines,
                ));
                (Some(Arc::clone(&scripted)), scripted as Arc<dyn VisibilityOracle>)
            }
        };

        let (host, host_worker_handle, proxy, port) = match self.port {
            Some(port) => (None, None, None, port),
            None => {
                let (host, worker) =
                    DocumentHostHandle::spawn(config.host_latency, config.command_buffer_size);
                if config.authoritative {
                    let port: Arc<dyn PrivilegedPort> = Arc::new(host.clone());
                    (Some(host), Some(worker), None, port)
                } else {
                    let proxy = ProxyPort::new(Arc::new(host.clone()), config.privileged_timeout);
                    let port: Arc<dyn PrivilegedPort> = Arc::new(proxy.clone());
                    (Some(host), Some(worker), Some(proxy), port)
                }
            }
        };

        let event_bus = EventBus::with_capacity(config.event_buffer_size);
        let strategy = StorageStrategy::for_system(&config.system_id);
        let store = PersistedEffectStore::new(
            Arc::clone(&catalog),
            strategy,
            port,
            event_bus.clone(),
        );

        let controller = CoverController::new(
            CoverState::default(),
            settings,
            Arc::clone(&catalog),
            visibility,
            store,
            event_bus.clone(),
        );

        let (command_tx, command_rx) = mpsc::channel::<Command>(config.command_buffer_size);
        let handle = RuntimeHandle::new(command_tx, event_bus);

        let cover_worker = CoverWorker::new(controller, command_rx);
        let cover_worker_handle = tokio::spawn(async move {
            cover_worker.run().await;
        });

        info!(
            system = %config.system_id,
            authoritative = config.authoritative,
            tokens = self.tokens.len(),
            "cover runtime started"
        );
        if !self.tokens.is_empty() {
            handle
                .dispatch(HostEvent::SceneLoaded {
                    tokens: self.tokens,
                })
                .await?;
        }

        Ok(Runtime {
            handle,
            catalog,
            scripted,
            host,
            proxy,
            cover_worker_handle,
            host_worker_handle,
        })
    }
}
