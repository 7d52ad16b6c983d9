//! Effect store that persists cover effects through privileged writes.
//!
//! Displayed state is applied locally and reported immediately. Every added
//! or removed effect then spawns a privileged document write that completes
//! on its own. Failures are logged and published but never rolled back, so
//! the local display can run ahead of the host.
//!
//! Each applied `(token, effect)` pair carries a generation. A create that
//! returns after its pair was removed or re-applied belongs to a stale
//! generation; its document is deleted again and the result discarded.
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use cover_core::{
    CoverCatalog, CoverEffect, CoverEffectId, CoverEffectSet, CoverTypeSet, EffectStore,
    EffectStoreError, LocalEffectStore, TokenId,
};

use crate::events::{EventBus, PrivilegedEvent, PrivilegedOperation};
use crate::privileged::{DocumentId, PrivilegedPort};
use crate::storage::{DocumentIndex, StorageStrategy};

type Pair = (TokenId, CoverEffectId);

#[derive(Debug, Default)]
struct Ledger {
    documents: DocumentIndex,
    generations: HashMap<Pair, u64>,
    next_generation: u64,
}

impl Ledger {
    fn open(&mut self, pair: Pair) -> u64 {
        self.next_generation += 1;
        self.generations.insert(pair, self.next_generation);
        self.next_generation
    }

    fn is_current(&self, pair: Pair, generation: u64) -> bool {
        self.generations.get(&pair) == Some(&generation)
    }
}

#[derive(Clone)]
struct Shared {
    ledger: Arc<Mutex<Ledger>>,
    port: Arc<dyn PrivilegedPort>,
    events: EventBus,
}

impl Shared {
    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// [`EffectStore`] backed by documents on the authoritative host.
pub struct PersistedEffectStore {
    local: LocalEffectStore,
    catalog: Arc<CoverCatalog>,
    strategy: &'static StorageStrategy,
    shared: Shared,
    runtime: Handle,
    in_flight: Vec<JoinHandle<()>>,
}

impl PersistedEffectStore {
    /// Creates a store spawning its writes on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn new(
        catalog: Arc<CoverCatalog>,
        strategy: &'static StorageStrategy,
        port: Arc<dyn PrivilegedPort>,
        events: EventBus,
    ) -> Self {
        Self::with_runtime(catalog, strategy, port, events, Handle::current())
    }

    pub fn with_runtime(
        catalog: Arc<CoverCatalog>,
        strategy: &'static StorageStrategy,
        port: Arc<dyn PrivilegedPort>,
        events: EventBus,
        runtime: Handle,
    ) -> Self {
        Self {
            local: LocalEffectStore::new(),
            catalog,
            strategy,
            shared: Shared {
                ledger: Arc::new(Mutex::new(Ledger::default())),
                port,
                events,
            },
            runtime,
            in_flight: Vec::new(),
        }
    }

    pub fn strategy(&self) -> &'static StorageStrategy {
        self.strategy
    }

    /// Documents confirmed by the host, as far as this store knows.
    pub fn documents(&self) -> DocumentIndex {
        self.shared.ledger().documents.clone()
    }

    /// Hands over every write spawned since the last call.
    pub fn take_in_flight(&mut self) -> Vec<JoinHandle<()>> {
        self.in_flight.retain(|task| !task.is_finished());
        std::mem::take(&mut self.in_flight)
    }

    fn persist(&mut self, token: TokenId, effect: &CoverEffect) {
        let pair = (token, effect.id);
        let generation = {
            let mut ledger = self.shared.ledger();
            if self.strategy.find(&ledger.documents, token, effect.id).is_some() {
                debug!(target: "runtime::store", token = %token, effect = ?effect.id, "effect already stored");
                ledger.open(pair);
                return;
            }
            ledger.open(pair)
        };

        let data = self.strategy.create(token, effect);
        let shared = self.shared.clone();
        let task = self.runtime.spawn(async move {
            let proxied = !shared.port.is_authorized();
            match shared.port.create_document(data.clone()).await {
                Ok(document) => {
                    let current = {
                        let mut ledger = shared.ledger();
                        let current = ledger.is_current(pair, generation);
                        if current {
                            ledger.documents.insert(document, data);
                        }
                        current
                    };
                    if current {
                        debug!(target: "runtime::store", token = %token, document = %document, proxied, "effect stored");
                        shared.events.publish(PrivilegedEvent::DocumentCreated {
                            token,
                            effect: pair.1,
                            document,
                            proxied,
                        });
                    } else {
                        warn!(target: "runtime::store", token = %token, document = %document, "discarding late effect document");
                        shared.events.publish(PrivilegedEvent::ResultDiscarded {
                            token,
                            effect: pair.1,
                            document,
                        });
                        delete_document(&shared, pair, document).await;
                    }
                }
                Err(err) => {
                    error!(target: "runtime::store", token = %token, effect = ?pair.1, error = %err, "failed to store effect");
                    shared.events.publish(PrivilegedEvent::OperationFailed {
                        token,
                        effect: pair.1,
                        operation: PrivilegedOperation::Create,
                        error: err.to_string(),
                    });
                }
            }
        });
        self.track(task);
    }

    fn unpersist(&mut self, token: TokenId, effect: CoverEffectId) {
        let pair = (token, effect);
        let documents = {
            let mut ledger = self.shared.ledger();
            ledger.generations.remove(&pair);
            let documents = self.strategy.delete(&ledger.documents, token, effect);
            for document in &documents {
                ledger.documents.remove(document);
            }
            documents
        };

        for document in documents {
            let shared = self.shared.clone();
            let task = self
                .runtime
                .spawn(async move { delete_document(&shared, pair, document).await });
            self.track(task);
        }
    }

    /// Keeps the handle for [`Self::take_in_flight`], dropping writes that
    /// already completed.
    fn track(&mut self, task: JoinHandle<()>) {
        self.in_flight.retain(|task| !task.is_finished());
        self.in_flight.push(task);
    }
}

async fn delete_document(shared: &Shared, (token, effect): Pair, document: DocumentId) {
    match shared.port.delete_document(document).await {
        Ok(()) => {
            debug!(target: "runtime::store", token = %token, document = %document, "effect document deleted");
            shared.events.publish(PrivilegedEvent::DocumentDeleted {
                token,
                effect,
                document,
            });
        }
        Err(err) => {
            error!(target: "runtime::store", token = %token, document = %document, error = %err, "failed to delete effect document");
            shared.events.publish(PrivilegedEvent::OperationFailed {
                token,
                effect,
                operation: PrivilegedOperation::Delete,
                error: err.to_string(),
            });
        }
    }
}

impl EffectStore for PersistedEffectStore {
    fn replace_cover_types(
        &mut self,
        token: TokenId,
        types: Option<&CoverTypeSet>,
    ) -> Result<bool, EffectStoreError> {
        self.local.replace_cover_types(token, types)
    }

    fn replace_local_effects(
        &mut self,
        token: TokenId,
        effects: Option<&CoverEffectSet>,
    ) -> Result<bool, EffectStoreError> {
        let next = effects.cloned().unwrap_or_default();
        let added = next
            .iter()
            .map(|id| {
                self.catalog
                    .cover_effects
                    .iter()
                    .find(|effect| effect.id == *id)
                    .cloned()
                    .ok_or(EffectStoreError::UnknownEffect(*id))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let previous = self.local.cover_effects(token);
        if !self.local.replace_local_effects(token, Some(&next))? {
            return Ok(false);
        }

        for effect in previous.difference(&next) {
            self.unpersist(token, *effect);
        }
        for effect in added.iter().filter(|effect| !previous.contains(&effect.id)) {
            self.persist(token, effect);
        }
        Ok(true)
    }

    fn cover_types(&self, token: TokenId) -> CoverTypeSet {
        self.local.cover_types(token)
    }

    fn cover_effects(&self, token: TokenId) -> CoverEffectSet {
        self.local.cover_effects(token)
    }

    fn forget(&mut self, token: TokenId) {
        let stored: Vec<CoverEffectId> = {
            let ledger = self.shared.ledger();
            let mut effects: Vec<_> = ledger
                .generations
                .keys()
                .filter(|(owner, _)| *owner == token)
                .map(|(_, effect)| *effect)
                .collect();
            effects.extend(
                ledger
                    .documents
                    .values()
                    .filter(|data| data.token == token)
                    .map(|data| data.effect),
            );
            effects.sort();
            effects.dedup();
            effects
        };
        for effect in stored {
            self.unpersist(token, effect);
        }
        self.local.forget(token);
    }
}

impl std::fmt::Debug for PersistedEffectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistedEffectStore")
            .field("strategy", &self.strategy.system_id)
            .field("in_flight", &self.in_flight.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::events::{Event, Topic};
    use crate::privileged::{DocumentHostHandle, ProxyPort};

    async fn settle(store: &mut PersistedEffectStore) {
        for task in store.take_in_flight() {
            task.await.unwrap();
        }
    }

    fn store_with(port: Arc<dyn PrivilegedPort>, system: &str) -> (PersistedEffectStore, EventBus) {
        let events = EventBus::with_capacity(32);
        let catalog = Arc::new(cover_content::catalog_or_generic(system));
        let store = PersistedEffectStore::new(
            catalog,
            StorageStrategy::for_system(system),
            port,
            events.clone(),
        );
        (store, events)
    }

    fn effects(ids: &[u16]) -> CoverEffectSet {
        ids.iter().copied().map(CoverEffectId).collect()
    }

    #[tokio::test]
    async fn applied_effects_are_stored_and_removed() {
        let (host, _worker) = DocumentHostHandle::spawn(Duration::ZERO, 16);
        let (mut store, _events) = store_with(Arc::new(host.clone()), "dnd5e");

        assert_eq!(store.replace_local_effects(TokenId(1), Some(&effects(&[1]))), Ok(true));
        assert_eq!(store.replace_local_effects(TokenId(1), Some(&effects(&[1]))), Ok(false));
        settle(&mut store).await;
        let stored = host.documents().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert!(stored[0].1.backs(TokenId(1), CoverEffectId(1)));

        assert_eq!(store.replace_local_effects(TokenId(1), Some(&effects(&[2]))), Ok(true));
        settle(&mut store).await;
        let stored = host.documents().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert!(stored[0].1.backs(TokenId(1), CoverEffectId(2)));

        assert_eq!(store.replace_local_effects(TokenId(1), None), Ok(true));
        settle(&mut store).await;
        assert!(host.documents().await.unwrap().is_empty());
        assert!(store.documents().is_empty());
    }

    #[tokio::test]
    async fn unknown_effect_is_rejected_before_applying() {
        let (host, _worker) = DocumentHostHandle::spawn(Duration::ZERO, 16);
        let (mut store, _events) = store_with(Arc::new(host), "generic");

        assert_eq!(
            store.replace_local_effects(TokenId(1), Some(&effects(&[99]))),
            Err(EffectStoreError::UnknownEffect(CoverEffectId(99)))
        );
        assert!(store.cover_effects(TokenId(1)).is_empty());
    }

    #[tokio::test]
    async fn failed_write_keeps_local_state() {
        let (host, _worker) = DocumentHostHandle::spawn(Duration::ZERO, 16);
        let proxy = ProxyPort::new(Arc::new(host.clone()), Duration::from_secs(1));
        proxy.set_available(false);
        let (mut store, events) = store_with(Arc::new(proxy), "pf2e");
        let mut rx = events.subscribe(Topic::Privileged);

        assert_eq!(store.replace_local_effects(TokenId(4), Some(&effects(&[2]))), Ok(true));
        settle(&mut store).await;

        assert_eq!(store.cover_effects(TokenId(4)), effects(&[2]));
        assert!(host.documents().await.unwrap().is_empty());
        assert!(matches!(
            rx.recv().await.unwrap(),
            Event::Privileged(PrivilegedEvent::OperationFailed {
                operation: PrivilegedOperation::Create,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn late_create_is_discarded_and_compensated() {
        let (host, _worker) = DocumentHostHandle::spawn(Duration::from_millis(30), 16);
        let (mut store, events) = store_with(Arc::new(host.clone()), "dnd5e");
        let mut rx = events.subscribe(Topic::Privileged);

        assert_eq!(store.replace_local_effects(TokenId(2), Some(&effects(&[1]))), Ok(true));
        store.forget(TokenId(2));
        settle(&mut store).await;

        assert!(host.documents().await.unwrap().is_empty());
        assert!(store.documents().is_empty());
        assert!(matches!(
            rx.recv().await.unwrap(),
            Event::Privileged(PrivilegedEvent::ResultDiscarded { .. })
        ));
        assert!(matches!(
            rx.recv().await.unwrap(),
            Event::Privileged(PrivilegedEvent::DocumentDeleted { .. })
        ));
    }

    #[tokio::test]
    async fn completed_writes_are_not_retained() {
        let (host, _worker) = DocumentHostHandle::spawn(Duration::ZERO, 16);
        let (mut store, _events) = store_with(Arc::new(host.clone()), "dnd5e");

        for _ in 0..200 {
            store
                .replace_local_effects(TokenId(1), Some(&effects(&[1])))
                .unwrap();
            tokio::time::sleep(Duration::from_millis(1)).await;
            store.replace_local_effects(TokenId(1), None).unwrap();
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        assert!(store.in_flight.len() <= 2);
        settle(&mut store).await;
        assert!(host.documents().await.unwrap().is_empty());
    }
}
