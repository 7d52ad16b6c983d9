//! Forwarding port for sessions without write authority.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tracing::trace;

use super::{DocumentData, DocumentId, PrivilegedError, PrivilegedPort};

/// Forwards privileged writes to an authoritative host.
///
/// Every request is bounded by `timeout`. While the host is marked
/// unavailable, requests fail with [`PrivilegedError::NoAuthority`] without
/// being sent.
#[derive(Clone)]
pub struct ProxyPort {
    upstream: Arc<dyn PrivilegedPort>,
    timeout: Duration,
    available: Arc<AtomicBool>,
}

impl ProxyPort {
    pub fn new(upstream: Arc<dyn PrivilegedPort>, timeout: Duration) -> Self {
        Self {
            upstream,
            timeout,
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Marks the authoritative host as connected or gone. Shared by clones.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn ensure_available(&self) -> Result<(), PrivilegedError> {
        if self.is_available() {
            Ok(())
        } else {
            Err(PrivilegedError::NoAuthority)
        }
    }
}

impl std::fmt::Debug for ProxyPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyPort")
            .field("timeout", &self.timeout)
            .field("available", &self.is_available())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PrivilegedPort for ProxyPort {
    fn is_authorized(&self) -> bool {
        false
    }

    async fn create_document(&self, data: DocumentData) -> Result<DocumentId, PrivilegedError> {
        self.ensure_available()?;
        trace!(token = %data.token, "forwarding document create");
        tokio::time::timeout(self.timeout, self.upstream.create_document(data))
            .await
            .map_err(|_| PrivilegedError::Timeout(self.timeout))?
    }

    async fn delete_document(&self, id: DocumentId) -> Result<(), PrivilegedError> {
        self.ensure_available()?;
        trace!(document = %id, "forwarding document delete");
        tokio::time::timeout(self.timeout, self.upstream.delete_document(id))
            .await
            .map_err(|_| PrivilegedError::Timeout(self.timeout))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::privileged::{DocumentHostHandle, DocumentKind};
    use cover_core::{CoverEffectId, TokenId};

    fn data() -> DocumentData {
        DocumentData {
            kind: DocumentKind::Item,
            item_type: Some("effect".into()),
            token: TokenId(3),
            effect: CoverEffectId(2),
            name: "Standard Cover".into(),
        }
    }

    #[tokio::test]
    async fn forwards_to_upstream() {
        let (host, _worker) = DocumentHostHandle::spawn(Duration::ZERO, 8);
        let proxy = ProxyPort::new(Arc::new(host.clone()), Duration::from_secs(1));

        assert!(!proxy.is_authorized());
        let id = proxy.create_document(data()).await.unwrap();
        assert_eq!(host.documents().await.unwrap(), vec![(id, data())]);
        proxy.delete_document(id).await.unwrap();
        assert!(host.documents().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unavailable_host_fails_fast() {
        let (host, _worker) = DocumentHostHandle::spawn(Duration::ZERO, 8);
        let proxy = ProxyPort::new(Arc::new(host.clone()), Duration::from_secs(1));
        proxy.clone().set_available(false);

        assert_eq!(
            proxy.create_document(data()).await,
            Err(PrivilegedError::NoAuthority)
        );
        assert!(host.documents().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn slow_host_times_out() {
        let (host, _worker) = DocumentHostHandle::spawn(Duration::from_millis(200), 8);
        let proxy = ProxyPort::new(Arc::new(host), Duration::from_millis(20));

        assert_eq!(
            proxy.create_document(data()).await,
            Err(PrivilegedError::Timeout(Duration::from_millis(20)))
        );
    }
}
