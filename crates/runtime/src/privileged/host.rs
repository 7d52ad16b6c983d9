//! In-process authoritative document host.
//!
//! The worker owns every stored document and applies writes in the order
//! they arrive. An optional latency delays each write, standing in for the
//! round trip to a remote host.
use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use super::{DocumentData, DocumentId, PrivilegedError, PrivilegedPort};

pub(crate) enum HostCommand {
    Create {
        data: DocumentData,
        reply: oneshot::Sender<Result<DocumentId, PrivilegedError>>,
    },
    Delete {
        id: DocumentId,
        reply: oneshot::Sender<Result<(), PrivilegedError>>,
    },
    List {
        reply: oneshot::Sender<Vec<(DocumentId, DocumentData)>>,
    },
}

/// Background task owning the stored documents.
pub struct DocumentHostWorker {
    documents: BTreeMap<DocumentId, DocumentData>,
    next_id: u64,
    latency: Duration,
    command_rx: mpsc::Receiver<HostCommand>,
}

impl DocumentHostWorker {
    pub(crate) fn new(latency: Duration, command_rx: mpsc::Receiver<HostCommand>) -> Self {
        Self {
            documents: BTreeMap::new(),
            next_id: 1,
            latency,
            command_rx,
        }
    }

    /// Main worker loop. Ends once every handle is dropped.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(cmd) = self.command_rx.recv() => {
                    self.handle_command(cmd).await;
                }
                else => break,
            }
        }
    }

    async fn handle_command(&mut self, cmd: HostCommand) {
        match cmd {
            HostCommand::Create { data, reply } => {
                self.delay().await;
                let id = DocumentId(self.next_id);
                self.next_id += 1;
                debug!(document = %id, token = %data.token, "stored document");
                self.documents.insert(id, data);
                if reply.send(Ok(id)).is_err() {
                    debug!("Create reply channel closed (caller dropped)");
                }
            }
            HostCommand::Delete { id, reply } => {
                self.delay().await;
                let result = match self.documents.remove(&id) {
                    Some(_) => Ok(()),
                    None => Err(PrivilegedError::Rejected(format!("unknown document {id}"))),
                };
                if reply.send(result).is_err() {
                    debug!("Delete reply channel closed (caller dropped)");
                }
            }
            HostCommand::List { reply } => {
                let documents = self
                    .documents
                    .iter()
                    .map(|(id, data)| (*id, data.clone()))
                    .collect();
                if reply.send(documents).is_err() {
                    debug!("List reply channel closed (caller dropped)");
                }
            }
        }
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

/// Cloneable handle with direct write authority over the document host.
#[derive(Clone, Debug)]
pub struct DocumentHostHandle {
    command_tx: mpsc::Sender<HostCommand>,
}

impl DocumentHostHandle {
    /// Spawns a host worker on the current runtime.
    pub fn spawn(latency: Duration, buffer: usize) -> (Self, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::channel(buffer);
        let worker = DocumentHostWorker::new(latency, command_rx);
        (Self { command_tx }, tokio::spawn(worker.run()))
    }

    /// Every document currently stored, in id order.
    pub async fn documents(&self) -> Result<Vec<(DocumentId, DocumentData)>, PrivilegedError> {
        let (reply, reply_rx) = oneshot::channel();
        self.send(HostCommand::List { reply }).await?;
        reply_rx.await.map_err(|_| PrivilegedError::HostClosed)
    }

    async fn send(&self, cmd: HostCommand) -> Result<(), PrivilegedError> {
        self.command_tx
            .send(cmd)
            .await
            .map_err(|_| PrivilegedError::HostClosed)
    }
}

#[async_trait]
impl PrivilegedPort for DocumentHostHandle {
    fn is_authorized(&self) -> bool {
        true
    }

    async fn create_document(&self, data: DocumentData) -> Result<DocumentId, PrivilegedError> {
        let (reply, reply_rx) = oneshot::channel();
        self.send(HostCommand::Create { data, reply }).await?;
        reply_rx.await.map_err(|_| PrivilegedError::HostClosed)?
    }

    async fn delete_document(&self, id: DocumentId) -> Result<(), PrivilegedError> {
        let (reply, reply_rx) = oneshot::channel();
        self.send(HostCommand::Delete { id, reply }).await?;
        reply_rx.await.map_err(|_| PrivilegedError::HostClosed)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::privileged::DocumentKind;
    use cover_core::{CoverEffectId, TokenId};

    fn data(token: u32) -> DocumentData {
        DocumentData {
            kind: DocumentKind::ActiveEffect,
            item_type: None,
            token: TokenId(token),
            effect: CoverEffectId(1),
            name: "Half Cover".into(),
        }
    }

    #[tokio::test]
    async fn creates_and_deletes_documents() {
        let (host, _worker) = DocumentHostHandle::spawn(Duration::ZERO, 8);

        let first = host.create_document(data(1)).await.unwrap();
        let second = host.create_document(data(2)).await.unwrap();
        assert_ne!(first, second);
        assert_eq!(host.documents().await.unwrap().len(), 2);

        host.delete_document(first).await.unwrap();
        let remaining = host.documents().await.unwrap();
        assert_eq!(remaining, vec![(second, data(2))]);
    }

    #[tokio::test]
    async fn deleting_unknown_document_is_rejected() {
        let (host, _worker) = DocumentHostHandle::spawn(Duration::ZERO, 8);
        let err = host.delete_document(DocumentId(42)).await.unwrap_err();
        assert!(matches!(err, PrivilegedError::Rejected(_)));
    }

    #[tokio::test]
    async fn worker_stops_when_handles_drop() {
        let (host, worker) = DocumentHostHandle::spawn(Duration::ZERO, 8);
        drop(host);
        worker.await.unwrap();
    }
}
