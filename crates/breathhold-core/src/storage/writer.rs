//! Fire-and-forget persistence.
//!
//! The session machine hands finished work to a [`PersistenceSink`] and moves
//! on. [`BackgroundWriter`] is the production sink: it owns a
//! [`ProgressStore`] on a worker thread and drains an unbounded channel, so
//! `submit` never blocks the caller. Failed writes are logged and dropped;
//! the in-memory ledger stays authoritative.

use std::thread::JoinHandle;
use tokio::sync::{mpsc, oneshot};

use super::gateway::ProgressStore;
use crate::error::Result;
use crate::progress::Progress;
use crate::session::Session;

/// A completed session together with the ledger it produced.
#[derive(Debug, Clone)]
pub struct PersistJob {
    pub session: Session,
    pub progress: Progress,
}

pub trait PersistenceSink {
    /// Queue a write. Must not block and must not fail.
    fn submit(&self, job: PersistJob);
}

/// Sink that drops every job.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl PersistenceSink for NullSink {
    fn submit(&self, job: PersistJob) {
        tracing::debug!(session_id = %job.session.id, "Persistence disabled; dropping job");
    }
}

enum Message {
    Job(Box<PersistJob>),
    Flush(oneshot::Sender<()>),
}

pub struct BackgroundWriter {
    tx: Option<mpsc::UnboundedSender<Message>>,
    worker: Option<JoinHandle<()>>,
}

impl BackgroundWriter {
    /// Move `store` onto a dedicated writer thread.
    pub fn spawn<S>(store: S) -> Result<Self>
    where
        S: ProgressStore + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
        let worker = std::thread::Builder::new()
            .name("breathhold-writer".into())
            .spawn(move || {
                while let Some(message) = rx.blocking_recv() {
                    match message {
                        Message::Job(job) => write_job(&store, &job),
                        Message::Flush(ack) => {
                            let _ = ack.send(());
                        }
                    }
                }
                tracing::debug!("Writer channel closed; worker exiting");
            })?;
        Ok(Self {
            tx: Some(tx),
            worker: Some(worker),
        })
    }

    /// Block until every job queued before this call has been written.
    pub fn flush(&self) {
        let Some(tx) = &self.tx else {
            return;
        };
        let (ack_tx, ack_rx) = oneshot::channel();
        if tx.send(Message::Flush(ack_tx)).is_err() {
            tracing::warn!("Writer thread is gone; flush skipped");
            return;
        }
        if ack_rx.blocking_recv().is_err() {
            tracing::warn!("Writer thread stopped before acknowledging flush");
        }
    }

    /// Close the queue and wait for pending writes.
    pub fn shutdown(mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("Writer thread panicked");
            }
        }
    }
}

impl PersistenceSink for BackgroundWriter {
    fn submit(&self, job: PersistJob) {
        let session_id = job.session.id;
        let sent = self
            .tx
            .as_ref()
            .map(|tx| tx.send(Message::Job(Box::new(job))).is_ok())
            .unwrap_or(false);
        if !sent {
            tracing::warn!(%session_id, "Writer is closed; session was not saved");
        }
    }
}

impl Drop for BackgroundWriter {
    fn drop(&mut self) {
        self.close();
    }
}

fn write_job<S: ProgressStore>(store: &S, job: &PersistJob) {
    let session_saved = store
        .save_session(&job.session)
        .map_err(|e| tracing::warn!(session_id = %job.session.id, error = %e, "Failed to save session"))
        .is_ok();
    let progress_saved = store
        .save_progress(&job.progress)
        .map_err(|e| tracing::warn!(error = %e, "Failed to save progress"))
        .is_ok();
    if session_saved && progress_saved {
        tracing::debug!(session_id = %job.session.id, "Session persisted");
    }
}
