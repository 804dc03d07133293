//! Background analysis of open documents.
//!
//! Editors submit every revision of a document; analysis runs on the rayon
//! pool and each result arrives as one [`DiagnosticBatch`] on a channel.
//! Revisions are last-write-wins: a batch is dropped when a newer revision
//! of its document was submitted or delivered in the meantime, so a
//! consumer never sees diagnostics go back in time.

use crate::session::Session;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use qmlint_common::Diagnostic;
use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;
use tracing::{debug, trace};

/// All diagnostics of one revision of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticBatch {
    pub document: String,
    pub revision: u64,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Default)]
struct Revisions {
    submitted: DashMap<String, u64>,
    delivered: DashMap<String, u64>,
}

impl Revisions {
    /// Record `revision` as submitted unless a newer one already is.
    fn submit(&self, document: &str, revision: u64) -> bool {
        match self.submitted.entry(document.to_string()) {
            Entry::Occupied(mut latest) => {
                if *latest.get() > revision {
                    return false;
                }
                latest.insert(revision);
                true
            }
            Entry::Vacant(slot) => {
                slot.insert(revision);
                true
            }
        }
    }

    fn is_latest(&self, document: &str, revision: u64) -> bool {
        self.submitted
            .get(document)
            .is_some_and(|latest| *latest == revision)
    }
}

pub struct LiveSession {
    session: Session,
    revisions: Arc<Revisions>,
    sender: Sender<DiagnosticBatch>,
    receiver: Receiver<DiagnosticBatch>,
}

impl LiveSession {
    pub fn new(session: Session) -> Self {
        let (sender, receiver) = mpsc::channel();
        LiveSession {
            session,
            revisions: Arc::new(Revisions::default()),
            sender,
            receiver,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Queue `text` as `revision` of `document`. The document name doubles
    /// as its path for implicit directory imports.
    ///
    /// Returns `false` without analyzing when a newer revision was already
    /// submitted.
    pub fn submit(&self, document: impl Into<String>, revision: u64, text: impl Into<String>) -> bool {
        let document = document.into();
        if !self.revisions.submit(&document, revision) {
            debug!(document = %document, revision, "stale revision ignored");
            return false;
        }

        let session = self.session.clone();
        let revisions = Arc::clone(&self.revisions);
        let sender = self.sender.clone();
        let text = text.into();
        rayon::spawn(move || {
            if !revisions.is_latest(&document, revision) {
                trace!(document = %document, revision, "superseded before analysis");
                return;
            }
            let diagnostics = session.lint_source(&text, Some(Path::new(&document)));
            deliver(
                &revisions,
                &sender,
                DiagnosticBatch {
                    document,
                    revision,
                    diagnostics,
                },
            );
        });
        true
    }

    /// Forget a closed document. A later submit starts from any revision.
    pub fn close(&self, document: &str) {
        self.revisions.submitted.remove(document);
        self.revisions.delivered.remove(document);
    }

    pub fn latest_submitted(&self, document: &str) -> Option<u64> {
        self.revisions.submitted.get(document).map(|r| *r)
    }

    pub fn latest_delivered(&self, document: &str) -> Option<u64> {
        self.revisions.delivered.get(document).map(|r| *r)
    }

    pub fn batches(&self) -> &Receiver<DiagnosticBatch> {
        &self.receiver
    }

    /// The next delivered batch, or `None` after `timeout`.
    pub fn next_batch(&self, timeout: Duration) -> Option<DiagnosticBatch> {
        match self.receiver.recv_timeout(timeout) {
            Ok(batch) => Some(batch),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

/// Send `batch` unless a newer revision superseded it. The delivered entry
/// stays locked while sending so two workers of one document cannot
/// reorder their batches.
fn deliver(revisions: &Revisions, sender: &Sender<DiagnosticBatch>, batch: DiagnosticBatch) {
    if !revisions.is_latest(&batch.document, batch.revision) {
        trace!(document = %batch.document, revision = batch.revision, "superseded after analysis");
        return;
    }
    match revisions.delivered.entry(batch.document.clone()) {
        Entry::Occupied(mut delivered) => {
            if *delivered.get() >= batch.revision {
                return;
            }
            delivered.insert(batch.revision);
            let _ = sender.send(batch);
        }
        Entry::Vacant(slot) => {
            let slot = slot.insert(batch.revision);
            let _ = sender.send(batch);
            drop(slot);
        }
    }
}
