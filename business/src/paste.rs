//! Paste handling.
//!
//! [`PasteHub`] plays the role of the document: whoever captures a paste
//! dispatches the payload to the hub, and every subscribed controller gets it
//! through its own `flume` channel. A dispatched payload is consumed by the
//! hub, so nothing else sees the paste afterwards.
//!
//! [`classify`] decides what a payload does to the upload form.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hannou_input::{LocalFile, PastePayload};

pub type ListenerId = u64;

/// A live registration on a [`PasteHub`].
#[derive(Debug)]
pub struct PasteSubscription {
    id: ListenerId,
    receiver: flume::Receiver<PastePayload>,
}

impl PasteSubscription {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Takes every payload queued since the last drain.
    pub fn drain(&self) -> Vec<PastePayload> {
        self.receiver.try_iter().collect()
    }
}

#[derive(Debug, Default)]
struct HubInner {
    next_id: ListenerId,
    listeners: Vec<(ListenerId, flume::Sender<PastePayload>)>,
}

/// Process-wide paste listener registry. Clones share the same registry.
#[derive(Debug, Clone, Default)]
pub struct PasteHub {
    inner: Arc<Mutex<HubInner>>,
}

impl PasteHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HubInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe(&self) -> PasteSubscription {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        let (sender, receiver) = flume::unbounded();
        inner.listeners.push((id, sender));
        log::debug!(target: "hannou_business::paste", "paste listener {id} registered");
        PasteSubscription { id, receiver }
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut inner = self.lock();
        let before = inner.listeners.len();
        inner.listeners.retain(|(listener, _)| *listener != id);
        let removed = inner.listeners.len() != before;
        if removed {
            log::debug!(target: "hannou_business::paste", "paste listener {id} removed");
        }
        removed
    }

    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    /// Delivers `payload` to every listener and returns how many got it.
    ///
    /// Listeners whose subscription was dropped without unsubscribing are
    /// pruned here.
    pub fn dispatch(&self, payload: PastePayload) -> usize {
        let mut inner = self.lock();
        inner
            .listeners
            .retain(|(_, sender)| sender.send(payload.clone()).is_ok());
        inner.listeners.len()
    }
}

/// What a paste does to the upload form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasteAction {
    /// Select the first pasted file. `files` is the whole list, mirrored into
    /// the file input.
    SelectFile {
        file: LocalFile,
        files: Vec<LocalFile>,
    },
    /// Replace the caption with pasted text.
    SetCaption(String),
    Ignore,
}

/// Files win over text; a payload with neither is ignored.
pub fn classify(payload: PastePayload) -> PasteAction {
    let PastePayload { files, text } = payload;
    if let Some(file) = files.first().cloned() {
        return PasteAction::SelectFile { file, files };
    }

    match text {
        Some(text) if !text.is_empty() => PasteAction::SetCaption(text),
        _ => PasteAction::Ignore,
    }
}
