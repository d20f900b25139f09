use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::types::{CoordKey, Status};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("server rejected update: HTTP {0}")]
    Rejected(u16),
}

/// What changed on the marker. The wire format keeps the server's two
/// legacy shapes (a body carrying either `status` or `note`), but inside
/// the client the update kind is explicit.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateKind {
    Status(Status),
    Note(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRequest {
    pub lat: f64,
    pub lon: f64,
    pub mapid: String,
    pub kind: UpdateKind,
}

/// Body of `POST /update_point`. Field order and the presence of exactly
/// one of `status`/`note` are fixed by the server contract.
#[derive(Serialize)]
struct WirePayload<'a> {
    latlon: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<&'a str>,
    map_id: &'a str,
}

impl UpdateRequest {
    pub fn key(&self) -> CoordKey {
        CoordKey::new(self.lat, self.lon)
    }

    pub fn latlon(&self) -> String {
        format!("{},{}", self.lat, self.lon)
    }

    fn to_wire(&self) -> WirePayload<'_> {
        let (status, note) = match &self.kind {
            UpdateKind::Status(status) => (Some(status.as_str()), None),
            UpdateKind::Note(note) => (None, Some(note.as_str())),
        };
        WirePayload {
            latlon: self.latlon(),
            status,
            note,
            map_id: &self.mapid,
        }
    }

    /// The exact JSON body sent to the server.
    pub fn wire_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.to_wire())
    }
}

/// Persistence seam for marker updates. The application uses
/// [`HttpBackend`]; tests substitute their own implementation.
pub trait Backend: Send + Sync {
    fn update_point(&self, request: &UpdateRequest) -> Result<(), SyncError>;
}

pub struct HttpBackend {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpBackend {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            url: format!("{}/update_point", endpoint.trim_end_matches('/')),
        }
    }
}

impl Backend for HttpBackend {
    fn update_point(&self, request: &UpdateRequest) -> Result<(), SyncError> {
        let response = self
            .client
            .post(&self.url)
            .json(&request.to_wire())
            .send()
            .map_err(|e| SyncError::Transport(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(SyncError::Rejected(response.status().as_u16()))
        }
    }
}

/// The confirmed change, echoing the client-issued value. The server's
/// response body is not interpreted beyond its success status.
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    Status(Status),
    Note(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Field {
    Status,
    Note,
}

/// Outcome of one update round trip, delivered back to the UI thread.
#[derive(Debug)]
pub struct SyncEvent {
    pub lat: f64,
    pub lon: f64,
    pub mapid: String,
    pub outcome: Result<Applied, SyncError>,
    seq: u64,
    field: Field,
}

/// Persists status and note edits without blocking the UI thread. Each
/// request runs on its own short-lived thread; completions come back
/// over a channel drained once per frame by [`poll`](SyncClient::poll).
///
/// Requests may complete out of order. Every (marker, field) pair
/// carries a monotonic sequence number, and an ack older than the last
/// applied one for that pair is dropped, so a slow early response can
/// not overwrite a newer edit.
pub struct SyncClient {
    backend: Arc<dyn Backend>,
    tx: Sender<SyncEvent>,
    rx: Receiver<SyncEvent>,
    repaint: Option<egui::Context>,
    next_seq: HashMap<(CoordKey, Field), u64>,
    applied_seq: HashMap<(CoordKey, Field), u64>,
}

impl SyncClient {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            backend,
            tx,
            rx,
            repaint: None,
            next_seq: HashMap::new(),
            applied_seq: HashMap::new(),
        }
    }

    pub fn http(endpoint: &str) -> Self {
        Self::new(Arc::new(HttpBackend::new(endpoint)))
    }

    /// Wakes this context when a round trip completes, so confirmed
    /// restyles show up without waiting for the next input event.
    pub fn with_repaint(mut self, egui_ctx: egui::Context) -> Self {
        self.repaint = Some(egui_ctx);
        self
    }

    pub fn update_status(&mut self, lat: f64, lon: f64, status: Status, mapid: &str) {
        self.dispatch(UpdateRequest {
            lat,
            lon,
            mapid: mapid.to_string(),
            kind: UpdateKind::Status(status),
        });
    }

    pub fn update_note(&mut self, lat: f64, lon: f64, note: String, mapid: &str) {
        self.dispatch(UpdateRequest {
            lat,
            lon,
            mapid: mapid.to_string(),
            kind: UpdateKind::Note(note),
        });
    }

    fn dispatch(&mut self, request: UpdateRequest) {
        let field = match request.kind {
            UpdateKind::Status(_) => Field::Status,
            UpdateKind::Note(_) => Field::Note,
        };
        let seq = {
            let counter = self.next_seq.entry((request.key(), field)).or_insert(0);
            *counter += 1;
            *counter
        };

        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        let repaint = self.repaint.clone();
        thread::spawn(move || {
            let outcome = backend.update_point(&request).map(|()| match request.kind {
                UpdateKind::Status(status) => Applied::Status(status),
                UpdateKind::Note(ref note) => Applied::Note(note.clone()),
            });
            // The receiver only goes away on shutdown.
            let _ = tx.send(SyncEvent {
                lat: request.lat,
                lon: request.lon,
                mapid: request.mapid,
                outcome,
                seq,
                field,
            });
            // egui only repaints on input; without this the completion
            // sits in the channel until the user next moves the mouse.
            if let Some(ctx) = repaint {
                ctx.request_repaint();
            }
        });
    }

    /// Drains completed round trips, dropping confirmed updates that an
    /// already-applied newer edit has superseded.
    pub fn poll(&mut self) -> Vec<SyncEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            if event.outcome.is_ok() && self.is_stale(&event) {
                debug!(
                    latlon = %event.latlon_key(),
                    seq = event.seq,
                    "dropping stale ack"
                );
                continue;
            }
            events.push(event);
        }
        events
    }

    fn is_stale(&mut self, event: &SyncEvent) -> bool {
        let applied = self
            .applied_seq
            .entry((event.latlon_key(), event.field))
            .or_insert(0);
        if event.seq < *applied {
            true
        } else {
            *applied = event.seq;
            false
        }
    }
}

impl SyncEvent {
    fn latlon_key(&self) -> CoordKey {
        CoordKey::new(self.lat, self.lon)
    }
}
