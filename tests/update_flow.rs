use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use dotmap::state::ViewState;
use dotmap::sync::{Applied, Backend, SyncClient, SyncError, SyncEvent, UpdateRequest};
use dotmap::types::{MarkerRecord, Status};
use egui::Color32;

/// Captures every wire body it is asked to persist and optionally
/// rejects the request, standing in for the HTTP endpoint.
#[derive(Default)]
struct RecordingBackend {
    bodies: Mutex<Vec<String>>,
    reject: bool,
}

impl Backend for RecordingBackend {
    fn update_point(&self, request: &UpdateRequest) -> Result<(), SyncError> {
        self.bodies
            .lock()
            .unwrap()
            .push(request.wire_json().unwrap());
        if self.reject {
            Err(SyncError::Rejected(500))
        } else {
            Ok(())
        }
    }
}

fn marker(lat: f64, lon: f64, mapid: &str) -> MarkerRecord {
    serde_json::from_value(serde_json::json!({
        "lat": lat,
        "lon": lon,
        "mapid": mapid,
        "status": "default",
        "note": "",
        "tooltip": {}
    }))
    .unwrap()
}

/// Round trips run on background threads; wait for their completions.
fn wait_for_events(client: &mut SyncClient, count: usize) -> Vec<SyncEvent> {
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut events = Vec::new();
    while events.len() < count {
        assert!(Instant::now() < deadline, "timed out waiting for sync events");
        events.extend(client.poll());
        thread::sleep(Duration::from_millis(5));
    }
    events
}

#[test]
fn status_update_round_trip_restyles_the_marker() {
    let backend = Arc::new(RecordingBackend::default());
    let mut client = SyncClient::new(backend.clone());
    let mut view = ViewState::new(vec![marker(40.0, -73.0, "m1")]);

    client.update_status(40.0, -73.0, Status::Active, "m1");
    let events = wait_for_events(&mut client, 1);

    assert_eq!(
        backend.bodies.lock().unwrap().as_slice(),
        [r#"{"latlon":"40,-73","status":"active","map_id":"m1"}"#]
    );

    let event = &events[0];
    assert_eq!(event.mapid, "m1");
    match &event.outcome {
        Ok(Applied::Status(status)) => {
            let record = view
                .find_by_coord(event.lat, event.lon)
                .expect("marker should be found at confirmed coordinates");
            record.status = *status;
        }
        other => panic!("expected a confirmed status update, got {other:?}"),
    }

    let record = view.find_by_coord(40.0, -73.0).unwrap();
    assert_eq!(record.status, Status::Active);
    assert_eq!(record.status.color(), Color32::GREEN);
}

#[test]
fn note_update_does_not_change_the_status() {
    let backend = Arc::new(RecordingBackend::default());
    let mut client = SyncClient::new(backend.clone());
    let mut view = ViewState::new(vec![marker(40.0, -73.0, "m1")]);

    client.update_note(40.0, -73.0, "needs review".to_string(), "m1");
    let events = wait_for_events(&mut client, 1);

    assert_eq!(
        backend.bodies.lock().unwrap().as_slice(),
        [r#"{"latlon":"40,-73","note":"needs review","map_id":"m1"}"#]
    );

    let event = &events[0];
    match &event.outcome {
        Ok(Applied::Note(note)) => {
            let record = view.find_by_coord(event.lat, event.lon).unwrap();
            record.note = note.clone();
        }
        other => panic!("expected a confirmed note update, got {other:?}"),
    }

    let record = view.find_by_coord(40.0, -73.0).unwrap();
    assert_eq!(record.note, "needs review");
    assert_eq!(record.status, Status::Default);
}

#[test]
fn rejected_update_reports_an_error_and_leaves_the_record_unchanged() {
    let backend = Arc::new(RecordingBackend {
        reject: true,
        ..Default::default()
    });
    let mut client = SyncClient::new(backend);
    let mut view = ViewState::new(vec![marker(40.0, -73.0, "m1")]);

    client.update_status(40.0, -73.0, Status::Active, "m1");
    let events = wait_for_events(&mut client, 1);

    assert!(matches!(events[0].outcome, Err(SyncError::Rejected(500))));

    let record = view.find_by_coord(40.0, -73.0).unwrap();
    assert_eq!(record.status, Status::Default);
}

#[test]
fn confirmed_update_for_unknown_coordinates_is_a_lookup_miss() {
    let backend = Arc::new(RecordingBackend::default());
    let mut client = SyncClient::new(backend);
    let mut view = ViewState::new(vec![marker(40.0, -73.0, "m1")]);

    client.update_status(10.0, 20.0, Status::Active, "m1");
    let events = wait_for_events(&mut client, 1);

    let event = &events[0];
    assert!(event.outcome.is_ok());
    assert!(view.find_by_coord(event.lat, event.lon).is_none());
}

/// Confirms requests immediately, except `active` status updates, which
/// it holds long enough for a later edit's response to overtake them.
struct SlowActiveBackend;

impl Backend for SlowActiveBackend {
    fn update_point(&self, request: &UpdateRequest) -> Result<(), SyncError> {
        if request.wire_json().unwrap().contains("\"status\":\"active\"") {
            thread::sleep(Duration::from_millis(150));
        }
        Ok(())
    }
}

#[test]
fn out_of_order_acks_do_not_overwrite_newer_status() {
    let mut client = SyncClient::new(Arc::new(SlowActiveBackend));
    let mut view = ViewState::new(vec![marker(40.0, -73.0, "m1")]);

    // Two rapid edits to the same field; the first response is delayed
    // past the second one.
    client.update_status(40.0, -73.0, Status::Active, "m1");
    client.update_status(40.0, -73.0, Status::Inactive, "m1");

    let events = wait_for_events(&mut client, 1);
    match &events[0].outcome {
        Ok(Applied::Status(status)) => {
            assert_eq!(*status, Status::Inactive);
            view.find_by_coord(40.0, -73.0).unwrap().status = *status;
        }
        other => panic!("expected a confirmed status update, got {other:?}"),
    }

    // The late ack for the older edit must be dropped, not applied.
    thread::sleep(Duration::from_millis(300));
    assert!(client.poll().is_empty());
    assert_eq!(view.find_by_coord(40.0, -73.0).unwrap().status, Status::Inactive);
}

#[test]
fn acks_for_different_markers_are_independent() {
    let backend = Arc::new(RecordingBackend::default());
    let mut client = SyncClient::new(backend.clone());

    client.update_status(40.0, -73.0, Status::Active, "m1");
    client.update_status(41.0, -74.0, Status::Inactive, "m1");
    let events = wait_for_events(&mut client, 2);

    assert_eq!(events.len(), 2);
    assert_eq!(backend.bodies.lock().unwrap().len(), 2);
    assert!(events.iter().all(|event| event.outcome.is_ok()));
}
