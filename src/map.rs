use std::{cell::RefCell, rc::Rc};

use egui::{Align2, Color32, Context};
use tracing::{debug, info, warn};
use walkers::{HttpOptions, HttpTiles, Map, MapMemory, Tiles};

use crate::{
    config::AppConfig,
    plugins,
    state::{SelectionState, ViewState},
    sync::{Applied, SyncClient, SyncEvent},
    types::{CoordKey, MarkerRecord},
    widgets::MarkerWidget,
    windows,
};

/// The map application: one circle marker per record, a popup for the
/// selected marker, and a sync client persisting edits. Marker records
/// are loaded before startup and only their status and note mutate, on
/// confirmed round trips drained in [`apply_sync_events`](Self::apply_sync_events).
pub struct DotmapApp {
    tiles: Box<dyn Tiles>,
    map_memory: MapMemory,
    home: walkers::Position,
    view_state: ViewState,
    selection_state: Rc<RefCell<SelectionState>>,
    marker_widget: Option<MarkerWidget>,
    sync: SyncClient,
    last_error: Option<String>,
}

impl DotmapApp {
    /// Creates the application. `markers` must be non-empty; the view
    /// centers on the first record.
    pub fn new(egui_ctx: Context, config: &AppConfig, markers: Vec<MarkerRecord>) -> Self {
        let mut map_memory = MapMemory::default();
        if map_memory.set_zoom(config.map.initial_zoom).is_err() {
            warn!(zoom = config.map.initial_zoom, "initial zoom out of range, keeping default");
        }

        let home = markers[0].position();

        Self {
            tiles: Box::new(HttpTiles::with_options(
                walkers::sources::OpenStreetMap,
                HttpOptions::default(),
                egui_ctx.to_owned(),
            )),
            map_memory,
            home,
            view_state: ViewState::new(markers),
            selection_state: Rc::new(RefCell::new(SelectionState::new())),
            marker_widget: None,
            sync: SyncClient::http(&config.server.endpoint).with_repaint(egui_ctx),
            last_error: None,
        }
    }

    /// Applies completed round trips: a confirmed status update restyles
    /// the marker found at the response's coordinates (a lookup miss
    /// skips the restyle), a confirmed note update only mutates the
    /// record, and a failure leaves the record untouched and surfaces
    /// the error.
    fn apply_sync_events(&mut self) {
        for event in self.sync.poll() {
            match &event.outcome {
                Ok(Applied::Status(status)) => {
                    match self.view_state.find_by_coord(event.lat, event.lon) {
                        Some(record) => {
                            record.status = *status;
                            info!(
                                latlon = %record.latlon(),
                                mapid = %event.mapid,
                                %status,
                                "status update confirmed"
                            );
                        }
                        None => {
                            debug!(
                                lat = event.lat,
                                lon = event.lon,
                                "no marker at confirmed coordinates, skipping restyle"
                            );
                        }
                    }
                }
                Ok(Applied::Note(note)) => {
                    if let Some(record) = self.view_state.find_by_coord(event.lat, event.lon) {
                        record.note = note.clone();
                    }
                    info!(
                        lat = event.lat,
                        lon = event.lon,
                        mapid = %event.mapid,
                        "note update confirmed"
                    );
                }
                Err(error) => {
                    warn!(
                        lat = event.lat,
                        lon = event.lon,
                        mapid = %event.mapid,
                        %error,
                        "update failed"
                    );
                    self.report_failure(&event, &error.to_string());
                }
            }
        }
    }

    fn report_failure(&mut self, event: &SyncEvent, error: &str) {
        let message = format!(
            "Saving marker ({}, {}) on map {} failed: {error}",
            event.lat, event.lon, event.mapid
        );
        if let Some(widget) = &mut self.marker_widget {
            if widget.key == CoordKey::new(event.lat, event.lon) {
                widget.set_error(message.clone());
            }
        }
        self.last_error = Some(message);
    }

    fn show_marker_widget(&mut self, ctx: &Context) {
        let selected = self.selection_state.borrow().marker.clone();
        let Some(key) = selected else {
            self.marker_widget = None;
            return;
        };

        let Some(record) = self.view_state.find_by_key(&key).cloned() else {
            self.selection_state.borrow_mut().marker = None;
            self.marker_widget = None;
            return;
        };

        let widget_matches = self.marker_widget.as_ref().is_some_and(|w| w.key == key);
        if !widget_matches {
            self.marker_widget = Some(MarkerWidget::new(&record));
        }

        if let Some(widget) = &mut self.marker_widget {
            if !widget.show(ctx, &record, &mut self.sync) {
                self.selection_state.borrow_mut().marker = None;
                self.marker_widget = None;
            }
        }
    }

    fn show_error_banner(&mut self, ctx: &Context) {
        let Some(message) = self.last_error.clone() else {
            return;
        };
        egui::Area::new("sync_error".into())
            .anchor(Align2::CENTER_BOTTOM, [0.0, -10.0])
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.colored_label(Color32::RED, &message);
                        if ui.button("Dismiss").clicked() {
                            self.last_error = None;
                        }
                    });
                });
            });
    }
}

impl eframe::App for DotmapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_sync_events();

        let rimless = egui::Frame {
            fill: ctx.style().visuals.panel_fill,
            ..Default::default()
        };

        egui::CentralPanel::default()
            .frame(rimless)
            .show(ctx, |ui| {
                let tiles = self.tiles.as_mut();

                let marker_plugin =
                    plugins::Markers::new(&self.view_state.markers, self.selection_state.clone());

                let map = Map::new(Some(tiles), &mut self.map_memory, self.home)
                    .with_plugin(marker_plugin);

                ui.add(map);

                windows::zoom(ui, &mut self.map_memory);
            });

        self.show_marker_widget(ctx);
        self.show_error_banner(ctx);
    }
}
