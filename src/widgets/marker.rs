use egui::{Color32, RichText};

use crate::{
    sync::SyncClient,
    types::{CoordKey, MarkerRecord, Status},
};

/// The popup for a selected marker: its tooltip details, a status
/// dropdown, and a note editor. The dropdown dispatches an update as
/// soon as the selection changes; the note dispatches when the editor
/// loses focus with modified text, matching change-on-blur semantics.
///
/// The widget keeps its own status and note buffers seeded from the
/// record. The visual marker only changes color once the server has
/// confirmed the update and the record itself has been restyled.
pub struct MarkerWidget {
    pub key: CoordKey,
    lat: f64,
    lon: f64,
    mapid: String,
    status: Status,
    note: String,
    last_synced_note: String,
    error: Option<String>,
}

impl MarkerWidget {
    pub fn new(record: &MarkerRecord) -> Self {
        Self {
            key: record.key(),
            lat: record.lat,
            lon: record.lon,
            mapid: record.mapid.clone(),
            status: record.status,
            note: record.note.clone(),
            last_synced_note: record.note.clone(),
            error: None,
        }
    }

    /// The status currently selected in the dropdown.
    pub fn status_selection(&self) -> Status {
        self.status
    }

    /// The current content of the note editor.
    pub fn note_text(&self) -> &str {
        &self.note
    }

    pub fn set_error(&mut self, message: String) {
        self.error = Some(message);
    }

    /// Shows the popup window. Returns `false` once the user closes it.
    pub fn show(&mut self, ctx: &egui::Context, record: &MarkerRecord, sync: &mut SyncClient) -> bool {
        let mut open = true;

        egui::Window::new(format!("Marker ({}, {})", self.lat, self.lon))
            .resizable(false)
            .collapsible(true)
            .open(&mut open)
            .fixed_pos([20.0, 20.0])
            .show(ctx, |ui| {
                ui.label(RichText::new("Details:").strong());
                for line in tooltip_lines(record) {
                    ui.label(line);
                }
                ui.separator();

                ui.horizontal(|ui| {
                    ui.label(RichText::new("Status:").strong());
                    let previous = self.status;
                    egui::ComboBox::from_id_salt("status_dropdown")
                        .selected_text(self.status.label())
                        .show_ui(ui, |ui| {
                            for status in Status::ALL {
                                ui.selectable_value(&mut self.status, status, status.label());
                            }
                        });
                    if self.status != previous {
                        self.error = None;
                        sync.update_status(self.lat, self.lon, self.status, &self.mapid);
                    }
                });

                ui.add_space(5.0);
                ui.label(RichText::new("Note:").strong());
                let response = ui.add(
                    egui::TextEdit::multiline(&mut self.note)
                        .desired_rows(3)
                        .desired_width(250.0),
                );
                if response.lost_focus() && self.note != self.last_synced_note {
                    self.error = None;
                    sync.update_note(self.lat, self.lon, self.note.clone(), &self.mapid);
                    self.last_synced_note = self.note.clone();
                }

                if let Some(error) = &self.error {
                    ui.colored_label(Color32::RED, error);
                }
            });

        open
    }
}

/// The "label: value" lines rendered under the "Details:" heading. An
/// empty tooltip yields no lines; the heading still shows. Values are
/// trusted content and rendered verbatim.
fn tooltip_lines(record: &MarkerRecord) -> Vec<String> {
    record
        .tooltip
        .iter()
        .map(|(label, value)| {
            let value = match value {
                serde_json::Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            format!("{label}: {value}")
        })
        .collect()
}
