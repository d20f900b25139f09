use std::{cell::RefCell, rc::Rc};

use egui::{Color32, Rect, Response, Stroke, Vec2};
use walkers::{Plugin, Projector};

use crate::{state::SelectionState, types::MarkerRecord};

const MARKER_RADIUS: f32 = 6.0;
const FILL_OPACITY: f32 = 0.8;

/// Draws one circle per marker record, colored by status, and toggles
/// the selection when a marker is clicked.
pub struct Markers<'a> {
    markers: &'a [MarkerRecord],
    selection_state: Rc<RefCell<SelectionState>>,
}

impl<'a> Markers<'a> {
    pub fn new(
        markers: &'a [MarkerRecord],
        selection_state: Rc<RefCell<SelectionState>>,
    ) -> Self {
        Self {
            markers,
            selection_state,
        }
    }
}

impl Plugin for Markers<'_> {
    fn run(self: Box<Self>, ui: &mut egui::Ui, _response: &Response, projector: &Projector) {
        for record in self.markers {
            record.draw(ui, projector, &mut self.selection_state.borrow_mut());
        }
    }
}

impl MarkerRecord {
    fn draw(&self, ui: &mut egui::Ui, projector: &Projector, selection_state: &mut SelectionState) {
        let screen_position = projector.project(self.position()).to_pos2();

        let clickable_area =
            Rect::from_center_size(screen_position, Vec2::splat(MARKER_RADIUS * 3.0));
        let response = ui.allocate_rect(clickable_area, egui::Sense::click());

        let radius = if response.hovered() {
            MARKER_RADIUS + 2.0
        } else {
            MARKER_RADIUS
        };

        let color = self.status.color();
        let painter = ui.painter();

        if selection_state.is_selected(self) {
            painter.circle_stroke(
                screen_position,
                radius + 3.0,
                Stroke::new(2.0, Color32::WHITE),
            );
        }

        painter.circle(
            screen_position,
            radius,
            color.gamma_multiply(FILL_OPACITY),
            Stroke::new(1.5, color),
        );

        if response.clicked() {
            selection_state.toggle_marker_selection(self);
        }
    }
}
