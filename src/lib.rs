pub mod config;
pub mod data;
mod map;
mod plugins;
pub mod state;
pub mod sync;
pub mod types;
pub mod widgets;
mod windows;

use config::AppConfig;
use map::DotmapApp;
use types::MarkerRecord;

/// Opens the map window. `markers` must be non-empty; [`data::load_markers`]
/// guarantees that.
pub fn run(config: AppConfig, markers: Vec<MarkerRecord>) -> Result<(), eframe::Error> {
    eframe::run_native(
        "Dotmap",
        Default::default(),
        Box::new(move |cc| Ok(Box::new(DotmapApp::new(cc.egui_ctx.clone(), &config, markers)))),
    )
}
