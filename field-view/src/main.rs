//! Application entry point for the twisted particle field viewer.
//!
//! This binary sets up logging and eframe/egui and delegates all
//! interactive logic and rendering to [`Viewer`] from the `viewer` module.

mod camera;
mod config;
mod controls;
mod viewer;

use config::ViewerConfig;
use viewer::Viewer;

/// Starts the native eframe application.
///
/// Logging goes through `env_logger` at `info` unless `RUST_LOG` says
/// otherwise. The window is titled `"Twist Field"`; all UI state and
/// rendering are handled by [`Viewer`].
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if eframe fails to create the native window or event loop, or
///   the initial field parameters are invalid.
fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1280.0, 800.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Twist Field",
        options,
        Box::new(|_cc| Ok(Box::new(Viewer::new(ViewerConfig::default())?))),
    )
}
