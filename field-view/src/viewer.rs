//! Interactive particle field viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns a [`ParticleField`] and an
//! [`OrbitCamera`] and implements [`eframe::App`] to drive the field once
//! per repaint and paint the result.

use crate::{
    camera::OrbitCamera,
    config::ViewerConfig,
    controls::SteppedControl,
};
use eframe::App;
use field_core::{ParameterUpdate, ParticleField, Rgb, params::parse_particle_count};

/// Brightness of the bloom halo relative to the particle core.
const HALO_ALPHA: f32 = 0.15;
/// Halo radius as a multiple of the core radius.
const HALO_SCALE: f32 = 3.0;
/// Smallest painted particle radius in pixels.
const MIN_RADIUS_PX: f32 = 0.75;

/// The five stepped parameter editors of the side panel.
struct Controls {
    twist: SteppedControl,
    global_rotation: SteppedControl,
    falloff: SteppedControl,
    displace: SteppedControl,
    particle_size: SteppedControl,
}

impl Controls {
    fn new(cfg: &ViewerConfig) -> Self {
        Self {
            twist: SteppedControl::new("Twist Angle", cfg.twist).with_unit("°"),
            global_rotation: SteppedControl::new("Global Rotation", cfg.global_rotation)
                .with_unit("°"),
            falloff: SteppedControl::new("Falloff Radius", cfg.falloff),
            displace: SteppedControl::new("Displace Factor", cfg.displace),
            particle_size: SteppedControl::new("Particle Size", cfg.particle_size),
        }
    }
}

/// Main application state for the viewer.
///
/// The per-frame update is:
/// 1. Collect auto-repeat steps and edits from the control panel into one
///    [`ParameterUpdate`] and apply it to the field.
/// 2. Advance the camera from drag/scroll input (primary drag rotates,
///    secondary or middle drag pans, scroll zooms).
/// 3. [`ParticleField::tick`], project every particle and paint it.
///
/// ### Fields
/// - `field` - The particle field driven once per repaint.
/// - `cfg` - Viewer configuration (initial parameters, camera, background).
/// - `camera` - Orbit camera used to project particles to the screen.
/// - `controls` - Stepped editors for the five continuous parameters.
///
/// - `count_input` - Text of the particle count field; may be invalid
///   until committed.
/// - `status` - Message of the last rejected update, shown in the panel.
/// - `bloom` - Whether halos are painted under particles.
///
/// - `projected` - Screen position, radius and color of each visible
///   particle, reused across frames.
/// - `last_frame_dt` - Frame time reported by egui (seconds, display only).
pub struct Viewer {
    field: ParticleField,
    cfg: ViewerConfig,
    camera: OrbitCamera,
    controls: Controls,

    count_input: String,
    status: Option<String>,
    bloom: bool,

    projected: Vec<(egui::Pos2, f32, egui::Color32)>,
    last_frame_dt: f32,
}

impl Viewer {
    /// Creates a viewer with a freshly generated field.
    ///
    /// The camera starts at `cfg.camera_distance` on `+Z`; controls with an
    /// initial direction start auto-repeating on the first frame.
    ///
    /// ### Parameters
    /// - `cfg` - Initial parameters and viewer settings.
    ///
    /// ### Returns
    /// A fully-initialized [`Viewer`] ready to be passed to `eframe::run_native`.
    ///
    /// ### Errors
    /// Fails if `cfg.initial` holds invalid parameters.
    pub fn new(cfg: ViewerConfig) -> field_core::Result<Self> {
        let field = ParticleField::new(cfg.initial)?;
        let camera = OrbitCamera::new(cfg.camera_distance, cfg.fov_y_deg, cfg.near, cfg.far)
            .with_limits(cfg.min_distance, cfg.max_distance)
            .with_damping(cfg.damping_factor);

        log::info!(
            "field ready: {} particles on a {}x{} grid",
            field.particles().len(),
            field.layout().size_x,
            field.layout().size_y
        );

        Ok(Self {
            count_input: cfg.initial.particle_count.to_string(),
            controls: Controls::new(&cfg),
            bloom: cfg.bloom,
            field,
            camera,
            cfg,
            status: None,
            projected: Vec::new(),
            last_frame_dt: 0.0,
        })
    }

    /// One auto-repeat step for every control that is running.
    fn auto_repeat(&self) -> ParameterUpdate {
        let p = self.field.params();
        let c = &self.controls;
        ParameterUpdate {
            twist_angle_deg: c.twist.tick(p.twist_angle_deg),
            global_rotation_deg: c.global_rotation.tick(p.global_rotation_deg),
            falloff_radius: c.falloff.tick(p.falloff_radius),
            displace_factor: c.displace.tick(p.displace_factor),
            particle_size: c.particle_size.tick(p.particle_size),
            ..ParameterUpdate::default()
        }
    }

    /// Applies `update` to the field, surfacing a rejection in the status bar.
    fn apply(&mut self, update: &ParameterUpdate) {
        if update.is_empty() {
            return;
        }
        match self.field.set_parameters(update) {
            Ok(changes) => {
                if changes.needs_regeneration() {
                    log::info!(
                        "regenerated field with {} particles",
                        self.field.particles().len()
                    );
                    self.count_input = self.field.params().particle_count.to_string();
                }
                self.status = None;
            }
            Err(e) => {
                log::warn!("{e}");
                self.status = Some(e.to_string());
            }
        }
    }

    /// Applies the typed particle count, or restores the current one if
    /// the text is not a positive integer.
    fn commit_count_input(&mut self) {
        match parse_particle_count(&self.count_input) {
            Ok(count) => self.apply(&ParameterUpdate::new().particle_count(count)),
            Err(e) => {
                log::info!("{e}");
                self.count_input = self.field.params().particle_count.to_string();
            }
        }
    }

    /// Draws one labelled control: back button, slider, forward button.
    ///
    /// Returns the new value if the slider moved or a single-step button
    /// was pressed.
    fn control_row(ui: &mut egui::Ui, control: &mut SteppedControl, value: f32) -> Option<f32> {
        let mut out = None;

        ui.label(format!("{}: {:.2}{}", control.label, value, control.unit));
        ui.horizontal(|ui| {
            let continuous = control.spec.continuous;
            let dir = control.direction();

            let back = match (continuous, dir) {
                (false, _) => "–",
                (true, -1) => "⏸",
                (true, _) => "◀",
            };
            if ui
                .add(egui::Button::new(back).selected(dir == -1))
                .clicked()
            {
                out = control.press(value, -1);
            }

            let mut v = value;
            let slider = egui::Slider::new(&mut v, control.spec.min..=control.spec.max)
                .step_by(f64::from(control.spec.step))
                .show_value(false);
            if ui.add(slider).changed() {
                out = Some(v);
            }

            let forward = match (continuous, dir) {
                (false, _) => "+",
                (true, 1) => "⏸",
                (true, _) => "▶",
            };
            if ui
                .add(egui::Button::new(forward).selected(dir == 1))
                .clicked()
            {
                out = control.press(value, 1);
            }
        });

        out
    }

    /// Builds the right-hand control panel, recording edits into `update`.
    fn ui_controls_panel(&mut self, ctx: &egui::Context, update: &mut ParameterUpdate) {
        let p = *self.field.params();

        egui::SidePanel::right("controls_panel")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Controls");
                ui.separator();

                let c = &mut self.controls;
                if let Some(v) = Self::control_row(ui, &mut c.twist, p.twist_angle_deg) {
                    update.twist_angle_deg = Some(v);
                }
                if let Some(v) =
                    Self::control_row(ui, &mut c.global_rotation, p.global_rotation_deg)
                {
                    update.global_rotation_deg = Some(v);
                }
                if let Some(v) = Self::control_row(ui, &mut c.falloff, p.falloff_radius) {
                    update.falloff_radius = Some(v);
                }
                if let Some(v) = Self::control_row(ui, &mut c.displace, p.displace_factor) {
                    update.displace_factor = Some(v);
                }
                if let Some(v) = Self::control_row(ui, &mut c.particle_size, p.particle_size) {
                    update.particle_size = Some(v);
                }

                ui.separator();
                ui.label(format!("Number of Particles: {}", p.particle_count));
                let invalid = !self.count_input.is_empty()
                    && parse_particle_count(&self.count_input).is_err();
                let mut edit = egui::TextEdit::singleline(&mut self.count_input);
                if invalid {
                    edit = edit.text_color(egui::Color32::LIGHT_RED);
                }
                if ui.add(edit).lost_focus() {
                    self.commit_count_input();
                }

                ui.separator();
                ui.checkbox(&mut self.bloom, "Bloom");

                if let Some(status) = &self.status {
                    ui.separator();
                    ui.colored_label(egui::Color32::LIGHT_RED, status);
                }
            });
    }

    /// Builds the bottom status bar (frame time, particle count, generation).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("frame = {:.1} ms", self.last_frame_dt * 1000.0));
                ui.separator();
                ui.label(format!("particles = {}", self.field.particles().len()));
                ui.label(format!("generation = {}", self.field.generation()));
                ui.label(format!("camera distance = {:.1}", self.camera.distance()));
            });
        });
    }

    /// Builds the central panel: camera input and the particle field.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        let [r, g, b] = self.cfg.background;
        let frame = egui::Frame::new().fill(egui::Color32::from_rgb(r, g, b));

        egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::drag());
            let rect = response.rect;

            let delta = response.drag_delta();
            if response.dragged_by(egui::PointerButton::Primary) {
                self.camera.rotate_by_pixels(delta.x, delta.y);
            } else if response.dragged_by(egui::PointerButton::Secondary)
                || response.dragged_by(egui::PointerButton::Middle)
            {
                self.camera.pan_by_pixels(delta.x, delta.y);
            }
            if response.hovered() {
                let scroll = ui.input(|i| i.raw_scroll_delta.y);
                if scroll != 0.0 {
                    self.camera.zoom_by_wheel(scroll);
                }
            }
            self.camera.update();

            let painter = ui.painter_at(rect);
            self.paint_field(&painter, rect);
        });
    }

    /// Ticks the field and paints every visible particle.
    fn paint_field(&mut self, painter: &egui::Painter, rect: egui::Rect) {
        let view_proj = self.camera.view_proj(rect.aspect_ratio());
        let size = self.field.particle_size().abs();

        let camera = &self.camera;
        let projected = &mut self.projected;
        projected.clear();

        for state in self.field.tick() {
            if let Some((pos, w)) = camera.project(&view_proj, state.position, rect) {
                let radius = (size * camera.pixels_per_unit(w, rect)).max(MIN_RADIUS_PX);
                projected.push((pos, radius, to_color32(state.color)));
            }
        }

        if self.bloom {
            for &(pos, radius, color) in projected.iter() {
                painter.circle_filled(pos, radius * HALO_SCALE, color.gamma_multiply(HALO_ALPHA));
            }
        }
        for &(pos, radius, color) in projected.iter() {
            painter.circle_filled(pos, radius, color);
        }
    }
}

fn to_color32(c: Rgb) -> egui::Color32 {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    egui::Color32::from_rgb(channel(c.r), channel(c.g), channel(c.b))
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.last_frame_dt = ctx.input(|i| i.stable_dt);

        let mut update = self.auto_repeat();
        self.ui_status_bar(ctx);
        self.ui_controls_panel(ctx, &mut update);
        self.apply(&update);

        self.ui_central_panel(ctx);

        // The field animates continuously.
        ctx.request_repaint();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> ViewerConfig {
        let mut cfg = ViewerConfig::default();
        cfg.initial.particle_count = 100;
        cfg
    }

    #[test]
    fn new_viewer_shows_initial_count() {
        let viewer = Viewer::new(small_config()).unwrap();
        assert_eq!(viewer.field.particles().len(), 100);
        assert_eq!(viewer.count_input, "100");
        assert!(viewer.bloom);
    }

    #[test]
    fn invalid_initial_parameters_are_reported() {
        let mut cfg = small_config();
        cfg.initial.grid_width = 0.0;
        assert!(Viewer::new(cfg).is_err());
    }

    #[test]
    fn auto_repeat_steps_twist_only() {
        let viewer = Viewer::new(small_config()).unwrap();
        let update = viewer.auto_repeat();

        let twist = update.twist_angle_deg.unwrap();
        assert!((twist - 900.4).abs() < 1e-3);
        assert_eq!(update.global_rotation_deg, None);
        assert_eq!(update.particle_size, None);
        assert_eq!(update.particle_count, None);
    }

    #[test]
    fn valid_count_input_regenerates_field() {
        let mut viewer = Viewer::new(small_config()).unwrap();
        viewer.count_input = " 42 ".to_owned();

        viewer.commit_count_input();

        assert_eq!(viewer.field.particles().len(), 42);
        assert_eq!(viewer.field.generation(), 1);
        assert_eq!(viewer.count_input, "42");
    }

    #[test]
    fn invalid_count_input_restores_current_count() {
        let mut viewer = Viewer::new(small_config()).unwrap();
        let before = viewer.field.particles().to_vec();

        for bad in ["0", "-7", "abc", ""] {
            viewer.count_input = bad.to_owned();
            viewer.commit_count_input();

            assert_eq!(viewer.count_input, "100");
            assert_eq!(viewer.field.particles(), before.as_slice());
        }
    }

    #[test]
    fn rejected_update_sets_status_and_keeps_params() {
        let mut viewer = Viewer::new(small_config()).unwrap();

        viewer.apply(&ParameterUpdate::new().falloff_radius(0.0));
        assert!(viewer.status.is_some());
        assert_eq!(viewer.field.params().falloff_radius, 20.0);

        viewer.apply(&ParameterUpdate::new().falloff_radius(5.0));
        assert!(viewer.status.is_none());
        assert_eq!(viewer.field.params().falloff_radius, 5.0);
    }

    #[test]
    fn gray_seed_maps_to_gray_pixel() {
        assert_eq!(to_color32(Rgb::gray(0.0)), egui::Color32::BLACK);
        assert_eq!(to_color32(Rgb::gray(1.0)), egui::Color32::WHITE);
        assert_eq!(
            to_color32(Rgb::gray(0.5)),
            egui::Color32::from_rgb(128, 128, 128)
        );
    }
}
