//! Interactive event viewer
//!
//! Shows a top-down projection of the event under the cursor, lets the user
//! step or auto-play through the store and toggle individual particle cones.
//! The input file is watched and reloaded when it changes.

use cherenkov_core::{load_file, Event, EventStore, IngestConfig};
use notify::{Event as FsEvent, RecommendedWatcher, Watcher};
use std::path::PathBuf;
use std::sync::mpsc;

/// Length of the drawn cone edges, in detector units
const CONE_LENGTH: f32 = 25.0;

pub fn run(source_path: PathBuf, config: IngestConfig) -> Result<(), Box<dyn std::error::Error>> {
    let title = format!("cherenkov - {}", source_path.display());
    let options = eframe::NativeOptions::default();
    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| Ok(Box::new(ViewerApp::new(source_path, config, cc)))),
    )?;
    Ok(())
}

/// Event viewer application
pub struct ViewerApp {
    source_path: PathBuf,
    config: IngestConfig,
    store: Option<EventStore>,
    last_load_error: Option<String>,
    playing: bool,
    speed_multiplier: f32,
    playback_time: f64,
    #[allow(dead_code)] // Kept alive to maintain file watching
    file_watcher: Option<RecommendedWatcher>,
    file_receiver: mpsc::Receiver<notify::Result<FsEvent>>,
    needs_reload: bool,
}

impl ViewerApp {
    pub fn new(source_path: PathBuf, config: IngestConfig, _cc: &eframe::CreationContext<'_>) -> Self {
        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            // The receiver may already be gone during shutdown
            let _ = tx.send(res);
        })
        .ok();

        if let Some(ref mut w) = watcher {
            if let Err(e) = w.watch(&source_path, notify::RecursiveMode::NonRecursive) {
                log::warn!("not watching {}: {}", source_path.display(), e);
            }
        }

        let mut app = Self {
            source_path,
            config,
            store: None,
            last_load_error: None,
            playing: false,
            speed_multiplier: 1.0,
            playback_time: 0.0,
            file_watcher: watcher,
            file_receiver: rx,
            needs_reload: false,
        };

        app.reload_store();

        app
    }

    fn reload_store(&mut self) {
        let previous = self.store.as_ref().map_or(0, EventStore::current_index);
        match load_file(&self.source_path, &self.config) {
            Ok((mut store, report)) => {
                log::info!(
                    "loaded {} events from {}",
                    report.events_read,
                    self.source_path.display()
                );
                // keep the cursor where it was when the event still exists
                let _ = store.set_current_index(previous);
                self.playback_time = store.current().map_or(0.0, |e| e.start_time);
                self.store = Some(store);
                self.last_load_error = None;
            }
            Err(e) => {
                self.last_load_error = Some(format!("{}", e));
                self.store = None;
                self.playing = false;
            }
        }
    }

    fn check_file_changes(&mut self) {
        while let Ok(event) = self.file_receiver.try_recv() {
            match event {
                Ok(FsEvent {
                    kind: notify::EventKind::Modify(_),
                    paths,
                    ..
                }) => {
                    if paths.contains(&self.source_path) {
                        self.needs_reload = true;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    log::warn!("file watcher error: {}", e);
                }
            }
        }

        if self.needs_reload {
            self.reload_store();
            self.needs_reload = false;
        }
    }

    fn jump(&mut self, forward: bool) {
        if let Some(store) = self.store.as_mut() {
            if forward {
                store.advance();
            } else {
                store.retreat();
            }
            self.playback_time = store.current().map_or(0.0, |e| e.start_time);
        }
    }

    /// Advance playback by one frame; stops at the end of the last event
    fn tick(&mut self, dt: f64) {
        let Some(store) = self.store.as_mut() else {
            self.playing = false;
            return;
        };
        let Some(last) = store.events().last() else {
            self.playing = false;
            return;
        };
        let end = last.end_time;

        self.playback_time += dt * self.speed_multiplier as f64;
        if self.playback_time >= end {
            self.playback_time = end;
            self.playing = false;
        }
        if let Some(idx) = store.index_at_time(self.playback_time) {
            let _ = store.set_current_index(idx);
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_file_changes();

        // Top bar with controls
        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("⏮ Prev").clicked() {
                    self.jump(false);
                }
                if ui.button(if self.playing { "⏸ Pause" } else { "▶ Play" }).clicked() {
                    self.playing = !self.playing;
                }
                if ui.button("⏭ Next").clicked() {
                    self.jump(true);
                }

                ui.separator();

                ui.label("Speed:");
                ui.add(egui::Slider::new(&mut self.speed_multiplier, 0.1..=10.0));

                ui.separator();

                if let Some(ref store) = self.store {
                    ui.label(format!(
                        "Event: {} / {}",
                        store.current_index() + 1,
                        store.count()
                    ));
                    ui.label(format!("t = {:.3}", self.playback_time));
                }
            });
        });

        // Particle list with cone toggles
        egui::SidePanel::right("particles").show(ctx, |ui| {
            ui.heading("Particles");
            let Some(store) = self.store.as_mut() else {
                return;
            };
            let index = store.current_index();
            let Ok(event) = store.at(index) else {
                ui.label("no events");
                return;
            };

            let mut toggled = Vec::new();
            for (p_idx, particle) in event.particles.iter().enumerate() {
                let mut enabled = particle.display_enabled;
                let label = format!(
                    "{}  {:.1} MeV  {:.1}°",
                    particle.name, particle.energy, particle.cone_half_angle
                );
                if ui.checkbox(&mut enabled, label).changed() {
                    toggled.push(p_idx);
                }
            }
            if event.particles.is_empty() {
                ui.label("none");
            }
            for p_idx in toggled {
                if let Err(e) = store.toggle_display(index, p_idx) {
                    log::warn!("{}", e);
                }
            }
        });

        // Main canvas area
        egui::CentralPanel::default().show(ctx, |ui| {
            let rect = ui.max_rect();
            let painter = ui.painter();

            if let Some(event) = self.store.as_ref().and_then(EventStore::current) {
                draw_event(painter, rect, event);
            }

            // Show error message if any
            if let Some(ref error) = self.last_load_error {
                ui.vertical_centered(|ui| {
                    ui.add_space(rect.height() * 0.4);
                    ui.label(
                        egui::RichText::new(format!("Error: {}", error))
                            .color(egui::Color32::RED)
                            .size(16.0),
                    );
                });
            }
        });

        if self.playing {
            let dt = ctx.input(|i| i.stable_dt) as f64;
            self.tick(dt);
            ctx.request_repaint();
        }
    }
}

/// Top-down (x, y) projection of one event
fn draw_event(painter: &egui::Painter, rect: egui::Rect, event: &Event) {
    let extent = event
        .hits
        .iter()
        .chain(event.outer_hits.iter())
        .map(|hit| hit.position.x.abs().max(hit.position.y.abs()))
        .fold(1.0_f64, f64::max) as f32;
    let center = rect.center();
    let scale = (rect.width().min(rect.height()) / (2.0 * extent)) * 0.9;
    let to_screen =
        |x: f64, y: f64| center + egui::vec2(x as f32 * scale, -(y as f32) * scale);

    for hit in &event.outer_hits {
        let radius = (hit.radius as f32 * scale).max(1.5);
        painter.circle_stroke(
            to_screen(hit.position.x, hit.position.y),
            radius,
            egui::Stroke::new(1.0, egui::Color32::DARK_GRAY),
        );
    }

    let times = event
        .hits
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), h| {
            (lo.min(h.time), hi.max(h.time))
        });
    for hit in &event.hits {
        let radius = (hit.radius as f32 * scale).max(2.0);
        painter.circle_filled(
            to_screen(hit.position.x, hit.position.y),
            radius,
            time_color(hit.time, times),
        );
    }

    let vertex = to_screen(event.vertex_position.x, event.vertex_position.y);
    for particle in event.particles.iter().filter(|p| p.display_enabled) {
        let dir = egui::vec2(particle.direction.x as f32, -(particle.direction.y as f32));
        if dir.length_sq() == 0.0 {
            continue;
        }
        let axis = dir.normalized() * CONE_LENGTH * scale;
        painter.line_segment(
            [vertex, vertex + axis],
            egui::Stroke::new(1.0, egui::Color32::LIGHT_BLUE),
        );
        if particle.has_cone() {
            let half = (particle.cone_half_angle as f32).to_radians();
            for edge in [half, -half] {
                let rotated = egui::emath::Rot2::from_angle(edge) * axis;
                painter.line_segment(
                    [vertex, vertex + rotated],
                    egui::Stroke::new(1.0, egui::Color32::YELLOW),
                );
            }
        }
        painter.text(
            vertex + axis,
            egui::Align2::LEFT_BOTTOM,
            &particle.name,
            egui::FontId::default(),
            egui::Color32::WHITE,
        );
    }
    painter.circle_filled(vertex, 3.0, egui::Color32::RED);
}

/// Early hits blue, late hits red
fn time_color(time: f64, (lo, hi): (f64, f64)) -> egui::Color32 {
    let t = if hi > lo { ((time - lo) / (hi - lo)) as f32 } else { 0.5 };
    egui::Color32::from_rgb((255.0 * t) as u8, 80, (255.0 * (1.0 - t)) as u8)
}
