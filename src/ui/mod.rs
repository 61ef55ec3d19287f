mod chart;
mod kit;
mod status;

use crate::config::Settings;
use crate::engine::{EngineCommand, EngineHandle, EngineUpdate};
use crate::events::Device;
use chart::ChartView;
use eframe::egui;
use kit::KitView;
use std::time::{Duration, Instant};

/// Upper bound between frames so new hits show up promptly.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Kit,
    Chart,
}

pub struct DrumsightApp {
    engine: EngineHandle,
    devices: Vec<Device>,
    selected_device: Option<String>,
    supported: bool,
    input_error: Option<String>,
    profile_error: Option<String>,
    profile_name: String,
    page: Page,
    show_connection: bool,
    kit: KitView,
    chart: ChartView,
}

impl DrumsightApp {
    pub fn new(engine: EngineHandle, settings: &Settings) -> Self {
        let kit = KitView::new(engine.bus.subscribe(), settings);
        let chart = ChartView::new(engine.bus.subscribe(), settings);
        let profile_name = engine.drum_map.load().name().to_string();
        Self {
            engine,
            devices: Vec::new(),
            selected_device: None,
            supported: true,
            input_error: None,
            profile_error: None,
            profile_name,
            page: Page::Kit,
            show_connection: false,
            kit,
            chart,
        }
    }

    fn process_engine_updates(&mut self) {
        while let Ok(update) = self.engine.update_rx.try_recv() {
            match update {
                EngineUpdate::Unsupported => {
                    self.supported = false;
                }
                EngineUpdate::Devices { devices, selected } => {
                    self.devices = devices;
                    self.selected_device = selected;
                }
                EngineUpdate::ProfileLoaded { name } => {
                    self.profile_name = name;
                    self.profile_error = None;
                }
                EngineUpdate::ProfileFailed { message } => {
                    self.profile_error = Some(message);
                }
                EngineUpdate::InputError { message } => {
                    self.input_error = message;
                }
            }
        }
    }

    fn send(&self, command: EngineCommand) {
        let _ = self.engine.command_tx.send(command);
    }

    fn menu_bar(&mut self, ui: &mut egui::Ui) {
        egui::MenuBar::new().ui(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Load Drum Profile...").clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .set_title("Load Drum Profile")
                        .add_filter("Drum profile", &["ron"])
                        .pick_file()
                    {
                        self.send(EngineCommand::LoadProfile(path));
                    }
                    ui.close();
                }

                if ui.button("Refresh Devices").clicked() {
                    self.send(EngineCommand::RefreshDevices);
                    ui.close();
                }

                ui.separator();

                if ui.button("Quit").clicked() {
                    ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });
            ui.menu_button("View", |ui| {
                if ui.selectable_value(&mut self.page, Page::Kit, "Drum Kit").clicked() {
                    ui.close();
                }
                if ui
                    .selectable_value(&mut self.page, Page::Chart, "Chart Overlay")
                    .clicked()
                {
                    ui.close();
                }
            });
        });
    }

    fn status_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading(match self.page {
                Page::Kit => "MIDI Input Test",
                Page::Chart => "Chart",
            });
            ui.separator();

            if self.supported {
                ui.label("Connection:");
                let connected = self.selected_device.is_some();
                if status::connection_button(ui, connected).clicked() {
                    self.show_connection = true;
                }
            } else {
                ui.label(status::UNSUPPORTED_MESSAGE);
            }

            ui.separator();
            ui.label(format!("Map: {}", self.profile_name));
        });
    }

    fn connection_window(&mut self, ctx: &egui::Context) {
        if !self.supported {
            self.show_connection = false;
            return;
        }

        let mut open = self.show_connection;
        let mut picked = None;
        egui::Window::new("MIDI Connection")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                picked = status::device_picker(
                    ui,
                    &self.devices,
                    self.selected_device.as_deref(),
                );
            });
        self.show_connection = open;

        if let Some(id) = picked {
            self.send(EngineCommand::SelectDevice(id));
        }
    }
}

impl eframe::App for DrumsightApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.process_engine_updates();

        let drum_map = self.engine.drum_map.load();
        self.kit.pump(&drum_map, now);
        self.chart.pump(&drum_map, now);

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            self.menu_bar(ui);
        });

        egui::TopBottomPanel::top("status").show(ctx, |ui| {
            self.status_bar(ui);
        });

        if self.input_error.is_some() || self.profile_error.is_some() {
            egui::TopBottomPanel::top("error").show(ctx, |ui| {
                for error in [&self.input_error, &self.profile_error].into_iter().flatten() {
                    ui.colored_label(egui::Color32::RED, error);
                }
            });
        }

        self.connection_window(ctx);

        match self.page {
            Page::Kit => {
                egui::SidePanel::right("event_log")
                    .min_width(240.0)
                    .show(ctx, |ui| {
                        self.kit.show_log(ui);
                    });
                egui::CentralPanel::default().show(ctx, |ui| {
                    self.kit.show(ui, now);
                });
            }
            Page::Chart => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    self.chart.show(ui, now);
                });
            }
        }

        let wait = [self.kit.next_deadline(), self.chart.next_deadline()]
            .into_iter()
            .flatten()
            .min()
            .map_or(FRAME_INTERVAL, |deadline| {
                deadline.saturating_duration_since(now).min(FRAME_INTERVAL)
            });
        ctx.request_repaint_after(wait);
    }
}

impl Drop for DrumsightApp {
    fn drop(&mut self) {
        self.send(EngineCommand::Shutdown);
    }
}
