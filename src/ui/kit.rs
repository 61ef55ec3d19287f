use crate::config::Settings;
use crate::events::{DrumCategory, NoteEvent};
use crate::hits::ActiveHits;
use crate::mapping::DrumMap;
use crossbeam::channel::Receiver;
use eframe::egui::{self, Color32, Pos2, Rect, Stroke, Vec2};
use std::collections::VecDeque;
use std::time::Instant;

const KIT_SIZE: Vec2 = Vec2::new(800.0, 600.0);

const GREEN: Color32 = Color32::from_rgb(0x27, 0xae, 0x60);
const BLUE: Color32 = Color32::from_rgb(0x29, 0x80, 0xb9);
const YELLOW: Color32 = Color32::from_rgb(0xff, 0xb1, 0x42);
const RED: Color32 = Color32::from_rgb(0xe7, 0x4c, 0x3c);
const ORANGE: Color32 = Color32::from_rgb(0xff, 0x79, 0x3f);
const IDLE_FILL: Color32 = Color32::from_rgb(0x4a, 0x4a, 0x4a);
const IDLE_RIM: Color32 = Color32::from_rgb(0x3a, 0x3a, 0x3a);
const HOLE: Color32 = Color32::from_rgb(0x2a, 0x2a, 0x2a);

#[derive(Debug, Clone, Copy)]
enum Shape {
    Drum { diameter: f32 },
    Pedal,
}

struct KitPiece {
    category: DrumCategory,
    label: &'static str,
    center: Pos2,
    shape: Shape,
    color: Color32,
}

/// Piece centres in an 800x600 kit, seen from the drummer's seat.
const KIT: [KitPiece; 8] = [
    KitPiece {
        category: DrumCategory::Crash,
        label: "CRASH",
        center: Pos2::new(230.0, 130.0),
        shape: Shape::Drum { diameter: 140.0 },
        color: GREEN,
    },
    KitPiece {
        category: DrumCategory::Ride,
        label: "RIDE",
        center: Pos2::new(570.0, 130.0),
        shape: Shape::Drum { diameter: 140.0 },
        color: BLUE,
    },
    KitPiece {
        category: DrumCategory::HiHat,
        label: "HI-HAT",
        center: Pos2::new(140.0, 270.0),
        shape: Shape::Drum { diameter: 120.0 },
        color: YELLOW,
    },
    KitPiece {
        category: DrumCategory::HighTom,
        label: "HI TOM",
        center: Pos2::new(359.0, 235.0),
        shape: Shape::Drum { diameter: 110.0 },
        color: YELLOW,
    },
    KitPiece {
        category: DrumCategory::MidTom,
        label: "MID TOM",
        center: Pos2::new(441.0, 235.0),
        shape: Shape::Drum { diameter: 110.0 },
        color: BLUE,
    },
    KitPiece {
        category: DrumCategory::FloorTom,
        label: "LOW TOM",
        center: Pos2::new(615.0, 335.0),
        shape: Shape::Drum { diameter: 130.0 },
        color: GREEN,
    },
    KitPiece {
        category: DrumCategory::Snare,
        label: "SNARE",
        center: Pos2::new(400.0, 395.0),
        shape: Shape::Drum { diameter: 130.0 },
        color: RED,
    },
    KitPiece {
        category: DrumCategory::Kick,
        label: "KICK",
        center: Pos2::new(440.0, 522.0),
        shape: Shape::Pedal,
        color: ORANGE,
    },
];

#[derive(Debug, Clone, Copy)]
pub struct LoggedNote {
    pub event: NoteEvent,
    pub category: Option<DrumCategory>,
}

pub struct KitView {
    notes: Receiver<NoteEvent>,
    hits: ActiveHits,
    log: VecDeque<LoggedNote>,
    log_limit: usize,
}

impl KitView {
    pub fn new(notes: Receiver<NoteEvent>, settings: &Settings) -> Self {
        Self {
            notes,
            hits: ActiveHits::new(settings.kit_highlight()),
            log: VecDeque::with_capacity(settings.log_limit),
            log_limit: settings.log_limit,
        }
    }

    pub fn pump(&mut self, drum_map: &DrumMap, now: Instant) {
        self.hits.sweep(now);

        for event in self.notes.try_iter() {
            let category = drum_map.category(event.note);
            tracing::debug!(note = event.note, velocity = event.velocity, ?category, "hit");

            if let Some(category) = category {
                self.hits.spawn(category, now);
            }

            self.log.push_front(LoggedNote { event, category });
            self.log.truncate(self.log_limit);
        }
    }

    pub fn is_lit(&self, category: DrumCategory, now: Instant) -> bool {
        self.hits.is_active(category, now)
    }

    pub fn log(&self) -> impl Iterator<Item = &LoggedNote> {
        self.log.iter()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.hits.next_deadline()
    }

    pub fn show(&self, ui: &mut egui::Ui, now: Instant) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::hover());
        painter.rect_filled(response.rect, 12.0, Color32::from_rgb(0x22, 0x22, 0x22));

        let kit_rect = fit(response.rect, KIT_SIZE);
        let to_screen =
            egui::emath::RectTransform::from_to(Rect::from_min_size(Pos2::ZERO, KIT_SIZE), kit_rect);
        let scale = to_screen.scale().x;

        for piece in &KIT {
            let active = self.is_lit(piece.category, now);
            let center = to_screen.transform_pos(piece.center);
            match piece.shape {
                Shape::Drum { diameter } => {
                    draw_drum(&painter, piece, center, diameter * 0.5 * scale, active, scale)
                }
                Shape::Pedal => draw_pedal(&painter, piece, center, scale, active),
            }
        }
    }

    pub fn show_log(&self, ui: &mut egui::Ui) {
        ui.heading("MIDI Event Log");
        ui.separator();

        if self.log.is_empty() {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.weak(egui::RichText::new("Waiting for input...").italics());
            });
            return;
        }

        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                for entry in self.log() {
                    ui.horizontal(|ui| {
                        ui.monospace(format!("{:>3}", entry.event.note));
                        match entry.category {
                            Some(category) => ui.colored_label(
                                YELLOW,
                                egui::RichText::new(category.as_str().to_uppercase())
                                    .monospace()
                                    .strong(),
                            ),
                            None => ui.weak(egui::RichText::new("UNKNOWN").monospace()),
                        };
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            ui.small(format!("Vol: {}", entry.event.velocity));
                        });
                    });
                }
            });
    }
}

/// Largest rect with `size`'s aspect ratio centred in `outer`.
fn fit(outer: Rect, size: Vec2) -> Rect {
    let scale = (outer.width() / size.x).min(outer.height() / size.y);
    Rect::from_center_size(outer.center(), size * scale)
}

fn draw_drum(
    painter: &egui::Painter,
    piece: &KitPiece,
    center: Pos2,
    radius: f32,
    active: bool,
    scale: f32,
) {
    if active {
        let radius = radius * 1.05;
        painter.circle_filled(center, radius + 15.0 * scale, piece.color.gamma_multiply(0.4));
        painter.circle(center, radius, piece.color, Stroke::new(4.0 * scale, piece.color));
        painter.circle_filled(center, radius * 0.25, Color32::from_white_alpha(0x33));
    } else {
        painter.circle(center, radius, IDLE_FILL, Stroke::new(4.0 * scale, IDLE_RIM));
        painter.circle_filled(center, radius * 0.25, HOLE);
    }

    draw_label(painter, piece, center + Vec2::new(0.0, radius + 18.0 * scale), scale, active);
}

fn draw_pedal(painter: &egui::Painter, piece: &KitPiece, center: Pos2, scale: f32, active: bool) {
    let mut size = Vec2::new(56.0, 96.0) * scale;
    if active {
        size *= 1.05;
    }
    let rect = Rect::from_center_size(center, size);

    if active {
        painter.rect_filled(rect.expand(10.0 * scale), 10.0, piece.color.gamma_multiply(0.4));
        painter.rect_filled(rect, 8.0 * scale, piece.color);
    } else {
        painter.rect_filled(rect, 8.0 * scale, IDLE_FILL);
        painter.rect_stroke(
            rect,
            8.0 * scale,
            Stroke::new(4.0 * scale, IDLE_RIM),
            egui::StrokeKind::Inside,
        );
    }

    let bar = Rect::from_center_size(center, Vec2::new(size.x - 8.0 * scale, 8.0 * scale));
    let bar_color = if active {
        Color32::from_white_alpha(0x33)
    } else {
        HOLE
    };
    painter.rect_filled(bar, 2.0, bar_color);

    draw_label(painter, piece, rect.center_bottom() + Vec2::new(0.0, 16.0 * scale), scale, active);
}

fn draw_label(painter: &egui::Painter, piece: &KitPiece, pos: Pos2, scale: f32, active: bool) {
    let color = if active { piece.color } else { Color32::GRAY };
    painter.text(
        pos,
        egui::Align2::CENTER_CENTER,
        piece.label,
        egui::FontId::proportional((14.0 * scale).max(8.0)),
        color,
    );
}
