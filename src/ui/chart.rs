use crate::config::Settings;
use crate::events::{DrumCategory, NoteEvent};
use crate::hits::ActiveHits;
use crate::mapping::DrumMap;
use crossbeam::channel::Receiver;
use eframe::egui::{self, Color32, Pos2, Rect, Stroke, Vec2};
use std::time::Instant;

const OVERLAY: Color32 = Color32::from_rgb(59, 130, 246);
const STAFF_LINES: usize = 5;

/// Vertical position of a category's overlay bar, as a fraction of the
/// chart height measured from the top. Cymbals sit above the staff and the
/// kick below it, the way drum notation places them.
pub fn lane_position(category: DrumCategory) -> f32 {
    match category {
        DrumCategory::Crash | DrumCategory::Ride => 0.10,
        DrumCategory::HiHat => 0.30,
        DrumCategory::HighTom => 0.40,
        DrumCategory::MidTom => 0.50,
        DrumCategory::Snare => 0.60,
        DrumCategory::FloorTom => 0.70,
        DrumCategory::Kick => 0.90,
    }
}

pub struct ChartView {
    notes: Receiver<NoteEvent>,
    hits: ActiveHits,
}

impl ChartView {
    pub fn new(notes: Receiver<NoteEvent>, settings: &Settings) -> Self {
        Self {
            notes,
            hits: ActiveHits::new(settings.overlay_highlight()),
        }
    }

    pub fn pump(&mut self, drum_map: &DrumMap, now: Instant) {
        self.hits.sweep(now);
        for event in self.notes.try_iter() {
            if let Some(category) = drum_map.category(event.note) {
                self.hits.spawn(category, now);
            }
        }
    }

    #[cfg(test)]
    fn overlay_count(&self, now: Instant) -> usize {
        self.hits.live(now).count()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.hits.next_deadline()
    }

    pub fn show(&self, ui: &mut egui::Ui, now: Instant) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::hover());
        let rect = response.rect;
        painter.rect_filled(rect, 8.0, Color32::WHITE);

        draw_staff(&painter, rect);

        for marker in self.hits.live(now) {
            let y = rect.top() + rect.height() * lane_position(marker.category);
            let bar = Rect::from_min_size(Pos2::new(rect.left(), y), Vec2::new(rect.width(), 32.0));
            let fade = 1.0 - marker.progress(now);
            painter.rect_filled(bar.expand(6.0), 4.0, OVERLAY.gamma_multiply(0.25 * fade));
            painter.rect_filled(bar, 4.0, OVERLAY.gamma_multiply(0.5 * fade));
        }
    }
}

fn draw_staff(painter: &egui::Painter, rect: Rect) {
    let margin = 24.0;
    let top = rect.top() + rect.height() * 0.30;
    let bottom = rect.top() + rect.height() * 0.70;
    let spacing = (bottom - top) / (STAFF_LINES - 1) as f32;
    let stroke = Stroke::new(1.0, Color32::DARK_GRAY);

    for line in 0..STAFF_LINES {
        let y = top + spacing * line as f32;
        painter.line_segment(
            [Pos2::new(rect.left() + margin, y), Pos2::new(rect.right() - margin, y)],
            stroke,
        );
    }

    // Percussion clef.
    let clef_x = rect.left() + margin + 16.0;
    for offset in [-4.0, 4.0] {
        painter.line_segment(
            [
                Pos2::new(clef_x + offset, top + spacing),
                Pos2::new(clef_x + offset, bottom - spacing),
            ],
            Stroke::new(3.0, Color32::DARK_GRAY),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::NoteBus;
    use std::time::Duration;

    fn note(note: u8) -> NoteEvent {
        NoteEvent {
            command: 9,
            channel: 9,
            note,
            velocity: 100,
            timestamp_us: 0,
        }
    }

    #[test]
    fn lanes_are_ordered_top_to_bottom() {
        assert!(lane_position(DrumCategory::Crash) < lane_position(DrumCategory::HiHat));
        assert!(lane_position(DrumCategory::HiHat) < lane_position(DrumCategory::Snare));
        assert!(lane_position(DrumCategory::Snare) < lane_position(DrumCategory::Kick));
        for category in DrumCategory::ALL {
            let y = lane_position(category);
            assert!((0.0..=1.0).contains(&y));
        }
    }

    #[test]
    fn overlays_stack_and_expire_after_delay() {
        let bus = NoteBus::new();
        let mut view = ChartView::new(bus.subscribe(), &Settings::default());
        let map = DrumMap::general_midi();
        let now = Instant::now();

        bus.publish(note(36));
        bus.publish(note(36));
        bus.publish(note(60));
        view.pump(&map, now);

        assert_eq!(view.overlay_count(now), 2);
        assert_eq!(view.overlay_count(now + Duration::from_millis(199)), 2);
        assert_eq!(view.overlay_count(now + Duration::from_millis(200)), 0);
    }
}
