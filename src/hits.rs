use crate::events::DrumCategory;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitMarker {
    pub id: u64,
    pub category: DrumCategory,
    pub spawned_at: Instant,
    pub expires_at: Instant,
}

impl HitMarker {
    pub fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }

    /// Fraction of the marker's lifetime elapsed at `now`, in `0.0..=1.0`.
    pub fn progress(&self, now: Instant) -> f32 {
        let total = self.expires_at.saturating_duration_since(self.spawned_at);
        if total.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.spawned_at);
        (elapsed.as_secs_f32() / total.as_secs_f32()).min(1.0)
    }
}

/// Transient highlights. Every marker carries its own deadline and nothing
/// but the deadline removes it.
#[derive(Debug)]
pub struct ActiveHits {
    delay: Duration,
    next_id: u64,
    markers: Vec<HitMarker>,
}

impl ActiveHits {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_id: 0,
            markers: Vec::new(),
        }
    }

    pub fn spawn(&mut self, category: DrumCategory, now: Instant) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.markers.push(HitMarker {
            id,
            category,
            spawned_at: now,
            expires_at: now + self.delay,
        });
        id
    }

    pub fn is_active(&self, category: DrumCategory, now: Instant) -> bool {
        self.markers
            .iter()
            .any(|marker| marker.category == category && marker.is_live(now))
    }

    pub fn live(&self, now: Instant) -> impl Iterator<Item = &HitMarker> {
        self.markers.iter().filter(move |marker| marker.is_live(now))
    }

    /// Drops expired markers and returns how many went.
    pub fn sweep(&mut self, now: Instant) -> usize {
        let before = self.markers.len();
        self.markers.retain(|marker| marker.is_live(now));
        before - self.markers.len()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.markers.iter().map(|marker| marker.expires_at).min()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}
