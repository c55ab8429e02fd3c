//! Synthetic perception feed.
//!
//! Stands in for the upstream perception stack: keeps a set of moving
//! objects around a map anchor and emits one `DetectionArray` per tick.
//! Everything is derived from a single seed, so a (seed, scenario) pair
//! always produces the same message sequence.

use crate::scenarios::ScenarioId;
use nalgebra::Vector3;
use percview_env::{Detection, DetectionArray, GeoPosition};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f64::consts::TAU;

/// Seconds for one full swing of the object count between min and max.
const COUNT_PERIOD_SECS: f64 = 6.0;

/// Spawn radius around the anchor, in meters.
const SPAWN_RADIUS: f64 = 40.0;

/// A simulated object as the perception stack would report it.
#[derive(Debug, Clone)]
pub struct SimObject {
    pub id: u32,
    pub label: &'static str,
    pub gps: GeoPosition,

    /// Degrees clockwise from map north
    pub heading: f64,

    /// Ground speed in m/s
    pub speed: f64,

    pub scale: Vector3<f64>,
}

impl SimObject {
    fn step(&mut self, dt: f64) {
        let h = self.heading.to_radians();
        self.gps.northing += self.speed * h.cos() * dt;
        self.gps.easting += self.speed * h.sin() * dt;
    }

    fn to_detection(&self, score: f32) -> Detection {
        Detection::new(self.label, self.gps, self.heading, self.scale)
            .with_id(self.id)
            .with_score(score)
    }
}

/// Box extents [width, height, length] for a label.
fn extents_for(label: &str) -> Vector3<f64> {
    match label {
        "Car" => Vector3::new(1.9, 1.6, 4.6),
        "Pedestrian" => Vector3::new(0.6, 1.75, 0.6),
        "Bicycle" => Vector3::new(0.7, 1.7, 1.8),
        _ => Vector3::new(1.0, 1.0, 1.0),
    }
}

fn speed_range(label: &str) -> (f64, f64) {
    match label {
        "Car" => (3.0, 14.0),
        "Bicycle" => (2.0, 6.0),
        "Pedestrian" => (0.5, 1.8),
        _ => (0.0, 3.0),
    }
}

/// Deterministic generator of detection messages for a scenario.
pub struct PerceptionFeed {
    scenario: ScenarioId,
    rng: ChaCha8Rng,
    anchor: GeoPosition,
    objects: Vec<SimObject>,
    next_id: u32,
    frame_id: u64,
    time: f64,
}

impl PerceptionFeed {
    /// Creates a feed whose objects move around `anchor`.
    pub fn new(scenario: ScenarioId, seed: u64, anchor: GeoPosition) -> Self {
        Self {
            scenario,
            rng: ChaCha8Rng::seed_from_u64(seed),
            anchor,
            objects: Vec::new(),
            next_id: 0,
            frame_id: 0,
            time: 0.0,
        }
    }

    /// Object count the scenario asks for at time `t`.
    pub fn target_count(&self, t: f64) -> usize {
        let (min, max) = self.scenario.count_range();
        let phase = 0.5 - 0.5 * (TAU * t / COUNT_PERIOD_SECS).cos();
        min + ((max - min) as f64 * phase).round() as usize
    }

    /// Advances by `dt` seconds and returns the next message.
    pub fn next_array(&mut self, dt: f64) -> DetectionArray {
        for object in &mut self.objects {
            object.step(dt);
        }

        let target = self.target_count(self.time);
        while self.objects.len() > target {
            // Oldest objects leave first
            self.objects.remove(0);
        }
        while self.objects.len() < target {
            let object = self.spawn();
            self.objects.push(object);
        }

        let detections = self
            .objects
            .iter()
            .map(|o| {
                let score = self.rng.gen_range(0.4f32..1.0);
                o.to_detection(score)
            })
            .collect();

        let array = DetectionArray::new(self.frame_id, self.time, detections);
        self.frame_id += 1;
        self.time += dt;
        array
    }

    fn spawn(&mut self) -> SimObject {
        let labels = self.scenario.labels();
        let label = labels[self.rng.gen_range(0..labels.len())];
        let (min_speed, max_speed) = speed_range(label);

        let id = self.next_id;
        self.next_id += 1;

        SimObject {
            id,
            label,
            gps: GeoPosition::new(
                self.anchor.northing + self.rng.gen_range(-SPAWN_RADIUS..SPAWN_RADIUS),
                self.anchor.easting + self.rng.gen_range(-SPAWN_RADIUS..SPAWN_RADIUS),
                self.anchor.altitude + self.rng.gen_range(-0.2..0.2),
            ),
            heading: self.rng.gen_range(0.0..360.0),
            speed: self.rng.gen_range(min_speed..=max_speed),
            scale: extents_for(label),
        }
    }
}
