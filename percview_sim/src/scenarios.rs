//! Synthetic perception scenarios.

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// Mixed traffic: cars, pedestrians and cyclists, count oscillating 2-12
    Intersection,

    /// Dense pedestrian crowd, 20-60 objects
    Crowd,

    /// Only labels outside the known table
    UnknownClasses,

    /// 0-2 objects, with frequent empty messages
    Sparse,

    /// Intersection traffic with the map origin missing for a window of frames
    OriginDropout,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::Intersection,
            ScenarioId::Crowd,
            ScenarioId::UnknownClasses,
            ScenarioId::Sparse,
            ScenarioId::OriginDropout,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Intersection => "intersection",
            ScenarioId::Crowd => "crowd",
            ScenarioId::UnknownClasses => "unknown_classes",
            ScenarioId::Sparse => "sparse",
            ScenarioId::OriginDropout => "origin_dropout",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::Intersection => "Mixed traffic, 2-12 objects, all known classes",
            ScenarioId::Crowd => "20-60 pedestrians crossing a plaza",
            ScenarioId::UnknownClasses => "Drones, cones and unlabeled blobs (fallback color)",
            ScenarioId::Sparse => "0-2 objects with frequent empty messages",
            ScenarioId::OriginDropout => "Mixed traffic, map origin missing for frames 30-44",
        }
    }

    /// Labels drawn from when spawning objects.
    pub fn labels(&self) -> &'static [&'static str] {
        match self {
            ScenarioId::Intersection | ScenarioId::OriginDropout | ScenarioId::Sparse => {
                &["Car", "Car", "Car", "Pedestrian", "Bicycle"]
            }
            ScenarioId::Crowd => &["Pedestrian", "Pedestrian", "Pedestrian", "Bicycle"],
            ScenarioId::UnknownClasses => &["drone", "TrafficCone", "Unknown", ""],
        }
    }

    /// Object count range `[min, max]` the scenario oscillates over.
    pub fn count_range(&self) -> (usize, usize) {
        match self {
            ScenarioId::Intersection | ScenarioId::OriginDropout => (2, 12),
            ScenarioId::Crowd => (20, 60),
            ScenarioId::UnknownClasses => (1, 6),
            ScenarioId::Sparse => (0, 2),
        }
    }

    /// Frames (half-open range) during which the map origin is missing.
    pub fn origin_dropout(&self) -> Option<std::ops::Range<u64>> {
        match self {
            ScenarioId::OriginDropout => Some(30..45),
            _ => None,
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "intersection" => Ok(ScenarioId::Intersection),
            "crowd" => Ok(ScenarioId::Crowd),
            "unknown_classes" | "unknown" => Ok(ScenarioId::UnknownClasses),
            "sparse" => Ok(ScenarioId::Sparse),
            "origin_dropout" | "dropout" => Ok(ScenarioId::OriginDropout),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}
