//! Label → color classification.
//!
//! Exact, case-sensitive match on the upstream tag. Both the Apollo tag set
//! (`Car`, `Pedestrian`, `Bicycle`) and the generic one (`vehicle`,
//! `pedestrian`, `cyclist`) are recognised. Everything else falls back to
//! magenta so that every detection can still be drawn.

use percview_env::Rgba;

/// Display class of a detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectionClass {
    Vehicle,
    Pedestrian,
    Cyclist,
    /// Any label outside the known table
    Unknown,
}

impl DetectionClass {
    /// Maps an upstream label to its class.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Car" | "vehicle" => DetectionClass::Vehicle,
            "Pedestrian" | "pedestrian" => DetectionClass::Pedestrian,
            "Bicycle" | "cyclist" => DetectionClass::Cyclist,
            _ => DetectionClass::Unknown,
        }
    }

    pub fn color(self) -> Rgba {
        match self {
            DetectionClass::Vehicle => Rgba::GREEN,
            DetectionClass::Pedestrian => Rgba::YELLOW,
            DetectionClass::Cyclist => Rgba::CYAN,
            DetectionClass::Unknown => Rgba::MAGENTA,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DetectionClass::Vehicle => "vehicle",
            DetectionClass::Pedestrian => "pedestrian",
            DetectionClass::Cyclist => "cyclist",
            DetectionClass::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for DetectionClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Display color for a label. Never fails.
pub fn classify(label: &str) -> Rgba {
    DetectionClass::from_label(label).color()
}
