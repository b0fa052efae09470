// Precipitation domain models and the nowcast color legend
use super::geo::{GeoPoint, PixelOffset, TileAddress};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Decoded value of a nowcast pixel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intensity {
    /// Lower bound of the legend band, in mm/h
    Rate(f64),
    /// Transparent background: no precipitation echo
    NoEcho,
    /// Color absent from the legend (anti-aliasing, rendering artifacts)
    Unknown,
}

/// Legend of the high-resolution precipitation nowcast (`hrpns`) tiles.
/// Matching is exact on all four channels.
pub static INTENSITY_LEGEND: [(Color, Intensity); 10] = [
    (Color::new(255, 255, 255, 0), Intensity::NoEcho),
    (Color::new(0, 0, 0, 0), Intensity::NoEcho),
    (Color::new(242, 242, 255, 255), Intensity::Rate(0.0)),
    (Color::new(160, 210, 255, 255), Intensity::Rate(1.0)),
    (Color::new(33, 140, 255, 255), Intensity::Rate(5.0)),
    (Color::new(0, 65, 255, 255), Intensity::Rate(10.0)),
    (Color::new(250, 245, 0, 255), Intensity::Rate(20.0)),
    (Color::new(255, 153, 0, 255), Intensity::Rate(30.0)),
    (Color::new(255, 40, 0, 255), Intensity::Rate(50.0)),
    (Color::new(180, 0, 104, 255), Intensity::Rate(80.0)),
];

pub fn classify(color: Color) -> Intensity {
    INTENSITY_LEGEND
        .iter()
        .find(|(legend_color, _)| *legend_color == color)
        .map(|(_, intensity)| *intensity)
        .unwrap_or(Intensity::Unknown)
}

/// One forecast frame, identified by issuance and target time tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestepRef {
    pub basetime: String,
    pub validtime: String,
}

impl TimestepRef {
    pub fn new(basetime: String, validtime: String) -> Self {
        Self {
            basetime,
            validtime,
        }
    }

    /// Order by validtime; digit tokens compare numerically
    pub fn cmp_validtime(&self, other: &Self) -> Ordering {
        compare_tokens(&self.validtime, &other.validtime)
    }

    pub fn valid_at(&self) -> Option<DateTime<Utc>> {
        parse_token(&self.validtime)
    }

    pub fn base_at(&self) -> Option<DateTime<Utc>> {
        parse_token(&self.basetime)
    }
}

fn compare_tokens(a: &str, b: &str) -> Ordering {
    let numeric = |s: &str| !s.is_empty() && s.bytes().all(|c| c.is_ascii_digit());
    if numeric(a) && numeric(b) {
        let (a, b) = (a.trim_start_matches('0'), b.trim_start_matches('0'));
        a.len().cmp(&b.len()).then_with(|| a.cmp(b))
    } else {
        a.cmp(b)
    }
}

/// Tokens look like `20231018123500` (UTC)
fn parse_token(token: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(token, "%Y%m%d%H%M%S")
        .ok()
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReadingOutcome {
    Classified { color: Color, intensity: Intensity },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrecipitationReading {
    pub timestep: TimestepRef,
    pub outcome: ReadingOutcome,
}

impl PrecipitationReading {
    pub fn classified(timestep: TimestepRef, color: Color) -> Self {
        Self {
            timestep,
            outcome: ReadingOutcome::Classified {
                color,
                intensity: classify(color),
            },
        }
    }

    pub fn failed(timestep: TimestepRef, reason: String) -> Self {
        Self {
            timestep,
            outcome: ReadingOutcome::Failed { reason },
        }
    }

    /// A failed fetch reads as `Unknown`
    pub fn intensity(&self) -> Intensity {
        match &self.outcome {
            ReadingOutcome::Classified { intensity, .. } => *intensity,
            ReadingOutcome::Failed { .. } => Intensity::Unknown,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, ReadingOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrecipitationSeries {
    pub point: GeoPoint,
    /// Tile and in-tile pixel sampled for every frame
    pub tile: TileAddress,
    pub pixel: PixelOffset,
    pub readings: Vec<PrecipitationReading>,
}
