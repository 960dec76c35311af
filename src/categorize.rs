use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use strum_macros::{AsRefStr, Display};
use utoipa::ToSchema;

/// Display grouping of a tracked object, used for coloring and filtering.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    Stations,
    Gps,
    Weather,
    Communications,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Stations,
        Category::Gps,
        Category::Weather,
        Category::Communications,
        Category::Other,
    ];

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_ref().eq_ignore_ascii_case(label))
    }
}

/// Classify an object from its name and the catalog group it came from.
///
/// Rules are case-insensitive and evaluated in priority order; the first
/// match wins.
pub fn categorize(name: &str, group: &str) -> Category {
    let name = name.to_lowercase();
    let group = group.trim();

    if group.eq_ignore_ascii_case("stations") || name.contains("iss") || name.contains("zarya") {
        Category::Stations
    } else if group.eq_ignore_ascii_case("gps-ops") {
        Category::Gps
    } else if group.eq_ignore_ascii_case("weather") {
        Category::Weather
    } else if name.contains("starlink") || name.contains("oneweb") {
        Category::Communications
    } else {
        Category::Other
    }
}

/// 24-bit display color, serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(u32);

impl Rgb {
    pub const fn new(hex: u32) -> Self {
        Rgb(hex & 0x00ff_ffff)
    }

    pub fn hex(&self) -> u32 {
        self.0
    }

    pub fn components(&self) -> [u8; 3] {
        [(self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub fn color_for(category: Category) -> Rgb {
    match category {
        Category::Stations => Rgb::new(0xff6b6b),
        Category::Gps => Rgb::new(0x4ecdc4),
        Category::Weather => Rgb::new(0x45b7d1),
        Category::Communications => Rgb::new(0x96ceb4),
        Category::Other => Rgb::new(0xdda0dd),
    }
}

/// Color for a textual category label; unknown labels get the `other` color.
pub fn color_for_label(label: &str) -> Rgb {
    color_for(Category::from_label(label).unwrap_or(Category::Other))
}
