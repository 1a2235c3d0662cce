//! Category classification for inventory rows
//!
//! Maps the free-text category/component columns of a customer sheet onto the
//! fixed set of part categories understood by the import tool.

use std::fmt;
use std::str::FromStr;

/// Normalized part category label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Category {
    Esc,
    Battery,
    Airframe,
    FlightController,
    Accessory,
    Motor,
    Radio,
    Sensor,
}

impl Category {
    /// Every label, in declaration order
    pub const ALL: [Category; 8] = [
        Category::Esc,
        Category::Battery,
        Category::Airframe,
        Category::FlightController,
        Category::Accessory,
        Category::Motor,
        Category::Radio,
        Category::Sensor,
    ];

    /// Label as written to the `category` column
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Esc => "esc",
            Category::Battery => "battery",
            Category::Airframe => "airframe",
            Category::FlightController => "flight_controller",
            Category::Accessory => "accessory",
            Category::Motor => "motor",
            Category::Radio => "radio",
            Category::Sensor => "sensor",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_lowercase();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == label)
            .ok_or_else(|| format!("Unknown category label: {}", s))
    }
}

/// Component keywords checked in order against the normalized component.
///
/// Matching is substring containment, so order is the tie-break: the first
/// keyword found wins ("motor frame" is an airframe, not a motor).
pub const COMPONENT_KEYWORDS: &[(&str, Category)] = &[
    ("esc", Category::Esc),
    ("battery", Category::Battery),
    ("frame", Category::Airframe),
    ("controller", Category::FlightController),
    ("propellers", Category::Accessory),
    ("props", Category::Accessory),
    ("motors", Category::Motor),
    ("motor", Category::Motor),
    ("radio", Category::Radio),
    ("receiver", Category::Radio),
    ("tools", Category::Accessory),
    ("glue", Category::Accessory),
    ("misc", Category::Accessory),
    ("parts", Category::Accessory),
    ("camera", Category::Sensor),
    ("vtx", Category::Accessory),
    ("antenna", Category::Accessory),
    ("filament", Category::Accessory),
    ("wire", Category::Accessory),
    ("activator", Category::Accessory),
];

/// Classify a row from its raw category and component text.
///
/// Case and surrounding whitespace are ignored. Never fails: a component that
/// matches no keyword falls back on the category column.
///
/// # Example
///
/// ```
/// use inventory_convert::category::{classify, Category};
///
/// assert_eq!(classify("UAS", "ESC"), Category::Esc);
/// assert_eq!(classify("UAS", "Brushless Motors"), Category::Motor);
/// assert_eq!(classify("FAB", "Filament"), Category::Accessory);
/// ```
pub fn classify(category: &str, component: &str) -> Category {
    let category = category.trim().to_lowercase();
    let component = component.trim().to_lowercase();

    if let Some((_, label)) = COMPONENT_KEYWORDS
        .iter()
        .find(|(keyword, _)| component.contains(keyword))
    {
        return *label;
    }

    fallback(&category)
}

// All arms currently agree.
fn fallback(category: &str) -> Category {
    match category {
        "uas" => Category::Accessory,
        "fab" => Category::Accessory,
        _ => Category::Accessory,
    }
}
