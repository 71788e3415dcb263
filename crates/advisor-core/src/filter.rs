//! Watch filter selections.
//!
//! Each filter draws from a fixed, closed option set and defaults to `Any`.
//! Input that matches no option is coerced to `Any` rather than rejected.

use std::collections::HashMap;

use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Common behavior of every filter's option enum.
pub trait FilterOption: Copy + Default + PartialEq + IntoEnumIterator + Into<&'static str> {
    /// Short keywords accepted in addition to the display label.
    fn keywords(self) -> &'static [&'static str];

    /// The display label, as shown in the UI and interpolated into the instruction.
    fn label(self) -> &'static str {
        self.into()
    }

    /// Matches `input` against labels and keywords, case-insensitively.
    ///
    /// Unknown input yields the default (`Any`).
    fn coerce(input: &str) -> Self {
        let needle = input.trim();
        Self::iter()
            .find(|option| {
                option.label().eq_ignore_ascii_case(needle)
                    || option
                        .keywords()
                        .iter()
                        .any(|keyword| keyword.eq_ignore_ascii_case(needle))
            })
            .unwrap_or_default()
    }

    /// Every option label in display order.
    fn labels() -> Vec<&'static str> {
        Self::iter().map(FilterOption::label).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, IntoStaticStr, Display)]
pub enum Gender {
    #[default]
    #[strum(to_string = "Any")]
    Any,
    #[strum(to_string = "Men's")]
    Mens,
    #[strum(to_string = "Ladies'")]
    Ladies,
    #[strum(to_string = "Unisex")]
    Unisex,
}

impl FilterOption for Gender {
    fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Any => &["any"],
            Self::Mens => &["men", "mens", "male"],
            Self::Ladies => &["ladies", "women", "womens", "female"],
            Self::Unisex => &["unisex"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, IntoStaticStr, Display)]
pub enum PriceRange {
    #[default]
    #[strum(to_string = "Any")]
    Any,
    #[strum(to_string = "$0 - $1,000 (Entry)")]
    Entry,
    #[strum(to_string = "$1,000 - $5,000 (Mid-Range)")]
    MidRange,
    #[strum(to_string = "$5,000 - $15,000 (Luxury)")]
    Luxury,
    #[strum(to_string = "$15,000+ (High-End)")]
    HighEnd,
}

impl FilterOption for PriceRange {
    fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Any => &["any"],
            Self::Entry => &["entry"],
            Self::MidRange => &["mid", "mid-range", "midrange"],
            Self::Luxury => &["luxury"],
            Self::HighEnd => &["high", "high-end", "highend"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, IntoStaticStr, Display)]
pub enum CaseSize {
    #[default]
    #[strum(to_string = "Any")]
    Any,
    #[strum(to_string = "34mm or less (Small)")]
    Small,
    #[strum(to_string = "35mm - 38mm (Classic)")]
    Classic,
    #[strum(to_string = "39mm - 42mm (Modern)")]
    Modern,
    #[strum(to_string = "43mm+ (Oversized)")]
    Oversized,
}

impl FilterOption for CaseSize {
    fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Any => &["any"],
            Self::Small => &["small"],
            Self::Classic => &["classic"],
            Self::Modern => &["modern"],
            Self::Oversized => &["oversized", "large"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, IntoStaticStr, Display)]
pub enum WatchType {
    #[default]
    #[strum(to_string = "Any")]
    Any,
    #[strum(to_string = "Diver")]
    Diver,
    #[strum(to_string = "GMT/Travel Time")]
    Gmt,
    #[strum(to_string = "Dress Watch")]
    Dress,
    #[strum(to_string = "Chronograph")]
    Chronograph,
    #[strum(to_string = "Everyday (GADA)")]
    Everyday,
    #[strum(to_string = "Field Watch")]
    Field,
    #[strum(to_string = "Pilot/Aviation")]
    Pilot,
}

impl FilterOption for WatchType {
    fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Any => &["any"],
            Self::Diver => &["diver", "dive"],
            Self::Gmt => &["gmt", "travel"],
            Self::Dress => &["dress"],
            Self::Chronograph => &["chronograph", "chrono"],
            Self::Everyday => &["everyday", "gada"],
            Self::Field => &["field"],
            Self::Pilot => &["pilot", "aviation"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, IntoStaticStr, Display)]
pub enum MovementType {
    #[default]
    #[strum(to_string = "Any")]
    Any,
    #[strum(to_string = "Automatic (Self-Winding)")]
    Automatic,
    #[strum(to_string = "Manual Wind (Mechanical)")]
    ManualWind,
    #[strum(to_string = "Quartz")]
    Quartz,
    #[strum(to_string = "Spring Drive (Hybrid)")]
    SpringDrive,
}

impl FilterOption for MovementType {
    fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Any => &["any"],
            Self::Automatic => &["automatic", "auto"],
            Self::ManualWind => &["manual", "hand-wound"],
            Self::Quartz => &["quartz"],
            Self::SpringDrive => &["spring", "spring-drive", "springdrive"],
        }
    }
}

/// Names of the five filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display)]
#[strum(ascii_case_insensitive)]
pub enum FilterKind {
    #[strum(to_string = "gender")]
    Gender,
    #[strum(to_string = "price", serialize = "price-range", serialize = "price_range")]
    Price,
    #[strum(
        to_string = "size",
        serialize = "case-size",
        serialize = "case_size",
        serialize = "case"
    )]
    CaseSize,
    #[strum(to_string = "type", serialize = "watch-type", serialize = "watch_type")]
    WatchType,
    #[strum(to_string = "movement", serialize = "movement-type", serialize = "movement_type")]
    Movement,
}

impl FilterKind {
    /// Human-readable title, as shown next to the selector.
    pub fn title(self) -> &'static str {
        match self {
            Self::Gender => "Gender",
            Self::Price => "Price Range",
            Self::CaseSize => "Case Size (Diameter)",
            Self::WatchType => "Watch Type/Complication",
            Self::Movement => "Movement Type",
        }
    }

    /// The option labels for this filter.
    pub fn options(self) -> Vec<&'static str> {
        match self {
            Self::Gender => Gender::labels(),
            Self::Price => PriceRange::labels(),
            Self::CaseSize => CaseSize::labels(),
            Self::WatchType => WatchType::labels(),
            Self::Movement => MovementType::labels(),
        }
    }
}

/// The user's current filter choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterSelection {
    pub gender: Gender,
    pub price: PriceRange,
    pub case_size: CaseSize,
    pub watch_type: WatchType,
    pub movement: MovementType,
}

impl FilterSelection {
    /// Builds a selection from `filter name -> value` pairs.
    ///
    /// Unknown filter names are ignored and unknown values become `Any`.
    pub fn from_map(values: &HashMap<String, String>) -> Self {
        let mut selection = Self::default();
        for (name, value) in values {
            match name.parse::<FilterKind>() {
                Ok(kind) => {
                    selection.set(kind, value);
                }
                Err(_) => tracing::debug!(filter = %name, "Ignoring unknown filter"),
            }
        }
        selection
    }

    /// Sets one filter from free-form input, coercing unknown values to `Any`.
    pub fn set(&mut self, kind: FilterKind, value: &str) -> &mut Self {
        match kind {
            FilterKind::Gender => self.gender = Gender::coerce(value),
            FilterKind::Price => self.price = PriceRange::coerce(value),
            FilterKind::CaseSize => self.case_size = CaseSize::coerce(value),
            FilterKind::WatchType => self.watch_type = WatchType::coerce(value),
            FilterKind::Movement => self.movement = MovementType::coerce(value),
        }
        self
    }

    /// The label currently selected for `kind`.
    pub fn get(&self, kind: FilterKind) -> &'static str {
        match kind {
            FilterKind::Gender => self.gender.label(),
            FilterKind::Price => self.price.label(),
            FilterKind::CaseSize => self.case_size.label(),
            FilterKind::WatchType => self.watch_type.label(),
            FilterKind::Movement => self.movement.label(),
        }
    }

    /// `(filter, label)` pairs in display order.
    pub fn entries(&self) -> Vec<(FilterKind, &'static str)> {
        FilterKind::iter().map(|kind| (kind, self.get(kind))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_any() {
        let selection = FilterSelection::default();
        assert!(selection.entries().iter().all(|(_, label)| *label == "Any"));
    }

    #[test]
    fn test_set_accepts_label_and_keyword() {
        let mut selection = FilterSelection::default();
        selection
            .set(FilterKind::WatchType, "gmt/travel time")
            .set(FilterKind::Movement, "auto")
            .set(FilterKind::Gender, "Men's");

        assert_eq!(selection.watch_type, WatchType::Gmt);
        assert_eq!(selection.movement, MovementType::Automatic);
        assert_eq!(selection.gender, Gender::Mens);
    }

    #[test]
    fn test_unknown_value_coerces_to_any() {
        let mut selection = FilterSelection::default();
        selection.set(FilterKind::Price, "luxury");
        selection.set(FilterKind::Price, "priceless");
        assert_eq!(selection.price, PriceRange::Any);
    }

    #[test]
    fn test_from_map_ignores_unknown_names() {
        let values = HashMap::from([
            ("case-size".to_string(), "Classic".to_string()),
            ("strap".to_string(), "NATO".to_string()),
            ("movement".to_string(), "tourbillon".to_string()),
        ]);
        let selection = FilterSelection::from_map(&values);

        assert_eq!(selection.case_size, CaseSize::Classic);
        assert_eq!(selection.movement, MovementType::Any);
        assert_eq!(selection.gender, Gender::Any);
    }

    #[test]
    fn test_options_start_with_any() {
        for kind in FilterKind::iter() {
            let options = kind.options();
            assert_eq!(options[0], "Any", "{kind} should default to Any");
            assert!(options.len() > 1);
        }
    }
}
