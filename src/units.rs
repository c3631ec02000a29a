//! # Unit Conversion Module
//!
//! Normalizes unit spellings and converts quantities between units of the same
//! physical dimension.
//!
//! ## Core Concepts
//!
//! - **Canonical unit**: one spelling per unit (`"kilo"`, `"kgs"` -> `"kg"`)
//! - **Unit class**: mass, volume or count, each with a base unit (g, ml, pcs)
//! - **Bridge**: mass and volume convert 1:1 (1 g ~ 1 ml) as a cooking approximation
//!
//! Conversion is total. Unknown units convert with a factor of 1 and a refused
//! cross-dimension conversion hands back the original amount.
//!
//! ## Usage
//!
//! ```rust
//! use wastenot::units::{convert, normalize_unit};
//!
//! assert_eq!(normalize_unit(" Kilos "), "kg");
//! assert_eq!(convert(1.5, "kg", "g"), 1500.0);
//! ```

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

/// Physical dimension of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitClass {
    /// Weight, base unit grams
    Mass,
    /// Volume, base unit milliliters
    Volume,
    /// Countable items, base unit pieces
    Count,
}

impl UnitClass {
    /// Base unit of this class
    pub fn base_unit(&self) -> &'static str {
        match self {
            UnitClass::Mass => "g",
            UnitClass::Volume => "ml",
            UnitClass::Count => "pcs",
        }
    }
}

impl fmt::Display for UnitClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitClass::Mass => write!(f, "mass"),
            UnitClass::Volume => write!(f, "volume"),
            UnitClass::Count => write!(f, "count"),
        }
    }
}

lazy_static! {
    /// Spelling variants mapped to their canonical unit
    static ref UNIT_SYNONYMS: HashMap<&'static str, &'static str> = {
        let mut map = HashMap::new();

        // Mass
        for alias in ["g", "gr", "gram", "grams", "gramme", "grammes"] {
            map.insert(alias, "g");
        }
        for alias in ["kg", "kgs", "kilo", "kilos", "kilogram", "kilograms", "kilogramme", "kilogrammes"] {
            map.insert(alias, "kg");
        }
        for alias in ["mg", "milligram", "milligrams"] {
            map.insert(alias, "mg");
        }
        for alias in ["oz", "ounce", "ounces"] {
            map.insert(alias, "oz");
        }
        for alias in ["lb", "lbs", "pound", "pounds"] {
            map.insert(alias, "lb");
        }

        // Volume
        for alias in ["ml", "milliliter", "milliliters", "millilitre", "millilitres", "cc"] {
            map.insert(alias, "ml");
        }
        for alias in ["l", "liter", "liters", "litre", "litres", "ltr"] {
            map.insert(alias, "l");
        }
        for alias in ["cl", "centiliter", "centiliters", "centilitre", "centilitres"] {
            map.insert(alias, "cl");
        }
        for alias in ["dl", "deciliter", "deciliters", "decilitre", "decilitres"] {
            map.insert(alias, "dl");
        }
        for alias in ["tsp", "teaspoon", "teaspoons", "cac"] {
            map.insert(alias, "tsp");
        }
        for alias in ["tbsp", "tablespoon", "tablespoons", "tbs", "cas"] {
            map.insert(alias, "tbsp");
        }
        for alias in ["cup", "cups", "tasse", "tasses"] {
            map.insert(alias, "cup");
        }
        for alias in ["fl oz", "floz", "fluid ounce", "fluid ounces"] {
            map.insert(alias, "fl oz");
        }
        for alias in ["pint", "pints", "pt"] {
            map.insert(alias, "pint");
        }
        for alias in ["quart", "quarts", "qt"] {
            map.insert(alias, "quart");
        }
        for alias in ["gallon", "gallons", "gal"] {
            map.insert(alias, "gallon");
        }

        // Count
        for alias in ["pcs", "pc", "piece", "pieces", "item", "items", "unit", "units", "each", "pièce", "pièces"] {
            map.insert(alias, "pcs");
        }
        for alias in ["dozen", "doz"] {
            map.insert(alias, "dozen");
        }

        // Containers keep one spelling but belong to no class
        for (alias, canonical) in [
            ("bags", "bag"),
            ("cans", "can"),
            ("bottles", "bottle"),
            ("packs", "pack"),
            ("packages", "pack"),
            ("package", "pack"),
            ("pkg", "pack"),
            ("cloves", "clove"),
            ("slices", "slice"),
            ("bunches", "bunch"),
            ("jars", "jar"),
        ] {
            map.insert(alias, canonical);
            map.insert(canonical, canonical);
        }

        map
    };

    /// Class and factor to the class base unit for every classified canonical unit
    static ref UNIT_FACTORS: HashMap<&'static str, (UnitClass, f64)> = {
        let mut map = HashMap::new();

        map.insert("g", (UnitClass::Mass, 1.0));
        map.insert("kg", (UnitClass::Mass, 1000.0));
        map.insert("mg", (UnitClass::Mass, 0.001));
        map.insert("oz", (UnitClass::Mass, 28.3495));
        map.insert("lb", (UnitClass::Mass, 453.592));

        map.insert("ml", (UnitClass::Volume, 1.0));
        map.insert("l", (UnitClass::Volume, 1000.0));
        map.insert("cl", (UnitClass::Volume, 10.0));
        map.insert("dl", (UnitClass::Volume, 100.0));
        map.insert("tsp", (UnitClass::Volume, 5.0));
        map.insert("tbsp", (UnitClass::Volume, 15.0));
        map.insert("cup", (UnitClass::Volume, 240.0));
        map.insert("fl oz", (UnitClass::Volume, 29.5735));
        map.insert("pint", (UnitClass::Volume, 473.176));
        map.insert("quart", (UnitClass::Volume, 946.353));
        map.insert("gallon", (UnitClass::Volume, 3785.41));

        map.insert("pcs", (UnitClass::Count, 1.0));
        map.insert("dozen", (UnitClass::Count, 12.0));

        map
    };
}

/// Normalize a unit spelling to its canonical form
///
/// Lower-cases and trims the input, collapses inner whitespace and maps known
/// synonyms. Unknown spellings come back lower-cased and trimmed only.
pub fn normalize_unit(unit: &str) -> String {
    let cleaned = unit
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    let cleaned = cleaned.trim_end_matches('.');

    match UNIT_SYNONYMS.get(cleaned) {
        Some(canonical) => canonical.to_string(),
        None => cleaned.to_string(),
    }
}

/// Whether the spelling maps to a known canonical unit
pub fn is_known_unit(unit: &str) -> bool {
    UNIT_SYNONYMS.contains_key(normalize_unit(unit).as_str())
}

/// Class of a unit, `None` when unclassified
pub fn unit_class(unit: &str) -> Option<UnitClass> {
    UNIT_FACTORS
        .get(normalize_unit(unit).as_str())
        .map(|(class, _)| *class)
}

/// Factor from a unit to its class base unit, 1 for unclassified units
pub fn base_factor(unit: &str) -> f64 {
    UNIT_FACTORS
        .get(normalize_unit(unit).as_str())
        .map(|(_, factor)| *factor)
        .unwrap_or(1.0)
}

/// Whether a conversion between the two units is dimensionally meaningful
///
/// True for identical units, same-class units and the mass/volume bridge.
/// Unclassified units are never compatible with anything but themselves.
pub fn are_compatible(from: &str, to: &str) -> bool {
    let from = normalize_unit(from);
    let to = normalize_unit(to);
    if from == to {
        return true;
    }
    match (unit_class(&from), unit_class(&to)) {
        (Some(a), Some(b)) => a == b || is_mass_volume_bridge(a, b),
        _ => false,
    }
}

fn is_mass_volume_bridge(a: UnitClass, b: UnitClass) -> bool {
    matches!(
        (a, b),
        (UnitClass::Mass, UnitClass::Volume) | (UnitClass::Volume, UnitClass::Mass)
    )
}

/// Convert an amount between two units
///
/// - Same unit after normalization: the amount is returned untouched.
/// - Same class, or mass <-> volume: `amount * factor_from / factor_to`.
/// - Count against mass or volume: refused, the original amount is returned
///   and a warning is logged.
/// - Either side unclassified: factor 1 on that side, best effort.
///
/// Non-finite results fall back to the original amount, so the result is
/// finite whenever the input is.
pub fn convert(amount: f64, from_unit: &str, to_unit: &str) -> f64 {
    let from = normalize_unit(from_unit);
    let to = normalize_unit(to_unit);

    if from == to {
        return amount;
    }

    let from_class = unit_class(&from);
    let to_class = unit_class(&to);

    if let (Some(a), Some(b)) = (from_class, to_class) {
        if a != b && !is_mass_volume_bridge(a, b) {
            warn!(
                from_unit = %from,
                to_unit = %to,
                from_class = %a,
                to_class = %b,
                amount,
                "Refusing cross-dimension unit conversion"
            );
            return amount;
        }
    }

    let converted = amount * base_factor(&from) / base_factor(&to);
    if converted.is_finite() {
        converted
    } else {
        amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_synonyms() {
        assert_eq!(normalize_unit("kilo"), "kg");
        assert_eq!(normalize_unit("KGS"), "kg");
        assert_eq!(normalize_unit("pieces"), "pcs");
        assert_eq!(normalize_unit("pc"), "pcs");
        assert_eq!(normalize_unit("  Tablespoons "), "tbsp");
        assert_eq!(normalize_unit("Fl   Oz"), "fl oz");
        assert_eq!(normalize_unit("tsp."), "tsp");
    }

    #[test]
    fn test_normalize_unknown_passthrough() {
        assert_eq!(normalize_unit("  Handful "), "handful");
        assert_eq!(normalize_unit(""), "");
        assert!(!is_known_unit("handful"));
        assert!(is_known_unit("Bags"));
    }

    #[test]
    fn test_unit_classes() {
        assert_eq!(unit_class("grams"), Some(UnitClass::Mass));
        assert_eq!(unit_class("cups"), Some(UnitClass::Volume));
        assert_eq!(unit_class("dozen"), Some(UnitClass::Count));
        assert_eq!(unit_class("bag"), None);
        assert_eq!(unit_class("whatever"), None);
        assert_eq!(UnitClass::Volume.base_unit(), "ml");
    }

    #[test]
    fn test_same_class_conversion() {
        assert_eq!(convert(2.0, "kg", "g"), 2000.0);
        assert_eq!(convert(1.0, "l", "ml"), 1000.0);
        assert_eq!(convert(2.0, "dozen", "pcs"), 24.0);
        assert!((convert(3.0, "tsp", "tbsp") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_identity_is_exact() {
        assert_eq!(convert(0.1 + 0.2, "Kilos", "kg"), 0.1 + 0.2);
        assert_eq!(convert(7.25, "bag", "bags"), 7.25);
    }

    #[test]
    fn test_mass_volume_bridge() {
        assert_eq!(convert(250.0, "ml", "g"), 250.0);
        assert_eq!(convert(1.0, "kg", "l"), 1.0);
        assert!(are_compatible("cup", "g"));
    }

    #[test]
    fn test_count_conversion_refused() {
        assert_eq!(convert(3.0, "pcs", "g"), 3.0);
        assert_eq!(convert(500.0, "ml", "dozen"), 500.0);
        assert!(!are_compatible("pcs", "kg"));
    }

    #[test]
    fn test_unclassified_best_effort() {
        assert_eq!(convert(2.0, "bag", "kg"), 2.0 / 1000.0);
        assert_eq!(convert(2.0, "kg", "handful"), 2000.0);
        assert_eq!(convert(4.0, "bag", "handful"), 4.0);
        assert!(!are_compatible("bag", "g"));
    }
}
