//! Movement rules: per-land-type speed modifiers.
//!
//! Rules are data-driven: the table can be loaded from a RON file or
//! taken from the compiled-in defaults. Modifiers are converted to
//! fixed-point at load time; a modifier of zero means impassable, and
//! land/movement combinations missing from the data degrade to zero
//! rather than erroring.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{NavError, Result};
use crate::math::Fixed;
use crate::tile::LandType;

/// Classification of how a unit traverses terrain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementType {
    /// Infantry on foot.
    Foot,
    /// Wheeled vehicle.
    Wheel,
    /// Tracked vehicle.
    Track,
    /// Hovercraft.
    Hover,
    /// Amphibious vehicle.
    Amphibious,
    /// Aircraft; needs no terrain graph.
    Fly,
}

impl MovementType {
    /// Every movement type.
    pub const ALL: [MovementType; 6] = [
        MovementType::Foot,
        MovementType::Wheel,
        MovementType::Track,
        MovementType::Hover,
        MovementType::Amphibious,
        MovementType::Fly,
    ];

    const fn index(self) -> usize {
        match self {
            MovementType::Foot => 0,
            MovementType::Wheel => 1,
            MovementType::Track => 2,
            MovementType::Hover => 3,
            MovementType::Amphibious => 4,
            MovementType::Fly => 5,
        }
    }
}

/// Speed modifiers of one land type, indexed by movement type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LandRules {
    modifiers: [Fixed; 6],
}

impl LandRules {
    /// A land type no movement type can enter.
    pub const IMPASSABLE: Self = Self {
        modifiers: [Fixed::ZERO; 6],
    };

    /// The speed modifier for a movement type; zero means impassable.
    #[must_use]
    pub fn speed_modifier(&self, movement: MovementType) -> Fixed {
        self.modifiers[movement.index()]
    }

    fn from_data(data: &LandModifiers) -> Self {
        let mut modifiers = [Fixed::ZERO; 6];
        modifiers[MovementType::Foot.index()] = Fixed::from_num(data.foot);
        modifiers[MovementType::Wheel.index()] = Fixed::from_num(data.wheel);
        modifiers[MovementType::Track.index()] = Fixed::from_num(data.track);
        modifiers[MovementType::Hover.index()] = Fixed::from_num(data.hover);
        modifiers[MovementType::Amphibious.index()] = Fixed::from_num(data.amphibious);
        modifiers[MovementType::Fly.index()] = Fixed::from_num(data.fly);
        Self { modifiers }
    }
}

/// Serde-facing modifier row; absent fields default to impassable.
#[derive(Debug, Default, Serialize, Deserialize)]
struct LandModifiers {
    #[serde(default)]
    foot: f32,
    #[serde(default)]
    wheel: f32,
    #[serde(default)]
    track: f32,
    #[serde(default)]
    hover: f32,
    #[serde(default)]
    amphibious: f32,
    #[serde(default)]
    fly: f32,
}

/// Serde-facing rules table.
#[derive(Debug, Serialize, Deserialize)]
struct RulesData {
    land: HashMap<LandType, LandModifiers>,
}

const fn land_index(land: LandType) -> usize {
    match land {
        LandType::Clear => 0,
        LandType::Road => 1,
        LandType::Rough => 2,
        LandType::Rock => 3,
        LandType::Wall => 4,
        LandType::Water => 5,
        LandType::Beach => 6,
        LandType::Ice => 7,
        LandType::Railroad => 8,
        LandType::Weeds => 9,
    }
}

/// Speed-modifier rules for every land type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rules {
    land: [LandRules; 10],
}

impl Rules {
    /// Parse a rules table from RON text.
    ///
    /// ```
    /// use nav_core::math::Fixed;
    /// use nav_core::rules::{MovementType, Rules};
    /// use nav_core::tile::LandType;
    ///
    /// let rules = Rules::from_ron_str(
    ///     "(land: { Clear: (foot: 1.0, wheel: 1.0), Water: (hover: 1.0) })",
    /// )
    /// .unwrap();
    /// assert!(rules.speed_modifier(LandType::Clear, MovementType::Foot) > Fixed::ZERO);
    /// assert!(rules.speed_modifier(LandType::Water, MovementType::Wheel) == Fixed::ZERO);
    /// ```
    pub fn from_ron_str(text: &str) -> Result<Self> {
        let data: RulesData =
            ron::from_str(text).map_err(|err| NavError::RulesParse(err.to_string()))?;
        let mut land = [LandRules::IMPASSABLE; 10];
        for (land_type, modifiers) in &data.land {
            land[land_index(*land_type)] = LandRules::from_data(modifiers);
        }
        Ok(Self { land })
    }

    /// The modifier row of a land type.
    #[must_use]
    pub fn land_rules(&self, land: LandType) -> &LandRules {
        &self.land[land_index(land)]
    }

    /// The speed modifier of a land/movement combination.
    #[must_use]
    pub fn speed_modifier(&self, land: LandType, movement: MovementType) -> Fixed {
        self.land_rules(land).speed_modifier(movement)
    }
}

impl Default for Rules {
    /// Compiled-in rules table.
    fn default() -> Self {
        Self::from_ron_str(DEFAULT_RULES).unwrap_or(Self {
            land: [LandRules::IMPASSABLE; 10],
        })
    }
}

/// Built-in speed-modifier table, in the same RON format accepted by
/// [`Rules::from_ron_str`].
const DEFAULT_RULES: &str = r#"(
    land: {
        Clear:    (foot: 1.0, wheel: 1.0, track: 1.0, hover: 1.0, amphibious: 1.0, fly: 1.0),
        Road:     (foot: 1.0, wheel: 1.25, track: 1.1, hover: 1.0, amphibious: 1.0, fly: 1.0),
        Rough:    (foot: 0.9, wheel: 0.5,  track: 0.7, hover: 0.8, amphibious: 0.8, fly: 1.0),
        Rock:     (fly: 1.0),
        Wall:     (fly: 1.0),
        Water:    (hover: 1.0, amphibious: 1.0, fly: 1.0),
        Beach:    (foot: 0.8, wheel: 0.4,  track: 0.6, hover: 1.0, amphibious: 1.0, fly: 1.0),
        Ice:      (foot: 0.5, wheel: 0.5,  track: 0.5, hover: 0.6, fly: 1.0),
        Railroad: (foot: 0.9, wheel: 0.6,  track: 0.8, hover: 0.9, amphibious: 0.9, fly: 1.0),
        Weeds:    (foot: 1.0, wheel: 0.9,  track: 1.0, hover: 1.0, amphibious: 1.0, fly: 1.0),
    },
)"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_basics() {
        let rules = Rules::default();
        assert_eq!(
            rules.speed_modifier(LandType::Clear, MovementType::Foot),
            Fixed::ONE
        );
        // Walls and rock are impassable to ground movement.
        assert_eq!(
            rules.speed_modifier(LandType::Wall, MovementType::Track),
            Fixed::ZERO
        );
        assert_eq!(
            rules.speed_modifier(LandType::Rock, MovementType::Wheel),
            Fixed::ZERO
        );
        // Water carries hover and amphibious movement only.
        assert!(rules.speed_modifier(LandType::Water, MovementType::Hover) > Fixed::ZERO);
        assert_eq!(
            rules.speed_modifier(LandType::Water, MovementType::Foot),
            Fixed::ZERO
        );
    }

    #[test]
    fn test_missing_entries_degrade_to_impassable() {
        let rules = Rules::from_ron_str("(land: { Clear: (foot: 0.9) })").unwrap();
        assert!(rules.speed_modifier(LandType::Clear, MovementType::Foot) > Fixed::ZERO);
        assert_eq!(
            rules.speed_modifier(LandType::Clear, MovementType::Wheel),
            Fixed::ZERO
        );
        assert_eq!(
            rules.speed_modifier(LandType::Road, MovementType::Wheel),
            Fixed::ZERO
        );
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = Rules::from_ron_str("(land: {").unwrap_err();
        assert!(matches!(err, NavError::RulesParse(_)));
    }
}
