use bevy::prelude::*;
use thiserror::Error;

use crate::grid::ItemId;

/// Inclusive range a playback parameter is drawn from. A degenerate range
/// (min == max) is a fixed value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RandomRange {
    pub min: f64,
    pub max: f64,
}

impl RandomRange {
    pub const fn fixed(value: f64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub fn sample(&self) -> f64 {
        let (lo, hi) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        if hi - lo < f64::EPSILON {
            return lo;
        }
        fastrand::f64().mul_add(hi - lo, lo)
    }
}

/// Volume and pitch randomization applied each time a clip plays.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClipParams {
    pub volume: RandomRange,
    pub pitch: RandomRange,
}

impl Default for ClipParams {
    fn default() -> Self {
        Self {
            volume: RandomRange::fixed(1.0),
            pitch: RandomRange {
                min: 0.95,
                max: 1.05,
            },
        }
    }
}

/// Immutable reference data for one item. Clip parameters are optional;
/// items without them fall back to the defaults.
#[derive(Debug, PartialEq)]
pub struct ItemDef {
    pub name: &'static str,
    pub sprite: &'static str,
    pub pickup: Option<ClipParams>,
    pub put_down: Option<ClipParams>,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CatalogError {
    #[error("no item with id {0}")]
    UnknownItem(usize),
}

/// Pool of items the grid can be shuffled from. Queried by id, never owned
/// by the grid.
#[derive(Resource)]
pub struct ItemCatalog {
    items: Vec<ItemDef>,
}

impl Default for ItemCatalog {
    fn default() -> Self {
        Self {
            items: default_items(),
        }
    }
}

impl ItemCatalog {
    pub fn get(&self, id: ItemId) -> Result<&ItemDef, CatalogError> {
        self.items.get(id.0).ok_or(CatalogError::UnknownItem(id.0))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn default_items() -> Vec<ItemDef> {
    vec![
        ItemDef {
            name: "Lantern",
            sprite: "items/lantern.png",
            pickup: None,
            put_down: None,
        },
        ItemDef {
            name: "Rope",
            sprite: "items/rope.png",
            pickup: None,
            put_down: None,
        },
        ItemDef {
            name: "Key",
            sprite: "items/key.png",
            // Small and metallic, so noticeably higher pitched
            pickup: Some(ClipParams {
                volume: RandomRange::fixed(0.8),
                pitch: RandomRange { min: 1.15, max: 1.3 },
            }),
            put_down: None,
        },
        ItemDef {
            name: "Potion",
            sprite: "items/potion.png",
            pickup: None,
            put_down: Some(ClipParams {
                volume: RandomRange::fixed(1.0),
                pitch: RandomRange { min: 0.85, max: 0.95 },
            }),
        },
        ItemDef {
            name: "Map",
            sprite: "items/map.png",
            pickup: None,
            put_down: None,
        },
        ItemDef {
            name: "Compass",
            sprite: "items/compass.png",
            pickup: None,
            put_down: None,
        },
        ItemDef {
            name: "Dagger",
            sprite: "items/dagger.png",
            pickup: Some(ClipParams {
                volume: RandomRange::fixed(1.0),
                pitch: RandomRange { min: 1.0, max: 1.1 },
            }),
            put_down: None,
        },
        ItemDef {
            name: "Amulet",
            sprite: "items/amulet.png",
            pickup: None,
            put_down: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lookup() {
        let catalog = ItemCatalog::default();
        assert!(!catalog.is_empty());
        assert_eq!(catalog.get(ItemId(0)).map(|def| def.name), Ok("Lantern"));
        assert_eq!(
            catalog.get(ItemId(catalog.len())),
            Err(CatalogError::UnknownItem(catalog.len()))
        );
    }

    #[test]
    fn sample_stays_inside_the_range() {
        let range = RandomRange { min: 0.9, max: 1.1 };
        for _ in 0..100 {
            let value = range.sample();
            assert!((0.9..=1.1).contains(&value), "sample {value} out of range");
        }
    }

    #[test]
    fn sample_handles_swapped_and_fixed_ranges() {
        let swapped = RandomRange { min: 1.1, max: 0.9 };
        for _ in 0..100 {
            let value = swapped.sample();
            assert!((0.9..=1.1).contains(&value), "sample {value} out of range");
        }

        let fixed = RandomRange::fixed(0.9);
        assert!((fixed.sample() - 0.9).abs() < f64::EPSILON, "fixed range must not vary");
    }
}
