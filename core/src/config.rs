//! Configuration recognised by the engine.

use serde::{Deserialize, Serialize};

use crate::{ConfigError, TileColor};

const DEFAULT_COLUMNS: u32 = 7;
const DEFAULT_ROWS: u32 = 7;
const DEFAULT_POOL_SLOTS: usize = 100;
const DEFAULT_SEED: u64 = 0x2d07_5eed_c0ff_ee11;
const DEFAULT_COLOR_NAMES: [&str; 5] = ["Red", "Green", "Blue", "Yellow", "Pink"];

/// Ordered list of color names; a [`TileColor`] indexes into it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette {
    names: Vec<String>,
}

impl Palette {
    /// Creates a palette from explicit color names.
    pub fn new<I, S>(names: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let palette = Self {
            names: names.into_iter().map(Into::into).collect(),
        };
        palette.validate()?;
        Ok(palette)
    }

    /// Creates a palette of `len` colors, starting with the default names.
    pub fn with_len(len: usize) -> Result<Self, ConfigError> {
        Self::new((0..len).map(|index| match DEFAULT_COLOR_NAMES.get(index) {
            Some(name) => (*name).to_owned(),
            None => format!("Color{index}"),
        }))
    }

    /// Number of colors in the palette.
    #[must_use]
    pub fn len(&self) -> u8 {
        u8::try_from(self.names.len()).unwrap_or(u8::MAX)
    }

    /// Reports whether the palette has no colors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Name of the provided color, if it belongs to the palette.
    #[must_use]
    pub fn name(&self, color: TileColor) -> Option<&str> {
        self.names.get(usize::from(color.index())).map(String::as_str)
    }

    /// Looks up a color by name, ignoring ASCII case.
    #[must_use]
    pub fn color_named(&self, name: &str) -> Option<TileColor> {
        self.names
            .iter()
            .position(|candidate| candidate.eq_ignore_ascii_case(name))
            .and_then(|index| u8::try_from(index).ok())
            .map(TileColor::new)
    }

    /// Iterates every color of the palette in index order.
    pub fn colors(&self) -> impl Iterator<Item = TileColor> {
        (0..self.len()).map(TileColor::new)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let len = self.names.len();
        if len < 2 {
            return Err(ConfigError::PaletteTooSmall { len });
        }
        if len > usize::from(u8::MAX) {
            return Err(ConfigError::PaletteTooLarge { len });
        }
        Ok(())
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            names: DEFAULT_COLOR_NAMES.iter().map(|name| (*name).to_owned()).collect(),
        }
    }
}

/// How path length maps onto special-tile spawns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnRuleMode {
    /// Only paths of exactly the configured lengths spawn special tiles.
    #[default]
    Exact,
    /// Paths at least as long as the configured lengths spawn special tiles.
    Threshold,
}

/// Which interaction activates a color bomb.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorBombTrigger {
    /// The player taps the color bomb directly.
    #[default]
    DirectInteraction,
    /// The color bomb detonates when connected into a committed path of its color.
    PathConnection,
}

/// Path-length rules used when resolving a committed path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpawnRules {
    /// Shortest path that may be committed.
    pub min_match_length: usize,
    /// Path length that spawns an area bomb.
    pub area_bomb_length: usize,
    /// Path length that spawns a color bomb.
    pub color_bomb_length: usize,
    /// Whether the spawn lengths are exact or thresholds.
    pub mode: SpawnRuleMode,
}

impl Default for SpawnRules {
    fn default() -> Self {
        Self {
            min_match_length: 3,
            area_bomb_length: 6,
            color_bomb_length: 9,
            mode: SpawnRuleMode::Exact,
        }
    }
}

impl SpawnRules {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.min_match_length < 2 {
            return Err(ConfigError::MatchLengthTooShort {
                length: self.min_match_length,
            });
        }
        for (kind, length) in [
            ("area bomb", self.area_bomb_length),
            ("color bomb", self.color_bomb_length),
        ] {
            if length < self.min_match_length {
                return Err(ConfigError::SpawnLengthBelowMinimum {
                    kind,
                    length,
                    minimum: self.min_match_length,
                });
            }
        }
        if self.area_bomb_length == self.color_bomb_length {
            return Err(ConfigError::IdenticalSpawnLengths {
                length: self.area_bomb_length,
            });
        }
        Ok(())
    }
}

/// Complete engine configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Board width in slots.
    pub columns: u32,
    /// Board height in slots.
    pub rows: u32,
    /// Colors tiles may take.
    pub palette: Palette,
    /// Number of reusable tile slots reserved up front.
    pub initial_pool_slots: usize,
    /// Path-length rules.
    pub spawn_rules: SpawnRules,
    /// Interaction that activates a color bomb.
    pub color_bomb_trigger: ColorBombTrigger,
    /// Seed for the refill color source.
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
            palette: Palette::default(),
            initial_pool_slots: DEFAULT_POOL_SLOTS,
            spawn_rules: SpawnRules::default(),
            color_bomb_trigger: ColorBombTrigger::default(),
            seed: DEFAULT_SEED,
        }
    }
}

impl GameConfig {
    /// Checks the configuration for values the engine cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(ConfigError::EmptyBoard {
                columns: self.columns,
                rows: self.rows,
            });
        }
        self.palette.validate()?;
        self.spawn_rules.validate()
    }
}
