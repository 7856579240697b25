use std::fmt;

use dotlink_core::TileColor;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Supplies colors for freshly spawned tiles.
pub trait ColorSource: fmt::Debug {
    /// Draws the next color from a palette holding `palette_len` entries.
    fn next_color(&mut self, palette_len: u8) -> TileColor;
}

/// Uniform color draws from a seeded ChaCha stream.
///
/// Two sources built from the same seed yield identical sequences, which is
/// what replays rely on.
#[derive(Clone, Debug)]
pub struct SeededColors {
    rng: ChaCha8Rng,
}

impl SeededColors {
    /// Creates a source seeded with `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl ColorSource for SeededColors {
    fn next_color(&mut self, palette_len: u8) -> TileColor {
        if palette_len == 0 {
            return TileColor::new(0);
        }
        TileColor::new(self.rng.gen_range(0..palette_len))
    }
}

/// Cycles through a fixed list of colors.
///
/// An empty list walks the palette in index order instead.
#[derive(Clone, Debug, Default)]
pub struct ColorSequence {
    colors: Vec<TileColor>,
    cursor: usize,
}

impl ColorSequence {
    /// Creates a sequence that repeats `colors` forever.
    #[must_use]
    pub fn new<I>(colors: I) -> Self
    where
        I: IntoIterator<Item = TileColor>,
    {
        Self {
            colors: colors.into_iter().collect(),
            cursor: 0,
        }
    }
}

impl ColorSource for ColorSequence {
    fn next_color(&mut self, palette_len: u8) -> TileColor {
        let palette_len = palette_len.max(1);
        let color = match self.colors.get(self.cursor % self.colors.len().max(1)) {
            Some(color) => TileColor::new(color.index() % palette_len),
            None => TileColor::new((self.cursor % usize::from(palette_len)) as u8),
        };
        self.cursor = self.cursor.wrapping_add(1);
        color
    }
}
