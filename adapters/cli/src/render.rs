use std::fmt::Write as _;

use dotlink_core::{BoardView, CellCoord, Event, Palette, SpecialKind, TileColor};

const AREA_BOMB_GLYPH: char = '*';
const COLOR_BOMB_GLYPH: char = '@';
const EMPTY_GLYPH: char = '.';

/// Maps palette colors onto single-letter glyphs.
#[derive(Clone, Debug)]
pub(crate) struct Legend {
    glyphs: Vec<char>,
    names: Vec<String>,
}

impl Legend {
    /// Uses the initials of the palette names when they are unique, and
    /// falls back to consecutive letters otherwise.
    pub(crate) fn new(palette: &Palette) -> Self {
        let names: Vec<String> = palette
            .colors()
            .map(|color| palette.name(color).unwrap_or("?").to_owned())
            .collect();
        let initials: Vec<char> = names
            .iter()
            .map(|name| name.chars().next().unwrap_or('?').to_ascii_uppercase())
            .collect();
        let unique = initials
            .iter()
            .enumerate()
            .all(|(index, glyph)| glyph.is_ascii_alphabetic() && !initials[..index].contains(glyph));
        let glyphs = if unique {
            initials
        } else {
            (0..names.len())
                .map(|index| char::from(b'A' + (index % 26) as u8))
                .collect()
        };
        Self { glyphs, names }
    }

    fn glyph(&self, color: TileColor) -> char {
        self.glyphs
            .get(usize::from(color.index()))
            .copied()
            .unwrap_or('?')
    }

    fn name(&self, color: TileColor) -> &str {
        self.names
            .get(usize::from(color.index()))
            .map_or("?", String::as_str)
    }

    /// Draws the board row by row, highlighting `marked` cells in lowercase.
    pub(crate) fn board(&self, view: BoardView<'_>, marked: &[CellCoord]) -> String {
        let mut out = String::new();
        let _ = write!(out, "   ");
        for column in 0..view.columns() {
            let _ = write!(out, "{:>2}", column % 100);
        }
        out.push('\n');

        for row in 0..view.rows() {
            let _ = write!(out, "{:>2} ", row % 100);
            for column in 0..view.columns() {
                let cell = CellCoord::new(column, row);
                let glyph = match view.tile(cell) {
                    None => EMPTY_GLYPH,
                    Some(tile) => match tile.special_kind() {
                        SpecialKind::AreaBomb => AREA_BOMB_GLYPH,
                        SpecialKind::ColorBomb => COLOR_BOMB_GLYPH,
                        SpecialKind::None if marked.contains(&cell) => {
                            self.glyph(tile.color()).to_ascii_lowercase()
                        }
                        SpecialKind::None => self.glyph(tile.color()),
                    },
                };
                out.push(' ');
                out.push(glyph);
            }
            out.push('\n');
        }
        out
    }

    /// One-line description of an effect.
    pub(crate) fn describe(&self, event: &Event) -> String {
        match event {
            Event::TileSpawned { tile } => {
                format!("spawned {} at {}", self.name(tile.color()), tile.cell())
            }
            Event::TileCleared { tile } => {
                format!("cleared {} at {}", self.name(tile.color()), tile.cell())
            }
            Event::ClearSkipped { tile } => {
                format!("{:?} at {} survives the clear", tile.special_kind(), tile.cell())
            }
            Event::TileFell { tile, from } => {
                format!("{} fell from {from} to {}", self.name(tile.color()), tile.cell())
            }
            Event::SpecialSpawned { tile } => format!(
                "{:?} ({}) placed at {}",
                tile.special_kind(),
                self.name(tile.color()),
                tile.cell()
            ),
            Event::SpecialDetonated { tile } => {
                format!("{:?} at {} detonated", tile.special_kind(), tile.cell())
            }
            Event::TileRecolored { tile, previous } => format!(
                "{} at {} is now {}",
                self.name(*previous),
                tile.cell(),
                self.name(tile.color())
            ),
            Event::PlacementRejected { cell, reason } => {
                format!("board refused a change at {cell}: {reason}")
            }
            Event::CascadeCompleted { fallen, spawned } => {
                format!("board settled: {fallen} fell, {spawned} spawned")
            }
        }
    }
}
