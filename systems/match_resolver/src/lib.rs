#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turns committed paths into clears and special-tile spawns.

use dotlink_core::{
    CellCoord, Command, Event, RejectedOperation, SpawnRuleMode, SpawnRules, SpecialKind, Tile,
    TileColor,
};
use dotlink_system_cascade::{CascadeEngine, CascadeReport};
use dotlink_system_path_tracker::CommittedPath;
use dotlink_system_special_tiles::Blast;
use dotlink_world::{self as world, query, World};

/// Special tile a committed path leaves behind at its final cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpecialSpawn {
    /// Cell of the last tile in the path.
    pub cell: CellCoord,
    /// Kind of special tile to place.
    pub kind: SpecialKind,
    /// Color recorded on the special tile.
    pub color: TileColor,
}

/// Board mutations a committed path resolves into.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchPlan {
    clears: Vec<CellCoord>,
    spawn: Option<SpecialSpawn>,
    swept: Vec<Tile>,
}

impl MatchPlan {
    /// Cells cleared, in path order.
    #[must_use]
    pub fn clears(&self) -> &[CellCoord] {
        &self.clears
    }

    /// Special tile spawned at the path's end, if the length earns one.
    #[must_use]
    pub const fn spawn(&self) -> Option<SpecialSpawn> {
        self.spawn
    }

    /// Special tiles the path connected through, detonated after the clears.
    #[must_use]
    pub fn swept(&self) -> &[Tile] {
        &self.swept
    }
}

/// Outcome of a committed match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatchReport {
    /// Ordinary tiles removed, including those swept by connected bombs.
    pub cleared: u32,
    /// Kind of special tile spawned, if any.
    pub spawned: Option<SpecialKind>,
    /// Totals of the cascade that followed.
    pub cascade: CascadeReport,
}

/// Applies path-length rules to committed paths.
#[derive(Clone, Copy, Debug)]
pub struct MatchResolver {
    rules: SpawnRules,
}

impl MatchResolver {
    /// Creates a resolver using the supplied rules.
    #[must_use]
    pub const fn new(rules: SpawnRules) -> Self {
        Self { rules }
    }

    /// Special kind earned by a path of `length` tiles.
    #[must_use]
    pub fn spawn_kind(&self, length: usize) -> SpecialKind {
        let rules = &self.rules;
        match rules.mode {
            SpawnRuleMode::Exact if length == rules.color_bomb_length => SpecialKind::ColorBomb,
            SpawnRuleMode::Exact if length == rules.area_bomb_length => SpecialKind::AreaBomb,
            SpawnRuleMode::Threshold if length >= rules.color_bomb_length => SpecialKind::ColorBomb,
            SpawnRuleMode::Threshold if length >= rules.area_bomb_length => SpecialKind::AreaBomb,
            _ => SpecialKind::None,
        }
    }

    /// Computes the mutations for `path` without touching the board.
    ///
    /// A path shorter than the minimum match length plans nothing.
    #[must_use]
    pub fn plan(&self, path: &CommittedPath) -> MatchPlan {
        if path.len() < self.rules.min_match_length {
            return MatchPlan::default();
        }

        let kind = self.spawn_kind(path.len());
        let spawn = path
            .last()
            .filter(|last| kind.is_special() && !last.is_special())
            .map(|last| SpecialSpawn {
                cell: last.cell(),
                kind,
                color: path.color(),
            });

        let mut plan = MatchPlan {
            spawn,
            ..MatchPlan::default()
        };
        for tile in path.tiles() {
            if tile.is_special() {
                plan.swept.push(*tile);
            } else if spawn.map_or(true, |spawn| spawn.cell != tile.cell()) {
                plan.clears.push(tile.cell());
            }
        }
        plan
    }

    /// Applies `path` to the board and settles it with a single cascade.
    ///
    /// Rejected with the board untouched while another operation holds the
    /// busy guard. A path whose tiles no longer match the board resolves
    /// nothing and leaves the board untouched.
    pub fn commit(
        &self,
        path: &CommittedPath,
        world: &mut World,
        cascade: &mut CascadeEngine,
        out_events: &mut Vec<Event>,
    ) -> Result<MatchReport, RejectedOperation> {
        cascade.guards().ensure_idle()?;
        let view = query::board_view(world);
        if let Some(stale) = path
            .tiles()
            .iter()
            .find(|tile| view.tile(tile.cell()).as_ref() != Some(*tile))
        {
            log::warn!(
                "tile {:?} at {} changed since it was drawn; path discarded",
                stale.id(),
                stale.cell()
            );
            return Ok(MatchReport::default());
        }

        let plan = self.plan(path);
        if plan.clears.is_empty() && plan.swept.is_empty() {
            log::debug!("path of {} tiles too short to commit", path.len());
            return Ok(MatchReport::default());
        }

        let start = out_events.len();
        for &cell in &plan.clears {
            world::apply(world, Command::ClearTile { cell }, out_events);
        }
        if let Some(spawn) = plan.spawn {
            log::debug!("path of {} spawns {:?} at {}", path.len(), spawn.kind, spawn.cell);
            world::apply(
                world,
                Command::SpawnSpecial {
                    cell: spawn.cell,
                    kind: spawn.kind,
                    color: spawn.color,
                },
                out_events,
            );
        }
        for bomb in &plan.swept {
            if let Some(blast) = Blast::of(query::board_view(world), *bomb) {
                blast.apply(world, out_events);
            }
        }
        // The replaced end tile is not part of the count.
        let cleared = out_events[start..]
            .iter()
            .filter(|event| matches!(event, Event::TileCleared { .. }))
            .count()
            .saturating_sub(usize::from(plan.spawn.is_some()));

        let cascade = cascade.resolve(world, out_events)?;
        Ok(MatchReport {
            cleared: u32::try_from(cleared).unwrap_or(u32::MAX),
            spawned: plan.spawn.map(|spawn| spawn.kind),
            cascade,
        })
    }
}
