#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wires the Dotlink board systems into a single turn loop.
//!
//! A [`Session`] owns the world and every system, constructing each one
//! from the [`GameConfig`] and handing them explicit references to one
//! another. Every entry point runs synchronously to a stable board and
//! returns the ordered list of effects it produced.

use dotlink_core::{
    BoardView, BusyGuards, CellCoord, Command, ConfigError, Event, GameConfig, RejectedOperation,
    Tile,
};
use dotlink_system_cascade::{CascadeEngine, ColorSource, SeededColors};
use dotlink_system_connectivity::{Cluster, ConnectivityScanner};
use dotlink_system_match_resolver::MatchResolver;
use dotlink_system_path_tracker::{
    Config as TrackerConfig, PathInput, PathTracker, TrackerError, TrackerResponse, TrackerState,
};
use dotlink_system_special_tiles::{ActivationError, SpecialTiles};
use dotlink_world::{self as world, query, World};
use thiserror::Error;

/// Reasons a session request is refused.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The configuration cannot be honoured.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Another board operation is in progress.
    #[error(transparent)]
    Rejected(#[from] RejectedOperation),
    /// The gesture event does not fit the tracker's current state.
    #[error(transparent)]
    Tracker(#[from] TrackerError),
    /// The addressed special tile cannot be activated.
    #[error(transparent)]
    Activation(ActivationError),
    /// The board cannot change while a path is being drawn over it.
    #[error("cannot {operation} while a path is being drawn")]
    GestureInProgress {
        /// Operation that was refused.
        operation: &'static str,
    },
}

impl From<ActivationError> for SessionError {
    fn from(error: ActivationError) -> Self {
        match error {
            ActivationError::Rejected(rejection) => Self::Rejected(rejection),
            other => Self::Activation(other),
        }
    }
}

/// A single board with every system wired around it.
#[derive(Debug)]
pub struct Session {
    config: GameConfig,
    world: World,
    guards: BusyGuards,
    tracker: PathTracker,
    resolver: MatchResolver,
    specials: SpecialTiles,
    cascade: CascadeEngine,
    scanner: ConnectivityScanner,
}

impl Session {
    /// Creates a session whose refills draw from a stream seeded by `config.seed`.
    pub fn new(config: GameConfig) -> Result<Self, SessionError> {
        let source = Box::new(SeededColors::new(config.seed));
        Self::with_color_source(config, source)
    }

    /// Creates a session with an explicit color source and fills the board.
    pub fn with_color_source(
        config: GameConfig,
        source: Box<dyn ColorSource>,
    ) -> Result<Self, SessionError> {
        let world = World::new(&config);
        Self::from_world(config, world, source)
    }

    /// Wraps an existing world, filling any empty slots.
    ///
    /// The board dimensions of `world` take precedence over those in `config`.
    pub fn from_world(
        mut config: GameConfig,
        world: World,
        source: Box<dyn ColorSource>,
    ) -> Result<Self, SessionError> {
        let (columns, rows) = query::dimensions(&world);
        config.columns = columns;
        config.rows = rows;
        config.validate()?;

        let guards = BusyGuards::new();
        let mut session = Self {
            tracker: PathTracker::new(TrackerConfig::from(&config)),
            resolver: MatchResolver::new(config.spawn_rules),
            specials: SpecialTiles::new(config.color_bomb_trigger),
            cascade: CascadeEngine::new(guards.clone(), config.palette.len(), source),
            scanner: ConnectivityScanner::new(),
            guards,
            world,
            config,
        };

        let mut events = Vec::new();
        let report = session.cascade.resolve(&mut session.world, &mut events)?;
        log::debug!(
            "session ready on a {columns}x{rows} board ({} tiles spawned)",
            report.spawned
        );
        Ok(session)
    }

    /// Feeds a single gesture event through the session.
    ///
    /// `Begin` on a special tile activates it instead of starting a path.
    /// `End` resolves the path when it is long enough to commit.
    pub fn handle_input(&mut self, input: PathInput) -> Result<Vec<Event>, SessionError> {
        let mut events = Vec::new();
        match input {
            PathInput::Begin(cell) => {
                self.guards.ensure_idle()?;
                let special = query::tile_at(&self.world, cell).filter(Tile::is_special);
                if special.is_some() && self.tracker.state() == TrackerState::Idle {
                    let _ = self.specials.activate(
                        cell,
                        &mut self.world,
                        &mut self.cascade,
                        &mut events,
                    )?;
                    return Ok(events);
                }
                let _ = self.tracker.handle(input, query::board_view(&self.world))?;
            }
            PathInput::End => {
                let response = self.tracker.handle(input, query::board_view(&self.world))?;
                if let TrackerResponse::Committed(Some(path)) = response {
                    let _ = self.resolver.commit(
                        &path,
                        &mut self.world,
                        &mut self.cascade,
                        &mut events,
                    )?;
                }
            }
            PathInput::Extend(_) | PathInput::Abort => {
                let _ = self.tracker.handle(input, query::board_view(&self.world))?;
            }
        }
        Ok(events)
    }

    /// Runs a whole gesture: begins on the first cell, extends through the
    /// rest, then ends it.
    pub fn trace(&mut self, cells: &[CellCoord]) -> Result<Vec<Event>, SessionError> {
        let Some((first, rest)) = cells.split_first() else {
            return Ok(Vec::new());
        };
        let mut events = self.handle_input(PathInput::Begin(*first))?;
        if self.tracker.state() != TrackerState::Building {
            return Ok(events);
        }
        for cell in rest {
            events.extend(self.handle_input(PathInput::Extend(*cell))?);
        }
        events.extend(self.handle_input(PathInput::End)?);
        Ok(events)
    }

    /// Activates the special tile at `cell` directly.
    ///
    /// Like every other board-changing request outside the gesture itself,
    /// this is refused while a path is being drawn.
    pub fn activate(&mut self, cell: CellCoord) -> Result<Vec<Event>, SessionError> {
        self.ensure_no_gesture("activate a special tile")?;
        let mut events = Vec::new();
        let _ = self
            .specials
            .activate(cell, &mut self.world, &mut self.cascade, &mut events)?;
        Ok(events)
    }

    /// Advances the color of the ordinary tile at `cell` through the palette.
    pub fn cycle_color(&mut self, cell: CellCoord) -> Result<Vec<Event>, SessionError> {
        self.ensure_no_gesture("cycle a tile color")?;
        self.guards.ensure_idle()?;
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::CycleColor {
                cell,
                palette_len: self.config.palette.len(),
            },
            &mut events,
        );
        Ok(events)
    }

    /// First committable cluster in row-major order, if any.
    pub fn find_hint(&mut self) -> Option<Cluster> {
        self.scanner.find_hint(
            query::board_view(&self.world),
            self.config.spawn_rules.min_match_length,
        )
    }

    /// Reports whether the board holds at least one committable cluster.
    pub fn has_moves(&mut self) -> bool {
        self.scanner.has_any_match(
            query::board_view(&self.world),
            self.config.spawn_rules.min_match_length,
        )
    }

    /// Clears every ordinary tile and refills the board.
    pub fn shuffle(&mut self) -> Result<Vec<Event>, SessionError> {
        self.ensure_no_gesture("shuffle")?;
        let mut events = Vec::new();
        let _ = self.cascade.shuffle(&mut self.world, &mut events)?;
        Ok(events)
    }

    /// Settles the board: compacts every column and refills the gaps.
    pub fn resolve(&mut self) -> Result<Vec<Event>, SessionError> {
        self.ensure_no_gesture("resolve the board")?;
        let mut events = Vec::new();
        let _ = self.cascade.resolve(&mut self.world, &mut events)?;
        Ok(events)
    }

    // The tracker holds tile snapshots until the gesture ends.
    fn ensure_no_gesture(&self, operation: &'static str) -> Result<(), SessionError> {
        if self.tracker.state() == TrackerState::Building {
            log::warn!("refused to {operation} while a path is being drawn");
            return Err(SessionError::GestureInProgress { operation });
        }
        Ok(())
    }

    /// Tile occupying `cell`, if any.
    #[must_use]
    pub fn tile_at(&self, cell: CellCoord) -> Option<Tile> {
        query::tile_at(&self.world, cell)
    }

    /// Read-only view of the board.
    #[must_use]
    pub fn board_view(&self) -> BoardView<'_> {
        query::board_view(&self.world)
    }

    /// Reports whether a refill is in progress.
    #[must_use]
    pub fn is_refilling(&self) -> bool {
        self.guards.is_refilling()
    }

    /// Reports whether a shuffle is in progress.
    #[must_use]
    pub fn is_shuffling(&self) -> bool {
        self.guards.is_shuffling()
    }

    /// Shared busy guards.
    #[must_use]
    pub fn guards(&self) -> &BusyGuards {
        &self.guards
    }

    /// Current state of the path tracker.
    #[must_use]
    pub fn tracker_state(&self) -> TrackerState {
        self.tracker.state()
    }

    /// Path drawn so far in the current gesture.
    #[must_use]
    pub fn current_path(&self) -> &[Tile] {
        self.tracker.path()
    }

    /// Effective configuration.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Authoritative world state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotlink_core::{BusyOperation, SpecialKind};

    #[test]
    fn activation_rejection_surfaces_as_rejected() {
        let rejection = RejectedOperation::new(BusyOperation::Refilling);
        assert_eq!(
            SessionError::from(ActivationError::Rejected(rejection)),
            SessionError::Rejected(rejection)
        );
        let not_triggerable = ActivationError::NotTriggerable {
            cell: CellCoord::new(0, 0),
            kind: SpecialKind::ColorBomb,
        };
        assert_eq!(
            SessionError::from(not_triggerable),
            SessionError::Activation(not_triggerable)
        );
    }

    #[test]
    fn new_session_fills_the_board() {
        let session = Session::new(GameConfig::default()).expect("default config is valid");
        assert_eq!(session.board_view().empty_count(), 0);
        assert!(!session.is_refilling());
        assert_eq!(session.tracker_state(), TrackerState::Idle);
    }

    #[test]
    fn invalid_config_is_refused() {
        let config = GameConfig {
            columns: 0,
            ..GameConfig::default()
        };
        assert!(matches!(
            Session::new(config),
            Err(SessionError::Config(ConfigError::EmptyBoard { .. }))
        ));
    }
}
