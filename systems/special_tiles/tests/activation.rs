use dotlink_core::{
    BusyGuards, BusyOperation, CellCoord, ColorBombTrigger, Command, Event, SpecialKind, TileColor,
};
use dotlink_system_cascade::{CascadeEngine, ColorSequence};
use dotlink_system_special_tiles::{ActivationError, SpecialTiles};
use dotlink_world::{self as world, query, World};

fn world_from_rows(rows: &[&[u8]]) -> World {
    let mut world = World::with_dimensions(rows[0].len() as u32, rows.len() as u32, 32);
    let mut events = Vec::new();
    for (row, colors) in rows.iter().enumerate() {
        for (column, color) in colors.iter().enumerate() {
            world::apply(
                &mut world,
                Command::SpawnTile {
                    cell: CellCoord::new(column as u32, row as u32),
                    color: TileColor::new(*color),
                },
                &mut events,
            );
        }
    }
    world
}

fn place(world: &mut World, cell: CellCoord, kind: SpecialKind, color: u8) {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::SpawnSpecial {
            cell,
            kind,
            color: TileColor::new(color),
        },
        &mut events,
    );
}

fn cascade(guards: &BusyGuards) -> CascadeEngine {
    CascadeEngine::new(
        guards.clone(),
        4,
        Box::new(ColorSequence::new([TileColor::new(3)])),
    )
}

fn cascades_in(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, Event::CascadeCompleted { .. }))
        .count()
}

#[test]
fn area_bomb_clears_block_then_detonates_and_cascades_once() {
    let mut world = world_from_rows(&[&[0, 1, 2, 0], &[1, 2, 0, 1], &[2, 0, 1, 2], &[0, 1, 2, 0]]);
    let bomb = CellCoord::new(1, 1);
    place(&mut world, bomb, SpecialKind::AreaBomb, 2);
    let guards = BusyGuards::new();
    let mut engine = cascade(&guards);
    let mut events = Vec::new();

    let report = SpecialTiles::new(ColorBombTrigger::DirectInteraction)
        .activate(bomb, &mut world, &mut engine, &mut events)
        .expect("area bombs react to taps");

    assert_eq!(report.cleared, 8);
    assert_eq!(report.cascade.spawned, 9);
    assert_eq!(cascades_in(&events), 1, "one cascade per activation");

    let detonated = events
        .iter()
        .position(|event| matches!(event, Event::SpecialDetonated { .. }))
        .expect("bomb detonates");
    let last_clear = events
        .iter()
        .rposition(|event| matches!(event, Event::TileCleared { .. }))
        .expect("block cleared");
    assert!(last_clear < detonated, "the bomb goes off after its block is cleared");
    assert_eq!(query::board_view(&world).empty_count(), 0);
}

#[test]
fn color_bomb_sweeps_its_color_across_the_board() {
    let mut world = world_from_rows(&[&[0, 1, 0], &[1, 1, 2], &[0, 2, 0]]);
    let bomb = CellCoord::new(1, 1);
    place(&mut world, bomb, SpecialKind::ColorBomb, 0);
    let guards = BusyGuards::new();
    let mut engine = cascade(&guards);
    let mut events = Vec::new();

    let report = SpecialTiles::new(ColorBombTrigger::DirectInteraction)
        .activate(bomb, &mut world, &mut engine, &mut events)
        .expect("direct trigger");

    assert_eq!(report.cleared, 4, "the four corner tiles share the bomb color");
    let survivors: Vec<_> = query::board_view(&world)
        .tiles()
        .filter(|tile| tile.color() == TileColor::new(1) || tile.color() == TileColor::new(2))
        .collect();
    assert_eq!(survivors.len(), 4, "other colors are untouched");
}

#[test]
fn activation_while_busy_is_rejected() {
    let mut world = world_from_rows(&[&[0, 0], &[0, 0]]);
    let bomb = CellCoord::new(0, 0);
    place(&mut world, bomb, SpecialKind::AreaBomb, 0);
    let guards = BusyGuards::new();
    let mut engine = cascade(&guards);
    let _token = guards
        .try_acquire(BusyOperation::Shuffling)
        .expect("guard free");
    let mut events = Vec::new();

    let error = SpecialTiles::new(ColorBombTrigger::DirectInteraction)
        .activate(bomb, &mut world, &mut engine, &mut events)
        .expect_err("shuffle in progress");

    assert!(matches!(error, ActivationError::Rejected(rejection) if rejection.held() == BusyOperation::Shuffling));
    assert!(events.is_empty());
    assert!(query::tile_at(&world, bomb).is_some_and(|tile| tile.is_special()));
}

fn detonations_in(events: &[Event]) -> Vec<CellCoord> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::SpecialDetonated { tile } => Some(tile.cell()),
            _ => None,
        })
        .collect()
}

#[test]
fn area_blast_leaves_a_neighbouring_bomb_armed() {
    let mut world = world_from_rows(&[&[0, 1, 2, 0], &[1, 2, 0, 1], &[2, 0, 1, 2], &[0, 1, 2, 0]]);
    let bomb = CellCoord::new(1, 1);
    let neighbour = CellCoord::new(2, 2);
    place(&mut world, bomb, SpecialKind::AreaBomb, 2);
    place(&mut world, neighbour, SpecialKind::ColorBomb, 0);
    let survivor = query::tile_at(&world, neighbour).expect("color bomb placed");
    let guards = BusyGuards::new();
    let mut engine = cascade(&guards);
    let mut events = Vec::new();

    let report = SpecialTiles::new(ColorBombTrigger::DirectInteraction)
        .activate(bomb, &mut world, &mut engine, &mut events)
        .expect("area bombs react to taps");

    assert_eq!(report.cleared, 7, "the block minus both bombs");
    assert_eq!(detonations_in(&events), vec![bomb]);
    let still_there = query::board_view(&world)
        .tiles()
        .find(|tile| tile.id() == survivor.id())
        .expect("neighbouring bomb survives the blast");
    assert_eq!(still_there.special_kind(), SpecialKind::ColorBomb);
}

#[test]
fn color_sweep_leaves_a_same_colored_bomb_armed() {
    let mut world = world_from_rows(&[&[0, 1, 0], &[1, 1, 2], &[0, 2, 0]]);
    let bomb = CellCoord::new(1, 1);
    let other = CellCoord::new(0, 0);
    place(&mut world, bomb, SpecialKind::ColorBomb, 0);
    place(&mut world, other, SpecialKind::AreaBomb, 0);
    let survivor = query::tile_at(&world, other).expect("area bomb placed");
    let guards = BusyGuards::new();
    let mut engine = cascade(&guards);
    let mut events = Vec::new();

    let report = SpecialTiles::new(ColorBombTrigger::DirectInteraction)
        .activate(bomb, &mut world, &mut engine, &mut events)
        .expect("direct trigger");

    assert_eq!(report.cleared, 3, "only the ordinary corners share the color");
    assert_eq!(detonations_in(&events), vec![bomb]);
    let still_there = query::board_view(&world)
        .tiles()
        .find(|tile| tile.id() == survivor.id())
        .expect("same-colored bomb survives the sweep");
    assert_eq!(still_there.special_kind(), SpecialKind::AreaBomb);
    assert_eq!(still_there.color(), TileColor::new(0));
}
