use dotlink_core::{BusyGuards, BusyOperation, CellCoord, Command, Event, SpecialKind, TileColor};
use dotlink_system_cascade::{
    column_tiles, has_floating_tiles, CascadeEngine, ColorSequence, SeededColors,
};
use dotlink_world::{self as world, query, World};

const COLUMNS: u32 = 6;
const ROWS: u32 = 7;

fn filled_world(engine: &mut CascadeEngine) -> World {
    let mut world = World::with_dimensions(COLUMNS, ROWS, 16);
    let mut events = Vec::new();
    let _ = engine
        .resolve(&mut world, &mut events)
        .expect("fresh engine is idle");
    world
}

fn snapshot(world: &World) -> Vec<Option<dotlink_core::Tile>> {
    query::board_view(world).cells().map(|(_, tile)| tile).collect()
}

#[test]
fn settling_after_random_clears_leaves_no_gaps_and_keeps_order() {
    let mut engine = CascadeEngine::new(BusyGuards::new(), 5, Box::new(SeededColors::new(11)));
    let mut world = filled_world(&mut engine);
    let mut rng: u64 = 0x0dd_ba11;

    for _ in 0..25 {
        let mut events = Vec::new();
        for _ in 0..6 {
            rng = rng.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            let column = ((rng >> 33) % u64::from(COLUMNS)) as u32;
            let row = ((rng >> 17) % u64::from(ROWS)) as u32;
            world::apply(
                &mut world,
                Command::ClearTile {
                    cell: CellCoord::new(column, row),
                },
                &mut events,
            );
        }

        let survivors: Vec<Vec<_>> = (0..COLUMNS)
            .map(|column| {
                column_tiles(query::board_view(&world), column)
                    .iter()
                    .map(|tile| tile.id())
                    .collect()
            })
            .collect();

        let _ = engine
            .resolve(&mut world, &mut events)
            .expect("engine idle between moves");

        let view = query::board_view(&world);
        assert!(!has_floating_tiles(view), "gravity leaves no gap under a tile");
        assert_eq!(view.empty_count(), 0, "refill fills every slot");
        for (column, before) in survivors.iter().enumerate() {
            let after: Vec<_> = column_tiles(view, column as u32)
                .iter()
                .map(|tile| tile.id())
                .collect();
            assert!(
                after.ends_with(before),
                "column {column} must keep its survivors in order at the bottom"
            );
        }
    }
}

#[test]
fn resolve_while_refilling_is_rejected_without_touching_board() {
    let guards = BusyGuards::new();
    let mut engine = CascadeEngine::new(guards.clone(), 5, Box::new(ColorSequence::default()));
    let mut world = filled_world(&mut engine);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ClearTile {
            cell: CellCoord::new(2, 3),
        },
        &mut events,
    );
    let before = snapshot(&world);

    let token = guards
        .try_acquire(BusyOperation::Refilling)
        .expect("guard free");
    let mut rejected_events = Vec::new();
    let rejection = engine
        .resolve(&mut world, &mut rejected_events)
        .expect_err("refill already running");

    assert_eq!(rejection.held(), BusyOperation::Refilling);
    assert!(rejected_events.is_empty(), "a rejected cascade emits nothing");
    assert_eq!(snapshot(&world), before, "a rejected cascade leaves the board as is");

    drop(token);
    assert!(engine.resolve(&mut world, &mut events).is_ok());
}

#[test]
fn shuffle_keeps_specials_and_redraws_everything_else() {
    let mut engine = CascadeEngine::new(
        BusyGuards::new(),
        5,
        Box::new(ColorSequence::new([TileColor::new(3)])),
    );
    let mut world = World::with_dimensions(3, 3, 16);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnSpecial {
            cell: CellCoord::new(1, 2),
            kind: SpecialKind::AreaBomb,
            color: TileColor::new(0),
        },
        &mut events,
    );
    let _ = engine.resolve(&mut world, &mut events).expect("idle");
    let bomb = query::tile_at(&world, CellCoord::new(1, 2)).expect("bomb in place");

    events.clear();
    let report = engine.shuffle(&mut world, &mut events).expect("idle");

    assert_eq!(report.spawned, 8);
    assert_eq!(query::tile_at(&world, CellCoord::new(1, 2)), Some(bomb));
    assert!(!engine.is_shuffling(), "shuffle guard released");
    assert!(matches!(events.last(), Some(Event::CascadeCompleted { .. })));
    let cleared = events
        .iter()
        .filter(|event| matches!(event, Event::TileCleared { .. }))
        .count();
    assert_eq!(cleared, 8, "every ordinary tile is cleared once");
}

#[test]
fn shuffle_is_rejected_while_another_operation_runs() {
    let guards = BusyGuards::new();
    let mut engine = CascadeEngine::new(guards.clone(), 5, Box::new(ColorSequence::default()));
    let mut world = filled_world(&mut engine);
    let before = snapshot(&world);

    let _token = guards
        .try_acquire(BusyOperation::Refilling)
        .expect("guard free");
    let mut events = Vec::new();
    assert!(engine.shuffle(&mut world, &mut events).is_err());
    assert_eq!(snapshot(&world), before);
}
