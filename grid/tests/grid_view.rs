use arena_nav_core::{
    ArenaSize, CellCoord, Direction, Entity, EntityKind, GridDims, ScenarioError, Sight,
};
use arena_nav_grid::{clean_path, GridView, OccupancyGrid, Scenario};
use glam::Vec2;

const ARENA: ArenaSize = ArenaSize::new(320, 240);
const NATIVE_CELL: u32 = 10;
const NATIVE_DIMS: GridDims = GridDims::new(32, 24);

fn scenario_with(blocked: &[CellCoord]) -> Scenario {
    let grid = OccupancyGrid::from_fn(NATIVE_DIMS, |cell| blocked.contains(&cell));
    Scenario::new(ARENA, NATIVE_CELL, grid)
}

fn viewer_at(position: Vec2) -> Entity {
    Entity::new(EntityKind::Agent, position, Vec2::new(4.0, 4.0))
}

fn wall_at(position: Vec2, half_size: Vec2) -> Entity {
    Entity::new(EntityKind::DestructibleWall, position, half_size)
}

#[test]
fn indivisible_cell_size_is_a_fatal_configuration_error() {
    let result = GridView::from_scenario(7, scenario_with(&[]));
    assert_eq!(
        result.err(),
        Some(ScenarioError::CellSizeIndivisible {
            extent: 320,
            cell_size: 7,
        })
    );
}

#[test]
fn mismatched_arena_extent_is_a_fatal_configuration_error() {
    let grid = OccupancyGrid::new(NATIVE_DIMS);
    let scenario = Scenario::new(ArenaSize::new(330, 240), NATIVE_CELL, grid);
    assert_eq!(
        GridView::from_scenario(10, scenario).err(),
        Some(ScenarioError::AspectMismatch {
            columns: 32,
            rows: 24,
            cell_size: 10,
            width: 330,
            height: 240,
        })
    );
}

#[test]
fn non_integral_downsample_ratio_is_a_fatal_configuration_error() {
    // 320 and 240 both divide by 4, but 4 and the native 10 share no
    // integer ratio.
    assert_eq!(
        GridView::from_scenario(4, scenario_with(&[])).err(),
        Some(ScenarioError::FactorNotIntegral {
            native: 10,
            derived: 4,
        })
    );
}

#[test]
fn empty_native_grid_is_rejected() {
    let grid = OccupancyGrid::new(GridDims::new(0, 0));
    let scenario = Scenario::new(ARENA, NATIVE_CELL, grid);
    assert_eq!(
        GridView::from_scenario(10, scenario).err(),
        Some(ScenarioError::EmptyGrid)
    );
}

#[test]
fn native_cells_expand_into_derived_blocks() {
    let view = GridView::from_scenario(5, scenario_with(&[CellCoord::new(3, 2)]))
        .expect("valid scenario");
    assert_eq!(view.derived_dims(), GridDims::new(64, 48));

    let frame = view.update(&[], &viewer_at(ARENA.half()));
    for row in 4..6 {
        for column in 6..8 {
            assert!(
                frame.working().is_blocked(CellCoord::new(column, row)),
                "expected derived cell ({column}, {row}) blocked"
            );
        }
    }
    assert_eq!(frame.working().blocked_count(), 4);
}

#[test]
fn coarse_derived_grids_keep_every_native_wall() {
    // Derived cells of 20 world units each cover four native cells; a wall
    // whose footprint sits strictly inside one derived cell must still mark
    // it, never vanish in the resampling.
    let view = GridView::from_scenario(
        20,
        scenario_with(&[CellCoord::new(0, 0), CellCoord::new(1, 1), CellCoord::new(3, 2)]),
    )
    .expect("valid scenario");
    assert_eq!(view.derived_dims(), GridDims::new(16, 12));

    let frame = view.update(&[], &viewer_at(ARENA.half()));
    assert!(frame.working().is_blocked(CellCoord::new(0, 0)));
    assert!(frame.working().is_blocked(CellCoord::new(1, 1)));
    assert_eq!(frame.working().blocked_count(), 2);
}

#[test]
fn seam_straddling_obstacle_marks_both_edges() {
    // Bounding box spanning x = -5 to x = 5 on a 320-wide arena: the
    // wrapped portion lands at the high-x edge, the rest at x = 0.
    let view = GridView::from_scenario(10, scenario_with(&[])).expect("valid scenario");
    let obstacle = wall_at(Vec2::new(0.0, 105.0), Vec2::new(5.0, 5.0));
    let frame = view.update(&[obstacle], &viewer_at(ARENA.half()));

    assert!(frame.working().is_blocked(CellCoord::new(31, 10)));
    assert!(frame.working().is_blocked(CellCoord::new(0, 10)));
    assert!(!frame.working().is_blocked(CellCoord::new(1, 10)));
    assert!(!frame.working().is_blocked(CellCoord::new(30, 10)));
    assert!(!frame.working().is_blocked(CellCoord::new(0, 9)));
    assert!(!frame.working().is_blocked(CellCoord::new(0, 11)));
    assert_eq!(frame.working().blocked_count(), 2);
}

#[test]
fn only_dynamic_obstacles_are_rasterized() {
    let view = GridView::from_scenario(10, scenario_with(&[])).expect("valid scenario");
    let bystanders = [
        Entity::new(EntityKind::Pickup, Vec2::new(100.0, 100.0), Vec2::new(4.0, 4.0)),
        Entity::new(EntityKind::Agent, Vec2::new(50.0, 50.0), Vec2::new(4.0, 4.0)),
        Entity::new(
            EntityKind::Projectile,
            Vec2::new(200.0, 30.0),
            Vec2::new(2.0, 2.0),
        ),
    ];
    let frame = view.update(&bystanders, &viewer_at(ARENA.half()));
    assert!(!frame.working().any_blocked());
}

#[test]
fn shifted_grid_centers_the_viewer() {
    let view =
        GridView::from_scenario(10, scenario_with(&[CellCoord::new(0, 0)])).expect("valid scenario");
    let frame = view.update(&[], &viewer_at(Vec2::new(5.0, 5.0)));

    // The viewer stands inside the blocked cell (0, 0); after the circular
    // shift that cell must sit at the grid center.
    assert!(frame.shifted().is_blocked(CellCoord::new(16, 12)));
    assert_eq!(frame.shifted().blocked_count(), 1);
}

#[test]
fn view_slices_a_window_around_the_center() {
    let view =
        GridView::from_scenario(10, scenario_with(&[CellCoord::new(1, 0)])).expect("valid scenario");
    let frame = view.update(&[], &viewer_at(Vec2::new(5.0, 5.0)));

    let window = frame.view(Sight::Square(30));
    assert_eq!(window.dims(), GridDims::new(6, 6));
    // Viewer cell (0, 0) maps to window center (3, 3); the wall one cell
    // east shows up at (4, 3).
    assert!(window.is_blocked(CellCoord::new(4, 3)));
    assert_eq!(window.blocked_count(), 1);
}

#[test]
fn oversized_sight_is_clamped_to_half_the_grid() {
    let view = GridView::from_scenario(10, scenario_with(&[])).expect("valid scenario");
    let frame = view.update(&[], &viewer_at(ARENA.half()));
    assert_eq!(frame.sight_extent(Sight::Square(100_000)), (16, 12));
    assert_eq!(frame.view(Sight::Full).dims(), GridDims::new(32, 24));
    assert_eq!(
        frame.view(Sight::Rect { width: 40, height: 20 }).dims(),
        GridDims::new(8, 4)
    );
}

#[test]
fn full_sight_keeps_odd_grid_dimensions_intact() {
    // 320 x 240 at a derived cell size of 80 gives a 4 x 3 grid; the full
    // view must include the odd last row instead of halving it away.
    let view =
        GridView::from_scenario(80, scenario_with(&[CellCoord::new(31, 23)])).expect("valid scenario");
    assert_eq!(view.derived_dims(), GridDims::new(4, 3));

    let frame = view.update(&[], &viewer_at(ARENA.half()));
    let window = frame.view(Sight::Full);
    assert_eq!(window.dims(), GridDims::new(4, 3));
    assert!(window.is_blocked(CellCoord::new(3, 2)));
}

#[test]
fn ray_reports_distance_to_the_first_blocked_cell() {
    let view = GridView::from_scenario(
        10,
        scenario_with(&[CellCoord::new(2, 0), CellCoord::new(30, 0)]),
    )
    .expect("valid scenario");

    let origin = Vec2::new(5.0, 5.0);
    let east = view.ray(origin, Direction::East, 100.0);
    assert!((east - 15.0).abs() < f32::EPSILON, "east hit at {east}");

    // Going west wraps across the seam: 5 units to x = 0, then 10 more to
    // the far side of the blocked cell at x = 300..310.
    let west = view.ray(origin, Direction::West, 100.0);
    assert!((west - 15.0).abs() < f32::EPSILON, "west hit at {west}");

    let north = view.ray(origin, Direction::North, 100.0);
    assert!((north - 100.0).abs() < f32::EPSILON, "north should be clear");

    assert_eq!(view.ray(origin, Direction::East, 0.0), 0.0);
}

#[test]
fn clean_path_detects_walls_between_points() {
    let view =
        GridView::from_scenario(10, scenario_with(&[CellCoord::new(16, 12)])).expect("valid scenario");
    let frame = view.update(&[], &viewer_at(Vec2::new(5.0, 5.0)));

    let left = Vec2::new(155.0, 125.0);
    let right = Vec2::new(175.0, 125.0);
    assert!(!frame.is_clean_path(left, right), "segment crosses the wall");

    let above = Vec2::new(155.0, 135.0);
    assert!(frame.is_clean_path(above, Vec2::new(175.0, 135.0)));

    // Zero-length segments still sample their cell.
    assert!(frame.is_clean_path(above, above));
    assert!(!frame.is_clean_path(Vec2::new(165.0, 125.0), Vec2::new(165.0, 125.0)));
}

#[test]
fn region_collision_is_conservative() {
    let view =
        GridView::from_scenario(10, scenario_with(&[CellCoord::new(0, 10)])).expect("valid scenario");
    let frame = view.update(&[], &viewer_at(ARENA.half()));

    assert!(!frame.is_region_collision(Vec2::new(100.0, 100.0), Vec2::new(140.0, 140.0)));
    assert!(frame.is_region_collision(Vec2::new(-2.0, 102.0), Vec2::new(3.0, 108.0)));

    // Degenerate regions report blocked rather than a false "clear".
    let point = Vec2::new(100.0, 100.0);
    assert!(frame.is_region_collision(point, point));
    assert!(frame.is_region_collision(Vec2::new(140.0, 100.0), Vec2::new(100.0, 140.0)));
}

#[test]
fn region_queries_are_invariant_under_arena_translations() {
    let view = GridView::from_scenario(
        10,
        scenario_with(&[CellCoord::new(3, 20), CellCoord::new(31, 0)]),
    )
    .expect("valid scenario");
    let frame = view.update(
        &[wall_at(Vec2::new(0.0, 105.0), Vec2::new(5.0, 5.0))],
        &viewer_at(ARENA.half()),
    );

    let probes = [
        (Vec2::new(25.0, 195.0), Vec2::new(45.0, 215.0)),
        (Vec2::new(305.0, -5.0), Vec2::new(325.0, 15.0)),
        (Vec2::new(100.0, 100.0), Vec2::new(120.0, 120.0)),
    ];
    let width = ARENA.width() as f32;
    let height = ARENA.height() as f32;
    for (bottom_left, top_right) in probes {
        let baseline = frame.is_region_collision(bottom_left, top_right);
        for dx in [-width, 0.0, width] {
            for dy in [-height, 0.0, height] {
                let offset = Vec2::new(dx, dy);
                assert_eq!(
                    frame.is_region_collision(bottom_left + offset, top_right + offset),
                    baseline,
                    "translation ({dx}, {dy}) changed the answer for {bottom_left:?}"
                );
            }
        }
    }
}

#[test]
fn clean_path_queries_are_invariant_under_arena_translations() {
    let view =
        GridView::from_scenario(10, scenario_with(&[CellCoord::new(16, 12)])).expect("valid scenario");
    let frame = view.update(&[], &viewer_at(ARENA.half()));

    let width = ARENA.width() as f32;
    let height = ARENA.height() as f32;
    let p1 = Vec2::new(155.0, 125.0);
    let p2 = Vec2::new(175.0, 125.0);
    let baseline = frame.is_clean_path(p1, p2);
    for dx in [-width, 0.0, width] {
        for dy in [-height, 0.0, height] {
            let offset = Vec2::new(dx, dy);
            assert_eq!(
                frame.is_clean_path(p1 + offset, p2 + offset),
                baseline,
                "translation ({dx}, {dy}) changed the line-of-sight answer"
            );
        }
    }
}

#[test]
fn set_scenario_replaces_the_loaded_terrain() {
    let mut view =
        GridView::from_scenario(10, scenario_with(&[CellCoord::new(5, 5)])).expect("valid scenario");
    assert!(view.native().is_blocked(CellCoord::new(5, 5)));

    view.set_scenario(scenario_with(&[CellCoord::new(7, 7)]))
        .expect("valid scenario");
    assert!(!view.native().is_blocked(CellCoord::new(5, 5)));
    assert!(view.native().is_blocked(CellCoord::new(7, 7)));

    // A failed replacement keeps the previous scenario intact.
    let bad = Scenario::new(ArenaSize::new(321, 240), NATIVE_CELL, OccupancyGrid::new(NATIVE_DIMS));
    assert!(view.set_scenario(bad).is_err());
    assert!(view.native().is_blocked(CellCoord::new(7, 7)));
}

#[test]
fn clean_path_matches_direct_sampling_on_the_native_grid() {
    let wall = OccupancyGrid::from_fn(NATIVE_DIMS, |cell| cell.column() == 5 && cell.row() < 10);
    assert!(!clean_path(
        &wall,
        NATIVE_CELL,
        Vec2::new(15.0, 45.0),
        Vec2::new(95.0, 45.0)
    ));
    assert!(clean_path(
        &wall,
        NATIVE_CELL,
        Vec2::new(15.0, 145.0),
        Vec2::new(95.0, 145.0)
    ));
}
