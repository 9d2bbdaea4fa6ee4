//! Movement reachability and range checks.
//!
//! Movement is a 4-directional BFS bounded by effective MOV. A tile can be
//! entered iff it is in bounds, walkable and not occupied by a living unit;
//! units never pass through each other. The starting tile is always part of
//! the result (distance 0).
//!
//! Attack and skill ranges ignore terrain and line of sight: they are plain
//! Manhattan distance checks.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use super::model::{Coord, MapGrid, Mission, StatName, Unit};
use super::stats;

const DIRS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// In-bounds orthogonal neighbours of `c`.
pub fn neighbors(grid: &MapGrid, c: Coord) -> impl Iterator<Item = Coord> + '_ {
    DIRS.iter()
        .filter_map(move |&(dx, dy)| c.offset(dx, dy))
        .filter(move |n| grid.in_bounds(*n))
}

/// True if a living unit stands on `c`.
#[must_use]
pub fn occupied(mission: &Mission, c: Coord) -> bool {
    mission.unit_at(c).is_some()
}

#[must_use]
pub fn in_range(from: Coord, to: Coord, range: i32) -> bool {
    from.manhattan(to) <= range
}

/// Every in-bounds coordinate within Manhattan distance `radius` of
/// `center`, row-major. Only the part of the bounding box that overlaps the
/// grid is visited, so cost is capped by the map size.
pub fn diamond(grid: &MapGrid, center: Coord, radius: i32) -> impl Iterator<Item = Coord> {
    let r = radius.max(0);
    let (x0, x1) = (center.x.saturating_sub(r).max(0), center.x.saturating_add(r).min(grid.width - 1));
    let (y0, y1) = (center.y.saturating_sub(r).max(0), center.y.saturating_add(r).min(grid.height - 1));
    (y0..=y1)
        .flat_map(move |y| (x0..=x1).map(move |x| Coord::new(x, y)))
        .filter(move |c| in_range(center, *c, r))
}

/// Tiles `unit` can stand on after spending up to its effective MOV.
pub fn reachable_tiles(mission: &Mission, unit: &Unit) -> FxHashSet<Coord> {
    let mov = stats::effective(mission, unit, StatName::Mov);
    let mut seen = FxHashSet::default();
    seen.insert(unit.pos);

    let mut queue = VecDeque::from([(unit.pos, 0)]);
    while let Some((c, depth)) = queue.pop_front() {
        if depth >= mov {
            continue;
        }
        for n in neighbors(&mission.map, c) {
            if seen.contains(&n) || !mission.map.is_walkable(n) || occupied(mission, n) {
                continue;
            }
            seen.insert(n);
            queue.push_back((n, depth + 1));
        }
    }
    seen
}

#[must_use]
pub fn can_reach(mission: &Mission, unit: &Unit, dest: Coord) -> bool {
    reachable_tiles(mission, unit).contains(&dest)
}

/// Reachable tiles in row-major order, for stable enumeration.
pub fn reachable_sorted(mission: &Mission, unit: &Unit) -> Vec<Coord> {
    let mut tiles: Vec<Coord> = reachable_tiles(mission, unit).into_iter().collect();
    tiles.sort_by_key(|c| (c.y, c.x));
    tiles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tbs::model::{Side, Terrain};

    fn walker(pos: Coord, mov: i32) -> Unit {
        Unit::new("w", Side::Player, "Walker", pos).with_stat(StatName::Mov, mov)
    }

    #[test]
    fn test_open_field_is_diamond() {
        let m = Mission::new("m", "M", MapGrid::new(9, 9)).with_unit(walker(Coord::new(4, 4), 2));
        let tiles = reachable_tiles(&m, m.unit("w").unwrap());
        assert_eq!(tiles.len(), 13);
        assert!(tiles.iter().all(|c| c.manhattan(Coord::new(4, 4)) <= 2));
        assert_eq!(diamond(&m.map, Coord::new(4, 4), 2).count(), 13);
    }

    #[test]
    fn test_diamond_clipped_to_map() {
        let grid = MapGrid::new(3, 3);
        let corner: Vec<Coord> = diamond(&grid, Coord::new(0, 0), 1).collect();
        assert_eq!(corner, vec![Coord::new(0, 0), Coord::new(1, 0), Coord::new(0, 1)]);
        assert_eq!(diamond(&grid, Coord::new(1, 1), i32::MAX).count(), 9);
        assert_eq!(diamond(&grid, Coord::new(50, 50), 3).count(), 0);
    }

    #[test]
    fn test_zero_mov_keeps_own_tile() {
        let m = Mission::new("m", "M", MapGrid::new(3, 3)).with_unit(walker(Coord::new(1, 1), 0));
        let tiles = reachable_tiles(&m, m.unit("w").unwrap());
        assert_eq!(tiles.len(), 1);
        assert!(tiles.contains(&Coord::new(1, 1)));
    }

    #[test]
    fn test_water_and_units_block() {
        // Wall of water at x=1 except (1,2), which holds a unit.
        let map = MapGrid::new(3, 3)
            .with_terrain(Coord::new(1, 0), Terrain::Water)
            .with_terrain(Coord::new(1, 1), Terrain::Blocked);
        let blocker = Unit::new("b", Side::Enemy, "Blocker", Coord::new(1, 2));
        let m = Mission::new("m", "M", map)
            .with_unit(walker(Coord::new(0, 0), 6))
            .with_unit(blocker);
        let tiles = reachable_tiles(&m, m.unit("w").unwrap());
        assert_eq!(tiles.len(), 3);
        assert!(!tiles.contains(&Coord::new(2, 0)));
    }

    #[test]
    fn test_dead_units_do_not_block() {
        let map = MapGrid::new(3, 1);
        let mut corpse = Unit::new("b", Side::Enemy, "Corpse", Coord::new(1, 0));
        corpse.alive = false;
        let m = Mission::new("m", "M", map)
            .with_unit(walker(Coord::new(0, 0), 2))
            .with_unit(corpse);
        assert!(can_reach(&m, m.unit("w").unwrap(), Coord::new(2, 0)));
    }

    #[test]
    fn test_sorted_is_row_major() {
        let m = Mission::new("m", "M", MapGrid::new(3, 3)).with_unit(walker(Coord::new(1, 1), 1));
        let tiles = reachable_sorted(&m, m.unit("w").unwrap());
        assert_eq!(
            tiles,
            vec![
                Coord::new(1, 0),
                Coord::new(0, 1),
                Coord::new(1, 1),
                Coord::new(2, 1),
                Coord::new(1, 2),
            ]
        );
    }
}
