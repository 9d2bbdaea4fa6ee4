//! MOVE: relocate the acting unit within its movement range.

use super::{can_act, Verdict};
use crate::core::TbsConfig;
use crate::tbs::action::MoveAction;
use crate::tbs::model::Mission;
use crate::tbs::reach;

pub fn evaluate(mission: &Mission, action: &MoveAction, config: &TbsConfig) -> Verdict {
    let Some(unit) = mission.unit(&action.unit_id) else {
        return Verdict::deny("unknown unit");
    };
    if !can_act(mission, unit) {
        return Verdict::deny("unit cannot act");
    }
    if unit.ap_left < config.move_ap_cost {
        return Verdict::deny("no AP left");
    }
    let dest = action.to;
    if dest == unit.pos {
        return Verdict::deny("already at destination");
    }
    if !mission.map.in_bounds(dest) {
        return Verdict::deny("destination out of bounds");
    }
    if !mission.map.is_walkable(dest) {
        return Verdict::deny("destination not walkable");
    }
    if reach::occupied(mission, dest) {
        return Verdict::deny("destination occupied");
    }
    if !reach::can_reach(mission, unit, dest) {
        return Verdict::deny("cannot reach");
    }
    Verdict::ok()
}

pub(crate) fn apply(mission: &mut Mission, action: &MoveAction, config: &TbsConfig) {
    if let Some(unit) = mission.unit_mut(&action.unit_id) {
        unit.pos = action.to;
        unit.ap_left -= config.move_ap_cost;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tbs::model::{Coord, MapGrid, Side, StatName, Terrain, Unit};
    use crate::tbs::turn;

    fn field() -> Mission {
        let map = MapGrid::new(6, 6)
            .with_terrain(Coord::new(2, 0), Terrain::Water)
            .with_terrain(Coord::new(2, 1), Terrain::Blocked);
        let mut m = Mission::new("m", "M", map)
            .with_unit(Unit::new("a", Side::Player, "A", Coord::new(0, 0)).with_stat(StatName::Init, 20))
            .with_unit(Unit::new("b", Side::Enemy, "B", Coord::new(0, 2)));
        turn::initialize(&mut m);
        m
    }

    fn verdict(m: &Mission, unit: &str, x: i32, y: i32) -> Verdict {
        let action = MoveAction {
            unit_id: unit.into(),
            to: Coord::new(x, y),
        };
        evaluate(m, &action, &TbsConfig::default())
    }

    #[test]
    fn test_reasons() {
        let m = field();
        assert_eq!(verdict(&m, "ghost", 1, 0).explanation, "unknown unit");
        assert_eq!(verdict(&m, "b", 1, 2).explanation, "unit cannot act");
        assert_eq!(verdict(&m, "a", 0, 0).explanation, "already at destination");
        assert_eq!(verdict(&m, "a", -1, 0).explanation, "destination out of bounds");
        assert_eq!(verdict(&m, "a", 2, 0).explanation, "destination not walkable");
        assert_eq!(verdict(&m, "a", 0, 2).explanation, "destination occupied");
        assert_eq!(verdict(&m, "a", 5, 5).explanation, "cannot reach");
        assert!(verdict(&m, "a", 1, 1).legal);
    }

    #[test]
    fn test_no_ap() {
        let mut m = field();
        m.unit_mut("a").unwrap().ap_left = 0;
        assert_eq!(verdict(&m, "a", 1, 0).explanation, "no AP left");
    }

    #[test]
    fn test_apply_spends_ap() {
        let mut m = field();
        let action = MoveAction {
            unit_id: "a".into(),
            to: Coord::new(1, 1),
        };
        apply(&mut m, &action, &TbsConfig::default());
        let a = m.unit("a").unwrap();
        assert_eq!(a.pos, Coord::new(1, 1));
        assert_eq!(a.ap_left, 1);
    }
}
