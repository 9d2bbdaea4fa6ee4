//! Initiative scheduling.
//!
//! The mission's `current_unit_id` is a cursor into `initiative_order`.
//! Order is a deterministic total order over living units:
//! higher effective INIT first, then player units, then by name (and id,
//! so two units with the same name still sort stably).
//!
//! An absent cursor is a valid state (nobody left alive); every caller
//! checks for it.

use tracing::{debug, info};

use super::effects::{decay_temporary_mods, tick_cooldowns};
use super::model::{Mission, StatName};
use super::stats;

/// Rebuild the initiative order and point the cursor at its head.
pub fn recompute_order(mission: &mut Mission) {
    let mut keyed: Vec<_> = mission
        .living_units()
        .map(|u| {
            let init = stats::effective(mission, u, StatName::Init);
            ((-init, u.side.priority(), u.name.clone(), u.id.clone()), u.id.clone())
        })
        .collect();
    keyed.sort();

    mission.initiative_order = keyed.into_iter().map(|(_, id)| id).collect();
    mission.current_unit_id = mission.initiative_order.first().cloned();
    if let Some(side) = mission.current_unit().map(|u| u.side) {
        mission.side_to_move = side;
    }
}

/// Refill the current unit's AP and sync side-to-move.
fn activate_current(mission: &mut Mission) {
    let Some(unit) = mission.current_unit() else {
        return;
    };
    let ap = stats::effective(mission, unit, StatName::Ap);
    let side = unit.side;
    let id = unit.id.clone();
    if let Some(unit) = mission.unit_mut(&id) {
        unit.ap_left = ap;
    }
    mission.side_to_move = side;
}

/// Prepare a freshly created (or resumed) mission for play.
///
/// A cursor already set on the mission is honoured: the order is rotated so
/// that unit acts first, provided it is alive.
pub fn initialize(mission: &mut Mission) {
    let requested = mission.current_unit_id.clone();
    recompute_order(mission);

    let ids: Vec<String> = mission.units.keys().cloned().collect();
    for id in &ids {
        if let Some(unit) = mission.unit_mut(id) {
            unit.ensure_max_hp_tag();
        }
    }

    if let Some(req) = requested {
        if let Some(pos) = mission.initiative_order.iter().position(|id| *id == req) {
            mission.initiative_order.rotate_left(pos);
        }
    }
    mission.current_unit_id = mission.initiative_order.first().cloned();
    activate_current(mission);

    debug!(
        mission = %mission.id,
        order = ?mission.initiative_order,
        "initiative initialized"
    );
}

/// End the current unit's turn and hand control to the next living unit.
pub fn end_turn(mission: &mut Mission) {
    let living: Vec<String> = mission.living_units().map(|u| u.id.clone()).collect();
    for id in &living {
        if let Some(unit) = mission.unit_mut(id) {
            tick_cooldowns(unit);
            decay_temporary_mods(unit);
        }
    }

    if mission.initiative_order.is_empty() {
        recompute_order(mission);
    }
    let n = mission.initiative_order.len();
    if n == 0 {
        mission.current_unit_id = None;
        return;
    }

    let idx = mission
        .current_unit_id
        .as_ref()
        .and_then(|cur| mission.initiative_order.iter().position(|id| id == cur))
        .map_or(-1, |i| i as i64);

    let next = (1..=n as i64)
        .map(|step| (idx + step).rem_euclid(n as i64) as usize)
        .find(|&i| {
            mission
                .unit(&mission.initiative_order[i])
                .is_some_and(|u| u.alive)
        });

    let Some(next_idx) = next else {
        mission.current_unit_id = None;
        return;
    };

    if next_idx as i64 <= idx {
        mission.turn += 1;
        info!(mission = %mission.id, turn = mission.turn, "round complete");
    }
    mission.current_unit_id = Some(mission.initiative_order[next_idx].clone());
    activate_current(mission);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tbs::model::{Coord, MapGrid, Side, StatModifier, Unit};

    fn trio() -> Mission {
        let unit = |id: &str, side, init, x| {
            Unit::new(id, side, id.to_uppercase(), Coord::new(x, 0)).with_stat(StatName::Init, init)
        };
        Mission::new("m", "M", MapGrid::new(5, 1))
            .with_unit(unit("slow", Side::Player, 10, 0))
            .with_unit(unit("fast", Side::Enemy, 20, 1))
            .with_unit(unit("mid", Side::Player, 15, 2))
    }

    #[test]
    fn test_order_by_initiative() {
        let mut m = trio();
        recompute_order(&mut m);
        assert_eq!(m.initiative_order, vec!["fast", "mid", "slow"]);
        assert_eq!(m.current_unit_id.as_deref(), Some("fast"));
        assert_eq!(m.side_to_move, Side::Enemy);
    }

    #[test]
    fn test_ties_prefer_player_then_name() {
        let mut m = Mission::new("m", "M", MapGrid::new(5, 1))
            .with_unit(Unit::new("e", Side::Enemy, "Alpha", Coord::new(0, 0)))
            .with_unit(Unit::new("p2", Side::Player, "Zed", Coord::new(1, 0)))
            .with_unit(Unit::new("p1", Side::Player, "Bob", Coord::new(2, 0)));
        recompute_order(&mut m);
        assert_eq!(m.initiative_order, vec!["p1", "p2", "e"]);
    }

    #[test]
    fn test_initialize_rotates_to_requested_cursor() {
        let mut m = trio();
        m.current_unit_id = Some("mid".into());
        initialize(&mut m);
        assert_eq!(m.initiative_order, vec!["mid", "slow", "fast"]);
        assert_eq!(m.current_unit_id.as_deref(), Some("mid"));
        assert_eq!(m.unit("mid").unwrap().ap_left, 2);
        assert!(m.units.values().all(|u| u.max_hp() == Some(10)));
    }

    #[test]
    fn test_end_turn_wraps_and_counts() {
        let mut m = trio();
        initialize(&mut m);
        assert_eq!(m.turn, 1);

        end_turn(&mut m);
        assert_eq!(m.current_unit_id.as_deref(), Some("mid"));
        end_turn(&mut m);
        assert_eq!(m.current_unit_id.as_deref(), Some("slow"));
        assert_eq!(m.turn, 1);
        end_turn(&mut m);
        assert_eq!(m.current_unit_id.as_deref(), Some("fast"));
        assert_eq!(m.turn, 2);
    }

    #[test]
    fn test_end_turn_skips_dead() {
        let mut m = trio();
        initialize(&mut m);
        m.unit_mut("mid").unwrap().alive = false;
        end_turn(&mut m);
        assert_eq!(m.current_unit_id.as_deref(), Some("slow"));
        assert_eq!(m.side_to_move, Side::Player);
    }

    #[test]
    fn test_end_turn_with_nobody_alive() {
        let mut m = trio();
        initialize(&mut m);
        for id in ["fast", "mid", "slow"] {
            m.unit_mut(id).unwrap().alive = false;
        }
        end_turn(&mut m);
        assert_eq!(m.current_unit_id, None);
        end_turn(&mut m);
        assert_eq!(m.current_unit_id, None);
    }

    #[test]
    fn test_end_turn_refills_effective_ap() {
        let mut m = trio().with_global_mod(StatModifier::additive(StatName::Ap, 1));
        initialize(&mut m);
        m.unit_mut("mid").unwrap().ap_left = 0;
        end_turn(&mut m);
        assert_eq!(m.unit("mid").unwrap().ap_left, 3);
    }

    #[test]
    fn test_recompute_is_stable() {
        let mut a = trio();
        let mut b = trio();
        recompute_order(&mut a);
        recompute_order(&mut b);
        recompute_order(&mut b);
        assert_eq!(a.initiative_order, b.initiative_order);
    }
}
