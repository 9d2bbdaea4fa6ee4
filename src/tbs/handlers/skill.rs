//! USE_SKILL: spend AP on an active skill.
//!
//! Resolution splits a skill's `apply_mods`:
//! - HP additive/override modifiers change base HP directly, capped by the
//!   target's `MAX_HP` tag and floored at 0;
//! - everything else attaches as a temporary modifier.
//!
//! Tile-targeted skills hit every living unit inside the area footprint with
//! a polarity guard: harmful HP changes only land on the other side, healing
//! only on the caster's side. Additive non-HP modifiers follow the same rule.

use super::{can_act, Verdict};
use crate::core::TbsConfig;
use crate::tbs::action::UseSkillAction;
use crate::tbs::effects::attach_temp_mods;
use crate::tbs::model::{
    Coord, Mission, Operation, Side, Skill, SkillKind, SkillTarget, StatModifier, StatName,
};
use crate::tbs::reach;

pub fn evaluate(mission: &Mission, action: &UseSkillAction, _config: &TbsConfig) -> Verdict {
    let Some(unit) = mission.unit(&action.unit_id) else {
        return Verdict::deny("unknown unit");
    };
    if !can_act(mission, unit) {
        return Verdict::deny("unit cannot act");
    }
    let Some(skill) = unit.skill(&action.skill_id) else {
        return Verdict::deny("skill not found");
    };
    if skill.kind == SkillKind::Passive {
        return Verdict::deny("skill is passive");
    }
    if unit.ap_left < skill.ap_cost {
        return Verdict::deny("not enough AP");
    }
    if unit.cooldown(&skill.id) > 0 {
        return Verdict::deny("on cooldown");
    }
    if unit.charges_left(skill) == Some(0) {
        return Verdict::deny("no charges");
    }

    match skill.target {
        SkillTarget::AllyUnit | SkillTarget::EnemyUnit => {
            let Some(target) = action.target_unit_id.as_deref().and_then(|id| mission.unit(id)) else {
                return Verdict::deny("missing target");
            };
            if !target.alive {
                return Verdict::deny("target already down");
            }
            if skill.target == SkillTarget::AllyUnit && target.side != unit.side {
                return Verdict::deny("target not ally");
            }
            if skill.target == SkillTarget::EnemyUnit && target.side == unit.side {
                return Verdict::deny("target not enemy");
            }
            if !reach::in_range(unit.pos, target.pos, skill.range) {
                return Verdict::deny("target out of range");
            }
        }
        SkillTarget::Tile => {
            let Some(tile) = action.target_tile else {
                return Verdict::deny("missing target tile");
            };
            if !mission.map.in_bounds(tile) {
                return Verdict::deny("tile out of bounds");
            }
            if !reach::in_range(unit.pos, tile, skill.range) {
                return Verdict::deny("tile out of range");
            }
        }
        SkillTarget::SelfUnit | SkillTarget::NoTarget => {}
    }
    Verdict::ok()
}

pub(crate) fn apply(mission: &mut Mission, action: &UseSkillAction, config: &TbsConfig) {
    let Some(caster) = mission.unit(&action.unit_id) else {
        return;
    };
    let Some(skill) = caster.skill(&action.skill_id).cloned() else {
        return;
    };
    let caster_side = caster.side;

    if let Some(caster) = mission.unit_mut(&action.unit_id) {
        caster.ap_left -= skill.ap_cost;
        if skill.cooldown > 0 {
            caster.skill_cooldowns.insert(skill.id.clone(), skill.cooldown + 1);
        }
        if let Some(left) = caster.charges_left(&skill) {
            caster.skill_charges.insert(skill.id.clone(), left.saturating_sub(1));
        }
    }

    match (skill.target, action.target_tile) {
        (SkillTarget::Tile, Some(center)) => {
            let offsets: Vec<Coord> = match &action.area_offsets {
                Some(offsets) => offsets.to_vec(),
                None => config.default_area_offsets.iter().copied().map(Coord::from).collect(),
            };
            apply_area(mission, &skill, caster_side, center, &offsets);
        }
        _ => {
            let target_id = match skill.target {
                SkillTarget::AllyUnit | SkillTarget::EnemyUnit => action
                    .target_unit_id
                    .clone()
                    .unwrap_or_else(|| action.unit_id.clone()),
                _ => action.unit_id.clone(),
            };
            apply_single(mission, &skill, &target_id);
        }
    }
}

/// Harmful effects land on the other side, beneficial ones on the caster's.
fn passes_polarity(value: i32, caster: Side, target: Side) -> bool {
    if value < 0 {
        target != caster
    } else if value > 0 {
        target == caster
    } else {
        true
    }
}

fn apply_single(mission: &mut Mission, skill: &Skill, target_id: &str) {
    let mut hp_add: Option<i32> = None;
    let mut hp_override: Option<i32> = None;
    let mut temp: Vec<StatModifier> = Vec::new();

    for m in &skill.apply_mods {
        match (m.stat, m.operation) {
            (StatName::Hp, Operation::Additive) => hp_add = Some(hp_add.unwrap_or(0) + m.value),
            (StatName::Hp, Operation::Override) => hp_override = Some(m.value),
            _ => temp.push(m.clone()),
        }
    }

    if let Some(target) = mission.unit_mut(target_id) {
        target.adjust_hp(hp_add, hp_override);
        attach_temp_mods(target, temp);
    }
}

fn apply_area(mission: &mut Mission, skill: &Skill, caster: Side, center: Coord, offsets: &[Coord]) {
    let hp_delta = skill
        .apply_mods
        .iter()
        .find(|m| m.stat == StatName::Hp && m.operation == Operation::Additive)
        .map(|m| m.value);

    for off in offsets {
        let Some(tile) = center.offset(off.x, off.y).filter(|t| mission.map.in_bounds(*t)) else {
            continue;
        };
        let struck: Vec<(String, Side)> = mission
            .living_units()
            .filter(|u| u.pos == tile)
            .map(|u| (u.id.clone(), u.side))
            .collect();

        for (id, side) in struck {
            if hp_delta.is_some_and(|d| !passes_polarity(d, caster, side)) {
                continue;
            }
            let temp: Vec<StatModifier> = skill
                .apply_mods
                .iter()
                .filter(|m| m.stat != StatName::Hp)
                .filter(|m| m.operation != Operation::Additive || passes_polarity(m.value, caster, side))
                .cloned()
                .collect();

            if let Some(unit) = mission.unit_mut(&id) {
                unit.adjust_hp(hp_delta, None);
                attach_temp_mods(unit, temp);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tbs::model::{MapGrid, Unit};
    use crate::tbs::turn;

    fn heal() -> Skill {
        Skill::active("heal", "Heal")
            .with_cost(1)
            .with_range(3)
            .with_target(SkillTarget::AllyUnit)
            .with_cooldown(1)
            .with_apply_mod(StatModifier::additive(StatName::Hp, 4))
    }

    fn blast() -> Skill {
        Skill::active("blast", "Blast")
            .with_cost(1)
            .with_range(5)
            .with_target(SkillTarget::Tile)
            .with_apply_mod(StatModifier::additive(StatName::Hp, -3))
            .with_apply_mod(StatModifier::additive(StatName::Def, -1).for_turns(1))
    }

    fn party() -> Mission {
        let caster = Unit::new("c", Side::Player, "Caster", Coord::new(0, 0))
            .with_stat(StatName::Init, 30)
            .with_skill(heal())
            .with_skill(blast())
            .with_skill(Skill::active("once", "Once").with_charges(1))
            .with_skill(Skill::passive("aura", "Aura"));
        let mut m = Mission::new("m", "M", MapGrid::new(6, 6))
            .with_unit(caster)
            .with_unit(Unit::new("ally", Side::Player, "Ally", Coord::new(1, 0)))
            .with_unit(Unit::new("e1", Side::Enemy, "E1", Coord::new(3, 3)))
            .with_unit(Unit::new("e2", Side::Enemy, "E2", Coord::new(4, 3)));
        turn::initialize(&mut m);
        m
    }

    fn verdict(m: &Mission, action: &UseSkillAction) -> Verdict {
        evaluate(m, action, &TbsConfig::default())
    }

    #[test]
    fn test_unit_target_reasons() {
        let m = party();
        assert_eq!(verdict(&m, &UseSkillAction::new("x", "heal")).explanation, "unknown unit");
        assert_eq!(verdict(&m, &UseSkillAction::new("ally", "heal")).explanation, "unit cannot act");
        assert_eq!(verdict(&m, &UseSkillAction::new("c", "nope")).explanation, "skill not found");
        assert_eq!(verdict(&m, &UseSkillAction::new("c", "aura")).explanation, "skill is passive");
        assert_eq!(verdict(&m, &UseSkillAction::new("c", "heal")).explanation, "missing target");
        assert_eq!(
            verdict(&m, &UseSkillAction::new("c", "heal").on_unit("e1")).explanation,
            "target not ally"
        );
        assert!(verdict(&m, &UseSkillAction::new("c", "heal").on_unit("ally")).legal);
    }

    #[test]
    fn test_tile_reasons() {
        let m = party();
        assert_eq!(verdict(&m, &UseSkillAction::new("c", "blast")).explanation, "missing target tile");
        assert_eq!(
            verdict(&m, &UseSkillAction::new("c", "blast").on_tile(Coord::new(9, 9))).explanation,
            "tile out of bounds"
        );
        assert_eq!(
            verdict(&m, &UseSkillAction::new("c", "blast").on_tile(Coord::new(5, 5))).explanation,
            "tile out of range"
        );
        assert!(verdict(&m, &UseSkillAction::new("c", "blast").on_tile(Coord::new(3, 2))).legal);
    }

    #[test]
    fn test_heal_is_capped_and_sets_cooldown() {
        let mut m = party();
        m.unit_mut("ally").unwrap().adjust_hp(Some(-2), None);
        let action = UseSkillAction::new("c", "heal").on_unit("ally");
        apply(&mut m, &action, &TbsConfig::default());

        assert_eq!(m.unit("ally").unwrap().base(StatName::Hp), 10);
        let c = m.unit("c").unwrap();
        assert_eq!(c.ap_left, 1);
        assert_eq!(c.cooldown("heal"), 2);
        assert_eq!(verdict(&m, &action).explanation, "on cooldown");
    }

    #[test]
    fn test_charges_run_out() {
        let mut m = party();
        let action = UseSkillAction::new("c", "once");
        assert!(verdict(&m, &action).legal);
        apply(&mut m, &action, &TbsConfig::default());
        assert_eq!(m.unit("c").unwrap().skill_charges.get("once"), Some(&0));
        assert_eq!(verdict(&m, &action).explanation, "no charges");
    }

    #[test]
    fn test_area_polarity() {
        let mut m = party();
        // 3x3 around (1,1) covers the caster, the ally; enemies are elsewhere.
        let action = UseSkillAction::new("c", "blast").on_tile(Coord::new(1, 1));
        apply(&mut m, &action, &TbsConfig::default());
        assert_eq!(m.unit("c").unwrap().base(StatName::Hp), 10);
        assert_eq!(m.unit("ally").unwrap().base(StatName::Hp), 10);
        assert!(m.unit("ally").unwrap().temp_mods.is_empty());
    }

    #[test]
    fn test_area_hits_enemies_with_custom_offsets() {
        let mut m = party();
        let action = UseSkillAction::new("c", "blast")
            .on_tile(Coord::new(3, 3))
            .with_area([(0, 0), (1, 0)]);
        apply(&mut m, &action, &TbsConfig::default());
        for id in ["e1", "e2"] {
            let e = m.unit(id).unwrap();
            assert_eq!(e.base(StatName::Hp), 7);
            assert_eq!(e.temp_mods.len(), 1);
        }
    }

    #[test]
    fn test_area_offsets_skip_out_of_bounds() {
        let mut m = party();
        let action = UseSkillAction::new("c", "blast")
            .on_tile(Coord::new(4, 3))
            .with_area([(0, 0), (5, 0), (-1, 0)]);
        apply(&mut m, &action, &TbsConfig::default());
        assert_eq!(m.unit("e1").unwrap().base(StatName::Hp), 7);
        assert_eq!(m.unit("e2").unwrap().base(StatName::Hp), 7);
    }

    #[test]
    fn test_area_offsets_skip_overflow() {
        let mut m = party();
        let action = UseSkillAction::new("c", "blast")
            .on_tile(Coord::new(3, 3))
            .with_area([(i32::MAX, 0), (0, i32::MIN), (0, 0)]);
        apply(&mut m, &action, &TbsConfig::default());
        assert_eq!(m.unit("e1").unwrap().base(StatName::Hp), 7);
        assert_eq!(m.unit("e2").unwrap().base(StatName::Hp), 10);
    }
}
