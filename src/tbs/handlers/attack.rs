//! ATTACK: basic attack against a unit within effective RNG.

use super::{can_act, Verdict};
use crate::core::TbsConfig;
use crate::tbs::action::AttackAction;
use crate::tbs::combat;
use crate::tbs::model::{Mission, StatName};
use crate::tbs::{reach, stats};

pub fn evaluate(mission: &Mission, action: &AttackAction, config: &TbsConfig) -> Verdict {
    let (Some(attacker), Some(target)) = (
        mission.unit(&action.attacker_id),
        mission.unit(&action.target_id),
    ) else {
        return Verdict::deny("unknown unit(s)");
    };
    if !can_act(mission, attacker) {
        return Verdict::deny("attacker cannot act");
    }
    if attacker.ap_left < config.attack_ap_cost {
        return Verdict::deny("no AP left");
    }
    if attacker.id == target.id {
        return Verdict::deny("cannot target self");
    }
    if !target.alive {
        return Verdict::deny("target already down");
    }
    let rng = stats::effective(mission, attacker, StatName::Rng);
    if !reach::in_range(attacker.pos, target.pos, rng) {
        return Verdict::deny("out of range");
    }

    let p = combat::preview(mission, attacker, target, config);
    Verdict::ok_with(format!(
        "ok (predicted_damage={}, target_hp_before={}, target_hp_after={}, would_defeat={})",
        p.predicted,
        p.hp_before,
        p.hp_after,
        if p.lethal { "yes" } else { "no" }
    ))
}

pub(crate) fn apply(mission: &mut Mission, action: &AttackAction, config: &TbsConfig) {
    combat::apply_attack(mission, &action.attacker_id, &action.target_id, config);
    if let Some(attacker) = mission.unit_mut(&action.attacker_id) {
        attacker.ap_left -= config.attack_ap_cost;
    }
}
