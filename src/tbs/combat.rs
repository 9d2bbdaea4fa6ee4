//! Damage resolution.
//!
//! Two paths share one formula:
//! - `compute_damage` / `apply_attack`: the exact integer damage that is
//!   actually dealt.
//! - `evaluate_attack`: a verbose, client-facing breakdown of the same
//!   computation (mitigation, crit expectation, clamp, display band).
//!
//! ## Formula
//!
//! `damage = max(min_damage, ATK - DEF)`, multiplied by `crit_multiplier`
//! when the attacker's effective CRIT reaches `crit_threshold`. A landed
//! attack always deals at least `min_damage`.

use serde::{Deserialize, Serialize};

use super::model::{Mission, StatName, Unit};
use super::stats::{self, StatBreakdown, StatTerm};
use crate::core::TbsConfig;

/// Deterministic damage `attacker` deals to `target`.
#[must_use]
pub fn compute_damage(mission: &Mission, attacker: &Unit, target: &Unit, config: &TbsConfig) -> i32 {
    let atk = stats::effective(mission, attacker, StatName::Atk);
    let def = stats::effective(mission, target, StatName::Def);
    let base = (atk - def).max(config.min_damage);
    if stats::effective(mission, attacker, StatName::Crit) >= config.crit_threshold {
        base * config.crit_multiplier
    } else {
        base
    }
}

/// What an attack would do, without doing it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackPreview {
    pub predicted: i32,
    pub hp_before: i32,
    pub hp_after: i32,
    pub lethal: bool,
}

pub fn preview(mission: &Mission, attacker: &Unit, target: &Unit, config: &TbsConfig) -> AttackPreview {
    let predicted = compute_damage(mission, attacker, target, config);
    let hp_before = stats::effective(mission, target, StatName::Hp);
    let hp_after = (hp_before - predicted.max(config.min_damage)).max(0);
    AttackPreview {
        predicted,
        hp_before,
        hp_after,
        lethal: hp_after == 0,
    }
}

/// Resolve an attack in place. Returns the damage dealt, or `None` if
/// either unit is unknown.
///
/// The target's base HP is rewritten from its *effective* HP minus damage,
/// so HP modifiers are folded into the base on the first hit.
pub fn apply_attack(
    mission: &mut Mission,
    attacker_id: &str,
    target_id: &str,
    config: &TbsConfig,
) -> Option<i32> {
    let (dmg, hp) = {
        let attacker = mission.unit(attacker_id)?;
        let target = mission.unit(target_id)?;
        let dmg = compute_damage(mission, attacker, target, config).max(config.min_damage);
        (dmg, stats::effective(mission, target, StatName::Hp) - dmg)
    };

    let target = mission.unit_mut(target_id)?;
    target.stats.set(StatName::Hp, hp.max(0));
    if hp <= 0 {
        target.alive = false;
    }
    Some(dmg)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DamageType {
    Physical,
    Magic,
    True,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Penetration {
    pub flat: f64,
    pub pct: f64,
}

/// Every stage of the damage pipeline, for display.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DamageBreakdown {
    pub damage_type: DamageType,
    pub attack: StatBreakdown,
    pub defense: StatBreakdown,
    pub penetration: Penetration,
    pub pre_mitigation: f64,
    pub effective_defense: f64,
    pub raw_after_def: f64,
    pub skill_ratio: f64,
    pub flat_power: f64,
    pub final_before_crit: f64,
    pub crit_chance: f64,
    pub crit_mult: f64,
    pub crit_expected: f64,
    pub block_flat: f64,
    pub block_mult: f64,
    pub final_after_block: f64,
    pub min_cap: Option<f64>,
    pub max_cap: Option<f64>,
    pub final_capped: f64,
    pub immune: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HitChanceBreakdown {
    pub accuracy: StatBreakdown,
    pub evasion: StatBreakdown,
    pub base: f64,
    pub mods: Vec<StatTerm>,
    pub result: f64,
}

/// Client-facing evaluation of a single attack.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttackEvaluation {
    pub action_type: String,
    pub attacker_id: String,
    pub target_id: String,
    pub ap_cost: i32,
    pub summary: String,
    pub expected_damage: f64,
    pub min_damage: f64,
    pub max_damage: f64,
    pub damage: DamageBreakdown,
    pub hit: HitChanceBreakdown,
    pub legality_ok: bool,
    pub illegal_reasons: Vec<String>,
}

/// Build the full attack breakdown. `None` if either unit is unknown.
///
/// `min_damage`/`max_damage` are a presentation band around the expected
/// value; they never influence applied damage.
pub fn evaluate_attack(
    mission: &Mission,
    attacker_id: &str,
    target_id: &str,
    config: &TbsConfig,
) -> Option<AttackEvaluation> {
    let attacker = mission.unit(attacker_id)?;
    let target = mission.unit(target_id)?;

    let atk = stats::effective_with_trace(mission, attacker, StatName::Atk);
    let def = stats::effective_with_trace(mission, target, StatName::Def);

    let penetration = Penetration::default();
    let effective_defense =
        (f64::from(def.value) * (1.0 - penetration.pct) - penetration.flat).max(0.0);

    let skill_ratio = 1.0;
    let flat_power = 0.0;
    let pre_mitigation = (f64::from(atk.value) - effective_defense).max(0.0);
    let raw_after_def = pre_mitigation * skill_ratio + flat_power;
    let final_before_crit = raw_after_def;

    let crit = stats::effective(mission, attacker, StatName::Crit);
    let crit_chance = if crit >= config.crit_threshold { 1.0 } else { 0.0 };
    let crit_mult = f64::from(config.crit_multiplier);
    let crit_expected = crit_chance * (crit_mult - 1.0) * final_before_crit;

    let block_flat = 0.0;
    let block_mult = 0.0;
    let final_after_block = ((final_before_crit + crit_expected) - block_flat).max(0.0) * (1.0 + block_mult);

    let immune = false;
    let min_cap = f64::from(config.min_damage);
    let max_cap: Option<f64> = None;
    let final_capped = if immune {
        0.0
    } else {
        let capped = max_cap.map_or(final_after_block, |cap| final_after_block.min(cap));
        capped.max(min_cap)
    };

    let hit = HitChanceBreakdown {
        accuracy: StatBreakdown::empty("accuracy"),
        evasion: StatBreakdown::empty("evasion"),
        base: 100.0,
        mods: Vec::new(),
        result: 100.0,
    };

    let spread = f64::from(config.preview_spread_pct) / 100.0;
    let floor = if immune { 0.0 } else { min_cap };
    let min_damage = (final_capped * (1.0 - spread)).max(floor);
    let max_damage = final_capped * (1.0 + spread);
    let ap_cost = config.attack_ap_cost;
    let summary = format!(
        "Hit {}% for {}–{} (avg {:.1}). AP:{}",
        hit.result.round() as i64,
        min_damage as i64,
        max_damage as i64,
        final_capped,
        ap_cost
    );

    Some(AttackEvaluation {
        action_type: "attack".to_string(),
        attacker_id: attacker_id.to_string(),
        target_id: target_id.to_string(),
        ap_cost,
        summary,
        expected_damage: final_capped,
        min_damage,
        max_damage,
        damage: DamageBreakdown {
            damage_type: DamageType::Physical,
            attack: atk.breakdown,
            defense: def.breakdown,
            penetration,
            pre_mitigation,
            effective_defense,
            raw_after_def,
            skill_ratio,
            flat_power,
            final_before_crit,
            crit_chance,
            crit_mult,
            crit_expected,
            block_flat,
            block_mult,
            final_after_block,
            min_cap: Some(min_cap),
            max_cap,
            final_capped,
            immune,
        },
        hit,
        legality_ok: true,
        illegal_reasons: Vec::new(),
    })
}
