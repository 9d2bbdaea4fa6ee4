//! Temporary modifiers and cooldown bookkeeping.
//!
//! Skill effects that are not direct HP changes attach to a unit's
//! `temp_mods` list. Each end-turn runs one sweep over that list:
//! permanent entries (`duration_turns == None`) are skipped, entries with
//! more than one turn left are decremented, the rest are dropped.

use super::model::{StatModifier, Unit};

/// Attach skill-applied modifiers to `unit`.
pub fn attach_temp_mods(unit: &mut Unit, mods: impl IntoIterator<Item = StatModifier>) {
    unit.temp_mods.extend(mods);
}

/// Advance every temporary modifier by one turn, compacting in place.
pub fn decay_temporary_mods(unit: &mut Unit) {
    unit.temp_mods.retain_mut(|m| match m.duration_turns {
        None => true,
        Some(turns) if turns > 1 => {
            m.duration_turns = Some(turns - 1);
            true
        }
        Some(_) => false,
    });
}

/// Count every skill cooldown down by one, flooring at zero.
pub fn tick_cooldowns(unit: &mut Unit) {
    for turns in unit.skill_cooldowns.values_mut() {
        *turns = turns.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tbs::model::{Coord, Side, StatName};

    #[test]
    fn test_decay_sweep() {
        let mut u = Unit::new("u", Side::Player, "U", Coord::new(0, 0));
        attach_temp_mods(
            &mut u,
            [
                StatModifier::additive(StatName::Atk, 1),
                StatModifier::additive(StatName::Def, 1).for_turns(2),
                StatModifier::additive(StatName::Mov, 1).for_turns(1),
                StatModifier::additive(StatName::Rng, 1).for_turns(0),
            ],
        );

        decay_temporary_mods(&mut u);
        assert_eq!(u.temp_mods.len(), 2);
        assert_eq!(u.temp_mods[0].duration_turns, None);
        assert_eq!(u.temp_mods[1].duration_turns, Some(1));

        decay_temporary_mods(&mut u);
        assert_eq!(u.temp_mods.len(), 1);
        assert_eq!(u.temp_mods[0].stat, StatName::Atk);
    }

    #[test]
    fn test_cooldowns_floor_at_zero() {
        let mut u = Unit::new("u", Side::Player, "U", Coord::new(0, 0));
        u.skill_cooldowns.insert("a".into(), 2);
        u.skill_cooldowns.insert("b".into(), 0);
        tick_cooldowns(&mut u);
        assert_eq!(u.cooldown("a"), 1);
        assert_eq!(u.cooldown("b"), 0);
    }
}
