//! Effective stat resolution.
//!
//! A unit's effective stat is its base value after every applicable modifier
//! has been stacked. Modifiers are gathered in a fixed order:
//!
//! 1. the unit's items
//! 2. injuries
//! 3. temporary (skill-applied) modifiers
//! 4. the unit's own auras
//! 5. auras of other *living* units within Manhattan distance <= radius
//! 6. the tile the unit stands on
//! 7. passive skill modifiers
//! 8. mission-global modifiers
//!
//! Additives sum, multiplicatives multiply as `(1 + v/100)`, and when more
//! than one override applies the **last one in gathering order wins**. The
//! result is `max(0, floor(base_or_override * factor) + additive_sum)`.

use serde::{Deserialize, Serialize};

use super::model::{Mission, ModifierSource, Operation, StatModifier, StatName, Unit};

/// Display category of a breakdown term.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermKind {
    Item,
    Buff,
    Debuff,
    Terrain,
    Skill,
    Context,
}

impl From<ModifierSource> for TermKind {
    fn from(source: ModifierSource) -> Self {
        match source {
            ModifierSource::Item => TermKind::Item,
            ModifierSource::Aura => TermKind::Buff,
            ModifierSource::Map => TermKind::Terrain,
            ModifierSource::Injury => TermKind::Debuff,
            ModifierSource::Skill => TermKind::Skill,
            ModifierSource::Global => TermKind::Context,
        }
    }
}

/// One contributing modifier, normalized for display.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatTerm {
    pub kind: TermKind,
    pub source: ModifierSource,
    pub op: Operation,
    /// Flat delta for additive terms, fraction (`0.2`) for multiplicative.
    pub value: f64,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatBreakdown {
    pub name: String,
    pub base: f64,
    pub terms: Vec<StatTerm>,
    pub result: f64,
}

impl StatBreakdown {
    /// A zeroed breakdown for stats the model does not track.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: 0.0,
            terms: Vec::new(),
            result: 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectiveStat {
    pub value: i32,
    pub breakdown: StatBreakdown,
}

/// Every modifier that could touch `unit`, in resolution order.
pub fn gather<'a>(mission: &'a Mission, unit: &'a Unit) -> impl Iterator<Item = &'a StatModifier> + 'a {
    let items = unit.items.iter().flat_map(|i| i.mods.iter());
    let injuries = unit.injuries.iter().flat_map(|i| i.mods.iter());
    let own_auras = unit.auras.iter().flat_map(|a| a.mods.iter());
    let nearby_auras = mission
        .units
        .values()
        .filter(move |other| other.alive && other.id != unit.id)
        .flat_map(move |other| {
            let dist = unit.pos.manhattan(other.pos);
            other
                .auras
                .iter()
                .filter(move |a| dist <= a.radius)
                .flat_map(|a| a.mods.iter())
        });
    let tile = mission.map.tile(unit.pos).into_iter().flat_map(|t| t.mods.iter());
    let passives = unit.skills.iter().flat_map(|s| s.passive_mods.iter());

    items
        .chain(injuries)
        .chain(unit.temp_mods.iter())
        .chain(own_auras)
        .chain(nearby_auras)
        .chain(tile)
        .chain(passives)
        .chain(mission.global_mods.iter())
}

#[derive(Default)]
struct Stack {
    additive: i32,
    factor: Option<f64>,
    override_value: Option<i32>,
}

impl Stack {
    fn push(&mut self, m: &StatModifier) {
        match m.operation {
            Operation::Additive => self.additive += m.value,
            Operation::Multiplicative => {
                let f = self.factor.unwrap_or(1.0);
                self.factor = Some(f * (1.0 + f64::from(m.value) / 100.0));
            }
            Operation::Override => self.override_value = Some(m.value),
        }
    }

    fn resolve(&self, base: i32) -> i32 {
        let start = self.override_value.unwrap_or(base);
        let scaled = match self.factor {
            Some(f) => (f64::from(start) * f).floor() as i32,
            None => start,
        };
        (scaled + self.additive).max(0)
    }
}

/// Effective value of `stat` for `unit`.
#[must_use]
pub fn effective(mission: &Mission, unit: &Unit, stat: StatName) -> i32 {
    let mut stack = Stack::default();
    for m in gather(mission, unit).filter(|m| m.stat == stat) {
        stack.push(m);
    }
    stack.resolve(unit.base(stat))
}

/// Effective value plus the term-by-term attribution.
pub fn effective_with_trace(mission: &Mission, unit: &Unit, stat: StatName) -> EffectiveStat {
    let base = unit.base(stat);
    let mut stack = Stack::default();
    let mut terms = Vec::new();

    for m in gather(mission, unit).filter(|m| m.stat == stat) {
        stack.push(m);
        let term = match m.operation {
            Operation::Additive => StatTerm {
                kind: m.source.into(),
                source: m.source,
                op: Operation::Additive,
                value: f64::from(m.value),
                note: None,
            },
            Operation::Multiplicative => StatTerm {
                kind: m.source.into(),
                source: m.source,
                op: Operation::Multiplicative,
                value: f64::from(m.value) / 100.0,
                note: None,
            },
            // Shown as the flat delta from base it amounts to.
            Operation::Override => StatTerm {
                kind: m.source.into(),
                source: m.source,
                op: Operation::Additive,
                value: f64::from(m.value - base),
                note: Some("override".to_string()),
            },
        };
        terms.push(term);
    }

    let value = stack.resolve(base);
    EffectiveStat {
        value,
        breakdown: StatBreakdown {
            name: stat.label().to_string(),
            base: f64::from(base),
            terms,
            result: f64::from(value),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tbs::model::{Aura, Coord, Injury, Item, MapGrid, Side, Skill};

    fn mission_with(unit: Unit) -> Mission {
        Mission::new("m", "M", MapGrid::new(6, 6)).with_unit(unit)
    }

    fn fighter() -> Unit {
        Unit::new("u", Side::Player, "Fighter", Coord::new(1, 1))
    }

    #[test]
    fn test_base_without_mods() {
        let m = mission_with(fighter());
        let u = m.unit("u").unwrap();
        assert_eq!(effective(&m, u, StatName::Atk), 3);
    }

    #[test]
    fn test_additive_and_multiplicative() {
        let unit = fighter()
            .with_stat(StatName::Atk, 10)
            .with_item(Item::new("i", "Blade").with_mod(StatModifier::additive(StatName::Atk, 2)))
            .with_item(Item::new("j", "Rune").with_mod(StatModifier::multiplicative(StatName::Atk, 50)));
        let m = mission_with(unit);
        let u = m.unit("u").unwrap();
        // floor(10 * 1.5) + 2
        assert_eq!(effective(&m, u, StatName::Atk), 17);
    }

    #[test]
    fn test_last_override_wins() {
        let unit = fighter()
            .with_item(Item::new("i", "A").with_mod(StatModifier::overriding(StatName::Def, 7)))
            .with_skill(Skill::passive("p", "P").with_passive_mod(StatModifier::overriding(StatName::Def, 4)));
        let m = mission_with(unit);
        let u = m.unit("u").unwrap();
        assert_eq!(effective(&m, u, StatName::Def), 4);
    }

    #[test]
    fn test_never_negative() {
        let unit = fighter().with_injury(Injury {
            id: "x".into(),
            name: "Broken arm".into(),
            mods: vec![StatModifier::additive(StatName::Atk, -20).from_source(ModifierSource::Injury)],
        });
        let m = mission_with(unit);
        let u = m.unit("u").unwrap();
        assert_eq!(effective(&m, u, StatName::Atk), 0);
    }

    #[test]
    fn test_nearby_aura_requires_living_owner_in_radius() {
        let banner = Aura {
            id: "a".into(),
            name: "Banner".into(),
            radius: 2,
            mods: vec![StatModifier::additive(StatName::Def, 3).from_source(ModifierSource::Aura)],
        };
        let near = Unit::new("b", Side::Player, "Bearer", Coord::new(2, 2)).with_aura(banner.clone());
        let far = Unit::new("c", Side::Player, "Far", Coord::new(5, 5)).with_aura(banner);
        let m = mission_with(fighter()).with_unit(near).with_unit(far);
        let u = m.unit("u").unwrap();
        assert_eq!(effective(&m, u, StatName::Def), 1 + 3);

        let mut m2 = m.clone();
        m2.unit_mut("b").unwrap().alive = false;
        let u = m2.unit("u").unwrap();
        assert_eq!(effective(&m2, u, StatName::Def), 1);
    }

    #[test]
    fn test_tile_and_global_mods() {
        let map = MapGrid::new(4, 4).with_tile_mod(Coord::new(1, 1), StatModifier::additive(StatName::Def, 2));
        let m = Mission::new("m", "M", map)
            .with_unit(fighter())
            .with_global_mod(StatModifier::additive(StatName::Def, 1));
        let u = m.unit("u").unwrap();
        assert_eq!(effective(&m, u, StatName::Def), 4);
    }

    #[test]
    fn test_temp_mods_count() {
        let mut unit = fighter();
        unit.temp_mods.push(StatModifier::additive(StatName::Atk, 1).for_turns(2));
        let m = mission_with(unit);
        let u = m.unit("u").unwrap();
        assert_eq!(effective(&m, u, StatName::Atk), 4);
    }

    #[test]
    fn test_trace_terms() {
        let unit = fighter()
            .with_item(Item::new("i", "Blade").with_mod(StatModifier::additive(StatName::Atk, 2)))
            .with_item(Item::new("j", "Rune").with_mod(StatModifier::multiplicative(StatName::Atk, 20)))
            .with_item(Item::new("k", "Curse").with_mod(StatModifier::overriding(StatName::Atk, 5)));
        let m = mission_with(unit);
        let u = m.unit("u").unwrap();
        let eff = effective_with_trace(&m, u, StatName::Atk);

        assert_eq!(eff.breakdown.name, "atk");
        assert_eq!(eff.breakdown.base, 3.0);
        assert_eq!(eff.breakdown.terms.len(), 3);
        assert_eq!(eff.breakdown.terms[0].kind, TermKind::Item);
        assert!((eff.breakdown.terms[1].value - 0.2).abs() < 1e-9);
        assert_eq!(eff.breakdown.terms[2].op, Operation::Additive);
        assert_eq!(eff.breakdown.terms[2].value, 2.0);
        assert_eq!(eff.breakdown.terms[2].note.as_deref(), Some("override"));
        // floor(5 * 1.2) + 2
        assert_eq!(eff.value, 8);
        assert_eq!(eff.value, effective(&m, u, StatName::Atk));
    }
}
