//! The stock "Demo Skirmish" mission.
//!
//! An 8x8 field split by a river on row 3 with a two-tile bridge at x=3..4.
//! Three player units (fighter, priest, mage) start north of the river; two
//! goblins wait to the south. Win by eliminating both goblins within 20
//! turns.

use super::engine::TbsEngine;
use super::model::{
    Coord, Goal, Item, MapGrid, Mission, Side, Skill, SkillTarget, StatModifier, StatName, Terrain, Unit,
};
use super::session::TbsSession;

pub const DEMO_MISSION_ID: &str = "mission.demo";

const FORESTS: [(i32, i32); 6] = [(1, 0), (2, 0), (1, 1), (6, 2), (0, 5), (1, 5)];
const HILLS: [(i32, i32); 3] = [(6, 1), (2, 5), (5, 6)];
const BRIDGE: [(i32, i32); 2] = [(3, 3), (4, 3)];

fn demo_map() -> MapGrid {
    let mut map = MapGrid::new(8, 8);
    for x in 0..8 {
        map = map.with_terrain(Coord::new(x, 3), Terrain::Water);
    }
    for (x, y) in BRIDGE {
        map = map.with_terrain(Coord::new(x, y), Terrain::Plain);
    }
    for (x, y) in FORESTS {
        map = map.with_terrain(Coord::new(x, y), Terrain::Forest);
    }
    for (x, y) in HILLS {
        map = map.with_terrain(Coord::new(x, y), Terrain::Hill);
    }
    map.with_terrain(Coord::new(0, 7), Terrain::Blocked)
}

fn goblin(id: &str, pos: Coord, init: i32) -> Unit {
    Unit::new(id, Side::Enemy, "Goblin", pos)
        .with_stat(StatName::Hp, 8)
        .with_stat(StatName::Ap, 2)
        .with_stat(StatName::Atk, 2)
        .with_stat(StatName::Def, 0)
        .with_stat(StatName::Mov, 4)
        .with_stat(StatName::Rng, 1)
        .with_stat(StatName::Crit, 0)
        .with_stat(StatName::Init, init)
}

/// Build the demo mission, not yet initialized.
pub fn demo_mission() -> Mission {
    let sword = Item::new("item.sword", "Iron Sword").with_mod(StatModifier::additive(StatName::Atk, 2));
    let armor = Item::new("item.armor", "Leather Armor").with_mod(StatModifier::additive(StatName::Def, 1));

    let focus = Skill::passive("skill.passive.focus", "Keen Focus")
        .with_passive_mod(StatModifier::additive(StatName::Crit, 10));
    let shout = Skill::active("skill.active.shout", "War Shout")
        .with_cost(1)
        .with_range(2)
        .with_target(SkillTarget::AllyUnit)
        .with_cooldown(2)
        .with_apply_mod(StatModifier::additive(StatName::Atk, 1).for_turns(2));
    let heal = Skill::active("skill.active.heal", "Heal")
        .with_cost(1)
        .with_range(3)
        .with_target(SkillTarget::AllyUnit)
        .with_cooldown(1)
        .with_apply_mod(StatModifier::additive(StatName::Hp, 4));
    let fireball = Skill::active("skill.active.fireball", "Fireball")
        .with_cost(2)
        .with_range(4)
        .with_target(SkillTarget::Tile)
        .with_cooldown(2)
        .with_apply_mod(StatModifier::additive(StatName::Hp, -3));
    let trance = Skill::active("skill.active.rally_self", "Battle Trance")
        .with_cost(1)
        .with_target(SkillTarget::SelfUnit)
        .with_cooldown(2)
        .with_apply_mod(StatModifier::additive(StatName::Atk, 1).for_turns(2));

    Mission::new(DEMO_MISSION_ID, "Demo Skirmish", demo_map())
        .with_unit(
            Unit::new("u.fighter", Side::Player, "Fighter", Coord::new(1, 1))
                .with_item(sword)
                .with_item(armor)
                .with_skill(shout)
                .with_skill(focus),
        )
        .with_unit(Unit::new("u.priest", Side::Player, "Priest", Coord::new(2, 1)).with_skill(heal))
        .with_unit(
            Unit::new("u.mage", Side::Player, "Mage", Coord::new(0, 2))
                .with_skill(fireball)
                .with_skill(trance),
        )
        .with_unit(goblin("e.goblin1", Coord::new(5, 5), 8))
        .with_unit(goblin("e.goblin2", Coord::new(6, 5), 7))
        .with_max_turns(20)
        .with_goal(Goal::eliminate_all_enemies())
        .with_pre_event("intro", "Cross the river and defeat the goblins!")
}

/// The demo mission, initialized and wrapped in a session.
pub fn demo_session(id: impl Into<String>, engine: &TbsEngine) -> TbsSession {
    let mut mission = demo_mission();
    engine.initialize_mission(&mut mission);
    TbsSession::new(id, mission)
}
