//! Tactical battle data model.
//!
//! ## Ownership
//!
//! A `Mission` is the aggregate root: it owns the map, every unit, the
//! initiative order and the victory goals. Units live in an `im::OrdMap`
//! keyed by id, so cloning a mission (for a scratch probe or a new session
//! value) is O(1) and iteration order is stable.
//!
//! Units are never removed. A unit at 0 HP has `alive == false` and stays on
//! the map for targeting and occupancy queries.
//!
//! ## Wire format
//!
//! Enums serialize in `SCREAMING_SNAKE_CASE` (`"ENEMY"`, `"ALLY_UNIT"`),
//! stats in upper case (`"HP"`, `"ATK"`), coordinates as `[x, y]`.

use std::collections::BTreeMap;
use std::fmt;

use im::OrdMap;
use serde::{Deserialize, Serialize};

/// Grid coordinate, serialized as `[x, y]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance. All ranges in the battle rules use it.
    #[must_use]
    /// Saturates at `i32::MAX` for far-apart coordinates.
    pub const fn manhattan(self, other: Coord) -> i32 {
        let d = self.x.abs_diff(other.x).saturating_add(self.y.abs_diff(other.y));
        if d > i32::MAX as u32 {
            i32::MAX
        } else {
            d as i32
        }
    }

    /// Shifted coordinate, or `None` when either axis overflows.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        match (self.x.checked_add(dx), self.y.checked_add(dy)) {
            (Some(x), Some(y)) => Some(Self::new(x, y)),
            _ => None,
        }
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl From<Coord> for (i32, i32) {
    fn from(c: Coord) -> Self {
        (c.x, c.y)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Player,
    Enemy,
    Neutral,
}

impl Side {
    /// Initiative tie-break: player units act first among equals.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Side::Player => 0,
            Side::Enemy | Side::Neutral => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Terrain {
    #[default]
    Plain,
    Forest,
    Hill,
    Water,
    Blocked,
}

impl Terrain {
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        !matches!(self, Terrain::Water | Terrain::Blocked)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatName {
    Hp,
    Ap,
    Atk,
    Def,
    Mov,
    Rng,
    Crit,
    Init,
}

impl StatName {
    pub const ALL: [StatName; 8] = [
        StatName::Hp,
        StatName::Ap,
        StatName::Atk,
        StatName::Def,
        StatName::Mov,
        StatName::Rng,
        StatName::Crit,
        StatName::Init,
    ];

    /// Lower-case label used in stat breakdowns.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            StatName::Hp => "hp",
            StatName::Ap => "ap",
            StatName::Atk => "atk",
            StatName::Def => "def",
            StatName::Mov => "mov",
            StatName::Rng => "rng",
            StatName::Crit => "crit",
            StatName::Init => "init",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    Additive,
    Multiplicative,
    Override,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModifierSource {
    Item,
    Aura,
    Map,
    Injury,
    Skill,
    #[default]
    Global,
}

/// A single stat adjustment.
///
/// `Multiplicative` values are percentages (`+20` means x1.2).
/// `duration_turns == None` means permanent while the source exists.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatModifier {
    pub stat: StatName,
    pub operation: Operation,
    pub value: i32,
    #[serde(default)]
    pub source: ModifierSource,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub duration_turns: Option<u32>,
}

impl StatModifier {
    #[must_use]
    pub const fn new(stat: StatName, operation: Operation, value: i32) -> Self {
        Self {
            stat,
            operation,
            value,
            source: ModifierSource::Global,
            tag: None,
            duration_turns: None,
        }
    }

    #[must_use]
    pub const fn additive(stat: StatName, value: i32) -> Self {
        Self::new(stat, Operation::Additive, value)
    }

    #[must_use]
    pub const fn multiplicative(stat: StatName, pct: i32) -> Self {
        Self::new(stat, Operation::Multiplicative, pct)
    }

    #[must_use]
    pub const fn overriding(stat: StatName, value: i32) -> Self {
        Self::new(stat, Operation::Override, value)
    }

    #[must_use]
    pub fn from_source(mut self, source: ModifierSource) -> Self {
        self.source = source;
        self
    }

    #[must_use]
    pub fn for_turns(mut self, turns: u32) -> Self {
        self.duration_turns = Some(turns);
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkillKind {
    Passive,
    #[default]
    Active,
}

/// What a skill is aimed at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillTarget {
    #[serde(rename = "SELF")]
    SelfUnit,
    #[serde(rename = "ENEMY_UNIT")]
    EnemyUnit,
    #[serde(rename = "ALLY_UNIT")]
    AllyUnit,
    #[serde(rename = "TILE")]
    Tile,
    #[default]
    #[serde(rename = "NONE")]
    NoTarget,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub kind: SkillKind,
    #[serde(default)]
    pub ap_cost: i32,
    #[serde(default)]
    pub range: i32,
    #[serde(default)]
    pub target: SkillTarget,
    #[serde(default)]
    pub cooldown: u32,
    /// Finite uses per mission; `None` is unlimited.
    #[serde(default)]
    pub charges: Option<u32>,
    /// Modifiers resolved when the skill is used.
    #[serde(default)]
    pub apply_mods: Vec<StatModifier>,
    /// Modifiers always active on the owner.
    #[serde(default)]
    pub passive_mods: Vec<StatModifier>,
}

impl Skill {
    pub fn active(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: SkillKind::Active,
            ap_cost: 0,
            range: 0,
            target: SkillTarget::NoTarget,
            cooldown: 0,
            charges: None,
            apply_mods: Vec::new(),
            passive_mods: Vec::new(),
        }
    }

    pub fn passive(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: SkillKind::Passive,
            ..Self::active(id, name)
        }
    }

    #[must_use]
    pub fn with_cost(mut self, ap: i32) -> Self {
        self.ap_cost = ap;
        self
    }

    #[must_use]
    pub fn with_range(mut self, range: i32) -> Self {
        self.range = range;
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: SkillTarget) -> Self {
        self.target = target;
        self
    }

    #[must_use]
    pub fn with_cooldown(mut self, turns: u32) -> Self {
        self.cooldown = turns;
        self
    }

    #[must_use]
    pub fn with_charges(mut self, charges: u32) -> Self {
        self.charges = Some(charges);
        self
    }

    #[must_use]
    pub fn with_apply_mod(mut self, m: StatModifier) -> Self {
        self.apply_mods.push(m.from_source(ModifierSource::Skill));
        self
    }

    #[must_use]
    pub fn with_passive_mod(mut self, m: StatModifier) -> Self {
        self.passive_mods.push(m.from_source(ModifierSource::Skill));
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mods: Vec<StatModifier>,
}

impl Item {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mods: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_mod(mut self, m: StatModifier) -> Self {
        self.mods.push(m.from_source(ModifierSource::Item));
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Injury {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mods: Vec<StatModifier>,
}

/// Modifiers projected onto every living unit within `radius`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aura {
    pub id: String,
    pub name: String,
    pub radius: i32,
    #[serde(default)]
    pub mods: Vec<StatModifier>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    #[serde(default)]
    pub terrain: Terrain,
    #[serde(default)]
    pub mods: Vec<StatModifier>,
}

/// Fixed-size grid, stored row-major as `tiles[y][x]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapGrid {
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<Vec<Tile>>,
}

impl MapGrid {
    /// An all-plain grid.
    pub fn new(width: i32, height: i32) -> Self {
        let row = vec![Tile::default(); width.max(0) as usize];
        Self {
            width,
            height,
            tiles: vec![row; height.max(0) as usize],
        }
    }

    #[must_use]
    pub fn in_bounds(&self, c: Coord) -> bool {
        c.x >= 0 && c.y >= 0 && c.x < self.width && c.y < self.height
    }

    pub fn tile(&self, c: Coord) -> Option<&Tile> {
        if !self.in_bounds(c) {
            return None;
        }
        self.tiles.get(c.y as usize).and_then(|row| row.get(c.x as usize))
    }

    pub fn tile_mut(&mut self, c: Coord) -> Option<&mut Tile> {
        if !self.in_bounds(c) {
            return None;
        }
        self.tiles
            .get_mut(c.y as usize)
            .and_then(|row| row.get_mut(c.x as usize))
    }

    /// False for out-of-bounds coordinates.
    #[must_use]
    pub fn is_walkable(&self, c: Coord) -> bool {
        self.tile(c).is_some_and(|t| t.terrain.is_walkable())
    }

    #[must_use]
    pub fn with_terrain(mut self, c: Coord, terrain: Terrain) -> Self {
        if let Some(tile) = self.tile_mut(c) {
            tile.terrain = terrain;
        }
        self
    }

    #[must_use]
    pub fn with_tile_mod(mut self, c: Coord, m: StatModifier) -> Self {
        if let Some(tile) = self.tile_mut(c) {
            tile.mods.push(m.from_source(ModifierSource::Map));
        }
        self
    }
}

/// Base stat values. Stats absent from the map read as 0.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBlock {
    pub base: BTreeMap<StatName, i32>,
}

impl Default for StatBlock {
    fn default() -> Self {
        let base = [
            (StatName::Hp, 10),
            (StatName::Ap, 2),
            (StatName::Atk, 3),
            (StatName::Def, 1),
            (StatName::Mov, 4),
            (StatName::Rng, 1),
            (StatName::Crit, 5),
            (StatName::Init, 10),
        ];
        Self {
            base: base.into_iter().collect(),
        }
    }
}

impl StatBlock {
    #[must_use]
    pub fn get(&self, stat: StatName) -> i32 {
        self.base.get(&stat).copied().unwrap_or(0)
    }

    pub fn set(&mut self, stat: StatName, value: i32) {
        self.base.insert(stat, value);
    }
}

/// Tag prefix recording a unit's starting HP, used to cap healing.
pub const MAX_HP_TAG: &str = "MAX_HP=";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: String,
    pub side: Side,
    pub name: String,
    pub pos: Coord,
    #[serde(default)]
    pub stats: StatBlock,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub injuries: Vec<Injury>,
    /// Skill-applied buffs and debuffs; decayed once per end-turn.
    #[serde(default)]
    pub temp_mods: Vec<StatModifier>,
    #[serde(default)]
    pub auras: Vec<Aura>,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_alive")]
    pub alive: bool,
    #[serde(default)]
    pub ap_left: i32,
    #[serde(default)]
    pub skill_cooldowns: BTreeMap<String, u32>,
    #[serde(default)]
    pub skill_charges: BTreeMap<String, u32>,
}

fn default_alive() -> bool {
    true
}

impl Unit {
    pub fn new(id: impl Into<String>, side: Side, name: impl Into<String>, pos: Coord) -> Self {
        Self {
            id: id.into(),
            side,
            name: name.into(),
            pos,
            stats: StatBlock::default(),
            items: Vec::new(),
            injuries: Vec::new(),
            temp_mods: Vec::new(),
            auras: Vec::new(),
            skills: Vec::new(),
            tags: Vec::new(),
            alive: true,
            ap_left: 0,
            skill_cooldowns: BTreeMap::new(),
            skill_charges: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_stat(mut self, stat: StatName, value: i32) -> Self {
        self.stats.set(stat, value);
        self
    }

    #[must_use]
    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    #[must_use]
    pub fn with_skill(mut self, skill: Skill) -> Self {
        self.skills.push(skill);
        self
    }

    #[must_use]
    pub fn with_aura(mut self, aura: Aura) -> Self {
        self.auras.push(aura);
        self
    }

    #[must_use]
    pub fn with_injury(mut self, injury: Injury) -> Self {
        self.injuries.push(injury);
        self
    }

    #[must_use]
    pub fn base(&self, stat: StatName) -> i32 {
        self.stats.get(stat)
    }

    pub fn skill(&self, id: &str) -> Option<&Skill> {
        self.skills.iter().find(|s| s.id == id)
    }

    #[must_use]
    pub fn cooldown(&self, skill_id: &str) -> u32 {
        self.skill_cooldowns.get(skill_id).copied().unwrap_or(0)
    }

    /// Remaining uses of a finite skill; `None` if unlimited.
    pub fn charges_left(&self, skill: &Skill) -> Option<u32> {
        skill
            .charges
            .map(|total| self.skill_charges.get(&skill.id).copied().unwrap_or(total))
    }

    /// True if the skill passes its AP, cooldown and charge gates.
    pub fn skill_ready(&self, skill: &Skill) -> bool {
        self.ap_left >= skill.ap_cost
            && self.cooldown(&skill.id) == 0
            && self.charges_left(skill).map_or(true, |n| n > 0)
    }

    /// The recorded `MAX_HP=<n>` cap, if any.
    pub fn max_hp(&self) -> Option<i32> {
        self.tags
            .iter()
            .find_map(|t| t.strip_prefix(MAX_HP_TAG))
            .and_then(|v| v.parse().ok())
    }

    /// Record the current base HP as the heal cap, unless one exists.
    pub fn ensure_max_hp_tag(&mut self) {
        if self.max_hp().is_none() {
            let hp = self.base(StatName::Hp);
            self.tags.push(format!("{MAX_HP_TAG}{hp}"));
        }
    }

    /// Add `delta` to base HP, then apply an override, both capped by the
    /// max-HP tag and floored at 0. Updates `alive`.
    pub fn adjust_hp(&mut self, delta: Option<i32>, override_value: Option<i32>) {
        let cap = self.max_hp();
        let clamp = |v: i32| cap.map_or(v, |c| v.min(c)).max(0);
        if let Some(d) = delta {
            let hp = clamp(self.base(StatName::Hp) + d);
            self.stats.set(StatName::Hp, hp);
        }
        if let Some(v) = override_value {
            self.stats.set(StatName::Hp, clamp(v));
        }
        if delta.is_some() || override_value.is_some() {
            self.alive = self.base(StatName::Hp) > 0;
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GoalKind {
    EliminateAllEnemies,
    SurviveTurns,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub kind: GoalKind,
    #[serde(default)]
    pub survive_turns: Option<u32>,
}

impl Goal {
    #[must_use]
    pub const fn eliminate_all_enemies() -> Self {
        Self {
            kind: GoalKind::EliminateAllEnemies,
            survive_turns: None,
        }
    }

    #[must_use]
    pub const fn survive_turns(turns: u32) -> Self {
        Self {
            kind: GoalKind::SurviveTurns,
            survive_turns: Some(turns),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MissionStatus {
    #[default]
    InProgress,
    Victory,
    Defeat,
}

impl MissionStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, MissionStatus::InProgress)
    }
}

/// Narrative beat shown before or after a mission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionEvent {
    pub id: String,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    pub id: String,
    pub name: String,
    pub map: MapGrid,
    pub units: OrdMap<String, Unit>,
    #[serde(default = "default_side")]
    pub side_to_move: Side,
    #[serde(default = "default_turn")]
    pub turn: u32,
    /// Turn limit for display; outcome checks ignore it.
    #[serde(default)]
    pub max_turns: Option<u32>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub pre_events: Vec<MissionEvent>,
    #[serde(default)]
    pub post_events: Vec<MissionEvent>,
    #[serde(default)]
    pub global_mods: Vec<StatModifier>,
    #[serde(default)]
    pub initiative_order: Vec<String>,
    #[serde(default)]
    pub current_unit_id: Option<String>,
    #[serde(default)]
    pub status: MissionStatus,
}

fn default_side() -> Side {
    Side::Player
}

fn default_turn() -> u32 {
    1
}

impl Mission {
    pub fn new(id: impl Into<String>, name: impl Into<String>, map: MapGrid) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            map,
            units: OrdMap::new(),
            side_to_move: Side::Player,
            turn: 1,
            max_turns: None,
            goals: Vec::new(),
            pre_events: Vec::new(),
            post_events: Vec::new(),
            global_mods: Vec::new(),
            initiative_order: Vec::new(),
            current_unit_id: None,
            status: MissionStatus::InProgress,
        }
    }

    #[must_use]
    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.units.insert(unit.id.clone(), unit);
        self
    }

    #[must_use]
    pub fn with_goal(mut self, goal: Goal) -> Self {
        self.goals.push(goal);
        self
    }

    #[must_use]
    pub fn with_global_mod(mut self, m: StatModifier) -> Self {
        self.global_mods.push(m.from_source(ModifierSource::Global));
        self
    }

    #[must_use]
    pub fn with_max_turns(mut self, turns: u32) -> Self {
        self.max_turns = Some(turns);
        self
    }

    #[must_use]
    pub fn with_pre_event(mut self, id: impl Into<String>, text: impl Into<String>) -> Self {
        self.pre_events.push(MissionEvent {
            id: id.into(),
            text: text.into(),
        });
        self
    }

    pub fn unit(&self, id: &str) -> Option<&Unit> {
        self.units.get(id)
    }

    pub fn unit_mut(&mut self, id: &str) -> Option<&mut Unit> {
        self.units.get_mut(id)
    }

    /// The unit whose turn it is, if it is alive.
    pub fn current_unit(&self) -> Option<&Unit> {
        self.current_unit_id
            .as_deref()
            .and_then(|id| self.units.get(id))
            .filter(|u| u.alive)
    }

    pub fn living_units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values().filter(|u| u.alive)
    }

    /// The living unit standing on `c`.
    pub fn unit_at(&self, c: Coord) -> Option<&Unit> {
        self.living_units().find(|u| u.pos == c)
    }

    #[must_use]
    pub fn any_alive(&self, side: Side) -> bool {
        self.living_units().any(|u| u.side == side)
    }
}
