//! Engine configuration.
//!
//! Every tunable constant of the rulesets lives here, grouped per ruleset:
//! - `TbsConfig`: AP costs, crit rule, damage floor, AoE footprint
//! - `ChessConfig`: draw counter threshold, default promotion
//! - `RulesConfig`: both of the above
//!
//! Defaults reproduce the stock rules. Configs can be built in code with the
//! `with_*` builders or loaded from TOML; missing keys fall back to defaults.
//!
//! ```
//! use rust_rulesets::core::RulesConfig;
//!
//! let config = RulesConfig::from_toml_str("[tbs]\ncrit_threshold = 50\n").unwrap();
//! assert_eq!(config.tbs.crit_threshold, 50);
//! assert_eq!(config.tbs.min_damage, 1);
//! ```

use serde::{Deserialize, Serialize};

use crate::chess::PieceKind;
use crate::core::error::Result;

/// The 3x3 block centered on the target tile.
pub const DEFAULT_AREA_OFFSETS: [(i32, i32); 9] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 0),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Tactical battle tunables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TbsConfig {
    /// AP consumed by a single move.
    pub move_ap_cost: i32,

    /// AP consumed by a basic attack.
    pub attack_ap_cost: i32,

    /// Effective CRIT at or above which every hit crits.
    pub crit_threshold: i32,

    /// Damage multiplier applied on a crit.
    pub crit_multiplier: i32,

    /// Floor for any landed attack.
    pub min_damage: i32,

    /// Half-width of the min/max damage band shown to clients, in percent.
    /// Presentation only; applied damage is always exact.
    pub preview_spread_pct: i32,

    /// Footprint of tile-targeted skills when the action gives no offsets.
    pub default_area_offsets: Vec<(i32, i32)>,
}

impl Default for TbsConfig {
    fn default() -> Self {
        Self {
            move_ap_cost: 1,
            attack_ap_cost: 1,
            crit_threshold: 100,
            crit_multiplier: 2,
            min_damage: 1,
            preview_spread_pct: 10,
            default_area_offsets: DEFAULT_AREA_OFFSETS.to_vec(),
        }
    }
}

impl TbsConfig {
    pub fn with_ap_costs(mut self, move_cost: i32, attack_cost: i32) -> Self {
        self.move_ap_cost = move_cost;
        self.attack_ap_cost = attack_cost;
        self
    }

        pub fn with_crit_threshold(mut self, threshold: i32) -> Self {
        self.crit_threshold = threshold;
        self
    }

    pub fn with_crit_multiplier(mut self, mult: i32) -> Self {
        self.crit_multiplier = mult;
        self
    }

    pub fn with_min_damage(mut self, floor: i32) -> Self {
        self.min_damage = floor;
        self
    }

    pub fn with_area_offsets(mut self, offsets: Vec<(i32, i32)>) -> Self {
        self.default_area_offsets = offsets;
        self
    }
}

/// Chess tunables.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChessConfig {
    /// Halfmove clock value at which the game is drawn (50-move rule).
    pub fifty_move_halfmoves: u32,

    /// Piece a pawn becomes when no promotion is requested.
    pub default_promotion: PieceKind,
}

impl Default for ChessConfig {
    fn default() -> Self {
        Self {
            fifty_move_halfmoves: 100,
            default_promotion: PieceKind::Queen,
        }
    }
}

impl ChessConfig {
    pub fn with_fifty_move_halfmoves(mut self, halfmoves: u32) -> Self {
        self.fifty_move_halfmoves = halfmoves;
        self
    }

    pub fn with_default_promotion(mut self, kind: PieceKind) -> Self {
        self.default_promotion = kind;
        self
    }
}

/// Configuration for every bundled ruleset.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub tbs: TbsConfig,
    pub chess: ChessConfig,
}

impl RulesConfig {
    /// Parse a TOML document. Absent tables and keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn with_tbs(mut self, tbs: TbsConfig) -> Self {
        self.tbs = tbs;
        self
    }

    pub fn with_chess(mut self, chess: ChessConfig) -> Self {
        self.chess = chess;
        self
    }
}
