//! Session wrapper.
//!
//! A session pairs a mission with the id the host stores it under. Sessions
//! are values: applying an action yields a new session and leaves the old
//! one untouched. Missions are built on persistent maps, so this costs a
//! shallow copy plus the units actually touched.

use serde::{Deserialize, Serialize};

use super::model::Mission;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TbsSession {
    pub id: String,
    pub mission: Mission,
}

impl TbsSession {
    pub fn new(id: impl Into<String>, mission: Mission) -> Self {
        Self {
            id: id.into(),
            mission,
        }
    }

    /// Same id, different mission.
    #[must_use]
    pub fn with_mission(&self, mission: Mission) -> Self {
        Self {
            id: self.id.clone(),
            mission,
        }
    }
}
