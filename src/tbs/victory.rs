//! Mission outcome checks.

use super::model::{GoalKind, Mission, MissionStatus, Side};

/// Current outcome of `mission`.
///
/// Terminal statuses are sticky. Goals are checked in order and any
/// satisfied goal wins; otherwise the mission is lost when no player unit
/// is alive. `max_turns` is carried as mission data and never ends a mission.
#[must_use]
pub fn check(mission: &Mission) -> MissionStatus {
    if mission.status.is_terminal() {
        return mission.status;
    }

    let goal_met = mission.goals.iter().any(|goal| match goal.kind {
        GoalKind::EliminateAllEnemies => !mission.any_alive(Side::Enemy),
        GoalKind::SurviveTurns => mission.turn >= goal.survive_turns.unwrap_or(0),
    });
    if goal_met {
        return MissionStatus::Victory;
    }

    if !mission.any_alive(Side::Player) {
        return MissionStatus::Defeat;
    }
    MissionStatus::InProgress
}
