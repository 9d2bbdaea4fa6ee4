//! END_TURN: always legal; hands control to the scheduler.

use super::Verdict;
use crate::tbs::model::Mission;
use crate::tbs::turn;

pub fn evaluate(_mission: &Mission) -> Verdict {
    Verdict::ok()
}

pub(crate) fn apply(mission: &mut Mission) {
    turn::end_turn(mission);
}
