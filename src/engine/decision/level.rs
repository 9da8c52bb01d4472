use crate::engine::config::{HistoryPolicy, LevelParams};
use crate::engine::types::Level;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelChange {
    pub from: Level,
    pub to: Level,
}

impl LevelChange {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

pub struct LevelAdjuster {
    params: LevelParams,
}

impl Default for LevelAdjuster {
    fn default() -> Self {
        Self::new(LevelParams::default())
    }
}

impl LevelAdjuster {
    pub fn new(params: LevelParams) -> Self {
        Self { params }
    }

    /// Moves at most one tier. Mastery gates the move when present, otherwise
    /// accuracy does. `Unknown` is left alone.
    pub fn adjust(&self, current: Level, mastery_score: Option<f64>, accuracy_pct: f64) -> Level {
        let p = &self.params;
        let (value, up, down) = match mastery_score {
            Some(mastery) => (mastery, p.mastery_up, p.mastery_down),
            None => (accuracy_pct, p.accuracy_up, p.accuracy_down),
        };

        if value > up {
            current.harder()
        } else if value < down {
            current.easier()
        } else {
            current
        }
    }

    /// Adjusts `level` in place and appends to `history` according to `policy`.
    /// An undiagnosed session is never recorded.
    pub fn apply(
        &self,
        level: &mut Level,
        history: &mut Vec<Level>,
        mastery_score: Option<f64>,
        accuracy_pct: f64,
        policy: HistoryPolicy,
    ) -> LevelChange {
        let from = *level;
        let to = self.adjust(from, mastery_score, accuracy_pct);
        *level = to;

        let change = LevelChange { from, to };
        let record = match policy {
            HistoryPolicy::EverySubmission => true,
            HistoryPolicy::TransitionsOnly => change.changed(),
        };
        if record && to.is_diagnosed() {
            history.push(to);
        }
        change
    }
}
