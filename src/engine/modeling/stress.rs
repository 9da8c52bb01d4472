use serde::{Deserialize, Serialize};

use crate::engine::config::StressParams;
use crate::engine::state::{ResponseTimes, RollingResults};
use crate::engine::types::StressAction;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct StressSignal {
    pub triggered: bool,
    pub action: Option<StressAction>,
}

impl StressSignal {
    fn fired(action: StressAction) -> Self {
        Self {
            triggered: true,
            action: Some(action),
        }
    }
}

struct StressInputs<'a> {
    rolling_results: &'a RollingResults,
    response_times: &'a ResponseTimes,
    mistake_streak: u32,
}

type StressRule = fn(&StressParams, &StressInputs<'_>) -> bool;

fn mistake_run(p: &StressParams, inputs: &StressInputs<'_>) -> bool {
    inputs.mistake_streak >= p.mistake_streak
}

/// Latest response time against the mean of every earlier sample.
fn response_time_spike(p: &StressParams, inputs: &StressInputs<'_>) -> bool {
    let (Some(last), Some(prior_mean)) = (
        inputs.response_times.last(),
        inputs.response_times.prior_mean(),
    ) else {
        return false;
    };
    *last > p.spike_ratio * prior_mean && *last > p.spike_floor_s
}

fn rolling_accuracy_drop(p: &StressParams, inputs: &StressInputs<'_>) -> bool {
    inputs
        .rolling_results
        .latest_accuracy_pct(p.rolling_window)
        .is_some_and(|accuracy| accuracy < p.rolling_accuracy_floor)
}

/// Priority order: the first matching rule wins, later rules are not evaluated.
const RULES: [(StressAction, StressRule); 3] = [
    (StressAction::SwitchToReview, mistake_run),
    (StressAction::MicroBreak, response_time_spike),
    (StressAction::SimplifiedExplanation, rolling_accuracy_drop),
];

pub struct StressDetector {
    params: StressParams,
}

impl Default for StressDetector {
    fn default() -> Self {
        Self::new(StressParams::default())
    }
}

impl StressDetector {
    pub fn new(params: StressParams) -> Self {
        Self { params }
    }

    pub fn detect(
        &self,
        rolling_results: &RollingResults,
        response_times: &ResponseTimes,
        mistake_streak: u32,
    ) -> StressSignal {
        let inputs = StressInputs {
            rolling_results,
            response_times,
            mistake_streak,
        };
        RULES
            .iter()
            .find(|(_, rule)| rule(&self.params, &inputs))
            .map(|(action, _)| StressSignal::fired(*action))
            .unwrap_or_default()
    }
}
