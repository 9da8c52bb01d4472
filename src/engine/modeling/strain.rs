use crate::engine::config::StrainParams;
use crate::engine::window::BoundedWindow;

pub struct CognitiveStrainEstimator {
    params: StrainParams,
}

impl Default for CognitiveStrainEstimator {
    fn default() -> Self {
        Self::new(StrainParams::default())
    }
}

impl CognitiveStrainEstimator {
    pub fn new(params: StrainParams) -> Self {
        Self { params }
    }

    /// Cognitive Strain Index in [0, 100]. An empty window scores 0.
    pub fn compute<const N: usize>(
        &self,
        response_times: &BoundedWindow<f64, N>,
        mistake_streak: u32,
    ) -> f64 {
        let Some(mean) = response_times.mean() else {
            return 0.0;
        };
        let p = &self.params;

        let time_component = mean.clamp(0.0, p.time_cap_s) / p.time_cap_s * 100.0;
        let variance_component =
            response_times.population_stddev().min(p.stddev_cap_s) / p.stddev_cap_s * 100.0;
        let streak_component = if p.streak_cap == 0 {
            0.0
        } else {
            mistake_streak.min(p.streak_cap) as f64 / p.streak_cap as f64 * 100.0
        };

        let csi = p.time_weight * time_component
            + p.variance_weight * variance_component
            + p.streak_weight * streak_component;
        if csi.is_finite() {
            csi.clamp(0.0, 100.0)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(values: &[f64]) -> BoundedWindow<f64, 50> {
        BoundedWindow::try_from(values.to_vec()).unwrap()
    }

    #[test]
    fn test_reference_scenario() {
        let csi = CognitiveStrainEstimator::default().compute(&window(&[10.0, 12.0, 11.0]), 0);
        let expected = 0.4 * (11.0 / 60.0 * 100.0) + 0.3 * ((2.0f64 / 3.0).sqrt() / 30.0 * 100.0);
        assert!((csi - expected).abs() < 1e-9);
        assert!((csi - 8.15).abs() < 0.01, "csi = {csi}");
    }

    #[test]
    fn test_empty_window_scores_zero() {
        let csi = CognitiveStrainEstimator::default().compute(&window(&[]), 5);
        assert_eq!(csi, 0.0);
    }

    #[test]
    fn test_single_sample_has_no_variance_component() {
        let csi = CognitiveStrainEstimator::default().compute(&window(&[30.0]), 0);
        assert!((csi - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_components_saturate_at_caps() {
        let csi = CognitiveStrainEstimator::default().compute(&window(&[0.0, 200.0]), 12);
        assert!((csi - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_streak_component() {
        let estimator = CognitiveStrainEstimator::default();
        let base = estimator.compute(&window(&[6.0, 6.0]), 0);
        let streak = estimator.compute(&window(&[6.0, 6.0]), 2);
        assert!((streak - base - 0.3 * 40.0).abs() < 1e-9);
    }
}
