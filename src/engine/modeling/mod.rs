pub mod mastery;
pub mod mode;
pub mod strain;
pub mod stress;
pub mod weakness;

pub use mastery::MasteryEstimator;
pub use mode::AdaptiveModeClassifier;
pub use strain::CognitiveStrainEstimator;
pub use stress::{StressDetector, StressSignal};
pub use weakness::{WeaknessChange, WeaknessObservation, WeaknessProfiler};
