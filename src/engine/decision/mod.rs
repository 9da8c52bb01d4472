pub mod level;

pub use level::{LevelAdjuster, LevelChange};
