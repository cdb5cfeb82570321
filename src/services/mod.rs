pub mod progress;
pub mod quiz;
pub mod study_time;
