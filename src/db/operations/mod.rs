pub mod dialogues;
pub mod favorites;
pub mod grammar;
pub mod lessons;
pub mod progress;
pub mod quiz;
pub mod stats;
pub mod study_sessions;
pub mod users;
pub mod vocabulary;
