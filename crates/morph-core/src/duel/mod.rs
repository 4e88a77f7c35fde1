pub mod engine;
pub mod scoring;
pub mod state;

pub use engine::{DuelEngine, DuelStats, EngineSettings, MoveRejection, MoveReport, StartDuel};
pub use scoring::{DuelSummary, PlayerStanding};
pub use state::{DuelState, DuelStatus, EndReason, PlayerProgress, PlayerSeat, TransformationStep};
