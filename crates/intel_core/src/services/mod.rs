pub mod battle_service;

pub use battle_service::{AnalysisError, BattleService};
