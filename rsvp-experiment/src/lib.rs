pub mod analysis;
pub mod config;
pub mod datalog;
pub mod frontend;
pub mod inventory;
pub mod pictures;
pub mod plan;
pub mod pool;
pub mod prototype;
pub mod quadrants;
pub mod simulate;
pub mod state;
pub mod trial;
pub mod verify;

pub use analysis::{analyze, write_summary, SummaryReport};
pub use config::{ConfigError, ExperimentConfig, RunLength};
pub use datalog::{read_records, DataLog};
pub use frontend::Frontend;
pub use inventory::{SessionInventory, SessionPools};
pub use pictures::{load_picture_names, PicturePools, SetupError};
pub use plan::{build_experiment_plan, practice_plan, TrialPlan};
pub use pool::{Pool, PoolError, PoolLabel};
pub use quadrants::QuadrantPools;
pub use simulate::{ParticipantProfile, SimulatedParticipant};
pub use state::{ExperimentSession, SessionOutcome};
pub use trial::{Trial, TrialMode};
pub use verify::{verify_balance, BalanceReport};
