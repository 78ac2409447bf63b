pub mod ledger;
pub mod orchestrator;
pub mod report;

pub use ledger::FailureLedger;
pub use orchestrator::{MIGRATED_DESCRIPTION, PlaylistMigrator};
pub use report::{MigrationReport, PlaylistOutcome};
