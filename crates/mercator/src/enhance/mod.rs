//! Batch enhancement of canonical products.

mod audit;
mod orchestrator;
mod research;

pub use audit::{AttemptOutcome, AuditLog, EnhancementAttempt};
pub use orchestrator::{BatchOutcome, BatchSummary, EnhancementOrchestrator, OrchestratorConfig};
pub use research::ResearchContext;
