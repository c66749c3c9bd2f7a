/// Monitoring engine: probing, transition tracking, cycle orchestration and
/// the background sweep scheduler.
///
/// Data flow: the scheduler fires at a fixed rate, the cycle runner pulls
/// every registered service from the repository, probes each one
/// concurrently, records the outcome through the status tracker and sends
/// one notification per up/down transition.
pub mod orchestrator;
pub mod prober;
pub mod scheduler;
pub mod tracker;
pub mod types;
pub mod validation;


pub use orchestrator::CycleRunner;
pub use scheduler::Scheduler;
pub use tracker::StatusTracker;
