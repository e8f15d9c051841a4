pub mod build_worker;

pub use build_worker::{BuildError, BuildOutcome, BuildWorker};
