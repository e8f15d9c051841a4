pub mod build_queue;
pub mod categories;
pub mod db;
pub mod error;
pub mod models;
pub mod repos;
pub mod slug;

pub use build_queue::{BuildQueue, InMemoryBuildQueue, SITE_TASK_KEY};
pub use db::Db;
pub use error::StoreError;
pub use models::{BuildTaskRow, BuildTaskStatus, Club};
pub use repos::ClubSource;
