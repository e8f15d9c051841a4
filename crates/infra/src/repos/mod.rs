pub mod build_tasks;
pub mod clubs;
pub mod courses;
pub mod opening_hours;
pub mod users;

pub use build_tasks::BuildTaskRepo;
pub use clubs::{ClubRepo, ClubSource, ClubUpdate};
pub use courses::CourseInput;
pub use opening_hours::OpeningHourInput;
pub use users::UserRepo;
