pub mod jobs;
pub mod users;
pub mod utils;
