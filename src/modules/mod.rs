pub mod dashboard;
pub mod upload;
pub mod video;
