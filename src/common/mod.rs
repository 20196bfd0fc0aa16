pub mod hash;
pub mod upload;
