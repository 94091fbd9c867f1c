pub mod animation;
pub mod error;
pub mod input;
pub mod pose;
pub mod time;
