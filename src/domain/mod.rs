pub mod catalog;
pub mod collection;
pub mod gait;
pub mod input;
pub mod jump;
pub mod mascot;
pub mod motion;
pub mod progress;
pub mod showcase;
