pub mod event;
pub mod save;
pub mod scheduler;
pub mod session;
pub mod world;
