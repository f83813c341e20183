pub mod game;
pub mod menu;
pub mod review;
pub mod summary;
