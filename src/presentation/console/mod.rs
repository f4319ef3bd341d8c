pub mod commands;
pub mod grid;
pub mod view;
