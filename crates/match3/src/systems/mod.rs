pub mod board;
pub mod cascade;
pub mod effects;
pub mod generator;
pub mod matcher;
pub mod moves;
