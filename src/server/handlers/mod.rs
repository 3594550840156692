pub mod analyze;
pub mod embed;
pub mod health;
pub mod join;
pub mod player;
