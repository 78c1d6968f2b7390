pub mod collision;
pub mod hazards;
pub mod movement;
pub mod pickups;
