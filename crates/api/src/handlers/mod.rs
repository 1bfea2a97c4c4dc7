pub mod doctors;
pub mod emergencies;
pub mod events;
pub mod health;
pub mod queue;
pub mod routing;
