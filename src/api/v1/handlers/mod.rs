pub mod health;
pub mod me;
pub mod reports;
pub mod time;
pub mod users;
