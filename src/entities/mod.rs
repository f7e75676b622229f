pub mod movie;
pub mod schedule;
