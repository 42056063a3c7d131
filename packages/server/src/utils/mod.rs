pub mod calendar;
pub mod jwt;
pub mod phone;
