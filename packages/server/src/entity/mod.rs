pub mod buy_in;
pub mod campus;
pub mod challenge;
pub mod media;
pub mod submission;
pub mod user;
