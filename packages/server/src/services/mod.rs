pub mod admission;
pub mod buy_in;
pub mod feed;
pub mod leaderboard;
pub mod media;
