
mod buy_in;
mod campus_and_users;
mod challenge;
mod feed;
