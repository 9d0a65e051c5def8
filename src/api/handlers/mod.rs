pub mod activity;
pub mod admin;
pub mod attendance;
pub mod auth;
pub mod gamification;
pub mod leaderboards;
pub mod matches;
pub mod sessions;
pub mod tracks;
pub mod users;
