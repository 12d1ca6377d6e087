pub mod clear;
pub mod config;
pub mod context;
pub mod display;
pub mod movie;
pub mod review;
pub mod search;
pub mod session;
pub mod sync;
pub mod sync_ui;
pub mod watch;
