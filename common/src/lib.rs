pub mod config;
pub mod confetti;
pub mod contract;
pub mod error;
pub mod guard;
pub mod record;
pub mod session;
pub mod state;
pub mod units;
pub mod view;
pub mod wallet;
