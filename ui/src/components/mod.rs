pub mod app;
pub mod atm_state;
pub mod browser_wallet;
pub mod confetti_overlay;
pub mod dashboard_view;
pub mod history_view;
