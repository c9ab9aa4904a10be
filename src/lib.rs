//! StudyHub - economics study companion for the terminal
//!
//! StudyHub combines a metrics dashboard, an AI tutor and a randomized
//! multiple-choice quiz whose progress persists across runs.

pub mod app;
pub mod config;
pub mod dashboard;
pub mod quiz;
pub mod theme;
pub mod tutor;
pub mod ui;

pub use app::App;
pub use config::Config;
pub use theme::Theme;
