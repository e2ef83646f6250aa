pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod form;
pub mod http_client;
pub mod model;
pub mod normalize;
pub mod players_view;
pub mod provider;
pub mod reports;
pub mod reports_view;
pub mod settings_view;
pub mod state;
pub mod teams_view;
pub mod view;
