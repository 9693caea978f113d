pub mod app;
pub mod components;
pub mod config;
pub mod event;
pub mod form;
pub mod menu;
pub mod status;
