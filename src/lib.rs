pub mod access;
pub mod admin;
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod i18n;
pub mod import;
pub mod models;
pub mod pagination;
pub mod point;
pub mod security;
pub mod sitemap;
