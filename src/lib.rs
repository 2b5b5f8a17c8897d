pub mod config;
pub mod db;
pub mod dto;
pub mod engine;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod scheduler;
pub mod services;
pub mod state;
