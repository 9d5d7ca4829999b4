pub mod analysis;
pub mod config;
pub mod db;
pub mod decompose;
pub mod orm;
pub mod persist;
pub mod sentiment;
pub mod tables;
pub mod twitter;
pub mod web;
