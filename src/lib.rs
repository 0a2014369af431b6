// src/lib.rs

pub mod config;
pub mod context;
pub mod crawl;
pub mod db;
pub mod domain;
pub mod error;
pub mod lemma;
pub mod lifecycle;
pub mod morphology;
pub mod repository;
pub mod search;
pub mod service;
pub mod store;
pub mod test_utils;
