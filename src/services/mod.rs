// src/services/mod.rs

//! Crawling services: fetching, classification, politeness, checkers.

pub mod checkers;
pub mod classify;
pub mod corpus;
pub mod extract;
pub mod fetch;
pub mod politeness;
