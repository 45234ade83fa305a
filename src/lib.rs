//! Sustainable Life Planner: a four-agent prompt chain behind a web form.

pub mod agents;
pub mod config;
pub mod error;
pub mod knowledge;
pub mod llm;
pub mod pipeline;
pub mod presentation;
pub mod profile;
pub mod service;
pub mod web;
