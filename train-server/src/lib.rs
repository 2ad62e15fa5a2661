//! Train journey planner server.
//!
//! A web application that answers: "I'm on this specific train,
//! where can I change to reach my destination?"

pub mod cache;
pub mod darwin;
pub mod domain;
pub mod identify;
pub mod planner;
pub mod stations;
pub mod walkable;
pub mod web;
