//! # gamerec API
//!
//! JSON over HTTP for the presentation layer.
//!
//! | Method | Path | Body |
//! |--------|------|------|
//! | GET | `/health` | |
//! | GET | `/items` | |
//! | POST | `/recommend/by-name` | `{ "name", "mode", "k"? }` |
//! | POST | `/recommend/by-profile` | `{ "profile", "mode", "k"? }` |
//!
//! Distance-mode scores are Euclidean distances (lower is better); similarity-mode
//! scores are cosine similarities (higher is better). Every response carries an
//! `order` field stating which.

pub mod rest;

pub use rest::RestApi;
