#![doc = "The `kanban` library crate."]
#![doc = ""]
#![doc = "Backend for a collaborative kanban board: boards shared through role-based"]
#![doc = "memberships, lists, cards with assignees, labels, checklists, comments and"]
#![doc = "attachments, and a notification feed fed by mentions and assignments."]
#![doc = ""]
#![doc = "`services` holds the domain core; `routes` is the HTTP shell built on it."]
#![doc = "The binary (`main.rs`) wires both into an Actix Web server."]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod storage;
