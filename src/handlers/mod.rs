//! HTTP 处理器

pub mod auth;
pub mod comment;
pub mod extract;
pub mod health;
pub mod kanban;
pub mod notification;
pub mod project;
pub mod task;
pub mod user;
