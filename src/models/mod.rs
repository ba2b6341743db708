//! 数据模型模块

pub mod auth;
pub mod comment;
pub mod kanban;
pub mod notification;
pub mod project;
pub mod task;
pub mod user;
