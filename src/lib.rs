//! 任务与项目管理后端
//! 用户、项目（共享与邀请）、看板、任务、评论与通知的 REST 服务

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod telemetry;
