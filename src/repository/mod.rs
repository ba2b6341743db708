//! Database repository layer

pub mod comment_repo;
pub mod kanban_repo;
pub mod notification_repo;
pub mod project_repo;
pub mod task_repo;
pub mod user_repo;

pub use comment_repo::CommentRepository;
pub use kanban_repo::KanbanRepository;
pub use notification_repo::NotificationRepository;
pub use project_repo::{ProjectRepository, ProjectStore};
pub use task_repo::TaskRepository;
pub use user_repo::{UserFinder, UserRepository, UserStore};
