pub mod distributed_lock;
pub mod project_permission_repository;
pub mod settings_repository;
pub mod template_repository;
