//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_permission_cache;
mod postgres_access_admin_repository;
mod postgres_access_rows;
mod postgres_authorization_repository;
mod redis_permission_cache;

#[cfg(test)]
mod postgres_test_support;

pub use in_memory_permission_cache::InMemoryPermissionCache;
pub use postgres_access_admin_repository::PostgresAccessAdminRepository;
pub use postgres_authorization_repository::PostgresAuthorizationRepository;
pub use redis_permission_cache::RedisPermissionCache;
