//! User Operations

pub mod record_login;
pub mod update_role;

pub use record_login::{RecordLoginCommand, RecordLoginUseCase, UserLoggedIn};
pub use update_role::{UpdateUserRoleCommand, UpdateUserRoleUseCase, UserRoleChanged};
