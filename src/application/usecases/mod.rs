pub mod delete_user;
pub mod export_users;
pub mod import_users;
pub mod refresh_users;
pub mod submit_user;
