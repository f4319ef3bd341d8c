pub mod user;

pub use user::{NewUser, Role, UserForm, UserId, UserRecord};
