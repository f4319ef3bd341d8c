pub mod events;
pub mod http;
pub mod repositories;
pub mod tabular;
