//! Client-side management of a remote collection of user records: a typed
//! REST client, the displayed collection, the add/edit session and
//! spreadsheet import/export.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
