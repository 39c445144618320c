//! Inline content editing for static sites.
//!
//! The client half ([`store`], [`edit_mode`], [`storage`], [`render`]) keeps
//! an observable content map and an edit-mode flag. The server half
//! ([`server`], [`backend`], [`session`]) persists that map behind a small
//! password-gated HTTP resource.

pub mod backend;
pub mod content;
pub mod edit_mode;
pub mod editable;
pub mod error;
pub mod notify;
pub mod render;
pub mod server;
pub mod session;
pub mod state;
pub mod storage;
pub mod store;

pub use content::ContentMap;
pub use editable::{Editable, EditableConfig};
pub use store::ContentStore;
