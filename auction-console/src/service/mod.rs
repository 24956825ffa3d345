// External seams: admin auth and the photo object store.

pub mod auth;
pub mod storage;

pub use auth::{AuthError, AuthService, Session};
pub use storage::ObjectStore;
