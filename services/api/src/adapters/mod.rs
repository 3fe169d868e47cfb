pub mod auth_store;
pub mod db;
pub mod diagnostics;
pub mod memory_store;
pub mod notifications;

pub use auth_store::{AuthState, AuthStore};
pub use db::PgDocumentStore;
pub use diagnostics::{Toast, ToastLog};
pub use memory_store::{MemoryDocumentStore, StoredRecord};
pub use notifications::{LocalNotificationStore, TAP_ACTION_ID};
