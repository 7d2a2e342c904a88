pub mod handlers;
pub mod models;
pub mod orchestrator;
pub mod store;

pub use models::UploadedFile;
pub use store::{ResultStore, StoreError};
