pub mod handler;
pub mod models;

pub use handler::create_photo_router;
pub use models::PhotoUploadResponse;
