pub mod handler;

pub use handler::create_style_router;
