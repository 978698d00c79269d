// Presentation layer - HTTP surface and response rendering
pub mod app_state;
pub mod handlers;
pub mod presenter;
pub mod router;
