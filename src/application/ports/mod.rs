pub mod image_store;
pub mod mailer;
pub mod post_repository;
pub mod user_repository;
