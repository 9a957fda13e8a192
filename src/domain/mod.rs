pub mod pagination;
pub mod posts;
pub mod users;
