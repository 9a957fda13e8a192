pub mod create_post;
pub mod delete_post;
pub mod get_post;
pub mod latest_posts;
pub mod list_posts;
pub mod search_posts;
pub mod tag_posts;
pub mod update_post;
pub mod user_posts;
