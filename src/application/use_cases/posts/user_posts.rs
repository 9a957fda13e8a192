use crate::application::ports::post_repository::PostRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::domain::pagination::{PER_PAGE, Page};
use crate::domain::posts::Post;
use crate::domain::users::User;

pub struct UserPosts<'a, U, P>
where
    U: UserRepository + ?Sized,
    P: PostRepository + ?Sized,
{
    pub users: &'a U,
    pub posts: &'a P,
}

impl<'a, U, P> UserPosts<'a, U, P>
where
    U: UserRepository + ?Sized,
    P: PostRepository + ?Sized,
{
    /// `None` when no such user exists.
    pub async fn execute(
        &self,
        username: &str,
        page: i64,
    ) -> anyhow::Result<Option<(User, Page<Post>)>> {
        let user = match self.users.find_by_username(username).await? {
            Some(u) => u,
            None => return Ok(None),
        };
        let (items, total) = self
            .posts
            .list_by_user(user.id, page.max(1), PER_PAGE)
            .await?;
        Ok(Some((user, Page::new(items, page, PER_PAGE, total))))
    }
}
