use uuid::Uuid;

use crate::application::ports::image_store::ImageStore;
use crate::application::ports::post_repository::PostRepository;
use crate::domain::posts::{NewPost, Post};

pub struct CreatePost<'a, R, S>
where
    R: PostRepository + ?Sized,
    S: ImageStore + ?Sized,
{
    pub repo: &'a R,
    pub images: &'a S,
}

#[derive(Debug, Clone)]
pub struct CreatePostRequest {
    pub title: String,
    pub story: String,
    pub univ: String,
    pub city: String,
    pub cost_per_person: i32,
    /// Raw uploads: bytes plus the browser-supplied filename.
    pub pictures: Vec<(Vec<u8>, Option<String>)>,
}

impl<'a, R, S> CreatePost<'a, R, S>
where
    R: PostRepository + ?Sized,
    S: ImageStore + ?Sized,
{
    /// An unreadable picture fails the whole request; nothing is persisted
    /// to the database in that case.
    pub async fn execute(&self, user_id: Uuid, req: CreatePostRequest) -> anyhow::Result<Post> {
        let mut filenames = Vec::with_capacity(req.pictures.len());
        for (bytes, orig) in req.pictures {
            let stored = self
                .images
                .store_post_image(bytes, orig.as_deref())
                .await
                .map_err(|err| {
                    tracing::error!(error = ?err, "store_post_image_failed");
                    err
                })?;
            filenames.push(stored);
        }
        let post = self
            .repo
            .create_post(
                user_id,
                &NewPost {
                    title: req.title,
                    story: req.story,
                    images: filenames,
                    univ: req.univ,
                    city: req.city,
                    cost_per_person: req.cost_per_person,
                },
            )
            .await?;
        Ok(post)
    }
}
