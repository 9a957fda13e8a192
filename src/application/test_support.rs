//! In-memory port implementations for use-case tests.

use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::application::ports::image_store::ImageStore;
use crate::application::ports::mailer::Mailer;
use crate::application::ports::post_repository::PostRepository;
use crate::application::ports::user_repository::{UniqueViolation, UserRepository};
use crate::domain::pagination::offset;
use crate::domain::posts::{NewPost, Post, PostUpdate, SearchFilter, SearchOrder};
use crate::domain::users::User;

pub fn user_fixture(username: &str) -> User {
    User {
        id: Uuid::new_v4(),
        username: username.to_string(),
        email: format!("{username}@example.com"),
        image_file: "default.jpg".to_string(),
        password_hash: None,
    }
}

/// A post whose `date_posted` lies `age_hours` in the past, so seeding with
/// increasing ages yields an oldest-last timeline.
pub fn post_fixture(user_id: Uuid, city: &str, univ: &str, cost: i32, age_hours: i64) -> Post {
    Post {
        id: Uuid::new_v4(),
        title: format!("A stay in {city}"),
        story: "Worth it.".to_string(),
        images: vec!["abc123.jpg".to_string()],
        univ: univ.to_string(),
        city: city.to_string(),
        cost_per_person: cost,
        date_posted: chrono::Utc::now() - chrono::Duration::hours(age_hours),
        user_id,
        author: user_id.to_string(),
    }
}

#[derive(Default)]
pub struct MemoryUserRepo {
    users: Mutex<Vec<User>>,
    hashes: Mutex<Vec<(Uuid, String)>>,
}

#[async_trait]
impl UserRepository for MemoryUserRepo {
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<User> {
        {
            let users = self.users.lock().unwrap();
            if users.iter().any(|u| u.email == email) {
                return Err(anyhow::Error::new(UniqueViolation::Email));
            }
            if users.iter().any(|u| u.username == username) {
                return Err(anyhow::Error::new(UniqueViolation::Username));
            }
        }
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            image_file: "default.jpg".to_string(),
            password_hash: None,
        };
        self.users.lock().unwrap().push(user.clone());
        self.hashes
            .lock()
            .unwrap()
            .push((user.id, password_hash.to_string()));
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let users = self.users.lock().unwrap();
        let hashes = self.hashes.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).map(|u| User {
            password_hash: hashes
                .iter()
                .find(|(id, _)| *id == u.id)
                .map(|(_, h)| h.clone()),
            ..u.clone()
        }))
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        username: &str,
        email: &str,
        image_file: Option<&str>,
    ) -> anyhow::Result<Option<User>> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.id != id && u.email == email) {
            return Err(anyhow::Error::new(UniqueViolation::Email));
        }
        if users.iter().any(|u| u.id != id && u.username == username) {
            return Err(anyhow::Error::new(UniqueViolation::Username));
        }
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        user.username = username.to_string();
        user.email = email.to_string();
        if let Some(f) = image_file {
            user.image_file = f.to_string();
        }
        Ok(Some(user.clone()))
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> anyhow::Result<bool> {
        if !self.users.lock().unwrap().iter().any(|u| u.id == id) {
            return Ok(false);
        }
        let mut hashes = self.hashes.lock().unwrap();
        hashes.retain(|(uid, _)| *uid != id);
        hashes.push((id, password_hash.to_string()));
        Ok(true)
    }
}

/// Delegates writes to a [`MemoryUserRepo`] but reports a miss from every
/// uniqueness lookup, reproducing the interleaving where a concurrent writer
/// lands between a use case's pre-check and its own write.
pub struct StaleLookupRepo(pub MemoryUserRepo);

#[async_trait]
impl UserRepository for StaleLookupRepo {
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<User> {
        self.0.create_user(username, email, password_hash).await
    }

    async fn find_by_email(&self, _email: &str) -> anyhow::Result<Option<User>> {
        Ok(None)
    }

    async fn find_by_username(&self, _username: &str) -> anyhow::Result<Option<User>> {
        Ok(None)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        self.0.find_by_id(id).await
    }

    async fn update_profile(
        &self,
        id: Uuid,
        username: &str,
        email: &str,
        image_file: Option<&str>,
    ) -> anyhow::Result<Option<User>> {
        self.0.update_profile(id, username, email, image_file).await
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> anyhow::Result<bool> {
        self.0.update_password(id, password_hash).await
    }
}

#[derive(Default)]
pub struct MemoryPostRepo {
    posts: Mutex<Vec<Post>>,
}

impl MemoryPostRepo {
    pub fn seed(&self, post: Post) -> Post {
        self.posts.lock().unwrap().push(post.clone());
        post
    }

    fn paged(mut matches: Vec<Post>, page: i64, per_page: i64) -> (Vec<Post>, i64) {
        let total = matches.len() as i64;
        let start = offset(page, per_page).min(total) as usize;
        matches = matches
            .into_iter()
            .skip(start)
            .take(per_page as usize)
            .collect();
        (matches, total)
    }
}

#[async_trait]
impl PostRepository for MemoryPostRepo {
    async fn create_post(&self, user_id: Uuid, post: &NewPost) -> anyhow::Result<Post> {
        let post = Post {
            id: Uuid::new_v4(),
            title: post.title.clone(),
            story: post.story.clone(),
            images: post.images.clone(),
            univ: post.univ.clone(),
            city: post.city.clone(),
            cost_per_person: post.cost_per_person,
            date_posted: chrono::Utc::now(),
            user_id,
            author: user_id.to_string(),
        };
        self.posts.lock().unwrap().push(post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Post>> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn update_post(&self, id: Uuid, update: &PostUpdate) -> anyhow::Result<Option<Post>> {
        let mut posts = self.posts.lock().unwrap();
        let Some(post) = posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        post.title = update.title.clone();
        post.story = update.story.clone();
        post.univ = update.univ.clone();
        post.city = update.city.clone();
        post.cost_per_person = update.cost_per_person;
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|p| p.id != id);
        Ok(posts.len() < before)
    }

    async fn list_recent(&self, page: i64, per_page: i64) -> anyhow::Result<(Vec<Post>, i64)> {
        let mut all = self.posts.lock().unwrap().clone();
        all.sort_by(|a, b| b.date_posted.cmp(&a.date_posted));
        Ok(Self::paged(all, page, per_page))
    }

    async fn list_latest(&self, limit: i64) -> anyhow::Result<Vec<Post>> {
        let mut all = self.posts.lock().unwrap().clone();
        all.sort_by(|a, b| b.date_posted.cmp(&a.date_posted));
        all.truncate(limit as usize);
        Ok(all)
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        page: i64,
        per_page: i64,
    ) -> anyhow::Result<(Vec<Post>, i64)> {
        let mut matches: Vec<Post> = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.date_posted.cmp(&a.date_posted));
        Ok(Self::paged(matches, page, per_page))
    }

    async fn list_by_tag(
        &self,
        tag: &str,
        page: i64,
        per_page: i64,
    ) -> anyhow::Result<(Vec<Post>, i64)> {
        let mut matches: Vec<Post> = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.city == tag || p.univ == tag)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.date_posted.cmp(&a.date_posted));
        Ok(Self::paged(matches, page, per_page))
    }

    async fn search(
        &self,
        filter: &SearchFilter,
        order: SearchOrder,
        page: i64,
        per_page: i64,
    ) -> anyhow::Result<(Vec<Post>, i64)> {
        let mut matches: Vec<Post> = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| match filter {
                SearchFilter::City(c) => &p.city == c,
                SearchFilter::Univ(u) => &p.univ == u,
            })
            .cloned()
            .collect();
        match order {
            SearchOrder::CostAsc => {
                matches.sort_by(|a, b| a.cost_per_person.cmp(&b.cost_per_person))
            }
            SearchOrder::DateDescCostDesc => matches.sort_by(|a, b| {
                b.date_posted
                    .cmp(&a.date_posted)
                    .then(b.cost_per_person.cmp(&a.cost_per_person))
            }),
            SearchOrder::DateDesc => matches.sort_by(|a, b| b.date_posted.cmp(&a.date_posted)),
        }
        Ok(Self::paged(matches, page, per_page))
    }
}

/// Records filenames instead of touching disk; keeps the extension handling
/// of the real store so tests can assert on it.
#[derive(Default)]
pub struct MemoryImageStore {
    stored: Mutex<Vec<String>>,
}

impl MemoryImageStore {
    pub fn stored_count(&self) -> usize {
        self.stored.lock().unwrap().len()
    }

    fn record(&self, original_filename: Option<&str>) -> String {
        let ext = original_filename
            .and_then(|n| n.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase()))
            .unwrap_or_else(|| "jpg".to_string());
        let name = format!("{}.{}", Uuid::new_v4().simple(), ext);
        self.stored.lock().unwrap().push(name.clone());
        name
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn store_profile_image(
        &self,
        _bytes: Vec<u8>,
        original_filename: Option<&str>,
    ) -> anyhow::Result<String> {
        Ok(self.record(original_filename))
    }

    async fn store_post_image(
        &self,
        _bytes: Vec<u8>,
        original_filename: Option<&str>,
    ) -> anyhow::Result<String> {
        Ok(self.record(original_filename))
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_password_reset(&self, recipient: &str, reset_url: &str) -> anyhow::Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), reset_url.to_string()));
        Ok(())
    }
}
