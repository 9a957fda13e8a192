use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub image_file: String,
    /// Only populated on the credential-checking path; stripped everywhere else.
    pub password_hash: Option<String>,
}
