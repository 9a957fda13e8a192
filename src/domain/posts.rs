use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub story: String,
    pub images: Vec<String>,
    pub univ: String,
    pub city: String,
    pub cost_per_person: i32,
    pub date_posted: chrono::DateTime<chrono::Utc>,
    pub user_id: Uuid,
    pub author: String,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub story: String,
    pub images: Vec<String>,
    pub univ: String,
    pub city: String,
    pub cost_per_person: i32,
}

#[derive(Debug, Clone)]
pub struct PostUpdate {
    pub title: String,
    pub story: String,
    pub univ: String,
    pub city: String,
    pub cost_per_person: i32,
}

/// WHERE clause of a filtered search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchFilter {
    City(String),
    Univ(String),
}

/// ORDER BY of a filtered search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOrder {
    CostAsc,
    DateDescCostDesc,
    DateDesc,
}
