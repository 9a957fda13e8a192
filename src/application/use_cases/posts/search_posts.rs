use crate::application::ports::post_repository::PostRepository;
use crate::domain::pagination::{PER_PAGE, Page};
use crate::domain::posts::{Post, SearchFilter, SearchOrder};

pub struct SearchPosts<'a, R: PostRepository + ?Sized> {
    pub repo: &'a R,
}

/// Maps the submitted form fields onto a filter and an ordering:
/// - city and univ together filter by city, cheapest stay first;
/// - univ alone filters by univ, newest first with price as tiebreaker;
/// - city alone filters by city, newest first.
///
/// `None` when neither field was filled in.
pub fn plan(univ: Option<&str>, city: Option<&str>) -> Option<(SearchFilter, SearchOrder)> {
    let univ = univ.map(str::trim).filter(|s| !s.is_empty());
    let city = city.map(str::trim).filter(|s| !s.is_empty());
    match (univ, city) {
        (Some(_), Some(c)) => Some((SearchFilter::City(c.to_string()), SearchOrder::CostAsc)),
        (Some(u), None) => Some((
            SearchFilter::Univ(u.to_string()),
            SearchOrder::DateDescCostDesc,
        )),
        (None, Some(c)) => Some((SearchFilter::City(c.to_string()), SearchOrder::DateDesc)),
        (None, None) => None,
    }
}

impl<'a, R: PostRepository + ?Sized> SearchPosts<'a, R> {
    pub async fn execute(
        &self,
        filter: SearchFilter,
        order: SearchOrder,
        page: i64,
    ) -> anyhow::Result<Page<Post>> {
        let (items, total) = self
            .repo
            .search(&filter, order, page.max(1), PER_PAGE)
            .await?;
        Ok(Page::new(items, page, PER_PAGE, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{MemoryPostRepo, post_fixture, user_fixture};

    #[test]
    fn plan_matches_the_form_combinations() {
        assert_eq!(
            plan(Some("UGent"), Some("Ghent")),
            Some((SearchFilter::City("Ghent".into()), SearchOrder::CostAsc))
        );
        assert_eq!(
            plan(Some("UGent"), None),
            Some((
                SearchFilter::Univ("UGent".into()),
                SearchOrder::DateDescCostDesc
            ))
        );
        assert_eq!(
            plan(None, Some("Ghent")),
            Some((SearchFilter::City("Ghent".into()), SearchOrder::DateDesc))
        );
        assert_eq!(plan(None, None), None);
        assert_eq!(plan(Some("  "), Some("")), None);
    }

    #[tokio::test]
    async fn city_search_returns_only_that_city_newest_first() {
        let repo = MemoryPostRepo::default();
        let author = user_fixture("corey");
        repo.seed(post_fixture(author.id, "Ghent", "UGent", 30, 2));
        repo.seed(post_fixture(author.id, "Leuven", "KU", 10, 1));
        repo.seed(post_fixture(author.id, "Ghent", "UGent", 20, 0));

        let (filter, order) = plan(None, Some("Ghent")).unwrap();
        let page = SearchPosts { repo: &repo }
            .execute(filter, order, 1)
            .await
            .unwrap();
        assert_eq!(page.items.len(), 2);
        assert!(page.items.iter().all(|p| p.city == "Ghent"));
        assert!(page.items[0].date_posted >= page.items[1].date_posted);
    }

    #[tokio::test]
    async fn combined_search_orders_by_cost_ascending() {
        let repo = MemoryPostRepo::default();
        let author = user_fixture("corey");
        repo.seed(post_fixture(author.id, "Ghent", "UGent", 30, 2));
        repo.seed(post_fixture(author.id, "Ghent", "UGent", 10, 1));
        repo.seed(post_fixture(author.id, "Ghent", "UGent", 20, 0));

        let (filter, order) = plan(Some("UGent"), Some("Ghent")).unwrap();
        let page = SearchPosts { repo: &repo }
            .execute(filter, order, 1)
            .await
            .unwrap();
        let costs: Vec<i32> = page.items.iter().map(|p| p.cost_per_person).collect();
        assert_eq!(costs, vec![10, 20, 30]);
    }
}
