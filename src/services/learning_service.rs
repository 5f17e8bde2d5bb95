use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::PaginationConfig;
use crate::database::models::{Learning, LearningDraft};
use crate::database::{DatabaseError, LearningQuery, LearningStore};

#[derive(Debug, Error)]
pub enum LearningError {
    #[error("{0}")]
    InvalidPage(String),

    #[error("Learning {0} not found")]
    NotFound(i64),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// `?page=&size=&search=` on the list endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPage {
    pub learnings: Vec<Learning>,
    pub current_page: i64,
    pub total_items: i64,
    pub total_pages: i64,
    pub page_size: i64,
    pub has_next: bool,
    pub has_previous: bool,
    pub search_term: Option<String>,
}

impl LearningPage {
    fn new(learnings: Vec<Learning>, page: i64, size: i64, total_items: i64, search_term: Option<String>) -> Self {
        let total_pages = (total_items + size - 1) / size;
        Self {
            learnings,
            current_page: page,
            total_items,
            total_pages,
            page_size: size,
            has_next: page < total_pages - 1,
            has_previous: page > 0,
            search_term,
        }
    }
}

pub struct LearningService {
    store: Arc<dyn LearningStore>,
    pagination: PaginationConfig,
}

impl LearningService {
    pub fn new(store: Arc<dyn LearningStore>, pagination: PaginationConfig) -> Self {
        Self { store, pagination }
    }

    pub async fn list(&self, params: PageParams) -> Result<LearningPage, LearningError> {
        let page = params.page.unwrap_or(0);
        let requested = params.size.unwrap_or(self.pagination.default_page_size);

        if page < 0 {
            return Err(LearningError::InvalidPage("page must be zero or greater".to_string()));
        }
        if requested < 1 {
            return Err(LearningError::InvalidPage("size must be at least 1".to_string()));
        }
        let size = if requested > self.pagination.max_page_size {
            warn!("Page size {} exceeds max {}, capping", requested, self.pagination.max_page_size);
            self.pagination.max_page_size
        } else {
            requested
        };
        let offset = page
            .checked_mul(size)
            .ok_or_else(|| LearningError::InvalidPage("page is out of range".to_string()))?;

        let term = params
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let query = LearningQuery { term: term.clone(), limit: size, offset };
        let (learnings, total) = self.store.search_learnings(&query).await?;
        Ok(LearningPage::new(learnings, page, size, total, term))
    }

    pub async fn list_all(&self) -> Result<Vec<Learning>, LearningError> {
        Ok(self.store.all_learnings().await?)
    }

    pub async fn create(&self, draft: LearningDraft) -> Result<Learning, LearningError> {
        let learning = self.store.insert_learning(draft).await?;
        info!("Created learning {}", learning.id);
        Ok(learning)
    }

    /// Overwrites every content field; absent fields are cleared.
    pub async fn update(&self, id: i64, draft: LearningDraft) -> Result<Learning, LearningError> {
        let learning = self
            .store
            .update_learning(id, draft)
            .await?
            .ok_or(LearningError::NotFound(id))?;
        info!("Updated learning {}", id);
        Ok(learning)
    }

    pub async fn delete(&self, id: i64) -> Result<(), LearningError> {
        if !self.store.delete_learning(id).await? {
            return Err(LearningError::NotFound(id));
        }
        info!("Deleted learning {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::MemoryStore;

    fn service() -> LearningService {
        LearningService::new(Arc::new(MemoryStore::new()), AppConfig::production().pagination)
    }

    fn titled(title: &str) -> LearningDraft {
        LearningDraft { title: Some(title.to_string()), ..Default::default() }
    }

    #[tokio::test]
    async fn page_metadata_follows_totals() {
        let learnings = service();
        for i in 0..25 {
            learnings.create(titled(&format!("entry {}", i))).await.unwrap();
        }

        let first = learnings.list(PageParams::default()).await.unwrap();
        assert_eq!(first.learnings.len(), 10);
        assert_eq!(first.total_items, 25);
        assert_eq!(first.total_pages, 3);
        assert!(first.has_next);
        assert!(!first.has_previous);
        assert_eq!(first.search_term, None);

        let last = learnings
            .list(PageParams { page: Some(2), size: Some(10), search: None })
            .await
            .unwrap();
        assert_eq!(last.learnings.len(), 5);
        assert!(!last.has_next);
        assert!(last.has_previous);
    }

    #[tokio::test]
    async fn last_representable_page_is_empty_without_next() {
        let learnings = service();
        learnings.create(titled("only")).await.unwrap();

        let page = learnings
            .list(PageParams { page: Some(i64::MAX), size: Some(1), search: None })
            .await
            .unwrap();
        assert!(page.learnings.is_empty());
        assert_eq!(page.current_page, i64::MAX);
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_next);
        assert!(page.has_previous);
    }

    #[tokio::test]
    async fn empty_store_has_zero_pages() {
        let page = service().list(PageParams::default()).await.unwrap();
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_next);
    }

    #[tokio::test]
    async fn rejects_bad_paging_and_caps_size() {
        let learnings = service();
        assert!(matches!(
            learnings.list(PageParams { page: Some(-1), ..Default::default() }).await,
            Err(LearningError::InvalidPage(_))
        ));
        assert!(matches!(
            learnings.list(PageParams { size: Some(0), ..Default::default() }).await,
            Err(LearningError::InvalidPage(_))
        ));
        let capped = learnings
            .list(PageParams { size: Some(10_000), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(capped.page_size, 100);
    }

    #[tokio::test]
    async fn blank_search_is_ignored_and_term_is_trimmed() {
        let learnings = service();
        learnings.create(titled("Java generics")).await.unwrap();
        learnings.create(titled("Rust macros")).await.unwrap();

        let blank = learnings
            .list(PageParams { search: Some("   ".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(blank.total_items, 2);
        assert_eq!(blank.search_term, None);

        let java = learnings
            .list(PageParams { search: Some(" JAVA ".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(java.total_items, 1);
        assert_eq!(java.search_term.as_deref(), Some("JAVA"));
    }

    #[tokio::test]
    async fn update_and_delete_missing_ids_are_not_found() {
        let learnings = service();
        assert!(matches!(learnings.update(9, titled("x")).await, Err(LearningError::NotFound(9))));
        assert!(learnings.list_all().await.unwrap().is_empty());
        assert!(matches!(learnings.delete(9).await, Err(LearningError::NotFound(9))));
    }
}
