use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{Account, Learning, LearningDraft, NewAccount};

/// One page of a learnings search. `term` is already trimmed and non-blank.
#[derive(Debug, Clone, PartialEq)]
pub struct LearningQuery {
    pub term: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn count_accounts(&self) -> Result<i64, DatabaseError>;

    async fn username_exists(&self, username: &str) -> Result<bool, DatabaseError>;

    async fn email_exists(&self, email: &str) -> Result<bool, DatabaseError>;

    async fn find_account(&self, username: &str) -> Result<Option<Account>, DatabaseError>;

    /// Fails with `DatabaseError::Conflict` when the username or email is taken.
    async fn insert_account(&self, account: NewAccount) -> Result<Account, DatabaseError>;
}

#[async_trait]
pub trait LearningStore: Send + Sync {
    /// Matching records ordered by id, plus the total match count before paging.
    async fn search_learnings(&self, query: &LearningQuery) -> Result<(Vec<Learning>, i64), DatabaseError>;

    async fn all_learnings(&self) -> Result<Vec<Learning>, DatabaseError>;

    async fn insert_learning(&self, draft: LearningDraft) -> Result<Learning, DatabaseError>;

    /// `None` when no record has this id.
    async fn update_learning(&self, id: i64, draft: LearningDraft) -> Result<Option<Learning>, DatabaseError>;

    /// `false` when no record has this id.
    async fn delete_learning(&self, id: i64) -> Result<bool, DatabaseError>;
}

/// A complete backing store for the service.
#[async_trait]
pub trait Store: AccountStore + LearningStore {
    async fn health_check(&self) -> Result<(), DatabaseError>;

    fn backend(&self) -> &'static str;
}
