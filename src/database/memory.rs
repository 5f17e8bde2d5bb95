use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{Account, Learning, LearningDraft, NewAccount};
use crate::database::store::{AccountStore, LearningQuery, LearningStore, Store};

#[derive(Default)]
struct Tables {
    accounts: Vec<Account>,
    learnings: BTreeMap<i64, Learning>,
    next_account_id: i64,
    next_learning_id: i64,
}

/// In-process store for tests and `serve --memory`. Contents are lost on exit.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_term(learning: &Learning, needle: &str) -> bool {
    [&learning.title, &learning.description, &learning.tags, &learning.category]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(needle))
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn count_accounts(&self) -> Result<i64, DatabaseError> {
        Ok(self.tables.read().await.accounts.len() as i64)
    }

    async fn username_exists(&self, username: &str) -> Result<bool, DatabaseError> {
        Ok(self.tables.read().await.accounts.iter().any(|a| a.username == username))
    }

    async fn email_exists(&self, email: &str) -> Result<bool, DatabaseError> {
        Ok(self.tables.read().await.accounts.iter().any(|a| a.email == email))
    }

    async fn find_account(&self, username: &str) -> Result<Option<Account>, DatabaseError> {
        Ok(self
            .tables
            .read()
            .await
            .accounts
            .iter()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn insert_account(&self, account: NewAccount) -> Result<Account, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.accounts.iter().any(|a| a.username == account.username) {
            return Err(DatabaseError::Conflict("accounts_username_key".to_string()));
        }
        if tables.accounts.iter().any(|a| a.email == account.email) {
            return Err(DatabaseError::Conflict("accounts_email_key".to_string()));
        }

        tables.next_account_id += 1;
        let stored = Account {
            id: tables.next_account_id,
            username: account.username,
            email: account.email,
            password_hash: account.password_hash,
            roles: account.roles,
            enabled: true,
            created_at: Utc::now(),
        };
        tables.accounts.push(stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl LearningStore for MemoryStore {
    async fn search_learnings(&self, query: &LearningQuery) -> Result<(Vec<Learning>, i64), DatabaseError> {
        let tables = self.tables.read().await;
        let needle = query.term.as_deref().map(str::to_lowercase);
        let matching: Vec<&Learning> = tables
            .learnings
            .values()
            .filter(|l| needle.as_deref().map_or(true, |n| matches_term(l, n)))
            .collect();

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(query.offset.max(0) as usize)
            .take(query.limit.max(0) as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }

    async fn all_learnings(&self) -> Result<Vec<Learning>, DatabaseError> {
        Ok(self.tables.read().await.learnings.values().cloned().collect())
    }

    async fn insert_learning(&self, draft: LearningDraft) -> Result<Learning, DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.next_learning_id += 1;
        let learning = draft.into_learning(tables.next_learning_id);
        tables.learnings.insert(learning.id, learning.clone());
        Ok(learning)
    }

    async fn update_learning(&self, id: i64, draft: LearningDraft) -> Result<Option<Learning>, DatabaseError> {
        let mut tables = self.tables.write().await;
        Ok(tables.learnings.get_mut(&id).map(|slot| {
            *slot = draft.into_learning(id);
            slot.clone()
        }))
    }

    async fn delete_learning(&self, id: i64) -> Result<bool, DatabaseError> {
        Ok(self.tables.write().await.learnings.remove(&id).is_some())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
