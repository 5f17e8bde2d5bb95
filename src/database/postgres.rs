use async_trait::async_trait;
use serde_json::{json, Map, Value};
use sqlx::{types::Json, PgPool};

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Account, Learning, LearningDraft, LearningRow, NewAccount};
use crate::database::repository::Repository;
use crate::database::store::{AccountStore, LearningQuery, LearningStore, Store};
use crate::filter::{escape_like, FilterData};

const ACCOUNTS: &str = "accounts";
const LEARNINGS: &str = "learnings";
const SEARCH_COLUMNS: [&str; 4] = ["title", "description", "tags", "category"];

/// PostgreSQL-backed store
pub struct PgStore {
    manager: DatabaseManager,
    accounts: Repository<Account>,
    learnings: Repository<LearningRow>,
}

impl PgStore {
    pub fn new(manager: DatabaseManager) -> Self {
        let pool = manager.pool().clone();
        Self {
            accounts: Repository::new(ACCOUNTS, pool.clone()),
            learnings: Repository::new(LEARNINGS, pool),
            manager,
        }
    }

    fn pool(&self) -> &PgPool {
        self.manager.pool()
    }
}

/// `{"$or": [{col: {"$ilike": "%term%"}}, ...]}` with wildcards in the term escaped.
fn search_filter(term: Option<&str>) -> Option<Value> {
    let term = term?;
    let pattern = format!("%{}%", escape_like(term));
    let clauses: Vec<_> = SEARCH_COLUMNS
        .iter()
        .map(|column| {
            let mut clause = Map::new();
            clause.insert(column.to_string(), json!({ "$ilike": pattern }));
            Value::Object(clause)
        })
        .collect();
    Some(json!({ "$or": clauses }))
}

#[async_trait]
impl AccountStore for PgStore {
    async fn count_accounts(&self) -> Result<i64, DatabaseError> {
        self.accounts.count(FilterData::default()).await
    }

    async fn username_exists(&self, username: &str) -> Result<bool, DatabaseError> {
        let filter = FilterData {
            where_clause: Some(json!({ "username": username })),
            ..Default::default()
        };
        Ok(self.accounts.count(filter).await? > 0)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, DatabaseError> {
        let filter = FilterData {
            where_clause: Some(json!({ "email": email })),
            ..Default::default()
        };
        Ok(self.accounts.count(filter).await? > 0)
    }

    async fn find_account(&self, username: &str) -> Result<Option<Account>, DatabaseError> {
        let filter = FilterData {
            where_clause: Some(json!({ "username": username })),
            ..Default::default()
        };
        self.accounts.select_one(filter).await
    }

    async fn insert_account(&self, account: NewAccount) -> Result<Account, DatabaseError> {
        sqlx::query_as::<_, Account>(
            r#"INSERT INTO "accounts" ("username", "email", "password_hash", "roles")
               VALUES ($1, $2, $3, $4)
               RETURNING *"#,
        )
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.roles)
        .fetch_one(self.pool())
        .await
        .map_err(DatabaseError::from_write)
    }
}

#[async_trait]
impl LearningStore for PgStore {
    async fn search_learnings(&self, query: &LearningQuery) -> Result<(Vec<Learning>, i64), DatabaseError> {
        let where_clause = search_filter(query.term.as_deref());

        let total = self
            .learnings
            .count(FilterData { where_clause: where_clause.clone(), ..Default::default() })
            .await?;

        let rows = self
            .learnings
            .select_any(FilterData {
                where_clause,
                order: Some("id asc".to_string()),
                limit: Some(query.limit),
                offset: Some(query.offset),
                ..Default::default()
            })
            .await?;

        Ok((rows.into_iter().map(Learning::from).collect(), total))
    }

    async fn all_learnings(&self) -> Result<Vec<Learning>, DatabaseError> {
        let rows = self
            .learnings
            .select_any(FilterData { order: Some("id asc".to_string()), ..Default::default() })
            .await?;
        Ok(rows.into_iter().map(Learning::from).collect())
    }

    async fn insert_learning(&self, draft: LearningDraft) -> Result<Learning, DatabaseError> {
        let row = sqlx::query_as::<_, LearningRow>(
            r#"INSERT INTO "learnings"
                 ("title", "description", "category", "date", "tags", "attachments", "custom_properties")
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING *"#,
        )
        .bind(draft.title)
        .bind(draft.description)
        .bind(draft.category)
        .bind(draft.date)
        .bind(draft.tags)
        .bind(draft.attachments.map(Json))
        .bind(draft.custom_properties)
        .fetch_one(self.pool())
        .await
        .map_err(DatabaseError::from_write)?;
        Ok(row.into())
    }

    async fn update_learning(&self, id: i64, draft: LearningDraft) -> Result<Option<Learning>, DatabaseError> {
        let row = sqlx::query_as::<_, LearningRow>(
            r#"UPDATE "learnings"
               SET "title" = $2, "description" = $3, "category" = $4, "date" = $5,
                   "tags" = $6, "attachments" = $7, "custom_properties" = $8
               WHERE "id" = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(draft.title)
        .bind(draft.description)
        .bind(draft.category)
        .bind(draft.date)
        .bind(draft.tags)
        .bind(draft.attachments.map(Json))
        .bind(draft.custom_properties)
        .fetch_optional(self.pool())
        .await
        .map_err(DatabaseError::from_write)?;
        Ok(row.map(Learning::from))
    }

    async fn delete_learning(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query(r#"DELETE FROM "learnings" WHERE "id" = $1"#)
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        self.manager.health_check().await
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
