use serde_json::Value;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{is_valid_identifier, FilterData, FilterOrderInfo, SqlResult};

/// Composes a parameterized `SELECT` (and matching `COUNT`) for one table.
pub struct Filter {
    table_name: String,
    where_data: Option<Value>,
    order_data: Vec<FilterOrderInfo>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl Filter {
    pub fn new(table_name: impl Into<String>) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        if !is_valid_identifier(&table_name) {
            return Err(FilterError::InvalidTableName(table_name));
        }
        Ok(Self {
            table_name,
            where_data: None,
            order_data: vec![],
            limit: None,
            offset: None,
        })
    }

    pub fn assign(&mut self, data: FilterData) -> Result<&mut Self, FilterError> {
        if let Some(where_clause) = data.where_clause { self.where_clause(where_clause)?; }
        if let Some(order) = data.order { self.order(&order)?; }
        if let Some(limit) = data.limit { self.limit(limit, data.offset)?; }
        Ok(self)
    }

    pub fn where_clause(&mut self, conditions: Value) -> Result<&mut Self, FilterError> {
        FilterWhere::validate(&conditions)?;
        self.where_data = Some(conditions);
        Ok(self)
    }

    pub fn order(&mut self, order_spec: &str) -> Result<&mut Self, FilterError> {
        self.order_data = FilterOrder::validate_and_parse(order_spec)?;
        Ok(self)
    }

    pub fn limit(&mut self, limit: i64, offset: Option<i64>) -> Result<&mut Self, FilterError> {
        if limit < 0 { return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string())); }
        if let Some(off) = offset { if off < 0 { return Err(FilterError::InvalidOffset("Offset must be non-negative".to_string())); } }
        self.limit = Some(limit);
        self.offset = offset;
        Ok(self)
    }

    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let where_result = self.to_where_sql()?;
        let order_clause = FilterOrder::generate(&self.order_data)?;

        let query = [
            format!("SELECT * FROM \"{}\"", self.table_name),
            format!("WHERE {}", where_result.query),
            order_clause,
            self.build_limit_clause(),
        ].into_iter().filter(|s| !s.is_empty()).collect::<Vec<_>>().join(" ");

        Ok(SqlResult { query, params: where_result.params })
    }

    pub fn to_where_sql(&self) -> Result<SqlResult, FilterError> {
        let (query, params) = match self.where_data {
            Some(ref where_data) => FilterWhere::generate(where_data, 0)?,
            None => ("1=1".to_string(), vec![]),
        };
        Ok(SqlResult { query, params })
    }

    pub fn to_count_sql(&self) -> Result<SqlResult, FilterError> {
        let where_result = self.to_where_sql()?;
        let query = format!("SELECT COUNT(*) as count FROM \"{}\" WHERE {}", self.table_name, where_result.query);
        Ok(SqlResult { query, params: where_result.params })
    }

    fn build_limit_clause(&self) -> String {
        match (self.limit, self.offset) {
            (Some(l), Some(o)) => format!("LIMIT {} OFFSET {}", l, o),
            (Some(l), None) => format!("LIMIT {}", l),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn search_page_query() {
        let mut filter = Filter::new("learnings").unwrap();
        filter
            .assign(FilterData {
                where_clause: Some(json!({ "$or": [
                    { "title": { "$ilike": "%rust%" } },
                    { "category": { "$ilike": "%rust%" } }
                ]})),
                order: Some("id asc".to_string()),
                limit: Some(10),
                offset: Some(20),
            })
            .unwrap();

        let sql = filter.to_sql().unwrap();
        assert_eq!(
            sql.query,
            "SELECT * FROM \"learnings\" WHERE ((\"title\" ILIKE $1) OR (\"category\" ILIKE $2)) ORDER BY \"id\" ASC LIMIT 10 OFFSET 20"
        );
        assert_eq!(sql.params.len(), 2);

        let count = filter.to_count_sql().unwrap();
        assert_eq!(
            count.query,
            "SELECT COUNT(*) as count FROM \"learnings\" WHERE ((\"title\" ILIKE $1) OR (\"category\" ILIKE $2))"
        );
        assert_eq!(count.params, sql.params);
    }

    #[test]
    fn unfiltered_select_is_true_predicate() {
        let filter = Filter::new("accounts").unwrap();
        assert_eq!(filter.to_sql().unwrap().query, "SELECT * FROM \"accounts\" WHERE 1=1");
    }

    #[test]
    fn rejects_bad_identifiers_and_negative_limits() {
        assert!(Filter::new("learnings; DROP TABLE accounts").is_err());
        assert!(Filter::new("").is_err());

        let mut filter = Filter::new("learnings").unwrap();
        assert!(filter.order("title, password_hash; --").is_err());
        assert!(matches!(filter.limit(-1, None), Err(FilterError::InvalidLimit(_))));
        assert!(matches!(filter.limit(5, Some(-5)), Err(FilterError::InvalidOffset(_))));
    }
}
