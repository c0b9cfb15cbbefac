//! Select builder SQL rendering
//!
//! Conditions are recorded with `:name` placeholders; rendering rewrites
//! each to the next positional `$n` and collects the parameter values in
//! clause order, so repeated placeholder names never collide.

use serde_json::Value;

use super::types::JoinKind;
use super::SelectBuilder;
use crate::entity::Entity;

impl<E: Entity> SelectBuilder<E> {
    /// Render the SELECT statement and its positional parameters
    pub fn to_sql_with_params(&self) -> (String, Vec<Value>) {
        let mut sql = String::new();
        let mut params = Vec::new();

        sql.push_str("SELECT ");
        sql.push_str(&self.alias);
        sql.push_str(".*");
        for join in &self.joins {
            if join.kind == JoinKind::LeftSelect {
                sql.push_str(", ");
                sql.push_str(&join.alias);
                sql.push_str(".*");
            }
        }

        sql.push_str(" FROM ");
        sql.push_str(E::table_name());
        sql.push(' ');
        sql.push_str(&self.alias);

        for join in &self.joins {
            sql.push_str(&format!(" {} {} {} ON {}", join.kind, join.table, join.alias, join.on));
            if let Some(extra) = &join.extra {
                sql.push_str(" AND (");
                sql.push_str(extra);
                sql.push(')');
            }
        }

        for (i, condition) in self.conditions.iter().enumerate() {
            if i == 0 {
                sql.push_str(" WHERE ");
            } else {
                sql.push_str(&format!(" {} ", condition.conjunction));
            }
            match &condition.binding {
                Some((name, value)) => {
                    params.push(value.clone());
                    let placeholder = format!(":{}", name);
                    let positional = format!("${}", params.len());
                    sql.push_str(&condition.fragment.replacen(&placeholder, &positional, 1));
                }
                None => sql.push_str(&condition.fragment),
            }
        }

        for (i, (column, direction)) in self.order.iter().enumerate() {
            if i == 0 {
                sql.push_str(" ORDER BY ");
            } else {
                sql.push_str(", ");
            }
            sql.push_str(&format!("{} {}", column, direction));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {}", offset));
        }

        (sql, params)
    }

    /// Render the SELECT statement only
    pub fn to_sql(&self) -> String {
        self.to_sql_with_params().0
    }
}
