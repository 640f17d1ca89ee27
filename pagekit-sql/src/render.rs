//! Rendering of query descriptors as parameterized SQL.

use pagekit::{Condition, Membership, Operator, Predicate, QueryDescriptor, Seek, SortDir, SortKey, Value};

use crate::dialect::Dialect;
use crate::validate::{qualified, quote};
use crate::{RenderError, SqlQuery};

/// A join table backing a membership filter.
///
/// `Predicate::membership("tags", "tagId", ids)` against a `posts` table
/// with `Relation::new("tags", "post_tags", "postId")` renders as
/// `EXISTS (SELECT 1 FROM "post_tags" WHERE "post_tags"."postId" = "posts"."id" AND "post_tags"."tagId" IN (...))`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    /// Name used by membership predicates.
    pub name: String,
    /// Join table.
    pub table: String,
    /// Join-table column referencing the owner's primary key.
    pub owner_column: String,
}

impl Relation {
    /// Describe a join table.
    pub fn new(
        name: impl Into<String>,
        table: impl Into<String>,
        owner_column: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            owner_column: owner_column.into(),
        }
    }
}

/// The table a listing reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    /// Table name.
    pub name: String,
    /// Primary key column, referenced by relations.
    pub primary_key: String,
    /// Relations available to membership predicates.
    pub relations: Vec<Relation>,
}

impl TableSpec {
    /// A table without relations.
    pub fn new(name: impl Into<String>, primary_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primary_key: primary_key.into(),
            relations: Vec::new(),
        }
    }

    /// Add a relation.
    pub fn relation(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }

    fn find_relation(&self, name: &str) -> Result<&Relation, RenderError> {
        self.relations
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| RenderError::UnknownRelation(name.to_string()))
    }
}

/// Render the row fetch for `query`.
///
/// ```
/// use pagekit::{KeyKind, Predicate, QueryDescriptor, SortDir, SortKey};
/// use pagekit_sql::{Postgres, TableSpec, render_select};
///
/// let query = QueryDescriptor {
///     predicate: Predicate::eq("status", "PENDING"),
///     order_by: SortKey::by("id", KeyKind::Int, SortDir::Desc),
///     take: 20,
///     skip: 40,
///     seek: None,
/// };
/// let rendered = render_select(Postgres, &TableSpec::new("reports", "id"), &query).unwrap();
/// assert_eq!(
///     rendered.sql,
///     r#"SELECT * FROM "reports" WHERE "status" = $1 ORDER BY "id" DESC LIMIT 20 OFFSET 40"#
/// );
/// ```
pub fn render_select<D: Dialect>(
    dialect: D,
    table: &TableSpec,
    query: &QueryDescriptor,
) -> Result<SqlQuery, RenderError> {
    let mut writer = Writer::new(dialect, table);
    let mut sql = format!("SELECT * FROM {}", quote(&table.name)?);

    let mut conditions = Vec::new();
    if let Some(condition) = writer.predicate(&query.predicate)? {
        conditions.push(condition);
    }
    if let Some(seek) = &query.seek
        && let Some(condition) = writer.seek(&query.order_by, seek)?
    {
        conditions.push(condition);
    }
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }

    let order = query
        .order_by
        .fields()
        .iter()
        .map(|f| Ok(format!("{} {}", quote(&f.name)?, f.dir.as_sql())))
        .collect::<Result<Vec<_>, RenderError>>()?;
    if !order.is_empty() {
        sql.push_str(" ORDER BY ");
        sql.push_str(&order.join(", "));
    }

    sql.push_str(&format!(" LIMIT {}", query.take));
    if query.skip > 0 {
        sql.push_str(&format!(" OFFSET {}", query.skip));
    }

    tracing::trace!(table = %table.name, %sql, params = writer.params.len(), "rendered select");
    Ok(SqlQuery {
        sql,
        params: writer.params,
    })
}

/// Render a count of every row matching `predicate`.
pub fn render_count<D: Dialect>(
    dialect: D,
    table: &TableSpec,
    predicate: &Predicate,
) -> Result<SqlQuery, RenderError> {
    let mut writer = Writer::new(dialect, table);
    let mut sql = format!("SELECT COUNT(*) FROM {}", quote(&table.name)?);
    if let Some(condition) = writer.predicate(predicate)? {
        sql.push_str(" WHERE ");
        sql.push_str(&condition);
    }

    tracing::trace!(table = %table.name, %sql, params = writer.params.len(), "rendered count");
    Ok(SqlQuery {
        sql,
        params: writer.params,
    })
}

/// Accumulates bound parameters while a statement is written.
struct Writer<'a, D: Dialect> {
    dialect: D,
    table: &'a TableSpec,
    params: Vec<Value>,
}

impl<'a, D: Dialect> Writer<'a, D> {
    const fn new(dialect: D, table: &'a TableSpec) -> Self {
        Self {
            dialect,
            table,
            params: Vec::new(),
        }
    }

    fn next_idx(&self) -> usize {
        self.params.len() + 1
    }

    fn bind(&mut self, value: Value) -> String {
        self.params.push(value);
        self.dialect.param(self.params.len())
    }

    fn bind_in(&mut self, column: &str, values: &[Value]) -> String {
        let (sql, params) = self.dialect.in_clause(column, values, self.next_idx());
        self.params.extend(params);
        sql
    }

    /// `None` when the predicate matches every row.
    fn predicate(&mut self, predicate: &Predicate) -> Result<Option<String>, RenderError> {
        match predicate {
            Predicate::All => Ok(None),
            Predicate::Condition(condition) => self.condition(condition).map(Some),
            Predicate::Membership(membership) => self.membership(membership).map(Some),
            Predicate::And(children) => {
                let mut parts = Vec::with_capacity(children.len());
                for child in children {
                    if let Some(part) = self.predicate(child)? {
                        parts.push(part);
                    }
                }
                Ok(group(parts, " AND "))
            },
            Predicate::Or(children) => {
                if children.is_empty() {
                    return Ok(Some("1=0".to_string()));
                }
                let mark = self.params.len();
                let mut parts = Vec::with_capacity(children.len());
                for child in children {
                    match self.predicate(child)? {
                        Some(part) => parts.push(part),
                        None => {
                            // Bound params must match the placeholders left in the SQL.
                            self.params.truncate(mark);
                            return Ok(None);
                        },
                    }
                }
                Ok(group(parts, " OR "))
            },
        }
    }

    fn condition(&mut self, condition: &Condition) -> Result<String, RenderError> {
        let column = quote(&condition.field)?;
        let sql = match (condition.op, &condition.value) {
            (Operator::Eq, Value::Null) => format!("{column} IS NULL"),
            (Operator::Ne, Value::Null) => format!("{column} IS NOT NULL"),
            (Operator::In, Value::Array(values)) => self.bind_in(&column, values),
            (Operator::In, other) => {
                return Err(RenderError::UnsupportedOperand {
                    field: condition.field.clone(),
                    found: other.type_name(),
                });
            },
            (Operator::Contains, value) => {
                let idx = self.next_idx();
                self.params.push(value.clone());
                self.dialect.contains_clause(&column, idx)
            },
            (op, value) => {
                let symbol = match op {
                    Operator::Ne => "!=",
                    Operator::Gt => ">",
                    Operator::Gte => ">=",
                    Operator::Lt => "<",
                    Operator::Lte => "<=",
                    _ => "=",
                };
                format!("{column} {symbol} {}", self.bind(value.clone()))
            },
        };
        Ok(sql)
    }

    fn membership(&mut self, membership: &Membership) -> Result<String, RenderError> {
        let table = self.table;
        let relation = table.find_relation(&membership.relation)?;
        let owner = qualified(&relation.table, &relation.owner_column)?;
        let primary = qualified(&table.name, &table.primary_key)?;
        let member = qualified(&relation.table, &membership.field)?;
        let ids: Vec<Value> = membership.ids.iter().copied().map(Value::Int).collect();
        let within = self.bind_in(&member, &ids);
        Ok(format!(
            "EXISTS (SELECT 1 FROM {} WHERE {owner} = {primary} AND {within})",
            quote(&relation.table)?
        ))
    }

    /// Row-value comparison `(a, b) > (x, y)` spelled out per field, so
    /// mixed directions work: `a > x OR (a = x AND b > y)`.
    fn seek(&mut self, key: &SortKey, seek: &Seek) -> Result<Option<String>, RenderError> {
        let fields = key.fields();
        let mut values = Vec::with_capacity(fields.len());
        for field in fields {
            let value = seek
                .position
                .get(&field.name)
                .ok_or_else(|| RenderError::MissingSeekValue(field.name.clone()))?;
            values.push(value.clone());
        }

        let mut branches = Vec::with_capacity(fields.len());
        for (i, (field, value)) in fields.iter().zip(&values).enumerate() {
            let mut parts = Vec::with_capacity(i + 1);
            for (prev, prev_value) in fields.iter().zip(&values).take(i) {
                let column = quote(&prev.name)?;
                parts.push(format!("{column} = {}", self.bind(prev_value.clone())));
            }
            let inclusive = i + 1 == fields.len() && seek.skip == 0;
            let op = match (field.dir, inclusive) {
                (SortDir::Asc, false) => ">",
                (SortDir::Asc, true) => ">=",
                (SortDir::Desc, false) => "<",
                (SortDir::Desc, true) => "<=",
            };
            let column = quote(&field.name)?;
            parts.push(format!("{column} {op} {}", self.bind(value.clone())));
            if let Some(branch) = group(parts, " AND ") {
                branches.push(branch);
            }
        }
        Ok(group(branches, " OR "))
    }
}

fn group(parts: Vec<String>, separator: &str) -> Option<String> {
    match parts.len() {
        0 => None,
        1 => parts.into_iter().next(),
        _ => Some(format!("({})", parts.join(separator))),
    }
}
