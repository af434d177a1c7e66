//! Filter compilation.
//!
//! A [`FilterSpec`] carries WHERE conditions, ordering and pagination for
//! a read. Conditions are ANDed in the order they were added; there is no
//! OR support and no nesting.
//!
//! Two pieces of a filter reach the SQL text without parameter binding
//! and are deliberately exposed under `raw_`-named constructors: regex
//! patterns ([`FilterValue::raw_pattern`]) and the ORDER BY clause text
//! ([`FilterSpec::raw_order`]). Callers own the safety of that text.

use crate::builder::encode::{bind, encode_value};
use crate::builder::CompiledStatement;
use crate::ident::quote_ident;
use crate::schema::ModelSchema;
use crate::value::{ToValue, Value};

/// Comparison operators applicable to a single operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `!=`
    Neq,
    /// `LIKE`
    Like,
    /// `NOT LIKE`
    Nlike,
    /// Any other keyword, passed through verbatim.
    Raw(String),
}

impl Operator {
    fn keyword(&self) -> &str {
        match self {
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Neq => "!=",
            Self::Like => "LIKE",
            Self::Nlike => "NOT LIKE",
            Self::Raw(kw) => kw,
        }
    }
}

/// Set-membership operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOp {
    /// `IN`
    In,
    /// `NOT IN`
    NotIn,
}

/// The closed set of condition value shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Plain equality against a scalar. NULL renders as `IS NULL`.
    Scalar(Value),
    /// A regex match. The pattern source is interpolated into the SQL
    /// text verbatim, not bound; see the module docs.
    Pattern {
        /// Regex source text.
        source: String,
        /// Render `~*` instead of `~`.
        case_insensitive: bool,
    },
    /// A single-operand comparison.
    Compare(Operator, Value),
    /// `BETWEEN low AND high`; both bounds bind in left-to-right order.
    Between(Value, Value),
    /// `IN`/`NOT IN` over a value list. An empty list collapses to the
    /// literal `FALSE`/`TRUE` instead of invalid `IN ()` SQL.
    Set(SetOp, Vec<Value>),
}

impl FilterValue {
    /// A case-sensitive regex condition. The source text reaches the SQL
    /// verbatim.
    #[must_use]
    pub fn raw_pattern(source: impl Into<String>) -> Self {
        Self::Pattern {
            source: source.into(),
            case_insensitive: false,
        }
    }

    /// A case-insensitive regex condition (`~*`).
    #[must_use]
    pub fn raw_pattern_ci(source: impl Into<String>) -> Self {
        Self::Pattern {
            source: source.into(),
            case_insensitive: true,
        }
    }
}

/// A structured read filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    conditions: Vec<(String, FilterValue)>,
    order: Option<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    raw: Option<CompiledStatement>,
}

impl FilterSpec {
    /// Creates an empty filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An opaque pass-through: the given statement fragment is returned
    /// by [`compile_filter`] untouched. Escape hatch for callers that
    /// need raw SQL.
    #[must_use]
    pub const fn raw(statement: CompiledStatement) -> Self {
        Self {
            conditions: Vec::new(),
            order: None,
            limit: None,
            offset: None,
            raw: Some(statement),
        }
    }

    /// Adds a condition. Conditions are ANDed in insertion order.
    #[must_use]
    pub fn and_where(mut self, column: impl Into<String>, value: FilterValue) -> Self {
        self.conditions.push((column.into(), value));
        self
    }

    /// Adds an equality condition.
    #[must_use]
    pub fn where_eq(self, column: impl Into<String>, value: impl ToValue) -> Self {
        self.and_where(column, FilterValue::Scalar(value.to_value()))
    }

    /// Sets the ORDER BY clause text. Appended verbatim, not validated.
    #[must_use]
    pub fn raw_order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    /// Sets the row limit.
    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the row offset. Only emitted when a limit is present.
    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// Compiles a filter into a SQL fragment plus its bound parameters.
///
/// The fragment starts with a leading space when non-empty, ready to
/// append after `SELECT ... FROM "table"`. Conditions naming columns the
/// schema does not declare are skipped, except patterns, which never
/// consult the schema.
#[must_use]
pub fn compile_filter(schema: &ModelSchema, filter: &FilterSpec) -> CompiledStatement {
    if let Some(raw) = &filter.raw {
        return raw.clone();
    }

    let mut params = Vec::new();
    let mut fields = Vec::new();

    for (column, condition) in &filter.conditions {
        let quoted = quote_ident(column);
        if let FilterValue::Pattern {
            source,
            case_insensitive,
        } = condition
        {
            let op = if *case_insensitive { "~*" } else { "~" };
            fields.push(format!("{quoted} {op} '{source}'"));
            continue;
        }
        let Some(property) = schema.get(column) else {
            continue;
        };
        match condition {
            FilterValue::Scalar(value) => {
                let fragment = encode_value(property, value, &mut params);
                if fragment.is_null() {
                    fields.push(format!("{quoted} IS NULL"));
                } else {
                    fields.push(format!("{quoted} = {}", fragment.into_sql()));
                }
            }
            FilterValue::Compare(operator, value) => {
                let fragment = encode_value(property, value, &mut params);
                if fragment.is_null() {
                    fields.push(format!("{quoted} IS NULL"));
                } else {
                    fields.push(format!(
                        "{quoted} {} {}",
                        operator.keyword(),
                        fragment.into_sql()
                    ));
                }
            }
            FilterValue::Between(low, high) => {
                let low = encode_value(property, low, &mut params).into_sql();
                let high = encode_value(property, high, &mut params).into_sql();
                fields.push(format!("{quoted} BETWEEN {low} AND {high}"));
            }
            FilterValue::Set(op, values) => {
                if values.is_empty() {
                    // `IN ()` is invalid SQL; an empty list can match
                    // nothing (IN) or everything (NOT IN).
                    fields.push(String::from(match op {
                        SetOp::In => "FALSE",
                        SetOp::NotIn => "TRUE",
                    }));
                    continue;
                }
                let placeholders: Vec<String> = values
                    .iter()
                    .map(|v| bind(&mut params, v.clone()))
                    .collect();
                let keyword = match op {
                    SetOp::In => "IN",
                    SetOp::NotIn => "NOT IN",
                };
                fields.push(format!("{quoted} {keyword} ({})", placeholders.join(",")));
            }
            FilterValue::Pattern { .. } => unreachable!("patterns handled above"),
        }
    }

    let mut sql = String::new();
    if !fields.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&fields.join(" AND "));
    }

    if let Some(order) = &filter.order {
        sql.push_str(" ORDER BY ");
        sql.push_str(order);
    }

    if let Some(limit) = filter.limit {
        let limit_field = bind(&mut params, Value::Int(i64::try_from(limit).unwrap_or(i64::MAX)));
        let offset_field = filter.offset.map_or_else(
            || String::from("0"),
            |offset| bind(&mut params, Value::Int(i64::try_from(offset).unwrap_or(i64::MAX))),
        );
        sql.push_str(&format!(" LIMIT {limit_field} OFFSET {offset_field}"));
    }

    CompiledStatement { sql, params }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Property;

    fn posts() -> ModelSchema {
        ModelSchema::new("posts")
            .property("title", Property::string())
            .property("views", Property::number())
            .property("published", Property::boolean())
    }

    #[test]
    fn scalar_condition_binds_one_parameter() {
        let filter = FilterSpec::new().where_eq("title", "Hello");
        let compiled = compile_filter(&posts(), &filter);
        assert_eq!(compiled.sql, " WHERE \"title\" = $1");
        assert_eq!(compiled.params, vec![Value::Text(String::from("Hello"))]);
    }

    #[test]
    fn injection_attempt_stays_data() {
        let hostile = "1 or 1=1; delete from \"posts\"; --";
        let filter = FilterSpec::new().where_eq("title", hostile);
        let compiled = compile_filter(&posts(), &filter);
        assert_eq!(compiled.sql, " WHERE \"title\" = $1");
        assert_eq!(compiled.params, vec![Value::Text(String::from(hostile))]);
    }

    #[test]
    fn implicit_id_condition_binds_as_data() {
        let hostile = "1 or 1=1; delete from \"posts\"; --";
        let filter = FilterSpec::new().where_eq("id", hostile);
        let compiled = compile_filter(&posts(), &filter);
        assert_eq!(compiled.sql, " WHERE \"id\" = $1");
        assert_eq!(compiled.params, vec![Value::Text(String::from(hostile))]);
    }

    #[test]
    fn null_scalar_renders_is_null() {
        let filter = FilterSpec::new().where_eq("title", Value::Null);
        let compiled = compile_filter(&posts(), &filter);
        assert_eq!(compiled.sql, " WHERE \"title\" IS NULL");
        assert!(compiled.params.is_empty());
    }

    #[test]
    fn comparison_operators_map_to_keywords() {
        let filter = FilterSpec::new()
            .and_where("views", FilterValue::Compare(Operator::Gt, Value::Int(5)))
            .and_where(
                "title",
                FilterValue::Compare(Operator::Nlike, Value::Text(String::from("%draft%"))),
            );
        let compiled = compile_filter(&posts(), &filter);
        assert_eq!(
            compiled.sql,
            " WHERE \"views\" > $1 AND \"title\" NOT LIKE $2"
        );
        assert_eq!(compiled.params.len(), 2);
    }

    #[test]
    fn unknown_operator_keyword_passes_through() {
        let filter = FilterSpec::new().and_where(
            "views",
            FilterValue::Compare(Operator::Raw(String::from("<>")), Value::Int(2)),
        );
        let compiled = compile_filter(&posts(), &filter);
        assert_eq!(compiled.sql, " WHERE \"views\" <> $1");
    }

    #[test]
    fn between_binds_two_parameters_in_order() {
        let filter = FilterSpec::new().and_where(
            "views",
            FilterValue::Between(Value::Int(4), Value::Int(6)),
        );
        let compiled = compile_filter(&posts(), &filter);
        assert_eq!(compiled.sql, " WHERE \"views\" BETWEEN $1 AND $2");
        assert_eq!(compiled.params, vec![Value::Int(4), Value::Int(6)]);
    }

    #[test]
    fn set_membership_parenthesizes_the_list() {
        let filter = FilterSpec::new().and_where(
            "views",
            FilterValue::Set(SetOp::In, vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
        );
        let compiled = compile_filter(&posts(), &filter);
        assert_eq!(compiled.sql, " WHERE \"views\" IN ($1,$2,$3)");
        assert_eq!(compiled.params.len(), 3);
    }

    #[test]
    fn empty_in_collapses_to_false_with_no_parameters() {
        let filter = FilterSpec::new().and_where("views", FilterValue::Set(SetOp::In, vec![]));
        let compiled = compile_filter(&posts(), &filter);
        assert_eq!(compiled.sql, " WHERE FALSE");
        assert!(compiled.params.is_empty());
    }

    #[test]
    fn empty_not_in_collapses_to_true() {
        let filter = FilterSpec::new().and_where("views", FilterValue::Set(SetOp::NotIn, vec![]));
        let compiled = compile_filter(&posts(), &filter);
        assert_eq!(compiled.sql, " WHERE TRUE");
        assert!(compiled.params.is_empty());
    }

    #[test]
    fn case_sensitive_pattern_interpolates_source() {
        let filter =
            FilterSpec::new().and_where("title", FilterValue::raw_pattern("^Postgres"));
        let compiled = compile_filter(&posts(), &filter);
        assert_eq!(compiled.sql, " WHERE \"title\" ~ '^Postgres'");
        assert!(compiled.params.is_empty());
    }

    #[test]
    fn case_insensitive_pattern_uses_tilde_star() {
        let filter =
            FilterSpec::new().and_where("title", FilterValue::raw_pattern_ci("^postgres"));
        let compiled = compile_filter(&posts(), &filter);
        assert_eq!(compiled.sql, " WHERE \"title\" ~* '^postgres'");
    }

    #[test]
    fn unknown_columns_are_skipped() {
        let filter = FilterSpec::new()
            .where_eq("bogus", 1_i64)
            .where_eq("title", "kept");
        let compiled = compile_filter(&posts(), &filter);
        assert_eq!(compiled.sql, " WHERE \"title\" = $1");
        assert_eq!(compiled.params.len(), 1);
    }

    #[test]
    fn order_is_appended_verbatim() {
        let filter = FilterSpec::new().raw_order("\"views\" DESC");
        let compiled = compile_filter(&posts(), &filter);
        assert_eq!(compiled.sql, " ORDER BY \"views\" DESC");
    }

    #[test]
    fn limit_binds_and_offset_defaults_to_zero() {
        let filter = FilterSpec::new().where_eq("title", "x").limit(10);
        let compiled = compile_filter(&posts(), &filter);
        assert_eq!(compiled.sql, " WHERE \"title\" = $1 LIMIT $2 OFFSET 0");
        assert_eq!(compiled.params.len(), 2);
    }

    #[test]
    fn limit_and_offset_both_bind() {
        let filter = FilterSpec::new().limit(10).offset(20);
        let compiled = compile_filter(&posts(), &filter);
        assert_eq!(compiled.sql, " LIMIT $1 OFFSET $2");
        assert_eq!(compiled.params, vec![Value::Int(10), Value::Int(20)]);
    }

    #[test]
    fn offset_without_limit_is_ignored() {
        let filter = FilterSpec::new().offset(20);
        let compiled = compile_filter(&posts(), &filter);
        assert_eq!(compiled.sql, "");
        assert!(compiled.params.is_empty());
    }

    #[test]
    fn raw_filter_passes_through_untouched() {
        let raw = CompiledStatement::new(
            String::from(" WHERE \"title\" = $1"),
            vec![Value::Text(String::from("x"))],
        );
        let filter = FilterSpec::raw(raw.clone());
        assert_eq!(compile_filter(&posts(), &filter), raw);
    }
}
