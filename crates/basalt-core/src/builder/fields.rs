//! Field-list rendering for INSERT and UPDATE statements.
//!
//! Record fields absent from the schema are dropped silently; the `id`
//! column is never part of an insert list (the server generates it via
//! the DEFAULT path, except for the upsert flow which supplies it
//! explicitly).

use crate::builder::encode::encode_value;
use crate::builder::Record;
use crate::ident::quote_ident;
use crate::schema::ModelSchema;
use crate::value::Value;

/// Renders `("c1","c2") VALUES ($1,$2)` for an insert, pushing bound
/// parameters into `params`.
///
/// Returns `None` when no record field matches the schema.
#[must_use]
pub fn insert_fields(
    schema: &ModelSchema,
    record: &Record,
    params: &mut Vec<Value>,
) -> Option<String> {
    let mut columns = Vec::new();
    let mut values = Vec::new();
    for (key, value) in record.iter() {
        if key == "id" {
            continue;
        }
        let Some(property) = schema.get(key) else {
            continue;
        };
        columns.push(quote_ident(key));
        values.push(encode_value(property, value, params).into_sql());
    }
    if columns.is_empty() {
        return None;
    }
    Some(format!(
        "({}) VALUES ({})",
        columns.join(","),
        values.join(",")
    ))
}

/// Renders `"c1" = $1, "c2" = $2` for an update, pushing bound
/// parameters into `params`.
#[must_use]
pub fn update_fields(schema: &ModelSchema, record: &Record, params: &mut Vec<Value>) -> String {
    let mut assignments = Vec::new();
    for (key, value) in record.iter() {
        let Some(property) = schema.get(key) else {
            continue;
        };
        let fragment = encode_value(property, value, params).into_sql();
        assignments.push(format!("{} = {fragment}", quote_ident(key)));
    }
    assignments.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Property;

    fn posts() -> ModelSchema {
        ModelSchema::new("posts")
            .property("title", Property::string())
            .property("body", Property::text())
            .property("views", Property::number())
    }

    #[test]
    fn insert_skips_id_and_unknown_properties() {
        let record = Record::new()
            .set("id", 9_i64)
            .set("title", "Hello")
            .set("bogus", "dropped");
        let mut params = vec![];
        let sql = insert_fields(&posts(), &record, &mut params).unwrap();
        assert_eq!(sql, "(\"title\") VALUES ($1)");
        assert_eq!(params, vec![Value::Text(String::from("Hello"))]);
    }

    #[test]
    fn insert_numbers_placeholders_in_order() {
        let record = Record::new().set("title", "a").set("views", 3_i64);
        let mut params = vec![];
        let sql = insert_fields(&posts(), &record, &mut params).unwrap();
        assert_eq!(sql, "(\"title\",\"views\") VALUES ($1,$2)");
        assert_eq!(
            params,
            vec![Value::Text(String::from("a")), Value::Int(3)]
        );
    }

    #[test]
    fn insert_with_no_matching_fields_is_none() {
        let record = Record::new().set("bogus", 1_i64);
        let mut params = vec![];
        assert!(insert_fields(&posts(), &record, &mut params).is_none());
        assert!(params.is_empty());
    }

    #[test]
    fn update_renders_assignments() {
        let record = Record::new().set("title", "a").set("body", Value::Null);
        let mut params = vec![];
        let sql = update_fields(&posts(), &record, &mut params);
        assert_eq!(sql, "\"title\" = $1, \"body\" = NULL");
        assert_eq!(params, vec![Value::Text(String::from("a"))]);
    }
}
