// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Query and update representation shared by every collection backend.
//!
//! Both the in-memory store and the Firestore handle evaluate queries with
//! [`Query::matches`] and apply updates with [`Update::apply`], so a caller
//! sees identical semantics whichever backend is active.
//!
//! Supported predicates (AND-combined, no OR):
//! - `_id` equality
//! - field equality
//! - `$exists`
//! - `$in` (array field intersects the candidates, or scalar field is one of them)
//! - `$gte` / `$lte` (lexicographic for strings, numeric for numbers)
//!
//! Supported update operators: `$push`, `$pull`.
//!
//! Field names may be dotted paths (`schedule_details.days`) addressing
//! nested objects.

use crate::error::AppError;
use serde::Serialize;
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// A stored document: field name to JSON value.
pub type Document = Map<String, Value>;

/// Reserved field carrying the identity key in every returned document.
pub const ID_FIELD: &str = "_id";

/// Errors from parsing a filter or update document.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),

    #[error("unsupported operator {operator} on field {field:?}")]
    UnsupportedOperator { field: String, operator: String },

    #[error("malformed operand for {operator} on field {field:?}: {reason}")]
    MalformedOperand {
        field: String,
        operator: String,
        reason: &'static str,
    },
}

// ─── Filters ─────────────────────────────────────────────────────

/// One predicate of a query.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Identity key equals the given key.
    Id(String),
    /// Field equals the value. `null` also matches a missing field.
    Eq { field: String, value: Value },
    /// Field is present (`true`) or absent (`false`). A present `null` counts as present.
    Exists { field: String, exists: bool },
    /// Field intersects the candidate set.
    In { field: String, values: Vec<Value> },
    /// Field is greater than or equal to the threshold.
    Gte { field: String, value: Value },
    /// Field is less than or equal to the threshold.
    Lte { field: String, value: Value },
}

impl Filter {
    /// Evaluate this predicate against a stored document and its identity key.
    pub fn matches(&self, id: &str, doc: &Document) -> bool {
        match self {
            Filter::Id(key) => key == id,
            Filter::Eq { field, value } => match lookup(doc, field) {
                Some(found) => found == value,
                None => value.is_null(),
            },
            Filter::Exists { field, exists } => lookup(doc, field).is_some() == *exists,
            Filter::In { field, values } => match lookup(doc, field) {
                Some(Value::Array(items)) => items.iter().any(|item| values.contains(item)),
                Some(found) => values.contains(found),
                None => false,
            },
            Filter::Gte { field, value } => lookup(doc, field)
                .and_then(|found| compare(found, value))
                .is_some_and(|ord| ord != Ordering::Less),
            Filter::Lte { field, value } => lookup(doc, field)
                .and_then(|found| compare(found, value))
                .is_some_and(|ord| ord != Ordering::Greater),
        }
    }
}

/// Compare two scalars of the same kind. Mixed kinds are incomparable.
fn compare(found: &Value, threshold: &Value) -> Option<Ordering> {
    match (found, threshold) {
        (Value::String(a), Value::String(b)) => Some(a.as_str().cmp(b.as_str())),
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        _ => None,
    }
}

/// Resolve a dotted field path inside a document.
pub fn lookup<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

// ─── Query ───────────────────────────────────────────────────────

/// An AND-combination of filters. The empty query matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    clauses: Vec<Filter>,
}

impl Query {
    /// Query matching every document.
    pub fn all() -> Self {
        Self::default()
    }

    /// Query addressing a single document by identity key.
    pub fn by_id(id: impl Into<String>) -> Self {
        Self::all().and(Filter::Id(id.into()))
    }

    /// Add a clause.
    pub fn and(mut self, filter: Filter) -> Self {
        self.clauses.push(filter);
        self
    }

    pub fn eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.and(Filter::Eq {
            field: field.into(),
            value: value.into(),
        })
    }

    pub fn exists(self, field: impl Into<String>, exists: bool) -> Self {
        self.and(Filter::Exists {
            field: field.into(),
            exists,
        })
    }

    pub fn any_of<I, V>(self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.and(Filter::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    pub fn gte(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.and(Filter::Gte {
            field: field.into(),
            value: value.into(),
        })
    }

    pub fn lte(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.and(Filter::Lte {
            field: field.into(),
            value: value.into(),
        })
    }

    pub fn clauses(&self) -> &[Filter] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// The identity key, if the query names one directly.
    ///
    /// Single-document operations require this; without it they match nothing.
    pub fn id(&self) -> Option<&str> {
        self.clauses.iter().find_map(|clause| match clause {
            Filter::Id(key) => Some(key.as_str()),
            _ => None,
        })
    }

    /// Equality clauses a database can evaluate natively.
    pub fn equality_clauses(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.clauses.iter().filter_map(|clause| match clause {
            Filter::Eq { field, value } if !value.is_null() => Some((field.as_str(), value)),
            _ => None,
        })
    }

    /// Whether every clause holds for the document.
    pub fn matches(&self, id: &str, doc: &Document) -> bool {
        self.clauses.iter().all(|clause| clause.matches(id, doc))
    }

    /// Parse a filter document in the document-database dialect, rejecting
    /// anything outside the supported predicate set.
    ///
    /// `null` parses to the match-everything query.
    pub fn parse(filter: &Value) -> Result<Self, QueryError> {
        parse_filter(filter, true)
    }

    /// Like [`Query::parse`], but unsupported or malformed clauses are
    /// dropped with a warning instead of failing the whole query.
    pub fn parse_permissive(filter: &Value) -> Self {
        match parse_filter(filter, false) {
            Ok(query) => query,
            Err(err) => {
                tracing::warn!(error = %err, "Ignoring unparseable filter, matching all documents");
                Self::all()
            }
        }
    }
}

fn parse_filter(filter: &Value, strict: bool) -> Result<Query, QueryError> {
    let object = match filter {
        Value::Null => return Ok(Query::all()),
        Value::Object(object) => object,
        other => return Err(QueryError::NotAnObject(kind(other))),
    };

    let mut query = Query::all();
    for (field, condition) in object {
        match parse_clause(field, condition) {
            Ok(clauses) => query.clauses.extend(clauses),
            Err(err) if strict => return Err(err),
            Err(err) => {
                tracing::warn!(field = %field, error = %err, "Dropping unsupported query clause");
            }
        }
    }
    Ok(query)
}

fn parse_clause(field: &str, condition: &Value) -> Result<Vec<Filter>, QueryError> {
    if field.starts_with('$') {
        return Err(QueryError::UnsupportedOperator {
            field: String::new(),
            operator: field.to_string(),
        });
    }

    if field == ID_FIELD {
        return match condition {
            Value::String(key) => Ok(vec![Filter::Id(key.clone())]),
            _ => Err(QueryError::MalformedOperand {
                field: field.to_string(),
                operator: "$eq".to_string(),
                reason: "identity key must be a string",
            }),
        };
    }

    let operators = match condition {
        Value::Object(map) if !map.is_empty() && map.keys().all(|k| k.starts_with('$')) => map,
        literal => {
            return Ok(vec![Filter::Eq {
                field: field.to_string(),
                value: literal.clone(),
            }])
        }
    };

    operators
        .iter()
        .map(|(operator, operand)| {
            let malformed = |reason| QueryError::MalformedOperand {
                field: field.to_string(),
                operator: operator.clone(),
                reason,
            };
            let field = field.to_string();
            match operator.as_str() {
                "$eq" => Ok(Filter::Eq {
                    field,
                    value: operand.clone(),
                }),
                "$exists" => operand
                    .as_bool()
                    .map(|exists| Filter::Exists { field, exists })
                    .ok_or_else(|| malformed("expected a boolean")),
                "$in" => operand
                    .as_array()
                    .map(|values| Filter::In {
                        field,
                        values: values.clone(),
                    })
                    .ok_or_else(|| malformed("expected an array")),
                "$gte" | "$lte" => {
                    if !(operand.is_string() || operand.is_number()) {
                        return Err(malformed("expected a string or number"));
                    }
                    let value = operand.clone();
                    Ok(if operator.as_str() == "$gte" {
                        Filter::Gte { field, value }
                    } else {
                        Filter::Lte { field, value }
                    })
                }
                _ => Err(QueryError::UnsupportedOperator {
                    field,
                    operator: operator.clone(),
                }),
            }
        })
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ─── Updates ─────────────────────────────────────────────────────

/// A single update operator.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOp {
    /// Append a value to an array field, creating `[value]` if the field is missing.
    Push { field: String, value: Value },
    /// Remove the first element equal to the value, if present.
    Pull { field: String, value: Value },
}

/// An ordered list of update operators applied to one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    ops: Vec<UpdateOp>,
}

impl Update {
    pub fn push(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::default().and_push(field, value)
    }

    pub fn pull(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::default().and_pull(field, value)
    }

    pub fn and_push(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.ops.push(UpdateOp::Push {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn and_pull(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.ops.push(UpdateOp::Pull {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn ops(&self) -> &[UpdateOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Parse an update document (`{"$push": {...}, "$pull": {...}}`).
    pub fn parse(update: &Value) -> Result<Self, QueryError> {
        let object = update
            .as_object()
            .ok_or_else(|| QueryError::NotAnObject(kind(update)))?;

        let mut parsed = Self::default();
        for (operator, fields) in object {
            let fields = fields
                .as_object()
                .ok_or_else(|| QueryError::MalformedOperand {
                    field: String::new(),
                    operator: operator.clone(),
                    reason: "expected an object of field/value pairs",
                })?;
            for (field, value) in fields {
                if let Some(modifier) = value
                    .as_object()
                    .and_then(|operand| operand.keys().find(|key| key.starts_with('$')))
                {
                    return Err(QueryError::UnsupportedOperator {
                        field: field.clone(),
                        operator: modifier.clone(),
                    });
                }
                let (field, value) = (field.clone(), value.clone());
                parsed.ops.push(match operator.as_str() {
                    "$push" => UpdateOp::Push { field, value },
                    "$pull" => UpdateOp::Pull { field, value },
                    _ => {
                        return Err(QueryError::UnsupportedOperator {
                            field,
                            operator: operator.clone(),
                        })
                    }
                });
            }
        }
        Ok(parsed)
    }

    /// Apply every operator to `doc`. Returns whether the document changed.
    ///
    /// On error the document may be partially updated; callers apply to a
    /// scratch copy and commit only on success.
    pub fn apply(&self, doc: &mut Document) -> Result<bool, AppError> {
        let mut changed = false;
        for op in &self.ops {
            changed |= match op {
                UpdateOp::Push { field, value } => push(doc, field, value.clone())?,
                UpdateOp::Pull { field, value } => pull(doc, field, value)?,
            };
        }
        Ok(changed)
    }
}

fn push(doc: &mut Document, path: &str, value: Value) -> Result<bool, AppError> {
    let (parent, leaf) = parent_mut(doc, path, true)?
        .ok_or_else(|| AppError::InvalidUpdate(format!("cannot create path {path:?}")))?;
    match parent.get_mut(leaf) {
        Some(Value::Array(items)) => items.push(value),
        Some(_) => {
            return Err(AppError::InvalidUpdate(format!(
                "cannot $push to non-array field {path:?}"
            )))
        }
        None => {
            parent.insert(leaf.to_string(), Value::Array(vec![value]));
        }
    }
    Ok(true)
}

fn pull(doc: &mut Document, path: &str, value: &Value) -> Result<bool, AppError> {
    let Some((parent, leaf)) = parent_mut(doc, path, false)? else {
        return Ok(false);
    };
    match parent.get_mut(leaf) {
        Some(Value::Array(items)) => match items.iter().position(|item| item == value) {
            Some(index) => {
                items.remove(index);
                Ok(true)
            }
            None => Ok(false),
        },
        Some(_) => Err(AppError::InvalidUpdate(format!(
            "cannot $pull from non-array field {path:?}"
        ))),
        None => Ok(false),
    }
}

/// Walk to the object holding the last path segment.
///
/// With `create`, missing intermediate objects are inserted; without it a
/// missing intermediate yields `None`.
fn parent_mut<'a, 'p>(
    doc: &'a mut Document,
    path: &'p str,
    create: bool,
) -> Result<Option<(&'a mut Document, &'p str)>, AppError> {
    if path.is_empty() || path.split('.').next() == Some(ID_FIELD) {
        return Err(AppError::InvalidUpdate(format!(
            "field {path:?} cannot be updated"
        )));
    }

    let (parents, leaf) = match path.rsplit_once('.') {
        Some((parents, leaf)) => (Some(parents), leaf),
        None => (None, path),
    };

    let mut current = doc;
    for segment in parents.into_iter().flat_map(|p| p.split('.')) {
        if !current.contains_key(segment) {
            if !create {
                return Ok(None);
            }
            current.insert(segment.to_string(), Value::Object(Map::new()));
        }
        current = match current.get_mut(segment) {
            Some(Value::Object(next)) => next,
            _ => {
                return Err(AppError::InvalidUpdate(format!(
                    "path {path:?} crosses non-object field {segment:?}"
                )))
            }
        };
    }
    Ok(Some((current, leaf)))
}

// ─── Results ─────────────────────────────────────────────────────

/// Outcome of `update_one`, identical for both backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpdateResult {
    /// 1 if a document with the requested identity exists
    pub matched_count: u64,
    /// 1 only if an operator actually changed the document
    pub modified_count: u64,
}

impl UpdateResult {
    pub fn unmatched() -> Self {
        Self::default()
    }

    pub fn matched(modified: bool) -> Self {
        Self {
            matched_count: 1,
            modified_count: u64::from(modified),
        }
    }
}

/// Outcome of `insert_one`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsertOneResult {
    pub inserted_id: String,
}

// ─── Identity helpers ────────────────────────────────────────────

/// Copy of a stored document with its identity injected under `_id`.
pub fn with_id(id: &str, doc: &Document) -> Document {
    let mut annotated = doc.clone();
    annotated.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    annotated
}

/// Split a caller-supplied document into its identity key and the body to store.
pub fn split_id(mut doc: Document) -> Result<(String, Document), AppError> {
    match doc.remove(ID_FIELD) {
        Some(Value::String(id)) if !id.is_empty() => Ok((id, doc)),
        Some(_) => Err(AppError::InvalidUpdate(
            "_id must be a non-empty string".to_string(),
        )),
        None => Err(AppError::InvalidUpdate(
            "document is missing its _id".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("test document must be an object"),
        }
    }

    fn chess_club() -> Document {
        doc(json!({
            "description": "Learn strategies",
            "schedule_details": {
                "days": ["Monday", "Friday"],
                "start_time": "15:15",
                "end_time": "16:45"
            },
            "max_participants": 12,
            "participants": ["michael@mergington.edu"],
            "difficulty": "beginner"
        }))
    }

    #[test]
    fn test_lookup_nested_path() {
        let d = chess_club();
        assert_eq!(lookup(&d, "schedule_details.start_time"), Some(&json!("15:15")));
        assert_eq!(lookup(&d, "schedule_details.missing"), None);
        assert_eq!(lookup(&d, "description.length"), None);
    }

    #[test]
    fn test_exists_distinguishes_absent_from_null() {
        let mut d = chess_club();
        assert!(Query::all().exists("difficulty", true).matches("Chess Club", &d));

        d.remove("difficulty");
        assert!(Query::all().exists("difficulty", false).matches("Chess Club", &d));

        d.insert("difficulty".to_string(), Value::Null);
        assert!(Query::all().exists("difficulty", true).matches("Chess Club", &d));
        assert!(!Query::all().exists("difficulty", false).matches("Chess Club", &d));
    }

    #[test]
    fn test_in_matches_array_intersection_and_scalar_membership() {
        let d = chess_club();
        assert!(Query::all()
            .any_of("schedule_details.days", ["Friday", "Saturday"])
            .matches("Chess Club", &d));
        assert!(!Query::all()
            .any_of("schedule_details.days", ["Saturday"])
            .matches("Chess Club", &d));
        assert!(Query::all()
            .any_of("difficulty", ["beginner", "advanced"])
            .matches("Chess Club", &d));
        assert!(!Query::all()
            .any_of("room", ["101"])
            .matches("Chess Club", &d));
    }

    #[test]
    fn test_time_ranges_compare_lexicographically() {
        let d = chess_club();
        assert!(Query::all()
            .gte("schedule_details.start_time", "15:00")
            .lte("schedule_details.end_time", "17:00")
            .matches("Chess Club", &d));
        assert!(!Query::all()
            .gte("schedule_details.start_time", "15:30")
            .matches("Chess Club", &d));
        assert!(!Query::all()
            .lte("schedule_details.end_time", "16:00")
            .matches("Chess Club", &d));
        // Boundaries are inclusive
        assert!(Query::all()
            .gte("schedule_details.start_time", "15:15")
            .lte("schedule_details.end_time", "16:45")
            .matches("Chess Club", &d));
    }

    #[test]
    fn test_range_on_numbers_and_mismatched_types() {
        let d = chess_club();
        assert!(Query::all().gte("max_participants", 10).matches("Chess Club", &d));
        assert!(!Query::all().lte("max_participants", 10).matches("Chess Club", &d));
        // Strings never compare against numbers
        assert!(!Query::all().gte("max_participants", "10").matches("Chess Club", &d));
    }

    #[test]
    fn test_eq_and_id() {
        let d = chess_club();
        assert!(Query::by_id("Chess Club").matches("Chess Club", &d));
        assert!(!Query::by_id("Art Club").matches("Chess Club", &d));
        assert!(Query::all().eq("difficulty", "beginner").matches("Chess Club", &d));
        assert!(!Query::all().eq("difficulty", "advanced").matches("Chess Club", &d));
        assert!(Query::all().eq("room", Value::Null).matches("Chess Club", &d));
    }

    #[test]
    fn test_parse_document_dialect() {
        let query = Query::parse(&json!({
            "_id": "Chess Club",
            "difficulty": {"$exists": true},
            "schedule_details.days": {"$in": ["Monday"]},
            "schedule_details.start_time": {"$gte": "15:00", "$lte": "16:00"}
        }))
        .unwrap();

        assert_eq!(query.id(), Some("Chess Club"));
        assert_eq!(query.clauses().len(), 5);
        assert!(query.matches("Chess Club", &chess_club()));
    }

    #[test]
    fn test_parse_rejects_unsupported_operators() {
        let err = Query::parse(&json!({"description": {"$regex": "chess"}})).unwrap_err();
        assert_eq!(
            err,
            QueryError::UnsupportedOperator {
                field: "description".to_string(),
                operator: "$regex".to_string(),
            }
        );

        assert!(matches!(
            Query::parse(&json!({"$or": []})),
            Err(QueryError::UnsupportedOperator { .. })
        ));
        assert!(matches!(
            Query::parse(&json!({"difficulty": {"$exists": "yes"}})),
            Err(QueryError::MalformedOperand { .. })
        ));
        assert_eq!(
            Query::parse(&json!(["not", "a", "filter"])),
            Err(QueryError::NotAnObject("array"))
        );
    }

    #[test]
    fn test_parse_permissive_drops_unsupported_clauses() {
        let query = Query::parse_permissive(&json!({
            "description": {"$regex": "chess"},
            "difficulty": "beginner"
        }));
        assert_eq!(query, Query::all().eq("difficulty", "beginner"));
        assert!(Query::parse(&Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_parse_treats_plain_objects_as_equality() {
        let query = Query::parse(&json!({"schedule_details": {"days": ["Monday"]}})).unwrap();
        assert!(matches!(query.clauses(), [Filter::Eq { .. }]));
    }

    #[test]
    fn test_push_appends_and_creates_field() {
        let mut d = chess_club();
        let changed = Update::push("participants", "new@mergington.edu")
            .and_push("waitlist", "late@mergington.edu")
            .apply(&mut d)
            .unwrap();

        assert!(changed);
        assert_eq!(
            d["participants"],
            json!(["michael@mergington.edu", "new@mergington.edu"])
        );
        assert_eq!(d["waitlist"], json!(["late@mergington.edu"]));
    }

    #[test]
    fn test_pull_removes_first_occurrence_only() {
        let mut d = doc(json!({"participants": ["a", "b", "a"]}));
        assert!(Update::pull("participants", "a").apply(&mut d).unwrap());
        assert_eq!(d["participants"], json!(["b", "a"]));

        assert!(!Update::pull("participants", "zzz").apply(&mut d).unwrap());
        assert!(!Update::pull("missing", "a").apply(&mut d).unwrap());
        assert!(!Update::pull("missing.nested", "a").apply(&mut d).unwrap());
    }

    #[test]
    fn test_push_to_scalar_is_rejected() {
        let mut d = chess_club();
        let err = Update::push("difficulty", "x").apply(&mut d).unwrap_err();
        assert!(matches!(err, AppError::InvalidUpdate(_)));

        let err = Update::push("_id", "x").apply(&mut d).unwrap_err();
        assert!(matches!(err, AppError::InvalidUpdate(_)));
    }

    #[test]
    fn test_identity_subpaths_are_rejected() {
        let mut d = chess_club();
        for path in ["_id.x", "_id.nested.deeper"] {
            let err = Update::push(path, "x").apply(&mut d).unwrap_err();
            assert!(matches!(err, AppError::InvalidUpdate(_)), "{path}");
            let err = Update::pull(path, "x").apply(&mut d).unwrap_err();
            assert!(matches!(err, AppError::InvalidUpdate(_)), "{path}");
        }
        assert_eq!(d, chess_club());

        // Only the first segment is reserved
        Update::push("meta._id", "x").apply(&mut d).unwrap();
        assert_eq!(d["meta"], json!({"_id": ["x"]}));
    }

    #[test]
    fn test_push_nested_creates_intermediate_objects() {
        let mut d = doc(json!({}));
        Update::push("schedule_details.days", "Sunday")
            .apply(&mut d)
            .unwrap();
        assert_eq!(d, doc(json!({"schedule_details": {"days": ["Sunday"]}})));
    }

    #[test]
    fn test_update_parse() {
        let update = Update::parse(&json!({
            "$push": {"participants": "x@mergington.edu"},
            "$pull": {"participants": "y@mergington.edu"}
        }))
        .unwrap();
        assert_eq!(update.ops().len(), 2);

        assert!(Update::parse(&json!({})).unwrap().is_empty());
        assert!(matches!(
            Update::parse(&json!({"$set": {"difficulty": "advanced"}})),
            Err(QueryError::UnsupportedOperator { .. })
        ));
    }

    #[test]
    fn test_update_parse_rejects_operand_modifiers() {
        let err = Update::parse(&json!({
            "$push": {"participants": {"$each": ["a@mergington.edu", "b@mergington.edu"]}}
        }))
        .unwrap_err();
        assert_eq!(
            err,
            QueryError::UnsupportedOperator {
                field: "participants".to_string(),
                operator: "$each".to_string(),
            }
        );

        assert!(matches!(
            Update::parse(&json!({"$pull": {"participants": {"$in": ["a@mergington.edu"]}}})),
            Err(QueryError::UnsupportedOperator { .. })
        ));

        // Plain object values are still pushed as-is
        let update = Update::parse(&json!({"$push": {"log": {"who": "a"}}})).unwrap();
        assert_eq!(
            update.ops(),
            [UpdateOp::Push {
                field: "log".to_string(),
                value: json!({"who": "a"}),
            }]
        );
    }

    #[test]
    fn test_split_and_inject_id() {
        let annotated = with_id("Chess Club", &chess_club());
        assert_eq!(annotated[ID_FIELD], json!("Chess Club"));

        let (id, body) = split_id(annotated).unwrap();
        assert_eq!(id, "Chess Club");
        assert_eq!(body, chess_club());

        assert!(split_id(chess_club()).is_err());
    }
}
