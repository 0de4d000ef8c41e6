//! Request body and query-string parsing.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{request::Parts, Uri},
};
use serde::de::DeserializeOwned;
use std::convert::Infallible;

use crate::error::ApiError;
use crate::model::TodoFilter;

/// JSON body extractor that reads an empty body as "no fields supplied".
///
/// The content type is not checked. Bodies that are not valid JSON for `T`
/// are rejected with [`ApiError::MalformedBody`].
#[derive(Debug, Clone, Default)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::MalformedBody(e.body_text()))?;
        parse_json_body(&bytes).map(JsonBody)
    }
}

pub fn parse_json_body<T>(bytes: &[u8]) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(bytes).map_err(|e| ApiError::MalformedBody(e.to_string()))
}

/// `:id` path segment. A segment that cannot be decoded comes through as an
/// empty id, which the store resolves to the entity's not-found error.
#[derive(Debug, Clone, Default)]
pub struct EntityPath(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for EntityPath
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let id = Path::<String>::from_request_parts(parts, state)
            .await
            .map(|Path(id)| id)
            .unwrap_or_default();
        Ok(EntityPath(id))
    }
}

/// Decoded query-string pairs in request order.
#[derive(Debug, Clone, Default)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn from_uri(uri: &Uri) -> Self {
        Query::<Vec<(String, String)>>::try_from_uri(uri)
            .map(|Query(pairs)| QueryParams(pairs))
            .unwrap_or_default()
    }

    /// First value supplied for `key`; later repeats are ignored.
    pub fn first(&self, key: &str) -> Option<String> {
        self.0
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.clone())
    }
}

/// Query extractor for list routes. It never rejects: unknown keys are
/// ignored and a repeated key keeps its first value.
#[derive(Debug, Clone, Default)]
pub struct ListQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ListQuery<T>
where
    T: From<QueryParams>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ListQuery(T::from(QueryParams::from_uri(&parts.uri))))
    }
}

/// Query string of `GET /api/users`.
#[derive(Debug, Default)]
pub struct UserQuery {
    pub q: Option<String>,
}

impl From<QueryParams> for UserQuery {
    fn from(params: QueryParams) -> Self {
        UserQuery {
            q: params.first("q"),
        }
    }
}

/// Query string of `GET /api/todos`.
#[derive(Debug, Default)]
pub struct TodoQuery {
    pub user_id: Option<String>,
    pub completed: Option<String>,
}

impl From<QueryParams> for TodoQuery {
    fn from(params: QueryParams) -> Self {
        TodoQuery {
            user_id: params.first("userId"),
            completed: params.first("completed"),
        }
    }
}

impl TodoQuery {
    /// `completed` filters on `true` only for the literal string "true";
    /// any other supplied value filters on `false`.
    pub fn into_filter(self) -> TodoFilter {
        TodoFilter {
            user_id: self.user_id,
            completed: self.completed.map(|flag| flag == "true"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewUser, TodoPatch};

    #[test]
    fn test_empty_body_is_default() {
        let user: NewUser = parse_json_body(b"").unwrap();
        assert!(user.name.is_none());
        let patch: TodoPatch = parse_json_body(b"  \n").unwrap();
        assert!(patch.title.is_none());
    }

    #[test]
    fn test_malformed_body() {
        let result: Result<NewUser, _> = parse_json_body(b"{not json");
        assert!(matches!(result, Err(ApiError::MalformedBody(_))));

        let wrong_type: Result<TodoPatch, _> = parse_json_body(br#"{"completed": "yes"}"#);
        assert!(matches!(wrong_type, Err(ApiError::MalformedBody(_))));
    }

    #[test]
    fn test_todo_query_into_filter() {
        let filter = TodoQuery {
            user_id: Some("1".into()),
            completed: Some("true".into()),
        }
        .into_filter();
        assert_eq!(filter.user_id.as_deref(), Some("1"));
        assert_eq!(filter.completed, Some(true));

        let not_true = TodoQuery {
            user_id: None,
            completed: Some("1".into()),
        }
        .into_filter();
        assert_eq!(not_true.completed, Some(false));

        assert_eq!(TodoQuery::default().into_filter(), TodoFilter::default());
    }

    #[test]
    fn test_repeated_query_keys_keep_first_value() {
        let uri: Uri = "/api/todos?userId=1&completed=true&userId=2&completed=false"
            .parse()
            .unwrap();
        let query = TodoQuery::from(QueryParams::from_uri(&uri));
        assert_eq!(query.user_id.as_deref(), Some("1"));
        assert_eq!(query.completed.as_deref(), Some("true"));

        let uri: Uri = "/api/users?q=a%20b&q=c&extra=1".parse().unwrap();
        let query = UserQuery::from(QueryParams::from_uri(&uri));
        assert_eq!(query.q.as_deref(), Some("a b"));
    }

    #[test]
    fn test_missing_query_is_empty() {
        let uri: Uri = "/api/todos".parse().unwrap();
        let query = TodoQuery::from(QueryParams::from_uri(&uri));
        assert!(query.user_id.is_none());
        assert!(query.completed.is_none());
    }
}
