//! Typed wrappers over the backend's GraphQL operations.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{ClientError, ClientResult};
use crate::gateway::Gateway;
use crate::identity::AnonymousIdentity;
use crate::models::*;

const CONFESSION_FIELDS: &str = "id content category likes gender anonymousName avatarSeed createdAt";
const COMMENT_FIELDS: &str = "id content gender anonymousName avatarSeed createdAt";

pub fn confessions_query() -> String {
    format!("query Confessions {{ confessions {{ {CONFESSION_FIELDS} comments {{ {COMMENT_FIELDS} }} }} }}")
}

pub fn confessions_by_category_query() -> String {
    format!(
        "query ConfessionsByCategory($category: String!) {{ confessionsByCategory(category: $category) {{ {CONFESSION_FIELDS} comments {{ {COMMENT_FIELDS} }} }} }}"
    )
}

pub fn confession_query() -> String {
    format!(
        "query Confession($confessionId: String!) {{ confession(confessionId: $confessionId) {{ {CONFESSION_FIELDS} comments {{ {COMMENT_FIELDS} }} }} }}"
    )
}

pub fn create_confession_mutation() -> String {
    format!(
        "mutation CreateConfession($content: String!, $category: String, $gender: String!, $anonymousName: String!, $avatarSeed: Int!) {{ \
         createConfession(content: $content, category: $category, gender: $gender, anonymousName: $anonymousName, avatarSeed: $avatarSeed) {{ {CONFESSION_FIELDS} }} }}"
    )
}

pub fn create_comment_mutation() -> String {
    format!(
        "mutation CreateComment($confessionId: String!, $content: String!, $gender: String!, $anonymousName: String!, $avatarSeed: Int!) {{ \
         createComment(confessionId: $confessionId, content: $content, gender: $gender, anonymousName: $anonymousName, avatarSeed: $avatarSeed) {{ {COMMENT_FIELDS} }} }}"
    )
}

pub const LIKE_CONFESSION_MUTATION: &str =
    "mutation LikeConfession($confessionId: String!) { likeConfession(confessionId: $confessionId) }";

pub const CREATE_EARLY_ACCESS_MUTATION: &str =
    "mutation CreateEarlyAccess($email: String!, $name: String!) { createEarlyAccess(email: $email, name: $name) { id email name } }";

pub const HEALTH_QUERY: &str = "query Health { health { status time } }";

/// Pulls `data[field]` out and decodes it.
fn take_field<T: DeserializeOwned>(mut data: Value, field: &str) -> ClientResult<T> {
    let v = data.get_mut(field).map(Value::take).unwrap_or(Value::Null);
    serde_json::from_value(v).map_err(|e| ClientError::Api(format!("unexpected `{field}` payload: {e}")))
}

#[derive(Clone)]
pub struct ConfessionsApi {
    gateway: Arc<dyn Gateway>,
}

impl ConfessionsApi {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    pub async fn confessions(&self) -> ClientResult<Vec<Confession>> {
        let data = self.gateway.request(&confessions_query(), None).await?;
        let list: Option<Vec<Confession>> = take_field(data, "confessions")?;
        Ok(list.unwrap_or_default())
    }

    pub async fn confessions_by_category(&self, filter: CategoryFilter) -> ClientResult<Vec<Confession>> {
        if filter == CategoryFilter::All {
            return self.confessions().await;
        }
        let vars = json!({ "category": filter.as_str() });
        let data = self.gateway.request(&confessions_by_category_query(), Some(vars)).await?;
        let list: Option<Vec<Confession>> = take_field(data, "confessionsByCategory")?;
        Ok(list.unwrap_or_default())
    }

    pub async fn confession(&self, id: &str) -> ClientResult<Option<Confession>> {
        let data = self.gateway.request(&confession_query(), Some(json!({ "confessionId": id }))).await?;
        take_field(data, "confession")
    }

    pub async fn create_confession(&self, new: &NewConfession, identity: AnonymousIdentity) -> ClientResult<Confession> {
        let author = AuthorFields::new(new.gender, identity);
        debug!(name = %author.anonymous_name, "creating confession");
        let vars = json!({
            "content": new.content,
            "category": new.category.as_str(),
            "gender": author.gender,
            "anonymousName": author.anonymous_name,
            "avatarSeed": author.avatar_seed,
        });
        let data = self.gateway.request(&create_confession_mutation(), Some(vars)).await?;
        take_field(data, "createConfession")
    }

    pub async fn create_comment(
        &self,
        confession_id: &str,
        new: &NewComment,
        identity: AnonymousIdentity,
    ) -> ClientResult<Comment> {
        let author = AuthorFields::new(new.gender, identity);
        let vars = json!({
            "confessionId": confession_id,
            "content": new.content,
            "gender": author.gender,
            "anonymousName": author.anonymous_name,
            "avatarSeed": author.avatar_seed,
        });
        let data = self.gateway.request(&create_comment_mutation(), Some(vars)).await?;
        take_field(data, "createComment")
    }

    /// Returns the authoritative like count after the increment.
    pub async fn like_confession(&self, id: &str) -> ClientResult<i64> {
        let data = self.gateway.request(LIKE_CONFESSION_MUTATION, Some(json!({ "confessionId": id }))).await?;
        take_field(data, "likeConfession")
    }

    pub async fn create_early_access(&self, new: &NewEarlyAccess) -> ClientResult<EarlyAccess> {
        let vars = json!({ "email": new.email, "name": new.name });
        let data = self.gateway.request(CREATE_EARLY_ACCESS_MUTATION, Some(vars)).await?;
        take_field(data, "createEarlyAccess")
    }

    pub async fn health(&self) -> ClientResult<HealthStatus> {
        let data = self.gateway.request(HEALTH_QUERY, None).await?;
        take_field(data, "health")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_decodes_as_none() {
        let v: Option<Confession> = take_field(json!({ "confession": null }), "confession").unwrap();
        assert!(v.is_none());
    }

    #[test]
    fn malformed_field_is_an_api_error() {
        let err = take_field::<i64>(json!({ "likeConfession": "many" }), "likeConfession").unwrap_err();
        assert!(matches!(err, ClientError::Api(_)));
    }

    #[test]
    fn documents_are_balanced() {
        for doc in [confessions_query(), confessions_by_category_query(), confession_query(), create_confession_mutation(), create_comment_mutation()] {
            assert_eq!(doc.matches('{').count(), doc.matches('}').count(), "{doc}");
        }
    }
}
