//! Cloud Firestore over its REST API.
//!
//! Items live at `users/{uid}/{songs|skills}/{id}` inside the project's
//! default database. Firestore wraps every field in a typed value
//! (`{"stringValue": "..."}`, `{"integerValue": "3"}`, ...); [`encode_fields`]
//! and [`decode_fields`] translate between that and plain JSON.

use super::documents::{Document, DocumentClient, Fields};
use crate::error::{DrumlogError, Result};
use crate::model::Collection;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Map, Number, Value};

pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com";

pub struct FirestoreClient {
    http: Client,
    base_url: String,
    project_id: String,
    id_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<RawDocument>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct RawDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

impl FirestoreClient {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            project_id: project_id.into(),
            id_token: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Bearer token sent with every request (a Firebase ID token).
    pub fn with_id_token(mut self, token: Option<String>) -> Self {
        self.id_token = token;
        self
    }

    /// `users/{uid}/{collection}[/{id}]` under the project's default
    /// database. Every segment is percent-encoded on its own.
    fn url(&self, uid: &str, collection: Collection, id: Option<&str>) -> Result<Url> {
        let invalid = || DrumlogError::Config(format!("Invalid Firestore URL: {}", self.base_url));
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend([
                "v1",
                "projects",
                self.project_id.as_str(),
                "databases",
                "(default)",
                "documents",
                "users",
                uid,
                collection.as_str(),
            ])
            .extend(id);
        Ok(url)
    }

    fn collection_url(&self, uid: &str, collection: Collection) -> Result<Url> {
        self.url(uid, collection, None)
    }

    fn document_url(&self, uid: &str, collection: Collection, id: &str) -> Result<Url> {
        self.url(uid, collection, Some(id))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.id_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = self.authorize(request).send().await?;
        check_status(response).await
    }
}

#[async_trait]
impl DocumentClient for FirestoreClient {
    async fn list(&self, uid: &str, collection: Collection) -> Result<Vec<Document>> {
        let url = self.collection_url(uid, collection)?;
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("orderBy", "createdAt desc".to_string())];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }
            let response = self.send(self.http.get(url.clone()).query(&query)).await?;
            let page: ListResponse = response.json().await?;

            for raw in page.documents {
                documents.push(Document {
                    id: document_id(&raw.name).to_string(),
                    fields: decode_fields(raw.fields)?,
                });
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::debug!(%collection, count = documents.len(), "firestore list");
        Ok(documents)
    }

    async fn get(&self, uid: &str, collection: Collection, id: &str) -> Result<Option<Fields>> {
        let response = self
            .authorize(self.http.get(self.document_url(uid, collection, id)?))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let raw: RawDocument = check_status(response).await?.json().await?;
        Ok(Some(decode_fields(raw.fields)?))
    }

    async fn create(
        &self,
        uid: &str,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> Result<()> {
        let body = json!({ "fields": encode_fields(fields) });
        self.send(
            self.http
                .patch(self.document_url(uid, collection, id)?)
                .json(&body),
        )
        .await?;
        Ok(())
    }

    async fn patch(
        &self,
        uid: &str,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> Result<()> {
        let mask: Vec<(&str, String)> = fields
            .keys()
            .map(|key| ("updateMask.fieldPaths", key.clone()))
            .collect();
        let body = json!({ "fields": encode_fields(fields) });
        self.send(
            self.http
                .patch(self.document_url(uid, collection, id)?)
                .query(&mask)
                .json(&body),
        )
        .await?;
        Ok(())
    }

    async fn delete(&self, uid: &str, collection: Collection, id: &str) -> Result<()> {
        self.send(self.http.delete(self.document_url(uid, collection, id)?))
            .await?;
        Ok(())
    }
}

async fn check_status(response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(%status, "firestore request failed");
    Err(DrumlogError::Remote(format!("{}: {}", status, body)))
}

/// Last path segment of a full document name.
fn document_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

pub fn encode_fields(fields: Fields) -> Map<String, Value> {
    fields
        .into_iter()
        .map(|(key, value)| (key, encode_value(value)))
        .collect()
}

pub fn decode_fields(fields: Map<String, Value>) -> Result<Fields> {
    fields
        .into_iter()
        .map(|(key, value)| Ok((key, decode_value(value)?)))
        .collect()
}

pub fn encode_value(value: Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(values) => {
            let values: Vec<Value> = values.into_iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(fields) => json!({ "mapValue": { "fields": encode_fields(fields) } }),
    }
}

pub fn decode_value(value: Value) -> Result<Value> {
    let typed = match value {
        Value::Object(typed) => typed,
        other => {
            return Err(DrumlogError::Remote(format!(
                "Expected a typed value, got {}",
                other
            )))
        }
    };
    let Some((kind, inner)) = typed.into_iter().next() else {
        return Err(DrumlogError::Remote("Empty typed value".to_string()));
    };

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" | "doubleValue" => Ok(inner),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => Ok(inner),
        "integerValue" => {
            let parsed = match &inner {
                Value::String(s) => s.parse::<i64>().ok(),
                Value::Number(n) => n.as_i64(),
                _ => None,
            };
            parsed
                .map(|i| Value::Number(Number::from(i)))
                .ok_or_else(|| DrumlogError::Remote(format!("Bad integerValue: {}", inner)))
        }
        "arrayValue" => {
            let values = match inner {
                Value::Object(mut array) => array.remove("values").unwrap_or(Value::Null),
                _ => Value::Null,
            };
            match values {
                Value::Array(values) => Ok(Value::Array(
                    values
                        .into_iter()
                        .map(decode_value)
                        .collect::<Result<Vec<_>>>()?,
                )),
                _ => Ok(Value::Array(Vec::new())),
            }
        }
        "mapValue" => {
            let fields = match inner {
                Value::Object(mut map) => map.remove("fields"),
                _ => None,
            };
            match fields {
                Some(Value::Object(fields)) => Ok(Value::Object(decode_fields(fields)?)),
                _ => Ok(Value::Object(Map::new())),
            }
        }
        "geoPointValue" => Ok(inner),
        other => Err(DrumlogError::Remote(format!(
            "Unsupported Firestore value type: {}",
            other
        ))),
    }
}
