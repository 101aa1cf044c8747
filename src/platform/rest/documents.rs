use std::sync::Arc;

use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::{debug, info};
use url::Url;

use super::http::RestClient;
use crate::core::config::SportsfestConfig;
use crate::platform::base::{Document, DocumentStore, StoreError};

use async_trait::async_trait;

/// Document store backed by the Firestore REST API.
///
/// Field values cross the wire in Firestore's typed-value encoding
/// (`stringValue`, `integerValue`, ...); this store translates to and from
/// plain JSON so nothing above the platform layer sees backend types.
pub struct FirestoreStore {
    rest: Arc<RestClient>,
    /// `projects/{p}/databases/(default)/documents`
    root: String,
    /// `{endpoint}/v1/{root}`
    base_url: String,
}

impl FirestoreStore {
    pub fn new(rest: Arc<RestClient>, config: &SportsfestConfig) -> Self {
        let root = format!(
            "projects/{}/databases/(default)/documents",
            config.project_id
        );
        let base_url = format!("{}/v1/{}", config.firestore_url.trim_end_matches('/'), root);
        info!("FirestoreStore created for {}", base_url);
        Self {
            rest,
            root,
            base_url,
        }
    }

    fn doc_name(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.root, collection, id)
    }

    fn doc_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.base_url, collection, id)
    }

    async fn run_query(&self, body: Value) -> Result<Vec<Document>, StoreError> {
        let url = format!("{}:runQuery", self.base_url);
        let response = self
            .rest
            .request("firestore.runQuery", Method::POST, &url, Some(&body))
            .await?;

        let mut documents = Vec::new();
        if let Value::Array(entries) = response {
            for entry in entries {
                // Entries without a `document` carry only a readTime.
                if let Some(doc) = entry.get("document") {
                    if let Some(parsed) = parse_document(doc) {
                        documents.push(parsed);
                    }
                }
            }
        }
        Ok(documents)
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let url = self.doc_url(collection, id);
        match self
            .rest
            .request("firestore.get", Method::GET, &url, None)
            .await
        {
            Ok(raw) => Ok(parse_document(&raw)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn set(&self, collection: &str, id: &str, fields: Value) -> Result<(), StoreError> {
        let url = self.doc_url(collection, id);
        let body = json!({ "fields": encode_fields(&fields) });
        self.rest
            .request("firestore.set", Method::PATCH, &url, Some(&body))
            .await?;
        debug!("Document written: {}/{}", collection, id);
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, fields: Value) -> Result<(), StoreError> {
        let mut url = Url::parse(&self.doc_url(collection, id))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("currentDocument.exists", "true");
            if let Value::Object(map) = &fields {
                for key in map.keys() {
                    pairs.append_pair("updateMask.fieldPaths", key);
                }
            }
        }
        let body = json!({ "fields": encode_fields(&fields) });
        self.rest
            .request("firestore.update", Method::PATCH, url.as_str(), Some(&body))
            .await?;
        debug!("Document updated: {}/{}", collection, id);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let url = self.doc_url(collection, id);
        self.rest
            .request("firestore.delete", Method::DELETE, &url, None)
            .await?;
        debug!("Document deleted: {}/{}", collection, id);
        Ok(())
    }

    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: Value,
    ) -> Result<Vec<Document>, StoreError> {
        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": collection }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": field },
                        "op": "EQUAL",
                        "value": encode_value(&value),
                    }
                }
            }
        });
        self.run_query(body).await
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": collection }],
            }
        });
        self.run_query(body).await
    }

    async fn delete_batch(&self, collection: &str, ids: &[String]) -> Result<(), StoreError> {
        if ids.is_empty() {
            return Ok(());
        }
        let writes: Vec<Value> = ids
            .iter()
            .map(|id| json!({ "delete": self.doc_name(collection, id) }))
            .collect();
        let url = format!("{}:commit", self.base_url);
        let body = json!({ "writes": writes });
        self.rest
            .request("firestore.commit", Method::POST, &url, Some(&body))
            .await?;
        debug!("Batch deleted {} documents from {}", ids.len(), collection);
        Ok(())
    }
}

fn parse_document(raw: &Value) -> Option<Document> {
    let name = raw.get("name")?.as_str()?;
    let id = name.rsplit('/').next()?.to_string();
    let fields = raw
        .get("fields")
        .map(decode_fields)
        .unwrap_or_else(|| json!({}));
    Some(Document { id, fields })
}

/// Plain JSON object -> Firestore `fields` map.
pub(crate) fn encode_fields(fields: &Value) -> Value {
    match fields {
        Value::Object(map) => {
            let mut encoded = Map::new();
            for (key, value) in map {
                encoded.insert(key.clone(), encode_value(value));
            }
            Value::Object(encoded)
        }
        _ => json!({}),
    }
}

pub(crate) fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                // Firestore integers are strings on the wire.
                json!({ "integerValue": i.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(_) => json!({ "mapValue": { "fields": encode_fields(value) } }),
    }
}

/// Firestore `fields` map -> plain JSON object.
pub(crate) fn decode_fields(fields: &Value) -> Value {
    match fields {
        Value::Object(map) => {
            let mut decoded = Map::new();
            for (key, value) in map {
                decoded.insert(key.clone(), decode_value(value));
            }
            Value::Object(decoded)
        }
        _ => json!({}),
    }
}

pub(crate) fn decode_value(value: &Value) -> Value {
    let Value::Object(map) = value else {
        return Value::Null;
    };

    if let Some(s) = map.get("stringValue").and_then(Value::as_str) {
        return Value::String(s.to_string());
    }
    if let Some(raw) = map.get("integerValue") {
        let parsed = match raw {
            Value::String(s) => s.parse::<i64>().ok(),
            Value::Number(n) => n.as_i64(),
            _ => None,
        };
        if let Some(i) = parsed {
            return json!(i);
        }
        return Value::Null;
    }
    if let Some(d) = map.get("doubleValue").and_then(Value::as_f64) {
        return json!(d);
    }
    if let Some(b) = map.get("booleanValue").and_then(Value::as_bool) {
        return Value::Bool(b);
    }
    if map.contains_key("nullValue") {
        return Value::Null;
    }
    if let Some(ts) = map.get("timestampValue").and_then(Value::as_str) {
        return Value::String(ts.to_string());
    }
    if let Some(inner) = map.get("mapValue") {
        return decode_fields(inner.get("fields").unwrap_or(&json!({})));
    }
    if let Some(inner) = map.get("arrayValue") {
        let items = inner
            .get("values")
            .and_then(Value::as_array)
            .map(|values| values.iter().map(decode_value).collect())
            .unwrap_or_default();
        return Value::Array(items);
    }
    if let Some(reference) = map.get("referenceValue") {
        return reference.clone();
    }
    Value::Null
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_representative_fields() {
        let fields = json!({
            "full_name": "Ana Reyes",
            "age": 12,
            "score": 1.5,
            "active": true,
            "note": null,
            "tags": ["kids", "sunday"],
            "extra": { "shirt": "M" },
        });
        let encoded = encode_fields(&fields);
        assert_eq!(encoded["full_name"], json!({ "stringValue": "Ana Reyes" }));
        assert_eq!(encoded["age"], json!({ "integerValue": "12" }));
        assert_eq!(encoded["score"], json!({ "doubleValue": 1.5 }));
        assert_eq!(encoded["active"], json!({ "booleanValue": true }));
        assert_eq!(encoded["note"], json!({ "nullValue": null }));
        assert_eq!(
            encoded["extra"],
            json!({ "mapValue": { "fields": { "shirt": { "stringValue": "M" } } } })
        );
    }

    #[test]
    fn test_decode_inverts_encode() {
        let fields = json!({
            "name": "Noah",
            "age": 9,
            "tags": ["boys"],
            "meta": { "paid": false },
        });
        assert_eq!(decode_fields(&encode_fields(&fields)), fields);
    }

    #[test]
    fn test_decode_timestamp_stays_a_string() {
        let decoded = decode_value(&json!({ "timestampValue": "2025-03-01T08:00:00Z" }));
        assert_eq!(decoded, json!("2025-03-01T08:00:00Z"));
    }

    #[test]
    fn test_decode_integer_from_wire_string() {
        assert_eq!(decode_value(&json!({ "integerValue": "42" })), json!(42));
    }

    #[test]
    fn test_parse_document_extracts_trailing_id() {
        let raw = json!({
            "name": "projects/p/databases/(default)/documents/registrations/reg_abc123",
            "fields": { "house": { "stringValue": "RED" } },
        });
        let doc = parse_document(&raw).unwrap();
        assert_eq!(doc.id, "reg_abc123");
        assert_eq!(doc.fields, json!({ "house": "RED" }));
    }
}
