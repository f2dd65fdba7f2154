//! Firestore REST implementation of [`RestaurantStore`].
//!
//! Three wire operations cover everything the pipeline needs:
//! - `runQuery` with EQUAL / ARRAY_CONTAINS field filters (guard + matcher),
//! - `commit` writes carrying `updateTransforms` (`appendMissingElements`
//!   for the set-union appends, `REQUEST_TIME` for server timestamps),
//! - document `patch` for submission status.
//!
//! New records commit with a `currentDocument.exists = false` precondition on
//! the deterministic (user, name) document id, so a concurrent create of the
//! same restaurant surfaces as [`CreateOutcome::Lost`] instead of a duplicate.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use reelbites_common::{
    GlobalSummary, IngestError, LinkSubmission, Recommendation, RestaurantRecord,
    SubmissionStatus,
};

use crate::traits::{CreateOutcome, RestaurantStore};

const FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";
const RESTAURANTS: &str = "restaurants";
const SUBMISSIONS: &str = "tiktok_links";

pub struct FirestoreStore {
    client: reqwest::Client,
    project_id: String,
    api_key: String,
}

impl FirestoreStore {
    pub fn new(project_id: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            project_id,
            api_key,
        }
    }

    fn documents_base(&self) -> String {
        format!(
            "{FIRESTORE_URL}/projects/{}/databases/(default)/documents",
            self.project_id
        )
    }

    fn document_name(&self, collection: &str, id: &str) -> String {
        format!(
            "projects/{}/databases/(default)/documents/{collection}/{id}",
            self.project_id
        )
    }

    async fn query_one(&self, filters: Vec<Value>) -> Result<Option<RestaurantRecord>, IngestError> {
        let body = json!({
            "structuredQuery": {
                "from": [{"collectionId": RESTAURANTS}],
                "where": {
                    "compositeFilter": {"op": "AND", "filters": filters}
                },
                "limit": 1
            }
        });

        let url = format!("{}:runQuery?key={}", self.documents_base(), self.api_key);
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| IngestError::Persistence(format!("runQuery failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(IngestError::Persistence(format!(
                "runQuery failed ({status}): {text}"
            )));
        }

        let lines: Vec<Value> = resp
            .json()
            .await
            .map_err(|e| IngestError::Persistence(format!("runQuery decode failed: {e}")))?;

        for line in lines {
            if let Some(doc) = line.get("document") {
                return Ok(Some(record_from_document(doc)?));
            }
        }
        Ok(None)
    }

    async fn commit(&self, writes: Vec<Value>) -> Result<reqwest::Response, IngestError> {
        let url = format!("{}:commit?key={}", self.documents_base(), self.api_key);
        self.client
            .post(&url)
            .json(&json!({ "writes": writes }))
            .send()
            .await
            .map_err(|e| IngestError::Persistence(format!("commit failed: {e}")))
    }
}

#[async_trait]
impl RestaurantStore for FirestoreStore {
    async fn find_by_video_url(
        &self,
        user_id: &str,
        url: &str,
    ) -> Result<Option<RestaurantRecord>, IngestError> {
        self.query_one(vec![
            field_eq("userId", user_id),
            array_contains("videoUrls", url),
        ])
        .await
    }

    async fn find_by_name(
        &self,
        user_id: &str,
        name: &str,
    ) -> Result<Option<RestaurantRecord>, IngestError> {
        self.query_one(vec![field_eq("userId", user_id), field_eq("name", name)])
            .await
    }

    async fn find_by_address(
        &self,
        user_id: &str,
        address: &str,
    ) -> Result<Option<RestaurantRecord>, IngestError> {
        self.query_one(vec![
            field_eq("userId", user_id),
            field_eq("address", address),
        ])
        .await
    }

    async fn create_if_vacant(
        &self,
        record: &RestaurantRecord,
    ) -> Result<CreateOutcome, IngestError> {
        let record_json = serde_json::to_value(record)
            .map_err(|e| IngestError::Persistence(format!("record encode failed: {e}")))?;

        let write = json!({
            "update": {
                "name": self.document_name(RESTAURANTS, &record.id),
                "fields": to_fire_fields(&record_json),
            },
            "currentDocument": { "exists": false },
            "updateTransforms": [
                {"fieldPath": "createdAt", "setToServerValue": "REQUEST_TIME"},
                {"fieldPath": "updatedAt", "setToServerValue": "REQUEST_TIME"},
            ],
        });

        let resp = self.commit(vec![write]).await?;
        let status = resp.status();
        if status.is_success() {
            info!(record_id = record.id.as_str(), name = record.name.as_str(), "Created restaurant record");
            return Ok(CreateOutcome::Created);
        }

        let text = resp.text().await.unwrap_or_default();
        if status.as_u16() == 409
            || text.contains("ALREADY_EXISTS")
            || text.contains("FAILED_PRECONDITION")
        {
            warn!(record_id = record.id.as_str(), "Create lost the race, record already exists");
            return Ok(CreateOutcome::Lost);
        }
        Err(IngestError::Persistence(format!(
            "create failed ({status}): {text}"
        )))
    }

    async fn append_review(
        &self,
        record_id: &str,
        video_url: &str,
        recommendation: &Recommendation,
        summary: &GlobalSummary,
    ) -> Result<(), IngestError> {
        let rec_json = serde_json::to_value(recommendation)
            .map_err(|e| IngestError::Persistence(format!("recommendation encode failed: {e}")))?;
        let summary_json = serde_json::to_value(summary)
            .map_err(|e| IngestError::Persistence(format!("summary encode failed: {e}")))?;

        let write = json!({
            "update": {
                "name": self.document_name(RESTAURANTS, record_id),
                "fields": { "global_summary": to_fire_value(&summary_json) },
            },
            "updateMask": { "fieldPaths": ["global_summary"] },
            "updateTransforms": [
                {
                    "fieldPath": "videoUrls",
                    "appendMissingElements": { "values": [{"stringValue": video_url}] },
                },
                {
                    "fieldPath": "recommendations",
                    "appendMissingElements": { "values": [to_fire_value(&rec_json)] },
                },
                {"fieldPath": "updatedAt", "setToServerValue": "REQUEST_TIME"},
            ],
        });

        let resp = self.commit(vec![write]).await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(IngestError::Persistence(format!(
                "append failed ({status}): {text}"
            )));
        }
        info!(record_id, "Appended review to restaurant record");
        Ok(())
    }

    async fn set_submission_status(
        &self,
        submission: &LinkSubmission,
        status: SubmissionStatus,
        message: Option<&str>,
    ) -> Result<(), IngestError> {
        let mut fields = Map::new();
        fields.insert(
            "status".to_string(),
            to_fire_value(&serde_json::to_value(status).unwrap_or(Value::Null)),
        );
        if let Some(message) = message {
            fields.insert("message".to_string(), json!({"stringValue": message}));
        }

        let url = format!(
            "{}/{}/{}?key={}&updateMask.fieldPaths=status&updateMask.fieldPaths=message",
            self.documents_base(),
            SUBMISSIONS,
            submission.id,
            self.api_key
        );
        let resp = self
            .client
            .patch(&url)
            .json(&json!({ "fields": fields }))
            .send()
            .await
            .map_err(|e| IngestError::Persistence(format!("status update failed: {e}")))?;

        let http_status = resp.status();
        if !http_status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(IngestError::Persistence(format!(
                "status update failed ({http_status}): {text}"
            )));
        }
        debug!(submission_id = %submission.id, ?status, "Submission status recorded");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Value mapping
// ---------------------------------------------------------------------------

fn field_eq(path: &str, value: &str) -> Value {
    json!({
        "fieldFilter": {
            "field": {"fieldPath": path},
            "op": "EQUAL",
            "value": {"stringValue": value}
        }
    })
}

fn array_contains(path: &str, value: &str) -> Value {
    json!({
        "fieldFilter": {
            "field": {"fieldPath": path},
            "op": "ARRAY_CONTAINS",
            "value": {"stringValue": value}
        }
    })
}

/// Encode a JSON value into a Firestore `Value`. Nulls are produced for
/// unset optionals and filtered out at the field level.
fn to_fire_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({"nullValue": null}),
        Value::Bool(b) => json!({"booleanValue": b}),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({"integerValue": i.to_string()})
            } else {
                json!({"doubleValue": n.as_f64()})
            }
        }
        Value::String(s) => json!({"stringValue": s}),
        Value::Array(items) => json!({
            "arrayValue": {"values": items.iter().map(to_fire_value).collect::<Vec<_>>()}
        }),
        Value::Object(_) => json!({"mapValue": {"fields": to_fire_fields(value)}}),
    }
}

/// Encode a JSON object into a Firestore `fields` map, skipping nulls
/// (server-assigned timestamps arrive via transforms instead).
fn to_fire_fields(value: &Value) -> Map<String, Value> {
    let mut fields = Map::new();
    if let Value::Object(obj) = value {
        for (key, val) in obj {
            if val.is_null() {
                continue;
            }
            fields.insert(key.clone(), to_fire_value(val));
        }
    }
    fields
}

/// Decode a Firestore `Value` back into plain JSON.
fn from_fire_value(value: &Value) -> Value {
    let Some(obj) = value.as_object() else {
        return Value::Null;
    };
    if let Some(s) = obj.get("stringValue").and_then(Value::as_str) {
        return Value::String(s.to_string());
    }
    if let Some(s) = obj.get("timestampValue").and_then(Value::as_str) {
        return Value::String(s.to_string());
    }
    if let Some(s) = obj.get("integerValue") {
        let parsed = s
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .or_else(|| s.as_i64());
        if let Some(i) = parsed {
            return json!(i);
        }
    }
    if let Some(d) = obj.get("doubleValue").and_then(Value::as_f64) {
        return json!(d);
    }
    if let Some(b) = obj.get("booleanValue").and_then(Value::as_bool) {
        return Value::Bool(b);
    }
    if let Some(arr) = obj
        .get("arrayValue")
        .and_then(|a| a.get("values"))
        .and_then(Value::as_array)
    {
        return Value::Array(arr.iter().map(from_fire_value).collect());
    }
    if let Some(fields) = obj
        .get("mapValue")
        .and_then(|m| m.get("fields"))
        .and_then(Value::as_object)
    {
        let mut out = Map::new();
        for (key, val) in fields {
            out.insert(key.clone(), from_fire_value(val));
        }
        return Value::Object(out);
    }
    Value::Null
}

fn record_from_document(doc: &Value) -> Result<RestaurantRecord, IngestError> {
    let fields = doc
        .get("fields")
        .and_then(Value::as_object)
        .ok_or_else(|| IngestError::Persistence("document without fields".to_string()))?;

    let mut obj = Map::new();
    for (key, val) in fields {
        obj.insert(key.clone(), from_fire_value(val));
    }
    serde_json::from_value(Value::Object(obj))
        .map_err(|e| IngestError::Persistence(format!("record decode failed: {e}")))
}
