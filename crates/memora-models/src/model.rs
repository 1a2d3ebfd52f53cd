//! Model factory over the remote CRUD seam.
//!
//! [`modelize`] binds a resource namespace and a declared field list to a
//! shared [`RemoteClient`] and returns a [`ModelType`], the class-level handle
//! that constructs, retrieves and lists [`Model`] instances. Only declared
//! fields ever travel to the transport; everything else an instance carries
//! stays local.

use memora_client::{ClientResult, Record, RemoteClient};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// Class-level metadata: the remote collection name and the ordered list of
/// persisted field names.
#[derive(Clone, Debug)]
pub struct ModelSchema {
    pub namespace: String,
    pub fields: Vec<String>,
}

impl ModelSchema {
    /// Duplicate field names are dropped, first occurrence wins.
    fn new(namespace: &str, fields: &[&str]) -> Self {
        let mut unique: Vec<String> = Vec::with_capacity(fields.len());
        for field in fields {
            if !unique.iter().any(|f| f == field) {
                unique.push((*field).to_string());
            }
        }
        Self {
            namespace: namespace.to_string(),
            fields: unique,
        }
    }
}

/// Produce a model type bound to `namespace` and `fields`.
///
/// The remote client is an explicit dependency; model types sharing one
/// transport clone the same `Arc`.
pub fn modelize(client: Arc<dyn RemoteClient>, namespace: &str, fields: &[&str]) -> ModelType {
    ModelType {
        schema: Arc::new(ModelSchema::new(namespace, fields)),
        client,
    }
}

/// Class-level handle for one model type: constructs instances and performs
/// the namespace-scoped reads.
#[derive(Clone)]
pub struct ModelType {
    schema: Arc<ModelSchema>,
    client: Arc<dyn RemoteClient>,
}

impl ModelType {
    pub fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    /// Construct an instance from a properties record.
    ///
    /// `created` is true iff the record carries a non-empty string `"uuid"`
    /// (implying it came from the remote service); otherwise a fresh v4
    /// identifier is generated.
    pub fn instance(&self, props: Record) -> Model {
        let supplied = props
            .get("uuid")
            .and_then(Value::as_str)
            .filter(|uuid| !uuid.is_empty())
            .map(str::to_string);

        Model {
            created: supplied.is_some(),
            uuid: supplied.unwrap_or_else(|| Uuid::new_v4().to_string()),
            schema: Arc::clone(&self.schema),
            client: Arc::clone(&self.client),
            props,
        }
    }

    /// Fetch one record and hydrate an instance from it. Transport failures
    /// (including not-found) propagate untranslated.
    pub async fn retrieve(&self, uuid: &str) -> ClientResult<Model> {
        let values = self.client.retrieve(&self.schema.namespace, uuid).await?;
        Ok(self.instance(values))
    }

    /// Fetch every record in the namespace, one instance per record, in the
    /// order the transport returned them.
    pub async fn list(&self) -> ClientResult<Vec<Model>> {
        let records = self.client.list(&self.schema.namespace).await?;
        Ok(records.into_iter().map(|values| self.instance(values)).collect())
    }
}

/// One in-memory resource instance.
///
/// Tracks its identifier and whether a matching record is known to exist
/// remotely. The `created` flag mutates only after the corresponding remote
/// call resolves successfully.
pub struct Model {
    schema: Arc<ModelSchema>,
    client: Arc<dyn RemoteClient>,
    uuid: String,
    created: bool,
    props: Record,
}

impl Model {
    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    pub fn created(&self) -> bool {
        self.created
    }

    /// Read a property as constructed or last set.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.props.get(field)
    }

    /// Set a property. The projection still decides what travels on save.
    pub fn set(&mut self, field: &str, value: Value) {
        self.props.insert(field.to_string(), value);
    }

    /// Project the instance down to exactly the declared fields.
    ///
    /// A declared `"uuid"` field resolves to the instance identifier;
    /// declared fields absent from the properties are skipped. Non-declared
    /// properties never appear.
    pub fn values(&self) -> Record {
        let mut values = Record::new();
        for field in &self.schema.fields {
            if field == "uuid" {
                values.insert(field.clone(), Value::String(self.uuid.clone()));
            } else if let Some(value) = self.props.get(field) {
                values.insert(field.clone(), value.clone());
            }
        }
        values
    }

    /// Persist the instance: update when `created`, create otherwise.
    ///
    /// On a successful create the instance becomes `created`; a failing call
    /// leaves the flag untouched and propagates the transport error.
    pub async fn save(&mut self) -> ClientResult<Value> {
        let values = self.values();

        if self.created {
            tracing::debug!(
                namespace = %self.schema.namespace,
                uuid = %self.uuid,
                "updating model"
            );
            return self
                .client
                .update(&self.schema.namespace, &self.uuid, &values)
                .await;
        }

        tracing::debug!(
            namespace = %self.schema.namespace,
            uuid = %self.uuid,
            "creating model"
        );
        let response = self.client.create(&self.schema.namespace, &values).await?;
        self.created = true;

        Ok(response)
    }

    /// Delete the remote record. On success the instance is no longer
    /// `created`; the in-memory object stays usable and can be saved again.
    pub async fn remove(&mut self) -> ClientResult<Value> {
        tracing::debug!(
            namespace = %self.schema.namespace,
            uuid = %self.uuid,
            "removing model"
        );
        let response = self
            .client
            .remove(&self.schema.namespace, &self.uuid)
            .await?;
        self.created = false;

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use memora_client::ClientError;
    use serde_json::json;
    use std::sync::Mutex;

    // Mock transport recording every call it receives.
    #[derive(Default)]
    struct MockClient {
        calls: Mutex<Vec<String>>,
        records: Vec<Record>,
        fail: bool,
    }

    impl MockClient {
        fn with_records(records: Vec<Record>) -> Self {
            Self {
                records,
                ..Self::default()
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn log(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn check(&self) -> ClientResult<()> {
            if self.fail {
                return Err(ClientError::Status {
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl RemoteClient for MockClient {
        async fn retrieve(&self, namespace: &str, uuid: &str) -> ClientResult<Record> {
            self.log(format!("retrieve {} {}", namespace, uuid));
            self.check()?;
            self.records
                .iter()
                .find(|r| r.get("uuid").and_then(Value::as_str) == Some(uuid))
                .cloned()
                .ok_or(ClientError::Status {
                    status: 404,
                    body: "not found".to_string(),
                })
        }

        async fn list(&self, namespace: &str) -> ClientResult<Vec<Record>> {
            self.log(format!("list {}", namespace));
            self.check()?;
            Ok(self.records.clone())
        }

        async fn create(&self, namespace: &str, values: &Record) -> ClientResult<Value> {
            self.log(format!("create {} {}", namespace, Value::Object(values.clone())));
            self.check()?;
            Ok(json!({"ok": "created"}))
        }

        async fn update(&self, namespace: &str, uuid: &str, values: &Record) -> ClientResult<Value> {
            self.log(format!(
                "update {} {} {}",
                namespace,
                uuid,
                Value::Object(values.clone())
            ));
            self.check()?;
            Ok(json!({"ok": "updated"}))
        }

        async fn remove(&self, namespace: &str, uuid: &str) -> ClientResult<Value> {
            self.log(format!("remove {} {}", namespace, uuid));
            self.check()?;
            Ok(json!({"ok": "removed"}))
        }
    }

    fn record(value: Value) -> Record {
        value.as_object().unwrap().clone()
    }

    fn albums(client: Arc<MockClient>) -> ModelType {
        modelize(client, "albums", &["title", "year"])
    }

    #[test]
    fn test_new_instance_gets_fresh_uuid() {
        let model_type = albums(Arc::new(MockClient::default()));
        let instance = model_type.instance(record(json!({"title": "Trip", "year": 2024})));

        assert!(!instance.created());
        assert!(!instance.uuid().is_empty());
        assert_eq!(
            Value::Object(instance.values()),
            json!({"title": "Trip", "year": 2024})
        );
    }

    #[test]
    fn test_supplied_uuid_marks_created() {
        let model_type = albums(Arc::new(MockClient::default()));
        let instance = model_type.instance(record(json!({"uuid": "X", "title": "Trip"})));

        assert!(instance.created());
        assert_eq!(instance.uuid(), "X");
    }

    #[test]
    fn test_empty_uuid_counts_as_absent() {
        let model_type = albums(Arc::new(MockClient::default()));
        let instance = model_type.instance(record(json!({"uuid": "", "title": "Trip"})));

        assert!(!instance.created());
        assert_ne!(instance.uuid(), "");
    }

    #[test]
    fn test_values_projects_declared_fields_only() {
        let model_type = albums(Arc::new(MockClient::default()));
        let instance =
            model_type.instance(record(json!({"title": "Trip", "year": 2024, "draft": true})));

        let values = instance.values();
        assert_eq!(values.len(), 2);
        assert!(!values.contains_key("draft"));
    }

    #[test]
    fn test_values_skips_missing_declared_fields() {
        let model_type = albums(Arc::new(MockClient::default()));
        let instance = model_type.instance(record(json!({"title": "Trip"})));

        assert_eq!(Value::Object(instance.values()), json!({"title": "Trip"}));
    }

    #[test]
    fn test_declared_uuid_field_resolves_to_identifier() {
        let client = Arc::new(MockClient::default());
        let model_type = modelize(client, "albums", &["uuid", "title"]);
        let instance = model_type.instance(record(json!({"uuid": "X", "title": "Trip"})));

        assert_eq!(
            Value::Object(instance.values()),
            json!({"uuid": "X", "title": "Trip"})
        );
    }

    #[test]
    fn test_duplicate_declared_fields_deduplicated() {
        let client = Arc::new(MockClient::default());
        let model_type = modelize(client, "albums", &["title", "title", "year"]);

        assert_eq!(model_type.schema().fields, vec!["title", "year"]);
    }

    #[test]
    fn test_set_then_values() {
        let model_type = albums(Arc::new(MockClient::default()));
        let mut instance = model_type.instance(record(json!({"title": "Trip"})));
        instance.set("year", json!(2025));
        instance.set("draft", json!(true));

        assert_eq!(
            Value::Object(instance.values()),
            json!({"title": "Trip", "year": 2025})
        );
        assert_eq!(instance.get("draft"), Some(&json!(true)));
    }

    #[tokio::test]
    async fn test_save_creates_then_updates() {
        let client = Arc::new(MockClient::default());
        let model_type = albums(Arc::clone(&client));
        let mut instance = model_type.instance(record(json!({"title": "Trip"})));

        let response = instance.save().await.unwrap();
        assert_eq!(response, json!({"ok": "created"}));
        assert!(instance.created());

        instance.save().await.unwrap();

        let calls = client.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].starts_with("create albums"));
        assert!(calls[1].starts_with("update albums"));
    }

    #[tokio::test]
    async fn test_failed_create_leaves_created_false() {
        let client = Arc::new(MockClient::failing());
        let model_type = albums(client);
        let mut instance = model_type.instance(record(json!({"title": "Trip"})));

        let result = instance.save().await;
        assert!(matches!(result, Err(ClientError::Status { status: 500, .. })));
        assert!(!instance.created());
    }

    #[tokio::test]
    async fn test_remove_clears_created() {
        let client = Arc::new(MockClient::default());
        let model_type = albums(Arc::clone(&client));
        let mut instance = model_type.instance(record(json!({"uuid": "X", "title": "Trip"})));

        let response = instance.remove().await.unwrap();
        assert_eq!(response, json!({"ok": "removed"}));
        assert!(!instance.created());

        let calls = client.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), ["remove albums X"]);
    }

    #[tokio::test]
    async fn test_failed_remove_leaves_created_true() {
        let client = Arc::new(MockClient::failing());
        let model_type = albums(client);
        let mut instance = model_type.instance(record(json!({"uuid": "X", "title": "Trip"})));

        assert!(instance.remove().await.is_err());
        assert!(instance.created());
    }

    #[tokio::test]
    async fn test_retrieve_hydrates_instance() {
        let client = Arc::new(MockClient::with_records(vec![record(
            json!({"uuid": "X", "title": "Trip", "year": 2024}),
        )]));
        let model_type = albums(client);

        let instance = model_type.retrieve("X").await.unwrap();
        assert!(instance.created());
        assert_eq!(instance.uuid(), "X");
        assert_eq!(instance.get("title"), Some(&json!("Trip")));
    }

    #[tokio::test]
    async fn test_retrieve_propagates_not_found() {
        let client = Arc::new(MockClient::default());
        let model_type = albums(client);

        let result = model_type.retrieve("missing").await;
        assert!(matches!(result, Err(ClientError::Status { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_list_preserves_transport_order() {
        let client = Arc::new(MockClient::with_records(vec![
            record(json!({"uuid": "B", "title": "Second"})),
            record(json!({"uuid": "A", "title": "First"})),
        ]));
        let model_type = albums(client);

        let instances = model_type.list().await.unwrap();
        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0].uuid(), "B");
        assert_eq!(instances[1].uuid(), "A");
        assert!(instances.iter().all(Model::created));
    }
}
