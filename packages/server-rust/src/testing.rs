//! Scripted in-memory [`RpcClient`] shared by the unit tests.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use recordgate_core::messages::{ModelInfo, SearchOptions};
use recordgate_core::{Domain, FieldDef, FieldType, ModelSchema, Record};
use serde_json::{json, Map, Value};

use crate::traits::{RpcClient, RpcError};

/// One observed remote call.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedCall {
    pub model: String,
    pub method: String,
    pub args: Value,
}

/// Client that answers from fixtures and records every call.
pub(crate) struct ScriptedClient {
    schemas: HashMap<String, ModelSchema>,
    /// 1-based indexes of mutation calls (`create`/`write`/`unlink`) that fail.
    failing_mutations: BTreeSet<usize>,
    access_response: Result<Value, RpcError>,
    visible_records: BTreeSet<i64>,
    unreadable_records: BTreeSet<i64>,
    search_rows: Vec<Record>,
    next_id: AtomicI64,
    mutation_count: Mutex<usize>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self {
            schemas: HashMap::new(),
            failing_mutations: BTreeSet::new(),
            access_response: Ok(Value::Bool(true)),
            visible_records: BTreeSet::new(),
            unreadable_records: BTreeSet::new(),
            search_rows: Vec::new(),
            next_id: AtomicI64::new(100),
            mutation_count: Mutex::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Client knowing `res.partner` with only `name` required.
    pub fn with_partner_model() -> Self {
        Self::new().with_schema("res.partner", partner_schema())
    }

    pub fn with_schema(mut self, model: &str, schema: ModelSchema) -> Self {
        self.schemas.insert(model.to_string(), schema);
        self
    }

    pub fn failing_mutation(mut self, nth: usize) -> Self {
        self.failing_mutations.insert(nth);
        self
    }

    pub fn access_response(mut self, response: Result<Value, RpcError>) -> Self {
        self.access_response = response;
        self
    }

    pub fn visible(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.visible_records.extend(ids);
        self
    }

    pub fn unreadable(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.unreadable_records.extend(ids);
        self
    }

    pub fn search_rows(mut self, rows: Vec<Record>) -> Self {
        self.search_rows = rows;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Calls whose method is one of `methods`.
    pub fn calls_to(&self, methods: &[&str]) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| methods.contains(&call.method.as_str()))
            .collect()
    }

    fn record(&self, model: &str, method: &str, args: Value) {
        self.calls.lock().push(RecordedCall {
            model: model.to_string(),
            method: method.to_string(),
            args,
        });
    }
}

pub(crate) fn partner_schema() -> ModelSchema {
    ModelSchema::new()
        .with_field("id", FieldDef::new(FieldType::Integer).readonly())
        .with_field("name", FieldDef::new(FieldType::Char).required())
        .with_field("email", FieldDef::new(FieldType::Char))
        .with_field("is_company", FieldDef::new(FieldType::Boolean))
        .with_field(
            "parent_id",
            FieldDef::new(FieldType::Many2one).relation("res.partner"),
        )
        .with_field(
            "type",
            FieldDef::new(FieldType::Selection)
                .selection([("contact", "Contact"), ("invoice", "Invoice")]),
        )
}

#[async_trait]
impl RpcClient for ScriptedClient {
    async fn execute(
        &self,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    ) -> Result<Value, RpcError> {
        self.record(model, method, json!({"args": args, "kwargs": kwargs}));

        if method == "check_access_rights" {
            return self.access_response.clone();
        }

        let nth = {
            let mut count = self.mutation_count.lock();
            *count += 1;
            *count
        };
        if self.failing_mutations.contains(&nth) {
            return Err(RpcError::Remote(format!(
                "ValidationError: call {nth} rejected by the remote system"
            )));
        }

        match method {
            "create" => {
                let rows = args.first().and_then(Value::as_array).map_or(0, Vec::len);
                let ids: Vec<Value> = (0..rows)
                    .map(|_| json!(self.next_id.fetch_add(1, Ordering::SeqCst)))
                    .collect();
                Ok(Value::Array(ids))
            }
            _ => Ok(Value::Bool(true)),
        }
    }

    async fn search_read(
        &self,
        model: &str,
        domain: &Domain,
        options: &SearchOptions,
    ) -> Result<Vec<Record>, RpcError> {
        self.record(
            model,
            "search_read",
            json!({"domain": domain.to_value(), "options": options}),
        );
        if !self.schemas.contains_key(model) {
            return Err(RpcError::ModelNotFound {
                model: model.to_string(),
            });
        }
        Ok(self.search_rows.clone())
    }

    async fn read_records(
        &self,
        model: &str,
        ids: &[i64],
        fields: Option<&[String]>,
    ) -> Result<Vec<Record>, RpcError> {
        self.record(model, "read", json!({"ids": ids, "fields": fields}));
        if let Some(id) = ids.iter().find(|id| self.unreadable_records.contains(*id)) {
            return Err(RpcError::Remote(format!(
                "Due to security restrictions, you are not allowed to access record {id}. \
                 This operation is allowed for the following group(s): Sales / Manager"
            )));
        }
        Ok(ids
            .iter()
            .filter(|id| self.visible_records.contains(*id))
            .map(|id| {
                let mut row = Map::new();
                row.insert("id".into(), json!(id));
                row
            })
            .collect())
    }

    async fn get_model_fields(&self, model: &str) -> Result<ModelSchema, RpcError> {
        self.record(model, "fields_get", Value::Null);
        self.schemas
            .get(model)
            .cloned()
            .ok_or_else(|| RpcError::ModelNotFound {
                model: model.to_string(),
            })
    }

    async fn get_model_info(&self, model: &str) -> Result<ModelInfo, RpcError> {
        self.record(model, "model_info", Value::Null);
        if self.schemas.contains_key(model) {
            Ok(ModelInfo {
                id: 1,
                name: model.to_string(),
                model: model.to_string(),
            })
        } else {
            Err(RpcError::ModelNotFound {
                model: model.to_string(),
            })
        }
    }
}
