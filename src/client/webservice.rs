//! Named webservice lookups and CI mutations built on the session
//!
//! Lookups that expect exactly one row fail with `NoResult` on zero rows and
//! `TooManyResults` on several. Stable id lookups go through the cache.

use serde_json::{Map, Value, json};

use super::models::{AttributeValueType, CreatedCi, RelationDirection, parse_id};
use super::session::CmdbClient;
use super::transport::{Body, Method};
use crate::cache::cache_key;
use crate::error::{ApiError, Result};

type Row = Map<String, Value>;

const WS_ATTRIBUTE_ID_BY_NAME: &str = "int_getAttributeIdByAttributeName";
const WS_RELATION_TYPE_ID_BY_NAME: &str = "int_getCiRelationTypeIdByRelationTypeName";
const WS_ATTRIBUTE_DEFAULT_OPTION_ID: &str = "int_getAttributeDefaultOptionId";
const WS_CI_IDS_OF_TYPE: &str = "int_getListOfCiIdsOfCiType";
const WS_CI_ATTRIBUTE_VALUE: &str = "int_getCiAttributeValue";
const WS_CREATE_CI_PROJECT_MAPPING: &str = "int_createCiProjectMapping";
const WS_CREATE_CI_RELATION: &str = "int_createCiRelation";

/// Exactly one row, or the matching classification
fn single_row<T>(mut rows: Vec<T>, context: &str) -> Result<T> {
    match rows.len() {
        0 => Err(ApiError::NoResult(context.to_string()).into()),
        1 => Ok(rows.remove(0)),
        n => Err(ApiError::TooManyResults(format!("{} ({} rows)", context, n)).into()),
    }
}

fn id_column(row: &Row, column: &str, context: &str) -> Result<u64> {
    row.get(column).and_then(parse_id).ok_or_else(|| {
        ApiError::InvalidResponse(format!("{}: missing or invalid '{}' column", context, column)).into()
    })
}

impl CmdbClient {
    /// Rows of a webservice result; `null` or missing data means no rows
    async fn query_rows(&self, webservice: &str, params: &[(&str, &str)]) -> Result<Vec<Row>> {
        match self.query(webservice, params).await? {
            Value::Null => Ok(Vec::new()),
            data => serde_json::from_value(data).map_err(|e| {
                ApiError::InvalidResponse(format!("Unexpected result of {}: {}", webservice, e)).into()
            }),
        }
    }

    /// Resolve a single id through a webservice, memoized in the cache
    async fn cached_id(&self, webservice: &str, params: &[(&str, &str)], column: &str) -> Result<u64> {
        let key = cache_key(webservice, params);
        if let Some(id) = self.cache().get_as::<u64>(&key) {
            log::debug!("Cache hit: {}", webservice);
            return Ok(id);
        }

        let context = format!("{} {:?}", webservice, params);
        let rows = self.query_rows(webservice, params).await?;
        let id = id_column(&single_row(rows, &context)?, column, &context)?;

        self.cache().set_as(key, &id)?;
        Ok(id)
    }

    /// Id of the attribute called `name`
    pub async fn attribute_id_by_name(&self, name: &str) -> Result<u64> {
        self.cached_id(WS_ATTRIBUTE_ID_BY_NAME, &[("argv1", name)], "id")
            .await
    }

    /// Id of the relation type called `name`
    pub async fn relation_type_id_by_name(&self, name: &str) -> Result<u64> {
        self.cached_id(WS_RELATION_TYPE_ID_BY_NAME, &[("argv1", name)], "id")
            .await
    }

    /// Resolve the label of an enumerated attribute option to its option id
    pub async fn attr_default_option_id(&self, attribute_id: u64, option_label: &str) -> Result<u64> {
        let attribute_id = attribute_id.to_string();
        self.cached_id(
            WS_ATTRIBUTE_DEFAULT_OPTION_ID,
            &[("argv1", attribute_id.as_str()), ("argv2", option_label)],
            "id",
        )
        .await
    }

    /// All CI ids of a CI type; an empty list is a valid answer
    pub async fn ci_ids_of_type(&self, ci_type_id: u64) -> Result<Vec<u64>> {
        let ci_type_id = ci_type_id.to_string();
        let rows = self
            .query_rows(WS_CI_IDS_OF_TYPE, &[("argv1", ci_type_id.as_str())])
            .await?;

        rows.iter()
            .map(|row| id_column(row, "ciid", WS_CI_IDS_OF_TYPE))
            .collect()
    }

    /// The single value of `attribute_name` on a CI, read from `value_type`
    pub async fn ci_attribute_value(
        &self,
        ci_id: u64,
        attribute_name: &str,
        value_type: AttributeValueType,
    ) -> Result<String> {
        let attribute_id = self.attribute_id_by_name(attribute_name).await?.to_string();
        let ci_id = ci_id.to_string();
        let rows = self
            .query_rows(
                WS_CI_ATTRIBUTE_VALUE,
                &[
                    ("argv1", ci_id.as_str()),
                    ("argv2", attribute_id.as_str()),
                    ("argv3", value_type.as_str()),
                ],
            )
            .await?;

        let row = single_row(rows, &format!("{} of CI {}", attribute_name, ci_id))?;
        Ok(match row.get("v") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        })
    }

    /// Create a CI of the given type
    pub async fn create_ci(&self, ci_type_id: u64, icon: &str, history_id: u64) -> Result<CreatedCi> {
        let body = json!({
            "ci": { "ciTypeId": ci_type_id, "icon": icon },
            "historyId": history_id,
        });
        let data = self
            .call(Method::Post, "/apiV2/ci".to_string(), Body::Json(body))
            .await?
            .into_data()?;

        let ci: CreatedCi = serde_json::from_value(data)
            .map_err(|e| ApiError::InvalidResponse(format!("Unexpected created CI: {}", e)))?;
        log::debug!("created CI {} of type {}", ci.id, ci_type_id);
        Ok(ci)
    }

    /// Assign a CI to a project
    pub async fn add_ci_project_mapping(&self, ci_id: u64, project_id: u64, history_id: u64) -> Result<()> {
        let (ci_id, project_id, history_id) =
            (ci_id.to_string(), project_id.to_string(), history_id.to_string());
        self.query(
            WS_CREATE_CI_PROJECT_MAPPING,
            &[("argv1", ci_id.as_str()), ("argv2", project_id.as_str()), ("argv3", history_id.as_str())],
        )
        .await?;
        Ok(())
    }

    /// Link two CIs with a relation of the named type
    pub async fn create_ci_relation(
        &self,
        ci_id_1: u64,
        ci_id_2: u64,
        relation_type_name: &str,
        direction: RelationDirection,
    ) -> Result<()> {
        let relation_type_id = self
            .relation_type_id_by_name(relation_type_name)
            .await?
            .to_string();
        let (ci_id_1, ci_id_2) = (ci_id_1.to_string(), ci_id_2.to_string());
        self.query(
            WS_CREATE_CI_RELATION,
            &[
                ("argv1", ci_id_1.as_str()),
                ("argv2", ci_id_2.as_str()),
                ("argv3", relation_type_id.as_str()),
                ("argv4", direction.as_str()),
            ],
        )
        .await?;
        Ok(())
    }
}
