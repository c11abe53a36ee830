//! Lead capture endpoint.
//!
//! Validates the lead form, resolves upstream configuration and runs one
//! cache-first valuation lookup.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use homeval_core::{LookupError, LookupResult, PropertyAddress};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub const LEAD_PATH: &str = "/api/zestimate-lead";

const MISSING_ADDRESS: &str = "Missing address.";
const LEAD_INFO_REQUIRED: &str = "Lead info required.";
const INVALID_JSON: &str = "Invalid JSON body.";

/// Lead form as posted by the landing page.
///
/// Every field is optional at the wire level so that missing fields produce
/// the form's own validation messages instead of a deserialization error.
/// Text fields also take numbers, since forms post zips and phones either way.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct LeadRequest {
    #[serde(deserialize_with = "text_or_number")]
    pub street: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub city: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub state: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub zip: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub email: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub phone: Option<String>,
    pub consent: Option<Value>,
}

fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(_) => Err(D::Error::custom("expected a string or number")),
    }
}

impl LeadRequest {
    /// Checks the form and returns the address to look up.
    pub fn validate(&self) -> ApiResult<PropertyAddress> {
        let (Some(street), Some(city), Some(state)) = (
            present(&self.street),
            present(&self.city),
            present(&self.state),
        ) else {
            return Err(ApiError::bad_request(MISSING_ADDRESS));
        };

        if present(&self.email).is_none() || present(&self.phone).is_none() || !self.consented() {
            return Err(ApiError::bad_request(LEAD_INFO_REQUIRED));
        }

        let address = PropertyAddress::new(street, city, state)
            .map_err(|_| ApiError::bad_request(MISSING_ADDRESS))?;

        Ok(match present(&self.zip) {
            Some(zip) => address.with_zip(zip),
            None => address,
        })
    }

    /// Checkbox values arrive as booleans, "on"/"yes" strings or 1.
    pub fn consented(&self) -> bool {
        match &self.consent {
            None | Some(Value::Null) => false,
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(text)) => !text.trim().is_empty(),
            Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
            Some(Value::Array(_) | Value::Object(_)) => true,
        }
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

#[tracing::instrument(
    name = "lead_lookup",
    skip_all,
    fields(request_id = %uuid::Uuid::new_v4())
)]
pub async fn lookup_lead(
    State(state): State<AppState>,
    payload: Result<Json<LeadRequest>, JsonRejection>,
) -> ApiResult<Json<LookupResult>> {
    let Json(lead) = payload.map_err(|rejection| {
        tracing::debug!(reason = %rejection.body_text(), "rejected lead body");
        ApiError::bad_request(INVALID_JSON)
    })?;
    let address = lead.validate()?;

    let config = state
        .settings
        .resolve()
        .map_err(|error| ApiError::from(LookupError::from(error)))?;

    let result = state
        .service
        .lookup(&address, &config)
        .await
        .map_err(|failure| ApiError::from(LookupError::from(failure)))?;

    tracing::info!(cached = result.cached, "lead lookup answered");
    Ok(Json(result))
}

pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}
