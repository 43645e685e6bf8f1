//! HTTP endpoint handlers for the Stampbook API.

#![allow(clippy::missing_errors_doc)]

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::code::generate_code;
use crate::directory::Role;
use crate::error::Error;
use crate::lookup::LookupOutcome;
use crate::verify::{EnrolledCustomer, VerifyOutcome};

use super::error::{ApiError, ApiResult, IntoApiResult};
use super::state::SharedState;

// ============================================================================
// Request and response types
// ============================================================================

/// Health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Query options for the customer code endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CodeQuery {
    /// Include an SVG QR code
    qr: bool,
}

/// A customer's code.
#[derive(Debug, Serialize)]
pub struct CustomerCodeResponse {
    customer_id: String,
    code: String,
    deep_link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    qr_svg: Option<String>,
}

/// Body of `POST /api/resolve`.
#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    /// Code as typed or scanned
    code: String,
}

/// Body of `POST /api/verify`.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    /// Code as typed or scanned
    code: String,
    /// Business running the check
    business_id: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::VERSION,
    })
}

/// GET /api/customers/{id}/code - Code for a known customer.
pub async fn get_customer_code(
    State(state): State<SharedState>,
    Path(customer_id): Path<String>,
    Query(query): Query<CodeQuery>,
) -> ApiResult<Json<CustomerCodeResponse>> {
    let profile = state
        .resolver()
        .directory()
        .profile(&customer_id)
        .await
        .into_api_result()?
        .filter(|p| p.role == Role::Customer)
        .ok_or_else(|| ApiError::from(Error::UnknownCustomer(customer_id.clone())))?;

    let code = generate_code(&profile.id).into_api_result()?;
    let deep_link = crate::qr::create_deep_link(&code, &state.qr);
    let qr_svg = if query.qr {
        Some(crate::qr::generate_svg(&code, &state.qr).into_api_result()?)
    } else {
        None
    };

    Ok(Json(CustomerCodeResponse {
        customer_id: profile.id,
        code: code.to_string(),
        deep_link,
        qr_svg,
    }))
}

/// POST /api/resolve - Resolve a code to a customer identifier.
///
/// Unknown and malformed codes are reported in the body, not as errors.
pub async fn resolve(
    State(state): State<SharedState>,
    Json(request): Json<ResolveRequest>,
) -> ApiResult<Json<LookupOutcome>> {
    let outcome = state.resolver().resolve(&request.code).await.into_api_result()?;
    Ok(Json(outcome))
}

/// POST /api/verify - Find the enrolled customer behind a code.
pub async fn verify(
    State(state): State<SharedState>,
    Json(request): Json<VerifyRequest>,
) -> ApiResult<Json<EnrolledCustomer>> {
    if request.business_id.trim().is_empty() {
        return Err(ApiError::bad_request("business_id must not be empty"));
    }

    let outcome = state
        .verifier
        .find_enrolled_customer(&request.code, &request.business_id)
        .await
        .into_api_result()?;

    match outcome {
        VerifyOutcome::Found(customer) => Ok(Json(customer)),
        VerifyOutcome::NotFound(reason) => {
            let message = reason.message();
            Err(ApiError::from(reason.into_error(&request.code, &request.business_id))
                .with_details(message))
        }
    }
}
