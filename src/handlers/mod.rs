//! Business handler stubs
//!
//! The pipeline's downstream collaborator. Handlers receive the fully
//! populated request context (identity, tenant scope, compliance flags) and
//! own payload validation; persistence and workflow transitions live in the
//! services behind them and are out of scope here.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use uuid::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::auth::Claims;
use crate::context::{ComplianceFlags, TenantScope};
use crate::error::ApiResult;

/// Health check endpoint
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "finbridge-gateway",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Payment processing request
#[derive(Debug, Deserialize, Validate)]
pub struct PaymentRequest {
    #[validate(range(min = 0.01))]
    pub amount: f64,
    #[validate(length(min = 3, max = 3))]
    pub currency: String,
    pub reference: Option<String>,
}

/// Transaction acknowledgement returned by the stub handlers
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub transaction_id: Uuid,
    pub status: &'static str,
    pub amount: f64,
    pub currency: String,
    pub bank_id: String,
    pub initiated_by: Uuid,
    pub requires_manual_review: bool,
}

fn transaction_response(
    claims: &Claims,
    flags: ComplianceFlags,
    amount: f64,
    currency: String,
) -> TransactionResponse {
    TransactionResponse {
        transaction_id: Uuid::new_v4(),
        status: if flags.requires_manual_review {
            "pending_review"
        } else {
            "accepted"
        },
        amount,
        currency,
        bank_id: claims.bank_id.clone(),
        initiated_by: claims.sub,
        requires_manual_review: flags.requires_manual_review,
    }
}

pub async fn process_payment(
    Extension(claims): Extension<Claims>,
    flags: Option<Extension<ComplianceFlags>>,
    Json(req): Json<PaymentRequest>,
) -> ApiResult<Json<TransactionResponse>> {
    req.validate()?;

    let flags = flags.map(|Extension(f)| f).unwrap_or_default();
    Ok(Json(transaction_response(
        &claims,
        flags,
        req.amount,
        req.currency,
    )))
}

/// Transfer initiation request
#[derive(Debug, Deserialize, Validate)]
pub struct TransferRequest {
    #[validate(range(min = 0.01))]
    pub amount: f64,
    #[validate(length(min = 3, max = 3))]
    pub currency: String,
    #[validate(length(min = 1))]
    pub to_account: String,
}

pub async fn initiate_transfer(
    Extension(claims): Extension<Claims>,
    flags: Option<Extension<ComplianceFlags>>,
    Json(req): Json<TransferRequest>,
) -> ApiResult<Json<TransactionResponse>> {
    req.validate()?;

    let flags = flags.map(|Extension(f)| f).unwrap_or_default();
    Ok(Json(transaction_response(
        &claims,
        flags,
        req.amount,
        req.currency,
    )))
}

/// Financing disbursement request
#[derive(Debug, Deserialize, Validate)]
pub struct DisbursementRequest {
    #[validate(range(min = 0.01))]
    pub amount: f64,
    #[validate(length(min = 3, max = 3))]
    pub currency: String,
    pub financing_id: Uuid,
}

pub async fn disburse_financing(
    Extension(claims): Extension<Claims>,
    flags: Option<Extension<ComplianceFlags>>,
    Json(req): Json<DisbursementRequest>,
) -> ApiResult<Json<TransactionResponse>> {
    req.validate()?;

    let flags = flags.map(|Extension(f)| f).unwrap_or_default();
    Ok(Json(transaction_response(
        &claims,
        flags,
        req.amount,
        req.currency,
    )))
}

/// List the caller's bank connections.
///
/// The tenant scope recorded by the pipeline is the implicit filter; the
/// handler never consults a caller-supplied bank identifier.
pub async fn list_banks(Extension(scope): Extension<TenantScope>) -> Json<Value> {
    Json(json!({
        "bank_id": scope.bank_id,
        "connections": [],
    }))
}

/// List accounts for a bank. The tenant guard has already verified that the
/// path parameter matches the caller's own bank.
pub async fn list_bank_accounts(
    Path(bank_id): Path<String>,
    Extension(scope): Extension<TenantScope>,
) -> Json<Value> {
    debug_assert_eq!(bank_id, scope.bank_id);

    Json(json!({
        "bank_id": scope.bank_id,
        "accounts": [],
    }))
}

/// Enable maintenance mode (admin only)
pub async fn enable_maintenance(State(state): State<AppState>) -> Json<Value> {
    state.maintenance.store(true, Ordering::Relaxed);
    tracing::warn!("maintenance mode enabled");
    Json(json!({ "status": "maintenance_mode_enabled" }))
}

/// Disable maintenance mode (admin only)
pub async fn disable_maintenance(State(state): State<AppState>) -> Json<Value> {
    state.maintenance.store(false, Ordering::Relaxed);
    tracing::warn!("maintenance mode disabled");
    Json(json!({ "status": "maintenance_mode_disabled" }))
}
