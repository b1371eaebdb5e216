//! Route definitions for the gateway API
//!
//! Each group carries its own guard tail (role check where required, then
//! tenant scoping, then compliance) so the fixed stage order holds for
//! every route. Authentication wraps the whole group set in the pipeline
//! composer.

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};

use crate::app_state::AppState;
use crate::auth::Role;
use crate::handlers;
use crate::middleware::{bank_access, require_role, transaction_limits};

const ADMIN_ROLES: &[Role] = &[Role::Admin, Role::BankAdmin];
const DISBURSEMENT_ROLES: &[Role] = &[Role::Bank, Role::BankAdmin];

/// All authenticated API routes, each with its guard tail applied.
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(bank_routes(state.clone()))
        .merge(payment_routes(state.clone()))
        .merge(transfer_routes(state.clone()))
        .merge(financing_routes(state.clone()))
        .merge(admin_routes(state))
}

/// Tenant scoping and compliance checks, in pipeline order.
fn guarded(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router
        .layer(from_fn_with_state(state, transaction_limits))
        .layer(from_fn(bank_access))
}

fn bank_routes(state: AppState) -> Router<AppState> {
    let router = Router::new()
        .route("/banks", get(handlers::list_banks))
        .route("/banks/:bank_id/accounts", get(handlers::list_bank_accounts));
    guarded(router, state)
}

fn payment_routes(state: AppState) -> Router<AppState> {
    let router = Router::new().route("/payments/process", post(handlers::process_payment));
    guarded(router, state)
}

fn transfer_routes(state: AppState) -> Router<AppState> {
    let router = Router::new().route("/transfers/initiate", post(handlers::initiate_transfer));
    guarded(router, state)
}

fn financing_routes(state: AppState) -> Router<AppState> {
    let router = Router::new().route("/financing/disburse", post(handlers::disburse_financing));
    guarded(router, state).layer(from_fn(require_role(DISBURSEMENT_ROLES)))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    let router = Router::new().route(
        "/admin/maintenance",
        post(handlers::enable_maintenance).delete(handlers::disable_maintenance),
    );
    guarded(router, state).layer(from_fn(require_role(ADMIN_ROLES)))
}
