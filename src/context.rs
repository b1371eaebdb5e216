//! Per-request context values
//!
//! These types live in the request's extension map, which is owned by the
//! single request's lifetime and never shared across requests. Each guard
//! inserts the value it is responsible for; downstream stages and handlers
//! read them back out.

/// Correlation id, generated once per request (or echoed from the inbound
/// `X-Request-ID` header) and propagated in the response header.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// The authenticated caller's own tenant, recorded by the tenant-scoping
/// guard. Handlers use this as the implicit filter for listing and query
/// operations instead of trusting caller-supplied bank identifiers.
#[derive(Debug, Clone)]
pub struct TenantScope {
    pub bank_id: String,
}

/// Advisory compliance markers set by the transaction-limits guard.
///
/// These never reject a request on their own; downstream business logic
/// decides whether to hold the transaction for review.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComplianceFlags {
    pub suspicious_activity: bool,
    pub requires_manual_review: bool,
}
