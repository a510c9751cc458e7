//! Health-check handlers for the container runtime.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can it serve traffic? Failure → pulled from the load-balancer. |
//!
//! Readiness deliberately ignores the analysis result file: a missing file is
//! a normal state (the analyzer has not run yet) and is reported by the API
//! endpoint itself as a 404.

use std::sync::Arc;

use crate::state::AppState;
use crate::{Request, Response};

/// Always `200 OK` with body `"ok"`.
pub async fn liveness(_req: Request, _state: Arc<AppState>) -> Response {
    Response::text("ok")
}

/// `200 OK` with body `"ready"`.
pub async fn readiness(_req: Request, _state: Arc<AppState>) -> Response {
    Response::text("ready")
}
