//! Request counters. No recorder is installed by this crate; without one the
//! macros are no-ops.

pub const API_REQUESTS: &str = "fitbit_api_requests_total";
pub const TOKEN_REFRESHES: &str = "fitbit_token_refresh_total";

pub fn record_request(endpoint: &'static str, status: u16) {
    metrics::counter!(API_REQUESTS, "endpoint" => endpoint, "status" => status.to_string())
        .increment(1);
}

pub fn record_token_refresh(ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    metrics::counter!(TOKEN_REFRESHES, "outcome" => outcome).increment(1);
}
