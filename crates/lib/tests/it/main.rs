/*! Integration tests for Memoir.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - auth: login-security state machine scenarios (lockout, backup credentials)
 * - replication: two-node push, ingest idempotency, recovery pull
 * - http: status-code mapping of the HTTP surface
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("memoir=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod auth;
mod helpers;
mod http;
mod replication;
