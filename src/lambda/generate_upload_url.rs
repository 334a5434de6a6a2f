//! Registers an attachment on a todo and returns a signed upload URL.

use lambda_http::{run, service_fn, Error as LambdaError, Request as LambdaRequest};
use todo_lambdas::common::errors::into_lambda_result;
use todo_lambdas::common::init_tracing;
use todo_lambdas::config::Config;
use todo_lambdas::handlers::{self, AppState};

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    init_tracing();

    let config = Config::from_env()?;
    let state = AppState::from_config(config).await;

    run(service_fn(|request: LambdaRequest| async {
        into_lambda_result(handlers::generate_upload_url(request, &state).await)
    }))
    .await
}
