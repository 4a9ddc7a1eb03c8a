use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

use dispatch_lambda::adapters::dynamo::DynamoConnectionStore;
use dispatch_lambda::config;
use dispatch_lambda::handlers::connect::handle_connect;
use dispatch_lambda::handlers::SocketResponse;

async fn handle_request(event: LambdaEvent<Value>) -> Result<SocketResponse, Error> {
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let connections = DynamoConnectionStore::new(
        aws_sdk_dynamodb::Client::new(&aws_config),
        config::connections_table_from_env(),
    );
    Ok(handle_connect(event.payload, &connections).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
