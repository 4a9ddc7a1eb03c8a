use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

use dispatch_lambda::adapters::apigw::ApiGatewayPush;
use dispatch_lambda::adapters::dynamo::{
    DynamoChatStore, DynamoConnectionStore, DynamoDriverIndex,
};
use dispatch_lambda::config::Config;
use dispatch_lambda::handlers::message::handle_socket_message;
use dispatch_lambda::handlers::SocketResponse;

async fn handle_request(event: LambdaEvent<Value>) -> Result<SocketResponse, Error> {
    let config = Config::from_env()?;

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let dynamo_client = aws_sdk_dynamodb::Client::new(&aws_config);
    // The management API needs the deployment's own callback URL; the
    // regional default endpoint cannot address a specific API.
    let apigw_config = aws_sdk_apigatewaymanagement::config::Builder::from(&aws_config)
        .endpoint_url(&config.websocket_endpoint)
        .build();
    let push = ApiGatewayPush::new(aws_sdk_apigatewaymanagement::Client::from_conf(apigw_config));

    let drivers = DynamoDriverIndex::new(dynamo_client.clone(), config.drivers_table.clone());
    let connections =
        DynamoConnectionStore::new(dynamo_client.clone(), config.connections_table.clone());
    let chat = DynamoChatStore::new(dynamo_client, config.messages_table.clone());

    Ok(handle_socket_message(event.payload, &config, &drivers, &connections, &chat, &push).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
