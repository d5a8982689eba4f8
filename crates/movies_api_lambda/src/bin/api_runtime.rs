use lambda_runtime::{service_fn, Error, LambdaEvent};
use movies_api_lambda::adapters::dynamo::DynamoTableStore;
use movies_api_lambda::adapters::translate::AwsTranslator;
use movies_api_lambda::config::RuntimeConfig;
use movies_api_lambda::handlers::response::ApiGatewayResponse;
use movies_api_lambda::handlers::ApiDependencies;
use movies_api_lambda::logging;
use movies_api_lambda::router::handle_event;
use serde_json::Value;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    logging::init();

    let config = RuntimeConfig::from_env()?;
    let sdk_config = config.load_sdk_config().await;
    let store = DynamoTableStore::new(&sdk_config, config.dynamodb_endpoint.as_deref());
    let translator = AwsTranslator::new(&sdk_config);
    info!(
        movies = %config.tables.movies,
        reviews = %config.tables.reviews,
        cast = %config.tables.cast,
        "movies api runtime starting"
    );

    let config = &config;
    let store = &store;
    let translator = &translator;
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        let deps = ApiDependencies {
            store,
            translator,
            tables: &config.tables,
            source_language: &config.source_language,
        };
        Ok::<ApiGatewayResponse, Error>(handle_event(event.payload, deps))
    }))
    .await
}
