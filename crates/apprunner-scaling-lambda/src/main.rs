//! Lambda backing the `Custom::AutoScalingConfiguration` resource.
//!
//! Every invocation answers CloudFormation through the event's pre-signed
//! response URL, whether the lifecycle step succeeded or not. The invocation
//! itself only fails when that answer cannot be delivered.
use std::time::Duration;

use clap::Parser;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use scaling::{
    aws::Aws,
    event::{respond, send, CustomResourceRequest, Envelope},
    Handler,
};

#[derive(Debug, Parser)]
#[command(name = "bootstrap", about = "App Runner auto scaling configuration custom resource")]
struct Config {
    /// Region of the stack and its App Runner services.
    #[arg(long, env = "AWS_REGION")]
    region: String,

    /// Seconds between two looks at a running service operation.
    #[arg(long, env = "POLL_INTERVAL_SECS", default_value_t = 10)]
    poll_interval_secs: u64,

    /// Configuration services are moved onto while theirs is replaced.
    #[arg(
        long,
        env = "DEFAULT_CONFIGURATION_NAME",
        default_value = scaling::DEFAULT_CONFIGURATION_NAME
    )]
    default_configuration_name: String,
}

async fn function_handler(
    handler: &Handler<Aws>,
    client: &reqwest::Client,
    event: LambdaEvent<CustomResourceRequest>,
) -> Result<(), Error> {
    let LambdaEvent { payload, context } = event;
    let response = respond(handler, &payload, &context.env_config.log_stream).await;
    let envelope = Envelope::from(&payload);
    log::info!(
        "{} {}: {:?}",
        envelope.request_type,
        envelope.logical_resource_id,
        response.status
    );
    send(client, envelope.response_url, &response).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        // CloudWatch adds the ingestion time.
        .format_timestamp(None)
        .init();
    let config = Config::parse();
    log::debug!("{config:?}");

    let handler = Handler::new(Aws::from_region(&config.region).await)
        .with_poll_interval(Duration::from_secs(config.poll_interval_secs))
        .with_default_configuration_name(config.default_configuration_name);
    let client = reqwest::Client::new();
    run(service_fn(|event| function_handler(&handler, &client, event))).await
}
