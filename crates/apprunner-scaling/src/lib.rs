//! # App Runner scaling
//!
//! A CloudFormation custom resource for AWS App Runner auto scaling
//! configurations.
//!
//! CloudFormation invokes the handler once per stack lifecycle event
//! (`Create`, `Update` or `Delete`) with a property bag describing the
//! desired configuration. The handler reconciles that against App Runner:
//!
//! - **Create** makes a new auto scaling configuration.
//! - **Update** points every App Runner service exported by the owning stack
//!   at the account's default configuration, waits for those service updates
//!   to finish, deletes the stale configuration and creates a fresh one.
//! - **Delete** removes the configuration if it still exists.
//!
//! No state is kept between invocations. Everything the handler needs is
//! re-derived from App Runner and CloudFormation by name on every call.
//!
//! ## Concepts
//!
//! - [`Provider`] is the seam between the lifecycle logic and the cloud.
//!   [`aws::Aws`] implements it with the AWS SDK, tests implement it in
//!   memory.
//! - [`Handler`] drives the lifecycle state machine.
//! - [`event`] speaks the custom resource wire protocol.
//!
//! ## Error Handling
//!
//! Every fallible function returns a `Result` with the crate-wide [`Error`].
//! Errors are never retried here; they abort the invocation and are
//! reported back to CloudFormation as a failed resource.

pub mod aws;
pub mod event;
pub mod handler;
pub mod poll;
pub mod provider;
pub mod request;
pub mod stack;

pub use handler::{Handler, Outcome, RequestType};
pub use provider::{
    OperationStatus, OperationSummary, Provider, ScalingConfigurationSummary, StackOutput,
};
pub use request::ScalingConfigurationRequest;
pub use stack::StackInput;

/// Physical id reported for every auto scaling configuration resource.
///
/// There is only ever one of these per stack so a constant id is enough.
pub const PHYSICAL_RESOURCE_ID: &str = "AutoScalingConfiguration";

/// Key of the configuration ARN in the response data.
pub const ARN_DATA_KEY: &str = "AutoScalingConfigurationArn";

/// Name of the account-wide fallback configuration services are detached to.
pub const DEFAULT_CONFIGURATION_NAME: &str = "DefaultConfiguration";

/// Top-level error enum that encompasses all errors.
#[derive(snafu::Snafu, Debug)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Missing resource property '{name}'"))]
    MissingProperty { name: &'static str },

    #[snafu(display("Resource property '{name}' must be a string, saw {value}"))]
    PropertyType {
        name: &'static str,
        value: serde_json::Value,
    },

    #[snafu(display("Resource property '{name}' is not an integer '{value}': {source}"))]
    ParseProperty {
        name: &'static str,
        value: String,
        source: std::num::ParseIntError,
    },

    #[snafu(display("Resource property '{name}' is invalid: {msg}"))]
    InvalidProperty { name: &'static str, msg: String },

    #[snafu(display("Resource property 'StackName' is required to detach services"))]
    MissingStackName,

    #[snafu(display("{operation} failed: {message}"))]
    Provider {
        operation: &'static str,
        message: String,
    },

    #[snafu(display("{operation} response is missing '{field}'"))]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },

    #[snafu(display("Could not find stack '{stack_name}'"))]
    StackNotFound { stack_name: String },

    #[snafu(display("Could not find any App Runner service exported by stack '{stack_name}'"))]
    NoServices { stack_name: String },

    #[snafu(display("Operation id for service '{service_arn}' is empty"))]
    EmptyOperationId { service_arn: String },

    #[snafu(display("Operation '{operation_id}' on '{service_arn}' ended with status {status}"))]
    OperationFailed {
        operation_id: String,
        service_arn: String,
        status: String,
    },

    #[snafu(display("Could not find operation '{operation_id}' on '{service_arn}'"))]
    OperationNotFound {
        operation_id: String,
        service_arn: String,
    },

    #[snafu(display("Service update task did not finish: {source}"))]
    Join { source: tokio::task::JoinError },

    #[snafu(display("Could not read stack input '{path:?}': {source}"))]
    ConfigRead {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Could not parse stack input: {source}"))]
    Config { source: toml::de::Error },

    #[snafu(display("Could not serialize custom resource response: {source}"))]
    ResponseBody { source: serde_json::Error },

    #[snafu(display("Could not send custom resource response: {source}"))]
    Response { source: reqwest::Error },
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
