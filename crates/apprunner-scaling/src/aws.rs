//! Amazon Web Services implementation of [`Provider`].
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_apprunner::{
    error::DisplayErrorContext,
    types::{AutoScalingConfiguration, AutoScalingConfigurationSummary},
};
use snafu::prelude::*;

use crate::{
    provider::{
        OperationStatus, OperationSummary, Provider, ScalingConfigurationSummary, StackOutput,
    },
    Error, MissingFieldSnafu, Result, ScalingConfigurationRequest, StackNotFoundSnafu,
};

/// Maps an SDK failure into [`Error::Provider`], keeping the full error
/// context in the message.
fn sdk_error<E: std::error::Error + 'static>(operation: &'static str) -> impl FnOnce(E) -> Error {
    move |e| Error::Provider {
        operation,
        message: DisplayErrorContext(e).to_string(),
    }
}

/// App Runner and CloudFormation clients for one region.
#[derive(Clone, Debug)]
pub struct Aws {
    apprunner: aws_sdk_apprunner::Client,
    cloudformation: aws_sdk_cloudformation::Client,
}

impl Aws {
    pub fn new(cfg: &SdkConfig) -> Self {
        Self {
            apprunner: aws_sdk_apprunner::Client::new(cfg),
            cloudformation: aws_sdk_cloudformation::Client::new(cfg),
        }
    }

    /// Loads credentials from the default chain and targets `region`.
    pub async fn from_region(region: impl Into<String>) -> Self {
        let region = region.into();
        log::debug!("loading aws config for {region}");
        let cfg = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region))
            .load()
            .await;
        Self::new(&cfg)
    }
}

impl Provider for Aws {
    async fn create_scaling_configuration(
        &self,
        request: &ScalingConfigurationRequest,
    ) -> Result<String> {
        const OPERATION: &str = "CreateAutoScalingConfiguration";
        log::debug!("{OPERATION} {request:?}");
        let out = self
            .apprunner
            .create_auto_scaling_configuration()
            .auto_scaling_configuration_name(&request.name)
            .max_concurrency(request.max_concurrency)
            .max_size(request.max_size)
            .min_size(request.min_size)
            .send()
            .await
            .map_err(sdk_error(OPERATION))?;
        // Required by the model, so newer SDKs drop the `Option`.
        let configuration: Option<AutoScalingConfiguration> = out.auto_scaling_configuration.into();
        configuration
            .and_then(|c| c.auto_scaling_configuration_arn)
            .context(MissingFieldSnafu {
                operation: OPERATION,
                field: "AutoScalingConfigurationArn",
            })
    }

    async fn list_scaling_configurations(
        &self,
        name: &str,
    ) -> Result<Vec<ScalingConfigurationSummary>> {
        const OPERATION: &str = "ListAutoScalingConfigurations";
        log::debug!("{OPERATION} {name}");
        let mut summaries = vec![];
        let mut next_token = None;
        loop {
            let out = self
                .apprunner
                .list_auto_scaling_configurations()
                .auto_scaling_configuration_name(name)
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(sdk_error(OPERATION))?;
            let page: Option<Vec<AutoScalingConfigurationSummary>> =
                out.auto_scaling_configuration_summary_list.into();
            for summary in page.unwrap_or_default() {
                let revision: Option<i32> = summary.auto_scaling_configuration_revision.into();
                summaries.push(ScalingConfigurationSummary {
                    arn: summary
                        .auto_scaling_configuration_arn
                        .context(MissingFieldSnafu {
                            operation: OPERATION,
                            field: "AutoScalingConfigurationArn",
                        })?,
                    name: summary
                        .auto_scaling_configuration_name
                        .unwrap_or_else(|| name.to_owned()),
                    revision,
                    status: summary.status.map(|status| status.as_str().to_owned()),
                });
            }
            next_token = out.next_token;
            if next_token.is_none() {
                break;
            }
        }
        log::debug!("  found {} revision(s) of {name}", summaries.len());
        Ok(summaries)
    }

    async fn delete_scaling_configuration(&self, arn: &str) -> Result<()> {
        log::debug!("DeleteAutoScalingConfiguration {arn}");
        self.apprunner
            .delete_auto_scaling_configuration()
            .auto_scaling_configuration_arn(arn)
            .send()
            .await
            .map_err(sdk_error("DeleteAutoScalingConfiguration"))?;
        Ok(())
    }

    async fn update_service_configuration(
        &self,
        service_arn: &str,
        configuration_arn: &str,
    ) -> Result<String> {
        log::debug!("UpdateService {service_arn} -> {configuration_arn}");
        let out = self
            .apprunner
            .update_service()
            .service_arn(service_arn)
            .auto_scaling_configuration_arn(configuration_arn)
            .send()
            .await
            .map_err(sdk_error("UpdateService"))?;
        // An absent id is reported by the poller as an empty operation id.
        let operation_id: Option<String> = out.operation_id.into();
        Ok(operation_id.unwrap_or_default())
    }

    async fn list_operations(&self, service_arn: &str) -> Result<Vec<OperationSummary>> {
        log::trace!("ListOperations {service_arn}");
        let out = self
            .apprunner
            .list_operations()
            .service_arn(service_arn)
            .send()
            .await
            .map_err(sdk_error("ListOperations"))?;
        Ok(out
            .operation_summary_list()
            .iter()
            .filter_map(|op| {
                let id = op.id()?.to_owned();
                let status = op
                    .status()
                    .map(|status| OperationStatus::from(status.as_str()))
                    .unwrap_or_else(|| OperationStatus::Other("UNKNOWN".to_owned()));
                Some(OperationSummary { id, status })
            })
            .collect())
    }

    async fn describe_stack_outputs(&self, stack_name: &str) -> Result<Vec<StackOutput>> {
        log::debug!("DescribeStacks {stack_name}");
        let out = self
            .cloudformation
            .describe_stacks()
            .stack_name(stack_name)
            .send()
            .await
            .map_err(sdk_error("DescribeStacks"))?;
        let stack = out
            .stacks()
            .first()
            .context(StackNotFoundSnafu { stack_name })?;
        Ok(stack
            .outputs()
            .iter()
            .filter_map(|output| {
                Some(StackOutput {
                    export_name: output.export_name().map(str::to_owned),
                    value: output.output_value()?.to_owned(),
                })
            })
            .collect())
    }
}
