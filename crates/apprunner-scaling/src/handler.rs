//! The custom resource lifecycle.
use std::{collections::BTreeMap, sync::Arc, time::Duration};

use snafu::prelude::*;

use crate::{
    poll::{wait_for_operation, DEFAULT_POLL_INTERVAL},
    provider::Provider,
    request::Properties,
    stack::service_export_names,
    JoinSnafu, MissingStackNameSnafu, NoServicesSnafu, Result, ScalingConfigurationRequest,
    ARN_DATA_KEY, DEFAULT_CONFIGURATION_NAME, PHYSICAL_RESOURCE_ID,
};

/// Lifecycle event sent by CloudFormation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestType {
    Create,
    Update,
    Delete,
}

impl core::fmt::Display for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            RequestType::Create => "create",
            RequestType::Update => "update",
            RequestType::Delete => "delete",
        })
    }
}

/// Result of one successful lifecycle invocation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Outcome {
    pub physical_resource_id: String,
    /// Attributes readable with `Fn::GetAtt` on the custom resource.
    pub data: BTreeMap<String, String>,
}

impl Outcome {
    fn empty() -> Self {
        Self {
            physical_resource_id: PHYSICAL_RESOURCE_ID.to_owned(),
            data: BTreeMap::new(),
        }
    }

    fn with_arn(arn: String) -> Self {
        let mut outcome = Self::empty();
        outcome.data.insert(ARN_DATA_KEY.to_owned(), arn);
        outcome
    }

    /// ARN of the configuration created by this invocation, if any.
    pub fn arn(&self) -> Option<&str> {
        self.data.get(ARN_DATA_KEY).map(String::as_str)
    }
}

/// Returns the ARNs of the App Runner services exported by `stack_name`.
pub async fn discover_services<P: Provider>(provider: &P, stack_name: &str) -> Result<Vec<String>> {
    let export_names = service_export_names(stack_name);
    let services = provider
        .describe_stack_outputs(stack_name)
        .await?
        .into_iter()
        .filter(|output| {
            output
                .export_name
                .as_ref()
                .is_some_and(|name| export_names.contains(name))
        })
        .map(|output| output.value)
        .collect::<Vec<_>>();
    log::debug!("  stack {stack_name} exports {} service(s)", services.len());
    Ok(services)
}

/// Reconciles auto scaling configurations against a [`Provider`].
///
/// Each call to [`Handler::handle`] is independent: existing configurations
/// are found again by name every time.
pub struct Handler<P> {
    provider: Arc<P>,
    poll_interval: Duration,
    default_configuration_name: String,
}

impl<P: Provider> Handler<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider: Arc::new(provider),
            poll_interval: DEFAULT_POLL_INTERVAL,
            default_configuration_name: DEFAULT_CONFIGURATION_NAME.to_owned(),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Sets the name of the configuration services are moved onto while
    /// their own configuration is replaced.
    pub fn with_default_configuration_name(mut self, name: impl Into<String>) -> Self {
        self.default_configuration_name = name.into();
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Runs one lifecycle event.
    ///
    /// `properties` are validated before the provider is touched.
    pub async fn handle(
        &self,
        request_type: RequestType,
        properties: &Properties,
    ) -> Result<Outcome> {
        let request = ScalingConfigurationRequest::from_properties(properties)?;
        log::info!("{request_type} auto scaling configuration '{}':", request.name);
        let outcome = match request_type {
            RequestType::Create => self.create(&request).await?,
            RequestType::Update => self.update(&request).await?,
            RequestType::Delete => self.delete(&request).await?,
        };
        log::info!("  success!");
        Ok(outcome)
    }

    async fn create(&self, request: &ScalingConfigurationRequest) -> Result<Outcome> {
        let arn = self.provider.create_scaling_configuration(request).await?;
        log::info!("  created {arn}");
        Ok(Outcome::with_arn(arn))
    }

    async fn update(&self, request: &ScalingConfigurationRequest) -> Result<Outcome> {
        let existing = self.provider.list_scaling_configurations(&request.name).await?;
        // The first listed revision is the one we act on.
        if let Some(stale) = existing.first() {
            if self.detach_services(request).await? {
                log::info!("  deleting stale {stale}");
                self.provider.delete_scaling_configuration(&stale.arn).await?;
            } else {
                // Services may still reference `stale`, so it stays in place.
                log::warn!(
                    "  no '{}' configuration to detach services to, keeping {stale}",
                    self.default_configuration_name
                );
            }
        }
        self.create(request).await
    }

    async fn delete(&self, request: &ScalingConfigurationRequest) -> Result<Outcome> {
        let existing = self.provider.list_scaling_configurations(&request.name).await?;
        match existing.first() {
            Some(configuration) => {
                self.provider
                    .delete_scaling_configuration(&configuration.arn)
                    .await?;
                log::info!("  deleted {configuration}");
            }
            None => log::info!("  '{}' does not exist, nothing to delete", request.name),
        }
        Ok(Outcome::empty())
    }

    /// Moves the stack's services onto the default configuration.
    ///
    /// Returns `false` without touching any service when there is no default
    /// configuration to move them to.
    async fn detach_services(&self, request: &ScalingConfigurationRequest) -> Result<bool> {
        let defaults = self
            .provider
            .list_scaling_configurations(&self.default_configuration_name)
            .await?;
        let Some(default) = defaults.first() else {
            return Ok(false);
        };
        log::debug!("  detaching services to {default}");
        let stack_name = request.stack_name.as_deref().context(MissingStackNameSnafu)?;
        self.update_services(stack_name, &default.arn).await?;
        Ok(true)
    }

    /// Points every service exported by `stack_name` at `configuration_arn`
    /// and waits for all of the resulting operations.
    ///
    /// Services are updated concurrently. The first failure is returned
    /// while the remaining updates are left to run out in the background,
    /// since operations already issued cannot be cancelled.
    pub async fn update_services(&self, stack_name: &str, configuration_arn: &str) -> Result<()> {
        let services = discover_services(self.provider.as_ref(), stack_name).await?;
        ensure!(!services.is_empty(), NoServicesSnafu { stack_name });

        let mut tasks = tokio::task::JoinSet::new();
        for service_arn in services {
            let provider = Arc::clone(&self.provider);
            let configuration_arn = configuration_arn.to_owned();
            let interval = self.poll_interval;
            tasks.spawn(async move {
                log::info!("  pointing {service_arn} at {configuration_arn}");
                let operation_id = provider
                    .update_service_configuration(&service_arn, &configuration_arn)
                    .await?;
                wait_for_operation(provider.as_ref(), &operation_id, &service_arn, interval).await
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined.context(JoinSnafu).and_then(|result| result) {
                tasks.detach_all();
                return Err(e);
            }
        }
        Ok(())
    }
}
