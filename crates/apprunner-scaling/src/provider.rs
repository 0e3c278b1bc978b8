//! The cloud seam.
//!
//! [`Provider`] lists the handful of App Runner and CloudFormation calls the
//! lifecycle handler makes. [`crate::aws::Aws`] is the real implementation.
use std::future::Future;

use crate::{Result, ScalingConfigurationRequest};

/// One revision of an auto scaling configuration as listed by the provider.
///
/// Only `arn` drives decisions. `revision` and `status` are informational
/// and show up in log lines.
#[derive(Clone, Debug, PartialEq)]
pub struct ScalingConfigurationSummary {
    pub arn: String,
    pub name: String,
    pub revision: Option<i32>,
    /// Provider status, eg `active` or `inactive`.
    pub status: Option<String>,
}

impl core::fmt::Display for ScalingConfigurationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}'", self.name)?;
        if let Some(revision) = self.revision {
            write!(f, " revision {revision}")?;
        }
        if let Some(status) = &self.status {
            write!(f, " ({status})")?;
        }
        write!(f, " {}", self.arn)
    }
}

/// Status of an asynchronous service operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OperationStatus {
    Pending,
    InProgress,
    Succeeded,
    /// Any other status, kept verbatim. These are all terminal failures.
    Other(String),
}

impl OperationStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, OperationStatus::Pending | OperationStatus::InProgress)
    }
}

impl From<&str> for OperationStatus {
    fn from(status: &str) -> Self {
        match status {
            "PENDING" => OperationStatus::Pending,
            "IN_PROGRESS" => OperationStatus::InProgress,
            "SUCCEEDED" => OperationStatus::Succeeded,
            other => OperationStatus::Other(other.to_owned()),
        }
    }
}

impl core::fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            OperationStatus::Pending => "PENDING",
            OperationStatus::InProgress => "IN_PROGRESS",
            OperationStatus::Succeeded => "SUCCEEDED",
            OperationStatus::Other(status) => status.as_str(),
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct OperationSummary {
    pub id: String,
    pub status: OperationStatus,
}

/// An output of a CloudFormation stack. Only exported outputs have an
/// export name.
#[derive(Clone, Debug, PartialEq)]
pub struct StackOutput {
    pub export_name: Option<String>,
    pub value: String,
}

/// Platform calls needed to reconcile an auto scaling configuration.
///
/// Futures are `Send` so that service updates can run as separate tasks.
pub trait Provider: Send + Sync + 'static {
    /// Creates a configuration, returning its ARN.
    fn create_scaling_configuration(
        &self,
        request: &ScalingConfigurationRequest,
    ) -> impl Future<Output = Result<String>> + Send;

    /// Lists configurations named `name`, in the provider's order.
    fn list_scaling_configurations(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Vec<ScalingConfigurationSummary>>> + Send;

    fn delete_scaling_configuration(&self, arn: &str) -> impl Future<Output = Result<()>> + Send;

    /// Points a service at another configuration, returning the id of the
    /// resulting operation.
    fn update_service_configuration(
        &self,
        service_arn: &str,
        configuration_arn: &str,
    ) -> impl Future<Output = Result<String>> + Send;

    fn list_operations(
        &self,
        service_arn: &str,
    ) -> impl Future<Output = Result<Vec<OperationSummary>>> + Send;

    fn describe_stack_outputs(
        &self,
        stack_name: &str,
    ) -> impl Future<Output = Result<Vec<StackOutput>>> + Send;
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unknown_statuses_are_terminal() {
        for status in ["FAILED", "ROLLBACK_IN_PROGRESS", "ROLLBACK_FAILED"] {
            let parsed = OperationStatus::from(status);
            assert_eq!(OperationStatus::Other(status.to_owned()), parsed);
            assert!(!parsed.is_running());
            assert_eq!(status, parsed.to_string());
        }
        assert!(OperationStatus::from("PENDING").is_running());
        assert!(OperationStatus::from("IN_PROGRESS").is_running());
        assert!(!OperationStatus::from("SUCCEEDED").is_running());
    }

    #[test]
    fn summaries_display_revision_and_status() {
        let mut summary = ScalingConfigurationSummary {
            arn: "arn:scaling/Demo/2/abc".to_owned(),
            name: "Demo".to_owned(),
            revision: Some(2),
            status: Some("active".to_owned()),
        };
        assert_eq!(
            "'Demo' revision 2 (active) arn:scaling/Demo/2/abc",
            summary.to_string()
        );
        summary.revision = None;
        summary.status = None;
        assert_eq!("'Demo' arn:scaling/Demo/2/abc", summary.to_string());
    }
}
