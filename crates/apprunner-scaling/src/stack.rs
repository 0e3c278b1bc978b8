//! Stack input model.
//!
//! Static parameters of the App Runner stack. The stack builder consumes
//! these; the custom resource only ever sees the slice of them rendered by
//! [`StackInput::custom_resource_properties`].
use snafu::prelude::*;

use crate::{ConfigReadSnafu, ConfigSnafu, Result};

/// Suffixes of the CloudFormation exports that carry App Runner service ARNs.
pub const SERVICE_EXPORT_SUFFIXES: [&str; 2] = [
    "AppRunnerServiceL1ServiceArn",
    "AppRunnerServiceL2ServiceArn",
];

/// Export names under which `stack_name` publishes its service ARNs.
pub fn service_export_names(stack_name: &str) -> [String; 2] {
    SERVICE_EXPORT_SUFFIXES.map(|suffix| format!("{stack_name}{suffix}"))
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SourceConfiguration {
    pub repository_url: String,
    pub branch_name: String,
    pub build_command: String,
    pub start_command: String,
    pub port: u16,
    /// Name of the GitHub connection App Runner pulls the source through.
    pub connection_name: String,
}

impl Default for SourceConfiguration {
    fn default() -> Self {
        Self {
            repository_url: "https://github.com/go-to-k/go-cdk-go-managed-apprunner".to_owned(),
            branch_name: "master".to_owned(),
            build_command: "go install ./app/...".to_owned(),
            start_command: "go run app/main.go".to_owned(),
            port: 8080,
            connection_name: "AppRunnerConnection".to_owned(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct InstanceConfiguration {
    pub cpu: String,
    pub memory: String,
}

impl Default for InstanceConfiguration {
    fn default() -> Self {
        Self {
            cpu: "1 vCPU".to_owned(),
            memory: "2 GB".to_owned(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AutoScaling {
    pub max_concurrency: i32,
    pub max_size: i32,
    pub min_size: i32,
}

impl Default for AutoScaling {
    fn default() -> Self {
        Self {
            max_concurrency: 50,
            max_size: 3,
            min_size: 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct VpcConnector {
    pub vpc_id: String,
    pub subnet_id_1: String,
    pub subnet_id_2: String,
}

impl Default for VpcConnector {
    fn default() -> Self {
        Self {
            vpc_id: "vpc-xxxxxxxxxxxxxxxxxx".to_owned(),
            subnet_id_1: "subnet-xxxxxxxxxxxxxxxxxx".to_owned(),
            subnet_id_2: "subnet-xxxxxxxxxxxxxxxxxx".to_owned(),
        }
    }
}

/// Parameters of the whole App Runner stack.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StackInput {
    pub source: SourceConfiguration,
    pub instance: InstanceConfiguration,
    pub auto_scaling: AutoScaling,
    pub vpc_connector: VpcConnector,
}

impl StackInput {
    /// Parses stack input from TOML. Missing fields take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context(ConfigSnafu)
    }

    /// Reads stack input from a TOML file.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("reading stack input from {path:?}");
        let contents = std::fs::read_to_string(path).context(ConfigReadSnafu { path })?;
        Self::from_toml_str(&contents)
    }

    /// The property bag handed to the custom resource.
    ///
    /// CloudFormation passes every property through as a string, so the
    /// numbers are rendered here and parsed again on the other side.
    pub fn custom_resource_properties(
        &self,
        stack_name: &str,
    ) -> serde_json::Map<String, serde_json::Value> {
        let AutoScaling {
            max_concurrency,
            max_size,
            min_size,
        } = &self.auto_scaling;
        [
            ("AutoScalingConfigurationName", stack_name.to_owned()),
            ("MaxConcurrency", max_concurrency.to_string()),
            ("MaxSize", max_size.to_string()),
            ("MinSize", min_size.to_string()),
            ("StackName", stack_name.to_owned()),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_owned(), serde_json::Value::String(value)))
        .collect()
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let input = StackInput::from_toml_str(
            r#"
            [auto_scaling]
            max_size = 10

            [vpc_connector]
            vpc_id = "vpc-0123"
            "#,
        )
        .unwrap();
        assert_eq!(10, input.auto_scaling.max_size);
        assert_eq!(50, input.auto_scaling.max_concurrency);
        assert_eq!("vpc-0123", input.vpc_connector.vpc_id);
        assert_eq!(SourceConfiguration::default(), input.source);
    }

    #[test]
    fn bad_toml_is_a_config_error() {
        let err = StackInput::from_toml_str("[auto_scaling]\nmax_size = \"many\"").unwrap_err();
        assert!(matches!(err, crate::Error::Config { .. }), "{err}");
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let path = std::env::temp_dir().join("apprunner-scaling-no-such-stack.toml");
        let err = StackInput::load(&path).unwrap_err();
        match err {
            crate::Error::ConfigRead { path: read, source } => {
                assert_eq!(path, read);
                assert_eq!(std::io::ErrorKind::NotFound, source.kind());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn properties_are_strings() {
        let props = StackInput::default().custom_resource_properties("AppRunnerStack");
        let expected = serde_json::json!({
            "AutoScalingConfigurationName": "AppRunnerStack",
            "MaxConcurrency": "50",
            "MaxSize": "3",
            "MinSize": "1",
            "StackName": "AppRunnerStack",
        });
        assert_eq!(expected, serde_json::Value::Object(props));
    }

    #[test]
    fn export_names() {
        assert_eq!(
            [
                "DemoAppRunnerServiceL1ServiceArn".to_owned(),
                "DemoAppRunnerServiceL2ServiceArn".to_owned()
            ],
            service_export_names("Demo")
        );
    }
}
