//! Parsing of the custom resource property bag.
use snafu::prelude::*;

use crate::{
    InvalidPropertySnafu, MissingPropertySnafu, ParsePropertySnafu, PropertyTypeSnafu, Result,
};

/// Untyped properties as CloudFormation sends them.
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// A validated request for one auto scaling configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScalingConfigurationRequest {
    /// Configuration name, unique per stack.
    pub name: String,
    /// Concurrent requests per instance before scaling out.
    pub max_concurrency: i32,
    pub max_size: i32,
    pub min_size: i32,
    /// Stack owning the services that use this configuration.
    pub stack_name: Option<String>,
}

fn string_property<'a>(properties: &'a Properties, name: &'static str) -> Result<&'a str> {
    let value = properties
        .get(name)
        .context(MissingPropertySnafu { name })?;
    value.as_str().with_context(|| PropertyTypeSnafu {
        name,
        value: value.clone(),
    })
}

fn int_property(properties: &Properties, name: &'static str) -> Result<i32> {
    let value = string_property(properties, name)?;
    let n = value
        .trim()
        .parse::<i32>()
        .context(ParsePropertySnafu { name, value })?;
    ensure!(
        n >= 1,
        InvalidPropertySnafu {
            name,
            msg: format!("must be at least 1, saw {n}"),
        }
    );
    Ok(n)
}

impl ScalingConfigurationRequest {
    /// Validates `properties` into a request.
    ///
    /// Keys other than the ones read here (`ServiceToken`, for one) are
    /// ignored.
    pub fn from_properties(properties: &Properties) -> Result<Self> {
        let name = string_property(properties, "AutoScalingConfigurationName")?;
        ensure!(
            !name.is_empty(),
            InvalidPropertySnafu {
                name: "AutoScalingConfigurationName",
                msg: "must not be empty",
            }
        );
        let max_concurrency = int_property(properties, "MaxConcurrency")?;
        let max_size = int_property(properties, "MaxSize")?;
        let min_size = int_property(properties, "MinSize")?;
        ensure!(
            max_size >= min_size,
            InvalidPropertySnafu {
                name: "MaxSize",
                msg: format!("{max_size} is less than MinSize {min_size}"),
            }
        );
        let stack_name = match properties.get("StackName") {
            None => None,
            Some(_) => {
                let stack_name = string_property(properties, "StackName")?;
                ensure!(
                    !stack_name.is_empty(),
                    InvalidPropertySnafu {
                        name: "StackName",
                        msg: "must not be empty",
                    }
                );
                Some(stack_name.to_owned())
            }
        };

        Ok(Self {
            name: name.to_owned(),
            max_concurrency,
            max_size,
            min_size,
            stack_name,
        })
    }
}
