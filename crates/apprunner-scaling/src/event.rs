//! CloudFormation custom resource wire format.
//!
//! CloudFormation invokes the function with a [`CustomResourceRequest`] and
//! then waits for a [`CustomResourceResponse`] to be `PUT` to the request's
//! pre-signed `ResponseURL`. Until that happens the stack operation hangs,
//! so a response is sent even when the handler fails.
use aws_lambda_events::event::cloudformation::{
    CloudFormationCustomResourceRequest, CloudFormationCustomResourceResponse,
    CloudFormationCustomResourceResponseStatus,
};
use snafu::prelude::*;

use crate::{
    handler::{Handler, RequestType},
    provider::Provider,
    request::Properties,
    ResponseBodySnafu, ResponseSnafu, Result,
};

/// A lifecycle request, with both the new and old properties left untyped.
pub type CustomResourceRequest = CloudFormationCustomResourceRequest<Properties, Properties>;

pub type CustomResourceResponse = CloudFormationCustomResourceResponse;

pub type ResponseStatus = CloudFormationCustomResourceResponseStatus;

/// The fields every request variant carries.
#[derive(Clone, Copy, Debug)]
pub struct Envelope<'a> {
    pub request_type: RequestType,
    pub response_url: &'a str,
    pub stack_id: &'a str,
    pub request_id: &'a str,
    pub resource_type: &'a str,
    pub logical_resource_id: &'a str,
    /// Absent on `Create`.
    pub physical_resource_id: Option<&'a str>,
    pub resource_properties: &'a Properties,
}

impl<'a> From<&'a CustomResourceRequest> for Envelope<'a> {
    fn from(request: &'a CustomResourceRequest) -> Self {
        match request {
            CloudFormationCustomResourceRequest::Create(r) => Envelope {
                request_type: RequestType::Create,
                response_url: &r.response_url,
                stack_id: &r.stack_id,
                request_id: &r.request_id,
                resource_type: &r.resource_type,
                logical_resource_id: &r.logical_resource_id,
                physical_resource_id: None,
                resource_properties: &r.resource_properties,
            },
            CloudFormationCustomResourceRequest::Update(r) => Envelope {
                request_type: RequestType::Update,
                response_url: &r.response_url,
                stack_id: &r.stack_id,
                request_id: &r.request_id,
                resource_type: &r.resource_type,
                logical_resource_id: &r.logical_resource_id,
                physical_resource_id: Some(&r.physical_resource_id),
                resource_properties: &r.resource_properties,
            },
            CloudFormationCustomResourceRequest::Delete(r) => Envelope {
                request_type: RequestType::Delete,
                response_url: &r.response_url,
                stack_id: &r.stack_id,
                request_id: &r.request_id,
                resource_type: &r.resource_type,
                logical_resource_id: &r.logical_resource_id,
                physical_resource_id: Some(&r.physical_resource_id),
                resource_properties: &r.resource_properties,
            },
        }
    }
}

impl Envelope<'_> {
    fn response(
        &self,
        status: ResponseStatus,
        physical_resource_id: String,
    ) -> CustomResourceResponse {
        CustomResourceResponse {
            status,
            reason: None,
            physical_resource_id,
            stack_id: self.stack_id.to_owned(),
            request_id: self.request_id.to_owned(),
            logical_resource_id: self.logical_resource_id.to_owned(),
            no_echo: false,
            data: Default::default(),
        }
    }
}

/// `PUT`s `response` to a pre-signed `url`.
pub async fn send(
    client: &reqwest::Client,
    url: &str,
    response: &CustomResourceResponse,
) -> Result<()> {
    let body = serde_json::to_vec(response).context(ResponseBodySnafu)?;
    log::debug!(
        "sending {:?} response for {}",
        response.status,
        response.logical_resource_id
    );
    client
        .put(url)
        // The pre-signed url is signed without a content type.
        .header(reqwest::header::CONTENT_TYPE, "")
        .body(body)
        .send()
        .await
        .context(ResponseSnafu)?
        .error_for_status()
        .context(ResponseSnafu)?;
    Ok(())
}

/// Runs `request` through `handler` and builds the response to send back.
///
/// Failures become a `FAILED` response carrying the error message. The
/// physical id of a failed response is the request's own, or `log_stream`
/// when a `Create` has none yet.
pub async fn respond<P: Provider>(
    handler: &Handler<P>,
    request: &CustomResourceRequest,
    log_stream: &str,
) -> CustomResourceResponse {
    let envelope = Envelope::from(request);
    log::debug!(
        "{} {} '{}' in {}",
        envelope.request_type,
        envelope.resource_type,
        envelope.logical_resource_id,
        envelope.stack_id
    );
    match handler
        .handle(envelope.request_type, envelope.resource_properties)
        .await
    {
        Ok(outcome) => {
            let mut response =
                envelope.response(ResponseStatus::Success, outcome.physical_resource_id);
            response.data = outcome.data.into_iter().collect();
            response
        }
        Err(e) => {
            log::error!("{} failed: {e}", envelope.request_type);
            let physical_resource_id = envelope
                .physical_resource_id
                .unwrap_or(log_stream)
                .to_owned();
            let mut response = envelope.response(ResponseStatus::Failed, physical_resource_id);
            response.reason = Some(e.to_string());
            response
        }
    }
}
