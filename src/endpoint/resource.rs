// Closed set of decoded resource kinds a session can produce.
//
// Sessions exchange `Payload` values so that canned results can be checked
// against the requested kind at dequeue time instead of being type-erased.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::model::{ApiFailure, PhotoPage, SizeLookup};
use crate::error::FetchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    PhotoPage,
    Sizes,
}

impl ResourceKind {
    /// Decode a response body into a payload of this kind.
    pub fn decode(self, body: &[u8]) -> Result<Payload, FetchError> {
        match self {
            ResourceKind::PhotoPage => decode_body::<PhotoPage>(body).map(Payload::PhotoPage),
            ResourceKind::Sizes => decode_body::<SizeLookup>(body).map(Payload::Sizes),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Payload {
    PhotoPage(PhotoPage),
    Sizes(SizeLookup),
}

impl Payload {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Payload::PhotoPage(_) => ResourceKind::PhotoPage,
            Payload::Sizes(_) => ResourceKind::Sizes,
        }
    }
}

/// A decoded result type that an `Endpoint` can be declared with.
pub trait Resource: Sized + Send + 'static {
    const KIND: ResourceKind;

    fn into_payload(self) -> Payload;

    /// Unwrap a payload of the matching kind; hands it back otherwise.
    fn from_payload(payload: Payload) -> Result<Self, Payload>;
}

impl Resource for PhotoPage {
    const KIND: ResourceKind = ResourceKind::PhotoPage;

    fn into_payload(self) -> Payload {
        Payload::PhotoPage(self)
    }

    fn from_payload(payload: Payload) -> Result<Self, Payload> {
        match payload {
            Payload::PhotoPage(page) => Ok(page),
            other => Err(other),
        }
    }
}

impl Resource for SizeLookup {
    const KIND: ResourceKind = ResourceKind::Sizes;

    fn into_payload(self) -> Payload {
        Payload::Sizes(self)
    }

    fn from_payload(payload: Payload) -> Result<Self, Payload> {
        match payload {
            Payload::Sizes(sizes) => Ok(sizes),
            other => Err(other),
        }
    }
}

/// Decode a JSON body, surfacing `{"stat":"fail"}` envelopes as API errors.
pub fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, FetchError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(FetchError::EmptyBody);
    }
    let value: Value = serde_json::from_slice(body)?;
    if value.get("stat").and_then(Value::as_str) == Some("fail") {
        let failure: ApiFailure = serde_json::from_value(value)?;
        return Err(failure.into());
    }
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_is_reported() {
        assert!(matches!(
            ResourceKind::Sizes.decode(b""),
            Err(FetchError::EmptyBody)
        ));
        assert!(matches!(
            ResourceKind::PhotoPage.decode(b"  \n"),
            Err(FetchError::EmptyBody)
        ));
    }

    #[test]
    fn test_api_failure_envelope() {
        let body = br#"{"stat":"fail","code":100,"message":"Invalid API Key"}"#;
        let err = ResourceKind::PhotoPage.decode(body).unwrap_err();
        assert_eq!(err.code(), Some(100));
        assert!(err.to_string().contains("Invalid API Key"));
    }

    #[test]
    fn test_shape_mismatch_is_decode_error() {
        let err = ResourceKind::Sizes.decode(br#"{"stat":"ok","photos":{}}"#).unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn test_payload_kind_round_trip() {
        let body = br#"{"sizes":{"canblog":0,"canprint":0,"candownload":1,"size":[]}}"#;
        let payload = ResourceKind::Sizes.decode(body).unwrap();
        assert_eq!(payload.kind(), ResourceKind::Sizes);
        let back = PhotoPage::from_payload(payload).unwrap_err();
        assert!(SizeLookup::from_payload(back).is_ok());
    }
}
