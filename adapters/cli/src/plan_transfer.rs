#![allow(clippy::missing_errors_doc)]

use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};

use crate::plan::{DefensePlan, PlanError};

const PLAN_DOMAIN: &str = "lane-plan";
const PLAN_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded plan payload.
pub(crate) const PLAN_HEADER: &str = "lane-plan:v1";
/// Delimiter used to separate the prefix, version and payload.
const FIELD_DELIMITER: char = ':';

/// Encodes the plan into a single-line string suitable for clipboard transfer.
#[must_use]
pub(crate) fn encode(plan: &DefensePlan) -> String {
    let json = serde_json::to_vec(plan).expect("defense plan serialization never fails");
    let encoded = STANDARD_NO_PAD.encode(json);
    format!("{PLAN_HEADER}:{encoded}")
}

/// Decodes a plan from the provided string representation.
pub(crate) fn decode(value: &str) -> Result<DefensePlan, PlanTransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PlanTransferError::EmptyPayload);
    }

    let mut parts = trimmed.split(FIELD_DELIMITER);
    let domain = parts.next().ok_or(PlanTransferError::MissingPrefix)?;
    let version = parts.next().ok_or(PlanTransferError::MissingVersion)?;
    let payload = parts.next().ok_or(PlanTransferError::MissingPayload)?;

    if domain != PLAN_DOMAIN {
        return Err(PlanTransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != PLAN_VERSION {
        return Err(PlanTransferError::UnsupportedVersion(version.to_owned()));
    }

    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(PlanTransferError::InvalidEncoding)?;
    let decoded: DefensePlan =
        serde_json::from_slice(&bytes).map_err(PlanTransferError::InvalidPayload)?;
    decoded.validate().map_err(PlanTransferError::InvalidPlan)?;

    Ok(decoded)
}

/// Errors that can occur while decoding plan transfer strings.
#[derive(Debug)]
pub(crate) enum PlanTransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the encoded plan.
    MissingPrefix,
    /// The encoded plan did not contain a version segment.
    MissingVersion,
    /// The encoded plan did not include the payload segment.
    MissingPayload,
    /// The encoded plan used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The encoded plan used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The decoded payload could not be deserialised.
    InvalidPayload(serde_json::Error),
    /// The decoded plan references coordinates outside the playfield.
    InvalidPlan(PlanError),
}

impl fmt::Display for PlanTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "transfer payload was empty"),
            Self::MissingPrefix => write!(f, "plan string is missing the prefix"),
            Self::MissingVersion => write!(f, "plan string is missing the version"),
            Self::MissingPayload => write!(f, "plan string is missing the payload"),
            Self::InvalidPrefix(prefix) => write!(f, "plan prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "plan version '{version}' is not supported")
            }
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode plan payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not parse plan payload: {error}")
            }
            Self::InvalidPlan(error) => {
                write!(f, "decoded plan is invalid: {error}")
            }
        }
    }
}

impl Error for PlanTransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            Self::InvalidPlan(error) => Some(error),
            _ => None,
        }
    }
}
