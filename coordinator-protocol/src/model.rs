//! Shared data model for the coordinator.
//!
//! Everything here is pure data with identical serialization on both sides of
//! the transport seam. Dynamic request payloads are closed off at this
//! boundary: parameter types, constraint keys and load-balancing modes are all
//! enumerations, never open-ended maps.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Server-generated, immutable identifier of a service definition.
pub type ServiceId = String;

/// HTTP verbs a service accepts. Closed set, matched to the wire spelling.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Method {
    #[serde(rename = "GET")]
    Get,
    #[serde(rename = "HEAD")]
    Head,
    #[serde(rename = "POST")]
    Post,
    #[serde(rename = "PUT")]
    Put,
    #[serde(rename = "PATCH")]
    Patch,
    #[serde(rename = "DELETE")]
    Delete,
    #[serde(rename = "OPTIONS")]
    Options,
}

/// Named load-balancing strategy of a service.
///
/// Adding a mode means adding a variant here plus one strategy implementation
/// in the engine's balancer registry; the catalog contract does not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LbMode {
    #[default]
    #[serde(rename = "LBModeRoundRobin")]
    RoundRobin,
}

/// Declared type of a parameter. Decides which constraint keys are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
    Integer,
    Array,
}

impl ParameterType {
    pub fn name(&self) -> &'static str {
        match self {
            ParameterType::String => "string",
            ParameterType::Integer => "integer",
            ParameterType::Array => "array",
        }
    }
}

/// A single validation rule attached to a parameter.
///
/// Serializes as `{"key": ..., "value": ...}`, the shape service payloads
/// carry, but each key has a fixed value type so nothing dynamic survives
/// deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value", rename_all = "camelCase")]
pub enum Constraint {
    MinLength(usize),
    MaxLength(usize),
    Minimum(i64),
    Maximum(i64),
    MinItems(usize),
    MaxItems(usize),
    UniqueItems(bool),
}

impl Constraint {
    /// The wire key of this constraint.
    pub fn key(&self) -> &'static str {
        match self {
            Constraint::MinLength(_) => "minLength",
            Constraint::MaxLength(_) => "maxLength",
            Constraint::Minimum(_) => "minimum",
            Constraint::Maximum(_) => "maximum",
            Constraint::MinItems(_) => "minItems",
            Constraint::MaxItems(_) => "maxItems",
            Constraint::UniqueItems(_) => "uniqueItems",
        }
    }

    /// Whether this constraint is legal on a parameter of the given type.
    pub fn applies_to(&self, param_type: ParameterType) -> bool {
        matches!(
            (self, param_type),
            (
                Constraint::MinLength(_) | Constraint::MaxLength(_),
                ParameterType::String
            ) | (
                Constraint::Minimum(_) | Constraint::Maximum(_),
                ParameterType::Integer
            ) | (
                Constraint::MinItems(_) | Constraint::MaxItems(_) | Constraint::UniqueItems(_),
                ParameterType::Array
            )
        )
    }
}

/// One entry of a service's ordered parameter schema.
///
/// Parameters carry no names; invocation arguments are matched by position.
/// Immutable once validated, replaced wholesale on alter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(rename = "type")]
    pub param_type: ParameterType,
    pub description: String,
    pub required: bool,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
}

/// The mutable attribute set of a service. Everything except the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    pub description: String,
    pub methods: BTreeSet<Method>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    pub mode: LbMode,
    #[serde(default)]
    pub dependencies: BTreeSet<ServiceId>,
    pub version: String,
    pub platform_version: String,
}

/// A stored service: the server-assigned id plus its current attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub id: ServiceId,
    pub definition: ServiceDefinition,
}

/// Lookup key of an endpoint within its service's registry.
pub type EndpointKey = (String, u16);

/// One concrete network endpoint currently implementing a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub ip: String,
    pub port: u16,
    pub api: String,
}

impl Endpoint {
    /// Identity for lookup and removal is the `(ip, port)` pair; the `api`
    /// path is payload.
    pub fn key(&self) -> EndpointKey {
        (self.ip.clone(), self.port)
    }
}

/// A registered interest in topology changes of one service.
///
/// The token is the identity; the attributes are opaque delivery metadata
/// owned by the external notification transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub token: String,
    pub attributes: serde_json::Value,
}

/// What happened to a service's instance topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TopologyChange {
    InstanceAdded,
    InstanceRemoved,
}

/// A topology-change event as delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyEvent {
    pub service_id: ServiceId,
    pub change: TopologyChange,
    pub endpoint: Endpoint,
    pub timestamp_ms: i64,
}

/// A supplied invocation argument. Positional, like the parameter schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgumentValue {
    String(String),
    Integer(i64),
    Array(Vec<serde_json::Value>),
}

impl ArgumentValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            ArgumentValue::String(_) => "string",
            ArgumentValue::Integer(_) => "integer",
            ArgumentValue::Array(_) => "array",
        }
    }
}
