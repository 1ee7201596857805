//! Logical operations of the coordinator as a command/response pair.
//!
//! The wire envelope, its serialization and authentication belong to the
//! external transport layer; any transport that can produce a
//! `CoordinatorCommand` can drive the engine.

use crate::error::ErrorKind;
use crate::model::{
    ArgumentValue, Endpoint, ServiceDefinition, ServiceId, ServiceRecord, Subscription,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub enum CoordinatorCommand {
    CreateService {
        definition: ServiceDefinition,
    },
    ListServices,
    GetService {
        service_id: ServiceId,
    },
    AlterService {
        service_id: ServiceId,
        definition: ServiceDefinition,
    },
    DeleteService {
        service_id: ServiceId,
    },
    RegisterInstance {
        service_id: ServiceId,
        endpoint: Endpoint,
    },
    DeregisterInstance {
        service_id: ServiceId,
        ip: String,
        port: u16,
    },
    Subscribe {
        service_id: ServiceId,
        attributes: Value,
    },
    Unsubscribe {
        service_id: ServiceId,
        token: String,
    },
    Dispatch {
        service_id: ServiceId,
        arguments: Vec<Option<ArgumentValue>>,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub enum CoordinatorResponse {
    Created(ServiceRecord),
    Service(ServiceRecord),
    Services(Vec<ServiceRecord>),
    Altered(ServiceRecord),
    Subscribed(Subscription),
    Selected(Endpoint),
    Success(String),
    Error { kind: ErrorKind, message: String },
}
