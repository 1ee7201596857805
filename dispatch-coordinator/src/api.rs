//! Transport-facing command dispatcher.
//!
//! The wire envelope, serialization and authentication live outside the
//! engine; any transport able to produce a [`CoordinatorCommand`] drives the
//! catalog through here and gets a [`CoordinatorResponse`] back.

use crate::catalog::ServiceCatalog;
use coordinator_protocol::error::CoordinatorError;
use coordinator_protocol::messages::{CoordinatorCommand, CoordinatorResponse};
use log::debug;

pub fn handle_command(catalog: &ServiceCatalog, command: CoordinatorCommand) -> CoordinatorResponse {
    debug!("Api: handling {:?}", command);

    let result = match command {
        CoordinatorCommand::CreateService { definition } => {
            catalog.create(definition).map(CoordinatorResponse::Created)
        }
        CoordinatorCommand::ListServices => {
            Ok(CoordinatorResponse::Services(catalog.list().collect()))
        }
        CoordinatorCommand::GetService { service_id } => {
            catalog.get(&service_id).map(CoordinatorResponse::Service)
        }
        CoordinatorCommand::AlterService {
            service_id,
            definition,
        } => catalog
            .alter(&service_id, definition)
            .map(CoordinatorResponse::Altered),
        CoordinatorCommand::DeleteService { service_id } => catalog
            .delete(&service_id)
            .map(|()| CoordinatorResponse::Success(format!("service '{}' deleted", service_id))),
        CoordinatorCommand::RegisterInstance {
            service_id,
            endpoint,
        } => catalog
            .register(&service_id, endpoint)
            .map(|()| CoordinatorResponse::Success("instance registered".to_string())),
        CoordinatorCommand::DeregisterInstance {
            service_id,
            ip,
            port,
        } => catalog
            .deregister(&service_id, &ip, port)
            .map(|()| CoordinatorResponse::Success("instance deregistered".to_string())),
        CoordinatorCommand::Subscribe {
            service_id,
            attributes,
        } => catalog
            .subscribe(&service_id, attributes)
            .map(CoordinatorResponse::Subscribed),
        CoordinatorCommand::Unsubscribe { service_id, token } => catalog
            .unsubscribe(&service_id, &token)
            .map(|()| CoordinatorResponse::Success("unsubscribed".to_string())),
        CoordinatorCommand::Dispatch {
            service_id,
            arguments,
        } => catalog
            .dispatch(&service_id, &arguments)
            .map(CoordinatorResponse::Selected),
    };

    result.unwrap_or_else(error_response)
}

fn error_response(error: CoordinatorError) -> CoordinatorResponse {
    CoordinatorResponse::Error {
        kind: error.kind(),
        message: error.to_string(),
    }
}
