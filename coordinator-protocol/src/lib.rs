pub mod error;
pub mod messages;
pub mod model;

pub use error::{ConstraintViolation, CoordinatorError, ErrorKind, Result};
pub use messages::{CoordinatorCommand, CoordinatorResponse};
pub use model::{
    ArgumentValue, Constraint, Endpoint, LbMode, Method, Parameter, ParameterType, ServiceDefinition,
    ServiceId, ServiceRecord, Subscription, TopologyChange, TopologyEvent,
};
