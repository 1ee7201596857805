//! Schema validation for parameter definitions and invocation arguments.
//!
//! Both passes collect every violation before failing, so one rejected call
//! reports all of its problems at once instead of short-circuiting on the
//! first.

use coordinator_protocol::error::{ConstraintViolation, CoordinatorError, Result};
use coordinator_protocol::model::{
    ArgumentValue, Constraint, Parameter, ParameterType, ServiceDefinition,
};
use std::collections::HashSet;

/// Checks a definition at create/alter time: methods non-empty, every
/// constraint key legal for its parameter's declared type, no duplicate keys,
/// and paired bounds well-ordered.
pub fn validate_definition(definition: &ServiceDefinition) -> Result<()> {
    let mut violations = Vec::new();

    if definition.methods.is_empty() {
        violations.push(ConstraintViolation::definition(
            "methods must contain at least one HTTP verb",
        ));
    }

    for (index, parameter) in definition.parameters.iter().enumerate() {
        check_parameter(index, parameter, &mut violations);
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(CoordinatorError::Validation(violations))
    }
}

/// Checks supplied arguments against a service's parameter schema at dispatch
/// time. Arguments are positional, matching the ordered schema.
pub fn validate_arguments(
    parameters: &[Parameter],
    arguments: &[Option<ArgumentValue>],
) -> Result<()> {
    let mut violations = Vec::new();

    for (index, parameter) in parameters.iter().enumerate() {
        match arguments.get(index).and_then(|argument| argument.as_ref()) {
            Some(value) => check_value(index, parameter, value, &mut violations),
            None => {
                if parameter.required {
                    violations.push(ConstraintViolation::parameter(
                        index,
                        "required argument missing",
                    ));
                }
            }
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(CoordinatorError::Validation(violations))
    }
}

fn check_parameter(index: usize, parameter: &Parameter, violations: &mut Vec<ConstraintViolation>) {
    let mut seen_keys: HashSet<&'static str> = HashSet::new();

    for constraint in &parameter.constraints {
        if !seen_keys.insert(constraint.key()) {
            violations.push(ConstraintViolation::constraint(
                index,
                constraint.key(),
                "duplicate constraint key",
            ));
        }
        if !constraint.applies_to(parameter.param_type) {
            violations.push(ConstraintViolation::constraint(
                index,
                constraint.key(),
                format!(
                    "not valid for a {} parameter",
                    parameter.param_type.name()
                ),
            ));
        }
    }

    check_bounds(index, parameter, violations);
}

/// Paired bounds must be well-ordered when both sides are present.
fn check_bounds(index: usize, parameter: &Parameter, violations: &mut Vec<ConstraintViolation>) {
    let mut min_length = None;
    let mut max_length = None;
    let mut minimum = None;
    let mut maximum = None;
    let mut min_items = None;
    let mut max_items = None;

    for constraint in &parameter.constraints {
        match constraint {
            Constraint::MinLength(value) => min_length = Some(*value),
            Constraint::MaxLength(value) => max_length = Some(*value),
            Constraint::Minimum(value) => minimum = Some(*value),
            Constraint::Maximum(value) => maximum = Some(*value),
            Constraint::MinItems(value) => min_items = Some(*value),
            Constraint::MaxItems(value) => max_items = Some(*value),
            Constraint::UniqueItems(_) => {}
        }
    }

    if let (Some(lower), Some(upper)) = (min_length, max_length) {
        if lower > upper {
            violations.push(ConstraintViolation::constraint(
                index,
                "minLength",
                format!("minLength {} exceeds maxLength {}", lower, upper),
            ));
        }
    }
    if let (Some(lower), Some(upper)) = (minimum, maximum) {
        if lower > upper {
            violations.push(ConstraintViolation::constraint(
                index,
                "minimum",
                format!("minimum {} exceeds maximum {}", lower, upper),
            ));
        }
    }
    if let (Some(lower), Some(upper)) = (min_items, max_items) {
        if lower > upper {
            violations.push(ConstraintViolation::constraint(
                index,
                "minItems",
                format!("minItems {} exceeds maxItems {}", lower, upper),
            ));
        }
    }
}

fn check_value(
    index: usize,
    parameter: &Parameter,
    value: &ArgumentValue,
    violations: &mut Vec<ConstraintViolation>,
) {
    // Shape first: a value of the wrong type cannot be checked further.
    let matches_type = matches!(
        (parameter.param_type, value),
        (ParameterType::String, ArgumentValue::String(_))
            | (ParameterType::Integer, ArgumentValue::Integer(_))
            | (ParameterType::Array, ArgumentValue::Array(_))
    );
    if !matches_type {
        violations.push(ConstraintViolation::parameter(
            index,
            format!(
                "expected a {} value, got {}",
                parameter.param_type.name(),
                value.type_name()
            ),
        ));
        return;
    }

    for constraint in &parameter.constraints {
        check_constraint(index, constraint, value, violations);
    }
}

fn check_constraint(
    index: usize,
    constraint: &Constraint,
    value: &ArgumentValue,
    violations: &mut Vec<ConstraintViolation>,
) {
    match (constraint, value) {
        (Constraint::MinLength(bound), ArgumentValue::String(text)) => {
            let length = text.chars().count();
            if length < *bound {
                violations.push(ConstraintViolation::constraint(
                    index,
                    constraint.key(),
                    format!("value is {} characters, shorter than minLength {}", length, bound),
                ));
            }
        }
        (Constraint::MaxLength(bound), ArgumentValue::String(text)) => {
            let length = text.chars().count();
            if length > *bound {
                violations.push(ConstraintViolation::constraint(
                    index,
                    constraint.key(),
                    format!("value is {} characters, longer than maxLength {}", length, bound),
                ));
            }
        }
        (Constraint::Minimum(bound), ArgumentValue::Integer(number)) => {
            if number < bound {
                violations.push(ConstraintViolation::constraint(
                    index,
                    constraint.key(),
                    format!("value {} is below minimum {}", number, bound),
                ));
            }
        }
        (Constraint::Maximum(bound), ArgumentValue::Integer(number)) => {
            if number > bound {
                violations.push(ConstraintViolation::constraint(
                    index,
                    constraint.key(),
                    format!("value {} is above maximum {}", number, bound),
                ));
            }
        }
        (Constraint::MinItems(bound), ArgumentValue::Array(items)) => {
            if items.len() < *bound {
                violations.push(ConstraintViolation::constraint(
                    index,
                    constraint.key(),
                    format!("array has {} items, fewer than minItems {}", items.len(), bound),
                ));
            }
        }
        (Constraint::MaxItems(bound), ArgumentValue::Array(items)) => {
            if items.len() > *bound {
                violations.push(ConstraintViolation::constraint(
                    index,
                    constraint.key(),
                    format!("array has {} items, more than maxItems {}", items.len(), bound),
                ));
            }
        }
        (Constraint::UniqueItems(true), ArgumentValue::Array(items)) => {
            if let Some(duplicate) = first_duplicate(items) {
                violations.push(ConstraintViolation::constraint(
                    index,
                    constraint.key(),
                    format!("array contains duplicate element {}", duplicate),
                ));
            }
        }
        // uniqueItems=false, plus combinations the definition validator
        // already ruled out for a well-formed schema.
        _ => {}
    }
}

fn first_duplicate(items: &[serde_json::Value]) -> Option<&serde_json::Value> {
    for (position, item) in items.iter().enumerate() {
        if items[..position].contains(item) {
            return Some(item);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use coordinator_protocol::model::{LbMode, Method, ParameterType};
    use std::collections::BTreeSet;

    fn definition(parameters: Vec<Parameter>) -> ServiceDefinition {
        let mut methods = BTreeSet::new();
        methods.insert(Method::Get);
        ServiceDefinition {
            description: "test service".to_string(),
            methods,
            parameters,
            mode: LbMode::RoundRobin,
            dependencies: BTreeSet::new(),
            version: "1.0".to_string(),
            platform_version: "rust-stable".to_string(),
        }
    }

    fn string_parameter(constraints: Vec<Constraint>) -> Parameter {
        Parameter {
            param_type: ParameterType::String,
            description: "test string".to_string(),
            required: true,
            constraints,
        }
    }

    fn violations(error: CoordinatorError) -> Vec<ConstraintViolation> {
        match error {
            CoordinatorError::Validation(violations) => violations,
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_methods_rejected() {
        let mut invalid = definition(vec![]);
        invalid.methods.clear();
        let error = validate_definition(&invalid).unwrap_err();
        assert_eq!(violations(error).len(), 1);
    }

    #[test]
    fn test_constraint_key_must_match_parameter_type() {
        // maximum is an integer constraint; on a string parameter it is illegal.
        let invalid = definition(vec![string_parameter(vec![Constraint::Maximum(5)])]);
        let found = violations(validate_definition(&invalid).unwrap_err());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].constraint.as_deref(), Some("maximum"));
    }

    #[test]
    fn test_duplicate_constraint_keys_rejected() {
        let invalid = definition(vec![string_parameter(vec![
            Constraint::MinLength(1),
            Constraint::MinLength(2),
        ])]);
        let found = violations(validate_definition(&invalid).unwrap_err());
        assert!(found
            .iter()
            .any(|violation| violation.message.contains("duplicate")));
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let invalid = definition(vec![string_parameter(vec![
            Constraint::MinLength(10),
            Constraint::MaxLength(5),
        ])]);
        let found = violations(validate_definition(&invalid).unwrap_err());
        assert!(found[0].message.contains("exceeds"));
    }

    #[test]
    fn test_all_violations_reported_in_one_pass() {
        let invalid = definition(vec![
            string_parameter(vec![Constraint::Maximum(5)]),
            string_parameter(vec![Constraint::MinLength(9), Constraint::MaxLength(2)]),
        ]);
        let found = violations(validate_definition(&invalid).unwrap_err());
        // One illegal key on parameter 0 plus one inverted bound on parameter 1.
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].parameter, Some(0));
        assert_eq!(found[1].parameter, Some(1));
    }

    #[test]
    fn test_string_length_bounds() {
        let parameters = vec![string_parameter(vec![
            Constraint::MinLength(5),
            Constraint::MaxLength(10),
        ])];

        let accepted = vec![Some(ArgumentValue::String("sevench".to_string()))];
        assert!(validate_arguments(&parameters, &accepted).is_ok());

        let too_short = vec![Some(ArgumentValue::String("abc".to_string()))];
        assert!(validate_arguments(&parameters, &too_short).is_err());

        let too_long = vec![Some(ArgumentValue::String(
            "fifteen-letters".to_string(),
        ))];
        assert!(validate_arguments(&parameters, &too_long).is_err());
    }

    #[test]
    fn test_integer_bounds() {
        let parameters = vec![Parameter {
            param_type: ParameterType::Integer,
            description: "test integer".to_string(),
            required: true,
            constraints: vec![Constraint::Minimum(500), Constraint::Maximum(1000)],
        }];

        assert!(validate_arguments(&parameters, &[Some(ArgumentValue::Integer(750))]).is_ok());
        assert!(validate_arguments(&parameters, &[Some(ArgumentValue::Integer(100))]).is_err());
        assert!(validate_arguments(&parameters, &[Some(ArgumentValue::Integer(2000))]).is_err());
    }

    #[test]
    fn test_array_uniqueness() {
        let parameters = vec![Parameter {
            param_type: ParameterType::Array,
            description: "test array".to_string(),
            required: true,
            constraints: vec![Constraint::MaxItems(1000), Constraint::UniqueItems(true)],
        }];

        let unique = vec![Some(ArgumentValue::Array(vec![
            serde_json::json!(1),
            serde_json::json!(2),
        ]))];
        assert!(validate_arguments(&parameters, &unique).is_ok());

        let duplicated = vec![Some(ArgumentValue::Array(vec![
            serde_json::json!(1),
            serde_json::json!(1),
        ]))];
        let found = violations(validate_arguments(&parameters, &duplicated).unwrap_err());
        assert_eq!(found[0].constraint.as_deref(), Some("uniqueItems"));
    }

    #[test]
    fn test_required_argument_must_be_present() {
        let parameters = vec![string_parameter(vec![])];

        assert!(validate_arguments(&parameters, &[None]).is_err());
        assert!(validate_arguments(&parameters, &[]).is_err());

        let mut optional = string_parameter(vec![]);
        optional.required = false;
        assert!(validate_arguments(&[optional], &[None]).is_ok());
    }

    #[test]
    fn test_wrong_shape_reported_once() {
        let parameters = vec![string_parameter(vec![Constraint::MinLength(5)])];
        let wrong = vec![Some(ArgumentValue::Integer(3))];
        let found = violations(validate_arguments(&parameters, &wrong).unwrap_err());
        // Shape mismatch short-circuits the per-constraint checks for that value.
        assert_eq!(found.len(), 1);
        assert!(found[0].message.contains("expected a string"));
    }
}
