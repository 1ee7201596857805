use anyhow::Result;
use clap::Parser;
use coordinator_protocol::model::{
    ArgumentValue, Constraint, Endpoint, LbMode, Method, Parameter, ParameterType,
    ServiceDefinition,
};
use dispatch_coordinator::notify::LogTransport;
use dispatch_coordinator::{CoordinatorConfig, DispatchCoordinator};
use log::info;
use std::collections::BTreeSet;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "coordinator-demo")]
#[command(about = "In-process walkthrough of the dispatch coordinator")]
struct Cli {
    /// Number of instances to register
    #[arg(short, long, default_value_t = 3)]
    instances: u16,

    /// Number of dispatch selections to run
    #[arg(short, long, default_value_t = 9)]
    dispatches: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    info!("=== Dispatch Coordinator Demo ===");
    let coordinator =
        DispatchCoordinator::new(CoordinatorConfig::default(), Arc::new(LogTransport));
    let catalog = coordinator.catalog();

    let record = catalog.create(demo_definition())?;
    info!("Created service '{}'", record.id);

    for offset in 0..cli.instances {
        catalog.register(
            &record.id,
            Endpoint {
                ip: "127.0.0.1".to_string(),
                port: 9000 + offset,
                api: "/invoke".to_string(),
            },
        )?;
    }
    info!("Registered {} instances", cli.instances);

    let subscription = catalog.subscribe(
        &record.id,
        serde_json::json!({"url": "http://localhost:9999/hook"}),
    )?;
    info!("Subscribed with token {}", subscription.token);

    for round in 0..cli.dispatches {
        let endpoint = catalog.dispatch(&record.id, &demo_arguments())?;
        info!(
            "Dispatch {} -> {}:{}{}",
            round, endpoint.ip, endpoint.port, endpoint.api
        );
    }

    catalog.unsubscribe(&record.id, &subscription.token)?;
    for offset in 0..cli.instances {
        catalog.deregister(&record.id, "127.0.0.1", 9000 + offset)?;
    }
    catalog.delete(&record.id)?;
    info!("Service '{}' deleted", record.id);

    coordinator.shutdown().await;
    Ok(())
}

fn demo_definition() -> ServiceDefinition {
    ServiceDefinition {
        description: "demo echo service".to_string(),
        methods: BTreeSet::from([Method::Get, Method::Post]),
        parameters: vec![
            Parameter {
                param_type: ParameterType::String,
                description: "payload label".to_string(),
                required: false,
                constraints: vec![Constraint::MinLength(5), Constraint::MaxLength(10)],
            },
            Parameter {
                param_type: ParameterType::Integer,
                description: "batch size".to_string(),
                required: true,
                constraints: vec![Constraint::Minimum(500), Constraint::Maximum(1000)],
            },
        ],
        mode: LbMode::RoundRobin,
        dependencies: BTreeSet::new(),
        version: "1.0".to_string(),
        platform_version: "rust-stable".to_string(),
    }
}

fn demo_arguments() -> Vec<Option<ArgumentValue>> {
    vec![
        Some(ArgumentValue::String("demo-run".to_string())),
        Some(ArgumentValue::Integer(750)),
    ]
}
