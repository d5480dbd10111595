//! Command line front-ends shared by the shim binaries.
//!
//! Stdout carries the result protocol only: the message type token on one
//! line, then a single JSON document. Logs go to stderr.
use std::{process::ExitCode, str::FromStr};

use clap::{error::ErrorKind, Parser};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::{
    channel::{Connector, SpoolBroker},
    driver,
    error::ShimError,
    options::ShimOptions,
    shape::MessageShape,
    subtype::Subtype,
    vector::{ReceiveRequest, SendRequest},
    ShimResult,
};

/// Positional arguments every shim takes
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(version, about = None)]
pub struct ShimArgs {
    /// Broker address, e.g. localhost:5672
    pub broker: String,
    /// Queue to send to or receive from
    pub queue: String,
    /// JMS message type token, or AMQP type name for the AMQP shims
    pub message_type: String,
    /// JSON test parameters; a message count for the AMQP receiver
    pub parameters: String,
}

/// Which shim a binary is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    JmsSender,
    JmsReceiver,
    AmqpSender,
    AmqpReceiver,
}

/// Validated work of one run, built before anything connects
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    JmsSend(MessageShape, SendRequest),
    JmsReceive(MessageShape, ReceiveRequest),
    AmqpSend(Subtype, Vec<String>),
    AmqpReceive(Subtype, usize),
}

impl Plan {
    pub fn new(role: Role, args: &ShimArgs) -> ShimResult<Plan> {
        let plan = match role {
            Role::JmsSender => {
                let shape = MessageShape::from_str(&args.message_type)?;
                let request = SendRequest::parse(&args.parameters)?;
                driver::prepare_batch(shape, &request)?;
                Plan::JmsSend(shape, request)
            }
            Role::JmsReceiver => Plan::JmsReceive(
                MessageShape::from_str(&args.message_type)?,
                ReceiveRequest::parse(&args.parameters)?,
            ),
            Role::AmqpSender => {
                let subtype = amqp_subtype(&args.message_type)?;
                let values: Vec<String> = serde_json::from_str(&args.parameters)?;
                driver::prepare_amqp_values(subtype, &values)?;
                Plan::AmqpSend(subtype, values)
            }
            Role::AmqpReceiver => {
                let subtype = amqp_subtype(&args.message_type)?;
                let count = args.parameters.trim().parse().map_err(|err| {
                    ShimError::Argument(format!(
                        "message count \"{}\": {}",
                        args.parameters, err
                    ))
                })?;
                Plan::AmqpReceive(subtype, count)
            }
        };
        Ok(plan)
    }

    /// Executes the plan against `connector` and returns what to print.
    pub async fn execute<K>(
        &self,
        connector: &K,
        queue: &str,
        options: &ShimOptions,
    ) -> ShimResult<Output>
    where
        K: Connector,
    {
        let output = match self {
            Plan::JmsSend(shape, request) => {
                driver::run_sender(connector, queue, *shape, request).await?;
                Output::Silent
            }
            Plan::JmsReceive(shape, request) => {
                let report =
                    driver::run_receiver(connector, queue, *shape, request, options.get_timeout())
                        .await?;
                Output::Result(shape.token().to_owned(), report.to_json())
            }
            Plan::AmqpSend(subtype, values) => {
                driver::run_amqp_sender(connector, queue, *subtype, values).await?;
                Output::Silent
            }
            Plan::AmqpReceive(subtype, count) => {
                let values = driver::run_amqp_receiver(
                    connector,
                    queue,
                    *subtype,
                    *count,
                    options.get_timeout(),
                )
                .await?;
                Output::Result(subtype.to_string(), serde_json::to_value(values)?)
            }
        };
        Ok(output)
    }
}

/// What a finished run prints on stdout
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Silent,
    Result(String, serde_json::Value),
}

fn amqp_subtype(name: &str) -> ShimResult<Subtype> {
    let subtype = Subtype::from_str(name)?;
    driver::amqp_column(subtype)?;
    Ok(subtype)
}

/// Installs the stderr subscriber, filtered by `RUST_LOG` and `warn` by
/// default.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("a tracing subscriber is already installed");
    }
}

fn run(role: Role, args: ShimArgs) -> ShimResult<Output> {
    let plan = Plan::new(role, &args)?;
    let options = ShimOptions::from_env()?;
    let connector = SpoolBroker::new(&args.broker, &options)?;
    info!("{:?} on {} using {}", role, args.queue, connector.directory().display());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(plan.execute(&connector, &args.queue, &options))
}

/// Entry point of a shim binary.
pub fn main(role: Role) -> ExitCode {
    let args = match ShimArgs::try_parse() {
        Ok(args) => args,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
    };
    init_logging();

    match run(role, args) {
        Ok(Output::Silent) => ExitCode::SUCCESS,
        Ok(Output::Result(token, json)) => {
            println!("{}", token);
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{:?} failed: {}", role, err);
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
