use std::time::Duration;

use fake::{Fake, Faker};
use interop_shims::{
    cli::{Output, Plan, Role, ShimArgs},
    ShimOptions, SpoolBroker,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn options(root: &std::path::Path) -> ShimOptions {
    ShimOptions::default()
        .spool_root(root)
        .timeout(Duration::from_millis(300))
        .poll_interval(Duration::from_millis(5))
}

fn args(queue: &str, message_type: &str, parameters: &str) -> ShimArgs {
    ShimArgs {
        broker: "localhost:5672".to_owned(),
        queue: queue.to_owned(),
        message_type: message_type.to_owned(),
        parameters: parameters.to_owned(),
    }
}

async fn run(role: Role, args: &ShimArgs, options: &ShimOptions) -> Output {
    // a fresh broker per run, as separate processes would have
    let broker = SpoolBroker::new(&args.broker, options).unwrap();
    Plan::new(role, args)
        .unwrap()
        .execute(&broker, &args.queue, options)
        .await
        .unwrap()
}

#[tokio::test]
async fn sender_and_receiver_meet_through_the_spool() {
    let root = tempfile::tempdir().unwrap();
    let options = options(root.path());
    let queue: String = Faker.fake();

    let sent = run(
        Role::JmsSender,
        &args(
            &queue,
            "JMS_MAPMESSAGE_TYPE",
            r#"[{"int": ["0x1", "-0x1"], "float": ["0x7fc00000"]},
                {"JMS_TYPE_HEADER": {"string": "spool"}},
                {"prop_long_big": {"long": "0x7fffffffffffffff"}}]"#,
        ),
        &options,
    )
    .await;
    assert_eq!(Output::Silent, sent);

    let received = run(
        Role::JmsReceiver,
        &args(&queue, "JMS_MAPMESSAGE_TYPE", r#"[{"int": 2, "float": 1}, {}]"#),
        &options,
    )
    .await;
    assert_eq!(
        Output::Result(
            "JMS_MAPMESSAGE_TYPE".to_owned(),
            json!([
                {"float": ["0x7fc00000"], "int": ["0x1", "-0x1"]},
                {"JMS_TYPE_HEADER": {"string": "spool"}},
                {"prop_long_big": {"long": "0x7fffffffffffffff"}}
            ])
        ),
        received
    );
}

#[tokio::test]
async fn amqp_shims_print_the_type_and_values() {
    let root = tempfile::tempdir().unwrap();
    let options = options(root.path());
    let queue: String = Faker.fake();

    run(
        Role::AmqpSender,
        &args(&queue, "timestamp", r#"["0x0000000000000001", "0x00000000ffffffff"]"#),
        &options,
    )
    .await;
    let received = run(Role::AmqpReceiver, &args(&queue, "timestamp", "2"), &options).await;
    assert_eq!(
        Output::Result(
            "timestamp".to_owned(),
            json!(["0x0000000000000001", "0x00000000ffffffff"])
        ),
        received
    );
}

#[tokio::test]
async fn receiver_times_out_on_an_empty_spool() {
    let root = tempfile::tempdir().unwrap();
    let options = options(root.path());
    let args = args("empty", "JMS_TEXTMESSAGE_TYPE", r#"[{"text": 1}, {}]"#);
    let broker = SpoolBroker::new(&args.broker, &options).unwrap();

    let outcome = Plan::new(Role::JmsReceiver, &args)
        .unwrap()
        .execute(&broker, &args.queue, &options)
        .await;
    assert!(matches!(
        outcome,
        Err(interop_shims::error::ShimError::ProtocolTimeout { .. })
    ));
}
