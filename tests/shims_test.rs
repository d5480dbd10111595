use interop_shims::{
    codec::{self, NativeValue},
    driver,
    error::ShimError,
    types::{ReceiveRequest, SendRequest},
    Channel, Connector, MessageShape, Subtype,
};
use interop_shims_protocol::{
    jms::{JmsMessageType, JMS_MSG_TYPE},
    message::{List, Message, SimpleValue, Value},
};
use pretty_assertions::assert_eq;
use serde_json::json;

mod common;

use common::{TestBroker, RECEIVE_TIMEOUT};

#[tokio::test]
async fn map_values_keep_order_and_sign() {
    let test = TestBroker::create();
    let report = test
        .round_trip(
            MessageShape::OrderedMap,
            r#"[{"int": ["0x1", "-0x1"]}, {}, {}]"#,
            r#"[{"int": 2}, {}]"#,
        )
        .await;

    assert_eq!(json!([{"int": ["0x1", "-0x1"]}, {}, {}]), report.to_json());
    assert_eq!(0, test.pending().await);
}

#[tokio::test]
async fn legacy_parameters_report_values_only() {
    let test = TestBroker::create();
    let report = test
        .round_trip(
            MessageShape::Stream,
            r#"{"boolean": ["True", "False"], "double": ["0x3ff0000000000000"]}"#,
            r#"{"boolean": 2, "double": 1}"#,
        )
        .await;

    assert_eq!(
        json!({"boolean": ["True", "False"], "double": ["0x3ff0000000000000"]}),
        report.to_json()
    );
}

#[tokio::test]
async fn keys_travel_in_sorted_order() {
    let test = TestBroker::create();
    let sent = test
        .send(
            MessageShape::Stream,
            r#"{"string": ["last"], "int": ["0x7fffffff"]}"#,
        )
        .await
        .unwrap();
    assert_eq!(2, sent);

    let mut channel = test.broker.connect(&test.queue).await.unwrap();
    let first = channel.receive(RECEIVE_TIMEOUT).await.unwrap().unwrap();
    let second = channel.receive(RECEIVE_TIMEOUT).await.unwrap().unwrap();
    assert_eq!(
        Some(&Value::Simple(SimpleValue::Int(i32::MAX))),
        first.sequence().unwrap().iter().next()
    );
    assert_eq!(
        Some(&Value::from("last")),
        second.sequence().unwrap().iter().next()
    );
    assert_eq!(
        Some(JmsMessageType::Stream),
        first
            .annotation(JMS_MSG_TYPE)
            .and_then(JmsMessageType::from_annotation)
    );
}

#[tokio::test]
async fn non_alphanumeric_char_survives_as_base64() {
    let test = TestBroker::create();
    let report = test
        .round_trip(
            MessageShape::OrderedMap,
            r#"{"char": ["\\xFFFF", "a"]}"#,
            r#"{"char": 2}"#,
        )
        .await;

    let received = report.values("char").unwrap();
    assert_eq!(json!("//8="), received[0]);
    assert_eq!(json!("a"), received[1]);
    assert_eq!(
        codec::decode(Subtype::Char, "\\xFFFF").unwrap(),
        codec::decode(Subtype::Char, "//8=").unwrap()
    );
}

#[tokio::test]
async fn missing_message_is_a_protocol_timeout() {
    let test = TestBroker::create();
    test.send(MessageShape::RawBytes, r#"{"long": ["0x1", "-0x8000000000000000"]}"#)
        .await
        .unwrap();

    let err = test
        .receive(MessageShape::RawBytes, r#"[{"long": 3}, {}]"#)
        .await
        .unwrap_err();
    match err {
        ShimError::ProtocolTimeout {
            subtype,
            expected,
            received,
        } => {
            assert_eq!("long", subtype);
            assert_eq!(3, expected);
            assert_eq!(2, received);
        }
        other => panic!("unexpected error {:?}", other),
    }
    // the sender's and the failed receiver's channels
    assert_eq!(2, test.broker.closed_channels().await);
}

#[tokio::test]
async fn headers_and_properties_are_reported() {
    let test = TestBroker::create();
    test.send(
        MessageShape::Text,
        r#"[{"text": ["hello", "world"]},
            {"JMS_TYPE_HEADER": {"string": "greeting"},
             "JMS_CORRELATIONID_HEADER": {"bytes": "AQID"},
             "JMS_REPLYTO_HEADER": {"temp_queue": ""}},
            {"prop_float_pi": {"float": "0x40490fdb"},
             "prop_boolean_on": {"boolean": "True"}}]"#,
    )
    .await
    .unwrap();

    let report = test
        .receive(
            MessageShape::Text,
            r#"[{"text": 2},
                {"JMS_CORRELATIONID_AS_BYTES": true, "JMS_CLIENT_CHECKS": true}]"#,
        )
        .await
        .unwrap();

    assert_eq!(
        Some(&[json!("hello"), json!("world")][..]),
        report.values("text")
    );
    assert_eq!(Some(("string", "greeting")), report.header("JMS_TYPE_HEADER"));
    assert_eq!(Some(("bytes", "AQID")), report.header("JMS_CORRELATIONID_HEADER"));
    let (kind, name) = report.header("JMS_REPLYTO_HEADER").unwrap();
    assert_eq!("queue", kind);
    assert!(name.starts_with("temp-queue-"));
    assert_eq!(Some(("float", "0x40490fdb")), report.property("prop_float_pi"));
    assert_eq!(Some(("boolean", "True")), report.property("prop_boolean_on"));

    let destinations = test.broker.destinations().await;
    assert_eq!(1, destinations.len());
    assert_eq!(name, destinations[0].name());
}

#[tokio::test]
async fn reply_to_reported_as_topic_when_asked() {
    let test = TestBroker::create();
    test.send(
        MessageShape::Plain,
        r#"[{"none": [""]}, {"JMS_REPLYTO_HEADER": {"topic": "replies"}}, {}]"#,
    )
    .await
    .unwrap();

    let report = test
        .receive(
            MessageShape::Plain,
            r#"[{"none": 1}, {"JMS_REPLYTO_AS_TOPIC": true}]"#,
        )
        .await
        .unwrap();
    assert_eq!(
        json!([{"none": [null]}, {"JMS_REPLYTO_HEADER": {"topic": "replies"}}, {}]),
        report.to_json()
    );
}

#[tokio::test]
async fn object_messages_by_type_name_and_by_prefix() {
    let test = TestBroker::create();
    let report = test
        .round_trip(
            MessageShape::SingleObject,
            r#"{"java.lang.Integer": ["-12"], "object": ["java.lang.Character:\\x41"]}"#,
            r#"{"java.lang.Integer": 1, "object": 1}"#,
        )
        .await;

    assert_eq!(
        json!({"java.lang.Integer": ["-12"], "object": ["java.lang.Character:A"]}),
        report.to_json()
    );
}

#[tokio::test]
async fn empty_bytes_survive_both_byte_shapes() {
    let test = TestBroker::create();
    let report = test
        .round_trip(
            MessageShape::RawBytes,
            r#"{"bytes": ["", "AAEC"]}"#,
            r#"{"bytes": 2}"#,
        )
        .await;
    assert_eq!(json!({"bytes": ["", "AAEC"]}), report.to_json());

    let report = test
        .round_trip(
            MessageShape::Stream,
            r#"{"bytes": ["", "AAEC"]}"#,
            r#"{"bytes": 2}"#,
        )
        .await;
    assert_eq!(json!({"bytes": ["", "AAEC"]}), report.to_json());
}

#[tokio::test]
async fn wrong_shape_is_rejected() {
    let test = TestBroker::create();
    test.send(MessageShape::OrderedMap, r#"{"short": ["0x1"]}"#)
        .await
        .unwrap();

    assert!(matches!(
        test.receive(MessageShape::Stream, r#"{"short": 1}"#).await,
        Err(ShimError::UnexpectedShape { .. })
    ));
}

#[tokio::test]
async fn unsupported_subtype_for_shape() {
    let test = TestBroker::create();
    assert!(matches!(
        test.send(MessageShape::OrderedMap, r#"{"ulong": ["0x1"]}"#).await,
        Err(ShimError::UnsupportedSubtype { .. })
    ));
    assert_eq!(0, test.pending().await);
    assert_eq!(1, test.broker.closed_channels().await);
}

#[tokio::test]
async fn broker_disconnect_is_fatal() {
    let test = TestBroker::create();
    test.send(MessageShape::Stream, r#"{"int": ["0x1"]}"#)
        .await
        .unwrap();

    let mut channel = test.broker.connect(&test.queue).await.unwrap();
    test.broker.disconnect().await;
    let request = ReceiveRequest::parse(r#"{"int": 1}"#).unwrap();
    assert!(matches!(
        driver::receive_batch(&mut channel, MessageShape::Stream, &request, RECEIVE_TIMEOUT).await,
        Err(ShimError::Connection(_))
    ));
}

#[tokio::test]
async fn strict_checks_reject_foreign_messages() {
    let test = TestBroker::create();
    let mut channel = test.broker.connect(&test.queue).await.unwrap();
    let message = Message::builder()
        .value("unstamped")
        .build();
    channel.send(message).await.unwrap();

    let err = test
        .receive(
            MessageShape::Text,
            r#"[{"text": 1}, {"JMS_CLIENT_CHECKS": true}]"#,
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ShimError::HeaderValidation { header, .. } if header == "JMS_DESTINATION"
    ));
}

#[tokio::test]
async fn empty_value_lists_send_nothing() {
    let test = TestBroker::create();
    let request = SendRequest::parse(r#"[{"int": [], "string": []}, {}, {}]"#).unwrap();
    let sent = driver::run_sender(&test.broker, &test.queue, MessageShape::Stream, &request)
        .await
        .unwrap();
    assert_eq!(0, sent);

    let report = test
        .receive(MessageShape::Stream, r#"[{"int": 0, "string": 0}, {}]"#)
        .await
        .unwrap();
    assert_eq!(json!([{"int": [], "string": []}, {}, {}]), report.to_json());
}

#[tokio::test]
async fn amqp_types_round_trip() {
    let test = TestBroker::create();
    let cases: Vec<(Subtype, Vec<&str>)> = vec![
        (Subtype::Null, vec!["None"]),
        (Subtype::Ubyte, vec!["0xff", "0x0"]),
        (Subtype::Ulong, vec!["0xffffffffffffffff"]),
        (Subtype::Timestamp, vec!["0x0000018a4f1c2e00"]),
        (Subtype::Uuid, vec!["6ba7b810-9dad-11d1-80b4-00c04fd430c8"]),
        (Subtype::Decimal32, vec!["0x22500000"]),
        (Subtype::Symbol, vec!["amqp:sym"]),
        (Subtype::String, vec!["héllo"]),
    ];

    for (subtype, values) in cases {
        let values: Vec<String> = values.into_iter().map(str::to_owned).collect();
        driver::run_amqp_sender(&test.broker, &test.queue, subtype, &values)
            .await
            .unwrap();
        let received = driver::run_amqp_receiver(
            &test.broker,
            &test.queue,
            subtype,
            values.len(),
            RECEIVE_TIMEOUT,
        )
        .await
        .unwrap();
        assert_eq!(values, received, "{}", subtype);
    }
}

#[tokio::test]
async fn amqp_ulong_accepts_decimal_input() {
    let test = TestBroker::create();
    driver::run_amqp_sender(
        &test.broker,
        &test.queue,
        Subtype::Ulong,
        &["18446744073709551615".to_owned()],
    )
    .await
    .unwrap();
    let received =
        driver::run_amqp_receiver(&test.broker, &test.queue, Subtype::Ulong, 1, RECEIVE_TIMEOUT)
            .await
            .unwrap();
    assert_eq!(vec!["0xffffffffffffffff".to_owned()], received);
    assert_eq!(
        NativeValue::Ulong(u64::MAX),
        codec::decode(Subtype::Ulong, &received[0]).unwrap()
    );
}

#[tokio::test]
async fn missing_stream_bytes_report_the_sentinel() {
    let test = TestBroker::create();
    let mut channel = test.broker.connect(&test.queue).await.unwrap();
    let mut with_null = List::new();
    with_null.push(Value::null());
    for elements in vec![with_null, List::new()] {
        let message = Message::builder()
            .sequence(elements)
            .message_annotations()
            .insert(JMS_MSG_TYPE, JmsMessageType::Stream)
            .message_builder()
            .build();
        channel.send(message).await.unwrap();
    }

    let report = test
        .receive(MessageShape::Stream, r#"{"bytes": 2}"#)
        .await
        .unwrap();
    assert_eq!(
        json!({"bytes": ["<bytes error>", "<bytes error>"]}),
        report.to_json()
    );
}

#[tokio::test]
async fn bad_value_later_in_the_batch_sends_nothing() {
    let test = TestBroker::create();
    let err = test
        .send(
            MessageShape::Stream,
            r#"{"int": ["0x1", "0x2"], "short": ["0x1ffff"]}"#,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ShimError::MalformedValue { .. }));
    assert_eq!(0, test.pending().await);

    let err = driver::run_amqp_sender(
        &test.broker,
        &test.queue,
        Subtype::Int,
        &["0x1".to_owned(), "not a number".to_owned()],
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ShimError::MalformedValue { .. }));
    assert_eq!(0, test.pending().await);
}

#[tokio::test]
async fn huge_amqp_count_times_out_and_closes() {
    let test = TestBroker::create();
    let err = driver::run_amqp_receiver(
        &test.broker,
        &test.queue,
        Subtype::Int,
        usize::MAX,
        RECEIVE_TIMEOUT,
    )
    .await
    .unwrap_err();
    match err {
        ShimError::ProtocolTimeout {
            expected, received, ..
        } => {
            assert_eq!(usize::MAX, expected);
            assert_eq!(0, received);
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(1, test.broker.closed_channels().await);
}
