/* Materializer tests: fixtures against message definitions at specific versions */

use msgdef_gen::codegen::generate_unit;
use msgdef_gen::codegen::rust::{rust_field_name, RustBackend};
use msgdef_gen::StructRegistry;
use msgdef_reflect::{materialize_fixture, Instance, RawTaggedField, ReflectError, Value};
use msgdef_types::{load_message_spec, MessageSpec, SchemaError};
use serde_json::json;
use uuid::Uuid;

const FOO_REQUEST: &str = r#"{
  "apiKey": 1000,
  "type": "request",
  "name": "FooRequest",
  "validVersions": "0-2",
  "flexibleVersions": "2+",
  "fields": [
    { "name": "bar", "type": "int32", "versions": "0+" },
    { "name": "baz", "type": "int32", "versions": "1+", "taggedVersions": "2+", "tag": 0 }
  ]
}"#;

fn load(schema: &str) -> MessageSpec {
    load_message_spec(schema).expect("schema should load")
}

fn materialize(schema: &str, version: i16, fixture: serde_json::Value) -> Result<Instance, ReflectError> {
    materialize_fixture(&load(schema), version, &fixture)
}

#[test]
fn foo_request_end_to_end() {
    let spec = load(FOO_REQUEST);
    let registry = StructRegistry::for_message(&spec).unwrap();
    let backend = RustBackend::default();

    let v0 = generate_unit(&backend, &spec, &registry, 0).unwrap();
    assert!(v0.contains("pub struct FooRequest {\n    pub bar: i32,\n}"));
    let v2 = generate_unit(&backend, &spec, &registry, 2).unwrap();
    assert!(v2.contains("    pub bar: i32,\n"));
    assert!(v2.contains("    pub baz: i32,\n"));

    let fixture = json!({ "bar": 5, "baz": null });
    let instance = materialize_fixture(&spec, 2, &fixture).unwrap();
    assert_eq!(instance.get("bar"), Some(&Value::Int32(5)));
    assert_eq!(instance.get("baz"), Some(&Value::Int32(0)));

    match materialize_fixture(&spec, 1, &fixture) {
        Err(ReflectError::Value { field, version, .. }) => {
            assert_eq!(field, "baz");
            assert_eq!(version, 1);
        }
        other => panic!("expected a value error, got {:?}", other),
    }
}

#[test]
fn materialized_fields_match_emitted_fields() {
    let schema = r#"{
      "name": "OffsetCommitRequest", "type": "request", "validVersions": "0-3",
      "fields": [
        { "name": "GroupId", "type": "string", "versions": "0+" },
        { "name": "GenerationId", "type": "int32", "versions": "1+" },
        { "name": "RetentionTimeMs", "type": "int64", "versions": "2-2" },
        { "name": "Topics", "type": "[]OffsetCommitTopic", "versions": "0+", "fields": [
          { "name": "Name", "type": "string", "versions": "0+" } ] }
      ]
    }"#;
    let spec = load(schema);
    let registry = StructRegistry::for_message(&spec).unwrap();

    for version in spec.valid_versions.iter() {
        let instance = materialize_fixture(&spec, version, &json!({})).unwrap();
        let unit = generate_unit(&RustBackend::default(), &spec, &registry, version).unwrap();
        let emitted: Vec<String> = unit
            .lines()
            .skip_while(|line| !line.starts_with("pub struct OffsetCommitRequest"))
            .skip(1)
            .take_while(|line| *line != "}")
            .filter_map(|line| line.strip_prefix("    pub "))
            .map(|line| line.split(':').next().unwrap_or_default().to_string())
            .collect();
        let materialized: Vec<String> = instance.field_names().into_iter().map(rust_field_name).collect();
        assert_eq!(materialized, emitted, "version {}", version);
    }
}

#[test]
fn timeout_alias_round_trip() {
    let schema = r#"{
      "name": "CreateTopicsRequest", "type": "request", "validVersions": "0-1",
      "fields": [ { "name": "timeout_ms", "type": "int32", "versions": "0+" } ]
    }"#;
    let short = materialize(schema, 1, json!({ "timeout": 30 })).unwrap();
    let long = materialize(schema, 1, json!({ "timeout_ms": 30 })).unwrap();
    assert_eq!(short, long);
    assert_eq!(short.get("timeout_ms"), Some(&Value::Int32(30)));
}

#[test]
fn snake_case_keys_reach_pascal_case_fields() {
    let schema = r#"{
      "name": "BrokerRegistrationRequest", "type": "request", "validVersions": "0-1",
      "fields": [
        { "name": "BrokerId", "type": "int32", "versions": "0+" },
        { "name": "IsKRaftController", "type": "bool", "versions": "0+" },
        { "name": "SessionTimeoutMs", "type": "int32", "versions": "0+" },
        { "name": "IssueTimestamp", "type": "int64", "versions": "1+" }
      ]
    }"#;
    let instance = materialize(
        schema,
        1,
        json!({
            "broker_id": 3,
            "is_kraft_controller": true,
            "session_timeout": 500,
            "issue_timestamp": 1700000000000i64
        }),
    )
    .unwrap();
    assert_eq!(instance.get("BrokerId"), Some(&Value::Int32(3)));
    assert_eq!(instance.get("IsKRaftController"), Some(&Value::Bool(true)));
    assert_eq!(instance.get("SessionTimeoutMs"), Some(&Value::Int32(500)));
    assert_eq!(instance.get("IssueTimestamp"), Some(&Value::Int64(1_700_000_000_000)));

    assert!(matches!(
        materialize(schema, 1, json!({ "controller_epoch": 1 })),
        Err(ReflectError::Naming { .. })
    ));
}

#[test]
fn alias_table_resolves_camel_case_declarations() {
    let schema = r#"{
      "name": "SyncGroupRequest", "type": "request", "validVersions": "0",
      "fields": [
        { "name": "groupId", "type": "string", "versions": "0+" },
        { "name": "memberAssignment", "type": "bytes", "versions": "0+" }
      ]
    }"#;
    let instance = materialize(schema, 0, json!({ "group_id": "g1", "member_assignment": "0a0b" })).unwrap();
    assert_eq!(instance.get("groupId"), Some(&Value::String("g1".to_string())));
    assert_eq!(instance.get("memberAssignment"), Some(&Value::Bytes(vec![0x0a, 0x0b])));
}

#[test]
fn unknown_tagged_fields_bypass_dispatch() {
    let instance = materialize(FOO_REQUEST, 2, json!({ "_unknown_tagged_fields": [[5, "ff00"]] })).unwrap();
    assert_eq!(
        instance.unknown_tagged_fields,
        vec![RawTaggedField {
            tag: 5,
            data: vec![0xff, 0x00]
        }]
    );
    /* Declared fields keep their defaults */
    assert_eq!(instance.get("bar"), Some(&Value::Int32(0)));
    assert_eq!(instance.get("baz"), Some(&Value::Int32(0)));

    let err = materialize(FOO_REQUEST, 2, json!({ "_unknown_tagged_fields": { "5": "ff00" } })).unwrap_err();
    assert!(matches!(
        err,
        ReflectError::Schema(SchemaError::MalformedTaggedFields { .. })
    ));
}

#[test]
fn unknown_tagged_fields_accepted_without_flexible_versions() {
    let schema = r#"{
      "name": "FooRequest", "validVersions": "0-2",
      "fields": [
        { "name": "bar", "type": "int32", "versions": "0+" },
        { "name": "baz", "type": "int32", "versions": "1+", "taggedVersions": "2+", "tag": 0 }
      ]
    }"#;
    for version in 0..=2 {
        let instance = materialize(schema, version, json!({ "_unknown_tagged_fields": [[5, "ff00"]] })).unwrap();
        assert_eq!(
            instance.unknown_tagged_fields,
            vec![RawTaggedField {
                tag: 5,
                data: vec![0xff, 0x00]
            }],
            "version {}",
            version
        );
        assert_eq!(instance.get("bar"), Some(&Value::Int32(0)));
    }

    let instance = materialize(schema, 1, json!({ "_unknown_tagged_fields": [] })).unwrap();
    assert!(instance.unknown_tagged_fields.is_empty());

    assert!(matches!(
        materialize(schema, 0, json!({ "_unknown_tagged_fields": "ff00" })),
        Err(ReflectError::Schema(SchemaError::MalformedTaggedFields { .. }))
    ));
}

#[test]
fn fields_outside_the_version_are_rejected() {
    let err = materialize(FOO_REQUEST, 0, json!({ "bar": 1, "baz": 2 })).unwrap_err();
    assert!(matches!(err, ReflectError::Value { ref field, .. } if field == "baz"));
}

#[test]
fn null_handling_per_kind() {
    let schema = r#"{
      "name": "DescribeClusterResponse", "type": "response", "validVersions": "0-1",
      "fields": [
        { "name": "ClusterId", "type": "string", "versions": "0+" },
        { "name": "ClusterUuid", "type": "uuid", "versions": "0+" },
        { "name": "Payload", "type": "bytes", "versions": "0+" },
        { "name": "Controller", "type": "Broker", "versions": "0+", "fields": [
          { "name": "Host", "type": "string", "versions": "0+" } ] },
        { "name": "Brokers", "type": "[]int32", "versions": "0+" },
        { "name": "ThrottleTimeMs", "type": "int32", "versions": "0+" }
      ]
    }"#;

    let instance = materialize(
        schema,
        1,
        json!({
            "cluster_id": null,
            "cluster_uuid": null,
            "payload": null,
            "controller": null,
            "brokers": null
        }),
    )
    .unwrap();
    assert_eq!(instance.get("ClusterId"), Some(&Value::Null));
    assert_eq!(instance.get("ClusterUuid"), Some(&Value::Uuid(Uuid::nil())));
    assert_eq!(instance.get("Payload"), Some(&Value::Null));
    assert_eq!(instance.get("Controller"), Some(&Value::Null));
    assert_eq!(instance.get("Brokers"), Some(&Value::Null));

    let err = materialize(schema, 1, json!({ "throttle_time": null })).unwrap_err();
    assert!(matches!(err, ReflectError::Value { ref field, .. } if field == "ThrottleTimeMs"));
}

#[test]
fn uuid_strings_are_parsed() {
    let schema = r#"{
      "name": "TopicIdData", "validVersions": "0",
      "fields": [ { "name": "TopicId", "type": "uuid", "versions": "0+" } ]
    }"#;
    let id = "0d1b5f2c-8a4e-4b6a-9f3e-2c7d8e9f0a1b";
    let instance = materialize(schema, 0, json!({ "topic_id": id })).unwrap();
    assert_eq!(instance.get("TopicId"), Some(&Value::Uuid(Uuid::parse_str(id).unwrap())));

    assert!(matches!(
        materialize(schema, 0, json!({ "topic_id": "not-a-uuid" })),
        Err(ReflectError::Value { .. })
    ));
}

#[test]
fn integers_are_range_checked() {
    let schema = r#"{
      "name": "WidthsData", "validVersions": "0",
      "fields": [
        { "name": "Small", "type": "int8", "versions": "0+" },
        { "name": "Port", "type": "uint16", "versions": "0+" }
      ]
    }"#;
    assert!(materialize(schema, 0, json!({ "small": 127, "port": 65535 })).is_ok());
    assert!(matches!(
        materialize(schema, 0, json!({ "small": 128 })),
        Err(ReflectError::Value { .. })
    ));
    assert!(matches!(
        materialize(schema, 0, json!({ "port": -1 })),
        Err(ReflectError::Value { .. })
    ));
    assert!(matches!(
        materialize(schema, 0, json!({ "small": "1" })),
        Err(ReflectError::Value { .. })
    ));
}

#[test]
fn nested_and_array_fixtures() {
    let schema = r#"{
      "name": "ProduceRequest", "type": "request", "validVersions": "0-9", "flexibleVersions": "9+",
      "fields": [
        { "name": "Acks", "type": "int16", "versions": "0+" },
        { "name": "TopicData", "type": "[]TopicProduceData", "versions": "0+", "fields": [
          { "name": "Name", "type": "string", "versions": "0+" },
          { "name": "PartitionData", "type": "[]PartitionProduceData", "versions": "0+", "fields": [
            { "name": "Index", "type": "int32", "versions": "0+" },
            { "name": "Records", "type": "records", "versions": "0+", "nullableVersions": "0+" } ] } ] }
      ]
    }"#;

    let instance = materialize(
        schema,
        9,
        json!({
            "acks": -1,
            "topic_data": [
                {
                    "name": "events",
                    "partition_data": [
                        { "index": 0, "records": "00ff" },
                        { "index": 1, "records": null, "_unknown_tagged_fields": [{ "tag": 3, "data": "01" }] }
                    ]
                }
            ]
        }),
    )
    .unwrap();

    assert_eq!(instance.get("Acks"), Some(&Value::Int16(-1)));
    let topics = instance.get("TopicData").and_then(Value::as_array).unwrap();
    assert_eq!(topics.len(), 1);
    let topic = topics[0].as_struct().unwrap();
    assert_eq!(topic.name, "TopicProduceData");
    assert_eq!(topic.get("Name"), Some(&Value::String("events".to_string())));

    let partitions = topic.get("PartitionData").and_then(Value::as_array).unwrap();
    let first = partitions[0].as_struct().unwrap();
    assert_eq!(first.get("Records"), Some(&Value::Records(vec![0x00, 0xff].into())));
    let second = partitions[1].as_struct().unwrap();
    assert_eq!(second.get("Records"), Some(&Value::Null));
    assert_eq!(second.unknown_tagged_fields[0].tag, 3);

    /* Scalar array elements cannot be null */
    let ints = r#"{
      "name": "ReplicasData", "validVersions": "0",
      "fields": [ { "name": "Replicas", "type": "[]int32", "versions": "0+" } ]
    }"#;
    assert!(materialize(ints, 0, json!({ "replicas": [1, 2, 3] })).is_ok());
    assert!(matches!(
        materialize(ints, 0, json!({ "replicas": [1, null] })),
        Err(ReflectError::Value { ref field, .. }) if field == "Replicas[1]"
    ));
}

#[test]
fn defaults_fill_missing_fields() {
    let schema = r#"{
      "name": "FetchRequest", "type": "request", "validVersions": "0-1",
      "fields": [
        { "name": "ReplicaId", "type": "int32", "versions": "0+", "default": "-1" },
        { "name": "MaxBytes", "type": "int32", "versions": "1+", "default": "0x7fffffff" },
        { "name": "RackId", "type": "string", "versions": "1+", "default": "" },
        { "name": "ClusterId", "type": "string", "versions": "1+", "nullableVersions": "1+", "default": "null" },
        { "name": "Isolated", "type": "bool", "versions": "0+", "default": true }
      ]
    }"#;
    let v0 = materialize(schema, 0, json!({})).unwrap();
    assert_eq!(v0.field_names(), vec!["ReplicaId", "Isolated"]);
    assert_eq!(v0.get("ReplicaId"), Some(&Value::Int32(-1)));
    assert_eq!(v0.get("Isolated"), Some(&Value::Bool(true)));

    let v1 = materialize(schema, 1, json!({})).unwrap();
    assert_eq!(v1.get("MaxBytes"), Some(&Value::Int32(i32::MAX)));
    assert_eq!(v1.get("RackId"), Some(&Value::String(String::new())));
    assert_eq!(v1.get("ClusterId"), Some(&Value::Null));
}

#[test]
fn top_level_must_be_an_object() {
    assert!(matches!(
        materialize(FOO_REQUEST, 0, json!(null)),
        Err(ReflectError::Value { .. })
    ));
    assert!(matches!(
        materialize(FOO_REQUEST, 0, json!([1, 2])),
        Err(ReflectError::Value { .. })
    ));
    assert!(matches!(
        materialize(FOO_REQUEST, 5, json!({})),
        Err(ReflectError::Schema(SchemaError::UnsupportedVersion { .. }))
    ));
}

#[test]
fn unsupported_kinds_fail_when_projected() {
    let schema = r#"{
      "name": "OddData", "validVersions": "0-1",
      "fields": [
        { "name": "Plain", "type": "int32", "versions": "0+" },
        { "name": "Ratio", "type": "float32", "versions": "1+" }
      ]
    }"#;
    assert!(materialize(schema, 0, json!({ "plain": 1 })).is_ok());
    assert!(matches!(
        materialize(schema, 1, json!({})),
        Err(ReflectError::UnsupportedType { ref field, .. }) if field == "Ratio"
    ));
}

#[test]
fn instances_serialize_to_json() {
    let instance = materialize(FOO_REQUEST, 2, json!({ "bar": 7, "_unknown_tagged_fields": [[1, "aa"]] })).unwrap();
    let text = serde_json::to_string(&instance).unwrap();
    assert_eq!(text, r#"{"bar":7,"baz":0,"_unknown_tagged_fields":[{"tag":1,"data":"aa"}]}"#);
}

#[test]
fn schema_and_fixture_files_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let schema_path = dir.path().join("FooRequest.json");
    std::fs::write(&schema_path, format!("// FooRequest\n{}", FOO_REQUEST)).unwrap();
    let fixture_path = dir.path().join("foo.json");
    std::fs::write(&fixture_path, r#"{ "bar": 11, "baz": 12 }"#).unwrap();

    let spec = msgdef_types::load_message_spec_file(&schema_path).unwrap();
    let fixture: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&fixture_path).unwrap()).unwrap();
    let instance = materialize_fixture(&spec, 1, &fixture).unwrap();
    assert_eq!(instance.name, "FooRequest");
    assert_eq!(instance.get("baz"), Some(&Value::Int32(12)));
}
