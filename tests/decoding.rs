//! End-to-end decoding through the public API

use msgscope::schema::ChannelSchema;
use msgscope::{Channel, InboundMessage, MsgscopeError, RecordDecoder, Time, Value, decode_header};

const POSE_STAMPED: &str = "\
# A Pose with reference coordinate frame and timestamp
Header header
Pose pose

================================================================================
MSG: std_msgs/Header
# Sequence ID: consecutively increasing ID
uint32 seq
time stamp
string frame_id

================================================================================
MSG: geometry_msgs/Pose
Point position
Quaternion orientation

================================================================================
MSG: geometry_msgs/Point
float64 x
float64 y
float64 z

================================================================================
MSG: geometry_msgs/Quaternion
float64 x
float64 y
float64 z
float64 w
";

fn header_bytes(seq: u32, sec: u32, nsec: u32, frame_id: &str) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&seq.to_le_bytes());
    data.extend_from_slice(&sec.to_le_bytes());
    data.extend_from_slice(&nsec.to_le_bytes());
    data.extend_from_slice(&(frame_id.len() as u32).to_le_bytes());
    data.extend_from_slice(frame_id.as_bytes());
    data
}

#[test]
fn pose_stamped_keeps_only_the_header() {
    let schema = ChannelSchema::build(POSE_STAMPED, 32).unwrap();

    assert_eq!(schema.flattened().paths(), ["header.seq", "header.stamp", "header.frame_id"]);

    let unresolved: Vec<&str> =
        schema.flattened().unresolved.iter().map(|u| u.path.as_str()).collect();
    assert_eq!(
        unresolved,
        [
            "pose.position.x",
            "pose.position.y",
            "pose.position.z",
            "pose.orientation.x",
            "pose.orientation.y",
            "pose.orientation.z",
            "pose.orientation.w",
        ]
    );
}

#[test]
fn pose_stamped_payload_decodes_header_fields() {
    let mut payload = header_bytes(12, 1_600_000_000, 250, "map");
    // Pose doubles follow; they are not part of the schema and are left unread.
    payload.extend_from_slice(&[0u8; 56]);

    let channel = Channel::new("/pose", 32);
    let message =
        InboundMessage::new("geometry_msgs/PoseStamped", "d3812c3cbc69362b77dc0b19b345f8f5", POSE_STAMPED, payload);
    let record = channel.handle(&message).unwrap();

    assert_eq!(record.to_pairs(), vec![
        ("header.seq".to_string(), Value::UInt32(12)),
        ("header.stamp".to_string(), Value::Time(Time::new(1_600_000_000, 250))),
        ("header.frame_id".to_string(), Value::String("map".to_string())),
    ]);
    assert_eq!(record.consumed, 4 + 8 + 4 + 3);

    let header = decode_header(&message.payload, 0).unwrap();
    assert_eq!(header.frame_id, "map");
}

#[test]
fn wire_examples() {
    let schema = ChannelSchema::build("uint16 a\nuint32 b\nstring c", 32).unwrap();
    let mut data = vec![0x01, 0x02, 0xFF, 0xFF, 0xFF, 0xFF];
    data.extend_from_slice(&[3, 0, 0, 0, b'a', b'b', b'c']);

    let record = RecordDecoder::new(schema.flattened()).decode(&data).unwrap();
    assert_eq!(record.u16("a"), Some(513));
    assert_eq!(record.u32("b"), Some(4_294_967_295));
    assert_eq!(record.string("c"), Some("abc"));
    assert_eq!(record.consumed, data.len());
}

#[test]
fn truncated_uint32_is_an_error() {
    let schema = ChannelSchema::build("uint32 value", 32).unwrap();
    let err = RecordDecoder::new(schema.flattened()).decode(&[1, 2]).unwrap_err();
    assert!(matches!(err, MsgscopeError::OutOfBounds { needed: 4, available: 2, .. }));
    assert!(!err.is_retryable());
}

#[test]
fn channel_survives_bad_payloads() {
    let channel = Channel::new("/status", 32);
    let definition = "uint8 level\nstring name";

    let good = InboundMessage::untyped(definition, vec![2, 2, 0, 0, 0, b'o', b'k']);
    let oversized_length = InboundMessage::untyped(definition, vec![2, 0xFF, 0xFF, 0xFF, 0xFF]);

    assert_eq!(channel.handle(&good).unwrap().string("name"), Some("ok"));
    assert!(channel.handle(&oversized_length).is_err());
    assert_eq!(channel.handle(&good).unwrap().u8("level"), Some(2));
}

#[test]
fn invalid_utf8_is_replaced() {
    let channel = Channel::default();
    let record = channel
        .handle(&InboundMessage::untyped("string s", vec![2, 0, 0, 0, 0xC3, 0x28]))
        .unwrap();
    assert_eq!(record.string("s"), Some("\u{FFFD}("));
    assert_eq!(record.consumed, 6);
}
