use std::collections::HashMap;

use audit_sampler::{
    audit::{AuditConfig, PathCollector, Reservoir},
    metainfo::{NodeId, SegmentKey, WalkEvent},
};
use rand::{rngs::StdRng, SeedableRng};

const PASS: &str = "tests/data/pass.ndjson";

fn node(byte: u8) -> NodeId {
    NodeId::new([byte; 32])
}

fn replay(config: &AuditConfig) -> HashMap<NodeId, Reservoir> {
    let seed = config.seed.expect("test config must be seeded");
    let mut collector = PathCollector::from_config(config, StdRng::seed_from_u64(seed))
        .expect("Unable to construct collector from config");

    let pass = std::fs::read_to_string(PASS).unwrap();
    for line in pass.lines() {
        if let Some(event) = WalkEvent::from_json_line(line).unwrap() {
            event.dispatch(&mut collector).unwrap();
        }
    }

    collector.into_reservoirs()
}

/// Replays a small recorded pass and checks every node got exactly its own pieces
#[tokio::test]
async fn test_replay_recorded_pass() {
    let config = AuditConfig::from_path("tests/conf/test_audit.json")
        .await
        .unwrap();
    let reservoirs = replay(&config);

    // the inline segment and the piece-less segment never create reservoirs
    assert_eq!(reservoirs.len(), 3);

    let a = &reservoirs[&node(0xaa)];
    assert_eq!(a.seen(), 4);
    assert_eq!(a.segments().len(), 2);

    // nodes that saw no more keys than slots keep all of them, in order
    let b = &reservoirs[&node(0xbb)];
    assert_eq!(b.seen(), 2);
    assert_eq!(
        b.segments(),
        &[
            SegmentKey::from("0102/s0/photos/obj1"),
            SegmentKey::from("0102/s0/photos/obj2"),
        ]
    );

    let c = &reservoirs[&node(0xcc)];
    assert_eq!(c.seen(), 2);
    assert_eq!(
        c.segments(),
        &[
            SegmentKey::from("0102/l/photos/obj1"),
            SegmentKey::from("0102/s0/photos/obj2"),
        ]
    );

    let all_a_keys = [
        SegmentKey::from("0102/s0/photos/obj1"),
        SegmentKey::from("0102/l/photos/obj1"),
        SegmentKey::from("0102/s0/photos/obj2"),
        SegmentKey::from("0102/l/photos/obj4"),
    ];
    assert!(a.segments().iter().all(|k| all_a_keys.contains(k)));
    assert!(!a.segments().contains(&SegmentKey::from("0102/l/photos/tiny")));
}

#[tokio::test]
async fn test_replay_is_deterministic() {
    let config = AuditConfig::from_path("tests/conf/test_audit.json")
        .await
        .unwrap();

    assert_eq!(replay(&config), replay(&config));
}

#[test]
fn test_reservoirs_serialize_for_scheduler() {
    let mut config = AuditConfig::new(2);
    config.seed = Some(1);
    let reservoirs = replay(&config);

    let json = serde_json::to_value(&reservoirs).unwrap();
    let b = &json["bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb"];
    assert_eq!(b["capacity"], 2);
    assert_eq!(b["seen"], 2);
    assert_eq!(
        b["segments"],
        serde_json::json!(["0102/s0/photos/obj1", "0102/s0/photos/obj2"])
    );
}
