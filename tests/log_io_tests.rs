// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Event-log reader and writer tests against files on disk.

mod common;

use common::{log_bytes, write_log, Payloads, TempDir};
use lcmlog::demux::IndexMaps;
use lcmlog::{ChannelFilter, Demultiplexer, LogReader, LogWriter, SchemaRegistry};

#[test]
fn test_file_round_trip() {
    let dir = TempDir::new("io_round_trip");
    let path = dir.join("log.lcm");

    let mut writer = LogWriter::create(&path).unwrap();
    assert_eq!(writer.write("CASSIE_STATE", 1_000, &[1, 2, 3]).unwrap(), 0);
    assert_eq!(writer.write("CASSIE_INPUT", 1_500, &[]).unwrap(), 1);
    assert_eq!(writer.events_written(), 2);
    writer.finish().unwrap();

    let reader = LogReader::open(&path).unwrap();
    assert_eq!(reader.path(), path.to_str());
    let events: Vec<_> = reader.events().collect();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].channel, "CASSIE_STATE");
    assert_eq!(events[0].data, vec![1, 2, 3]);
    assert_eq!(events[1].event_number, 1);
    assert_eq!(events[1].timestamp, 1_500);
}

#[test]
fn test_open_empty_file() {
    let dir = TempDir::new("io_empty");
    let path = dir.join("empty.lcm");
    std::fs::write(&path, b"").unwrap();

    let reader = LogReader::open(&path).unwrap();
    assert!(reader.is_empty());
    let info = reader.info();
    assert_eq!(info.event_count, 0);
    assert_eq!(info.start_time, None);
}

#[test]
fn test_open_missing_file() {
    assert!(LogReader::open("/nonexistent/lcmlog-missing.00").is_err());
}

#[test]
fn test_copy_channel_subset_keeps_event_numbers() {
    let dir = TempDir::new("io_copy");
    let source = dir.join("source.lcm");
    write_log(
        &source,
        &[
            ("A", 1, vec![1]),
            ("B", 2, vec![2]),
            ("A", 3, vec![3]),
        ],
    );

    let target = dir.join("subset.lcm");
    let reader = LogReader::open(&source)
        .unwrap()
        .with_filter(ChannelFilter::include(vec!["A".to_string()]));
    let mut writer = LogWriter::create(&target).unwrap();
    for event in reader.events() {
        writer.write_event(&event).unwrap();
    }
    writer.finish().unwrap();

    let copied: Vec<_> = LogReader::open(&target).unwrap().events().collect();
    let numbers: Vec<i64> = copied.iter().map(|e| e.event_number).collect();
    assert_eq!(numbers, vec![0, 2]);
    assert!(copied.iter().all(|e| e.channel == "A"));
}

#[test]
fn test_demux_over_damaged_log() {
    let p = Payloads::new();
    let mut bytes = log_bytes(&[("INPUT", 1, p.robot_input(1, &[]))]);
    bytes.extend_from_slice(b"not an event");
    bytes.extend_from_slice(&log_bytes(&[("INPUT", 2, p.robot_input(2, &[]))]));
    let mut tail = log_bytes(&[("INPUT", 3, p.robot_input(3, &[]))]);
    tail.truncate(tail.len() - 4);
    bytes.extend_from_slice(&tail);

    let reader = LogReader::from_bytes(bytes);
    let mut events = reader.events();
    let mut demux =
        Demultiplexer::new(SchemaRegistry::builtin().unwrap(), IndexMaps::default()).unwrap();
    let summary = demux.run(events.by_ref()).unwrap();

    assert_eq!(summary.recorded, 2);
    let stats = events.stats();
    assert_eq!(stats.resyncs, 1);
    assert_eq!(stats.skipped_bytes, b"not an event".len() as u64);
    assert!(stats.truncated_tail);
}

#[test]
fn test_channel_rates() {
    let bytes = log_bytes(&[
        ("STATE", 0, vec![0]),
        ("STATE", 500_000, vec![0]),
        ("STATE", 1_000_000, vec![0]),
        ("ONCE", 10, vec![0]),
    ]);
    let info = LogReader::from_bytes(bytes).info();
    let rate = info.channels["STATE"].rate_hz().unwrap();
    assert!((rate - 2.0).abs() < 1e-9);
    assert_eq!(info.channels["ONCE"].rate_hz(), None);
}
