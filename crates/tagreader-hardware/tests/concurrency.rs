//! Serialisation of reader access across threads.

mod common;

use std::thread;
use std::time::Duration;
use tagreader_core::Color;
use tagreader_hardware::LedIntent;

#[test]
fn test_concurrent_calls_never_overlap_on_device() {
    let tags: Vec<Vec<u8>> = (0..8u8).map(|i| vec![i; 4]).collect();
    let tag_refs: Vec<&[u8]> = tags.iter().map(Vec::as_slice).collect();
    let (reader, control) = common::reader_with_tags(&tag_refs);
    control.set_op_delay(Duration::from_millis(1));

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                reader.scan().unwrap();
            });
        }
        for _ in 0..4 {
            s.spawn(|| {
                let intent = LedIntent::new().final_color(Color::Green);
                reader.toggle(Some(&intent)).unwrap();
                reader.query_state().unwrap();
            });
        }
        s.spawn(|| {
            let mut seen = 0;
            reader
                .scan_with(|_| {
                    seen += 1;
                    seen < 2
                })
                .unwrap();
        });
    });

    assert_eq!(control.max_in_flight(), 1);
    assert_eq!(control.select_count(), 6);
    common::assert_reader_idle(&control);
}

#[test]
fn test_led_calls_wait_for_scan_cycle() {
    let (reader, control) = common::reader_with_tags(&[&[1; 4], &[2; 4], &[3; 4]]);
    control.set_op_delay(Duration::from_millis(2));

    thread::scope(|s| {
        s.spawn(|| {
            let mut seen = 0;
            let last = reader
                .scan_with(|_| {
                    seen += 1;
                    seen < 3
                })
                .unwrap();
            assert_eq!(last.uid, vec![3; 4]);
        });
        s.spawn(|| {
            for _ in 0..5 {
                reader.query_state().unwrap();
            }
        });
    });

    assert_eq!(control.max_in_flight(), 1);
    assert_eq!(control.led_commands().len(), 5);
}
