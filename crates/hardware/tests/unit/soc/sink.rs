//! Byte sink tests.

use pretty_assertions::assert_eq;
use s32sim_core::config::OutputTarget;
use s32sim_core::soc::sink::{self, BufferSink, ByteSink, NullSink};

#[test]
fn buffer_clones_share_contents() {
    let observer = BufferSink::new();
    let mut writer = observer.clone();
    for &b in b"ok" {
        writer.write_byte(b);
    }
    assert_eq!(observer.contents(), b"ok");
    assert_eq!(observer.to_string_lossy(), "ok");
}

#[test]
fn buffer_clear_discards_output() {
    let mut sink = BufferSink::new();
    sink.write_byte(b'x');
    sink.clear();
    assert!(sink.contents().is_empty());
}

#[test]
fn lossy_decoding_keeps_going() {
    let mut sink = BufferSink::new();
    for b in [b'a', 0xFF, b'b'] {
        sink.write_byte(b);
    }
    assert_eq!(sink.to_string_lossy(), "a\u{FFFD}b");
}

#[test]
fn null_sink_accepts_anything() {
    let mut sink = NullSink;
    for b in 0..=u8::MAX {
        sink.write_byte(b);
    }
}

#[test]
fn configured_targets_build_sinks() {
    for target in [OutputTarget::Stdout, OutputTarget::Stderr, OutputTarget::Null] {
        let mut sink = sink::for_target(target);
        // Newline keeps captured test output readable.
        sink.write_byte(b'\n');
    }
}
