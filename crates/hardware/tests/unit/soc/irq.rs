//! Interrupt controller and line tests.

use std::sync::Arc;
use std::thread;

use pretty_assertions::assert_eq;
use rstest::rstest;
use s32sim_core::soc::irq::{InterruptController, IrqSink, NoIrq};

#[test]
fn new_controller_has_no_pending_lines() {
    let irqs = InterruptController::new(240);
    assert_eq!(irqs.len(), 240);
    assert!(!irqs.is_empty());
    assert!(irqs.pending().is_empty());
}

#[rstest]
#[case(0, true)]
#[case(239, true)]
#[case(240, false)]
#[case(u32::MAX, false)]
fn line_handles_exist_only_in_range(#[case] number: u32, #[case] exists: bool) {
    let irqs = InterruptController::new(240);
    assert_eq!(irqs.line(number).is_some(), exists);
}

#[test]
fn raise_and_clear() {
    let irqs = InterruptController::new(8);
    let line = irqs.line(5).unwrap();
    assert_eq!(line.number(), 5);

    line.raise();
    assert!(irqs.is_pending(5));
    assert!(!irqs.is_pending(4));

    irqs.clear(5);
    assert!(!irqs.is_pending(5));
}

#[test]
fn raise_is_level_not_count() {
    let irqs = InterruptController::new(8);
    let line = irqs.line(1).unwrap();
    line.raise();
    line.raise();
    irqs.clear(1);
    assert!(irqs.pending().is_empty());
}

#[test]
fn set_level_low_deasserts() {
    let irqs = InterruptController::new(8);
    let line = irqs.line(3).unwrap();
    line.set_level(true);
    line.set_level(false);
    assert!(!irqs.is_pending(3));
}

#[test]
fn pending_is_sorted() {
    let irqs = InterruptController::new(100);
    for n in [64, 3, 32] {
        irqs.line(n).unwrap().raise();
    }
    assert_eq!(irqs.pending(), vec![3, 32, 64]);
}

#[test]
fn out_of_range_queries_are_inert() {
    let irqs = InterruptController::new(4);
    irqs.clear(100);
    assert!(!irqs.is_pending(100));
}

#[test]
fn cloned_lines_share_state() {
    let irqs = InterruptController::new(4);
    let a = irqs.line(2).unwrap();
    let b = a.clone();
    a.raise();
    assert!(irqs.is_pending(b.number()));
}

#[test]
fn lines_can_be_raised_from_other_threads() {
    let irqs = InterruptController::new(16);
    let handles: Vec<_> = (0..4)
        .map(|n| {
            let line = irqs.line(n * 4).unwrap();
            thread::spawn(move || line.raise())
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(irqs.pending(), vec![0, 4, 8, 12]);
    assert_eq!(Arc::strong_count(&irqs), 1);
}

#[test]
fn unconnected_output_is_a_no_op() {
    let irq = NoIrq;
    irq.raise();
    irq.set_level(false);
}
