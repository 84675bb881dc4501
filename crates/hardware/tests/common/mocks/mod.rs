//! mockall doubles for the capabilities injected into devices.

use mockall::mock;
use s32sim_core::soc::irq::IrqSink;
use s32sim_core::soc::sink::ByteSink;

// Interrupt output that records how it was driven.
mock! {
    pub Irq {}

    impl IrqSink for Irq {
        fn set_level(&self, level: bool);
        fn raise(&self);
    }
}

// Byte sink that records emitted bytes.
mock! {
    pub Sink {}

    impl ByteSink for Sink {
        fn write_byte(&mut self, byte: u8);
    }
}

/// Returns an interrupt mock that must never be driven.
pub fn silent_irq() -> Box<MockIrq> {
    let mut irq = MockIrq::new();
    irq.expect_raise().never();
    irq.expect_set_level().never();
    Box::new(irq)
}

/// Returns an interrupt mock expecting exactly `times` assertions.
pub fn irq_raised(times: usize) -> Box<MockIrq> {
    let mut irq = MockIrq::new();
    irq.expect_raise().times(times).return_const(());
    irq.expect_set_level().never();
    Box::new(irq)
}
