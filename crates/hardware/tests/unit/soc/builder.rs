//! Board assembly tests.
//!
//! Builds full systems from configuration and drives the peripherals through
//! the bus, checking interrupt wiring, output routing and construction errors.

use pretty_assertions::assert_eq;
use s32sim_core::common::BuildError;
use s32sim_core::config::{Config, PeripheralConfig, RegionConfig};
use s32sim_core::soc::System;
use s32sim_core::soc::devices::{Device, can, mpu, uart};
use s32sim_core::soc::memory::Memory;
use s32sim_core::soc::registry::DeviceRegistry;
use s32sim_core::soc::sink::BufferSink;

use crate::common::{LogCapture, board_with_capture};

const UART_BASE: u64 = 0x4032_8000;
const CAN_BASE: u64 = 0x4030_4000;
const MPU_BASE: u64 = 0x4027_8000;

#[test]
fn default_board_memory_map() {
    let (system, _) = board_with_capture(&Config::default());
    let names: Vec<String> = system
        .bus
        .memory_map()
        .into_iter()
        .map(|(name, _, _)| name)
        .collect();
    assert_eq!(
        names,
        vec!["ITCM", "FLASH", "DTCM", "SRAM0", "SRAM1", "SRAM2", "MPU", "CAN0", "UART0"]
    );
    assert_eq!(system.interrupts.len(), 240);
}

#[test]
fn uart_output_and_interrupt_through_the_bus() {
    let (mut system, out) = board_with_capture(&Config::default());
    for &b in b"hi" {
        system.bus.write_u32(UART_BASE + uart::REG_DATA, u32::from(b));
    }
    assert_eq!(out.to_string_lossy(), "hi");
    assert!(!system.irq_pending(32));

    system
        .bus
        .write_u32(UART_BASE + uart::REG_CTRL, uart::CTRL_INTERRUPT_ENABLE);
    system.bus.write_u32(UART_BASE + uart::REG_DATA, u32::from(b'!'));
    assert!(system.irq_pending(32));
    assert_eq!(system.interrupts.pending(), vec![32]);
}

#[test]
fn can_loopback_through_the_bus() {
    let (mut system, _) = board_with_capture(&Config::default());
    system.bus.write_u32(CAN_BASE + can::REG_CTRL, can::CTRL_LOOPBACK);
    system.bus.write_u32(CAN_BASE + can::REG_TXBUF, 0x0BAD_CAFE);
    assert_eq!(system.bus.read_u32(CAN_BASE + can::REG_RXBUF), 0x0BAD_CAFE);
    assert_eq!(
        system.bus.read_u32(CAN_BASE + can::REG_STATUS),
        can::STATUS_TX_READY | can::STATUS_RX_READY
    );
    assert!(system.irq_pending(64));
}

#[test]
fn default_board_gates_itcm() {
    let (mut system, _) = board_with_capture(&Config::default());
    system.load_binary_at(&[0xEF, 0xBE, 0xAD, 0xDE], 0x0);
    assert_eq!(system.bus.read_u32(0x0), 0);
    assert_eq!(system.mpu_mut().unwrap().ear(), 0);
    assert_eq!(system.mpu_mut().unwrap().edr(), mpu::FAULT_DETAIL);

    let word = system.bus.read_u32(0x0040_0000);
    assert_eq!(word, 0);
    assert_eq!(
        system.bus.read_u32(MPU_BASE + mpu::REG_EAR),
        0,
        "flash read must not fault"
    );
}

#[test]
fn enforcement_can_be_disabled() {
    let config = Config::from_json_str(r#"{ "system": { "enforce_mpu": false } }"#).unwrap();
    let (mut system, _) = board_with_capture(&config);
    system.load_binary_at(&[0xEF, 0xBE, 0xAD, 0xDE], 0x0);
    assert_eq!(system.bus.read_u32(0x0), 0xDEAD_BEEF);
}

#[test]
fn board_without_mpu() {
    let mut config = Config::default();
    config.peripherals.retain(|p| p.kind != mpu::KIND);
    let (mut system, _) = board_with_capture(&config);
    assert!(system.mpu_mut().is_none());
    system.bus.write_u32(0x10, 5);
    assert_eq!(system.bus.read_u32(0x10), 5);
}

#[test]
fn peripheral_without_irq_is_unwired() {
    let mut config = Config::default();
    for p in &mut config.peripherals {
        p.irq = None;
    }
    let (mut system, _) = board_with_capture(&config);
    system.bus.write_u32(CAN_BASE + can::REG_TXBUF, 1);
    assert!(system.interrupts.pending().is_empty());
}

#[test]
fn irq_out_of_range_is_rejected() {
    let mut config = Config::default();
    config.system.irq_lines = 48;
    let err = System::new(&config).unwrap_err();
    assert_eq!(
        err,
        BuildError::IrqOutOfRange {
            name: "CAN0".to_owned(),
            irq: 64,
            lines: 48,
        }
    );
}

#[test]
fn unknown_kind_is_rejected() {
    let mut config = Config::default();
    config.peripherals.push(PeripheralConfig {
        name: "LPSPI0".to_owned(),
        kind: "s32k3x8evb_lpspi".to_owned(),
        base: 0x4035_8000,
        irq: None,
    });
    assert_eq!(
        System::new(&config).unwrap_err(),
        BuildError::UnknownDevice("s32k3x8evb_lpspi".to_owned())
    );
}

#[test]
fn overlapping_peripherals_are_rejected() {
    let mut config = Config::default();
    config.peripherals[1].base = UART_BASE + 0x800;
    let err = System::new(&config).unwrap_err();
    assert!(matches!(err, BuildError::Overlap { ref name, .. } if name == "CAN0"));
}

#[test]
fn empty_memory_region_is_rejected() {
    let mut config = Config::default();
    config.memory.push(RegionConfig::new("HOLE", 0x6000_0000, 0));
    assert_eq!(
        System::new(&config).unwrap_err(),
        BuildError::EmptyWindow("HOLE".to_owned())
    );
}

#[test]
fn custom_registry_devices_are_attached() {
    let mut registry = DeviceRegistry::with_board_devices();
    registry
        .register("mailbox_ram", |ctx| -> Box<dyn Device> {
            Box::new(Memory::new(ctx.name, ctx.base_addr, 0x40))
        })
        .unwrap();
    let mut config = Config::default();
    config.peripherals.push(PeripheralConfig {
        name: "MBOX".to_owned(),
        kind: "mailbox_ram".to_owned(),
        base: 0x4100_0000,
        irq: None,
    });
    let mut system = System::builder(&config)
        .registry(registry)
        .build()
        .unwrap();
    system.bus.write_u32(0x4100_0010, 0x77);
    assert_eq!(system.bus.read_u32(0x4100_0010), 0x77);
}

#[test]
fn unmatched_output_override_is_reported() {
    let config = Config::default();
    let out = BufferSink::new();
    let (system, logs) = LogCapture::run(|| {
        System::builder(&config)
            .output("UART7", Box::new(out.clone()))
            .build()
    });
    assert!(system.is_ok());
    let text = logs.text();
    assert!(text.contains("output override matches no configured peripheral"), "{text}");
    assert!(text.contains("UART7"), "{text}");
}
