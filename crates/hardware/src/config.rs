//! Configuration system for the board model.
//!
//! This module defines all configuration structures used to parameterize the
//! platform. It provides:
//! 1. **Defaults:** The S32K3x8 EVB memory map, peripheral placement and IRQ wiring.
//! 2. **Structures:** System options, memory regions and peripheral instances.
//! 3. **Loading:** Deserialization from JSON strings or files.
//!
//! Every field is optional in JSON; omitted fields take the board defaults.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::common::ConfigError;
use crate::soc::devices::{can, mpu, uart};

/// Default configuration constants for the board.
///
/// Addresses and sizes follow the S32K3x8 EVB memory map.
mod defaults {
    /// Base address of the program flash.
    pub const FLASH_BASE: u64 = 0x0040_0000;
    /// Size of the program flash (8 MiB).
    pub const FLASH_SIZE: u64 = 0x0080_0000;

    /// Base address of the instruction tightly-coupled memory.
    pub const ITCM_BASE: u64 = 0x0000_0000;
    /// Size of ITCM (64 KiB).
    pub const ITCM_SIZE: u64 = 0x0001_0000;

    /// Base address of the data tightly-coupled memory.
    pub const DTCM_BASE: u64 = 0x2000_0000;
    /// Size of DTCM (128 KiB).
    pub const DTCM_SIZE: u64 = 0x0002_0000;

    /// Base address of SRAM bank 0.
    pub const SRAM0_BASE: u64 = 0x2040_0000;
    /// Base address of SRAM bank 1.
    pub const SRAM1_BASE: u64 = 0x2044_0000;
    /// Base address of SRAM bank 2.
    pub const SRAM2_BASE: u64 = 0x2048_0000;
    /// Size of each SRAM bank (256 KiB).
    pub const SRAM_BANK_SIZE: u64 = 0x0004_0000;

    /// Base address of the UART register window.
    pub const UART_BASE: u64 = 0x4032_8000;
    /// Base address of the CAN register window.
    pub const CAN_BASE: u64 = 0x4030_4000;
    /// Base address of the MPU register window.
    pub const MPU_BASE: u64 = 0x4027_8000;

    /// NVIC line wired to UART0.
    pub const IRQ_UART: u32 = 32;
    /// NVIC line wired to CAN0.
    pub const IRQ_CAN: u32 = 64;

    /// Number of external interrupt lines on the Cortex-M7 NVIC.
    pub const IRQ_LINES: usize = 240;
}

/// Destination for UART transmit output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum OutputTarget {
    /// Process standard output.
    #[default]
    #[serde(alias = "stdout")]
    Stdout,
    /// Process standard error (keeps output visible when stdout is captured).
    #[serde(alias = "stderr")]
    Stderr,
    /// Discard output.
    #[serde(alias = "null")]
    Null,
}

/// Root configuration structure.
///
/// # Examples
///
/// Creating a default configuration:
///
/// ```
/// use s32sim_core::config::Config;
///
/// let config = Config::default();
/// assert!(config.system.enforce_mpu);
/// assert_eq!(config.peripherals.len(), 3);
/// ```
///
/// Deserializing from JSON, with omitted sections falling back to defaults:
///
/// ```
/// use s32sim_core::config::{Config, OutputTarget};
///
/// let json = r#"{
///     "system": { "uart_output": "Stderr", "enforce_mpu": false },
///     "peripherals": [
///         { "name": "UART0", "kind": "s32k3x8evb_uart", "base": 1077051392, "irq": 32 }
///     ]
/// }"#;
///
/// let config = Config::from_json_str(json).unwrap();
/// assert_eq!(config.system.uart_output, OutputTarget::Stderr);
/// assert!(!config.system.enforce_mpu);
/// assert_eq!(config.peripherals.len(), 1);
/// assert_eq!(config.memory.len(), 6);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// System-wide options.
    #[serde(default)]
    pub system: SystemConfig,
    /// Memory regions mapped on the bus.
    #[serde(default = "Config::default_memory")]
    pub memory: Vec<RegionConfig>,
    /// Peripheral instances created through the device registry.
    #[serde(default = "Config::default_peripherals")]
    pub peripherals: Vec<PeripheralConfig>,
}

impl Config {
    /// Parses a configuration from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the document is not valid configuration JSON.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read and
    /// [`ConfigError::Parse`] if its contents are invalid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Returns the board's on-chip memories.
    fn default_memory() -> Vec<RegionConfig> {
        vec![
            RegionConfig::new("ITCM", defaults::ITCM_BASE, defaults::ITCM_SIZE),
            RegionConfig::new("FLASH", defaults::FLASH_BASE, defaults::FLASH_SIZE),
            RegionConfig::new("DTCM", defaults::DTCM_BASE, defaults::DTCM_SIZE),
            RegionConfig::new("SRAM0", defaults::SRAM0_BASE, defaults::SRAM_BANK_SIZE),
            RegionConfig::new("SRAM1", defaults::SRAM1_BASE, defaults::SRAM_BANK_SIZE),
            RegionConfig::new("SRAM2", defaults::SRAM2_BASE, defaults::SRAM_BANK_SIZE),
        ]
    }

    /// Returns the board's peripherals: UART0, CAN0 and the MPU.
    fn default_peripherals() -> Vec<PeripheralConfig> {
        vec![
            PeripheralConfig {
                name: "UART0".to_owned(),
                kind: uart::KIND.to_owned(),
                base: defaults::UART_BASE,
                irq: Some(defaults::IRQ_UART),
            },
            PeripheralConfig {
                name: "CAN0".to_owned(),
                kind: can::KIND.to_owned(),
                base: defaults::CAN_BASE,
                irq: Some(defaults::IRQ_CAN),
            },
            PeripheralConfig {
                name: "MPU".to_owned(),
                kind: mpu::KIND.to_owned(),
                base: defaults::MPU_BASE,
                irq: None,
            },
        ]
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            system: SystemConfig::default(),
            memory: Self::default_memory(),
            peripherals: Self::default_peripherals(),
        }
    }
}

/// System-wide options.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemConfig {
    /// Number of interrupt controller lines.
    #[serde(default = "SystemConfig::default_irq_lines")]
    pub irq_lines: usize,

    /// When true, an enabled MPU gates every bus access outside its own window.
    #[serde(default = "SystemConfig::default_enforce_mpu")]
    pub enforce_mpu: bool,

    /// Where UART transmit output goes unless the builder overrides it.
    #[serde(default)]
    pub uart_output: OutputTarget,
}

impl SystemConfig {
    /// Returns the default number of interrupt lines.
    fn default_irq_lines() -> usize {
        defaults::IRQ_LINES
    }

    /// MPU enforcement is on by default.
    fn default_enforce_mpu() -> bool {
        true
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            irq_lines: defaults::IRQ_LINES,
            enforce_mpu: true,
            uart_output: OutputTarget::default(),
        }
    }
}

/// A memory region mapped on the bus.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegionConfig {
    /// Region name.
    pub name: String,
    /// Physical base address.
    pub base: u64,
    /// Size in bytes.
    pub size: u64,
}

impl RegionConfig {
    /// Creates a region description.
    pub fn new(name: impl Into<String>, base: u64, size: u64) -> Self {
        Self {
            name: name.into(),
            base,
            size,
        }
    }
}

/// A peripheral instance to create through the device registry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PeripheralConfig {
    /// Instance name (e.g., `"UART0"`).
    pub name: String,
    /// Registered device kind (e.g., `"s32k3x8evb_uart"`).
    pub kind: String,
    /// Physical base address of the register window.
    pub base: u64,
    /// Interrupt line, or `None` to leave the output unconnected.
    #[serde(default)]
    pub irq: Option<u32>,
}
