//! Board construction and top-level `System` type.
//!
//! This module builds the board from configuration. It performs:
//! 1. **Interrupts:** Creates the interrupt controller with the configured number of lines.
//! 2. **Memories:** Maps flash, TCM and SRAM regions on the bus.
//! 3. **Peripherals:** Instantiates each configured peripheral through the device registry,
//!    wiring its interrupt line and output sink.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use crate::common::BuildError;
use crate::config::Config;
use crate::soc::devices::Mpu;
use crate::soc::interconnect::Bus;
use crate::soc::irq::{InterruptController, IrqSink, NoIrq};
use crate::soc::memory::Memory;
use crate::soc::registry::{DeviceContext, DeviceRegistry};
use crate::soc::sink::{self, ByteSink};

/// Top-level system instance: the bus and the interrupt controller it feeds.
#[derive(Debug)]
pub struct System {
    /// System interconnect; routes accesses to memories and peripherals.
    pub bus: Bus,
    /// Interrupt lines asserted by peripherals.
    pub interrupts: Arc<InterruptController>,
}

impl System {
    /// Builds the board described by `config` with the default device registry.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] if a peripheral kind is unknown, two windows
    /// overlap, a window is empty or an IRQ number is out of range.
    pub fn new(config: &Config) -> Result<Self, BuildError> {
        SystemBuilder::new(config).build()
    }

    /// Returns a builder for customizing the registry or output sinks.
    pub fn builder(config: &Config) -> SystemBuilder<'_> {
        SystemBuilder::new(config)
    }

    /// Loads a binary into memory at the given physical address.
    ///
    /// # Arguments
    ///
    /// * `data` - Raw bytes to write.
    /// * `addr` - Physical base address for the write.
    pub fn load_binary_at(&mut self, data: &[u8], addr: u64) {
        self.bus.load_binary_at(data, addr);
    }

    /// Returns the MPU, if the board has one.
    pub fn mpu_mut(&mut self) -> Option<&mut Mpu> {
        self.bus.mpu_mut()
    }

    /// Returns whether interrupt line `irq` is asserted.
    pub fn irq_pending(&self, irq: u32) -> bool {
        self.interrupts.is_pending(irq)
    }
}

/// Assembles a [`System`] from configuration.
pub struct SystemBuilder<'a> {
    config: &'a Config,
    registry: DeviceRegistry,
    outputs: BTreeMap<String, Box<dyn ByteSink>>,
}

impl<'a> SystemBuilder<'a> {
    /// Creates a builder using the board's default device registry.
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            registry: DeviceRegistry::with_board_devices(),
            outputs: BTreeMap::new(),
        }
    }

    /// Replaces the device registry.
    #[must_use]
    pub fn registry(mut self, registry: DeviceRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Routes the output of peripheral `name` to `sink` instead of the configured target.
    ///
    /// An override naming no configured peripheral is dropped with a warning at build time.
    #[must_use]
    pub fn output(mut self, name: impl Into<String>, sink: Box<dyn ByteSink>) -> Self {
        let _ = self.outputs.insert(name.into(), sink);
        self
    }

    /// Builds the system.
    ///
    /// # Errors
    ///
    /// See [`System::new`].
    pub fn build(mut self) -> Result<System, BuildError> {
        let system_cfg = &self.config.system;
        let interrupts = InterruptController::new(system_cfg.irq_lines);
        let mut bus = Bus::new(system_cfg.enforce_mpu);

        for region in &self.config.memory {
            bus.add_device(Box::new(Memory::new(
                region.name.clone(),
                region.base,
                region.size as usize,
            )))?;
        }

        for periph in &self.config.peripherals {
            let irq: Box<dyn IrqSink> = match periph.irq {
                Some(n) => Box::new(interrupts.line(n).ok_or_else(|| BuildError::IrqOutOfRange {
                    name: periph.name.clone(),
                    irq: n,
                    lines: interrupts.len(),
                })?),
                None => Box::new(NoIrq),
            };
            let output = self
                .outputs
                .remove(&periph.name)
                .unwrap_or_else(|| sink::for_target(system_cfg.uart_output));
            let ctx = DeviceContext {
                name: periph.name.clone(),
                base_addr: periph.base,
                irq,
                output,
            };
            bus.add_device(self.registry.create(&periph.kind, ctx)?)?;
            info!(
                name = %periph.name,
                kind = %periph.kind,
                base = format_args!("{:#010x}", periph.base),
                irq = ?periph.irq,
                "peripheral attached"
            );
        }

        for name in self.outputs.keys() {
            warn!(name = %name, "output override matches no configured peripheral");
        }

        Ok(System { bus, interrupts })
    }
}

impl fmt::Debug for SystemBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemBuilder")
            .field("registry", &self.registry)
            .field("outputs", &self.outputs.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
