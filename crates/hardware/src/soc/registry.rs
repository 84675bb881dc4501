//! Device registry.
//!
//! An explicit factory map from device kind to constructor, owned by whoever
//! assembles the board. Configuration names peripherals by kind; the builder
//! looks the kind up here and hands the factory everything the device needs
//! (placement, interrupt output, byte sink) through a [`DeviceContext`].

use std::collections::BTreeMap;
use std::fmt;

use crate::common::BuildError;
use crate::soc::devices::{Can, Device, Mpu, Uart, can, mpu, uart};
use crate::soc::irq::IrqSink;
use crate::soc::sink::ByteSink;

/// Construction-time inputs for one device instance.
pub struct DeviceContext {
    /// Instance name (e.g., `"UART0"`).
    pub name: String,
    /// Base physical address of the register window.
    pub base_addr: u64,
    /// Interrupt output for the device.
    pub irq: Box<dyn IrqSink>,
    /// Byte sink for devices that emit output; ignored by the others.
    pub output: Box<dyn ByteSink>,
}

impl fmt::Debug for DeviceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceContext")
            .field("name", &self.name)
            .field("base_addr", &self.base_addr)
            .finish_non_exhaustive()
    }
}

/// Constructor for one device kind.
pub type DeviceFactory = Box<dyn Fn(DeviceContext) -> Box<dyn Device> + Send + Sync>;

/// Factory map from device kind to constructor.
#[derive(Default)]
pub struct DeviceRegistry {
    factories: BTreeMap<String, DeviceFactory>,
}

impl DeviceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the board's UART, CAN and MPU factories.
    pub fn with_board_devices() -> Self {
        let mut registry = Self::new();
        registry.insert(uart::KIND, |ctx| -> Box<dyn Device> {
            Box::new(Uart::new(ctx.name, ctx.base_addr, ctx.output, ctx.irq))
        });
        registry.insert(can::KIND, |ctx| -> Box<dyn Device> {
            Box::new(Can::new(ctx.name, ctx.base_addr, ctx.irq))
        });
        registry.insert(mpu::KIND, |ctx| -> Box<dyn Device> {
            Box::new(Mpu::new(ctx.name, ctx.base_addr, ctx.irq))
        });
        registry
    }

    /// Registers a factory under `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::DuplicateKind`] if `kind` is already registered.
    pub fn register<F>(&mut self, kind: &str, factory: F) -> Result<(), BuildError>
    where
        F: Fn(DeviceContext) -> Box<dyn Device> + Send + Sync + 'static,
    {
        if self.factories.contains_key(kind) {
            return Err(BuildError::DuplicateKind(kind.to_owned()));
        }
        self.insert(kind, factory);
        Ok(())
    }

    fn insert<F>(&mut self, kind: &str, factory: F)
    where
        F: Fn(DeviceContext) -> Box<dyn Device> + Send + Sync + 'static,
    {
        let _ = self.factories.insert(kind.to_owned(), Box::new(factory));
    }

    /// Returns whether a factory exists for `kind`.
    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Returns the registered kinds in sorted order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Creates a device of the given kind.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UnknownDevice`] if no factory is registered for `kind`.
    pub fn create(&self, kind: &str, ctx: DeviceContext) -> Result<Box<dyn Device>, BuildError> {
        let factory = self
            .factories
            .get(kind)
            .ok_or_else(|| BuildError::UnknownDevice(kind.to_owned()))?;
        Ok(factory(ctx))
    }
}

impl fmt::Debug for DeviceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.kinds()).finish()
    }
}
