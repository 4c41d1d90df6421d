//! The register domain model: a named float measurement and the ordered,
//! address-unique collection it lives in.

use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};

/// Change-notification hook, invoked synchronously after every committed
/// value mutation with `(register, old_value, new_value)`.
///
/// Hooks are informational only. They never fire during table construction
/// or for rejected commits, and they cannot fail the commit.
pub type ChangeHook = Box<dyn Fn(&Register, f32, f32) + Send>;

/// A single named SDM630 measurement, mapped onto two consecutive 16-bit
/// words at `[address, address + 1]`.
pub struct Register {
    address: u16,
    parameter_number: u16,
    description: &'static str,
    unit: &'static str,
    value: f32,
    default_value: f32,
    negative_to_grid: bool,
    on_change: Option<ChangeHook>,
}

impl Register {
    /// Create a register with its construction-time default value.
    ///
    /// `address` is the anchor word; `parameter_number` is the parameter
    /// index from the SDM630 protocol document, which is not the same
    /// numbering as the word address.
    pub fn new(
        address: u16,
        parameter_number: u16,
        description: &'static str,
        unit: &'static str,
        default_value: f32,
    ) -> Self {
        Self {
            address,
            parameter_number,
            description,
            unit,
            value: default_value,
            default_value,
            negative_to_grid: false,
            on_change: None,
        }
    }

    /// Mark that a negative value on this register means power flowing back
    /// to the grid. Display metadata only, not interpreted by the core.
    pub fn negative_to_grid(mut self) -> Self {
        self.negative_to_grid = true;
        self
    }

    /// The anchor word address. Never changes after insertion into a set.
    pub fn address(&self) -> u16 {
        self.address
    }

    pub fn parameter_number(&self) -> u16 {
        self.parameter_number
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn unit(&self) -> &'static str {
        self.unit
    }

    /// The current value.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// The value this register was constructed with.
    pub fn default_value(&self) -> f32 {
        self.default_value
    }

    pub fn is_negative_to_grid(&self) -> bool {
        self.negative_to_grid
    }
}

impl fmt::Debug for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Register")
            .field("address", &self.address)
            .field("parameter_number", &self.parameter_number)
            .field("description", &self.description)
            .field("unit", &self.unit)
            .field("value", &self.value)
            .field("default_value", &self.default_value)
            .field("negative_to_grid", &self.negative_to_grid)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

/// An insertion-ordered collection of registers with unique anchor
/// addresses and O(1) address lookup.
#[derive(Debug, Default)]
pub struct RegisterSet {
    registers: Vec<Register>,
    by_address: HashMap<u16, usize>,
}

impl RegisterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a register to the set.
    ///
    /// Fails with [`Error::DuplicateAddress`] if another register already
    /// owns the anchor address. Register tables are expected to treat this
    /// as a hard load-time failure.
    pub fn insert(&mut self, register: Register) -> Result<()> {
        let address = register.address;
        if self.by_address.contains_key(&address) {
            return Err(Error::DuplicateAddress { address });
        }
        self.by_address.insert(address, self.registers.len());
        self.registers.push(register);
        Ok(())
    }

    /// Look up a register by its anchor address.
    pub fn get_by_address(&self, address: u16) -> Option<&Register> {
        self.by_address
            .get(&address)
            .map(|&idx| &self.registers[idx])
    }

    /// Whether a register is anchored at the given address.
    pub fn contains_address(&self, address: u16) -> bool {
        self.by_address.contains_key(&address)
    }

    /// Read the current value of the register anchored at `address`.
    pub fn get_float(&self, address: u16) -> Result<f32> {
        self.get_by_address(address)
            .map(Register::value)
            .ok_or(Error::RegisterNotFound { address })
    }

    /// Commit a new value to the register anchored at `address`.
    ///
    /// The assignment and the change-hook invocation form a single commit
    /// unit; no partial commit is observable.
    pub fn set_float(&mut self, address: u16, value: f32) -> Result<()> {
        let idx = *self
            .by_address
            .get(&address)
            .ok_or(Error::RegisterNotFound { address })?;
        let register = &mut self.registers[idx];
        let old = register.value;
        register.value = value;
        let register: &Register = register;
        if let Some(hook) = &register.on_change {
            hook(register, old, value);
        }
        Ok(())
    }

    /// Install the change hook for the register anchored at `address`,
    /// replacing any previous hook.
    pub fn set_change_hook(&mut self, address: u16, hook: ChangeHook) -> Result<()> {
        let idx = *self
            .by_address
            .get(&address)
            .ok_or(Error::RegisterNotFound { address })?;
        self.registers[idx].on_change = Some(hook);
        Ok(())
    }

    /// Iterate all registers in insertion order.
    pub fn all(&self) -> impl Iterator<Item = &Register> {
        self.registers.iter()
    }

    pub fn len(&self) -> usize {
        self.registers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn small_set() -> RegisterSet {
        let mut set = RegisterSet::new();
        set.insert(Register::new(7, 4, "Phase 1 current", "Amps", 100.0))
            .unwrap();
        set.insert(
            Register::new(13, 7, "Phase 1 power", "Watts", 250.0).negative_to_grid(),
        )
        .unwrap();
        set
    }

    #[test]
    fn duplicate_address_is_rejected() {
        let mut set = small_set();
        let err = set
            .insert(Register::new(7, 99, "Impostor", "Volts", 0.0))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateAddress { address: 7 }));
        // The original register is untouched.
        assert_eq!(set.len(), 2);
        assert_eq!(set.get_by_address(7).unwrap().parameter_number(), 4);
    }

    #[test]
    fn get_and_set_by_address() {
        let mut set = small_set();
        assert_eq!(set.get_float(7).unwrap(), 100.0);
        set.set_float(7, -50.5).unwrap();
        assert_eq!(set.get_float(7).unwrap(), -50.5);
        // Default value keeps the construction-time value.
        assert_eq!(set.get_by_address(7).unwrap().default_value(), 100.0);
    }

    #[test]
    fn unknown_address_is_an_error() {
        let mut set = small_set();
        assert!(matches!(
            set.get_float(99),
            Err(Error::RegisterNotFound { address: 99 })
        ));
        assert!(matches!(
            set.set_float(99, 1.0),
            Err(Error::RegisterNotFound { address: 99 })
        ));
    }

    #[test]
    fn insertion_order_is_preserved() {
        let set = small_set();
        let addresses: Vec<u16> = set.all().map(Register::address).collect();
        assert_eq!(addresses, vec![7, 13]);
    }

    #[test]
    fn change_hook_fires_once_per_commit() {
        let mut set = small_set();
        let calls: Arc<Mutex<Vec<(u16, f32, f32)>>> = Arc::new(Mutex::new(Vec::new()));
        let calls_in_hook = Arc::clone(&calls);
        set.set_change_hook(
            7,
            Box::new(move |register, old, new| {
                calls_in_hook
                    .lock()
                    .unwrap()
                    .push((register.address(), old, new));
            }),
        )
        .unwrap();

        set.set_float(7, 230.0).unwrap();
        set.set_float(7, 231.5).unwrap();
        // A rejected commit must not notify.
        assert!(set.set_float(99, 1.0).is_err());
        // A commit on a hook-less register must not notify either.
        set.set_float(13, 0.0).unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(*calls, vec![(7, 100.0, 230.0), (7, 230.0, 231.5)]);
    }

    #[test]
    fn hook_sees_committed_value() {
        let mut set = small_set();
        let seen = Arc::new(Mutex::new(0.0f32));
        let seen_in_hook = Arc::clone(&seen);
        set.set_change_hook(
            7,
            Box::new(move |register, _, _| {
                // The register already carries the new value when the hook runs.
                *seen_in_hook.lock().unwrap() = register.value();
            }),
        )
        .unwrap();
        set.set_float(7, 5.2).unwrap();
        assert_eq!(*seen.lock().unwrap(), 5.2);
    }
}
