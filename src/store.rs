//! The synchronization core: a flat word-addressable surface backed by a
//! [`RegisterSet`].
//!
//! The word map is a projection of the register collection, never
//! independently authoritative. Program code mutates through
//! [`RegisterBackedWordStore::set_float`] (push path); the protocol layer
//! mutates through [`RegisterBackedWordStore::write_words`] (pull path).
//! Both paths commit through the register set, so change hooks fire
//! identically regardless of mutation origin.

use std::collections::HashMap;

use log::{debug, warn};

use crate::codec::{decode_f32, encode_f32};
use crate::error::{Error, Result};
use crate::register::{ChangeHook, RegisterSet};

pub struct RegisterBackedWordStore {
    registers: RegisterSet,
    words: HashMap<u16, u16>,
}

impl RegisterBackedWordStore {
    /// Build the word surface for a populated register set.
    ///
    /// Every register is projected into its word pair. This is
    /// initialization, not a change: no hooks fire.
    pub fn new(registers: RegisterSet) -> Self {
        let mut words = HashMap::with_capacity(registers.len() * 2);
        for register in registers.all() {
            let [high, low] = encode_f32(register.value());
            words.insert(register.address(), high);
            words.insert(register.address() + 1, low);
        }
        Self { registers, words }
    }

    /// The backing register set.
    pub fn registers(&self) -> &RegisterSet {
        &self.registers
    }

    /// Install the change hook for the register anchored at `address`.
    pub fn set_change_hook(&mut self, address: impl Into<u16>, hook: ChangeHook) -> Result<()> {
        self.registers.set_change_hook(address.into(), hook)
    }

    /// Read the current value of the register anchored at `address`.
    pub fn get_float(&self, address: impl Into<u16>) -> Result<f32> {
        self.registers.get_float(address.into())
    }

    /// Program-initiated float write.
    ///
    /// Commits through the register set (firing the change hook), then
    /// overwrites the word pair at `[address, address + 1]`. On
    /// [`Error::RegisterNotFound`] the word map is left untouched.
    pub fn set_float(&mut self, address: impl Into<u16>, value: f32) -> Result<()> {
        let address = address.into();
        self.registers.set_float(address, value)?;
        let [high, low] = encode_f32(value);
        self.words.insert(address, high);
        self.words.insert(address + 1, low);
        Ok(())
    }

    /// Read one raw word.
    pub fn read_word(&self, address: u16) -> Result<u16> {
        self.words
            .get(&address)
            .copied()
            .ok_or(Error::UnmappedWord { address })
    }

    /// Read `count` consecutive raw words starting at `address`.
    pub fn read_words(&self, address: u16, count: u16) -> Result<Vec<u16>> {
        let mut values = Vec::with_capacity(count as usize);
        for offset in 0..count {
            let word_address = address
                .checked_add(offset)
                .ok_or(Error::UnmappedWord { address: u16::MAX })?;
            values.push(self.read_word(word_address)?);
        }
        Ok(values)
    }

    /// Client-initiated single-word write.
    ///
    /// The raw word is stored unconditionally: addresses without a backing
    /// register are opaque words the protocol layer may legitimately use.
    /// When the written word completes a float pair anchored one address
    /// below, the pair is decoded and committed into the register, which is
    /// how client writes become observable to program logic and hooks. A
    /// pair whose other half was never materialized is skipped silently;
    /// the raw write is retained either way, so a partial or unmapped write
    /// never aborts an otherwise valid multi-register transaction.
    pub fn write_word(&mut self, address: u16, word: u16) {
        self.words.insert(address, word);

        // The written address can only complete a pair as its low word.
        let Some(anchor) = address.checked_sub(1) else {
            return;
        };
        if !self.registers.contains_address(anchor) {
            return;
        }
        let (Some(&high), Some(&low)) = (self.words.get(&anchor), self.words.get(&address)) else {
            debug!("word pair at ({anchor}, {address}) incomplete, register sync skipped");
            return;
        };
        let value = decode_f32([high, low]);
        if let Err(err) = self.registers.set_float(anchor, value) {
            // The anchor was checked above; a failure here means the set
            // changed underneath us and is worth surfacing in the log.
            warn!("register sync at address {anchor} failed: {err}");
        }
    }

    /// Client-initiated multi-word write.
    ///
    /// Words are applied one by one in ascending address order, so a float
    /// pair contained in the request commits exactly once, when its low
    /// word lands.
    pub fn write_words(&mut self, address: u16, words: &[u16]) {
        for (offset, &word) in words.iter().enumerate() {
            let Some(word_address) = address.checked_add(offset as u16) else {
                warn!("word write past end of address space, remainder dropped");
                return;
            };
            self.write_word(word_address, word);
        }
    }
}

impl std::fmt::Debug for RegisterBackedWordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterBackedWordStore")
            .field("registers", &self.registers.len())
            .field("words", &self.words.len())
            .finish()
    }
}
