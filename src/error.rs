//! Our error types for the SDM630 register simulator.

use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Custom error type for the SDM630 register space.
#[derive(Error, Debug)]
pub enum Error {
    /// No register is anchored at the given word address.
    #[error("no register at address {address}")]
    RegisterNotFound { address: u16 },
    /// A register table tried to place two registers at the same anchor address.
    #[error("duplicate register address {address}")]
    DuplicateAddress { address: u16 },
    /// The word address has never been materialized, neither from a register
    /// projection nor from a client write.
    #[error("no word stored at address {address}")]
    UnmappedWord { address: u16 },
    #[error("Modbus frame error: {0}")]
    Frame(rmodbus::ErrorKind),
}

impl From<rmodbus::ErrorKind> for Error {
    fn from(err: rmodbus::ErrorKind) -> Self {
        Error::Frame(err)
    }
}
