//! This crate simulates the Modbus register space of an Eastron SDM630
//! three-phase power meter.
//!
//! Every measurement is a 32-bit IEEE-754 float spanning two consecutive
//! 16-bit registers, big-endian, high word first. Input registers carry
//! live measurements (volts, amps, power, energy, THD); holding registers
//! carry client-writable configuration (demand period, system type, comms
//! settings).
//!
//! The crate owns the register domain model and keeps it synchronized with
//! the flat word surface a Modbus client sees, in both directions: program
//! updates project into words immediately, client word writes reconcile
//! back into register values and fire change hooks. Request/response
//! framing is `rmodbus`'s job; bring your own transport (see
//! `demos/tcp_server.rs` for a TCP loop).
//!
//! ```no_run
//! use sdm630_sim::context::MeterContext;
//! use sdm630_sim::sdm630::InputRegister;
//!
//! let mut meter = MeterContext::sdm630()?;
//! meter.input_mut().set_float(InputRegister::Frequency, 49.98)?;
//! # Ok::<(), sdm630_sim::error::Error>(())
//! ```

pub mod codec;
pub mod context;
pub mod error;
pub mod register;
pub mod sdm630;
pub mod service;
pub mod store;
