//! Static SDM630 register tables, from the "SDM630 MODBUS Protocol" V1.2
//! document.
//!
//! Anchor addresses follow the document's register columns: input register
//! `3000X` maps to anchor `X`, holding register `4000X` maps to anchor
//! `X`. Each register spans two words, so only every other address in a
//! bank is an anchor.
//!
//! The source data this was transcribed from carried parameter number 53
//! twice, for both "Maximum total system VA demand" and "Neutral current
//! demand"; per the protocol document the demand block is parameters 51-54,
//! so the maximum-VA-demand entry is corrected to 52 here.

use strum_macros::EnumIter;

use crate::error::Result;
use crate::register::{Register, RegisterSet};

/// Anchor addresses of the input-register bank (live measurements,
/// read-only for clients).
#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter)]
#[repr(u16)]
pub enum InputRegister {
    Phase1Voltage = 1,
    Phase2Voltage = 3,
    Phase3Voltage = 5,
    Phase1Current = 7,
    Phase2Current = 9,
    Phase3Current = 11,
    Phase1Power = 13,
    Phase2Power = 15,
    Phase3Power = 17,
    Phase1VoltAmps = 19,
    Phase2VoltAmps = 21,
    Phase3VoltAmps = 23,
    Phase1ReactivePower = 25,
    Phase2ReactivePower = 27,
    Phase3ReactivePower = 29,
    Phase1PowerFactor = 31,
    Phase2PowerFactor = 33,
    Phase3PowerFactor = 35,
    Phase1Angle = 37,
    Phase2Angle = 39,
    Phase3Angle = 41,
    AverageLineToNeutralVolts = 43,
    AverageLineCurrent = 47,
    SumLineCurrents = 49,
    TotalPower = 53,
    TotalVoltAmps = 57,
    TotalVar = 61,
    TotalPowerFactor = 63,
    TotalPhaseAngle = 67,
    Frequency = 71,
    TotalImportKwh = 73,
    TotalExportKwh = 75,
    TotalImportKvarh = 77,
    TotalExportKvarh = 79,
    TotalVah = 81,
    TotalAh = 83,
    TotalPowerDemand = 85,
    MaxTotalPowerDemand = 87,
    TotalVaDemand = 101,
    MaxTotalVaDemand = 103,
    NeutralCurrentDemand = 105,
    MaxNeutralCurrentDemand = 107,
    Line1ToLine2Volts = 201,
    Line2ToLine3Volts = 203,
    Line3ToLine1Volts = 205,
    AverageLineToLineVolts = 207,
    NeutralCurrent = 225,
    Phase1VoltsThd = 235,
    Phase2VoltsThd = 237,
    Phase3VoltsThd = 239,
    Phase1CurrentThd = 241,
    Phase2CurrentThd = 243,
    Phase3CurrentThd = 245,
    AverageVoltsThd = 249,
    AverageCurrentThd = 251,
    Phase1CurrentDemand = 259,
    Phase2CurrentDemand = 261,
    Phase3CurrentDemand = 263,
    MaxPhase1CurrentDemand = 265,
    MaxPhase2CurrentDemand = 267,
    MaxPhase3CurrentDemand = 269,
    Line1ToLine2VoltsThd = 335,
    Line2ToLine3VoltsThd = 337,
    Line3ToLine1VoltsThd = 339,
    AverageLineToLineVoltsThd = 341,
    TotalKwh = 343,
    TotalKvarh = 345,
    L1ImportKwh = 347,
    L2ImportKwh = 349,
    L3ImportKwh = 351,
    L1ExportKwh = 353,
    L2ExportKwh = 355,
    L3ExportKwh = 357,
    L1TotalKwh = 359,
    L2TotalKwh = 361,
    L3TotalKwh = 363,
    L1ImportKvarh = 365,
    L2ImportKvarh = 367,
    L3ImportKvarh = 369,
    L1ExportKvarh = 371,
    L2ExportKvarh = 373,
    L3ExportKvarh = 375,
    L1TotalKvarh = 377,
    L2TotalKvarh = 379,
    L3TotalKvarh = 381,
}

impl From<InputRegister> for u16 {
    fn from(value: InputRegister) -> Self {
        value as u16
    }
}

/// Anchor addresses of the holding-register bank (configuration,
/// client-writable).
#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter)]
#[repr(u16)]
pub enum HoldingRegister {
    /// Demand averaging period in minutes.
    DemandPeriod = 2,
    /// Wiring type: `1` = 3p4w, `2` = 3p3w, `3` = 1p2w.
    SystemType = 10,
    /// Pulse 1 output width in milliseconds.
    Pulse1Width = 12,
    /// Network parity/stop setting code.
    NetworkParityStop = 14,
    /// Modbus node address, 1-247.
    NetworkNode = 20,
    /// Front-panel setup password.
    Password = 24,
    /// Baud rate code: `0` = 2400, `1` = 4800, `2` = 9600, `5` = 38400.
    NetworkBaudRate = 28,
}

impl From<HoldingRegister> for u16 {
    fn from(value: HoldingRegister) -> Self {
        value as u16
    }
}

/// Build the input-register table with example measurement defaults.
pub fn input_registers() -> Result<RegisterSet> {
    use InputRegister as R;
    let mut set = RegisterSet::new();
    let mut add = |register: Register| set.insert(register);
    add(Register::new(R::Phase1Voltage.into(), 1, "Phase 1 line to neutral volts", "Volts", 237.2))?;
    add(Register::new(R::Phase2Voltage.into(), 2, "Phase 2 line to neutral volts", "Volts", 235.1))?;
    add(Register::new(R::Phase3Voltage.into(), 3, "Phase 3 line to neutral volts", "Volts", 239.45))?;
    add(Register::new(R::Phase1Current.into(), 4, "Phase 1 current", "Amps", 5.1))?;
    add(Register::new(R::Phase2Current.into(), 5, "Phase 2 current", "Amps", 5.0))?;
    add(Register::new(R::Phase3Current.into(), 6, "Phase 3 current", "Amps", 5.2))?;
    add(Register::new(R::Phase1Power.into(), 7, "Phase 1 power", "Watts", 100.0).negative_to_grid())?;
    add(Register::new(R::Phase2Power.into(), 8, "Phase 2 power", "Watts", 101.0).negative_to_grid())?;
    add(Register::new(R::Phase3Power.into(), 9, "Phase 3 power", "Watts", 99.0).negative_to_grid())?;
    add(Register::new(R::Phase1VoltAmps.into(), 10, "Phase 1 volt amps", "VA", 110.0))?;
    add(Register::new(R::Phase2VoltAmps.into(), 11, "Phase 2 volt amps", "VA", 111.0))?;
    add(Register::new(R::Phase3VoltAmps.into(), 12, "Phase 3 volt amps", "VA", 109.0))?;
    add(Register::new(R::Phase1ReactivePower.into(), 13, "Phase 1 reactive power", "VAr", 10.0).negative_to_grid())?;
    add(Register::new(R::Phase2ReactivePower.into(), 14, "Phase 2 reactive power", "VAr", 11.0).negative_to_grid())?;
    add(Register::new(R::Phase3ReactivePower.into(), 15, "Phase 3 reactive power", "VAr", 9.0).negative_to_grid())?;
    add(Register::new(R::Phase1PowerFactor.into(), 16, "Phase 1 power factor", "None", 0.98).negative_to_grid())?;
    add(Register::new(R::Phase2PowerFactor.into(), 17, "Phase 2 power factor", "None", 0.97).negative_to_grid())?;
    add(Register::new(R::Phase3PowerFactor.into(), 18, "Phase 3 power factor", "None", 0.99).negative_to_grid())?;
    add(Register::new(R::Phase1Angle.into(), 19, "Phase 1 phase angle", "Degrees", 1.0))?;
    add(Register::new(R::Phase2Angle.into(), 20, "Phase 2 phase angle", "Degrees", 2.0))?;
    add(Register::new(R::Phase3Angle.into(), 21, "Phase 3 phase angle", "Degrees", 3.0))?;
    add(Register::new(R::AverageLineToNeutralVolts.into(), 22, "Average line to neutral volts", "Volts", 230.0))?;
    add(Register::new(R::AverageLineCurrent.into(), 24, "Average line current", "Amps", 5.1))?;
    add(Register::new(R::SumLineCurrents.into(), 25, "Sum of line currents", "Amps", 15.3))?;
    add(Register::new(R::TotalPower.into(), 27, "Total system power", "Watts", 300.0).negative_to_grid())?;
    add(Register::new(R::TotalVoltAmps.into(), 29, "Total system volt amps", "VA", 330.0))?;
    add(Register::new(R::TotalVar.into(), 31, "Total system VAr", "VAr", 30.0).negative_to_grid())?;
    add(Register::new(R::TotalPowerFactor.into(), 32, "Total system power factor", "None", 0.98).negative_to_grid())?;
    add(Register::new(R::TotalPhaseAngle.into(), 34, "Total system phase angle", "Degrees", 2.0))?;
    add(Register::new(R::Frequency.into(), 36, "Frequency of supply voltages", "Hz", 50.0))?;
    add(Register::new(R::TotalImportKwh.into(), 37, "Total Import kWh", "kWh", 1000.0))?;
    add(Register::new(R::TotalExportKwh.into(), 38, "Total Export kWh", "kWh", 500.0))?;
    add(Register::new(R::TotalImportKvarh.into(), 39, "Total Import kVArh", "kVArh", 200.0))?;
    add(Register::new(R::TotalExportKvarh.into(), 40, "Total Export kVArh", "kVArh", 100.0))?;
    add(Register::new(R::TotalVah.into(), 41, "Total VAh", "kVAh", 1500.0))?;
    add(Register::new(R::TotalAh.into(), 42, "Total Ah", "Ah", 300.0))?;
    add(Register::new(R::TotalPowerDemand.into(), 43, "Total system power demand", "W", 320.0))?;
    add(Register::new(R::MaxTotalPowerDemand.into(), 44, "Maximum total system power demand", "VA", 350.0))?;
    add(Register::new(R::TotalVaDemand.into(), 51, "Total system VA demand", "VA", 340.0))?;
    add(Register::new(R::MaxTotalVaDemand.into(), 52, "Maximum total system VA demand", "VA", 360.0))?;
    add(Register::new(R::NeutralCurrentDemand.into(), 53, "Neutral current demand", "Amps", 1.0))?;
    add(Register::new(R::MaxNeutralCurrentDemand.into(), 54, "Maximum neutral current demand", "Amps", 1.2))?;
    add(Register::new(R::Line1ToLine2Volts.into(), 101, "Line 1 to Line 2 volts", "Volts", 400.0))?;
    add(Register::new(R::Line2ToLine3Volts.into(), 102, "Line 2 to Line 3 volts", "Volts", 400.0))?;
    add(Register::new(R::Line3ToLine1Volts.into(), 103, "Line 3 to Line 1 volts", "Volts", 400.0))?;
    add(Register::new(R::AverageLineToLineVolts.into(), 104, "Average line to line volts", "Volts", 400.0))?;
    add(Register::new(R::NeutralCurrent.into(), 113, "Neutral current", "Amps", 0.2))?;
    add(Register::new(R::Phase1VoltsThd.into(), 118, "Phase 1 L/N volts THD", "%", 0.2))?;
    add(Register::new(R::Phase2VoltsThd.into(), 119, "Phase 2 L/N volts THD", "%", 0.3))?;
    add(Register::new(R::Phase3VoltsThd.into(), 120, "Phase 3 L/N volts THD", "%", 0.4))?;
    add(Register::new(R::Phase1CurrentThd.into(), 121, "Phase 1 Current THD", "%", 0.3))?;
    add(Register::new(R::Phase2CurrentThd.into(), 122, "Phase 2 Current THD", "%", 0.6))?;
    add(Register::new(R::Phase3CurrentThd.into(), 123, "Phase 3 Current THD", "%", 0.3))?;
    add(Register::new(R::AverageVoltsThd.into(), 125, "Average line to neutral volts THD", "%", 0.2))?;
    add(Register::new(R::AverageCurrentThd.into(), 126, "Average line current THD", "%", 0.4))?;
    add(Register::new(R::Phase1CurrentDemand.into(), 130, "Phase 1 current demand", "Amps", 0.0))?;
    add(Register::new(R::Phase2CurrentDemand.into(), 131, "Phase 2 current demand", "Amps", 3.0))?;
    add(Register::new(R::Phase3CurrentDemand.into(), 132, "Phase 3 current demand", "Amps", 1.0))?;
    add(Register::new(R::MaxPhase1CurrentDemand.into(), 133, "Maximum phase 1 current demand", "Amps", 13.0))?;
    add(Register::new(R::MaxPhase2CurrentDemand.into(), 134, "Maximum phase 2 current demand", "Amps", 13.0))?;
    add(Register::new(R::MaxPhase3CurrentDemand.into(), 135, "Maximum phase 3 current demand", "Amps", 13.0))?;
    add(Register::new(R::Line1ToLine2VoltsThd.into(), 168, "Line 1 to line 2 volts THD", "%", 0.5))?;
    add(Register::new(R::Line2ToLine3VoltsThd.into(), 169, "Line 2 to line 3 volts THD", "%", 0.3))?;
    add(Register::new(R::Line3ToLine1VoltsThd.into(), 170, "Line 3 to line 1 volts THD", "%", 0.4))?;
    add(Register::new(R::AverageLineToLineVoltsThd.into(), 171, "Average line to line volts THD", "%", 0.3))?;
    add(Register::new(R::TotalKwh.into(), 172, "Total kWh", "kWh", 1348.8))?;
    add(Register::new(R::TotalKvarh.into(), 173, "Total kVArh", "kVArh", 125.0))?;
    add(Register::new(R::L1ImportKwh.into(), 174, "L1 import kWh", "kWh", 420.0))?;
    add(Register::new(R::L2ImportKwh.into(), 175, "L2 import kWh", "kWh", 370.0))?;
    add(Register::new(R::L3ImportKwh.into(), 176, "L3 import kWh", "kWh", 580.0))?;
    add(Register::new(R::L1ExportKwh.into(), 177, "L1 export kWh", "kWh", 1500.0))?;
    add(Register::new(R::L2ExportKwh.into(), 178, "L2 export kWh", "kWh", 1400.0))?;
    add(Register::new(R::L3ExportKwh.into(), 179, "L3 export kWh", "kWh", 1300.0))?;
    add(Register::new(R::L1TotalKwh.into(), 180, "L1 total kWh", "kWh", 420.0))?;
    add(Register::new(R::L2TotalKwh.into(), 181, "L2 total kWh", "kWh", 370.0))?;
    add(Register::new(R::L3TotalKwh.into(), 182, "L3 total kWh", "kWh", 580.0))?;
    add(Register::new(R::L1ImportKvarh.into(), 183, "L1 import kVArh", "kVArh", 10.0))?;
    add(Register::new(R::L2ImportKvarh.into(), 184, "L2 import kVArh", "kVArh", 13.0))?;
    add(Register::new(R::L3ImportKvarh.into(), 185, "L3 import kVArh", "kVArh", 17.0))?;
    add(Register::new(R::L1ExportKvarh.into(), 186, "L1 export kVArh", "kVArh", 12.0))?;
    add(Register::new(R::L2ExportKvarh.into(), 187, "L2 export kVArh", "kVArh", 16.0))?;
    add(Register::new(R::L3ExportKvarh.into(), 188, "L3 export kVArh", "kVArh", 19.0))?;
    add(Register::new(R::L1TotalKvarh.into(), 189, "L1 total kVArh", "kVArh", 25.0))?;
    add(Register::new(R::L2TotalKvarh.into(), 190, "L2 total kVArh", "kVArh", 27.0))?;
    add(Register::new(R::L3TotalKvarh.into(), 191, "L3 total kVArh", "kVArh", 30.0))?;
    Ok(set)
}

/// Build the holding-register table with factory defaults.
pub fn holding_registers() -> Result<RegisterSet> {
    use HoldingRegister as R;
    let mut set = RegisterSet::new();
    let mut add = |register: Register| set.insert(register);
    add(Register::new(R::DemandPeriod.into(), 2, "Demand Period", "Minutes", 60.0))?;
    add(Register::new(R::SystemType.into(), 6, "System Type", "Type", 1.0))?;
    add(Register::new(R::Pulse1Width.into(), 7, "Pulse 1 Width", "ms", 100.0))?;
    add(Register::new(R::NetworkParityStop.into(), 8, "Network Parity Stop", "None", 0.0))?;
    add(Register::new(R::NetworkNode.into(), 11, "Network Node", "None", 1.0))?;
    add(Register::new(R::Password.into(), 13, "Password", "None", 0.0))?;
    add(Register::new(R::NetworkBaudRate.into(), 15, "Network Baud Rate", "None", 2.0))?;
    Ok(set)
}
