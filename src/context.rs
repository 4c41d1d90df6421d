//! The meter-wide protocol surface.
//!
//! For avoiding confusion with Modbus master/slave terminology, this module
//! uses "server" and "client": the simulated meter is the server, the
//! polling device is the client.
//!
//! A [`MeterContext`] bundles the two word stores the transport layer sees,
//! one per register bank (input registers for live measurements, holding
//! registers for configuration). It implements
//! [`rmodbus::server::context::ModbusContext`], so any `rmodbus`-driven
//! server loop can serve it directly; [`process_frame`] handles one inbound
//! ADU for transports that just shuttle raw bytes.

use std::sync::{Arc, Mutex};

use log::debug;
use rmodbus::server::ModbusFrame;
use rmodbus::server::context::ModbusContext;
use rmodbus::{ErrorKind, ModbusProto, VectorTrait};

use crate::error::Result;
use crate::register::RegisterSet;
use crate::store::RegisterBackedWordStore;

/// Shared handle for wiring the context to a transport loop and a
/// program-side update task at the same time. The single lock spans each
/// full read-modify-write sequence, so a frame is never interleaved with a
/// half-written float pair.
pub type SharedMeterContext = Arc<Mutex<MeterContext>>;

/// The register space of one simulated meter: an input bank and a holding
/// bank over disjoint address ranges.
///
/// Constructed explicitly at process start and passed to whoever needs it;
/// there are no global table singletons.
#[derive(Debug)]
pub struct MeterContext {
    input: RegisterBackedWordStore,
    holding: RegisterBackedWordStore,
}

impl MeterContext {
    pub fn new(input: RegisterSet, holding: RegisterSet) -> Self {
        Self {
            input: RegisterBackedWordStore::new(input),
            holding: RegisterBackedWordStore::new(holding),
        }
    }

    /// A context populated with the standard SDM630 register tables.
    pub fn sdm630() -> Result<Self> {
        Ok(Self::new(
            crate::sdm630::input_registers()?,
            crate::sdm630::holding_registers()?,
        ))
    }

    pub fn input(&self) -> &RegisterBackedWordStore {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut RegisterBackedWordStore {
        &mut self.input
    }

    pub fn holding(&self) -> &RegisterBackedWordStore {
        &self.holding
    }

    pub fn holding_mut(&mut self) -> &mut RegisterBackedWordStore {
        &mut self.holding
    }
}

/// Read `count` consecutive words from one bank, mapping holes to the
/// out-of-bounds context error the frame processor turns into an
/// illegal-data-address exception.
fn bank_words(
    bank: &RegisterBackedWordStore,
    reg: u16,
    count: u16,
) -> core::result::Result<Vec<u16>, ErrorKind> {
    bank.read_words(reg, count).map_err(|_| ErrorKind::OOBContext)
}

fn bank_u32(bank: &RegisterBackedWordStore, reg: u16) -> core::result::Result<u32, ErrorKind> {
    let words = bank_words(bank, reg, 2)?;
    Ok((u32::from(words[0]) << 16) | u32::from(words[1]))
}

fn bank_u64(bank: &RegisterBackedWordStore, reg: u16) -> core::result::Result<u64, ErrorKind> {
    let words = bank_words(bank, reg, 4)?;
    Ok((u64::from(words[0]) << 48)
        | (u64::from(words[1]) << 32)
        | (u64::from(words[2]) << 16)
        | u64::from(words[3]))
}

fn push_bank_bytes<V: VectorTrait<u8>>(
    bank: &RegisterBackedWordStore,
    reg: u16,
    count: u16,
    result: &mut V,
) -> core::result::Result<(), ErrorKind> {
    for word in bank_words(bank, reg, count)? {
        for byte in word.to_be_bytes() {
            result.push(byte)?;
        }
    }
    Ok(())
}

/// Big-endian byte pairs to words; an odd trailing byte is a caller error.
fn words_from_be_bytes(values: &[u8]) -> core::result::Result<Vec<u16>, ErrorKind> {
    let mut words = Vec::with_capacity(values.len() / 2);
    for pair in values.chunks(2) {
        let &[high, low] = pair else {
            return Err(ErrorKind::OOB);
        };
        words.push(u16::from_be_bytes([high, low]));
    }
    Ok(words)
}

/// Word banks as seen by the `rmodbus` frame processor.
///
/// The meter has no bit objects, so every coil and discrete accessor
/// answers out-of-bounds, which the protocol layer reports as an
/// illegal-data-address exception. Unmapped word reads do the same. Word
/// writes are accepted unconditionally; reconciliation into registers
/// happens inside the stores.
#[allow(clippy::cast_possible_truncation)]
impl ModbusContext for MeterContext {
    fn get_inputs_as_u8<V: VectorTrait<u8>>(
        &self,
        reg: u16,
        count: u16,
        result: &mut V,
    ) -> core::result::Result<(), ErrorKind> {
        push_bank_bytes(&self.input, reg, count, result)
    }

    fn get_holdings_as_u8<V: VectorTrait<u8>>(
        &self,
        reg: u16,
        count: u16,
        result: &mut V,
    ) -> core::result::Result<(), ErrorKind> {
        push_bank_bytes(&self.holding, reg, count, result)
    }

    fn set_inputs_from_u8(&mut self, reg: u16, values: &[u8]) -> core::result::Result<(), ErrorKind> {
        self.input.write_words(reg, &words_from_be_bytes(values)?);
        Ok(())
    }

    fn set_holdings_from_u8(
        &mut self,
        reg: u16,
        values: &[u8],
    ) -> core::result::Result<(), ErrorKind> {
        self.holding.write_words(reg, &words_from_be_bytes(values)?);
        Ok(())
    }

    fn get_coils_as_u8<V: VectorTrait<u8>>(
        &self,
        _reg: u16,
        _count: u16,
        _result: &mut V,
    ) -> core::result::Result<(), ErrorKind> {
        Err(ErrorKind::OOBContext)
    }

    fn get_coils_as_u8_bytes<V: VectorTrait<u8>>(
        &self,
        _reg: u16,
        _count: u16,
        _result: &mut V,
    ) -> core::result::Result<(), ErrorKind> {
        Err(ErrorKind::OOBContext)
    }

    fn get_discretes_as_u8<V: VectorTrait<u8>>(
        &self,
        _reg: u16,
        _count: u16,
        _result: &mut V,
    ) -> core::result::Result<(), ErrorKind> {
        Err(ErrorKind::OOBContext)
    }

    fn get_discretes_as_u8_bytes<V: VectorTrait<u8>>(
        &self,
        _reg: u16,
        _count: u16,
        _result: &mut V,
    ) -> core::result::Result<(), ErrorKind> {
        Err(ErrorKind::OOBContext)
    }

    fn set_coils_from_u8(
        &mut self,
        _reg: u16,
        _count: u16,
        _values: &[u8],
    ) -> core::result::Result<(), ErrorKind> {
        Err(ErrorKind::OOBContext)
    }

    fn set_discretes_from_u8(
        &mut self,
        _reg: u16,
        _count: u16,
        _values: &[u8],
    ) -> core::result::Result<(), ErrorKind> {
        Err(ErrorKind::OOBContext)
    }

    fn set_coils_from_u8_bytes(
        &mut self,
        _reg: u16,
        _values: &[u8],
    ) -> core::result::Result<(), ErrorKind> {
        Err(ErrorKind::OOBContext)
    }

    fn set_discretes_from_u8_bytes(
        &mut self,
        _reg: u16,
        _values: &[u8],
    ) -> core::result::Result<(), ErrorKind> {
        Err(ErrorKind::OOBContext)
    }

    fn get_coils_bulk<V: VectorTrait<bool>>(
        &self,
        _reg: u16,
        _count: u16,
        _result: &mut V,
    ) -> core::result::Result<(), ErrorKind> {
        Err(ErrorKind::OOBContext)
    }

    fn get_discretes_bulk<V: VectorTrait<bool>>(
        &self,
        _reg: u16,
        _count: u16,
        _result: &mut V,
    ) -> core::result::Result<(), ErrorKind> {
        Err(ErrorKind::OOBContext)
    }

    fn get_inputs_bulk<V: VectorTrait<u16>>(
        &self,
        reg: u16,
        count: u16,
        result: &mut V,
    ) -> core::result::Result<(), ErrorKind> {
        result.extend(&bank_words(&self.input, reg, count)?)
    }

    fn get_holdings_bulk<V: VectorTrait<u16>>(
        &self,
        reg: u16,
        count: u16,
        result: &mut V,
    ) -> core::result::Result<(), ErrorKind> {
        result.extend(&bank_words(&self.holding, reg, count)?)
    }

    fn set_coils_bulk(&mut self, _reg: u16, _values: &[bool]) -> core::result::Result<(), ErrorKind> {
        Err(ErrorKind::OOBContext)
    }

    fn set_discretes_bulk(
        &mut self,
        _reg: u16,
        _values: &[bool],
    ) -> core::result::Result<(), ErrorKind> {
        Err(ErrorKind::OOBContext)
    }

    fn set_inputs_bulk(&mut self, reg: u16, values: &[u16]) -> core::result::Result<(), ErrorKind> {
        self.input.write_words(reg, values);
        Ok(())
    }

    fn set_holdings_bulk(&mut self, reg: u16, values: &[u16]) -> core::result::Result<(), ErrorKind> {
        self.holding.write_words(reg, values);
        Ok(())
    }

    fn get_coil(&self, _reg: u16) -> core::result::Result<bool, ErrorKind> {
        Err(ErrorKind::OOBContext)
    }

    fn get_discrete(&self, _reg: u16) -> core::result::Result<bool, ErrorKind> {
        Err(ErrorKind::OOBContext)
    }

    fn get_input(&self, reg: u16) -> core::result::Result<u16, ErrorKind> {
        self.input.read_word(reg).map_err(|_| ErrorKind::OOBContext)
    }

    fn get_holding(&self, reg: u16) -> core::result::Result<u16, ErrorKind> {
        self.holding
            .read_word(reg)
            .map_err(|_| ErrorKind::OOBContext)
    }

    fn set_coil(&mut self, _reg: u16, _value: bool) -> core::result::Result<(), ErrorKind> {
        Err(ErrorKind::OOBContext)
    }

    fn set_discrete(&mut self, _reg: u16, _value: bool) -> core::result::Result<(), ErrorKind> {
        Err(ErrorKind::OOBContext)
    }

    fn set_input(&mut self, reg: u16, value: u16) -> core::result::Result<(), ErrorKind> {
        self.input.write_word(reg, value);
        Ok(())
    }

    fn set_holding(&mut self, reg: u16, value: u16) -> core::result::Result<(), ErrorKind> {
        self.holding.write_word(reg, value);
        Ok(())
    }

    fn get_inputs_as_u32(&self, reg: u16) -> core::result::Result<u32, ErrorKind> {
        bank_u32(&self.input, reg)
    }

    fn get_holdings_as_u32(&self, reg: u16) -> core::result::Result<u32, ErrorKind> {
        bank_u32(&self.holding, reg)
    }

    fn set_inputs_from_u32(&mut self, reg: u16, value: u32) -> core::result::Result<(), ErrorKind> {
        self.input
            .write_words(reg, &[(value >> 16) as u16, value as u16]);
        Ok(())
    }

    fn set_holdings_from_u32(&mut self, reg: u16, value: u32) -> core::result::Result<(), ErrorKind> {
        self.holding
            .write_words(reg, &[(value >> 16) as u16, value as u16]);
        Ok(())
    }

    fn get_inputs_as_u64(&self, reg: u16) -> core::result::Result<u64, ErrorKind> {
        bank_u64(&self.input, reg)
    }

    fn get_holdings_as_u64(&self, reg: u16) -> core::result::Result<u64, ErrorKind> {
        bank_u64(&self.holding, reg)
    }

    fn set_inputs_from_u64(&mut self, reg: u16, value: u64) -> core::result::Result<(), ErrorKind> {
        self.input.write_words(
            reg,
            &[
                (value >> 48) as u16,
                (value >> 32) as u16,
                (value >> 16) as u16,
                value as u16,
            ],
        );
        Ok(())
    }

    fn set_holdings_from_u64(&mut self, reg: u16, value: u64) -> core::result::Result<(), ErrorKind> {
        self.holding.write_words(
            reg,
            &[
                (value >> 48) as u16,
                (value >> 32) as u16,
                (value >> 16) as u16,
                value as u16,
            ],
        );
        Ok(())
    }

    fn get_inputs_as_f32(&self, reg: u16) -> core::result::Result<f32, ErrorKind> {
        Ok(f32::from_bits(bank_u32(&self.input, reg)?))
    }

    fn get_holdings_as_f32(&self, reg: u16) -> core::result::Result<f32, ErrorKind> {
        Ok(f32::from_bits(bank_u32(&self.holding, reg)?))
    }

    fn set_inputs_from_f32(&mut self, reg: u16, value: f32) -> core::result::Result<(), ErrorKind> {
        self.set_inputs_from_u32(reg, value.to_bits())
    }

    fn set_holdings_from_f32(&mut self, reg: u16, value: f32) -> core::result::Result<(), ErrorKind> {
        self.set_holdings_from_u32(reg, value.to_bits())
    }
}

/// Handle one inbound Modbus ADU against the context.
///
/// Returns the response bytes when the request requires one (broadcasts do
/// not). The transport layer owns framing above this: it hands in exactly
/// one request and ships the returned bytes back unmodified.
pub fn process_frame(
    context: &mut MeterContext,
    unit_id: u8,
    request: &[u8],
    proto: ModbusProto,
) -> Result<Option<Vec<u8>>> {
    let mut response = Vec::new();
    let mut frame = ModbusFrame::new(unit_id, request, proto, &mut response);
    frame.parse()?;
    if frame.processing_required {
        if frame.readonly {
            frame.process_read(&*context)?;
        } else {
            frame.process_write(context)?;
        }
    }
    if frame.response_required {
        frame.finalize_response()?;
        debug!("responding with {} bytes", response.len());
        Ok(Some(response))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode_f32, encode_f32};
    use crate::sdm630::{HoldingRegister, InputRegister};
    use rmodbus::client::ModbusRequest;
    use std::sync::{Arc, Mutex};

    const UNIT_ID: u8 = 1;

    fn meter() -> MeterContext {
        MeterContext::sdm630().unwrap()
    }

    #[test]
    fn banks_map_to_the_right_stores() {
        let ctx = meter();
        // Phase 1 voltage defaults to 237.2 in the input bank.
        let high = ctx.get_input(InputRegister::Phase1Voltage.into()).unwrap();
        let low = ctx
            .get_input(u16::from(InputRegister::Phase1Voltage) + 1)
            .unwrap();
        assert_eq!(decode_f32([high, low]), 237.2);
        // Demand period defaults to 60.0 in the holding bank.
        let high = ctx.get_holding(HoldingRegister::DemandPeriod.into()).unwrap();
        let low = ctx
            .get_holding(u16::from(HoldingRegister::DemandPeriod) + 1)
            .unwrap();
        assert_eq!(decode_f32([high, low]), 60.0);
    }

    #[test]
    fn unmapped_words_and_bit_objects_answer_out_of_bounds() {
        let mut ctx = meter();
        assert!(ctx.get_input(9999).is_err());
        assert!(ctx.get_holding(9999).is_err());
        assert!(ctx.get_coil(0).is_err());
        assert!(ctx.get_discrete(0).is_err());
        assert!(ctx.set_coil(0, true).is_err());
        assert!(ctx.set_discrete(0, true).is_err());
    }

    #[test]
    fn typed_bank_accessors_share_the_word_surface() {
        let mut ctx = meter();
        assert_eq!(
            ctx.get_holdings_as_f32(HoldingRegister::DemandPeriod.into())
                .unwrap(),
            60.0
        );
        ctx.set_holdings_from_f32(HoldingRegister::DemandPeriod.into(), 45.0)
            .unwrap();
        assert_eq!(
            ctx.holding().get_float(HoldingRegister::DemandPeriod).unwrap(),
            45.0
        );

        // Multi-register reads serve word pairs from the same surface.
        let mut words: Vec<u16> = Vec::new();
        ctx.get_inputs_bulk(InputRegister::Phase1Voltage.into(), 2, &mut words)
            .unwrap();
        assert_eq!(decode_f32([words[0], words[1]]), 237.2);

        let mut bytes: Vec<u8> = Vec::new();
        ctx.get_inputs_as_u8(InputRegister::Phase1Voltage.into(), 2, &mut bytes)
            .unwrap();
        let [high, low] = encode_f32(237.2);
        assert_eq!(bytes, [high.to_be_bytes(), low.to_be_bytes()].concat());

        // An odd byte count cannot form a word.
        assert!(
            ctx.set_holdings_from_u8(HoldingRegister::DemandPeriod.into(), &[0x42])
                .is_err()
        );

        let mut bits: Vec<bool> = Vec::new();
        assert!(ctx.get_coils_bulk(0, 1, &mut bits).is_err());
        assert!(ctx.get_discretes_bulk(0, 1, &mut bits).is_err());
        assert!(ctx.set_coils_bulk(0, &[true]).is_err());
        assert!(ctx.set_discretes_bulk(0, &[true]).is_err());
    }

    #[test]
    fn read_input_registers_over_the_wire() {
        let mut ctx = meter();
        let mut req = ModbusRequest::new(UNIT_ID, ModbusProto::TcpUdp);
        let mut request = Vec::new();
        req.generate_get_inputs(InputRegister::Phase1Voltage.into(), 2, &mut request)
            .unwrap();

        let response = process_frame(&mut ctx, UNIT_ID, &request, ModbusProto::TcpUdp)
            .unwrap()
            .expect("read requires a response");

        let mut words = Vec::new();
        req.parse_u16(&response, &mut words).unwrap();
        assert_eq!(words.len(), 2);
        assert_eq!(decode_f32([words[0], words[1]]), 237.2);
    }

    #[test]
    fn holding_write_reaches_register_and_hook() {
        let mut ctx = meter();
        let calls: Arc<Mutex<Vec<(f32, f32)>>> = Arc::new(Mutex::new(Vec::new()));
        let calls_in_hook = Arc::clone(&calls);
        ctx.holding_mut()
            .set_change_hook(
                HoldingRegister::DemandPeriod,
                Box::new(move |_, old, new| {
                    calls_in_hook.lock().unwrap().push((old, new));
                }),
            )
            .unwrap();

        let mut req = ModbusRequest::new(UNIT_ID, ModbusProto::TcpUdp);
        let mut request = Vec::new();
        req.generate_set_holdings_bulk(
            HoldingRegister::DemandPeriod.into(),
            &encode_f32(30.0),
            &mut request,
        )
        .unwrap();

        let response = process_frame(&mut ctx, UNIT_ID, &request, ModbusProto::TcpUdp)
            .unwrap()
            .expect("write requires an acknowledgement");
        req.parse_ok(&response).unwrap();

        assert_eq!(
            ctx.holding().get_float(HoldingRegister::DemandPeriod).unwrap(),
            30.0
        );
        // Exactly one notification, old value first.
        assert_eq!(*calls.lock().unwrap(), vec![(60.0, 30.0)]);
    }

    #[test]
    fn split_single_register_writes_commit_on_the_low_word() {
        let mut ctx = meter();
        let anchor: u16 = HoldingRegister::DemandPeriod.into();
        let [high, low] = encode_f32(15.0);

        for (address, word) in [(anchor, high), (anchor + 1, low)] {
            let mut req = ModbusRequest::new(UNIT_ID, ModbusProto::TcpUdp);
            let mut request = Vec::new();
            req.generate_set_holding(address, word, &mut request).unwrap();
            let response = process_frame(&mut ctx, UNIT_ID, &request, ModbusProto::TcpUdp)
                .unwrap()
                .expect("write requires an acknowledgement");
            req.parse_ok(&response).unwrap();
        }

        assert_eq!(
            ctx.holding().get_float(HoldingRegister::DemandPeriod).unwrap(),
            15.0
        );
    }

    #[test]
    fn program_update_is_visible_to_the_next_read() {
        let mut ctx = meter();
        ctx.input_mut()
            .set_float(InputRegister::Frequency, 49.95)
            .unwrap();

        let mut req = ModbusRequest::new(UNIT_ID, ModbusProto::TcpUdp);
        let mut request = Vec::new();
        req.generate_get_inputs(InputRegister::Frequency.into(), 2, &mut request)
            .unwrap();
        let response = process_frame(&mut ctx, UNIT_ID, &request, ModbusProto::TcpUdp)
            .unwrap()
            .unwrap();
        let mut words = Vec::new();
        req.parse_u16(&response, &mut words).unwrap();
        assert_eq!(decode_f32([words[0], words[1]]), 49.95);
    }
}
