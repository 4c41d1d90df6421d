//! Inbound update seam for host platforms.
//!
//! A host event source (a periodic measurement task, an automation bus)
//! pushes new measurement values through this service; it has no knowledge
//! of the host's event API, it just commits into the input bank under the
//! shared context lock.

use crate::context::SharedMeterContext;
use crate::error::Result;

pub struct InputRegisterService {
    context: SharedMeterContext,
}

impl InputRegisterService {
    pub fn new(context: SharedMeterContext) -> Self {
        Self { context }
    }

    /// Commit an externally produced value into the input register anchored
    /// at `address`. Fails with `RegisterNotFound` on an unknown address.
    pub fn update(&self, address: impl Into<u16>, value: f32) -> Result<()> {
        self.context
            .lock()
            .unwrap()
            .input_mut()
            .set_float(address.into(), value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_f32;
    use crate::context::MeterContext;
    use crate::error::Error;
    use crate::sdm630::InputRegister;
    use std::sync::{Arc, Mutex};

    #[test]
    fn update_reaches_register_and_words() {
        let context = Arc::new(Mutex::new(MeterContext::sdm630().unwrap()));
        let service = InputRegisterService::new(Arc::clone(&context));

        service.update(InputRegister::Phase1Voltage, 235.0).unwrap();

        let ctx = context.lock().unwrap();
        assert_eq!(ctx.input().get_float(InputRegister::Phase1Voltage).unwrap(), 235.0);
        assert_eq!(
            ctx.input()
                .read_words(InputRegister::Phase1Voltage.into(), 2)
                .unwrap(),
            encode_f32(235.0).to_vec()
        );
    }

    #[test]
    fn unknown_address_is_rejected() {
        let context = Arc::new(Mutex::new(MeterContext::sdm630().unwrap()));
        let service = InputRegisterService::new(context);
        assert!(matches!(
            service.update(999u16, 1.0),
            Err(Error::RegisterNotFound { address: 999 })
        ));
    }
}
