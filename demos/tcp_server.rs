//! Minimal Modbus TCP front end for the simulator.
//!
//! Serves the standard SDM630 tables on port 5020, logs every client write
//! to a holding register, and drifts the supply frequency in the background
//! so polled values visibly change.
//!
//! Try it with any Modbus client, e.g. reading two input registers at
//! address 1 (function 0x04) yields Phase 1 voltage as a big-endian float.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use rmodbus::ModbusProto;
use sdm630_sim::context::{MeterContext, SharedMeterContext, process_frame};
use sdm630_sim::sdm630::{HoldingRegister, InputRegister};
use sdm630_sim::service::InputRegisterService;
use strum::IntoEnumIterator;

const LISTEN_ADDR: &str = "0.0.0.0:5020";
const MODBUS_UNIT_ID: u8 = 1;
const REFRESH_INTERVAL_S: u64 = 5;

fn main() -> std::io::Result<()> {
    simple_logger::init_with_level(log::Level::Info).unwrap();

    let mut meter = MeterContext::sdm630().expect("static tables must load");

    // Audit every client-initiated configuration change.
    for register in HoldingRegister::iter() {
        meter
            .holding_mut()
            .set_change_hook(
                register,
                Box::new(|register, old, new| {
                    log::info!(
                        "holding register {} ({}) changed: {} -> {} {}",
                        register.address(),
                        register.description(),
                        old,
                        new,
                        register.unit()
                    );
                }),
            )
            .expect("hook targets a table register");
    }

    let context: SharedMeterContext = Arc::new(Mutex::new(meter));

    // Background measurement refresh, the program-side mutation path.
    let service = InputRegisterService::new(Arc::clone(&context));
    thread::spawn(move || {
        let mut frequency = 50.0f32;
        loop {
            thread::sleep(Duration::from_secs(REFRESH_INTERVAL_S));
            frequency = if frequency >= 50.05 { 49.95 } else { frequency + 0.01 };
            if let Err(err) = service.update(InputRegister::Frequency, frequency) {
                log::warn!("frequency refresh failed: {err}");
            }
        }
    });

    let listener = TcpListener::bind(LISTEN_ADDR)?;
    log::info!("SDM630 simulator listening on {LISTEN_ADDR}");
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let context = Arc::clone(&context);
                thread::spawn(move || serve_client(stream, context));
            }
            Err(err) => log::warn!("accept failed: {err}"),
        }
    }
    Ok(())
}

fn serve_client(mut stream: TcpStream, context: SharedMeterContext) {
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown".into());
    log::info!("client connected: {peer}");

    loop {
        // MBAP header: transaction id, protocol id, remaining length.
        let mut header = [0u8; 6];
        if stream.read_exact(&mut header).is_err() {
            break;
        }
        let length = u16::from_be_bytes([header[4], header[5]]) as usize;
        let mut body = vec![0u8; length];
        if stream.read_exact(&mut body).is_err() {
            break;
        }
        let mut request = header.to_vec();
        request.extend_from_slice(&body);

        let result = {
            let mut meter = context.lock().unwrap();
            process_frame(&mut meter, MODBUS_UNIT_ID, &request, ModbusProto::TcpUdp)
        };
        match result {
            Ok(Some(response)) => {
                if stream.write_all(&response).is_err() {
                    break;
                }
            }
            Ok(None) => {}
            Err(err) => {
                log::warn!("bad frame from {peer}: {err}");
                break;
            }
        }
    }
    log::info!("client disconnected: {peer}");
}
