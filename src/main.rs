//! RelayMod Firmware — Main Entry Point
//!
//! Hexagonal architecture with a fixed-period signal cycle.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  BoardIo                LogEventSink      NullFieldBus         │
//! │  (InputPort+OutputPort) (EventSink)       (FieldBusPort)       │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            ModuleService (pure logic)                  │    │
//! │  │  Input stage · Mixer stage · Output stage · Registers  │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  SharedModule (critical-section mutex) · CycleClock            │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{AnyIOPin, Input, Output, PinDriver, Pull};
use heapless::Vec;
use log::{info, warn};

use relaymod::adapters::fieldbus::NullFieldBus;
use relaymod::adapters::hardware::BoardIo;
use relaymod::adapters::log_sink::LogEventSink;
use relaymod::app::commands::AppCommand;
use relaymod::app::service::ModuleService;
use relaymod::app::shared::SharedModule;
use relaymod::config::ModuleConfig;
use relaymod::drivers::input_bank::InputBank;
use relaymod::drivers::relay_bank::RelayBank;
use relaymod::error::Error;
use relaymod::pins;
use relaymod::signal::CHANNELS;

type InPin = PinDriver<'static, AnyIOPin, Input>;
type OutPin = PinDriver<'static, AnyIOPin, Output>;

/// Cycles between two telemetry lines on the console.
const TELEMETRY_EVERY_CYCLES: u32 = 1000;

// ── Pin bank construction ─────────────────────────────────────

fn any_pin(gpio: i32) -> AnyIOPin {
    // SAFETY: every GPIO number in `pins` is claimed exactly once, here,
    // and no other driver in this firmware touches them.
    unsafe { AnyIOPin::new(gpio) }
}

fn input_pins() -> Result<Vec<InPin, CHANNELS>> {
    let mut bank = Vec::new();
    for &gpio in &pins::INPUT_GPIOS {
        let mut pin = PinDriver::input(any_pin(gpio))?;
        pin.set_pull(Pull::Up)?;
        bank.push(pin)
            .map_err(|_| Error::Init("more input GPIOs than channels"))?;
    }
    Ok(bank)
}

fn output_pins(gpios: &[i32]) -> Result<Vec<OutPin, CHANNELS>> {
    let mut bank = Vec::new();
    for &gpio in gpios {
        let pin = PinDriver::output(any_pin(gpio))?;
        bank.push(pin)
            .map_err(|_| Error::Init("more output GPIOs than channels"))?;
    }
    Ok(bank)
}

fn uptime_ms() -> u64 {
    // SAFETY: plain read of the monotonic high-resolution timer.
    (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1000
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  RelayMod v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Initialise GPIO banks ──────────────────────────────
    let banks = input_pins().and_then(|i| {
        let relays = output_pins(&pins::RELAY_GPIOS)?;
        let leds = output_pins(&pins::LED_GPIOS)?;
        Ok((i, relays, leds))
    });
    let (inputs, relays, leds) = match banks {
        Ok(b) => b,
        Err(e) => {
            // Without its pins the module cannot do anything useful.
            log::error!("GPIO init failed: {}, halting", e);
            #[allow(clippy::empty_loop)]
            loop {}
        }
    };
    let mut hw = BoardIo::new(
        InputBank::new(inputs, pins::INPUT_ACTIVE_LOW_MASK),
        RelayBank::new(relays),
        RelayBank::new(leds),
    );

    // ── 3. Construct adapters ─────────────────────────────────
    // The RS-485 transport is not wired on this board revision yet.
    let mut bus = NullFieldBus;
    let mut log_sink = LogEventSink::new();

    // ── 4. Construct app service ──────────────────────────────
    // No persistent storage: every boot starts from factory defaults.
    let config = ModuleConfig::default();
    info!(
        "Config: slave={} baud={} cycle={}ms",
        config.bus.slave_id,
        config.bus.baudrate.bits_per_second(),
        config.cycle_period_ms
    );
    let module = SharedModule::new(ModuleService::new(config));
    module.lock(|svc| svc.start(&mut hw, &mut log_sink));

    info!("System ready. Entering cycle loop.");

    // ── 5. Cycle loop ─────────────────────────────────────────
    let mut last_telemetry: u32 = 0;
    loop {
        let now_ms = uptime_ms();

        let cycles = module.lock(|svc| {
            svc.run_if_due(now_ms, &mut hw, &mut log_sink);
            svc.cycle_count()
        });

        // Bus requests are served between cycles, never inside one.
        module.lock(|svc| svc.serve_bus(&mut bus));

        if cycles.wrapping_sub(last_telemetry) >= TELEMETRY_EVERY_CYCLES {
            last_telemetry = cycles;
            module.lock(|svc| {
                if let Err(e) = svc.handle_command(AppCommand::RequestTelemetry, &mut log_sink) {
                    warn!("telemetry failed: {}", e);
                }
            });
            let errors = hw.io_errors();
            if errors > 0 {
                warn!("GPIO errors so far: {}", errors);
            }
        }

        FreeRtos::delay_ms(1);
    }
}
