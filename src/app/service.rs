//! Application service — the hexagonal core.
//!
//! [`ModuleService`] owns the [`Pipeline`] and the cycle clock.  All I/O
//! flows through port traits injected at call sites, making the entire
//! service testable with mock adapters.
//!
//! ```text
//!   InputPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                 │     ModuleService      │
//!  OutputPort ◀── │ Input · Mixer · Output │ ◀── AppCommand / FieldBusPort
//!                 └────────────────────────┘
//! ```

use log::{info, warn};

use crate::config::ModuleConfig;
use crate::cycle::CycleClock;
use crate::diagnostics::DiagnosticsReport;
use crate::error::Error;
use crate::pipeline::{CycleReport, Pipeline};
use crate::registers::DataModel;

use super::commands::AppCommand;
use super::events::{AppEvent, TelemetryData};
use super::ports::{EventSink, FieldBusPort, InputPort, OutputPort};

pub struct ModuleService {
    pipeline: Pipeline,
    clock: CycleClock,
}

impl ModuleService {
    pub fn new(config: ModuleConfig) -> Self {
        let clock = CycleClock::new(config.cycle_period_ms);
        Self {
            pipeline: Pipeline::new(config),
            clock,
        }
    }

    /// Announce startup and drive the relays to their idle level.
    pub fn start(&mut self, hw: &mut impl OutputPort, sink: &mut impl EventSink) {
        hw.write_outputs(self.pipeline.output().physical_bits());
        hw.write_indicators(self.pipeline.input().indicator_bits());
        let cycle_period_ms = self.pipeline.cycle_period_ms();
        sink.emit(&AppEvent::Started { cycle_period_ms });
        info!("ModuleService started, cycle period {} ms", cycle_period_ms);
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one cycle: read inputs → pipeline → relays and indicators.
    ///
    /// One board adapter serves both [`InputPort`] and [`OutputPort`], so
    /// the whole cycle runs against a single `&mut`.
    pub fn tick(
        &mut self,
        hw: &mut (impl InputPort + OutputPort),
        sink: &mut impl EventSink,
    ) -> CycleReport {
        let prev_out = self.pipeline.output().out_states();
        let raw = hw.read_inputs();
        let report = self.pipeline.run_cycle(raw);

        hw.write_outputs(report.physical);
        hw.write_indicators(report.indicators);

        if report.input.edges_any != 0 {
            sink.emit(&AppEvent::InputsChanged {
                states: report.input.states,
                rise: report.input.edges_rise,
                fall: report.input.edges_fall,
            });
        }
        if report.out_states != prev_out {
            sink.emit(&AppEvent::OutputsChanged {
                from: prev_out,
                to: report.out_states,
                physical: report.physical,
            });
        }
        report
    }

    /// Run a cycle if one is due at `now_ms`.
    pub fn run_if_due(
        &mut self,
        now_ms: u64,
        hw: &mut (impl InputPort + OutputPort),
        sink: &mut impl EventSink,
    ) -> Option<CycleReport> {
        self.clock.poll(now_ms).then(|| self.tick(hw, sink))
    }

    /// Let the field-bus transport serve its pending requests.
    pub fn serve_bus(&mut self, bus: &mut impl FieldBusPort) -> usize {
        bus.poll(&mut self.pipeline)
    }

    // ── Command handling ──────────────────────────────────────

    /// Execute an external command.  Rejections are also reported through
    /// `sink`; the pipeline is left unchanged in that case.
    pub fn handle_command(&mut self, cmd: AppCommand, sink: &mut impl EventSink) -> Result<(), Error> {
        match cmd {
            AppCommand::WriteCoil { addr, value } => {
                self.pipeline.write_coil(addr, value).map_err(|error| {
                    sink.emit(&AppEvent::WriteRejected { addr, error });
                    Error::from(error)
                })
            }
            AppCommand::WriteRegister { addr, value } => self
                .pipeline
                .write_holding_register(addr, value)
                .map_err(|error| {
                    sink.emit(&AppEvent::WriteRejected { addr, error });
                    Error::from(error)
                }),
            AppCommand::ApplyConfig(config) => self.apply_config(*config, sink),
            AppCommand::FactoryReset => {
                info!("factory reset requested");
                self.apply_config(ModuleConfig::default(), sink)
            }
            AppCommand::RequestTelemetry => {
                sink.emit(&AppEvent::Telemetry(self.build_telemetry()));
                Ok(())
            }
            AppCommand::RequestDiagnostics => {
                sink.emit(&AppEvent::Diagnostics(self.diagnostics()));
                Ok(())
            }
        }
    }

    fn apply_config(&mut self, config: ModuleConfig, sink: &mut impl EventSink) -> Result<(), Error> {
        let period = config.cycle_period_ms;
        match self.pipeline.apply_config(config) {
            Ok(()) => {
                self.clock.set_period(period);
                sink.emit(&AppEvent::ConfigApplied);
                Ok(())
            }
            Err(e) => {
                warn!("configuration rejected: {}", e);
                sink.emit(&AppEvent::ConfigRejected(e));
                Err(e.into())
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn build_telemetry(&self) -> TelemetryData {
        TelemetryData {
            input_states: self.pipeline.input().snapshot().states,
            mixer_states: self.pipeline.mixer().snapshot().states,
            out_states: self.pipeline.output().out_states(),
            physical: self.pipeline.output().physical_bits(),
            cycle_count: self.pipeline.cycle_count(),
            overruns: self.clock.overruns(),
        }
    }

    pub fn diagnostics(&self) -> DiagnosticsReport {
        DiagnosticsReport::collect(&self.pipeline, self.clock.overruns())
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Direct access for transports that serve the register map themselves.
    pub fn pipeline_mut(&mut self) -> &mut Pipeline {
        &mut self.pipeline
    }

    pub fn cycle_count(&self) -> u32 {
        self.pipeline.cycle_count()
    }
}
