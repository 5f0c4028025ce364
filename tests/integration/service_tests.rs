//! ModuleService → Pipeline → ports, driven through mock adapters.

use crate::mock_hw::{MockBoard, RecordingSink};

use relaymod::adapters::fieldbus::{Request, ScriptedFieldBus};
use relaymod::app::commands::AppCommand;
use relaymod::app::events::AppEvent;
use relaymod::app::service::ModuleService;
use relaymod::app::shared::SharedModule;
use relaymod::config::ModuleConfig;
use relaymod::error::{ConfigError, Error, RegisterError};

fn make_service() -> (ModuleService, MockBoard, RecordingSink) {
    let mut svc = ModuleService::new(ModuleConfig::default());
    let mut hw = MockBoard::new();
    let mut sink = RecordingSink::new();
    svc.start(&mut hw, &mut sink);
    (svc, hw, sink)
}

// ── Startup ──────────────────────────────────────────────────

#[test]
fn start_drives_idle_levels_and_announces() {
    let (_svc, hw, sink) = make_service();

    // Nothing active, relays 0..3 inverted by the default XOR mask.
    assert_eq!(hw.last_output(), Some(0x000F));
    assert_eq!(hw.last_indicators(), Some(0x000F));
    assert!(matches!(
        sink.events.as_slice(),
        [AppEvent::Started { cycle_period_ms: 10 }]
    ));
}

// ── Cycle orchestration ──────────────────────────────────────

#[test]
fn held_input_reaches_the_relay_one_cycle_after_debounce() {
    let (mut svc, mut hw, mut sink) = make_service();
    sink.clear();
    hw.raw = 0x0001;

    for _ in 0..50 {
        svc.tick(&mut hw, &mut sink);
    }
    assert!(sink.events.is_empty(), "nothing may change before cycle 51");

    let report = svc.tick(&mut hw, &mut sink);
    assert_eq!(report.input.edges_rise, 0x0001);
    assert_eq!(report.out_states, 0);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::InputsChanged { .. })), 1);

    let report = svc.tick(&mut hw, &mut sink);
    assert_eq!(svc.cycle_count(), 52);
    assert_eq!(report.out_states, 0x0001);
    assert_eq!(hw.last_output(), Some(0x000E));
    assert!(sink.events.iter().any(|e| matches!(
        e,
        AppEvent::OutputsChanged { from: 0, to: 1, physical: 0x000E }
    )));
}

#[test]
fn indicators_follow_stable_states() {
    let (mut svc, mut hw, mut sink) = make_service();
    hw.raw = 0x0011;
    for _ in 0..51 {
        svc.tick(&mut hw, &mut sink);
    }
    assert_eq!(hw.last_indicators(), Some(0x0011 ^ 0x000F));
}

#[test]
fn run_if_due_paces_cycles_and_counts_overruns() {
    let (mut svc, mut hw, mut sink) = make_service();

    assert!(svc.run_if_due(0, &mut hw, &mut sink).is_some());
    assert!(svc.run_if_due(5, &mut hw, &mut sink).is_none());
    assert!(svc.run_if_due(10, &mut hw, &mut sink).is_some());
    // 25 ms late: two whole periods missed, still one cycle.
    assert!(svc.run_if_due(45, &mut hw, &mut sink).is_some());

    let t = svc.build_telemetry();
    assert_eq!(t.cycle_count, 3);
    assert_eq!(t.overruns, 2);
}

// ── Command handling ─────────────────────────────────────────

#[test]
fn rejected_register_write_is_reported_and_harmless() {
    let (mut svc, _hw, mut sink) = make_service();
    sink.clear();

    // Mixer channel 0 logic op, code 9 does not exist.
    let res = svc.handle_command(AppCommand::WriteRegister { addr: 210, value: 9 }, &mut sink);
    assert_eq!(res, Err(Error::Register(RegisterError::IllegalValue)));
    assert!(matches!(
        sink.events.as_slice(),
        [AppEvent::WriteRejected { addr: 210, error: RegisterError::IllegalValue }]
    ));
    assert_eq!(svc.pipeline().config(), ModuleConfig::default());
}

#[test]
fn write_to_unmapped_coil_is_illegal_address() {
    let (mut svc, _hw, mut sink) = make_service();
    let res = svc.handle_command(AppCommand::WriteCoil { addr: 17, value: true }, &mut sink);
    assert_eq!(res, Err(Error::Register(RegisterError::IllegalAddress)));
}

#[test]
fn invalid_config_is_rejected_whole() {
    let (mut svc, _hw, mut sink) = make_service();
    sink.clear();

    let mut cfg = ModuleConfig::default();
    cfg.inputs.tau[3] = 7;
    cfg.inputs.high_threshold = 90;
    cfg.inputs.low_threshold = 90;

    let res = svc.handle_command(AppCommand::ApplyConfig(Box::new(cfg)), &mut sink);
    assert!(matches!(res, Err(Error::Config(ConfigError::ValidationFailed(_)))));
    assert!(matches!(sink.events.as_slice(), [AppEvent::ConfigRejected(_)]));
    // The valid tau change must not have leaked through.
    assert_eq!(svc.pipeline().input().config().tau[3], 50);
}

#[test]
fn valid_config_is_applied() {
    let (mut svc, _hw, mut sink) = make_service();
    sink.clear();

    let mut cfg = ModuleConfig::default();
    cfg.cycle_period_ms = 20;
    cfg.outputs.xor_mask = 0;

    assert!(svc.handle_command(AppCommand::ApplyConfig(Box::new(cfg.clone())), &mut sink).is_ok());
    assert!(matches!(sink.events.as_slice(), [AppEvent::ConfigApplied]));
    assert_eq!(svc.pipeline().config(), cfg);
}

#[test]
fn factory_reset_restores_defaults() {
    let (mut svc, _hw, mut sink) = make_service();
    assert!(svc.handle_command(AppCommand::WriteRegister { addr: 100, value: 5 }, &mut sink).is_ok());
    assert_eq!(svc.pipeline().input().config().tau[0], 5);

    assert!(svc.handle_command(AppCommand::FactoryReset, &mut sink).is_ok());
    assert_eq!(svc.pipeline().config(), ModuleConfig::default());
}

#[test]
fn telemetry_and_diagnostics_on_request() {
    let (mut svc, mut hw, mut sink) = make_service();
    // One bounce on line 2, then held.
    for raw in [0x0004, 0x0000, 0x0004, 0x0004] {
        hw.raw = raw;
        svc.tick(&mut hw, &mut sink);
    }
    sink.clear();

    assert!(svc.handle_command(AppCommand::RequestTelemetry, &mut sink).is_ok());
    assert!(svc.handle_command(AppCommand::RequestDiagnostics, &mut sink).is_ok());

    match &sink.events[..] {
        [AppEvent::Telemetry(t), AppEvent::Diagnostics(d)] => {
            assert_eq!(t.cycle_count, 4);
            assert_eq!(t.input_states, 0);
            assert_eq!(d.lines.len(), 1);
            assert_eq!(d.lines[0].line, 2);
            assert!(d.lines[0].debounce_ongoing);
            assert_eq!(d.lines[0].raw_change_count, 3);
        }
        other => panic!("unexpected events: {:?}", other),
    }
}

// ── Field bus and shared access ──────────────────────────────

#[test]
fn bus_requests_land_between_cycles() {
    let (mut svc, mut hw, mut sink) = make_service();
    let mut bus = ScriptedFieldBus::new();
    assert!(bus.push(Request::WriteCoil(21, true)).is_ok());
    assert!(bus.push(Request::ReadInputRegister(2)).is_ok());

    assert_eq!(svc.serve_bus(&mut bus), 1);
    svc.tick(&mut hw, &mut sink);
    assert_eq!(svc.serve_bus(&mut bus), 1);
    assert_eq!(svc.serve_bus(&mut bus), 0);

    assert_eq!(bus.responses(), &[Ok(1), Ok(0x0002)]);
    assert_eq!(hw.last_output(), Some(0x000D));
}

#[test]
fn shared_module_serialises_cycles_and_writes() {
    let shared = SharedModule::new(ModuleService::new(ModuleConfig::default()));
    let mut hw = MockBoard::new();
    let mut sink = RecordingSink::new();

    shared.lock(|svc| {
        assert!(svc
            .handle_command(AppCommand::WriteRegister { addr: 1, value: 0x8000 }, &mut sink)
            .is_ok());
    });
    let out = shared.lock(|svc| svc.tick(&mut hw, &mut sink).out_states);
    assert_eq!(out, 0x8000);
    assert_eq!(shared.lock(|svc| svc.cycle_count()), 1);
}
