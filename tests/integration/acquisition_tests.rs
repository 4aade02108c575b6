//! Acquisition loop against mock bus, GPIO and delay.

use thermoclick::app::events::AppEvent;
use thermoclick::app::service::{AcquisitionLoop, RelayState, StopSignal};
use thermoclick::config::AcquisitionConfig;
use thermoclick::drivers::relay::RelayChannel;
use thermoclick::error::{BusError, Error, GpioError, RelayError, ResolveError, SensorFault};
use thermoclick::pins::{MikroBusSocket, PinRole};
use thermoclick::sensors::max31855::TemperatureReading;

use crate::mock_hw::*;

type Loop = AcquisitionLoop<MockBus, MockGpio, FakeDelay>;

fn started(bus: MockBus, gpio: MockGpio, delay: FakeDelay) -> (Loop, RecordingSink) {
    let mut sink = RecordingSink::new();
    let mut acq = AcquisitionLoop::new(bus, gpio, delay, AcquisitionConfig::default());
    acq.start(&mut sink).unwrap();
    (acq, sink)
}

fn reference_reading() -> TemperatureReading {
    TemperatureReading {
        thermocouple_quarters: 498,
        internal_sixteenths: 136,
    }
}

// ── Start ─────────────────────────────────────────────────────

#[test]
fn start_selects_thermo_socket_and_announces() {
    let (acq, sink) = started(MockBus::new(), MockGpio::new(), FakeDelay::new());
    assert_eq!(acq.bus().init_calls, 1);
    assert_eq!(acq.bus().selected, vec![MikroBusSocket::One]);
    assert_eq!(
        sink.events,
        vec![AppEvent::Started {
            channels: 3,
            settle_ms: 1000
        }]
    );
}

#[test]
fn start_failure_on_select_releases_bus() {
    let mut bus = MockBus::new();
    bus.fail_select = true;
    let mut sink = RecordingSink::new();
    let mut acq = AcquisitionLoop::new(bus, MockGpio::new(), FakeDelay::new(), AcquisitionConfig::default());

    assert_eq!(acq.start(&mut sink), Err(Error::Bus(BusError::NoBusSelected)));
    assert_eq!(acq.bus().release_calls, 1);
    assert!(sink.events.is_empty());
}

#[test]
fn start_failure_on_init_is_reported() {
    let mut bus = MockBus::new();
    bus.fail_init = true;
    let mut sink = RecordingSink::new();
    let mut acq = AcquisitionLoop::new(bus, MockGpio::new(), FakeDelay::new(), AcquisitionConfig::default());

    assert!(acq.start(&mut sink).is_err());
    assert!(acq.bus().selected.is_empty());
    assert!(sink.events.is_empty());
}

// ── Phase sequencing ──────────────────────────────────────────

#[test]
fn one_cycle_switches_relays_in_plan_order() {
    let (mut acq, mut sink) = started(MockBus::new(), MockGpio::new(), FakeDelay::new());
    acq.run_cycle(&mut sink);

    assert_eq!(
        acq.gpio().writes(),
        vec![
            // Relay1: open everything else, then close.
            (RELAY2_PIN, false),
            (RELAY4_PIN, false),
            (RELAY1_PIN, true),
            // Relay2: open the previous one only.
            (RELAY1_PIN, false),
            (RELAY2_PIN, true),
            // Relay4
            (RELAY2_PIN, false),
            (RELAY4_PIN, true),
        ]
    );
    assert_eq!(acq.gpio().peak_high, 1);
    assert_eq!(acq.relay_state(), RelayState::Closed(RelayChannel::Relay4));
    assert_eq!(acq.cycles(), 1);
}

#[test]
fn every_write_is_preceded_by_init_and_output_direction() {
    use thermoclick::app::ports::PinDirection;

    let (mut acq, mut sink) = started(MockBus::new(), MockGpio::new(), FakeDelay::new());
    acq.run_phase(None, &mut sink);

    let calls = &acq.gpio().calls;
    assert_eq!(
        &calls[..3],
        &[
            GpioCall::Init(RELAY2_PIN),
            GpioCall::Direction(RELAY2_PIN, PinDirection::Output),
            GpioCall::Value(RELAY2_PIN, false),
        ]
    );
}

#[test]
fn settle_delay_precedes_every_read() {
    let (mut acq, mut sink) = started(MockBus::new(), MockGpio::new(), FakeDelay::new());
    acq.run_cycle(&mut sink);
    assert_eq!(acq.delay().delays_ms, vec![1000; 3]);
    assert_eq!(acq.bus().transfers, 3);
    assert_eq!(sink.reports().len(), 3);
}

#[test]
fn second_cycle_sweeps_again_from_first_channel() {
    let (mut acq, mut sink) = started(MockBus::new(), MockGpio::new(), FakeDelay::new());
    acq.run_cycle(&mut sink);
    let before = acq.gpio().writes().len();
    acq.run_phase(None, &mut sink);

    assert_eq!(
        &acq.gpio().writes()[before..],
        &[(RELAY2_PIN, false), (RELAY4_PIN, false), (RELAY1_PIN, true)]
    );
    assert_eq!(acq.gpio().peak_high, 1);
}

// ── Reports ───────────────────────────────────────────────────

#[test]
fn reports_carry_decoded_readings_and_faults() {
    let mut bus = MockBus::new();
    bus.push_frame(REFERENCE_FRAME);
    bus.push_frame(OPEN_CIRCUIT_FRAME);
    bus.push_frame([0x00, 0x01, 0x00, 0x04]);
    let (mut acq, mut sink) = started(bus, MockGpio::new(), FakeDelay::new());
    acq.run_cycle(&mut sink);

    assert_eq!(
        sink.reports(),
        vec![
            &AppEvent::Report {
                channel: RelayChannel::Relay1,
                outcome: Ok(reference_reading()),
            },
            &AppEvent::Report {
                channel: RelayChannel::Relay2,
                outcome: Err(Error::Sensor(SensorFault::OpenCircuit)),
            },
            &AppEvent::Report {
                channel: RelayChannel::Relay4,
                outcome: Err(Error::Sensor(SensorFault::ShortToVcc)),
            },
        ]
    );
}

#[test]
fn bus_errors_are_reported_and_loop_continues() {
    let mut bus = MockBus::new();
    bus.push_error(BusError::TransferFailed);
    bus.responses.push_back(Ok(vec![0x07, 0xC8]));
    let (mut acq, mut sink) = started(bus, MockGpio::new(), FakeDelay::new());
    acq.run_cycle(&mut sink);

    assert_eq!(
        sink.reports(),
        vec![
            &AppEvent::Report {
                channel: RelayChannel::Relay1,
                outcome: Err(Error::Bus(BusError::TransferFailed)),
            },
            &AppEvent::Report {
                channel: RelayChannel::Relay2,
                outcome: Err(Error::Bus(BusError::ShortRead {
                    expected: 4,
                    got: 2
                })),
            },
            &AppEvent::Report {
                channel: RelayChannel::Relay4,
                outcome: Ok(reference_reading()),
            },
        ]
    );
    assert_eq!(acq.cycles(), 1);
}

// ── Relay failures ────────────────────────────────────────────
//
// Write attempts for the default plan with no failures:
//   A: 0 R2 off, 1 R4 off, 2 R1 on
//   B: 3 R1 off, 4 R2 on
//   C: 5 R2 off, 6 R4 on

fn relay_error(pin: u8) -> Result<TemperatureReading, Error> {
    Err(Error::Relay(RelayError::Gpio(GpioError::WriteFailed(pin))))
}

#[test]
fn enable_failure_is_reported_without_a_read() {
    let gpio = MockGpio::failing_attempts(&[2]);
    let (mut acq, mut sink) = started(MockBus::new(), gpio, FakeDelay::new());
    acq.run_phase(None, &mut sink);

    assert_eq!(
        sink.reports(),
        vec![&AppEvent::Report {
            channel: RelayChannel::Relay1,
            outcome: relay_error(RELAY1_PIN),
        }]
    );
    assert_eq!(acq.bus().transfers, 0);
    assert!(acq.delay().delays_ms.is_empty());
    // The recovery sweep succeeded.
    assert_eq!(acq.relay_state(), RelayState::AllOpen);
    assert_eq!(acq.gpio().high_count(), 0);

    // Next phase reads normally.
    acq.run_phase(None, &mut sink);
    assert_eq!(acq.bus().transfers, 1);
    assert!(acq.gpio().is_high(RELAY2_PIN));
    assert_eq!(acq.gpio().peak_high, 1);
}

#[test]
fn sweep_failure_skips_the_enable() {
    let gpio = MockGpio::failing_attempts(&[0]);
    let (mut acq, mut sink) = started(MockBus::new(), gpio, FakeDelay::new());
    acq.run_phase(None, &mut sink);

    assert_eq!(
        sink.reports(),
        vec![&AppEvent::Report {
            channel: RelayChannel::Relay1,
            outcome: relay_error(RELAY2_PIN),
        }]
    );
    assert!(!acq.gpio().is_high(RELAY1_PIN));
    assert_eq!(acq.relay_state(), RelayState::Unknown);
    assert_eq!(acq.bus().transfers, 0);

    // Unknown state forces a full sweep before Relay2 closes.
    let before = acq.gpio().writes().len();
    acq.run_phase(None, &mut sink);
    assert_eq!(
        &acq.gpio().writes()[before..],
        &[(RELAY1_PIN, false), (RELAY4_PIN, false), (RELAY2_PIN, true)]
    );
    assert_eq!(acq.bus().transfers, 1);
}

#[test]
fn disable_failure_leaves_state_unknown_until_next_sweep() {
    let gpio = MockGpio::failing_attempts(&[3]);
    let (mut acq, mut sink) = started(MockBus::new(), gpio, FakeDelay::new());
    acq.run_cycle(&mut sink);

    assert_eq!(
        sink.reports()[1],
        &AppEvent::Report {
            channel: RelayChannel::Relay2,
            outcome: relay_error(RELAY1_PIN),
        }
    );
    // Phase C swept every other plan relay before closing Relay4.
    assert_eq!(
        &acq.gpio().writes()[3..],
        &[(RELAY1_PIN, false), (RELAY2_PIN, false), (RELAY4_PIN, true)]
    );
    assert_eq!(acq.gpio().peak_high, 1);
    assert_eq!(acq.relay_state(), RelayState::Closed(RelayChannel::Relay4));
    assert_eq!(acq.bus().transfers, 2);
    assert_eq!(sink.reports().len(), 3);
}

#[test]
fn reserved_channel_in_plan_is_reported_per_phase() {
    let mut config = AcquisitionConfig::default();
    config.channel_plan.clear();
    config.channel_plan.push(RelayChannel::Relay3).unwrap();
    let mut sink = RecordingSink::new();
    let mut acq = AcquisitionLoop::new(MockBus::new(), MockGpio::new(), FakeDelay::new(), config);
    acq.start(&mut sink).unwrap();
    acq.run_phase(None, &mut sink);

    assert_eq!(
        sink.reports(),
        vec![&AppEvent::Report {
            channel: RelayChannel::Relay3,
            outcome: Err(Error::Relay(RelayError::Resolve(ResolveError::ReservedChannel))),
        }]
    );
    assert_eq!(acq.bus().transfers, 0);
}

// ── Stop / shutdown ───────────────────────────────────────────

#[test]
fn stop_during_settle_skips_read_and_shuts_down() {
    let stop = StopSignal::new();
    let delay = FakeDelay::stopping_on(2, stop.clone());
    let (mut acq, mut sink) = started(MockBus::new(), MockGpio::new(), delay);
    acq.run(&stop, &mut sink);

    assert_eq!(sink.reports().len(), 1);
    assert_eq!(acq.bus().transfers, 1);
    assert_eq!(acq.bus().release_calls, 1);
    assert_eq!(acq.gpio().high_count(), 0);
    assert_eq!(acq.relay_state(), RelayState::AllOpen);
    assert_eq!(sink.events.last(), Some(&AppEvent::Stopped { cycles: 0 }));
}

#[test]
fn stop_before_run_only_shuts_down() {
    let stop = StopSignal::new();
    stop.request_stop();
    let (mut acq, mut sink) = started(MockBus::new(), MockGpio::new(), FakeDelay::new());
    acq.run(&stop, &mut sink);

    assert!(sink.reports().is_empty());
    assert_eq!(acq.bus().release_calls, 1);
    assert_eq!(
        acq.gpio().writes(),
        vec![(RELAY1_PIN, false), (RELAY2_PIN, false), (RELAY4_PIN, false)]
    );
}

#[test]
fn shutdown_twice_releases_once() {
    let (mut acq, mut sink) = started(MockBus::new(), MockGpio::new(), FakeDelay::new());
    acq.run_cycle(&mut sink);
    acq.shutdown(&mut sink);
    acq.shutdown(&mut sink);

    assert_eq!(acq.bus().release_calls, 1);
    let stopped = sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::Stopped { .. }))
        .count();
    assert_eq!(stopped, 1);
    assert_eq!(sink.events.last(), Some(&AppEvent::Stopped { cycles: 1 }));
}

#[test]
fn stop_after_full_cycles_counts_them() {
    let stop = StopSignal::new();
    // Six phases complete, the seventh settle raises stop.
    let delay = FakeDelay::stopping_on(7, stop.clone());
    let (mut acq, mut sink) = started(MockBus::new(), MockGpio::new(), delay);
    acq.run(&stop, &mut sink);

    assert_eq!(sink.reports().len(), 6);
    assert_eq!(acq.gpio().peak_high, 1);
    assert_eq!(sink.events.last(), Some(&AppEvent::Stopped { cycles: 2 }));
}

#[test]
fn init_failure_skips_the_read() {
    let mut gpio = MockGpio::new();
    gpio.fail_init = Some(RELAY1_PIN);
    let (mut acq, mut sink) = started(MockBus::new(), gpio, FakeDelay::new());
    acq.run_phase(None, &mut sink);

    assert_eq!(
        sink.reports(),
        vec![&AppEvent::Report {
            channel: RelayChannel::Relay1,
            outcome: Err(Error::Relay(RelayError::Gpio(GpioError::InitFailed(
                RELAY1_PIN
            )))),
        }]
    );
    assert_eq!(acq.bus().transfers, 0);
    assert!(acq.delay().delays_ms.is_empty());
    assert!(!acq.gpio().is_high(RELAY1_PIN));
}

#[test]
fn lookup_failure_degrades_each_phase_only() {
    let mut gpio = MockGpio::new();
    gpio.fail_lookup = true;
    let (mut acq, mut sink) = started(MockBus::new(), gpio, FakeDelay::new());
    acq.run_cycle(&mut sink);

    // Phase A fails on its first sweep target, Relay2 (RST role).
    assert_eq!(
        sink.reports()[0],
        &AppEvent::Report {
            channel: RelayChannel::Relay1,
            outcome: Err(Error::Relay(RelayError::Resolve(
                ResolveError::PinLookupFailed(GpioError::LookupFailed {
                    socket: MikroBusSocket::Two,
                    role: PinRole::Reset,
                })
            ))),
        }
    );
    assert_eq!(sink.reports().len(), 3);
    assert_eq!(acq.bus().transfers, 0);
    assert_eq!(acq.cycles(), 1);
}

// ── Empty plan ────────────────────────────────────────────────

fn empty_plan_loop() -> (Loop, RecordingSink) {
    let mut config = AcquisitionConfig::default();
    config.channel_plan.clear();
    let mut sink = RecordingSink::new();
    let mut acq = AcquisitionLoop::new(MockBus::new(), MockGpio::new(), FakeDelay::new(), config);
    acq.start(&mut sink).unwrap();
    (acq, sink)
}

#[test]
fn empty_plan_phase_is_a_no_op() {
    let (mut acq, mut sink) = empty_plan_loop();
    assert!(acq.config().channel_plan.is_empty());
    acq.run_phase(None, &mut sink);
    acq.run_cycle(&mut sink);

    assert!(sink.reports().is_empty());
    assert!(acq.gpio().calls.is_empty());
    assert_eq!(acq.bus().transfers, 0);
    assert_eq!(acq.cycles(), 0);
}

#[test]
fn empty_plan_run_shuts_down_without_a_stop() {
    let (mut acq, mut sink) = empty_plan_loop();
    acq.run(&StopSignal::new(), &mut sink);

    assert_eq!(acq.bus().release_calls, 1);
    assert_eq!(sink.events.last(), Some(&AppEvent::Stopped { cycles: 0 }));
}

#[test]
fn pass_cut_short_by_stop_is_not_counted() {
    let stop = StopSignal::new();
    // The third settle is the last phase of the first pass.
    let delay = FakeDelay::stopping_on(3, stop.clone());
    let (mut acq, mut sink) = started(MockBus::new(), MockGpio::new(), delay);
    acq.run(&stop, &mut sink);

    assert_eq!(sink.reports().len(), 2);
    assert_eq!(acq.cycles(), 0);
    assert_eq!(sink.events.last(), Some(&AppEvent::Stopped { cycles: 0 }));
}
