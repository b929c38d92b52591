//! Integration tests for eb-sim.

use approx::assert_relative_eq;
use chrono::{TimeDelta, TimeZone, Utc};
use eb_appliances::{
    Boiler, BoilerControl, BoilerPort, BoilerState, Source, SourcePort, WaterTank, WaterTankPort,
    WaterTankState,
};
use eb_core::SimulationTime;
use eb_network::{Handle, Network, NetworkBuilder, NetworkControl, NetworkError, NetworkState};
use eb_sim::{Controller, FixedControl, NoControl, SimError, SimOptions, SimResult, run_sim};

fn time(step_seconds: i64) -> SimulationTime {
    SimulationTime::new(
        TimeDelta::seconds(step_seconds),
        Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
    )
}

fn source_into_boiler() -> (Network, Handle<Boiler>) {
    // Build: source(1 l/s, 100 C) -> boiler exchange
    let mut builder = NetworkBuilder::new();
    let source = builder.add("source", Source::new(1.0, 100.0));
    let boiler = builder.add("boiler", Boiler::new(10.0, 0.0, 0.0, 1.0, 1.0).unwrap());
    builder
        .connect(source)
        .at(SourcePort::Out)
        .to(boiler)
        .at(BoilerPort::HeatExchangeIn);
    (builder.build().unwrap(), boiler)
}

#[test]
fn boiler_heats_towards_source_temperature() {
    let (network, boiler) = source_into_boiler();
    let initial = network
        .define_state(boiler)
        .value(BoilerState::new(0.0, 0.0))
        .build(time(10))
        .unwrap();
    let mut controller = FixedControl(
        NetworkControl::builder()
            .control(boiler)
            .value(BoilerControl { heater_on: false })
            .build(),
    );

    let one = run_sim(
        &network,
        initial.clone(),
        &mut controller,
        &SimOptions {
            steps: 1,
            record_every: 1,
        },
    )
    .unwrap();
    assert_relative_eq!(one.last().unwrap().appliance(boiler).unwrap().temperature, 50.0);

    let long = run_sim(&network, initial, &mut controller, &SimOptions::default()).unwrap();
    let last = long.last().unwrap();
    assert_relative_eq!(last.appliance(boiler).unwrap().temperature, 100.0, epsilon = 1e-6);
    assert_eq!(last.time().step, 1_000);
    assert_eq!(
        *long.time.last().unwrap(),
        Utc.with_ymd_and_hms(2024, 5, 1, 2, 46, 40).unwrap()
    );
}

#[test]
fn decimation_keeps_first_and_last() {
    let (network, boiler) = source_into_boiler();
    let initial = network
        .define_state(boiler)
        .value(BoilerState::new(0.0, 0.0))
        .build(time(1))
        .unwrap();
    let record = run_sim(
        &network,
        initial,
        &mut NoControl,
        &SimOptions {
            steps: 10,
            record_every: 4,
        },
    )
    .unwrap();
    assert_eq!(record.steps, vec![0, 4, 8, 10]);
    assert_eq!(record.states.len(), record.time.len());
}

#[test]
fn zero_record_every_is_rejected() {
    let (network, boiler) = source_into_boiler();
    let initial = network
        .define_state(boiler)
        .value(BoilerState::new(0.0, 0.0))
        .build(time(1))
        .unwrap();
    let err = run_sim(
        &network,
        initial,
        &mut NoControl,
        &SimOptions {
            steps: 1,
            record_every: 0,
        },
    )
    .unwrap_err();
    assert!(matches!(err, SimError::InvalidArg { .. }));
}

#[test]
fn failing_step_reports_index_and_last_good_state() {
    // Build: source(1 l/s) -> tank(10 l); 10 % full overflows after nine steps
    let mut builder = NetworkBuilder::new();
    let source = builder.add("source", Source::new(1.0, 20.0));
    let tank = builder.add("tank", WaterTank::new(10.0).unwrap());
    builder
        .connect(source)
        .at(SourcePort::Out)
        .to(tank)
        .at(WaterTankPort::In0);
    let network = builder.build().unwrap();
    let initial = network
        .define_state(tank)
        .value(WaterTankState { fill_ratio: 0.1 })
        .build(time(1))
        .unwrap();

    let err = run_sim(&network, initial, &mut NoControl, &SimOptions::default()).unwrap_err();
    match err {
        SimError::Step {
            step,
            state,
            source: NetworkError::Appliance { name, .. },
        } => {
            assert_eq!(step, 9);
            assert_eq!(state.time().step, 9);
            assert_relative_eq!(state.appliance(tank).unwrap().fill_ratio, 1.0);
            assert_eq!(name, "tank");
        }
        other => panic!("expected a step failure, got {other:?}"),
    }
}

struct Counting(u64);

impl Controller for Counting {
    fn control(&mut self, _network: &Network, state: &NetworkState) -> SimResult<NetworkControl> {
        assert_eq!(state.time().step, self.0);
        self.0 += 1;
        Ok(NetworkControl::default())
    }
}

#[test]
fn controller_sees_every_state_in_order() {
    let (network, boiler) = source_into_boiler();
    let initial = network
        .define_state(boiler)
        .value(BoilerState::new(0.0, 0.0))
        .build(time(1))
        .unwrap();
    let mut controller = Counting(0);
    run_sim(
        &network,
        initial,
        &mut controller,
        &SimOptions {
            steps: 25,
            record_every: 5,
        },
    )
    .unwrap();
    assert_eq!(controller.0, 25);
}
