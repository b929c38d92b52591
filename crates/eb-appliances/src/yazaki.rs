//! Yazaki absorption chiller driven by hot water.
//!
//! Chill power and heat input come from the manufacturer's tables, indexed by
//! the cooling water inlet temperature and the hot water inlet temperature.
//! Values outside the tables are extrapolated linearly from the nearest cell.

use eb_core::SimulationTime;
use eb_core::units::{Celsius, JoulePerLiterKelvin, Watt};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::common::is_flowing;
use crate::error::ApplianceResult;
use crate::traits::{Appliance, ConnectionState, NoState, PortMap, ports};

ports!(YazakiPort {
    HotIn => "hot_in",
    HotOut => "hot_out",
    ChilledIn => "chilled_in",
    ChilledOut => "chilled_out",
    CoolingIn => "cooling_in",
    CoolingOut => "cooling_out",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct YazakiControl {
    pub on: bool,
}

const REF_TEMPS_COOLING: [Celsius; 4] = [27.0, 29.5, 31.0, 32.0];
const REF_TEMPS_HOT: [Celsius; 4] = [70.0, 80.0, 87.0, 95.0];

// kW, rows by cooling temperature, columns by hot temperature
const COOLING_CAPACITY: [[f64; 4]; 4] = [
    [10.0, 16.5, 21.0, 22.5],
    [7.0, 14.0, 18.0, 21.0],
    [6.0, 13.0, 17.5, 19.5],
    [4.0, 10.0, 15.0, 16.0],
];
const HEAT_INPUT: [[f64; 4]; 4] = [
    [12.5, 10.0, 9.0, 7.0],
    [21.0, 18.0, 17.0, 14.0],
    [30.0, 26.0, 25.0, 22.5],
    [37.0, 34.0, 32.0, 27.5],
];

/// Hot water inlet range the tables are valid for (exclusive).
pub const HOT_INPUT_RANGE: (Celsius, Celsius) = (REF_TEMPS_HOT[0], REF_TEMPS_HOT[3]);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Yazaki {
    pub specific_heat_hot: JoulePerLiterKelvin,
    pub specific_heat_cooling: JoulePerLiterKelvin,
    pub specific_heat_chilled: JoulePerLiterKelvin,
}

impl Yazaki {
    pub fn new(
        specific_heat_hot: JoulePerLiterKelvin,
        specific_heat_cooling: JoulePerLiterKelvin,
        specific_heat_chilled: JoulePerLiterKelvin,
    ) -> Self {
        Self {
            specific_heat_hot,
            specific_heat_cooling,
            specific_heat_chilled,
        }
    }

    /// Chill power in W at the given inlet temperatures.
    pub fn cooling_capacity(cooling_in: Celsius, hot_in: Celsius) -> Watt {
        1000.0 * interpolate(&COOLING_CAPACITY, cooling_in, hot_in)
    }

    /// Heat drawn from the hot circuit in W at the given inlet temperatures.
    pub fn heat_input(cooling_in: Celsius, hot_in: Celsius) -> Watt {
        1000.0 * interpolate(&HEAT_INPUT, cooling_in, hot_in)
    }
}

impl Appliance for Yazaki {
    type State = NoState;
    type Control = YazakiControl;
    type Port = YazakiPort;

    /// Passes every circuit through unchanged while off, while any circuit is
    /// missing or stagnant, or while the hot inlet is outside the table range.
    fn simulate(
        &self,
        inputs: &PortMap<YazakiPort>,
        _previous: &NoState,
        control: Option<&YazakiControl>,
        _time: &SimulationTime,
    ) -> ApplianceResult<(NoState, PortMap<YazakiPort>)> {
        let hot = inputs.get(&YazakiPort::HotIn).copied();
        let cooling = inputs.get(&YazakiPort::CoolingIn).copied();
        let chilled = inputs.get(&YazakiPort::ChilledIn).copied();
        let on = control.is_some_and(|c| c.on);

        let (Some(hot), Some(cooling), Some(chilled)) = (hot, cooling, chilled) else {
            return Ok((NoState, pass_through(hot, cooling, chilled)));
        };
        if !on || ![hot.flow, cooling.flow, chilled.flow].into_iter().all(is_flowing) {
            return Ok((NoState, pass_through(Some(hot), Some(cooling), Some(chilled))));
        }

        let (low, high) = HOT_INPUT_RANGE;
        if !(low < hot.temperature && hot.temperature < high) {
            warn!(
                hot_in = hot.temperature,
                "Yazaki hot inlet outside of reference temperatures, passing circuits through"
            );
            return Ok((NoState, pass_through(Some(hot), Some(cooling), Some(chilled))));
        }

        let chill = Self::cooling_capacity(cooling.temperature, hot.temperature);
        let heat = Self::heat_input(cooling.temperature, hot.temperature);

        let hot_out = hot.temperature - heat / (hot.flow * self.specific_heat_hot);
        let cooling_out =
            cooling.temperature + (heat + chill) / (cooling.flow * self.specific_heat_cooling);
        let chilled_out = chilled.temperature - chill / (chilled.flow * self.specific_heat_chilled);

        Ok((
            NoState,
            PortMap::from([
                (YazakiPort::HotOut, hot.with_temperature(hot_out)),
                (YazakiPort::CoolingOut, cooling.with_temperature(cooling_out)),
                (YazakiPort::ChilledOut, chilled.with_temperature(chilled_out)),
            ]),
        ))
    }
}

fn pass_through(
    hot: Option<ConnectionState>,
    cooling: Option<ConnectionState>,
    chilled: Option<ConnectionState>,
) -> PortMap<YazakiPort> {
    [
        (YazakiPort::HotOut, hot),
        (YazakiPort::CoolingOut, cooling),
        (YazakiPort::ChilledOut, chilled),
    ]
    .into_iter()
    .filter_map(|(port, state)| state.map(|s| (port, s)))
    .collect()
}

/// Locate `x` on `axis`: the lower cell index and the (possibly out of
/// `[0, 1]`) fraction across that cell.
fn cell(axis: &[f64; 4], x: f64) -> (usize, f64) {
    let i = axis
        .windows(2)
        .position(|w| x < w[1])
        .unwrap_or(axis.len() - 2);
    (i, (x - axis[i]) / (axis[i + 1] - axis[i]))
}

fn interpolate(table: &[[f64; 4]; 4], cooling_in: Celsius, hot_in: Celsius) -> f64 {
    let (i, u) = cell(&REF_TEMPS_COOLING, cooling_in);
    let (j, v) = cell(&REF_TEMPS_HOT, hot_in);
    let low = table[i][j] * (1.0 - v) + table[i][j + 1] * v;
    let high = table[i + 1][j] * (1.0 - v) + table[i + 1][j + 1] * v;
    low * (1.0 - u) + high * u
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeDelta, TimeZone, Utc};

    #[test]
    fn table_corners_are_exact() {
        assert_relative_eq!(Yazaki::cooling_capacity(27.0, 70.0), 10_000.0);
        assert_relative_eq!(Yazaki::cooling_capacity(32.0, 95.0), 16_000.0);
        assert_relative_eq!(Yazaki::heat_input(31.0, 87.0), 25_000.0);
    }

    #[test]
    fn interpolates_between_rows_and_columns() {
        // halfway between 80 and 87 on the 27 row: (16.5 + 21) / 2
        assert_relative_eq!(Yazaki::cooling_capacity(27.0, 83.5), 18_750.0);
        // halfway between rows 27 and 29.5 in the 70 column: (10 + 7) / 2
        assert_relative_eq!(Yazaki::cooling_capacity(28.25, 70.0), 8_500.0);
    }

    #[test]
    fn extrapolates_beyond_the_table() {
        // 25 is one cell-width fraction of -0.8 below 27: 10 + 0.8 * (10 - 7)
        assert_relative_eq!(Yazaki::cooling_capacity(25.0, 70.0), 12_400.0, epsilon = 1e-9);
    }

    #[test]
    fn out_of_range_hot_inlet_passes_through() {
        let time = SimulationTime::new(TimeDelta::seconds(1), Utc.timestamp_opt(0, 0).unwrap());
        let inputs = PortMap::from([
            (YazakiPort::HotIn, ConnectionState::new(1.0, 60.0)),
            (YazakiPort::CoolingIn, ConnectionState::new(1.0, 30.0)),
            (YazakiPort::ChilledIn, ConnectionState::new(1.0, 15.0)),
        ]);
        let (_, out) = Yazaki::new(1.0, 1.0, 1.0)
            .simulate(&inputs, &NoState, Some(&YazakiControl { on: true }), &time)
            .unwrap();
        assert_eq!(out[&YazakiPort::HotOut].temperature, 60.0);
        assert_eq!(out[&YazakiPort::ChilledOut].temperature, 15.0);
    }

    #[test]
    fn running_moves_heat_between_circuits() {
        let time = SimulationTime::new(TimeDelta::seconds(1), Utc.timestamp_opt(0, 0).unwrap());
        let inputs = PortMap::from([
            (YazakiPort::HotIn, ConnectionState::new(1.0, 87.0)),
            (YazakiPort::CoolingIn, ConnectionState::new(2.0, 31.0)),
            (YazakiPort::ChilledIn, ConnectionState::new(1.0, 15.0)),
        ]);
        let (_, out) = Yazaki::new(1000.0, 1000.0, 1000.0)
            .simulate(&inputs, &NoState, Some(&YazakiControl { on: true }), &time)
            .unwrap();
        // heat 25 kW, chill 17.5 kW at (31, 87)
        assert_relative_eq!(out[&YazakiPort::HotOut].temperature, 62.0);
        assert_relative_eq!(out[&YazakiPort::ChilledOut].temperature, -2.5);
        assert_relative_eq!(out[&YazakiPort::CoolingOut].temperature, 52.25);
    }
}
