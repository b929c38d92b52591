//! Operator-tunable thresholds read by the control modules.

use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use eb_core::units::{Celsius, Ratio, Watt, WattPerMeterSquared};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{PowerHubError, PowerHubResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setpoints {
    pub pcm_min_temperature: Celsius,
    pub pcm_max_temperature: Celsius,
    pub target_charging_temperature_offset: Celsius,
    pub minimum_charging_temperature_offset: Celsius,
    pub minimum_global_irradiance: WattPerMeterSquared,
    pub pcm_discharged: Celsius,
    pub pcm_charged: Celsius,
    pub yazaki_minimum_chill_power: Watt,
    pub yazaki_inlet_target_temperature: Celsius,
    pub cold_reservoir_min_temperature: Celsius,
    pub cold_reservoir_max_temperature: Celsius,
    pub chill_min_supply_temperature: Celsius,
    pub cold_supply_max_temperature: Celsius,
    pub cooling_supply_enabled_time: NaiveTime,
    pub cooling_supply_disabled_time: NaiveTime,
    pub waste_target_temperature: Celsius,
    pub technical_water_min_fill_ratio: Ratio,
    pub technical_water_max_fill_ratio: Ratio,
    pub water_treatment_min_fill_ratio: Ratio,
    pub water_treatment_max_fill_ratio: Ratio,
    pub fresh_water_min_fill_ratio: Ratio,
    pub trigger_filter_water_tank: DateTime<Utc>,
    pub stop_filter_water_tank: DateTime<Utc>,
    pub low_battery: Ratio,
    pub high_heat_dump_temperature: Celsius,
    pub heat_dump_outboard_divergence_temperature: Celsius,
    pub manual_outboard_on: bool,
    pub survival_mode: bool,
}

const DESCRIPTIONS: &[(&str, &str)] = &[
    ("pcm_min_temperature", "minimum temperature of pcm to be maintained"),
    ("pcm_max_temperature", "maximum temperature of pcm to be maintained"),
    (
        "target_charging_temperature_offset",
        "target offset of the charging medium above the pcm temperature",
    ),
    (
        "minimum_charging_temperature_offset",
        "minimal offset of the charging medium above the pcm temperature",
    ),
    (
        "minimum_global_irradiance",
        "minimum global irradiance for heat pipes to function",
    ),
    ("pcm_discharged", "maximum temperature at which pcm is fully discharged"),
    ("pcm_charged", "minimum temperature at which pcm is fully charged"),
    (
        "yazaki_minimum_chill_power",
        "chill power below which the Yazaki gives way to the chiller",
    ),
    (
        "yazaki_inlet_target_temperature",
        "target temperature for Yazaki hot water inlet",
    ),
    (
        "cold_reservoir_min_temperature",
        "minimum temperature of cold reservoir to be maintained by chillers",
    ),
    (
        "cold_reservoir_max_temperature",
        "maximum temperature of cold reservoir to be maintained by chillers",
    ),
    (
        "chill_min_supply_temperature",
        "cold reservoir temperature below which cooling is supplied",
    ),
    (
        "cold_supply_max_temperature",
        "cold reservoir temperature above which cooling supply stops",
    ),
    ("cooling_supply_enabled_time", "time of day cooling supply starts"),
    ("cooling_supply_disabled_time", "time of day cooling supply stops"),
    (
        "waste_target_temperature",
        "target temperature of the waste heat circuit",
    ),
    (
        "technical_water_min_fill_ratio",
        "technical water level below which it is filled from fresh water",
    ),
    (
        "technical_water_max_fill_ratio",
        "technical water level above which filling stops",
    ),
    (
        "water_treatment_min_fill_ratio",
        "grey water level below which treatment stops",
    ),
    (
        "water_treatment_max_fill_ratio",
        "grey water level above which treatment starts",
    ),
    (
        "fresh_water_min_fill_ratio",
        "fresh water level below which it is not used for technical water",
    ),
    ("trigger_filter_water_tank", "trigger filtering of water tank"),
    ("stop_filter_water_tank", "stop filtering of water tank"),
    ("low_battery", "soc below which the chiller isn't used"),
    (
        "high_heat_dump_temperature",
        "heat dump temperature above which the outboard pump is toggled",
    ),
    (
        "heat_dump_outboard_divergence_temperature",
        "heat dump to outboard difference above which the outboard pump is toggled",
    ),
    ("manual_outboard_on", "run the outboard pump regardless of demand"),
    ("survival_mode", "survival mode on/off"),
];

impl Default for Setpoints {
    fn default() -> Self {
        let never = Utc.with_ymd_and_hms(2017, 6, 1, 0, 0, 0).single().unwrap_or_default();
        Self {
            pcm_min_temperature: 90.0,
            pcm_max_temperature: 95.0,
            target_charging_temperature_offset: 2.0,
            minimum_charging_temperature_offset: 1.0,
            // ~160 W thermal yield against 60 W for the heat pipes pump
            minimum_global_irradiance: 20.0,
            pcm_discharged: 72.0,
            pcm_charged: 79.0,
            yazaki_minimum_chill_power: 1000.0,
            yazaki_inlet_target_temperature: 100.0,
            cold_reservoir_min_temperature: 15.0,
            cold_reservoir_max_temperature: 16.5,
            chill_min_supply_temperature: 14.0,
            cold_supply_max_temperature: 16.0,
            cooling_supply_enabled_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
            cooling_supply_disabled_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap_or_default(),
            waste_target_temperature: 28.0,
            technical_water_min_fill_ratio: 0.5,
            technical_water_max_fill_ratio: 0.55,
            water_treatment_min_fill_ratio: 0.9,
            water_treatment_max_fill_ratio: 0.925,
            fresh_water_min_fill_ratio: 0.35,
            trigger_filter_water_tank: never,
            stop_filter_water_tank: never,
            low_battery: 0.4,
            high_heat_dump_temperature: 38.0,
            heat_dump_outboard_divergence_temperature: 3.0,
            manual_outboard_on: false,
            survival_mode: false,
        }
    }
}

impl Setpoints {
    /// `(field, description)` for every setpoint, in declaration order.
    pub fn descriptions() -> &'static [(&'static str, &'static str)] {
        DESCRIPTIONS
    }

    pub fn validate(&self) -> PowerHubResult<()> {
        let ordered = [
            (
                "pcm_min_temperature",
                self.pcm_min_temperature,
                self.pcm_max_temperature,
            ),
            ("pcm_discharged", self.pcm_discharged, self.pcm_charged),
            (
                "cold_reservoir_min_temperature",
                self.cold_reservoir_min_temperature,
                self.cold_reservoir_max_temperature,
            ),
            (
                "chill_min_supply_temperature",
                self.chill_min_supply_temperature,
                self.cold_supply_max_temperature,
            ),
            (
                "technical_water_min_fill_ratio",
                self.technical_water_min_fill_ratio,
                self.technical_water_max_fill_ratio,
            ),
            (
                "water_treatment_min_fill_ratio",
                self.water_treatment_min_fill_ratio,
                self.water_treatment_max_fill_ratio,
            ),
        ];
        for (name, low, high) in ordered {
            if !(low < high) {
                return Err(PowerHubError::Setpoints {
                    what: format!("{name} ({low}) must be below its maximum ({high})"),
                });
            }
        }

        let ratios = [
            ("technical_water_min_fill_ratio", self.technical_water_min_fill_ratio),
            ("technical_water_max_fill_ratio", self.technical_water_max_fill_ratio),
            ("water_treatment_min_fill_ratio", self.water_treatment_min_fill_ratio),
            ("water_treatment_max_fill_ratio", self.water_treatment_max_fill_ratio),
            ("fresh_water_min_fill_ratio", self.fresh_water_min_fill_ratio),
            ("low_battery", self.low_battery),
        ];
        for (name, ratio) in ratios {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(PowerHubError::Setpoints {
                    what: format!("{name} ({ratio}) must lie in [0, 1]"),
                });
            }
        }

        let finite = [
            self.target_charging_temperature_offset,
            self.minimum_charging_temperature_offset,
            self.minimum_global_irradiance,
            self.yazaki_minimum_chill_power,
            self.yazaki_inlet_target_temperature,
            self.waste_target_temperature,
            self.high_heat_dump_temperature,
            self.heat_dump_outboard_divergence_temperature,
        ];
        if !finite.iter().all(|v| v.is_finite()) {
            return Err(PowerHubError::Setpoints {
                what: "setpoints must be finite".into(),
            });
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> PowerHubResult<Self> {
        let setpoints: Setpoints = serde_json::from_str(json)?;
        setpoints.validate()?;
        Ok(setpoints)
    }

    /// Apply an update, keeping `previous` when it does not parse or validate.
    pub fn update_from_json(previous: &Setpoints, json: &str) -> Setpoints {
        match Self::from_json(json) {
            Ok(setpoints) => setpoints,
            Err(err) => {
                warn!(error = %err, "Rejected setpoints update");
                previous.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        Setpoints::default().validate().unwrap();
    }

    #[test]
    fn every_field_is_described() {
        let json = serde_json::to_value(Setpoints::default()).unwrap();
        let fields = json.as_object().unwrap();
        assert_eq!(fields.len(), Setpoints::descriptions().len());
        for (name, _) in Setpoints::descriptions() {
            assert!(fields.contains_key(*name), "{name} has no field");
        }
    }

    #[test]
    fn json_round_trip() {
        let setpoints = Setpoints::default();
        let json = serde_json::to_string(&setpoints).unwrap();
        assert_eq!(Setpoints::from_json(&json).unwrap(), setpoints);
    }

    #[test]
    fn bad_update_keeps_previous() {
        let previous = Setpoints {
            pcm_min_temperature: 85.0,
            ..Setpoints::default()
        };
        assert_eq!(Setpoints::update_from_json(&previous, "{not json"), previous);

        let mut inverted = serde_json::to_value(Setpoints::default()).unwrap();
        inverted["pcm_min_temperature"] = 99.0.into();
        let kept = Setpoints::update_from_json(&previous, &inverted.to_string());
        assert_eq!(kept, previous);
    }

    #[test]
    fn good_update_applies() {
        let mut update = serde_json::to_value(Setpoints::default()).unwrap();
        update["survival_mode"] = true.into();
        let applied = Setpoints::update_from_json(&Setpoints::default(), &update.to_string());
        assert!(applied.survival_mode);
    }
}
