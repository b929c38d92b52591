//! Control records as exchanged with the plant host.

use chrono::{DateTime, Utc};
use eb_network::NetworkControl;
use serde_json::Value;

use crate::error::{PowerHubError, PowerHubResult};
use crate::network::PowerHub;

const TIME_KEY: &str = "time";

/// `{ "<appliance>": {command}, ..., "time": "<rfc3339>" }`
pub fn encode_control(
    hub: &PowerHub,
    control: &NetworkControl,
    time: DateTime<Utc>,
) -> PowerHubResult<Value> {
    let mut record = hub.network().control_to_json(control)?;
    record.insert(TIME_KEY.to_owned(), Value::String(time.to_rfc3339()));
    Ok(Value::Object(record))
}

pub fn decode_control(hub: &PowerHub, record: &Value) -> PowerHubResult<NetworkControl> {
    let object = record.as_object().ok_or_else(|| PowerHubError::Config {
        what: "control record must be a JSON object".into(),
    })?;
    Ok(hub.network().control_from_json(object, &[TIME_KEY])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::initial_control_all_off;
    use crate::network::PowerHubSchedules;
    use chrono::TimeZone;

    #[test]
    fn round_trip() {
        let hub = PowerHub::power_hub(PowerHubSchedules::default()).unwrap();
        let control = initial_control_all_off(&hub);
        let time = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

        let record = encode_control(&hub, &control, time).unwrap();
        assert_eq!(record["time"], "2024-06-01T12:00:00+00:00");
        assert_eq!(record["heat_pipes_pump"]["on"], false);
        assert_eq!(decode_control(&hub, &record).unwrap(), control);
    }

    #[test]
    fn unknown_appliance_is_rejected() {
        let hub = PowerHub::power_hub(PowerHubSchedules::default()).unwrap();
        let record = serde_json::json!({ "flux_capacitor": { "on": true } });
        assert!(decode_control(&hub, &record).is_err());
        assert!(decode_control(&hub, &serde_json::json!([1, 2])).is_err());
    }
}
