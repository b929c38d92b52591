//! Property tests for eb-controls.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use eb_controls::{Context, Pid, PidConfig, Predicate, Value};
use proptest::prelude::*;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

proptest! {
    #[test]
    fn pid_output_and_integral_stay_bounded(
        kp in -5.0f64..5.0,
        ki in -5.0f64..5.0,
        kd in -5.0f64..5.0,
        measurements in prop::collection::vec(-100.0f64..100.0, 1..50),
    ) {
        let mut pid = Pid::new(PidConfig::new(kp, ki, kd).with_limits(-1.0, 2.0));
        for m in measurements {
            let (next, out) = pid.run(10.0, m);
            prop_assert!((-1.0..=2.0).contains(&out));
            prop_assert!((-1.0..=2.0).contains(&next.integral));
            pid = next;
        }
    }

    #[test]
    fn debounce_fires_exactly_after_duration(
        readings in prop::collection::vec(any::<bool>(), 1..40),
    ) {
        // one reading per second; the predicate must report true exactly when
        // the last 5 seconds (inclusive of both ends) were all true
        let hot: Predicate<(), bool> =
            Value::sensor("hot", |s: &bool| if *s { 1.0 } else { 0.0 })
                .gt(0.5)
                .holds_true("hot", TimeDelta::seconds(5));
        let mut context = Context::default();
        let mut streak = 0usize;
        for (i, reading) in readings.iter().enumerate() {
            streak = if *reading { streak + 1 } else { 0 };
            let now = start() + TimeDelta::seconds(i as i64);
            let fired = hot.resolve(&(), reading, &mut context, now);
            context = context.flip();
            prop_assert_eq!(fired, streak >= 6);
        }
    }
}
