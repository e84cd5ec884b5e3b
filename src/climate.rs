use std::fmt;
use std::mem;
use std::str::FromStr;

use serde::Serialize;

use time::OffsetDateTime;

use crate::error::ClimateError;

// Lowest target temperature.
pub(crate) const MIN_TEMPERATURE: i64 = 18;
// Highest target temperature.
pub(crate) const MAX_TEMPERATURE: i64 = 30;
// Target temperature of a new unit.
pub(crate) const DEFAULT_TEMPERATURE: i64 = 24;

// Finds the choice whose name matches `value`, ignoring case and surrounding
// whitespace.
fn parse_choice<T: Copy>(
    kind: &str,
    value: &str,
    choices: &[T],
    name: fn(T) -> &'static str,
) -> Result<T, ClimateError> {
    let value = value.trim();
    choices
        .iter()
        .copied()
        .find(|choice| name(*choice).eq_ignore_ascii_case(value))
        .ok_or_else(|| ClimateError::InvalidArgument(format!("unknown {kind} `{value}`")))
}

// Operating mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub(crate) enum Mode {
    // Cooling.
    #[default]
    Cold,
    // Heating.
    Heat,
    // Ventilation only.
    Fan,
    // Dehumidification.
    Dry,
}

impl Mode {
    pub(crate) const ALL: [Mode; 4] = [Mode::Cold, Mode::Heat, Mode::Fan, Mode::Dry];

    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Cold => "Cold",
            Self::Heat => "Heat",
            Self::Fan => "Fan",
            Self::Dry => "Dry",
        }
    }
}

impl FromStr for Mode {
    type Err = ClimateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_choice("mode", s, &Self::ALL, Self::as_str)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Fan speed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub(crate) enum FanSpeed {
    Low,
    #[default]
    Medium,
    High,
}

impl FanSpeed {
    pub(crate) const ALL: [FanSpeed; 3] = [FanSpeed::Low, FanSpeed::Medium, FanSpeed::High];

    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl FromStr for FanSpeed {
    type Err = ClimateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_choice("fan speed", s, &Self::ALL, Self::as_str)
    }
}

impl fmt::Display for FanSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A simulated air-conditioner.
///
/// The unit is either `Off` or `On`. Entering `On` stamps
/// `powered_on_since`, entering `Off` clears it. Temperature steps only have
/// an effect while the unit is on and never leave
/// `[MIN_TEMPERATURE, MAX_TEMPERATURE]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct ClimateUnit {
    // Identifier.
    pub(crate) id: i64,
    // Whether the unit is on.
    pub(crate) powered_on: bool,
    // Target temperature in Celsius degrees.
    pub(crate) target_temperature: i64,
    // Operating mode.
    pub(crate) mode: Mode,
    // Fan speed.
    pub(crate) fan_speed: FanSpeed,
    // Instant of the last off to on transition.
    #[serde(with = "time::serde::rfc3339::option")]
    pub(crate) powered_on_since: Option<OffsetDateTime>,
}

impl Default for ClimateUnit {
    fn default() -> Self {
        Self {
            id: 0,
            powered_on: false,
            target_temperature: DEFAULT_TEMPERATURE,
            mode: Mode::default(),
            fan_speed: FanSpeed::default(),
            powered_on_since: None,
        }
    }
}

impl ClimateUnit {
    /// Switches the unit on or off.
    pub(crate) fn toggle_power(&mut self, now: OffsetDateTime) {
        self.powered_on = !self.powered_on;
        self.powered_on_since = self.powered_on.then_some(now);
    }

    /// Raises the target temperature by one degree.
    ///
    /// Returns whether the unit changed.
    pub(crate) fn increase_temperature(&mut self) -> bool {
        self.step_temperature(1)
    }

    /// Lowers the target temperature by one degree.
    ///
    /// Returns whether the unit changed.
    pub(crate) fn decrease_temperature(&mut self) -> bool {
        self.step_temperature(-1)
    }

    fn step_temperature(&mut self, delta: i64) -> bool {
        if !self.powered_on {
            return false;
        }
        let target = (self.target_temperature + delta).clamp(MIN_TEMPERATURE, MAX_TEMPERATURE);
        mem::replace(&mut self.target_temperature, target) != target
    }

    /// Changes the operating mode. An empty input leaves the unit untouched.
    pub(crate) fn set_mode(&mut self, mode: &str) -> Result<bool, ClimateError> {
        if mode.trim().is_empty() {
            return Ok(false);
        }
        let mode = mode.parse::<Mode>()?;
        Ok(mem::replace(&mut self.mode, mode) != mode)
    }

    /// Changes the fan speed. An empty input leaves the unit untouched.
    pub(crate) fn set_fan_speed(&mut self, fan_speed: &str) -> Result<bool, ClimateError> {
        if fan_speed.trim().is_empty() {
            return Ok(false);
        }
        let fan_speed = fan_speed.parse::<FanSpeed>()?;
        Ok(mem::replace(&mut self.fan_speed, fan_speed) != fan_speed)
    }

    /// Repairs a unit loaded from storage.
    ///
    /// Brings the target temperature back into range and restores the
    /// agreement between the power flag and its timestamp. Returns whether
    /// the unit changed.
    pub(crate) fn settle(&mut self, now: OffsetDateTime) -> bool {
        let target = self
            .target_temperature
            .clamp(MIN_TEMPERATURE, MAX_TEMPERATURE);
        let clamped = mem::replace(&mut self.target_temperature, target) != target;

        let stamped = match (self.powered_on, self.powered_on_since) {
            (true, None) => {
                self.powered_on_since = Some(now);
                true
            }
            (false, Some(_)) => {
                self.powered_on_since = None;
                true
            }
            _ => false,
        };

        clamped || stamped
    }

    /// Prepares the unit to be shown.
    ///
    /// Settles the unit, then applies the `drift` step, if any, as a
    /// temperature step. Returns whether the unit changed and must be saved.
    pub(crate) fn observe(&mut self, now: OffsetDateTime, drift: Option<i64>) -> bool {
        let settled = self.settle(now);
        let drifted = drift.is_some_and(|step| self.step_temperature(step));
        settled || drifted
    }

    /// Whole seconds the unit has been on, `0` when off.
    pub(crate) fn elapsed_on_seconds(&self, now: OffsetDateTime) -> i64 {
        match (self.powered_on, self.powered_on_since) {
            (true, Some(since)) => (now - since).whole_seconds().max(0),
            _ => 0,
        }
    }
}

/// A unit as seen by a reader, along with how long it has been on.
#[derive(Debug, Serialize)]
pub(crate) struct Observation {
    pub(crate) unit: ClimateUnit,
    pub(crate) elapsed_on_seconds: i64,
}

impl Observation {
    pub(crate) fn new(unit: ClimateUnit, now: OffsetDateTime) -> Self {
        let elapsed_on_seconds = unit.elapsed_on_seconds(now);
        Self {
            unit,
            elapsed_on_seconds,
        }
    }

    // Elapsed time as `HH:MM:SS`.
    pub(crate) fn elapsed_display(&self) -> String {
        let seconds = self.elapsed_on_seconds;
        format!(
            "{:02}:{:02}:{:02}",
            seconds / 3600,
            (seconds % 3600) / 60,
            seconds % 60
        )
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;
    use time::Duration;

    use super::*;

    const NOW: OffsetDateTime = datetime!(2024-06-01 12:00 UTC);

    fn powered_on() -> ClimateUnit {
        let mut unit = ClimateUnit::default();
        unit.toggle_power(NOW);
        unit
    }

    #[test]
    fn defaults() {
        let unit = ClimateUnit::default();
        assert!(!unit.powered_on);
        assert_eq!(unit.target_temperature, 24);
        assert_eq!(unit.mode, Mode::Cold);
        assert_eq!(unit.fan_speed, FanSpeed::Medium);
        assert_eq!(unit.powered_on_since, None);
    }

    #[test]
    fn toggle_stamps_and_clears() {
        let mut unit = ClimateUnit::default();

        unit.toggle_power(NOW);
        assert!(unit.powered_on);
        assert_eq!(unit.powered_on_since, Some(NOW));

        unit.toggle_power(NOW + Duration::minutes(5));
        assert!(!unit.powered_on);
        assert_eq!(unit.powered_on_since, None);
    }

    #[test]
    fn toggle_twice_restores_state() {
        let original = ClimateUnit::default();
        let mut unit = original.clone();
        unit.toggle_power(NOW);
        unit.toggle_power(NOW);
        assert_eq!(unit, original);
    }

    #[test]
    fn steps_are_ignored_while_off() {
        let mut unit = ClimateUnit::default();
        assert!(!unit.increase_temperature());
        assert!(!unit.decrease_temperature());
        assert_eq!(unit, ClimateUnit::default());
    }

    #[test]
    fn temperature_stays_in_range() {
        let mut unit = powered_on();
        for i in 0..200 {
            if (i / 15) % 2 == 0 {
                unit.increase_temperature();
            } else {
                unit.decrease_temperature();
            }
            assert!((MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&unit.target_temperature));
        }
    }

    #[test]
    fn steps_at_bounds_report_no_change() {
        let mut unit = powered_on();
        unit.target_temperature = MAX_TEMPERATURE;
        assert!(!unit.increase_temperature());
        unit.target_temperature = MIN_TEMPERATURE;
        assert!(!unit.decrease_temperature());
        assert!(unit.increase_temperature());
    }

    #[test]
    fn control_scenario() {
        let mut unit = ClimateUnit::default();

        unit.toggle_power(NOW);
        assert!(unit.powered_on_since.is_some());

        for _ in 0..3 {
            unit.increase_temperature();
        }
        assert_eq!(unit.target_temperature, 27);

        for _ in 0..10 {
            unit.decrease_temperature();
        }
        assert_eq!(unit.target_temperature, 18);

        unit.toggle_power(NOW);
        assert!(!unit.powered_on);
        assert_eq!(unit.powered_on_since, None);

        unit.increase_temperature();
        assert_eq!(unit.target_temperature, 18);
    }

    #[test]
    fn empty_mode_is_ignored() {
        let mut unit = ClimateUnit::default();
        assert!(unit.set_mode("Heat").unwrap());
        assert!(!unit.set_mode("").unwrap());
        assert!(!unit.set_mode("   ").unwrap());
        assert_eq!(unit.mode, Mode::Heat);
    }

    #[test]
    fn mode_is_matched_ignoring_case() {
        let mut unit = ClimateUnit::default();
        assert!(unit.set_mode(" dry ").unwrap());
        assert_eq!(unit.mode, Mode::Dry);
        assert!(!unit.set_mode("DRY").unwrap());
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let mut unit = ClimateUnit::default();
        assert!(matches!(
            unit.set_mode("Turbo"),
            Err(ClimateError::InvalidArgument(_))
        ));
        assert_eq!(unit.mode, Mode::Cold);
    }

    #[test]
    fn mode_changes_while_off() {
        let mut unit = ClimateUnit::default();
        assert!(unit.set_mode("Fan").unwrap());
        assert!(!unit.powered_on);
        assert_eq!(unit.mode, Mode::Fan);
    }

    #[test]
    fn fan_speed_changes() {
        let mut unit = ClimateUnit::default();
        assert!(unit.set_fan_speed("high").unwrap());
        assert!(!unit.set_fan_speed("").unwrap());
        assert_eq!(unit.fan_speed, FanSpeed::High);
        assert!(unit.set_fan_speed("Max").is_err());
    }

    #[test]
    fn observe_stamps_missing_start() {
        let mut unit = ClimateUnit {
            powered_on: true,
            ..ClimateUnit::default()
        };
        assert!(unit.observe(NOW, None));
        assert_eq!(unit.powered_on_since, Some(NOW));
        assert!(!unit.observe(NOW + Duration::seconds(1), None));
        assert_eq!(unit.powered_on_since, Some(NOW));
    }

    #[test]
    fn observe_clears_stale_start() {
        let mut unit = ClimateUnit {
            powered_on_since: Some(NOW),
            ..ClimateUnit::default()
        };
        assert!(unit.observe(NOW, None));
        assert_eq!(unit.powered_on_since, None);
    }

    #[test]
    fn observe_clamps_stored_temperature() {
        let mut unit = ClimateUnit {
            target_temperature: 45,
            ..ClimateUnit::default()
        };
        assert!(unit.observe(NOW, None));
        assert_eq!(unit.target_temperature, MAX_TEMPERATURE);

        unit.target_temperature = -3;
        assert!(unit.settle(NOW));
        assert_eq!(unit.target_temperature, MIN_TEMPERATURE);
        assert!(!unit.settle(NOW));
    }

    #[test]
    fn drift_applies_only_while_on() {
        let mut unit = ClimateUnit::default();
        assert!(!unit.observe(NOW, Some(1)));
        assert_eq!(unit.target_temperature, DEFAULT_TEMPERATURE);

        let mut unit = powered_on();
        assert!(unit.observe(NOW, Some(1)));
        assert_eq!(unit.target_temperature, DEFAULT_TEMPERATURE + 1);
        assert!(!unit.observe(NOW, Some(0)));
    }

    #[test]
    fn drift_is_clamped() {
        let mut unit = powered_on();
        unit.target_temperature = MAX_TEMPERATURE;
        assert!(!unit.observe(NOW, Some(1)));
        assert_eq!(unit.target_temperature, MAX_TEMPERATURE);
    }

    #[test]
    fn elapsed_grows_while_on() {
        let unit = powered_on();
        let mut last = 0;
        for minutes in [0, 1, 1, 7, 60] {
            let elapsed = unit.elapsed_on_seconds(NOW + Duration::minutes(minutes));
            assert!(elapsed >= last);
            last = elapsed;
        }
        assert_eq!(last, 3600);
    }

    #[test]
    fn elapsed_is_zero_when_off_or_clock_is_behind() {
        assert_eq!(ClimateUnit::default().elapsed_on_seconds(NOW), 0);
        assert_eq!(powered_on().elapsed_on_seconds(NOW - Duration::hours(1)), 0);
    }

    #[test]
    fn elapsed_display() {
        let mut unit = powered_on();
        unit.powered_on_since = Some(NOW - Duration::seconds(3 * 3600 + 25 * 60 + 7));
        assert_eq!(Observation::new(unit, NOW).elapsed_display(), "03:25:07");
        assert_eq!(
            Observation::new(ClimateUnit::default(), NOW).elapsed_display(),
            "00:00:00"
        );
    }
}
