use serde::Serialize;

use crate::climate::{FanSpeed, Mode, Observation};

// A selectable option of a panel form.
#[derive(Debug, Serialize)]
pub(crate) struct Choice {
    name: &'static str,
    selected: bool,
}

impl Choice {
    fn list<T: Copy + PartialEq>(all: &[T], current: T, name: fn(T) -> &'static str) -> Vec<Self> {
        all.iter()
            .map(|choice| Self {
                name: name(*choice),
                selected: *choice == current,
            })
            .collect()
    }
}

// A panel button submitting an action.
#[derive(Debug, Serialize)]
pub(crate) struct Button {
    route: String,
    label: &'static str,
    enabled: bool,
}

impl Button {
    fn new(route: String, label: &'static str, enabled: bool) -> Self {
        Self {
            route,
            label,
            enabled,
        }
    }
}

// Everything the panel template shows.
#[derive(Debug, Serialize)]
pub(crate) struct Panel {
    id: i64,
    powered_on: bool,
    target_temperature: i64,
    mode: &'static str,
    fan_speed: &'static str,
    elapsed_on: String,
    elapsed_on_seconds: i64,
    drift: bool,
    power: Button,
    increase: Button,
    decrease: Button,
    mode_route: String,
    fan_speed_route: String,
    modes: Vec<Choice>,
    fan_speeds: Vec<Choice>,
}

impl Panel {
    pub(crate) fn new(observation: &Observation, drift: bool) -> Self {
        let unit = &observation.unit;
        let route = |action: &str| format!("/{}/{}", unit.id, action);

        Self {
            id: unit.id,
            powered_on: unit.powered_on,
            target_temperature: unit.target_temperature,
            mode: unit.mode.as_str(),
            fan_speed: unit.fan_speed.as_str(),
            elapsed_on: observation.elapsed_display(),
            elapsed_on_seconds: observation.elapsed_on_seconds,
            drift,
            power: Button::new(
                route("toggle"),
                if unit.powered_on { "Turn off" } else { "Turn on" },
                true,
            ),
            increase: Button::new(route("increase"), "+", unit.powered_on),
            decrease: Button::new(route("decrease"), "-", unit.powered_on),
            mode_route: route("mode"),
            fan_speed_route: route("fan"),
            modes: Choice::list(&Mode::ALL, unit.mode, Mode::as_str),
            fan_speeds: Choice::list(&FanSpeed::ALL, unit.fan_speed, FanSpeed::as_str),
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::climate::ClimateUnit;

    use super::*;

    #[test]
    fn buttons_follow_power_state() {
        let now = datetime!(2024-06-01 12:00 UTC);
        let mut unit = ClimateUnit {
            id: 5,
            ..ClimateUnit::default()
        };

        let off = Panel::new(&Observation::new(unit.clone(), now), false);
        assert_eq!(off.power.route, "/5/toggle");
        assert_eq!(off.power.label, "Turn on");
        assert!(!off.increase.enabled);
        assert!(!off.decrease.enabled);

        unit.toggle_power(now);
        let on = Panel::new(&Observation::new(unit, now), false);
        assert_eq!(on.power.label, "Turn off");
        assert!(on.increase.enabled);
        assert_eq!(on.elapsed_on, "00:00:00");
    }

    #[test]
    fn current_choices_are_selected() {
        let unit = ClimateUnit {
            mode: Mode::Dry,
            ..ClimateUnit::default()
        };
        let panel = Panel::new(
            &Observation::new(unit, datetime!(2024-06-01 12:00 UTC)),
            true,
        );

        let selected: Vec<_> = panel
            .modes
            .iter()
            .filter(|choice| choice.selected)
            .map(|choice| choice.name)
            .collect();
        assert_eq!(selected, ["Dry"]);
        assert_eq!(panel.fan_speeds.len(), 3);
        assert!(panel.fan_speeds[1].selected);
    }
}
