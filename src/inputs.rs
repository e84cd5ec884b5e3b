use rocket::form::FromForm;

// Mode form. A missing or empty mode leaves the unit untouched.
#[derive(Debug, FromForm)]
pub(crate) struct ModeInput<'r> {
    pub(crate) mode: Option<&'r str>,
}

// Fan speed form. A missing or empty speed leaves the unit untouched.
#[derive(Debug, FromForm)]
pub(crate) struct FanSpeedInput<'r> {
    #[field(name = "fan_speed")]
    pub(crate) fan_speed: Option<&'r str>,
}
