use serde::{Deserialize, Serialize};

/// Body of flight creation and edits. Presence of each field is checked by the flight
/// service so a missing field yields a field-level message.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct InputFlight {
    pub name: Option<String>,
    pub time: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct InputTimeWindow {
    pub time: Option<String>,
    pub interval: Option<f64>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct InputUserName {
    #[serde(rename = "newName")]
    pub new_name: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct InputTimezone {
    pub timezone: Option<String>,
}
