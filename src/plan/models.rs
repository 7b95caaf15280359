use serde::{Deserialize, Serialize};

/// One row of `frequencies.csv`: a route running at a constant frequency in
/// one or both directions along a named path during one service window.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct PlanFrequency {
    pub route_short_name: String,
    pub route_long_name: String,
    /// GTFS route type. Empty or absent values fall back to 3 (bus).
    #[serde(default)]
    pub route_type: Option<u16>,
    pub service_window_id: String,
    /// 0, 1 or 2. 2 means trips run in both directions at this frequency.
    pub direction: u8,
    /// Vehicles per hour during the window.
    pub frequency: u32,
    /// Km/h. Empty or absent values fall back to the network default speed.
    #[serde(default)]
    pub speed: Option<f64>,
    /// Name of a path in the geometry file.
    pub shape_id: String,
}

/// One row of `service_windows.csv`.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct PlanServiceWindow {
    pub service_window_id: String,
    pub start_time: String,
    pub end_time: String,
    pub monday: u8,
    pub tuesday: u8,
    pub wednesday: u8,
    pub thursday: u8,
    pub friday: u8,
    pub saturday: u8,
    pub sunday: u8,
}

/// The single row of `meta.csv`.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct PlanMeta {
    pub agency_name: String,
    pub agency_url: String,
    pub agency_timezone: String,
    pub start_date: String,
    pub end_date: String,
    pub default_route_speed: f64,
}

/// One row of the optional `stops.csv`. The full GTFS stop schema is
/// tolerated; only the four fields below take part in synthesis.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PlanStop {
    pub stop_id: String,
    #[serde(default)]
    pub stop_name: Option<String>,
    #[serde(default)]
    pub stop_lat: Option<f64>,
    #[serde(default)]
    pub stop_lon: Option<f64>,
}
