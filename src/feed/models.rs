use crate::feed::fields;
use crate::shared::Time;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct GtfsAgency {
    pub agency_name: String,
    pub agency_url: String,
    pub agency_timezone: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct GtfsCalendar {
    pub service_id: String,
    pub monday: u8,
    pub tuesday: u8,
    pub wednesday: u8,
    pub thursday: u8,
    pub friday: u8,
    pub saturday: u8,
    pub sunday: u8,
    #[serde(
        serialize_with = "fields::serialize_date",
        deserialize_with = "fields::deserialize_date"
    )]
    pub start_date: NaiveDate,
    #[serde(
        serialize_with = "fields::serialize_date",
        deserialize_with = "fields::deserialize_date"
    )]
    pub end_date: NaiveDate,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct GtfsRoute {
    pub route_id: String,
    pub route_short_name: String,
    pub route_long_name: String,
    pub route_type: u16,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct GtfsShapePoint {
    pub shape_id: String,
    pub shape_pt_sequence: u32,
    pub shape_pt_lon: f64,
    pub shape_pt_lat: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct GtfsStop {
    pub stop_id: String,
    pub stop_name: Option<String>,
    pub stop_lon: f64,
    pub stop_lat: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct GtfsTrip {
    pub route_id: String,
    pub trip_id: String,
    pub direction_id: u8,
    pub shape_id: String,
    pub service_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct GtfsStopTime {
    pub trip_id: String,
    pub stop_id: String,
    pub stop_sequence: u32,
    #[serde(
        serialize_with = "fields::serialize_time",
        deserialize_with = "fields::deserialize_time"
    )]
    pub arrival_time: Time,
    #[serde(
        serialize_with = "fields::serialize_time",
        deserialize_with = "fields::deserialize_time"
    )]
    pub departure_time: Time,
    /// Kilometers along the trip's shape.
    pub shape_dist_traveled: f64,
}
