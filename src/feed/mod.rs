use std::io;
use thiserror::Error;

pub mod fields;
pub mod models;
mod writer;

use models::*;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// A complete synthesized feed, one field per GTFS table.
#[derive(Debug, Clone)]
pub struct Feed {
    pub agency: GtfsAgency,
    pub calendar: Vec<GtfsCalendar>,
    pub routes: Vec<GtfsRoute>,
    pub shapes: Vec<GtfsShapePoint>,
    pub stops: Vec<GtfsStop>,
    pub trips: Vec<GtfsTrip>,
    pub stop_times: Vec<GtfsStopTime>,
}
