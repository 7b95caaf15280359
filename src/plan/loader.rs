use crate::plan::{
    self, Config,
    models::{PlanFrequency, PlanMeta, PlanServiceWindow, PlanStop},
};
use crate::shared::Coordinate;
use csv::Reader;
use geojson::{FeatureCollection, GeoJson, Value};
use serde::de::DeserializeOwned;
use std::{fs::File, io::BufReader, path::Path};

/// Raw rows of a plan directory, before normalization.
#[derive(Default)]
pub struct PlanLoader {
    pub(crate) meta: Vec<PlanMeta>,
    pub(crate) frequencies: Vec<PlanFrequency>,
    pub(crate) service_windows: Vec<PlanServiceWindow>,
    pub(crate) paths: Vec<(String, Vec<Coordinate>)>,
    pub(crate) stops: Option<Vec<PlanStop>>,
    pub(crate) config: Config,
}

impl PlanLoader {
    pub fn new(config: plan::Config) -> Self {
        Self {
            meta: Default::default(),
            frequencies: Default::default(),
            service_windows: Default::default(),
            paths: Default::default(),
            stops: Default::default(),
            config,
        }
    }

    /// Reads the three required CSV files, the geometry file and, when
    /// present, the optional stop registry.
    pub fn load_from_dir<P: AsRef<Path>>(mut self, dir: P) -> Result<Self, plan::Error> {
        let dir = dir.as_ref();
        parse_csv(&mut self.meta, &dir.join(&self.config.meta_file_name))?;
        parse_csv(
            &mut self.frequencies,
            &dir.join(&self.config.frequencies_file_name),
        )?;
        parse_csv(
            &mut self.service_windows,
            &dir.join(&self.config.service_windows_file_name),
        )?;
        self.paths = parse_geometry(&dir.join(&self.config.geometry_file_name))?;
        let stops_path = dir.join(&self.config.stops_file_name);
        if stops_path.is_file() {
            let mut rows = Vec::new();
            parse_csv(&mut rows, &stops_path)?;
            self.stops = Some(rows);
        }
        Ok(self)
    }

    pub fn meta(&self) -> &Vec<PlanMeta> {
        &self.meta
    }

    pub fn frequencies(&self) -> &Vec<PlanFrequency> {
        &self.frequencies
    }

    pub fn service_windows(&self) -> &Vec<PlanServiceWindow> {
        &self.service_windows
    }

    pub fn paths(&self) -> &Vec<(String, Vec<Coordinate>)> {
        &self.paths
    }

    pub fn stops(&self) -> Option<&Vec<PlanStop>> {
        self.stops.as_ref()
    }
}

fn parse_csv<T>(buf: &mut Vec<T>, path: &Path) -> Result<(), plan::Error>
where
    T: DeserializeOwned,
{
    let mut reader = Reader::from_path(path).map_err(|e| plan::Error::csv(path, e))?;
    for result in reader.deserialize() {
        let record: T = result.map_err(|e| plan::Error::csv(path, e))?;
        buf.push(record);
    }
    Ok(())
}

fn parse_geometry(path: &Path) -> Result<Vec<(String, Vec<Coordinate>)>, plan::Error> {
    let file = File::open(path)?;
    let geojson = GeoJson::from_reader(BufReader::new(file))
        .map_err(|e| plan::Error::geojson(path, e.into()))?;
    let collection =
        FeatureCollection::try_from(geojson).map_err(|e| plan::Error::geojson(path, e))?;
    let mut paths: Vec<(String, Vec<Coordinate>)> = Vec::new();
    for (index, feature) in collection.features.into_iter().enumerate() {
        let name = feature
            .property("shape_id")
            .and_then(|value| value.as_str())
            .map(str::to_owned)
            .ok_or(plan::Error::MissingPathName(index))?;
        let points = match feature.geometry.map(|geometry| geometry.value) {
            Some(Value::LineString(positions)) => line_string_points(&name, &positions)?,
            _ => return Err(plan::Error::UnsupportedGeometry(name)),
        };
        // A repeated name keeps its first position and its last geometry.
        match paths.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = points,
            None => paths.push((name, points)),
        }
    }
    Ok(paths)
}

fn line_string_points(name: &str, positions: &[Vec<f64>]) -> Result<Vec<Coordinate>, plan::Error> {
    if positions.len() < 2 {
        return Err(plan::Error::DegeneratePath(name.to_owned()));
    }
    positions
        .iter()
        .map(|position| match position.as_slice() {
            // GeoJSON positions are longitude first.
            [longitude, latitude, ..] => Ok(Coordinate::new(*latitude, *longitude)),
            _ => Err(plan::Error::DegeneratePath(name.to_owned())),
        })
        .collect()
}
