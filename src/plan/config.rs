pub struct Config {
    pub frequencies_file_name: String,
    pub meta_file_name: String,
    pub service_windows_file_name: String,
    pub geometry_file_name: String,
    pub stops_file_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frequencies_file_name: "frequencies.csv".into(),
            meta_file_name: "meta.csv".into(),
            service_windows_file_name: "service_windows.csv".into(),
            geometry_file_name: "shapes.geojson".into(),
            stops_file_name: "stops.csv".into(),
        }
    }
}
