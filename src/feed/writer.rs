use crate::feed::{self, Feed};
use serde::Serialize;
use std::{
    fs::{self, File},
    io::Write,
    path::Path,
    slice,
};
use zip::{ZipWriter, write::SimpleFileOptions};

impl Feed {
    /// Writes the feed as loose GTFS text files into a directory, creating
    /// it if needed.
    pub fn write_dir<P: AsRef<Path>>(&self, dir: P) -> Result<(), feed::Error> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        for (name, bytes) in self.tables()? {
            fs::write(dir.join(name), bytes)?;
        }
        Ok(())
    }

    /// Writes the feed as a zipped GTFS archive.
    pub fn write_zip<P: AsRef<Path>>(&self, path: P) -> Result<(), feed::Error> {
        let file = File::create(path)?;
        let mut archive = ZipWriter::new(file);
        for (name, bytes) in self.tables()? {
            archive.start_file(name, SimpleFileOptions::default())?;
            archive.write_all(&bytes)?;
        }
        archive.finish()?;
        Ok(())
    }

    fn tables(&self) -> Result<Vec<(&'static str, Vec<u8>)>, feed::Error> {
        Ok(vec![
            ("agency.txt", to_csv_bytes(slice::from_ref(&self.agency))?),
            ("calendar.txt", to_csv_bytes(&self.calendar)?),
            ("routes.txt", to_csv_bytes(&self.routes)?),
            ("shapes.txt", to_csv_bytes(&self.shapes)?),
            ("stops.txt", to_csv_bytes(&self.stops)?),
            ("trips.txt", to_csv_bytes(&self.trips)?),
            ("stop_times.txt", to_csv_bytes(&self.stop_times)?),
        ])
    }
}

fn to_csv_bytes<T: Serialize>(rows: &[T]) -> Result<Vec<u8>, feed::Error> {
    let mut buf = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut buf);
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }
    Ok(buf)
}

#[test]
fn stop_time_columns_and_formats() {
    use crate::feed::models::GtfsStopTime;
    use crate::shared::Time;

    let rows = [GtfsStopTime {
        trip_id: "t-r10-peak-06:00:00-0-0".into(),
        stop_id: "a".into(),
        stop_sequence: 0,
        arrival_time: Time::from_seconds(6 * 3600),
        departure_time: Time::from_seconds(25 * 3600),
        shape_dist_traveled: 1.25,
    }];
    let text = String::from_utf8(to_csv_bytes(&rows).unwrap()).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next().unwrap(),
        "trip_id,stop_id,stop_sequence,arrival_time,departure_time,shape_dist_traveled"
    );
    assert_eq!(
        lines.next().unwrap(),
        "t-r10-peak-06:00:00-0-0,a,0,06:00:00,25:00:00,1.25"
    );
}

#[test]
fn calendar_dates_use_compact_format() {
    use crate::feed::models::GtfsCalendar;
    use chrono::NaiveDate;

    let rows = [GtfsCalendar {
        service_id: "srv1111100".into(),
        monday: 1,
        tuesday: 1,
        wednesday: 1,
        thursday: 1,
        friday: 1,
        saturday: 0,
        sunday: 0,
        start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
    }];
    let text = String::from_utf8(to_csv_bytes(&rows).unwrap()).unwrap();
    assert!(text.contains("20260101,20261231"));
}
