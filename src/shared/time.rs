use std::ops::{Add, Sub};

/// A clock time measured in seconds from midnight. GTFS allows times past
/// 24:00:00 for trips that run over midnight, so no wrap-around happens here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Time(u32);

impl Time {
    pub const fn from_seconds(secs: u32) -> Self {
        Self(secs)
    }

    /// Drops the fractional part of a departure that fell between whole
    /// seconds. Feed rows only carry whole-second times.
    pub fn truncate(seconds: f64) -> Self {
        Self(seconds as u32)
    }

    pub const fn as_seconds(&self) -> u32 {
        self.0
    }

    pub fn to_hms_string(&self) -> String {
        format!(
            "{:02}:{:02}:{:02}",
            self.0 / 3600,
            self.0 % 3600 / 60,
            self.0 % 60
        )
    }

    /// Parses `HH:MM:SS`. Hours may run past 24; minutes and seconds must
    /// be two digits below 60.
    pub fn from_hms(time: &str) -> Option<Self> {
        let mut parts = time.split(':');
        let hours: u32 = parts.next()?.parse().ok()?;
        let minutes = parse_sexagesimal(parts.next()?)?;
        let seconds = parse_sexagesimal(parts.next()?)?;
        if parts.next().is_some() {
            return None;
        }
        let total = hours.checked_mul(3600)?.checked_add(minutes * 60 + seconds)?;
        Some(Self(total))
    }
}

fn parse_sexagesimal(field: &str) -> Option<u32> {
    if field.len() != 2 {
        return None;
    }
    let value: u32 = field.parse().ok()?;
    (value < 60).then_some(value)
}

impl Sub for Time {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Self::Output {
        Duration(self.0 - rhs.0)
    }
}

impl Add<Duration> for Time {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

/// A span of service time in whole seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration(u32);

impl Duration {
    pub const fn from_seconds(secs: u32) -> Self {
        Self(secs)
    }

    pub const fn from_hours(hours: u32) -> Self {
        Self(hours * 3600)
    }

    pub const fn as_seconds(&self) -> u32 {
        self.0
    }
}

#[test]
fn parse_unparse_1() {
    let time = "00:00:00";
    let stime = Time::from_hms(time).unwrap();
    assert_eq!(time, stime.to_hms_string())
}

#[test]
fn parse_unparse_2() {
    let time = "07:15:30";
    let stime = Time::from_hms(time).unwrap();
    assert_eq!(time, stime.to_hms_string())
}

#[test]
fn parse_unparse_past_midnight() {
    // Hours past 24 are legal on the output side of a feed.
    let time = "25:01:01";
    let stime = Time::from_hms(time).unwrap();
    assert_eq!(stime.as_seconds(), 25 * 3600 + 61);
    assert_eq!(time, stime.to_hms_string())
}

#[test]
fn valid_time_test_1() {
    let time = "00:00:30";
    assert_eq!(Time::from_hms(time).unwrap().as_seconds(), 30);
}

#[test]
fn valid_time_test_2() {
    let time = "01:01:30";
    assert_eq!(Time::from_hms(time).unwrap().as_seconds(), 3690);
}

#[test]
fn invalid_time_test_1() {
    let time = "00:00:0a";
    assert!(Time::from_hms(time).is_none())
}

#[test]
fn invalid_time_test_2() {
    let time = "00:00";
    assert!(Time::from_hms(time).is_none())
}

#[test]
fn invalid_time_test_3() {
    let time = "00:00:00:00";
    assert!(Time::from_hms(time).is_none())
}

#[test]
fn invalid_time_test_4() {
    assert!(Time::from_hms("06:61:00").is_none());
    assert!(Time::from_hms("06:5:00").is_none());
}

#[test]
fn truncate_test() {
    assert_eq!(Time::truncate(21600.9), Time::from_seconds(21600));
    assert_eq!(Time::truncate(21600.9).to_hms_string(), "06:00:00");
}

#[test]
fn time_arithmetic_test() {
    let start = Time::from_hms("07:00:00").unwrap();
    let end = Time::from_hms("09:30:00").unwrap();
    assert_eq!((end - start).as_seconds(), 9000);
    assert_eq!(start + Duration::from_hours(3), Time::from_seconds(36000));
}
