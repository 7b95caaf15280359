use criterion::{Criterion, criterion_group, criterion_main};
use omnibus::{
    plan::models::{PlanFrequency, PlanMeta, PlanServiceWindow, PlanStop},
    prelude::{FeedBuilder, NetworkPlan},
    shared::Coordinate,
};
use std::{hint::black_box, time::Duration};

const ROUTES: usize = 40;
const POINTS_PER_PATH: usize = 30;

fn meta_row() -> PlanMeta {
    PlanMeta {
        agency_name: "Bench Transit".into(),
        agency_url: "https://example.com".into(),
        agency_timezone: "America/Chicago".into(),
        start_date: "20260101".into(),
        end_date: "20261231".into(),
        default_route_speed: 22.0,
    }
}

fn window_rows() -> Vec<PlanServiceWindow> {
    let days = [
        ("peak", "06:00:00", "09:00:00", [1, 1, 1, 1, 1, 0, 0]),
        ("midday", "09:00:00", "16:00:00", [1, 1, 1, 1, 1, 0, 0]),
        ("weekend", "08:00:00", "20:00:00", [0, 0, 0, 0, 0, 1, 1]),
    ];
    days.into_iter()
        .map(|(id, start, end, flags)| PlanServiceWindow {
            service_window_id: id.into(),
            start_time: start.into(),
            end_time: end.into(),
            monday: flags[0],
            tuesday: flags[1],
            wednesday: flags[2],
            thursday: flags[3],
            friday: flags[4],
            saturday: flags[5],
            sunday: flags[6],
        })
        .collect()
}

/// A town of east-west corridors, one per route, with a gentle wiggle so
/// the paths are not degenerate straight lines.
fn grid_plan(with_stops: bool) -> NetworkPlan {
    let windows = ["peak", "midday", "weekend"];
    let mut paths = Vec::with_capacity(ROUTES);
    let mut frequencies = Vec::with_capacity(ROUTES);
    let mut stops = Vec::new();
    for route in 0..ROUTES {
        let name = format!("p{route}");
        let latitude = 45.0 + route as f64 * 0.01;
        let points: Vec<Coordinate> = (0..POINTS_PER_PATH)
            .map(|i| {
                Coordinate::new(
                    latitude + (i % 3) as f64 * 0.0004,
                    -122.0 + i as f64 * 0.003,
                )
            })
            .collect();
        if with_stops {
            // Alternate curb sides so both directions of travel get stops.
            for (slot, (i, point)) in points.iter().enumerate().step_by(3).enumerate() {
                let offset = if slot % 2 == 0 { -0.0008 } else { 0.0008 };
                stops.push(PlanStop {
                    stop_id: format!("s{route}-{i}"),
                    stop_name: None,
                    stop_lat: Some(point.latitude + offset),
                    stop_lon: Some(point.longitude),
                });
            }
        }
        paths.push((name.clone(), points));
        frequencies.push(PlanFrequency {
            route_short_name: format!("{route}"),
            route_long_name: format!("Corridor {route}"),
            route_type: Some(3),
            service_window_id: windows[route % windows.len()].into(),
            direction: 2,
            frequency: 6,
            speed: None,
            shape_id: name,
        });
    }
    NetworkPlan::from_records(
        vec![meta_row()],
        window_rows(),
        frequencies,
        paths,
        with_stops.then_some(stops),
    )
    .unwrap()
}

fn criterion_benchmark(c: &mut Criterion) {
    let synthetic = grid_plan(false);
    let registered = grid_plan(true);

    let mut group = c.benchmark_group("Synthesis");

    group.warm_up_time(Duration::from_secs(5));

    group.measurement_time(Duration::from_secs(15));

    group.bench_function("Synthetic stops", |b| {
        b.iter(|| black_box(FeedBuilder::new(black_box(&synthetic)).build().unwrap()))
    });

    group.bench_function("Registered stops", |b| {
        b.iter(|| black_box(FeedBuilder::new(black_box(&registered)).build().unwrap()))
    });

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
