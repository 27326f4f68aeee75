// Figure eight drive sample
//
// Rolls an open loop steering schedule through a kinematic bicycle
// model and plots the resulting track.

use plotlib::page::Page;
use plotlib::repr::Plot;
use plotlib::view::ContinuousView;
use plotlib::style::{LineStyle, PointMarker, PointStyle};

use rust_autonomy::path_planning::FigureEightPlan;

fn main() {
    let radius = 8.0; // [m]
    let wheelbase = 2.0; // [m]
    let duration = 30.0; // [s]
    let dt = 0.01; // [s]

    let plan = FigureEightPlan::new(radius, wheelbase, duration, dt).unwrap();
    println!("speed: {:.2} m/s over {} samples", plan.speed(), plan.samples());

    let track = plan.rollout();
    let last = track[track.len() - 1];
    println!(
        "closure error: {:.2e} m",
        (last.x.powi(2) + last.y.powi(2)).sqrt()
    );

    let points: Vec<(f64, f64)> = track.iter().map(|s| (s.x, s.y)).collect();

    let mut centers: Vec<(f64, f64)> = plan.center_offsets().iter().map(|c| (c.x, c.y)).collect();
    centers.dedup();

    let s0: Plot = Plot::new(points).line_style(
        LineStyle::new()
            .colour("#35C788"),
    );

    let s1: Plot = Plot::new(centers).point_style(
        PointStyle::new()
            .marker(PointMarker::Cross)
            .colour("#000000")
            .size(4.),
    );

    let v = ContinuousView::new()
        .add(s0)
        .add(s1)
        .x_range(-10., 26.)
        .y_range(-2., 18.)
        .x_label("x [m]")
        .y_label("y [m]");

    Page::single(&v).save("./img/figure_eight.svg").unwrap();
}
