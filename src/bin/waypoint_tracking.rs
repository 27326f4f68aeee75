// Waypoint course tracking sample
//
// Closed loop simulation of a kinematic bicycle following a speed
// annotated waypoint course with PID throttle and a front axle
// steering law.

use plotlib::page::Page;
use plotlib::repr::Plot;
use plotlib::view::ContinuousView;
use plotlib::style::LineStyle;

use rust_autonomy::common::{State2D, Waypoint};
use rust_autonomy::path_tracking::{WaypointController, WaypointControllerConfig};

fn main() {
    let dt = 0.05; // [s]
    let sim_time = 60.0; // [s]
    let accel_gain = 3.0; // [m/s^2] throttle to acceleration
    let drag = 0.1; // [1/s] linear speed damping

    let course = vec![
        Waypoint::new(0.0, 0.0, 5.0),
        Waypoint::new(30.0, 0.0, 5.0),
        Waypoint::new(60.0, 10.0, 4.0),
        Waypoint::new(90.0, 10.0, 4.0),
        Waypoint::new(120.0, 0.0, 3.0),
        Waypoint::new(150.0, 0.0, 3.0),
    ];

    let config = WaypointControllerConfig::default();
    let wheelbase = config.wheelbase;
    let mut controller = WaypointController::new(course.clone(), config).unwrap();

    let mut state = State2D::new(0.0, 3.0, 0.0, 0.0);
    let mut track = vec![(state.x, state.y)];
    let mut time = 0.0;

    while time < sim_time && state.x < 145.0 {
        let cmd = controller.control(&state, time).unwrap();
        let accel = accel_gain * cmd.throttle - drag * state.v;
        state.advance_bicycle(accel, cmd.steer, wheelbase, dt);
        time += dt;
        track.push((state.x, state.y));
    }

    println!(
        "finished at x {:.1} m, y {:.1} m, v {:.2} m/s after {:.1} s",
        state.x, state.y, state.v, time
    );

    let course_points: Vec<(f64, f64)> = course.iter().map(|w| (w.x, w.y)).collect();

    let s0: Plot = Plot::new(course_points).line_style(
        LineStyle::new()
            .colour("#000000"),
    );

    let s1: Plot = Plot::new(track).line_style(
        LineStyle::new()
            .colour("#35C788"),
    );

    let v = ContinuousView::new()
        .add(s0)
        .add(s1)
        .x_range(0., 150.)
        .y_range(-10., 20.)
        .x_label("x [m]")
        .y_label("y [m]");

    Page::single(&v).save("./img/waypoint_tracking.svg").unwrap();
}
