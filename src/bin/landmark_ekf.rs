// Landmark based EKF localization sample
//
// A differential drive robot circles among surveyed landmarks. Wheel
// odometry is corrupted with noise and the filter corrects the pose
// with range and bearing observations of the landmarks.

use itertools::izip;
use nalgebra::{Matrix2, Matrix3, Vector2, Vector3};
use rand_distr::{Distribution, Normal};

use rust_autonomy::common::{ControlInput, Point2D};
use rust_autonomy::localization::{
    motion_model, LandmarkEkf, LandmarkEkfConfig, LandmarkMap, LandmarkObservation, StepRecord,
};
use rust_autonomy::utils::{colors, PathStyle, Visualizer};

fn main() {
    let sim_time = 50.0; // [s]
    let dt = 0.1; // [s]
    let max_range = 20.0; // [m] sensor range

    let v_std: f64 = 0.3; // [m/s] odometry velocity noise
    let omega_std = 10.0_f64.to_radians(); // [rad/s] odometry yaw rate noise
    let range_std: f64 = 0.2; // [m]
    let bearing_std = 1.0_f64.to_radians(); // [rad]

    let landmark_points = vec![
        Point2D::new(10.0, -2.0),
        Point2D::new(15.0, 10.0),
        Point2D::new(3.0, 15.0),
        Point2D::new(-5.0, 20.0),
    ];

    let mut config = LandmarkEkfConfig::default();
    config.q = Matrix2::from_diagonal(&Vector2::new(v_std.powi(2), omega_std.powi(2)));
    config.r = Matrix2::from_diagonal(&Vector2::new(range_std.powi(2), bearing_std.powi(2)));

    let mut ekf = LandmarkEkf::new(
        Vector3::zeros(),
        Matrix3::identity() * 0.1,
        LandmarkMap::from_points(landmark_points.clone()),
        config,
    )
    .unwrap();

    let normal = Normal::new(0.0, 1.0).unwrap();
    let mut rng = rand::thread_rng();

    let u = ControlInput::new(1.0, 0.1);
    let mut x_true = Vector3::<f64>::zeros();
    let mut x_dr = Vector3::<f64>::zeros();

    let mut truth_x = vec![x_true[0]];
    let mut truth_y = vec![x_true[1]];
    let mut dr_x = vec![x_dr[0]];
    let mut dr_y = vec![x_dr[1]];
    let mut est_x = vec![0.0];
    let mut est_y = vec![0.0];
    let mut ellipses = Vec::new();

    let mut time = 0.0;
    let mut step = 0;
    while time < sim_time {
        time += dt;
        step += 1;

        let ud = ControlInput::new(
            u.v + normal.sample(&mut rng) * v_std,
            u.omega + normal.sample(&mut rng) * omega_std,
        );

        x_true = motion_model(&x_true, &u, dt);
        x_dr = motion_model(&x_dr, &ud, dt);

        let mut observations = Vec::new();
        for (id, lm) in landmark_points.iter().enumerate() {
            let dx = lm.x - x_true[0];
            let dy = lm.y - x_true[1];
            let d = (dx * dx + dy * dy).sqrt();
            if d <= max_range {
                let range = d + normal.sample(&mut rng) * range_std;
                let bearing = dy.atan2(dx) - x_true[2] + normal.sample(&mut rng) * bearing_std;
                observations.push(LandmarkObservation::new(id, range, bearing));
            }
        }

        let record = StepRecord::new(time, ud, observations);
        let estimate = ekf.step(&record).unwrap();

        truth_x.push(x_true[0]);
        truth_y.push(x_true[1]);
        dr_x.push(x_dr[0]);
        dr_y.push(x_dr[1]);
        est_x.push(estimate.pose[0]);
        est_y.push(estimate.pose[1]);

        if step % 50 == 0 {
            let center = Point2D::new(estimate.pose[0], estimate.pose[1]);
            let position_cov = estimate.covariance.fixed_view::<2, 2>(0, 0).into_owned();
            ellipses.push((center, position_cov));
        }
    }

    let n = truth_x.len() as f64;
    let dr_sq: f64 = izip!(&truth_x, &truth_y, &dr_x, &dr_y)
        .map(|(tx, ty, dx, dy)| (tx - dx).powi(2) + (ty - dy).powi(2))
        .sum();
    let est_sq: f64 = izip!(&truth_x, &truth_y, &est_x, &est_y)
        .map(|(tx, ty, ex, ey)| (tx - ex).powi(2) + (ty - ey).powi(2))
        .sum();
    println!("dead reckoning rms error: {:.3} m", (dr_sq / n).sqrt());
    println!("ekf estimate rms error:   {:.3} m", (est_sq / n).sqrt());
    let pose = ekf.get_pose();
    println!(
        "final pose: x {:.2} m, y {:.2} m, yaw {:.1} deg",
        pose[0],
        pose[1],
        pose[2].to_degrees()
    );
    println!("final covariance trace: {:.4}", ekf.get_covariance_matrix().trace());

    let mut vis = Visualizer::new();
    vis.set_title("Landmark EKF localization")
        .set_x_range(-15.0, 25.0)
        .set_y_range(-5.0, 30.0);
    vis.plot_landmarks(&landmark_points);
    vis.plot_path_xy(&truth_x, &truth_y, &PathStyle::new(colors::GROUND_TRUTH, "Ground truth"));
    vis.plot_path_xy(&dr_x, &dr_y, &PathStyle::new(colors::DEAD_RECKONING, "Dead reckoning"));
    vis.plot_path_xy(&est_x, &est_y, &PathStyle::new(colors::ESTIMATED, "EKF estimate"));
    for (center, cov) in &ellipses {
        vis.plot_covariance_ellipse(*center, cov, 2.0);
    }
    if let Err(e) = vis.save_svg("./img/landmark_ekf.svg") {
        eprintln!("failed to save plot: {}", e);
    }
}
