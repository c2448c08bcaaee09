use vista_geom::{Ray, Vec3};
use vista_stream::raycast::{BISECTION_STEPS, raycast};

fn close(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

#[test]
fn straight_down_onto_flat_ground() {
    let ground = |_x: f32, _z: f32| Some(2.0f32);
    let ray = Ray::new(Vec3::new(5.0, 12.0, -3.0), Vec3::DOWN);
    let hit = raycast(&ground, &ray, 100.0).expect("hit");
    assert!(close(hit.distance, 10.0, 0.01), "{hit:?}");
    assert!(close(hit.point.y, 2.0, 0.01));
    assert_eq!(hit.normal, Vec3::UP);
    assert!(BISECTION_STEPS >= 8);
}

#[test]
fn oblique_ray_onto_slope() {
    // ground rises with x: y = 0.5 x
    let slope = |x: f32, _z: f32| Some(0.5 * x);
    let ray = Ray::new(Vec3::new(0.0, 20.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
    let hit = raycast(&slope, &ray, 200.0).expect("hit");
    assert!(close(hit.point.x, 40.0, 0.05), "{hit:?}");
    assert!(close(hit.distance, 40.0, 0.05));
    let expect = Vec3::new(-0.5, 1.0, 0.0).normalized();
    assert!((hit.normal - expect).length() < 1e-4);
}

#[test]
fn parallel_ray_misses() {
    let ground = |_x: f32, _z: f32| Some(0.0f32);
    let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
    assert!(raycast(&ground, &ray, 1000.0).is_none());
}

#[test]
fn origin_below_ground_hits_immediately() {
    let ground = |_x: f32, _z: f32| Some(10.0f32);
    let ray = Ray::new(Vec3::new(0.0, 3.0, 0.0), Vec3::new(0.3, 1.0, 0.0));
    let hit = raycast(&ground, &ray, 50.0).expect("hit");
    assert_eq!(hit.distance, 0.0);
    assert_eq!(hit.point, Vec3::new(0.0, 3.0, 0.0));
}

#[test]
fn max_distance_is_respected() {
    let ground = |_x: f32, _z: f32| Some(0.0f32);
    let ray = Ray::new(Vec3::new(0.0, 30.0, 0.0), Vec3::DOWN);
    assert!(raycast(&ground, &ray, 29.0).is_none());
    assert!(raycast(&ground, &ray, 30.5).is_some());
    assert!(raycast(&ground, &ray, 0.0).is_none());
    assert!(raycast(&ground, &ray, f32::INFINITY).is_none());
}

#[test]
fn degenerate_ray_never_hits() {
    let ground = |_x: f32, _z: f32| Some(100.0f32);
    let ray = Ray::new(Vec3::ZERO, Vec3::ZERO);
    assert!(raycast(&ground, &ray, 10.0).is_none());
}

#[test]
fn unloaded_ground_is_crossed() {
    // nothing below x < 64, a wall of ground beyond
    let island = |x: f32, _z: f32| if x < 64.0 { None } else { Some(50.0f32) };
    let ray = Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
    let hit = raycast(&island, &ray, 500.0).expect("hit");
    assert!(hit.point.x >= 64.0 && hit.point.x < 64.0 + 16.0, "{hit:?}");
    let void = |_x: f32, _z: f32| -> Option<f32> { None };
    assert!(raycast(&void, &ray, 500.0).is_none());
}

#[test]
fn grazing_ray_over_hill() {
    // a bump of height 5 centred at x = 100
    let hill = |x: f32, _z: f32| Some((5.0 - 0.01 * (x - 100.0).powi(2)).max(0.0));
    let low = Ray::new(Vec3::new(0.0, 4.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
    let hit = raycast(&hill, &low, 300.0).expect("hit");
    // 5 - 0.01 d² = 4  =>  d = 10
    assert!(close(hit.point.x, 90.0, 0.1), "{hit:?}");
    let high = Ray::new(Vec3::new(0.0, 6.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
    assert!(raycast(&hill, &high, 300.0).is_none());
}

#[test]
fn huge_max_distance_still_terminates() {
    let (tx, rx) = crossbeam_channel::bounded(1);
    std::thread::spawn(move || {
        let void = |_x: f32, _z: f32| -> Option<f32> { None };
        let across = Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let ground = |_x: f32, _z: f32| Some(0.0f32);
        let up = Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::UP);
        let _ = tx.send((raycast(&void, &across, 1.0e9), raycast(&ground, &up, 1.0e9)));
    });
    let (across, up) = rx
        .recv_timeout(std::time::Duration::from_secs(120))
        .expect("raycast returned");
    assert!(across.is_none());
    assert!(up.is_none());
}
