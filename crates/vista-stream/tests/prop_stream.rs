use proptest::prelude::*;
use vista_stream::LodBands;

fn ascending() -> impl Strategy<Value = [f32; 4]> {
    (1.0f32..100.0, 1.0f32..100.0, 1.0f32..100.0, 1.0f32..100.0)
        .prop_map(|(a, b, c, d)| [a, a + b, a + b + c, a + b + c + d])
}

proptest! {
    // a farther tile never gets a finer level
    #[test]
    fn lod_is_monotonic(t in ascending(), d1 in 0.0f32..1000.0, d2 in 0.0f32..1000.0) {
        let bands = LodBands::new(t);
        let (near, far) = if d1 <= d2 { (d1, d2) } else { (d2, d1) };
        prop_assert!(bands.level_for(near) <= bands.level_for(far));
        prop_assert!(bands.level_for(far) <= 4);
    }

    #[test]
    fn lod_matches_band(t in ascending(), d in 0.0f32..1000.0) {
        let level = LodBands::new(t).level_for(d) as usize;
        if level < 4 {
            prop_assert!(d < t[level]);
        }
        if level > 0 {
            prop_assert!(d >= t[level - 1]);
        }
    }
}
