use glam::Vec2;
use ground_speed::error::SpeedError;
use ground_speed::filter::{median_ground_distance, EmptyFilterPolicy, SpeedBand};

/// A band wide enough to accept everything, for median-selection tests.
fn open_band() -> SpeedBand {
    SpeedBand {
        min_kmh: 0.001,
        max_kmh: 1.0e9,
    }
}

#[test]
fn test_odd_count_picks_exact_middle() {
    // Displacements 1.41, 2.83, 4.24 px -> the median pair is the 2.83 one.
    let c1 = vec![Vec2::ZERO, Vec2::ZERO, Vec2::ZERO];
    let c2 = vec![
        Vec2::new(1.0, 1.0),
        Vec2::new(2.0, 2.0),
        Vec2::new(3.0, 3.0),
    ];
    let sel = median_ground_distance(
        &c1,
        &c2,
        35.0,
        12648.0,
        open_band(),
        EmptyFilterPolicy::Raise,
    )
    .unwrap();

    assert!((sel.distance_px - 8.0_f64.sqrt()).abs() < 1e-6);
    assert_eq!(sel.pair.1, Vec2::new(2.0, 2.0));
    assert!((sel.distance_m - 8.0_f64.sqrt() * 126.48).abs() < 1e-6);
}

#[test]
fn test_even_count_picks_lower_middle() {
    // Distances 1, 2, 3, 4 px: lower middle is 2, never the average 2.5.
    let c1 = vec![Vec2::ZERO; 4];
    let c2 = vec![
        Vec2::new(1.0, 0.0),
        Vec2::new(2.0, 0.0),
        Vec2::new(3.0, 0.0),
        Vec2::new(4.0, 0.0),
    ];
    let sel = median_ground_distance(
        &c1,
        &c2,
        35.0,
        100.0,
        open_band(),
        EmptyFilterPolicy::Raise,
    )
    .unwrap();

    assert!((sel.distance_px - 2.0).abs() < 1e-6);
    assert_eq!(sel.pair.1, Vec2::new(2.0, 0.0));
}

#[test]
fn test_selection_unordered_input() {
    // Input order must not matter: sorting happens inside.
    let c1 = vec![Vec2::ZERO; 3];
    let c2 = vec![
        Vec2::new(9.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(5.0, 0.0),
    ];
    let sel = median_ground_distance(
        &c1,
        &c2,
        35.0,
        100.0,
        open_band(),
        EmptyFilterPolicy::Raise,
    )
    .unwrap();
    assert!((sel.distance_px - 5.0).abs() < 1e-6);
}

#[test]
fn test_band_filters_implausible_speed() {
    // 50 px at 12648 cm/px over 35 s is ~650 km/h, far outside [6, 9] km/h.
    // One honest 0.5 px pair sits inside the band and must win.
    let band = SpeedBand::default();
    // speed(d_px) = d_px * 126.48 m / 35 s -> 0.5 px is ~6.5 km/h.
    let c1 = vec![Vec2::ZERO, Vec2::ZERO];
    let c2 = vec![Vec2::new(50.0, 0.0), Vec2::new(0.5, 0.0)];

    let sel =
        median_ground_distance(&c1, &c2, 35.0, 12648.0, band, EmptyFilterPolicy::Raise).unwrap();
    assert!((sel.distance_px - 0.5).abs() < 1e-6);
}

#[test]
fn test_all_filtered_raise_reports_pixel_bounds() {
    // Pure 50 px translation: every pair implies ~650 km/h, the filter
    // empties, and the raise policy must report the implied pixel window.
    let c1 = vec![Vec2::ZERO; 3];
    let c2 = vec![Vec2::new(50.0, 0.0); 3];
    let err = median_ground_distance(
        &c1,
        &c2,
        35.0,
        12648.0,
        SpeedBand::default(),
        EmptyFilterPolicy::Raise,
    )
    .unwrap_err();

    match &err {
        SpeedError::NoPlausiblePairs {
            min_px, max_px, ..
        } => {
            // 6 km/h * 35 s = 58.33 m -> 0.46 px; 9 km/h -> 87.5 m -> 0.69 px.
            assert!((min_px - 0.4612).abs() < 1e-3, "min {min_px}");
            assert!((max_px - 0.6918).abs() < 1e-3, "max {max_px}");
        }
        other => panic!("expected NoPlausiblePairs, got {other:?}"),
    }
    let msg = err.to_string();
    assert!(msg.contains("0.46"), "{msg}");
    assert!(msg.contains("0.69"), "{msg}");
}

#[test]
fn test_all_filtered_fallback_uses_unfiltered() {
    let c1 = vec![Vec2::ZERO; 3];
    let c2 = vec![
        Vec2::new(50.0, 0.0),
        Vec2::new(51.0, 0.0),
        Vec2::new(52.0, 0.0),
    ];
    let sel = median_ground_distance(
        &c1,
        &c2,
        35.0,
        12648.0,
        SpeedBand::default(),
        EmptyFilterPolicy::FallbackUnfiltered,
    )
    .unwrap();
    assert!((sel.distance_px - 51.0).abs() < 1e-6);
    assert!((sel.distance_m - 51.0 * 126.48).abs() < 1e-3);
}

#[test]
fn test_zero_displacement_is_filtered() {
    // Identical images: zero distance implies zero speed, outside [6, 9].
    let c1 = vec![Vec2::new(10.0, 10.0); 4];
    let c2 = vec![Vec2::new(10.0, 10.0); 4];

    let err = median_ground_distance(
        &c1,
        &c2,
        35.0,
        12648.0,
        SpeedBand::default(),
        EmptyFilterPolicy::Raise,
    )
    .unwrap_err();
    assert!(matches!(err, SpeedError::NoPlausiblePairs { .. }));

    // A band including 0 keeps it.
    let band = SpeedBand {
        min_kmh: 0.0,
        max_kmh: 9.0,
    };
    let sel =
        median_ground_distance(&c1, &c2, 35.0, 12648.0, band, EmptyFilterPolicy::Raise).unwrap();
    assert_eq!(sel.distance_m, 0.0);

    let sel = median_ground_distance(
        &c1,
        &c2,
        35.0,
        12648.0,
        SpeedBand::default(),
        EmptyFilterPolicy::FallbackUnfiltered,
    )
    .unwrap();
    assert_eq!(sel.distance_m, 0.0);
}

#[test]
fn test_band_bounds_inclusive() {
    // 1 m/px GSD over 3600 s: 6000 px -> exactly 6.0 km/h.
    let c1 = vec![Vec2::ZERO];
    let c2 = vec![Vec2::new(6000.0, 0.0)];
    let sel = median_ground_distance(
        &c1,
        &c2,
        3600.0,
        100.0,
        SpeedBand::default(),
        EmptyFilterPolicy::Raise,
    )
    .unwrap();
    assert!((sel.distance_px - 6000.0).abs() < 1e-6);
}

#[test]
fn test_validation_errors() {
    let c1 = vec![Vec2::ZERO];
    let c2 = vec![Vec2::new(1.0, 0.0)];

    assert!(matches!(
        median_ground_distance(&c1, &c2, 0.0, 100.0, open_band(), EmptyFilterPolicy::Raise),
        Err(SpeedError::InvalidElapsedTime(_))
    ));
    assert!(matches!(
        median_ground_distance(&c1, &c2, -5.0, 100.0, open_band(), EmptyFilterPolicy::Raise),
        Err(SpeedError::InvalidElapsedTime(_))
    ));
    assert!(median_ground_distance(&c1, &c2, 35.0, 0.0, open_band(), EmptyFilterPolicy::Raise)
        .is_err());
    assert!(median_ground_distance(&[], &[], 35.0, 100.0, open_band(), EmptyFilterPolicy::Raise)
        .is_err());

    let inverted = SpeedBand {
        min_kmh: 9.0,
        max_kmh: 6.0,
    };
    assert!(
        median_ground_distance(&c1, &c2, 35.0, 100.0, inverted, EmptyFilterPolicy::Raise)
            .is_err()
    );
}

#[test]
fn test_deterministic() {
    let c1 = vec![Vec2::ZERO; 5];
    let c2: Vec<Vec2> = (1..=5).map(|i| Vec2::new(i as f32, i as f32)).collect();

    let a = median_ground_distance(&c1, &c2, 35.0, 100.0, open_band(), EmptyFilterPolicy::Raise)
        .unwrap();
    let b = median_ground_distance(&c1, &c2, 35.0, 100.0, open_band(), EmptyFilterPolicy::Raise)
        .unwrap();
    assert_eq!(a.distance_m, b.distance_m);
    assert_eq!(a.pair, b.pair);
}
