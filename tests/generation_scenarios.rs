// tests/generation_scenarios.rs
use glam::Vec2;
use symbios_roads::{
    Cardinal, Constant, Generator, GeneratorConfig, GeneratorError, Grammar, RoadType,
};

#[test]
fn test_saturated_world_connects_seed_centers() {
    let config = GeneratorConfig::default();
    let mut generator = Generator::new("H", Grammar::standard().unwrap(), config)
        .unwrap()
        .with_fields(Constant(1.0), Constant(1.0));
    generator.expand(1).unwrap();

    // 19 x 19 dense grid points plus the two seeds.
    assert_eq!(generator.population_centers().len(), 19 * 19 + 2);
    assert_eq!(generator.intersections().len(), 21 * 81);
    assert_eq!(generator.turtle().road_type, RoadType::Highway);
    assert!(!generator.highways().is_empty());

    let radius = generator.config().radius;
    for seed in [Vec2::new(-0.25, 0.5), Vec2::new(0.5, 0.25)] {
        let reached = generator
            .highways()
            .iter()
            .any(|h| h.start.distance(seed) < radius || h.end.distance(seed) < radius);
        assert!(reached, "no highway reaches {seed:?}");
    }
}

#[test]
fn test_intersection_stubs_record_no_segments() {
    let config = GeneratorConfig {
        seed_centers: Vec::new(),
        ..Default::default()
    };
    let mut generator = Generator::new("H", Grammar::standard().unwrap(), config)
        .unwrap()
        .with_fields(Constant(1.0), Constant(0.5));

    let poses = generator.expand(1).unwrap().len();
    let nodes = generator.intersections().len();
    assert_eq!(poses, 4 * nodes);
    assert!(generator.roads().is_empty());
    assert!(generator.highways().is_empty());
    assert!(
        generator
            .intersections()
            .iter()
            .all(|i| i.north && i.south && i.east && i.west)
    );

    // Every round re-emits a stub for each direction that is still viable.
    let poses = generator.expand(2).unwrap().len();
    assert_eq!(poses, 2 * 4 * nodes);
    assert_eq!(poses, 13608);
    let poses = generator.expand(3).unwrap().len();
    assert_eq!(poses, 3 * 4 * nodes);
}

#[test]
fn test_intersection_stub_respects_population() {
    let config = GeneratorConfig {
        seed_centers: Vec::new(),
        ..Default::default()
    };
    let south_only = |p: Vec2| if p.y > 0.01 { 0.0_f32 } else { 1.0 };
    let mut generator = Generator::new("H", Grammar::standard().unwrap(), config)
        .unwrap()
        .with_fields(Constant(1.0), south_only);
    generator.expand(1).unwrap();

    let origin = generator
        .intersections()
        .iter()
        .find(|i| i.center.length() < 1e-3)
        .expect("grid has a node at the origin");
    assert!(!origin.is_open(Cardinal::North));
    assert!(origin.is_open(Cardinal::East));
    assert!(origin.is_open(Cardinal::South));
    assert!(origin.is_open(Cardinal::West));
}

#[test]
fn test_stubs_need_dry_land() {
    let config = GeneratorConfig {
        seed_centers: Vec::new(),
        ..Default::default()
    };
    let mut generator = Generator::new("H", Grammar::standard().unwrap(), config)
        .unwrap()
        .with_fields(Constant(0.2), Constant(1.0));

    assert!(generator.expand(2).unwrap().is_empty());
    assert!(generator.population_centers().is_empty());
}

#[test]
fn test_runs_are_deterministic() {
    let run = || {
        let mut generator =
            Generator::new("H", Grammar::standard().unwrap(), GeneratorConfig::default()).unwrap();
        let expanded = generator.expand(2).unwrap().to_vec();
        let drawn = generator.draw().unwrap();
        (expanded, drawn)
    };

    let (expanded_a, drawn_a) = run();
    let (expanded_b, drawn_b) = run();

    let bits = |poses: &[glam::Mat3]| -> Vec<u32> {
        poses
            .iter()
            .flat_map(|m| m.to_cols_array())
            .map(f32::to_bits)
            .collect()
    };
    assert_eq!(bits(&expanded_a), bits(&expanded_b));
    assert_eq!(bits(&drawn_a), bits(&drawn_b));
}

#[test]
fn test_draw_uses_rewritten_axiom() {
    let mut generator =
        Generator::new("H", Grammar::standard().unwrap(), GeneratorConfig::default()).unwrap();
    assert_eq!(
        generator.derive().unwrap(),
        "hhhh[n[llL][ffF][rrR]][s[llL][ffF][rrR]]hhhh[nF][sF]hhhhEH"
    );

    generator.draw().unwrap();
    // Twelve highway steps at least; the unrewritten "H" would draw nothing.
    assert!(generator.roads().len() >= 12);
}

#[test]
fn test_invalid_inputs_fail_fast() {
    let negative = Generator::new("H", Grammar::standard().unwrap(), GeneratorConfig::default())
        .unwrap()
        .expand(-1)
        .map(|poses| poses.len());
    assert!(matches!(
        negative,
        Err(GeneratorError::InvalidConfiguration(_))
    ));

    let empty_axiom = Generator::new("", Grammar::standard().unwrap(), GeneratorConfig::default());
    assert!(matches!(
        empty_axiom,
        Err(GeneratorError::InvalidConfiguration(_))
    ));

    let config = GeneratorConfig {
        road_length: 0.0,
        ..Default::default()
    };
    let zero_length = Generator::new("H", Grammar::standard().unwrap(), config);
    assert!(matches!(
        zero_length,
        Err(GeneratorError::InvalidConfiguration(_))
    ));
}

#[test]
fn test_partial_config_fills_defaults() {
    let config: GeneratorConfig =
        serde_json::from_str(r#"{ "radius": 0.2, "branching_enabled": true }"#).unwrap();

    assert_eq!(config.radius, 0.2);
    assert!(config.branching_enabled);
    assert_eq!(config.highway_length, 0.1);
    assert_eq!(config.seed_centers.len(), 2);
    assert!(config.validate().is_ok());
}
