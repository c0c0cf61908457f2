use rgb_controller::matrix::{ColorGroup, DEFAULT_PALETTE, GROUP_COUNT};
use rgb_controller::{Color, MatrixConfig};

fn lit_slots(group: &ColorGroup) -> Vec<usize> {
    group
        .units
        .iter()
        .enumerate()
        .filter(|(_, c)| **c != Color::BLACK)
        .map(|(i, _)| i)
        .collect()
}

#[test]
fn breathe_loop_end() {
    let mut config = MatrixConfig::new();
    config.set_breathe(&[Color::RED]);
    assert_eq!(config.loop_end, 1);

    let mut config = MatrixConfig::new();
    config.set_breathe(&[Color::RED; 6]);
    assert_eq!(config.loop_end, 9);
}

#[test]
fn breathe_interleaves_dark_and_lit() {
    let colors = [Color::RED, Color::GREEN];
    let mut config = MatrixConfig::new();
    config.set_breathe(&colors);

    for group in config.groups.iter() {
        assert_eq!(group.units[0], Color::BLACK);
        assert_eq!(group.units[1], Color::RED);
        assert_eq!(group.units[2], Color::BLACK);
        assert_eq!(group.units[3], Color::GREEN);
        assert!(group.units[4..].iter().all(|c| *c == Color::BLACK));
    }
}

#[test]
fn breathe_defaults_to_blue() {
    let mut config = MatrixConfig::new();
    config.set_breathe(&[]);
    assert_eq!(config.loop_end, 1);
    assert_eq!(lit_slots(&config.groups[9]), vec![1]);
    assert_eq!(config.groups[9].units[1], Color::BLUE);
}

#[test]
fn rotate_without_colors_uses_default_palette() {
    let mut empty = MatrixConfig::new();
    empty.set_rotate(&[]);
    let mut explicit = MatrixConfig::new();
    explicit.set_rotate(&DEFAULT_PALETTE);
    assert_eq!(empty, explicit);
    assert_eq!((empty.loop_start, empty.loop_end), (0, 5));
}

#[test]
fn rotate_shifts_one_slot_per_group() {
    let mut config = MatrixConfig::new();
    config.set_rotate(&[Color::RED, Color::GREEN, Color::BLUE]);

    assert_eq!(config.groups[0].units[0], Color::RED);
    assert_eq!(config.groups[0].units[1], Color::GREEN);
    assert_eq!(config.groups[1].units[5], Color::RED);
    assert_eq!(config.groups[1].units[0], Color::GREEN);
    assert_eq!(config.groups[5].units[1], Color::RED);
    for group in &config.groups[6..] {
        assert!(lit_slots(group).is_empty());
    }
}

#[test]
fn multicolor_without_colors_uses_default_palette() {
    let mut config = MatrixConfig::new();
    config.set_multicolor(&[]);
    assert_eq!((config.loop_start, config.loop_end), (0, 0));
    for (j, color) in DEFAULT_PALETTE.iter().enumerate() {
        assert_eq!(config.groups[j].units[0], *color);
        assert_eq!(config.groups[j + 3].units[0], *color);
    }
}

#[test]
fn multicolor_ignores_extra_colors() {
    let mut config = MatrixConfig::new();
    config.set_multicolor(&[Color::WHITE, Color::RED, Color::GREEN, Color::BLUE]);
    assert!(lit_slots(&config.groups[6]).is_empty());
    assert_eq!(config.groups[5].units[0], Color::GREEN);
}

#[test]
fn pure_lights_first_slot_of_every_group() {
    let mut config = MatrixConfig::new();
    config.set_breathe(&[Color::GREEN; 4]);
    config.set_pure(Color::RED);

    assert_eq!(config.loop_end, 0);
    for group in config.groups.iter() {
        assert_eq!(lit_slots(group), vec![0]);
        assert_eq!(group.units[0], Color::RED);
    }
    assert_eq!(config.groups.len(), GROUP_COUNT);
}
