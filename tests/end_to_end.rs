//! End-to-end animation scenarios writing real PNG sequences

use std::path::Path;

use image::{Rgba, RgbaImage};
use sprite_animator::{
    config::{Config, OutputConfig},
    error::{FrameError, FrameWarning},
    frame::{Background, EmptyFramePolicy},
    sprite::{FrameElement, Sprite, SpriteLoader},
    transform::{Param, TransformSpec},
    Animator, AnimatorError,
};
use tempfile::tempdir;

fn config_in(dir: &Path, width: u32, height: u32) -> Config {
    let mut config = Config::default();
    config.output = OutputConfig {
        directory: dir.to_path_buf(),
        ..OutputConfig::default()
    };
    config.frame.width = width;
    config.frame.height = height;
    config
}

/// Four 4x4 sprites, each a distinct opaque color
fn walk_cycle() -> Vec<Sprite> {
    [[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255], [0, 0, 0, 255]]
        .into_iter()
        .map(|color| Sprite::filled(4, 4, color).unwrap())
        .collect()
}

fn read_rgb(path: &Path) -> image::RgbImage {
    image::open(path).unwrap().to_rgb8()
}

#[test]
fn cat_walk_loops_sprites_while_moving() {
    let dir = tempdir().unwrap();
    let mut animator = Animator::new(config_in(dir.path(), 200, 20)).unwrap();
    animator.add_element(FrameElement::new("cat").with_event("walk", walk_cycle()).unwrap());

    let spec = TransformSpec::identity().translate(Param::linear(0.0, 10.0), 0.0);
    let steps = animator.run("cat", "walk", &spec, 0..12, Some(4)).unwrap();

    assert!(steps[0].sprite.same_asset(&steps[4].sprite));
    assert_eq!(steps[4].sprite_index, 0);
    assert_eq!(steps[4].placement(), (40, 0));

    for step in &steps {
        animator.composite_step(step).unwrap();
        animator.save().unwrap();
    }
    assert_eq!(animator.frame_counter(), 12);

    let frame_4 = read_rgb(&dir.path().join("Frame_004.png"));
    assert_eq!(frame_4.dimensions(), (200, 20));
    assert_eq!(frame_4.get_pixel(40, 0).0, [255, 0, 0]);
    assert_eq!(frame_4.get_pixel(39, 0).0, [255, 255, 255]);

    let frame_7 = read_rgb(&dir.path().join("Frame_007.png"));
    assert_eq!(frame_7.get_pixel(72, 2).0, [0, 0, 0]);
    assert!(dir.path().join("Frame_011.png").exists());
    assert!(!dir.path().join("Frame_012.png").exists());
}

#[test]
fn empty_first_save_writes_background_and_warns() {
    let dir = tempdir().unwrap();
    let mut animator = Animator::new(config_in(dir.path(), 100, 100)).unwrap();

    let report = animator.save().unwrap();
    assert_eq!(report.warning, Some(FrameWarning::EmptyFrame { frame_index: 0 }));
    assert_eq!(report.artifacts.len(), 1);

    let frame = read_rgb(&report.artifacts[0].location);
    assert_eq!(frame.dimensions(), (100, 100));
    assert!(frame.pixels().all(|p| p.0 == [255, 255, 255]));
}

#[test]
fn strict_policy_refuses_empty_frames() {
    let dir = tempdir().unwrap();
    let mut config = config_in(dir.path(), 10, 10);
    config.frame.empty_frame_policy = EmptyFramePolicy::Error;
    let mut animator = Animator::new(config).unwrap();

    let err = animator.save().unwrap_err();
    assert!(matches!(err, AnimatorError::Frame(FrameError::EmptyFrame { frame_index: 0 })));
    assert_eq!(animator.frame_counter(), 0);
    assert!(!dir.path().join("Frame_000.png").exists());
}

#[test]
fn held_pose_and_background_image() {
    let dir = tempdir().unwrap();
    let mut animator = Animator::new(config_in(&dir.path().join("frames"), 10, 10)).unwrap();

    let scene = Sprite::new(RgbaImage::from_pixel(30, 12, Rgba([0, 100, 0, 255]))).unwrap();
    animator.set_background(Background::image(scene));
    animator.create_element("cat");
    animator.register_event("cat", "sit", walk_cycle()).unwrap();
    animator.element_mut("cat").unwrap().set_position(26.0, 10.0);

    animator.composite_state("cat", "sit", 1).unwrap();
    let report = animator.save_repeated(3).unwrap();
    assert_eq!(report.artifacts.len(), 3);

    for index in 0..3 {
        let frame = read_rgb(&dir.path().join("frames").join(format!("Frame_{:03}.png", index)));
        assert_eq!(frame.dimensions(), (30, 12));
        // Clipped at the bottom-right corner
        assert_eq!(frame.get_pixel(29, 11).0, [0, 255, 0]);
        assert_eq!(frame.get_pixel(25, 11).0, [0, 100, 0]);
    }
}

#[test]
fn rotated_sprite_turns_around_its_centre() {
    let dir = tempdir().unwrap();
    let mut animator = Animator::new(config_in(dir.path(), 40, 40)).unwrap();

    let bar = Sprite::filled(8, 2, [255, 0, 0, 255]).unwrap();
    animator.add_element(FrameElement::new("bar").with_event("idle", vec![bar]).unwrap());

    let spec = TransformSpec::identity().rotate(90.0);
    animator.composite("bar", "idle", 0, &spec, (16.0, 19.0)).unwrap();
    animator.save().unwrap();

    // An 8x2 bar centred on (20, 20) becomes a 2x8 bar centred on the same point
    let frame = read_rgb(&dir.path().join("Frame_000.png"));
    assert_eq!(frame.get_pixel(19, 16).0, [255, 0, 0]);
    assert_eq!(frame.get_pixel(20, 23).0, [255, 0, 0]);
    assert_eq!(frame.get_pixel(16, 19).0, [255, 255, 255]);
}

#[test]
fn element_loaded_from_disk_with_color_key() {
    let dir = tempdir().unwrap();
    let walking = dir.path().join("Cat").join("Walking");
    std::fs::create_dir_all(&walking).unwrap();
    for (i, color) in [[200, 0, 0, 255], [0, 200, 0, 255]].iter().enumerate() {
        let mut image = RgbaImage::from_pixel(3, 3, Rgba(*color));
        image.put_pixel(0, 0, Rgba([60, 60, 60, 255]));
        image.save(walking.join(format!("walk_{:03}.png", i))).unwrap();
    }

    let mut config = config_in(&dir.path().join("out"), 8, 8);
    config.sprites.color_key = Some([60, 60, 60]);
    let mut animator = Animator::new(config).unwrap();
    animator.load_element("cat", dir.path().join("Cat")).unwrap();

    animator.composite("cat", "Walking", 1, &TransformSpec::identity(), (2.0, 2.0)).unwrap();
    animator.save().unwrap();

    let frame = read_rgb(&dir.path().join("out").join("Frame_000.png"));
    assert_eq!(frame.get_pixel(2, 2).0, [255, 255, 255]);
    assert_eq!(frame.get_pixel(3, 3).0, [0, 200, 0]);

    let sprites = SpriteLoader::new().load_sequence(&walking, "walk_").unwrap();
    assert_eq!(sprites.len(), 2);
}
