// Minimal smoke run with procedurally generated sprites

use sprite_animator::{
    config::Config,
    frame::{Background, MemorySink},
    sprite::{FrameElement, Sprite},
    transform::{Param, TransformSpec},
    Animator,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🎬 Testing Sprite-Animator Core Functionality");

    // Test 1: Procedural sprites
    println!("\n1. Building a 4-sprite walk cycle...");
    let walk = (0..4u8)
        .map(|i| Sprite::filled(16, 24, [60 * i, 120, 255 - 60 * i, 255]))
        .collect::<Result<Vec<_>, _>>()?;
    let cat = FrameElement::new("cat").with_event("walk", walk)?;
    println!("   Events: {:?}", cat.events());

    // Test 2: Animator with an in-memory sink
    println!("\n2. Creating animator...");
    let mut animator = Animator::with_sink(Config::default(), MemorySink::new())?;
    animator.set_background(Background::solid(200, 100, [255, 255, 255, 255]));
    animator.add_element(cat);
    animator.element_mut("cat")?.set_position(10.0, 40.0);

    // Test 3: Motion run
    println!("\n3. Rendering 12 frames...");
    let spec = TransformSpec::identity()
        .translate(Param::linear(0.0, 10.0), 0.0)
        .rotate(Param::linear(0.0, 7.5));
    let reports = animator.animate("cat", "walk", &spec, 0..12, Some(4))?;
    println!("   Saved {} frames", reports.len());

    // Test 4: Hold the last pose
    println!("\n4. Holding the final pose for 3 frames...");
    animator.composite_state("cat", "walk", 3)?;
    animator.save_repeated(3)?;
    println!("   Frame counter: {}", animator.frame_counter());

    let sink = animator.into_sink();
    assert_eq!(sink.len(), 15);

    // Test 5: Write the last frame to disk
    if let Some(frame) = sink.last() {
        match frame.as_image().save("minimal_test_output.png") {
            Ok(()) => println!("   📁 Output saved to: minimal_test_output.png"),
            Err(e) => println!("   ⚠️  Could not save file: {}", e),
        }
    }

    println!("\n🎉 All steps passed! Sprite-Animator core is working.");
    Ok(())
}
