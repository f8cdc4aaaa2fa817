use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use crate::{
    config::Config,
    error::{AnimatorError, AssetError, Result},
    frame::{Background, FrameBuffer, FrameSink, PngSequenceWriter, SaveReport},
    motion::{MotionEvaluator, MotionStep},
    sprite::{FrameElement, MotionState, Sprite, SpriteLoader},
    transform::{ResolvedTransform, TransformEngine, TransformSpec, Vec2},
};

/// Script-facing animation session
///
/// The animator owns the frame elements, the transform engine and the frame
/// buffer, and is what an animation script drives:
/// 1. Element setup - create elements and register their event sequences
/// 2. Frame assembly - composite transformed sprites onto the canvas
/// 3. Output - save the canvas as the next frame of the sequence
pub struct Animator<S: FrameSink = PngSequenceWriter> {
    config: Config,
    elements: HashMap<String, FrameElement>,
    engine: TransformEngine,
    loader: SpriteLoader,
    buffer: FrameBuffer<S>,
}

impl Animator<PngSequenceWriter> {
    /// Create an animator writing a PNG sequence as configured
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let buffer = FrameBuffer::from_config(&config.frame, &config.output);
        Ok(Self::assemble(config, buffer))
    }
}

impl<S: FrameSink> Animator<S> {
    /// Create an animator that hands finished frames to `sink`
    pub fn with_sink(config: Config, sink: S) -> Result<Self> {
        config.validate()?;
        let buffer = FrameBuffer::new(Background::from_config(&config.frame), sink)
            .with_empty_frame_policy(config.frame.empty_frame_policy);
        Ok(Self::assemble(config, buffer))
    }

    fn assemble(config: Config, buffer: FrameBuffer<S>) -> Self {
        info!(
            "Animator ready: {}x{} canvas, {:?} sampling",
            config.frame.width, config.frame.height, config.transform.sampling
        );
        Self {
            engine: TransformEngine::from_config(&config.transform),
            loader: SpriteLoader::from_config(&config.sprites),
            elements: HashMap::new(),
            buffer,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Sprite loader configured for this session
    pub fn loader(&self) -> &SpriteLoader {
        &self.loader
    }

    pub fn engine(&self) -> &TransformEngine {
        &self.engine
    }

    // ==========================================
    // ELEMENTS
    // ==========================================

    /// Add an element, replacing any element with the same name
    pub fn add_element(&mut self, element: FrameElement) -> Option<FrameElement> {
        debug!("Adding element '{}'", element.name());
        self.elements.insert(element.name().to_string(), element)
    }

    /// Get the named element, creating an empty one if needed
    pub fn create_element(&mut self, name: &str) -> &mut FrameElement {
        self.elements
            .entry(name.to_string())
            .or_insert_with(|| FrameElement::new(name))
    }

    /// Load an element from a folder with one subdirectory per event
    pub fn load_element<P: AsRef<Path>>(&mut self, name: &str, directory: P) -> Result<&mut FrameElement> {
        let element = self.loader.load_element(name, directory)?;
        self.add_element(element);
        self.element_mut(name)
    }

    pub fn element(&self, name: &str) -> Result<&FrameElement> {
        self.elements.get(name).ok_or_else(|| unknown_element(name))
    }

    pub fn element_mut(&mut self, name: &str) -> Result<&mut FrameElement> {
        self.elements.get_mut(name).ok_or_else(|| unknown_element(name))
    }

    /// Element names in alphabetical order
    pub fn element_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.elements.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Register `sprites` as `event` of an existing element
    pub fn register_event(&mut self, element: &str, event: &str, sprites: Vec<Sprite>) -> Result<()> {
        self.element_mut(element)?.register_event(event, sprites)
    }

    // ==========================================
    // FRAME ASSEMBLY
    // ==========================================

    /// Replace the background template
    pub fn set_background(&mut self, background: Background) {
        self.buffer.set_background(background);
    }

    /// Use an image file as the background
    pub fn set_background_image<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let sprite = self.loader.load(path)?;
        self.set_background(Background::image(sprite));
        Ok(())
    }

    /// Draw `event` of `element` for `frame_index` with `spec` applied
    ///
    /// `position` is the top-left anchor before translation. The element's
    /// motion state is updated to where the sprite was drawn. Returns whether
    /// any of the sprite landed on the canvas.
    pub fn composite<P: Into<Vec2>>(
        &mut self,
        element: &str,
        event: &str,
        frame_index: u64,
        spec: &TransformSpec,
        position: P,
    ) -> Result<bool> {
        let resolved = self.engine.evaluate(spec, frame_index, None)?;
        let state = MotionState::moved(position.into(), &resolved);

        let target = self.elements.get_mut(element).ok_or_else(|| unknown_element(element))?;
        let sprite = target.get_sprite(event, frame_index)?;
        let visible = draw(&self.engine, &mut self.buffer, sprite, &resolved, state.placement())?;
        target.set_motion_state(state);
        Ok(visible)
    }

    /// Draw sprite `sprite_index` of `event` using the element's current motion state
    pub fn composite_state(&mut self, element: &str, event: &str, sprite_index: u64) -> Result<bool> {
        let target = self.elements.get(element).ok_or_else(|| unknown_element(element))?;
        let state = *target.motion_state();
        let sprite = target.get_sprite(event, sprite_index)?;
        draw(&self.engine, &mut self.buffer, sprite, &state.transform(), state.placement())
    }

    /// Draw one step of a motion run
    pub fn composite_step(&mut self, step: &MotionStep) -> Result<bool> {
        draw(&self.engine, &mut self.buffer, &step.sprite, &step.transform, step.placement())
    }

    /// Save the canvas as the next frame
    pub fn save(&mut self) -> Result<SaveReport> {
        self.buffer.save()
    }

    /// Save the canvas as the next `count` frames
    pub fn save_repeated(&mut self, count: u32) -> Result<SaveReport> {
        self.buffer.save_repeated(count)
    }

    /// Index the next saved frame will get
    pub fn frame_counter(&self) -> u64 {
        self.buffer.frame_counter()
    }

    pub fn buffer(&self) -> &FrameBuffer<S> {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut FrameBuffer<S> {
        &mut self.buffer
    }

    pub fn into_sink(self) -> S {
        self.buffer.into_sink()
    }

    // ==========================================
    // MOTION
    // ==========================================

    /// Evaluate a motion run of `event` over `frames`
    ///
    /// Nothing is drawn; the element's motion state ends at the last step.
    pub fn run<R>(
        &mut self,
        element: &str,
        event: &str,
        spec: &TransformSpec,
        frames: R,
        loop_period: Option<u64>,
    ) -> Result<Vec<MotionStep>>
    where
        R: IntoIterator<Item = u64>,
    {
        let evaluator = MotionEvaluator::new(self.engine.clone());
        let target = self.elements.get_mut(element).ok_or_else(|| unknown_element(element))?;
        evaluator.run(target, event, spec, frames, loop_period)?.collect()
    }

    /// Run, draw and save one frame per step
    ///
    /// Every saved frame shows the background plus this element only.
    pub fn animate<R>(
        &mut self,
        element: &str,
        event: &str,
        spec: &TransformSpec,
        frames: R,
        loop_period: Option<u64>,
    ) -> Result<Vec<SaveReport>>
    where
        R: IntoIterator<Item = u64>,
    {
        let steps = self.run(element, event, spec, frames, loop_period)?;
        info!("Rendering {} frames of '{}' / '{}'", steps.len(), element, event);

        let mut reports = Vec::with_capacity(steps.len());
        for step in &steps {
            self.composite_step(step)?;
            reports.push(self.save()?);
        }
        Ok(reports)
    }
}

fn draw<S: FrameSink>(
    engine: &TransformEngine,
    buffer: &mut FrameBuffer<S>,
    sprite: &Sprite,
    transform: &ResolvedTransform,
    anchor: (i64, i64),
) -> Result<bool> {
    let transformed = engine.apply(sprite, transform)?;
    Ok(buffer.composite(&transformed.image, transformed.placement(anchor)))
}

fn unknown_element(name: &str) -> AnimatorError {
    AssetError::UnknownElement {
        name: name.to_string(),
    }
    .into()
}
