use tracing::{debug, info};

use crate::error::{Result, TransformError};
use crate::sprite::{FrameElement, MotionState, Sprite};
use crate::transform::{FrameTime, ResolvedTransform, TransformEngine, TransformSpec, Vec2};

/// Everything needed to draw one frame of a motion run
#[derive(Debug, Clone)]
pub struct MotionStep {
    pub frame_index: u64,
    /// Position in the event's sprite sequence
    pub sprite_index: usize,
    pub sprite: Sprite,
    pub transform: ResolvedTransform,
    /// Element state after this step
    pub state: MotionState,
}

impl MotionStep {
    /// Whole-pixel top-left anchor of the untransformed sprite
    pub fn placement(&self) -> (i64, i64) {
        self.state.placement()
    }
}

/// Drives a frame element through a parametric transform over a frame range
#[derive(Debug, Clone, Default)]
pub struct MotionEvaluator {
    engine: TransformEngine,
}

impl MotionEvaluator {
    pub fn new(engine: TransformEngine) -> Self {
        Self { engine }
    }

    /// Start a run of `event` over `frames`
    ///
    /// The event and loop period are checked here; the steps themselves are
    /// computed lazily as the returned iterator is consumed. Translation is
    /// relative to the element's position when the run starts.
    pub fn run<'a, R>(
        &self,
        element: &'a mut FrameElement,
        event: &str,
        spec: &'a TransformSpec,
        frames: R,
        loop_period: Option<u64>,
    ) -> Result<MotionRun<'a, R::IntoIter>>
    where
        R: IntoIterator<Item = u64>,
    {
        if loop_period == Some(0) {
            return Err(TransformError::InvalidLoopPeriod.into());
        }
        let sequence_len = element.event_len(event)?;
        let origin = element.motion_state().position;

        info!(
            "Motion run: '{}' event '{}' ({} sprites), loop period {:?}",
            element.name(),
            event,
            sequence_len,
            loop_period
        );

        Ok(MotionRun {
            engine: self.engine.clone(),
            element,
            event: event.to_string(),
            spec,
            frames: frames.into_iter(),
            loop_period,
            origin,
            failed: false,
        })
    }
}

/// Lazy sequence of [`MotionStep`]s; stops after the first error
pub struct MotionRun<'a, I> {
    engine: TransformEngine,
    element: &'a mut FrameElement,
    event: String,
    spec: &'a TransformSpec,
    frames: I,
    loop_period: Option<u64>,
    origin: Vec2,
    failed: bool,
}

impl<'a, I> MotionRun<'a, I> {
    fn step(&mut self, frame_index: u64) -> Result<MotionStep> {
        let transform = self.engine.evaluate(self.spec, frame_index, self.loop_period)?;

        let local = FrameTime::new(frame_index, self.loop_period).local();
        let sprite_index = (local % self.element.event_len(&self.event)? as u64) as usize;
        let sprite = self.element.get_sprite(&self.event, local)?.clone();

        let state = MotionState::moved(self.origin, &transform);
        self.element.set_motion_state(state);

        debug!(
            "Frame {}: sprite {} at {:?}, rotation {}, scale {}",
            frame_index,
            sprite_index,
            state.placement(),
            transform.rotation,
            transform.scale
        );

        Ok(MotionStep {
            frame_index,
            sprite_index,
            sprite,
            transform,
            state,
        })
    }
}

impl<'a, I> Iterator for MotionRun<'a, I>
where
    I: Iterator<Item = u64>,
{
    type Item = Result<MotionStep>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let frame_index = self.frames.next()?;
        let step = self.step(frame_index);
        self.failed = step.is_err();
        Some(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AssetError;
    use crate::transform::Param;
    use crate::AnimatorError;

    fn cat() -> FrameElement {
        let walk = (0..4)
            .map(|i| Sprite::filled(8, 8, [i * 60, 0, 0, 255]).unwrap())
            .collect();
        FrameElement::new("cat").with_event("walk", walk).unwrap()
    }

    #[test]
    fn test_sprite_loops_while_position_advances() {
        let mut cat = cat();
        let spec = TransformSpec::identity().translate(Param::linear(0.0, 10.0), 0.0);

        let steps = MotionEvaluator::default()
            .run(&mut cat, "walk", &spec, 0..12, Some(4))
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();

        assert_eq!(steps.len(), 12);
        assert_eq!(steps[0].sprite_index, 0);
        assert_eq!(steps[4].sprite_index, 0);
        assert_eq!(steps[7].sprite_index, 3);
        assert!(steps[0].sprite.same_asset(&steps[4].sprite));
        assert_eq!(steps[4].placement(), (40, 0));
        assert_eq!(steps[11].placement(), (110, 0));
        assert_eq!(cat.motion_state().placement(), (110, 0));
    }

    #[test]
    fn test_looped_param_wraps_with_sprites() {
        let mut cat = cat();
        let spec = TransformSpec::identity().translate(0.0, Param::linear(0.0, -2.0).looped());

        let ys: Vec<i64> = MotionEvaluator::default()
            .run(&mut cat, "walk", &spec, 0..6, Some(3))
            .unwrap()
            .map(|step| step.unwrap().placement().1)
            .collect();

        assert_eq!(ys, vec![0, -2, -4, 0, -2, -4]);
    }

    #[test]
    fn test_run_is_relative_to_start_position() {
        let mut cat = cat();
        cat.set_position(52.0, 476.0);
        let spec = TransformSpec::identity().translate(Param::linear(0.0, 8.0), 0.0).rotate(15.0);

        let last = MotionEvaluator::default()
            .run(&mut cat, "walk", &spec, 0..3, None)
            .unwrap()
            .last()
            .unwrap()
            .unwrap();

        assert_eq!(last.placement(), (68, 476));
        assert_eq!(last.sprite_index, 2);
        assert_eq!(cat.motion_state().rotation, 15.0);
    }

    #[test]
    fn test_invalid_run_fails_up_front() {
        let mut cat = cat();
        let spec = TransformSpec::identity();
        let evaluator = MotionEvaluator::default();

        assert!(matches!(
            evaluator.run(&mut cat, "walk", &spec, 0..4, Some(0)),
            Err(AnimatorError::Transform(TransformError::InvalidLoopPeriod))
        ));
        assert!(matches!(
            evaluator.run(&mut cat, "jump", &spec, 0..4, None),
            Err(AnimatorError::Asset(AssetError::UnknownEvent { .. }))
        ));
    }

    #[test]
    fn test_run_stops_at_first_bad_frame() {
        let mut cat = cat();
        let spec = TransformSpec::identity().scale(Param::linear(1.0, -0.5));

        let results: Vec<_> = MotionEvaluator::default()
            .run(&mut cat, "walk", &spec, 0..10, None)
            .unwrap()
            .collect();

        // Scale reaches zero on frame 2
        assert_eq!(results.len(), 3);
        assert!(results[1].is_ok());
        assert!(matches!(
            results[2],
            Err(AnimatorError::Transform(TransformError::InvalidScale { .. }))
        ));
        assert_eq!(cat.motion_state().scale, 0.5);
    }

    #[test]
    fn test_arbitrary_frame_order() {
        let mut cat = cat();
        let spec = TransformSpec::identity().translate(Param::linear(0.0, 1.0), 0.0);

        let steps = MotionEvaluator::default()
            .run(&mut cat, "walk", &spec, [9, 2, 5], None)
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();

        let indices: Vec<usize> = steps.iter().map(|s| s.sprite_index).collect();
        assert_eq!(indices, vec![1, 2, 1]);
        assert_eq!(steps[0].placement(), (9, 0));
    }
}
