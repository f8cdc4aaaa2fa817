use std::fmt;
use std::sync::Arc;

use crate::error::{Result, TransformError};

/// The point in time a parameter is evaluated at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTime {
    /// Absolute frame index
    pub frame: u64,

    /// Loop period in effect, if any
    pub loop_period: Option<u64>,
}

impl FrameTime {
    pub fn new(frame: u64, loop_period: Option<u64>) -> Self {
        Self { frame, loop_period }
    }

    /// Frame index wrapped by the loop period (the absolute frame when not looping)
    pub fn local(&self) -> u64 {
        match self.loop_period {
            Some(period) if period > 0 => self.frame % period,
            _ => self.frame,
        }
    }

    fn looped(&self) -> Self {
        Self {
            frame: self.local(),
            loop_period: self.loop_period,
        }
    }
}

/// A script-defined function of frame time
pub type ParamFn = Arc<dyn Fn(FrameTime) -> f64 + Send + Sync>;

/// A transform field that may vary with the frame index
///
/// Evaluation is deterministic: the same [`FrameTime`] always yields the same
/// value. Only [`Param::Looped`] (and callables that ask for
/// [`FrameTime::local`]) see loop-wrapped time; everything else progresses
/// with the absolute frame, so positional motion keeps going while the
/// sprite cycle repeats.
#[derive(Clone)]
pub enum Param {
    /// Same value on every frame
    Constant(f64),

    /// `start + rate * frame`
    Linear { start: f64, rate: f64 },

    /// Piecewise-linear interpolation between keys
    Keyframes(Keyframes),

    /// Evaluate the inner parameter at `frame mod loop_period`
    Looped(Box<Param>),

    /// Arbitrary function of the frame time
    Callable(ParamFn),
}

impl Param {
    pub fn constant(value: f64) -> Self {
        Self::Constant(value)
    }

    pub fn linear(start: f64, rate: f64) -> Self {
        Self::Linear { start, rate }
    }

    /// Build a keyframed parameter from `(frame, value)` pairs
    pub fn keyframes<I>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u64, f64)>,
    {
        Ok(Self::Keyframes(Keyframes::new(keys)?))
    }

    pub fn callable<F>(f: F) -> Self
    where
        F: Fn(FrameTime) -> f64 + Send + Sync + 'static,
    {
        Self::Callable(Arc::new(f))
    }

    /// Wrap this parameter so it restarts every loop period
    pub fn looped(self) -> Self {
        match self {
            Self::Looped(_) => self,
            other => Self::Looped(Box::new(other)),
        }
    }

    /// Evaluate the parameter at the given time
    pub fn sample(&self, time: FrameTime) -> f64 {
        match self {
            Self::Constant(value) => *value,
            Self::Linear { start, rate } => start + rate * time.frame as f64,
            Self::Keyframes(keys) => keys.sample(time.frame),
            Self::Looped(inner) => inner.sample(time.looped()),
            Self::Callable(f) => f(time),
        }
    }
}

impl From<f64> for Param {
    fn from(value: f64) -> Self {
        Self::Constant(value)
    }
}

impl From<i32> for Param {
    fn from(value: i32) -> Self {
        Self::Constant(f64::from(value))
    }
}

impl fmt::Debug for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Self::Linear { start, rate } => f
                .debug_struct("Linear")
                .field("start", start)
                .field("rate", rate)
                .finish(),
            Self::Keyframes(keys) => f.debug_tuple("Keyframes").field(keys).finish(),
            Self::Looped(inner) => f.debug_tuple("Looped").field(inner).finish(),
            Self::Callable(_) => f.write_str("Callable(..)"),
        }
    }
}

/// Sorted `(frame, value)` keys with linear interpolation between them
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframes {
    keys: Vec<(u64, f64)>,
}

impl Keyframes {
    pub fn new<I>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u64, f64)>,
    {
        let mut keys: Vec<(u64, f64)> = keys.into_iter().collect();
        if keys.is_empty() {
            return Err(TransformError::InvalidKeyframes {
                reason: "at least one key is required".to_string(),
            }
            .into());
        }

        if let Some((frame, value)) = keys.iter().find(|(_, v)| !v.is_finite()) {
            return Err(TransformError::InvalidKeyframes {
                reason: format!("key at frame {} has value {}", frame, value),
            }
            .into());
        }

        keys.sort_by_key(|(frame, _)| *frame);
        if let Some(pair) = keys.windows(2).find(|pair| pair[0].0 == pair[1].0) {
            return Err(TransformError::InvalidKeyframes {
                reason: format!("duplicate key at frame {}", pair[0].0),
            }
            .into());
        }

        Ok(Self { keys })
    }

    /// Value at `frame`, holding the first/last key outside the keyed range
    pub fn sample(&self, frame: u64) -> f64 {
        let (first_frame, first_value) = self.keys[0];
        if frame <= first_frame {
            return first_value;
        }

        for pair in self.keys.windows(2) {
            let (f0, v0) = pair[0];
            let (f1, v1) = pair[1];
            if frame <= f1 {
                let t = (frame - f0) as f64 / (f1 - f0) as f64;
                return v0 + (v1 - v0) * t;
            }
        }

        self.keys[self.keys.len() - 1].1
    }
}
