use super::{KeySample, KeySource};

/// Replays a fixed list of samples, then reports an idle keypad forever.
#[derive(Debug, Clone)]
pub struct ScriptedKeys<'a> {
    samples: &'a [KeySample],
    cursor: usize,
}

impl<'a> ScriptedKeys<'a> {
    pub const fn new(samples: &'a [KeySample]) -> Self {
        Self { samples, cursor: 0 }
    }

    pub const fn is_exhausted(&self) -> bool {
        self.cursor >= self.samples.len()
    }
}

impl KeySource for ScriptedKeys<'_> {
    type Error = core::convert::Infallible;

    fn poll_key(&mut self) -> Result<KeySample, Self::Error> {
        let Some(sample) = self.samples.get(self.cursor).copied() else {
            return Ok(KeySample::IDLE);
        };
        self.cursor += 1;
        Ok(sample)
    }
}
