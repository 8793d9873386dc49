use skyburst::audio::{AudioOutput, Source, Voice};
use std::time::Instant;

/// Audio output that records scheduled voices in the log instead of playing
/// them.
pub struct LogSink {
    start: Instant,
    scheduled: u64,
}

impl LogSink {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            scheduled: 0,
        }
    }
}

impl AudioOutput for LogSink {
    fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    fn schedule(&mut self, voice: Voice) {
        self.scheduled += 1;
        let source = match &voice.source {
            Source::Oscillator { waveform, .. } => format!("{waveform:?}"),
            Source::Noise => "Noise".to_string(),
        };
        log::debug!(
            "voice #{} {} at {:.3}s for {:.2}s, peak gain {:.3}",
            self.scheduled,
            source,
            voice.start,
            voice.duration,
            voice
                .gain
                .ramps
                .iter()
                .map(|r| r.target)
                .fold(voice.gain.initial, f32::max)
        );
    }
}
