/// Sound engine: procedural tones via rodio.
///
/// Each `ToneKind` is synthesized into an in-memory WAV buffer and played
/// fire-and-forget through a detached rodio `Sink`. A per-kind busy flag
/// drops a request while the same kind is still playing.
///
/// `play_tone` always ends by calling `on_complete`: after playback, or
/// immediately when there is no output device, the sink cannot be created,
/// or the request was dropped.
///
/// Compile without the "sound" feature to disable audio entirely (the stub
/// engine completes every request immediately).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::sim::event::GameEvent;

pub const SAMPLE_RATE: u32 = 22050;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ToneKind {
    Collect,
    Move,
    Select,
    Error,
}

impl ToneKind {
    fn index(self) -> usize {
        self as usize
    }

    /// Which tone, if any, an event asks for.
    pub fn for_event(event: &GameEvent) -> Option<ToneKind> {
        match event {
            GameEvent::Collected { .. } => Some(ToneKind::Collect),
            GameEvent::MoveSound => Some(ToneKind::Move),
            GameEvent::LevelChanged { manual: true, .. } => Some(ToneKind::Select),
            GameEvent::Fault { .. } => Some(ToneKind::Error),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
enum Wave {
    Sine,
    Triangle,
    Sawtooth,
}

/// Oscillator settings for one tone.
#[derive(Clone, Copy, Debug)]
struct ToneSpec {
    wave: Wave,
    freq_start: f32,
    freq_end: f32,
    /// Seconds for the exponential frequency sweep.
    sweep: f32,
    /// Seconds until the gain has decayed to 0.01 and the tone stops.
    duration: f32,
    /// Multiplier on the requested volume.
    gain: f32,
}

fn spec(kind: ToneKind) -> ToneSpec {
    match kind {
        ToneKind::Collect => ToneSpec {
            wave: Wave::Sine, freq_start: 660.0, freq_end: 880.0,
            sweep: 0.1, duration: 0.3, gain: 1.0,
        },
        ToneKind::Move => ToneSpec {
            wave: Wave::Sine, freq_start: 330.0, freq_end: 330.0,
            sweep: 0.1, duration: 0.1, gain: 0.3,
        },
        ToneKind::Select => ToneSpec {
            wave: Wave::Triangle, freq_start: 440.0, freq_end: 550.0,
            sweep: 0.15, duration: 0.2, gain: 1.0,
        },
        ToneKind::Error => ToneSpec {
            wave: Wave::Sawtooth, freq_start: 220.0, freq_end: 110.0,
            sweep: 0.2, duration: 0.3, gain: 1.0,
        },
    }
}

// ════════════════════════════════════════════════════════════
//  Waveform generator: Vec<f32> mono samples
// ════════════════════════════════════════════════════════════

/// Exponential ramp from `a` to `b` over `0..=1`.
fn exp_ramp(a: f32, b: f32, t: f32) -> f32 {
    a * (b / a).powf(t.clamp(0.0, 1.0))
}

/// Render `kind` at `volume` (0..=1) into samples.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
pub fn synthesize(kind: ToneKind, volume: f32) -> Vec<f32> {
    let s = spec(kind);
    let peak = (volume * s.gain).clamp(0.0001, 1.0);
    let floor = 0.01_f32.min(peak);
    let n = (SAMPLE_RATE as f32 * s.duration) as usize;
    let mut phase = 0.0_f32;

    (0..n)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            let freq = exp_ramp(s.freq_start, s.freq_end, t / s.sweep);
            phase = (phase + freq / SAMPLE_RATE as f32).fract();
            let wave = match s.wave {
                Wave::Sine => (phase * 2.0 * std::f32::consts::PI).sin(),
                Wave::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
                Wave::Sawtooth => 2.0 * phase - 1.0,
            };
            wave * exp_ramp(peak, floor, t / s.duration)
        })
        .collect()
}

// ════════════════════════════════════════════════════════════
//  WAV encoder: wraps f32 samples into a valid WAV buffer
// ════════════════════════════════════════════════════════════

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
pub fn make_wav(samples: &[f32]) -> Vec<u8> {
    let num_channels: u16 = 1;
    let bits_per_sample: u16 = 16;
    let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
    let block_align = num_channels * bits_per_sample / 8;
    let data_size = samples.len() as u32 * 2; // 16-bit = 2 bytes per sample
    let file_size = 36 + data_size;

    let mut buf = Vec::with_capacity(44 + data_size as usize);

    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    buf.extend_from_slice(&1u16.to_le_bytes());  // PCM format
    buf.extend_from_slice(&num_channels.to_le_bytes());
    buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());

    for &s in samples {
        let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
        buf.extend_from_slice(&val.to_le_bytes());
    }

    buf
}

// ════════════════════════════════════════════════════════════
//  Busy flags
// ════════════════════════════════════════════════════════════

/// One busy flag per tone kind.
#[derive(Default)]
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
pub struct ToneGate {
    busy: [Arc<AtomicBool>; 4],
}

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
impl ToneGate {
    /// Claim `kind`. Returns the flag to clear on completion, or `None`
    /// if that kind is already playing.
    pub fn try_begin(&self, kind: ToneKind) -> Option<Arc<AtomicBool>> {
        let flag = &self.busy[kind.index()];
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Arc::clone(flag))
    }

    #[cfg(test)]
    pub fn is_busy(&self, kind: ToneKind) -> bool {
        self.busy[kind.index()].load(Ordering::Acquire)
    }
}

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::atomic::Ordering;

    use log::warn;
    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::{make_wav, synthesize, ToneGate, ToneKind};

    pub struct SoundEngine {
        output: Option<(OutputStream, OutputStreamHandle)>,
        gate: ToneGate,
    }

    impl SoundEngine {
        pub fn new() -> Self {
            let output = match OutputStream::try_default() {
                Ok(pair) => Some(pair),
                Err(e) => {
                    warn!("no audio output, sound disabled: {e}");
                    None
                }
            };
            SoundEngine { output, gate: ToneGate::default() }
        }

        pub fn play_tone<F>(&self, kind: ToneKind, volume: f32, on_complete: F)
        where
            F: FnOnce() + Send + 'static,
        {
            let handle = match &self.output {
                Some((_, h)) => h,
                None => return on_complete(),
            };
            let busy = match self.gate.try_begin(kind) {
                Some(flag) => flag,
                None => return on_complete(),
            };

            let sink = match Sink::try_new(handle) {
                Ok(s) => s,
                Err(e) => {
                    warn!("could not open audio sink: {e}");
                    busy.store(false, Ordering::Release);
                    return on_complete();
                }
            };
            let cursor = Cursor::new(make_wav(&synthesize(kind, volume)));
            match rodio::Decoder::new(cursor) {
                Ok(src) => sink.append(src),
                Err(e) => {
                    warn!("could not decode {kind:?} tone: {e}");
                    busy.store(false, Ordering::Release);
                    return on_complete();
                }
            }

            // Fire-and-forget: a short-lived waiter clears the flag when done
            std::thread::spawn(move || {
                sink.sleep_until_end();
                busy.store(false, Ordering::Release);
                on_complete();
            });
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Public API: completes immediately when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Self { SoundEngine }

    pub fn play_tone<F>(&self, _kind: ToneKind, _volume: f32, on_complete: F)
    where
        F: FnOnce() + Send + 'static,
    {
        on_complete();
    }
}

/// Play the tone each event asks for, unless muted.
pub fn process_sound_events(sound: &SoundEngine, events: &[GameEvent], volume: f32, muted: bool) {
    if muted {
        return;
    }
    for kind in events.iter().filter_map(ToneKind::for_event) {
        sound.play_tone(kind, volume, || {});
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak(samples: &[f32]) -> f32 {
        samples.iter().fold(0.0_f32, |m, s| m.max(s.abs()))
    }

    #[test]
    fn durations_match_tone_kind() {
        assert_eq!(synthesize(ToneKind::Collect, 0.3).len(), (SAMPLE_RATE as f32 * 0.3) as usize);
        assert_eq!(synthesize(ToneKind::Move, 0.3).len(), (SAMPLE_RATE as f32 * 0.1) as usize);
        assert_eq!(synthesize(ToneKind::Select, 0.3).len(), (SAMPLE_RATE as f32 * 0.2) as usize);
        assert_eq!(synthesize(ToneKind::Error, 0.3).len(), (SAMPLE_RATE as f32 * 0.3) as usize);
    }

    #[test]
    fn move_tone_is_quieter() {
        let collect = peak(&synthesize(ToneKind::Collect, 0.3));
        let step = peak(&synthesize(ToneKind::Move, 0.3));
        assert!(collect <= 0.3 + 1e-4);
        assert!(step <= 0.09 + 1e-4);
        assert!(step < collect);
    }

    #[test]
    fn tones_decay() {
        let s = synthesize(ToneKind::Error, 0.5);
        let head = peak(&s[..s.len() / 10]);
        let tail = peak(&s[s.len() * 9 / 10..]);
        assert!(tail < head / 5.0);
    }

    #[test]
    fn exp_ramp_endpoints() {
        assert!((exp_ramp(660.0, 880.0, 0.0) - 660.0).abs() < 1e-3);
        assert!((exp_ramp(660.0, 880.0, 1.0) - 880.0).abs() < 1e-3);
        // held at the end value past the sweep
        assert!((exp_ramp(220.0, 110.0, 3.0) - 110.0).abs() < 1e-3);
    }

    #[test]
    fn wav_header_and_size() {
        let wav = make_wav(&[0.0, 0.5, -0.5, 2.0]);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(wav.len(), 44 + 8);
        // clamped full-scale sample
        assert_eq!(i16::from_le_bytes([wav[50], wav[51]]), 32767);
    }

    #[test]
    fn gate_drops_same_kind_while_busy() {
        let gate = ToneGate::default();
        let flag = gate.try_begin(ToneKind::Collect).unwrap();
        assert!(gate.try_begin(ToneKind::Collect).is_none());
        // other kinds are independent
        assert!(gate.try_begin(ToneKind::Move).is_some());
        flag.store(false, Ordering::Release);
        assert!(!gate.is_busy(ToneKind::Collect));
        assert!(gate.try_begin(ToneKind::Collect).is_some());
    }

    #[test]
    fn events_map_to_tones() {
        assert_eq!(
            ToneKind::for_event(&GameEvent::Collected { id: "x".into() }),
            Some(ToneKind::Collect)
        );
        assert_eq!(
            ToneKind::for_event(&GameEvent::LevelChanged { level: 2, manual: true }),
            Some(ToneKind::Select)
        );
        assert_eq!(ToneKind::for_event(&GameEvent::LevelChanged { level: 2, manual: false }), None);
        assert_eq!(ToneKind::for_event(&GameEvent::Landed), None);
    }
}
