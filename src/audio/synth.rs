//! Offline soundtrack synthesis
//!
//! Every layer is rendered once, sample by sample, into a mono buffer of
//! exactly `sample_rate * loop_seconds` samples that the mixer loops forever.
//! Layers:
//! - pad: four-chord progression of detuned sine stacks with crossfades
//! - bass: decaying sine on beats 0 and 2 at half the chord root
//! - drums: kick (0, 2), snare (1, 3) and hi-hat on every half beat
//! - hiss: constant-level white noise
//! - crackle: sparse decaying pops over a faint noise bed

use std::f64::consts::TAU;

use rand::Rng;

use crate::consts::{BPM, LOOP_SECONDS};
use crate::smoothstep;

/// Major or minor third
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChordQuality {
    Major,
    Minor,
}

impl ChordQuality {
    /// Frequency ratio of the third above the root
    pub fn third_ratio(&self) -> f64 {
        match self {
            ChordQuality::Major => 5.0 / 4.0,
            ChordQuality::Minor => 6.0 / 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chord {
    /// Root frequency (Hz)
    pub root: f64,
    pub quality: ChordQuality,
}

impl Chord {
    pub const fn new(root: f64, quality: ChordQuality) -> Self {
        Self { root, quality }
    }

    /// Root, third, fifth, octave
    pub fn frequencies(&self) -> [f64; 4] {
        [
            self.root,
            self.root * self.quality.third_ratio(),
            self.root * 1.5,
            self.root * 2.0,
        ]
    }
}

/// ii - V - I - vi in C: Dm, G, C, Am
pub const PROGRESSION: [Chord; 4] = [
    Chord::new(146.83, ChordQuality::Minor),
    Chord::new(196.00, ChordQuality::Major),
    Chord::new(130.81, ChordQuality::Major),
    Chord::new(220.00, ChordQuality::Minor),
];

/// Final stretch of each chord spent crossfading into the next (seconds)
pub const CHORD_CROSSFADE: f64 = 0.4;

// Pad shaping
const PAD_DRIFT_DEPTH: (f64, f64) = (0.002, 0.001);
const PAD_DRIFT_RATE: (f64, f64) = (0.13, 0.07);
const PAD_WOBBLE_BASE: f64 = 0.55;
const PAD_WOBBLE_DEPTH: f64 = 0.2;
const PAD_WOBBLE_RATE: f64 = 0.08;
const PAD_DRIVE: f64 = 0.7;
const PAD_LEVEL: f64 = 0.28;

// Bass
const BASS_WINDOW: f64 = 0.45;
const BASS_DECAY: f64 = 5.0;
const BASS_LEVEL: f64 = 0.45;
const BASS_DRIFT_DEPTH: f64 = 0.002;
const BASS_DRIFT_RATE: f64 = 0.2;

// Drums
const KICK_START_HZ: f64 = 120.0;
const KICK_END_HZ: f64 = 40.0;
const KICK_SWEEP: f64 = 0.18;
const KICK_WINDOW: f64 = 0.4;
const KICK_DECAY: f64 = 16.0;
const SNARE_WINDOW: f64 = 0.2;
const SNARE_DECAY: f64 = 20.0;
const SNARE_LEVEL: f64 = 0.5;
const HAT_WINDOW: f64 = 0.06;
const HAT_DECAY: f64 = 40.0;
const HAT_LEVEL: f64 = 0.2;
const DRUM_BUS_LEVEL: f64 = 0.5;

// Noise layers
const HISS_LEVEL: f64 = 0.008;
const CRACKLE_POP_CHANCE: f64 = 0.0007;
const CRACKLE_POP_DECAY: f64 = 0.96;
const CRACKLE_BED_LEVEL: f64 = 0.006;
const CRACKLE_POP_MIX: f64 = 0.2;

/// Loop timing shared by every layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthParams {
    pub sample_rate: u32,
    pub loop_seconds: f64,
    pub bpm: f64,
}

impl SynthParams {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            loop_seconds: LOOP_SECONDS,
            bpm: BPM,
        }
    }

    /// Samples per layer buffer
    pub fn frame_count(&self) -> usize {
        (self.sample_rate as f64 * self.loop_seconds).round() as usize
    }

    /// Each chord gets a quarter of the loop
    pub fn chord_duration(&self) -> f64 {
        self.loop_seconds / PROGRESSION.len() as f64
    }

    pub fn beat_length(&self) -> f64 {
        60.0 / self.bpm
    }

    #[inline]
    fn time_of(&self, index: usize) -> f64 {
        index as f64 / self.sample_rate as f64
    }

    /// Where `t` falls in the chord progression
    pub fn chord_position(&self, t: f64) -> ChordPosition {
        let duration = self.chord_duration();
        let segment = (t / duration).floor();
        let index = (segment as usize) % PROGRESSION.len();
        let local = t - segment * duration;
        ChordPosition {
            index,
            next: (index + 1) % PROGRESSION.len(),
            local,
            crossfade: smoothstep(duration - CHORD_CROSSFADE, duration, local),
        }
    }

    /// Where `t` falls in the 4/4 bar
    pub fn beat_position(&self, t: f64) -> BeatPosition {
        let beat = self.beat_length();
        let index = (t / beat).floor();
        BeatPosition {
            beat_in_bar: (index as u64 % 4) as u8,
            time: t - index * beat,
        }
    }
}

/// Chord lookup result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChordPosition {
    pub index: usize,
    pub next: usize,
    /// Seconds since this chord started
    pub local: f64,
    /// 0 = all current chord, 1 = all next chord
    pub crossfade: f64,
}

/// Beat lookup result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatPosition {
    /// 0..=3
    pub beat_in_bar: u8,
    /// Seconds since the beat started
    pub time: f64,
}

#[inline]
fn white(rng: &mut impl Rng) -> f64 {
    rng.random::<f64>() * 2.0 - 1.0
}

/// Normalized sum of a chord's four partials, each with slow pitch drift
fn chord_tone(chord: &Chord, t: f64) -> f64 {
    let mut sum = 0.0;
    for (i, freq) in chord.frequencies().iter().enumerate() {
        let phase = i as f64;
        let drift = 1.0
            + PAD_DRIFT_DEPTH.0 * (TAU * PAD_DRIFT_RATE.0 * t + phase).sin()
            + PAD_DRIFT_DEPTH.1 * (TAU * PAD_DRIFT_RATE.1 * t + 2.1 * phase).sin();
        sum += (TAU * freq * drift * t).sin();
    }
    sum / 4.0
}

/// One pad sample at time `t`
pub fn pad_sample(params: &SynthParams, t: f64) -> f64 {
    let pos = params.chord_position(t);
    let current = chord_tone(&PROGRESSION[pos.index], t);
    let next = chord_tone(&PROGRESSION[pos.next], t);
    let tone = current * (1.0 - pos.crossfade) + next * pos.crossfade;

    let wobble = PAD_WOBBLE_BASE + PAD_WOBBLE_DEPTH * (TAU * PAD_WOBBLE_RATE * t).sin();
    (tone * wobble * PAD_DRIVE).tanh() * PAD_LEVEL
}

pub fn render_pad(params: &SynthParams) -> Vec<f32> {
    (0..params.frame_count())
        .map(|i| pad_sample(params, params.time_of(i)) as f32)
        .collect()
}

/// Seconds into the sounding bass note at `t`, if one is sounding
pub fn bass_note_at(params: &SynthParams, t: f64) -> Option<f64> {
    let beat = params.beat_position(t);
    let on_beat = beat.beat_in_bar == 0 || beat.beat_in_bar == 2;
    (on_beat && beat.time < BASS_WINDOW).then_some(beat.time)
}

pub fn bass_sample(params: &SynthParams, t: f64) -> f64 {
    let Some(note_time) = bass_note_at(params, t) else {
        return 0.0;
    };
    let root = PROGRESSION[params.chord_position(t).index].root;
    let freq = root * 0.5 * (1.0 + BASS_DRIFT_DEPTH * (TAU * BASS_DRIFT_RATE * t).sin());
    (TAU * freq * note_time).sin() * (-note_time * BASS_DECAY).exp() * BASS_LEVEL
}

pub fn render_bass(params: &SynthParams) -> Vec<f32> {
    (0..params.frame_count())
        .map(|i| bass_sample(params, params.time_of(i)) as f32)
        .collect()
}

/// Kick phase for a linear 120 -> 40 Hz sweep, holding 40 Hz afterwards
fn kick_phase(time: f64) -> f64 {
    let slope = (KICK_END_HZ - KICK_START_HZ) / KICK_SWEEP;
    if time <= KICK_SWEEP {
        TAU * (KICK_START_HZ * time + 0.5 * slope * time * time)
    } else {
        let swept = KICK_START_HZ * KICK_SWEEP + 0.5 * slope * KICK_SWEEP * KICK_SWEEP;
        TAU * (swept + KICK_END_HZ * (time - KICK_SWEEP))
    }
}

pub fn kick_sample(time: f64) -> f64 {
    if time >= KICK_WINDOW {
        return 0.0;
    }
    kick_phase(time).sin() * (-time * KICK_DECAY).exp()
}

pub fn render_drums(params: &SynthParams, rng: &mut impl Rng) -> Vec<f32> {
    let half_beat = params.beat_length() / 2.0;
    let mut last_noise = 0.0;

    (0..params.frame_count())
        .map(|i| {
            let t = params.time_of(i);
            let beat = params.beat_position(t);
            let mut out = 0.0;

            if beat.beat_in_bar % 2 == 0 {
                out += kick_sample(beat.time);
            }

            // First difference of white noise: a crude high-pass for the snare body
            let noise = white(rng);
            let filtered = (noise - last_noise) * 0.5;
            last_noise = noise;
            if beat.beat_in_bar % 2 == 1 && beat.time < SNARE_WINDOW {
                out += filtered * (-beat.time * SNARE_DECAY).exp() * SNARE_LEVEL;
            }

            let hat_time = t - (t / half_beat).floor() * half_beat;
            if hat_time < HAT_WINDOW {
                out += white(rng) * (-hat_time * HAT_DECAY).exp() * HAT_LEVEL;
            }

            (out * DRUM_BUS_LEVEL) as f32
        })
        .collect()
}

pub fn render_hiss(params: &SynthParams, rng: &mut impl Rng) -> Vec<f32> {
    (0..params.frame_count())
        .map(|_| (white(rng) * HISS_LEVEL) as f32)
        .collect()
}

pub fn render_crackle(params: &SynthParams, rng: &mut impl Rng) -> Vec<f32> {
    let mut pop = 0.0;
    (0..params.frame_count())
        .map(|_| {
            if rng.random::<f64>() < CRACKLE_POP_CHANCE {
                pop = rng.random::<f64>() - 0.5;
            }
            let out = white(rng) * CRACKLE_BED_LEVEL + pop * CRACKLE_POP_MIX;
            pop *= CRACKLE_POP_DECAY;
            out as f32
        })
        .collect()
}

/// The five soundtrack layers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Pad,
    Bass,
    Drums,
    Hiss,
    Crackle,
}

/// Which filter bus a layer feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bus {
    /// Low-passed
    Music,
    /// High-passed
    Noise,
}

impl Layer {
    pub const ALL: [Layer; 5] = [Layer::Pad, Layer::Bass, Layer::Drums, Layer::Hiss, Layer::Crackle];

    pub fn bus(&self) -> Bus {
        match self {
            Layer::Pad | Layer::Bass | Layer::Drums => Bus::Music,
            Layer::Hiss | Layer::Crackle => Bus::Noise,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Pad => "pad",
            Layer::Bass => "bass",
            Layer::Drums => "drums",
            Layer::Hiss => "hiss",
            Layer::Crackle => "crackle",
        }
    }
}

/// All five rendered loops. Immutable once built.
#[derive(Debug, Clone)]
pub struct LayerBuffers {
    pub params: SynthParams,
    pad: Vec<f32>,
    bass: Vec<f32>,
    drums: Vec<f32>,
    hiss: Vec<f32>,
    crackle: Vec<f32>,
}

impl LayerBuffers {
    pub fn render(params: SynthParams, rng: &mut impl Rng) -> Self {
        let buffers = Self {
            params,
            pad: render_pad(&params),
            bass: render_bass(&params),
            drums: render_drums(&params, rng),
            hiss: render_hiss(&params, rng),
            crackle: render_crackle(&params, rng),
        };
        log::info!(
            "Rendered soundtrack: {} layers x {} samples @ {} Hz",
            Layer::ALL.len(),
            buffers.len(),
            params.sample_rate
        );
        buffers
    }

    pub fn get(&self, layer: Layer) -> &[f32] {
        match layer {
            Layer::Pad => &self.pad,
            Layer::Bass => &self.bass,
            Layer::Drums => &self.drums,
            Layer::Hiss => &self.hiss,
            Layer::Crackle => &self.crackle,
        }
    }

    /// Samples per layer (all layers share it)
    pub fn len(&self) -> usize {
        self.pad.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pad.is_empty()
    }
}
