//! Web Audio backend
//!
//! Builds the mix graph out of browser nodes: one looping
//! `AudioBufferSourceNode` per layer, a biquad per bus and a shared master
//! `GainNode`. Construction must happen inside a user gesture handler;
//! resuming the context is the only asynchronous step.

use js_sys::Promise;
use web_sys::{
    AudioBufferSourceNode, AudioContext, AudioContextState, BiquadFilterNode, BiquadFilterType,
    GainNode,
};

use super::AudioOutput;
use super::synth::{Bus, Layer, LayerBuffers, SynthParams};
use crate::error::AudioError;
use crate::settings::Settings;

/// Browser-side mix graph. Dropping it stops all sources and closes the context.
pub struct WebAudioMixer {
    ctx: AudioContext,
    master: GainNode,
    sources: Vec<AudioBufferSourceNode>,
    time_constant: f64,
    stopped: bool,
}

fn graph_err(e: wasm_bindgen::JsValue) -> AudioError {
    AudioError::Graph(AudioError::describe(&e))
}

impl WebAudioMixer {
    /// Create a context, render the soundtrack and start every layer looping
    /// into a silent master gain.
    pub fn build(settings: &Settings) -> Result<Self, AudioError> {
        let ctx = AudioContext::new()
            .map_err(|e| AudioError::ContextUnavailable(AudioError::describe(&e)))?;
        let master = ctx.create_gain().map_err(graph_err)?;

        // From here on `mixer` owns the context, so any early return closes it
        let mut mixer = Self {
            ctx,
            master,
            sources: Vec::with_capacity(Layer::ALL.len()),
            time_constant: settings.gain_time_constant as f64,
            stopped: false,
        };
        mixer.master.gain().set_value(0.0);
        mixer
            .master
            .connect_with_audio_node(&mixer.ctx.destination())
            .map_err(graph_err)?;

        let music = mixer.create_bus(
            BiquadFilterType::Lowpass,
            settings.music_lowpass_hz,
            settings.music_lowpass_q,
        )?;
        let noise = mixer.create_bus(
            BiquadFilterType::Highpass,
            settings.noise_highpass_hz,
            settings.noise_highpass_q,
        )?;

        let sample_rate = mixer.ctx.sample_rate();
        let params = SynthParams {
            sample_rate: sample_rate as u32,
            loop_seconds: settings.loop_seconds,
            bpm: settings.bpm,
        };
        let layers = LayerBuffers::render(params, &mut rand::rng());

        for layer in Layer::ALL {
            let bus = match layer.bus() {
                Bus::Music => &music,
                Bus::Noise => &noise,
            };
            let source = mixer.create_looping_source(&layers, layer, sample_rate)?;
            source.connect_with_audio_node(bus).map_err(graph_err)?;
            source.start().map_err(graph_err)?;
            mixer.sources.push(source);
        }

        log::info!(
            "{} audio graph built at {} Hz",
            settings.soundtrack.as_str(),
            sample_rate
        );
        Ok(mixer)
    }

    /// Filter feeding the master gain
    fn create_bus(
        &self,
        kind: BiquadFilterType,
        frequency: f32,
        q: f32,
    ) -> Result<BiquadFilterNode, AudioError> {
        let filter = self.ctx.create_biquad_filter().map_err(graph_err)?;
        filter.set_type(kind);
        filter.frequency().set_value(frequency);
        filter.q().set_value(q);
        filter
            .connect_with_audio_node(&self.master)
            .map_err(graph_err)?;
        Ok(filter)
    }

    fn create_looping_source(
        &self,
        layers: &LayerBuffers,
        layer: Layer,
        sample_rate: f32,
    ) -> Result<AudioBufferSourceNode, AudioError> {
        let samples = layers.get(layer);
        let buffer = self
            .ctx
            .create_buffer(1, samples.len() as u32, sample_rate)
            .map_err(graph_err)?;
        buffer.copy_to_channel(samples, 0).map_err(graph_err)?;

        let source = self.ctx.create_buffer_source().map_err(graph_err)?;
        source.set_buffer(Some(&buffer));
        source.set_loop(true);
        Ok(source)
    }
}

impl AudioOutput for WebAudioMixer {
    type Resume = Promise;

    fn is_running(&self) -> bool {
        !self.stopped && self.ctx.state() == AudioContextState::Running
    }

    /// Ask the browser to start the context (only honored inside a user gesture)
    fn resume(&mut self) -> Result<Promise, AudioError> {
        if self.stopped {
            return Err(AudioError::Rejected("audio graph was released".into()));
        }
        self.ctx
            .resume()
            .map_err(|e| AudioError::Rejected(AudioError::describe(&e)))
    }

    fn set_target_volume(&mut self, volume: f32) {
        if self.stopped {
            return;
        }
        let t = self.ctx.current_time();
        self.master
            .gain()
            .set_target_at_time(volume.clamp(0.0, 1.0), t, self.time_constant)
            .ok();
    }

    fn shutdown(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        for source in self.sources.drain(..) {
            source.stop().ok();
            source.disconnect().ok();
        }
        self.master.disconnect().ok();
        // Closing resolves asynchronously; nothing waits on it
        let _ = self.ctx.close();
        log::info!("Audio graph released");
    }
}

impl Drop for WebAudioMixer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
