//! Pronunciation playback
//!
//! The game only asks for text to be spoken. Backends decide how; the shared
//! gate keeps rapid spawns from cutting each other off.

use crate::sim::GameEvent;

/// Minimum gap between unforced requests while speech is still playing (ms)
pub const SPEECH_MIN_INTERVAL_MS: f64 = 320.0;

/// Anything that can pronounce target-language text
pub trait Speaker {
    /// Request playback. `force` bypasses the rate limit (manual replay).
    fn speak(&mut self, text: &str, force: bool, now_ms: f64);
}

/// Speak whatever a batch of session events asks for: new drops normally,
/// replays forced
pub fn speak_events<S: Speaker + ?Sized>(speaker: &mut S, events: &[GameEvent], now_ms: f64) {
    for event in events {
        match event {
            GameEvent::Spawned { text, .. } => speaker.speak(text, false, now_ms),
            GameEvent::Replay { text } => speaker.speak(text, true, now_ms),
            _ => {}
        }
    }
}

/// Rate limiter shared by speech backends
#[derive(Debug, Clone, Default)]
pub struct SpeechGate {
    last_at: Option<f64>,
}

impl SpeechGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether a request goes through. `busy` is whether speech is playing.
    pub fn admit(&mut self, now_ms: f64, busy: bool, force: bool) -> bool {
        let recent = self
            .last_at
            .is_some_and(|last| now_ms - last < SPEECH_MIN_INTERVAL_MS);
        if !force && recent && busy {
            return false;
        }
        self.last_at = Some(now_ms);
        true
    }
}

/// Logs requests instead of speaking (native builds)
#[derive(Debug, Default)]
pub struct LogSpeaker {
    gate: SpeechGate,
    spoken: Vec<String>,
}

impl LogSpeaker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything that made it through the gate
    pub fn spoken(&self) -> &[String] {
        &self.spoken
    }
}

impl Speaker for LogSpeaker {
    fn speak(&mut self, text: &str, force: bool, now_ms: f64) {
        // Treat the previous utterance as still playing for the whole interval.
        if self.gate.admit(now_ms, true, force) {
            log::debug!("speak: {text}");
            self.spoken.push(text.to_string());
        }
    }
}

/// Browser speech synthesis
#[cfg(target_arch = "wasm32")]
pub struct WebSpeaker {
    gate: SpeechGate,
    voice: Option<web_sys::SpeechSynthesisVoice>,
}

#[cfg(target_arch = "wasm32")]
impl WebSpeaker {
    const LANG: &'static str = "zh-CN";
    const RATE: f32 = 0.92;
    const PITCH: f32 = 1.05;

    pub fn new() -> Self {
        let mut speaker = Self {
            gate: SpeechGate::new(),
            voice: None,
        };
        speaker.refresh_voice();
        speaker
    }

    fn synth() -> Option<web_sys::SpeechSynthesis> {
        web_sys::window()?.speech_synthesis().ok()
    }

    /// Voices load asynchronously; retry until a Mandarin one shows up
    fn refresh_voice(&mut self) {
        use wasm_bindgen::JsCast;

        let Some(synth) = Self::synth() else {
            return;
        };
        let voices: Vec<web_sys::SpeechSynthesisVoice> = synth
            .get_voices()
            .iter()
            .filter_map(|v| v.dyn_into().ok())
            .collect();
        let lang = |v: &web_sys::SpeechSynthesisVoice| v.lang().to_lowercase();
        self.voice = voices
            .iter()
            .find(|v| lang(v).starts_with("zh"))
            .or_else(|| voices.iter().find(|v| lang(v).contains("cmn")))
            .cloned();
    }
}

#[cfg(target_arch = "wasm32")]
impl Default for WebSpeaker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
impl Speaker for WebSpeaker {
    fn speak(&mut self, text: &str, force: bool, now_ms: f64) {
        let Some(synth) = Self::synth() else {
            return;
        };
        if !self.gate.admit(now_ms, synth.speaking(), force) {
            return;
        }
        if synth.pending() || synth.speaking() {
            synth.cancel();
        }
        if self.voice.is_none() {
            self.refresh_voice();
        }
        let Ok(utterance) = web_sys::SpeechSynthesisUtterance::new_with_text(text) else {
            return;
        };
        utterance.set_lang(Self::LANG);
        utterance.set_rate(Self::RATE);
        utterance.set_pitch(Self::PITCH);
        if let Some(voice) = &self.voice {
            utterance.set_voice(Some(voice));
        }
        synth.speak(&utterance);
    }
}
