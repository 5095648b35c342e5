/// Sound engine: procedural chiptune effects via rodio.
///
/// All effects are synthesized into in-memory WAV buffers at init
/// time; playback is fire-and-forget through detached sinks, so the
/// caller never awaits completion. Multi-note sequences (power-up
/// fanfare, game-over dirge) are mixed into a single buffer with each
/// note offset to its scheduled start.
///
/// Compile without the "sound" feature to disable audio entirely
/// (the stub SoundEngine does nothing).

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;

    #[derive(Clone, Copy)]
    enum Waveform {
        Sine,
        Square,
        Sawtooth,
        Triangle,
    }

    impl Waveform {
        /// Sample at the given phase (radians).
        fn at(self, phase: f32) -> f32 {
            use std::f32::consts::{PI, TAU};
            let p = phase.rem_euclid(TAU);
            match self {
                Waveform::Sine => p.sin(),
                Waveform::Square => if p < PI { 1.0 } else { -1.0 },
                Waveform::Sawtooth => p / PI - 1.0,
                Waveform::Triangle => {
                    if p < PI { 2.0 * p / PI - 1.0 } else { 3.0 - 2.0 * p / PI }
                }
            }
        }
    }

    /// Pre-generated WAV buffers for each effect.
    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_jump: Arc<Vec<u8>>,
        sfx_coin: Arc<Vec<u8>>,
        sfx_stomp: Arc<Vec<u8>>,
        sfx_power_up: Arc<Vec<u8>>,
        sfx_damage: Arc<Vec<u8>>,
        sfx_game_over: Arc<Vec<u8>>,
        sfx_block: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_jump: Arc::new(make_wav(&gen_jump())),
                sfx_coin: Arc::new(make_wav(&gen_coin())),
                sfx_stomp: Arc::new(make_wav(&gen_stomp())),
                sfx_power_up: Arc::new(make_wav(&gen_power_up())),
                sfx_damage: Arc::new(make_wav(&gen_damage())),
                sfx_game_over: Arc::new(make_wav(&gen_game_over())),
                sfx_block: Arc::new(make_wav(&gen_block())),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }

        pub fn play_jump(&self) { self.play(&self.sfx_jump); }
        pub fn play_coin(&self) { self.play(&self.sfx_coin); }
        pub fn play_stomp(&self) { self.play(&self.sfx_stomp); }
        pub fn play_power_up(&self) { self.play(&self.sfx_power_up); }
        pub fn play_damage(&self) { self.play(&self.sfx_damage); }
        pub fn play_game_over(&self) { self.play(&self.sfx_game_over); }
        pub fn play_block(&self) { self.play(&self.sfx_block); }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators — all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    /// One tone burst with an exponential frequency sweep f0→f1 and an
    /// exponential fade-out. The phase is integrated sample by sample
    /// so the sweep stays click-free.
    fn gen_sweep(wave: Waveform, f0: f32, f1: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut phase = 0.0_f32;
        let mut samples = Vec::with_capacity(n);
        for i in 0..n {
            let t = i as f32 / n as f32;
            let freq = f0 * (f1 / f0).powf(t);
            phase += std::f32::consts::TAU * freq / SAMPLE_RATE as f32;
            let env = 0.01_f32.powf(t); // exponential ramp to near-silence
            samples.push(wave.at(phase) * env * volume);
        }
        samples
    }

    /// Fixed-pitch note with exponential fade.
    fn gen_note(wave: Waveform, freq: f32, duration: f32, volume: f32) -> Vec<f32> {
        gen_sweep(wave, freq, freq, duration, volume)
    }

    /// Mix notes into one buffer, each offset to its start time.
    fn mix_sequence(notes: &[(f32, f32)], wave: Waveform, spacing: f32, note_dur: f32) -> Vec<f32> {
        let total = spacing * (notes.len() - 1) as f32 + note_dur;
        let mut samples = vec![0.0_f32; (SAMPLE_RATE as f32 * total) as usize];
        for (i, &(freq, volume)) in notes.iter().enumerate() {
            let start = (SAMPLE_RATE as f32 * spacing * i as f32) as usize;
            for (j, s) in gen_note(wave, freq, note_dur, volume).iter().enumerate() {
                if start + j < samples.len() {
                    samples[start + j] += s;
                }
            }
        }
        samples
    }

    /// Jump: quick downward chirp.
    fn gen_jump() -> Vec<f32> {
        gen_sweep(Waveform::Sine, 400.0, 200.0, 0.1, 0.3)
    }

    /// Coin: two-step chime, B5 then E6.
    fn gen_coin() -> Vec<f32> {
        let mut samples = gen_note(Waveform::Sine, 988.0, 0.05, 0.3);
        samples.extend(gen_note(Waveform::Sine, 1319.0, 0.10, 0.3));
        samples
    }

    /// Stomp: squashed square-wave thud.
    fn gen_stomp() -> Vec<f32> {
        gen_sweep(Waveform::Square, 200.0, 50.0, 0.1, 0.3)
    }

    /// Power-up: eight ascending notes at 50 ms spacing.
    fn gen_power_up() -> Vec<f32> {
        let notes: Vec<(f32, f32)> = [659.0, 784.0, 1047.0, 1319.0, 1568.0, 2093.0, 2349.0, 2637.0]
            .iter()
            .map(|&f| (f, 0.2))
            .collect();
        mix_sequence(&notes, Waveform::Sine, 0.05, 0.1)
    }

    /// Damage: harsh sawtooth slide.
    fn gen_damage() -> Vec<f32> {
        gen_sweep(Waveform::Sawtooth, 300.0, 100.0, 0.3, 0.3)
    }

    /// Game over: seven descending notes at 150 ms spacing.
    fn gen_game_over() -> Vec<f32> {
        let notes: Vec<(f32, f32)> = [523.0, 494.0, 440.0, 392.0, 349.0, 330.0, 294.0]
            .iter()
            .map(|&f| (f, 0.2))
            .collect();
        mix_sequence(&notes, Waveform::Sine, 0.15, 0.2)
    }

    /// Block bump: short triangle ping.
    fn gen_block() -> Vec<f32> {
        gen_note(Waveform::Triangle, 500.0, 0.1, 0.3)
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder — wraps f32 samples into a valid mono PCM buffer
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        const CHANNELS: u16 = 1;
        const BITS: u16 = 16;
        let byte_rate = SAMPLE_RATE * (CHANNELS as u32) * (BITS as u32) / 8;
        let block_align = CHANNELS * BITS / 8;
        let data_size = (samples.len() * 2) as u32;

        let mut buf = Vec::with_capacity(44 + data_size as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&CHANNELS.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&BITS.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }
        buf
    }

}

// ════════════════════════════════════════════════════════════
//  Public API — compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_jump(&self) {}
    pub fn play_coin(&self) {}
    pub fn play_stomp(&self) {}
    pub fn play_power_up(&self) {}
    pub fn play_damage(&self) {}
    pub fn play_game_over(&self) {}
    pub fn play_block(&self) {}
}
