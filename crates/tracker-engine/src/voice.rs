use tracker_format::{ArpStyle, Scale};

/// Runtime state for an active arpeggio (spec.md §4.3 cmd 1, §4.4).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArpRuntime {
    pub style: ArpStyle,
    pub target_ticks: u16,
    pub phase_timer: u16,
    pub step_index: u32,
    pub just_triggered: bool,
    pub base_note: u8,
}

/// Portamento mode (spec.md §4.3 cmd 2).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortaMode {
    UpTo127,
    DownTo0,
    UpBySemitones,
    DownBySemitones,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PortaRuntime {
    pub mode: PortaMode,
    /// Ticks per one-semitone step; never 0 (defaults to 1).
    pub speed: u16,
    pub phase_timer: u16,
    pub current_note: u8,
    pub target_note: u8,
}

/// Volume-slide mode (spec.md §4.3 cmd 3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VolSlideMode {
    Up,
    Down,
    ToTarget,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VolSlideRuntime {
    pub mode: VolSlideMode,
    /// 8.8 fixed-point per-tick step, `speed_fp = D * 84`.
    pub speed_fp: u16,
    /// 8.8 fixed-point accumulator, clamped to `[0, 0x3F00]`.
    pub accum: u32,
    /// Only meaningful for `ToTarget`; scaled 0..15 -> 0..63.
    pub target: u8,
}

/// LFO waveform shared by vibrato and tremolo (spec.md §4.3: `T % 3`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Square,
}

impl From<u8> for Waveform {
    fn from(t: u8) -> Self {
        match t % 3 {
            0 => Waveform::Sine,
            1 => Waveform::Triangle,
            _ => Waveform::Square,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VibratoRuntime {
    pub rate: u16,
    pub depth: u8,
    pub waveform: Waveform,
    pub phase_timer: u16,
    pub phase: u8,
    pub base_note: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GeneratorRuntime {
    pub scale: Scale,
    pub range: u8,
    pub target_ticks: u16,
    pub phase_timer: u16,
    pub base_note: u8,
}

/// Pitch-owning effects (spec.md §3: "at most one may be active on a
/// voice at a time"). Modeled as a tagged sum type per Design Notes §9
/// rather than a flat struct with `active` flags, so the mutual-exclusion
/// invariant is encoded in the type itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PitchEffect {
    #[default]
    None,
    Arp(ArpRuntime),
    Portamento(PortaRuntime),
    Vibrato(VibratoRuntime),
    Generator(GeneratorRuntime),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TremoloRuntime {
    pub rate: u8,
    pub depth: u8,
    pub waveform: Waveform,
    pub phase: u8,
    /// Anchored to `cell.vol` when a new note is present.
    pub base_vol: u8,
}

/// Volume-owning effects; mutually exclusive per spec.md §3 ("a new
/// volume-slide deactivates tremolo and restores base volume").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum VolumeEffect {
    #[default]
    None,
    VolumeSlide(VolSlideRuntime),
    Tremolo(TremoloRuntime),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoteCutState {
    pub cut_tick: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AutoEchoState {
    pub note: u8,
    pub inst: u8,
    pub vol: u8,
    pub delay_tick: u16,
    pub phase_timer: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetriggerState {
    pub speed: u16,
    pub phase_timer: u16,
    pub note: u8,
    pub inst: u8,
    pub vol: u8,
}

/// C3 Effect State: one instance per voice (nine total). Holds the
/// last-triggered note/inst/vol context, the idempotence shadow, and one
/// record per effect kind (spec.md §3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoiceState {
    pub last_note: u8,
    pub last_inst: u8,
    pub last_vol: u8,
    pub last_effect: u16,
    pub pitch_effect: PitchEffect,
    pub volume_effect: VolumeEffect,
    pub note_cut: Option<NoteCutState>,
    pub note_delay: Option<AutoEchoState>,
    pub retrigger: Option<RetriggerState>,
    pub peak: u8,
    pub active_midi_note: Option<u8>,
}

impl Default for VoiceState {
    fn default() -> Self {
        VoiceState {
            last_note: 0,
            last_inst: 0,
            last_vol: 0,
            last_effect: 0,
            pitch_effect: PitchEffect::None,
            volume_effect: VolumeEffect::None,
            note_cut: None,
            note_delay: None,
            retrigger: None,
            peak: 0,
            active_midi_note: None,
        }
    }
}

impl VoiceState {
    /// The volume a pitch-owning effect's re-strike should use: vol-slide's
    /// current level if a volume effect owns the carrier, else the last
    /// triggered context volume (spec.md §4.4 Arp rule).
    pub fn current_volume(&self) -> u8 {
        match self.volume_effect {
            VolumeEffect::VolumeSlide(v) => (v.accum >> 8) as u8,
            VolumeEffect::Tremolo(t) => t.base_vol,
            VolumeEffect::None => self.last_vol,
        }
    }

    /// Deactivates every effect on this voice (spec.md §4.3 cmd F "Kill").
    /// Tremolo deactivation restores the unmodulated base volume to the
    /// caller via the returned value.
    pub fn kill(&mut self) -> Option<u8> {
        self.pitch_effect = PitchEffect::None;
        let restore = match self.volume_effect {
            VolumeEffect::Tremolo(t) => Some(t.base_vol),
            _ => None,
        };
        self.volume_effect = VolumeEffect::None;
        self.note_cut = None;
        self.note_delay = None;
        self.retrigger = None;
        restore
    }
}
