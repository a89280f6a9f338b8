use tracing::debug;

use crate::freq::{detuned_block_fnum, midi_to_block_fnum, reg_pair};
use crate::patch::Patch;
use crate::registers::*;

/// Destination for register writes the driver decides to actually fire.
/// Kept generic so tests can observe exactly which writes survive shadow
/// suppression without standing up real hardware.
pub trait RegisterSink {
    fn write_register(&mut self, reg: u8, data: u8);
}

impl RegisterSink for Vec<(u8, u8)> {
    fn write_register(&mut self, reg: u8, data: u8) {
        self.push((reg, data));
    }
}

/// A sink that does nothing; useful when only the driver's internal shadow
/// state matters.
#[derive(Default)]
pub struct NullSink;

impl RegisterSink for NullSink {
    fn write_register(&mut self, _reg: u8, _data: u8) {}
}

/// C1 Synth Driver: translates note/volume/patch/pitch operations into
/// register writes with shadow suppression of redundant writes
/// (spec.md §4.1). REQUIRED per spec.md — the only mechanism keeping the
/// per-tick workload inside one vsync on slow hardware.
pub struct SynthDriver<S: RegisterSink> {
    shadow: [u8; 256],
    /// `$B0+ch` with the key-on bit masked out, so `note_off` can restore
    /// block/f-num-high without re-triggering.
    key_on_block_shadow: [u8; 9],
    /// Top two bits (KSL) of the carrier's level register per channel,
    /// preserved across `set_volume` writes.
    ksl_carrier_shadow: [u8; 9],
    sink: S,
}

impl<S: RegisterSink> SynthDriver<S> {
    pub fn new(sink: S) -> Self {
        SynthDriver {
            shadow: [0xFF; 256],
            key_on_block_shadow: [0; 9],
            ksl_carrier_shadow: [0; 9],
            sink,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Shadow-suppressed write: skips writes that would not change the
    /// hardware value.
    fn write(&mut self, reg: u8, data: u8) {
        let idx = reg as usize;
        if self.shadow[idx] == data {
            return;
        }
        self.shadow[idx] = data;
        self.sink.write_register(reg, data);
    }

    /// Force-write, bypassing shadow comparison. Used only by [`Self::panic`]
    /// so it is always effective even if the shadow already reads the
    /// target value.
    fn write_forced(&mut self, reg: u8, data: u8) {
        self.shadow[reg as usize] = data;
        self.sink.write_register(reg, data);
    }

    /// Resets the shadow to its dirty init value and wipes the register
    /// range, then programs waveform-select and melodic mode
    /// (spec.md §6: `$01`=0x20, `$BD`=0 at init).
    pub fn init(&mut self) {
        self.shadow = [0xFF; 256];
        self.key_on_block_shadow = [0; 9];
        self.ksl_carrier_shadow = [0; 9];
        for reg in 0x01..=0xF5u8 {
            self.write(reg, 0);
        }
        self.write(REG_WAVEFORM_ENABLE, 0x20);
        self.write(REG_RHYTHM_MODE, 0x00);
        debug!("synth driver initialized");
    }

    fn channel(ch: u8) -> usize {
        (ch as usize).min(8)
    }

    pub fn note_on(&mut self, ch: u8, midi: u8) {
        let ch_idx = Self::channel(ch);
        let (block, fnum) = midi_to_block_fnum(midi);
        let (lo, hi) = reg_pair(block, fnum, true);
        self.write(REG_FNUM_LOW_BASE + ch_idx as u8, lo);
        self.write(REG_KEYON_BLOCK_BASE + ch_idx as u8, hi);
        self.key_on_block_shadow[ch_idx] = hi & 0x1F;
        debug!(channel = ch_idx, note = midi, "note_on");
    }

    /// Fine-pitch variant: `detune_1_16th` is a signed 1/16-semitone offset
    /// (spec.md §4.3 cmd 9), applied as an immediate re-trigger.
    pub fn note_on_detuned(&mut self, ch: u8, midi: u8, detune_1_16th: i8) {
        let ch_idx = Self::channel(ch);
        let (block, fnum) = detuned_block_fnum(midi, detune_1_16th);
        let (lo, hi) = reg_pair(block, fnum, true);
        self.write(REG_FNUM_LOW_BASE + ch_idx as u8, lo);
        self.write(REG_KEYON_BLOCK_BASE + ch_idx as u8, hi);
        self.key_on_block_shadow[ch_idx] = hi & 0x1F;
        debug!(channel = ch_idx, note = midi, detune = detune_1_16th, "note_on_detuned");
    }

    /// Zeroes key-on while preserving block/f-num in the shadow.
    pub fn note_off(&mut self, ch: u8) {
        let ch_idx = Self::channel(ch);
        let restored = self.key_on_block_shadow[ch_idx];
        self.write(REG_KEYON_BLOCK_BASE + ch_idx as u8, restored);
        debug!(channel = ch_idx, "note_off");
    }

    /// Changes frequency without re-triggering the envelope: key-on stays
    /// asserted.
    pub fn set_pitch(&mut self, ch: u8, midi: u8) {
        let ch_idx = Self::channel(ch);
        let (block, fnum) = midi_to_block_fnum(midi);
        let (lo, hi) = reg_pair(block, fnum, true);
        self.write(REG_FNUM_LOW_BASE + ch_idx as u8, lo);
        self.write(REG_KEYON_BLOCK_BASE + ch_idx as u8, hi);
        self.key_on_block_shadow[ch_idx] = hi & 0x1F;
    }

    /// Maps `v` (0..127) to carrier attenuation `63 - (v>>1)` and writes
    /// the carrier's level register, preserving its KSL bits.
    pub fn set_volume(&mut self, ch: u8, v: u8) {
        let ch_idx = Self::channel(ch);
        let attenuation = 63u8.saturating_sub(v >> 1);
        let reg = REG_KSL_LEVEL_BASE + CAR_SLOT[ch_idx];
        let data = (self.ksl_carrier_shadow[ch_idx] & 0xC0) | (attenuation & 0x3F);
        self.write(reg, data);
    }

    /// Loads the modulator and carrier operator records plus the shared
    /// feedback/connection nibble.
    pub fn set_patch(&mut self, ch: u8, patch: &Patch) {
        let ch_idx = Self::channel(ch);
        let m = MOD_SLOT[ch_idx];
        let c = CAR_SLOT[ch_idx];

        self.write(REG_AVE_BASE + m, patch.m_ave);
        self.write(REG_KSL_LEVEL_BASE + m, patch.m_ksl);
        self.write(REG_ATTACK_DECAY_BASE + m, patch.m_atdec);
        self.write(REG_SUSTAIN_RELEASE_BASE + m, patch.m_susrel);
        self.write(REG_WAVEFORM_BASE + m, patch.m_wave);

        self.write(REG_AVE_BASE + c, patch.c_ave);
        self.write(REG_KSL_LEVEL_BASE + c, patch.c_ksl);
        self.write(REG_ATTACK_DECAY_BASE + c, patch.c_atdec);
        self.write(REG_SUSTAIN_RELEASE_BASE + c, patch.c_susrel);
        self.write(REG_WAVEFORM_BASE + c, patch.c_wave);
        self.ksl_carrier_shadow[ch_idx] = patch.c_ksl & 0xC0;

        self.write(REG_FEEDBACK_CONN_BASE + ch_idx as u8, patch.feedback_conn);
    }

    /// Zeroes key-on for every channel without touching any other state.
    pub fn silence_all(&mut self) {
        for ch in 0..9u8 {
            self.note_off(ch);
        }
    }

    /// User-safety panic (spec.md §7): force-writes zero to every
    /// `$B0+ch`, bypassing shadow suppression so it is effective even if
    /// the shadow already reads zero. Idempotent and always safe.
    pub fn panic(&mut self) {
        for ch in 0..9u8 {
            self.write_forced(REG_KEYON_BLOCK_BASE + ch, 0x00);
            self.key_on_block_shadow[ch as usize] = 0;
        }
        debug!("panic: all voices silenced");
    }
}
