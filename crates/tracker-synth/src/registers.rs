/// Base register for f-num low byte, one per channel (`$A0..$A8`).
pub const REG_FNUM_LOW_BASE: u8 = 0xA0;
/// Base register for key-on/block/f-num-high, one per channel (`$B0..$B8`).
pub const REG_KEYON_BLOCK_BASE: u8 = 0xB0;
/// Rhythm/melodic mode register; written 0 at init (spec.md §6).
pub const REG_RHYTHM_MODE: u8 = 0xBD;
/// Waveform-select enable; written `0x20` at init (spec.md §6).
pub const REG_WAVEFORM_ENABLE: u8 = 0x01;

/// Per-channel operator slot offsets for the classic OPL2 channel-to-slot
/// map: channels 0-2 use slots 0-2/3-5, 3-5 use 8-10/11-13, 6-8 use
/// 16-18/19-21.
pub const MOD_SLOT: [u8; 9] = [0, 1, 2, 8, 9, 10, 16, 17, 18];
pub const CAR_SLOT: [u8; 9] = [3, 4, 5, 11, 12, 13, 19, 20, 21];

pub const REG_AVE_BASE: u8 = 0x20; // amp vibrato / envelope type / KSR / multiplier
pub const REG_KSL_LEVEL_BASE: u8 = 0x40; // key-scale level / total level
pub const REG_ATTACK_DECAY_BASE: u8 = 0x60;
pub const REG_SUSTAIN_RELEASE_BASE: u8 = 0x80;
pub const REG_WAVEFORM_BASE: u8 = 0xE0;
/// Feedback/connection (algorithm), one per channel (`$C0..$C8`).
pub const REG_FEEDBACK_CONN_BASE: u8 = 0xC0;
