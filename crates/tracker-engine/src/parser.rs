use tracker_format::{decode, ArpStyle, EffectCmd, PatternCell, Scale, ARP_TICK_LUT};
use tracker_synth::{RegisterSink, SynthDriver};

use crate::voice::{
    ArpRuntime, AutoEchoState, GeneratorRuntime, NoteCutState, PitchEffect, PortaMode,
    PortaRuntime, RetriggerState, TremoloRuntime, VolSlideMode, VolSlideRuntime, VoiceState,
    Waveform,
};

/// Maps the engine's internal 0..63 linear volume to the Synth Driver's
/// 0..127 `set_volume` input (spec.md §4.1).
pub fn to_synth_volume(v: u8) -> u8 {
    ((v as u16) * 2).min(127) as u8
}

fn deactivate_tremolo<S: RegisterSink>(voice: &mut VoiceState, ch: u8, synth: &mut SynthDriver<S>) {
    if let crate::voice::VolumeEffect::Tremolo(t) = voice.volume_effect {
        synth.set_volume(ch, to_synth_volume(t.base_vol));
        voice.volume_effect = crate::voice::VolumeEffect::None;
    }
}

/// C4 Effect Parser: invoked once per voice when the sequencer enters a
/// new row (spec.md §4.3). Idempotent across unchanged effect words.
pub fn parse_row<S: RegisterSink>(
    voice: &mut VoiceState,
    ch: u8,
    cell: PatternCell,
    synth: &mut SynthDriver<S>,
) {
    if cell.effect == voice.last_effect {
        return;
    }

    let effective_note = if cell.note != 0 { cell.note } else { voice.last_note };
    let effective_inst = if cell.inst != 0 { cell.inst } else { voice.last_inst };
    let effective_vol = if cell.vol != 0 { cell.vol } else { voice.last_vol };

    let n = decode(cell.effect);
    match EffectCmd::from(n.cmd) {
        EffectCmd::None => {
            if cell.has_note() {
                if matches!(voice.pitch_effect, PitchEffect::Vibrato(_) | PitchEffect::Generator(_)) {
                    voice.pitch_effect = PitchEffect::None;
                }
                deactivate_tremolo(voice, ch, synth);
                voice.retrigger = None;
            }
        }
        EffectCmd::Arpeggio => {
            let style = ArpStyle::from(n.s);
            voice.pitch_effect = PitchEffect::Arp(ArpRuntime {
                style,
                target_ticks: ARP_TICK_LUT[n.t as usize],
                phase_timer: 0,
                step_index: 0,
                just_triggered: true,
                base_note: effective_note,
            });
        }
        EffectCmd::Portamento => {
            let mode = match n.s {
                0 => PortaMode::UpTo127,
                1 => PortaMode::DownTo0,
                2 => PortaMode::UpBySemitones,
                _ => PortaMode::DownBySemitones,
            };
            let span = if n.t == 0 { 12 } else { n.t as i16 };
            let target_note = match mode {
                PortaMode::UpTo127 => 127,
                PortaMode::DownTo0 => 0,
                PortaMode::UpBySemitones => (effective_note as i16 + span).min(127) as u8,
                PortaMode::DownBySemitones => (effective_note as i16 - span).max(0) as u8,
            };
            voice.pitch_effect = PitchEffect::Portamento(PortaRuntime {
                mode,
                speed: if n.d == 0 { 1 } else { n.d as u16 },
                phase_timer: 0,
                current_note: effective_note,
                target_note,
            });
        }
        EffectCmd::VolumeSlide => {
            deactivate_tremolo(voice, ch, synth);
            let mode = match n.s {
                0 => VolSlideMode::Up,
                1 => VolSlideMode::Down,
                _ => VolSlideMode::ToTarget,
            };
            let target = if n.t == 0 { 0 } else { (n.t as u32 * 63 / 15) as u8 };
            voice.volume_effect = crate::voice::VolumeEffect::VolumeSlide(VolSlideRuntime {
                mode,
                speed_fp: n.d as u16 * 84,
                accum: (effective_vol as u32) << 8,
                target,
            });
        }
        EffectCmd::Vibrato => {
            voice.pitch_effect = PitchEffect::Vibrato(crate::voice::VibratoRuntime {
                rate: if n.s == 0 { 1 } else { n.s as u16 },
                depth: n.d,
                waveform: Waveform::from(n.t),
                phase_timer: 0,
                phase: 0,
                base_note: effective_note,
            });
        }
        EffectCmd::NoteCut => {
            voice.note_cut = Some(NoteCutState {
                cut_tick: if n.t == 0 { 1 } else { n.t as u16 },
            });
        }
        EffectCmd::AutoEcho => {
            let vol = (n.s as u32 * 63 / 15) as u8;
            let note = (effective_note as i16 + n.t as i16).clamp(0, 127) as u8;
            voice.note_delay = Some(AutoEchoState {
                note,
                inst: effective_inst,
                vol,
                delay_tick: if n.d == 0 { 1 } else { n.d as u16 },
                phase_timer: 0,
            });
        }
        EffectCmd::Retrigger => {
            voice.retrigger = Some(RetriggerState {
                speed: if n.t == 0 { 3 } else { n.t as u16 },
                phase_timer: 0,
                note: effective_note,
                inst: effective_inst,
                vol: effective_vol,
            });
        }
        EffectCmd::Tremolo => {
            let base_vol = if cell.has_note() { effective_vol } else { voice.last_vol };
            voice.volume_effect = crate::voice::VolumeEffect::Tremolo(TremoloRuntime {
                rate: if n.s == 0 { 1 } else { n.s },
                depth: n.d,
                waveform: Waveform::from(n.t),
                phase: 0,
                base_vol,
            });
        }
        EffectCmd::FinePitch => {
            let detune = if n.d < 8 { n.d as i8 } else { n.d as i8 - 16 };
            synth.note_on_detuned(ch, effective_note, detune);
        }
        EffectCmd::Generator => {
            voice.pitch_effect = PitchEffect::Generator(GeneratorRuntime {
                scale: Scale::from(n.s),
                range: n.d.max(1),
                target_ticks: ARP_TICK_LUT[n.t as usize],
                phase_timer: 0,
                base_note: effective_note,
            });
        }
        EffectCmd::Kill => {
            if let Some(restore) = voice.kill() {
                synth.set_volume(ch, to_synth_volume(restore));
            }
        }
        EffectCmd::Unknown(_) => {}
    }

    voice.last_inst = effective_inst;
    voice.last_vol = effective_vol;
    voice.last_effect = cell.effect;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracker_synth::SynthDriver;

    fn driver() -> SynthDriver<Vec<(u8, u8)>> {
        SynthDriver::new(Vec::new())
    }

    #[test]
    fn idempotent_across_unchanged_word() {
        let mut voice = VoiceState {
            last_effect: 0x4224,
            pitch_effect: PitchEffect::Vibrato(crate::voice::VibratoRuntime {
                rate: 2,
                depth: 2,
                waveform: Waveform::Square,
                phase_timer: 5,
                phase: 40,
                base_note: 60,
            }),
            ..Default::default()
        };
        let before = voice;
        let mut synth = driver();
        let cell = PatternCell {
            note: 0,
            inst: 0,
            vol: 0,
            effect: 0x4224,
        };
        parse_row(&mut voice, 0, cell, &mut synth);
        assert_eq!(voice, before, "idempotent parse must not mutate state");
    }

    #[test]
    fn arpeggio_decode_matches_s1() {
        let mut voice = VoiceState::default();
        let mut synth = driver();
        let cell = PatternCell {
            note: 60,
            inst: 0,
            vol: 63,
            effect: 0x1300,
        };
        parse_row(&mut voice, 0, cell, &mut synth);
        match voice.pitch_effect {
            PitchEffect::Arp(a) => {
                assert_eq!(a.style, ArpStyle::MinorTriad);
                assert_eq!(a.target_ticks, 1);
                assert!(a.just_triggered);
                assert_eq!(a.base_note, 60);
            }
            _ => panic!("expected arp"),
        }
    }

    #[test]
    fn kill_restores_tremolo_volume_once() {
        let mut voice = VoiceState::default();
        voice.volume_effect = crate::voice::VolumeEffect::Tremolo(TremoloRuntime {
            rate: 4,
            depth: 4,
            waveform: Waveform::Sine,
            phase: 10,
            base_vol: 40,
        });
        voice.last_effect = 0x8446;
        let mut synth = driver();
        let cell = PatternCell {
            note: 0,
            inst: 0,
            vol: 0,
            effect: 0xF000,
        };
        parse_row(&mut voice, 2, cell, &mut synth);
        assert_eq!(voice.volume_effect, crate::voice::VolumeEffect::None);
        // channel 2's carrier slot is CAR_SLOT[2] = 5, register 0x40+5 = 0x45;
        // attenuation = 63 - (to_synth_volume(40) >> 1).
        let expected_attenuation = 63u8 - (to_synth_volume(40) >> 1);
        assert_eq!(synth.sink(), &vec![(0x45, expected_attenuation)]);
    }
}
