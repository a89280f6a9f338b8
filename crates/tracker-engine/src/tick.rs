use rand::RngCore;
use tracker_format::{arp_offset, scale_offset};
use tracker_synth::{PatchBank, RegisterSink, SynthDriver};

use crate::parser::to_synth_volume;
use crate::voice::{PitchEffect, VolSlideMode, VoiceState, Waveform};

/// Everything a single effect's tick function needs. Grouped into a
/// context so the fixed dispatch table (Design Notes §9: "retain the
/// deterministic order as a table of function references") can hold plain
/// `fn` pointers instead of threading a long parameter list through each
/// handler.
pub struct TickCtx<'a, S: RegisterSink, P: PatchBank, R: RngCore> {
    pub voice: &'a mut VoiceState,
    pub ch: u8,
    pub tick_counter: u16,
    pub synth: &'a mut SynthDriver<S>,
    pub patch_bank: &'a P,
    pub rng: &'a mut R,
}

fn lfo_offset(waveform: Waveform, depth: u8, phase: u8) -> i16 {
    let depth = depth as i32;
    match waveform {
        // Piecewise-linear approximation over 4 quadrants of a sine cycle.
        Waveform::Sine => {
            let q = phase / 64;
            let p = (phase % 64) as i32;
            (match q {
                0 => (depth * p) / 64,
                1 => depth - (depth * p) / 64,
                2 => -(depth * p) / 64,
                _ => -depth + (depth * p) / 64,
            }) as i16
        }
        // Centered two-slope ramp across the full cycle.
        Waveform::Triangle => {
            let p = phase as i32;
            (if p < 128 {
                -depth + (depth * 2 * p) / 128
            } else {
                depth - (depth * 2 * (p - 128)) / 128
            }) as i16
        }
        Waveform::Square => {
            if phase < 128 {
                depth as i16
            } else {
                -(depth as i16)
            }
        }
    }
}

fn tick_arp<S: RegisterSink, P: PatchBank, R: RngCore>(ctx: &mut TickCtx<S, P, R>) {
    let PitchEffect::Arp(mut a) = ctx.voice.pitch_effect else {
        return;
    };
    if a.just_triggered {
        a.just_triggered = false;
        ctx.voice.pitch_effect = PitchEffect::Arp(a);
        return;
    }
    a.phase_timer += 1;
    if a.phase_timer >= a.target_ticks {
        a.phase_timer = 0;
        a.step_index += 1;
        let offset = arp_offset(a.style, a.step_index);
        let note = (a.base_note as i16 + offset).clamp(0, 127) as u8;
        let vol = ctx.voice.current_volume();
        ctx.synth.note_on(ctx.ch, note);
        ctx.synth.set_volume(ctx.ch, to_synth_volume(vol));
    }
    ctx.voice.pitch_effect = PitchEffect::Arp(a);
}

fn tick_portamento<S: RegisterSink, P: PatchBank, R: RngCore>(ctx: &mut TickCtx<S, P, R>) {
    if ctx.tick_counter == 0 {
        return;
    }
    let PitchEffect::Portamento(mut p) = ctx.voice.pitch_effect else {
        return;
    };
    p.phase_timer += 1;
    if p.phase_timer >= p.speed {
        p.phase_timer = 0;
        if p.current_note < p.target_note {
            p.current_note += 1;
        } else if p.current_note > p.target_note {
            p.current_note -= 1;
        }
        ctx.synth.set_pitch(ctx.ch, p.current_note);
        if p.current_note == p.target_note {
            ctx.voice.pitch_effect = PitchEffect::None;
            return;
        }
    }
    ctx.voice.pitch_effect = PitchEffect::Portamento(p);
}

fn tick_volume_slide<S: RegisterSink, P: PatchBank, R: RngCore>(ctx: &mut TickCtx<S, P, R>) {
    use crate::voice::VolumeEffect;
    let VolumeEffect::VolumeSlide(mut v) = ctx.voice.volume_effect else {
        return;
    };
    const MAX_ACCUM: u32 = 0x3F00;
    match v.mode {
        VolSlideMode::Up => {
            v.accum = (v.accum + v.speed_fp as u32).min(MAX_ACCUM);
        }
        VolSlideMode::Down => {
            v.accum = v.accum.saturating_sub(v.speed_fp as u32);
        }
        VolSlideMode::ToTarget => {
            let target_accum = (v.target as u32) << 8;
            if v.accum < target_accum {
                v.accum = (v.accum + v.speed_fp as u32).min(target_accum);
            } else if v.accum > target_accum {
                v.accum = v.accum.saturating_sub(v.speed_fp as u32).max(target_accum);
            }
        }
    }
    ctx.synth.set_volume(ctx.ch, to_synth_volume((v.accum >> 8) as u8));
    ctx.voice.volume_effect = VolumeEffect::VolumeSlide(v);
}

fn tick_vibrato<S: RegisterSink, P: PatchBank, R: RngCore>(ctx: &mut TickCtx<S, P, R>) {
    let PitchEffect::Vibrato(mut v) = ctx.voice.pitch_effect else {
        return;
    };
    v.phase_timer += 1;
    if v.phase_timer >= v.rate {
        v.phase_timer = 0;
        v.phase = v.phase.wrapping_add(32);
    }
    let offset = lfo_offset(v.waveform, v.depth, v.phase);
    let note = (v.base_note as i16 + offset).clamp(0, 127) as u8;
    ctx.synth.set_pitch(ctx.ch, note);
    ctx.voice.pitch_effect = PitchEffect::Vibrato(v);
}

fn tick_note_cut<S: RegisterSink, P: PatchBank, R: RngCore>(ctx: &mut TickCtx<S, P, R>) {
    let Some(nc) = ctx.voice.note_cut else {
        return;
    };
    if ctx.tick_counter == nc.cut_tick {
        ctx.synth.note_off(ctx.ch);
        ctx.voice.peak = 0;
        ctx.voice.note_cut = None;
    }
}

fn tick_note_delay<S: RegisterSink, P: PatchBank, R: RngCore>(ctx: &mut TickCtx<S, P, R>) {
    if ctx.tick_counter == 0 {
        return;
    }
    let Some(mut echo) = ctx.voice.note_delay else {
        return;
    };
    echo.phase_timer += 1;
    if echo.phase_timer >= echo.delay_tick {
        echo.phase_timer = 0;
        echo.vol = echo.vol.saturating_sub(6);
        if echo.vol > 6 {
            let patch = ctx.patch_bank.patch(echo.inst);
            ctx.synth.set_patch(ctx.ch, &patch);
            ctx.synth.note_on(ctx.ch, echo.note);
            ctx.synth.set_volume(ctx.ch, to_synth_volume(echo.vol));
            ctx.voice.note_delay = Some(echo);
        } else {
            ctx.voice.note_delay = None;
        }
    } else {
        ctx.voice.note_delay = Some(echo);
    }
}

fn tick_retrigger<S: RegisterSink, P: PatchBank, R: RngCore>(ctx: &mut TickCtx<S, P, R>) {
    let Some(mut rt) = ctx.voice.retrigger else {
        return;
    };
    rt.phase_timer += 1;
    if rt.phase_timer >= rt.speed {
        rt.phase_timer = 0;
        let patch = ctx.patch_bank.patch(rt.inst);
        ctx.synth.set_patch(ctx.ch, &patch);
        ctx.synth.note_on(ctx.ch, rt.note);
        ctx.synth.set_volume(ctx.ch, to_synth_volume(rt.vol));
    }
    ctx.voice.retrigger = Some(rt);
}

fn tick_tremolo<S: RegisterSink, P: PatchBank, R: RngCore>(ctx: &mut TickCtx<S, P, R>) {
    if ctx.tick_counter == 0 {
        return;
    }
    use crate::voice::VolumeEffect;
    let VolumeEffect::Tremolo(mut t) = ctx.voice.volume_effect else {
        return;
    };
    t.phase = t.phase.wrapping_add((t.rate as u16 * 4) as u8);
    let lfo = lfo_offset(t.waveform, t.depth, t.phase);
    let new_vol = (t.base_vol as i16 + lfo).clamp(0, 63) as u8;
    ctx.synth.set_volume(ctx.ch, to_synth_volume(new_vol));
    ctx.voice.volume_effect = VolumeEffect::Tremolo(t);
}

fn tick_fine_pitch<S: RegisterSink, P: PatchBank, R: RngCore>(_ctx: &mut TickCtx<S, P, R>) {
    // No-op per tick; the detune is applied immediately at parse time
    // (spec.md §4.4).
}

fn tick_generator<S: RegisterSink, P: PatchBank, R: RngCore>(ctx: &mut TickCtx<S, P, R>) {
    if ctx.tick_counter == 0 {
        return;
    }
    let PitchEffect::Generator(mut g) = ctx.voice.pitch_effect else {
        return;
    };
    g.phase_timer += 1;
    if g.phase_timer >= g.target_ticks {
        g.phase_timer = 0;
        let degree = (ctx.rng.next_u32() % g.range as u32) as u8;
        let offset = scale_offset(g.scale, degree);
        let note = (g.base_note as i16 + offset).clamp(0, 127) as u8;
        let vol = ctx.voice.current_volume();
        ctx.synth.note_on(ctx.ch, note);
        ctx.synth.set_volume(ctx.ch, to_synth_volume(vol));
    }
    ctx.voice.pitch_effect = PitchEffect::Generator(g);
}

type Handler<S, P, R> = fn(&mut TickCtx<S, P, R>);

/// C5 Per-Tick Processor: runs every vsync, one voice at a time, each
/// effect's tick function in the fixed order spec.md §4.4 mandates. Later
/// effects observe the side effects of earlier ones (e.g. vol-slide sets
/// the carrier volume that arp's retrigger then reads).
///
/// The dispatch table is a plain array of `fn` pointers (Design Notes §9)
/// so adding an effect is a one-line change localized to this function.
pub fn process_tick<S: RegisterSink, P: PatchBank, R: RngCore>(ctx: &mut TickCtx<S, P, R>) {
    const HANDLER_COUNT: usize = 10;
    let handlers: [Handler<S, P, R>; HANDLER_COUNT] = [
        tick_arp,
        tick_portamento,
        tick_volume_slide,
        tick_vibrato,
        tick_note_cut,
        tick_note_delay,
        tick_retrigger,
        tick_tremolo,
        tick_fine_pitch,
        tick_generator,
    ];
    for handler in handlers {
        handler(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::{PortaMode, PortaRuntime};
    use tracker_synth::StaticPatchBank;

    fn ctx_parts() -> (SynthDriver<Vec<(u8, u8)>>, StaticPatchBank, rand_pcg::Pcg32) {
        (
            SynthDriver::new(Vec::new()),
            StaticPatchBank::default(),
            rand_pcg::Pcg32::new(1, 1),
        )
    }

    #[test]
    fn portamento_steps_one_semitone_per_tick_s3() {
        let (mut synth, bank, mut rng) = ctx_parts();
        let mut voice = VoiceState {
            pitch_effect: PitchEffect::Portamento(PortaRuntime {
                mode: PortaMode::UpBySemitones,
                speed: 1,
                phase_timer: 0,
                current_note: 60,
                target_note: 63,
            }),
            ..Default::default()
        };
        let mut notes_seen = Vec::new();
        // tick_counter == 0 is row entry and is skipped by portamento.
        for tick in 0..=4u16 {
            let mut ctx = TickCtx {
                voice: &mut voice,
                ch: 0,
                tick_counter: tick,
                synth: &mut synth,
                patch_bank: &bank,
                rng: &mut rng,
            };
            process_tick(&mut ctx);
            if let PitchEffect::Portamento(p) = ctx.voice.pitch_effect {
                notes_seen.push(p.current_note);
            }
        }
        assert_eq!(notes_seen, vec![61, 62]);
        assert_eq!(
            voice.pitch_effect,
            PitchEffect::None,
            "reaching target deactivates portamento"
        );
    }

    #[test]
    fn note_cut_fires_at_configured_tick_s4() {
        let (mut synth, bank, mut rng) = ctx_parts();
        let mut voice = VoiceState {
            note_cut: Some(crate::voice::NoteCutState { cut_tick: 3 }),
            peak: 63,
            ..Default::default()
        };
        for tick in 0..=3u16 {
            let mut ctx = TickCtx {
                voice: &mut voice,
                ch: 0,
                tick_counter: tick,
                synth: &mut synth,
                patch_bank: &bank,
                rng: &mut rng,
            };
            process_tick(&mut ctx);
        }
        assert!(voice.note_cut.is_none());
        assert_eq!(voice.peak, 0);
    }
}
