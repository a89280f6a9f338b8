use tracker_engine::{
    advance, parse_row, process_tick, JamMask, PitchEffect, SequencerState, TickCtx, VoiceState,
};
use tracker_format::PatternCell;
use tracker_synth::{midi_to_block_fnum, StaticPatchBank, SynthDriver};

struct NoJam;
impl JamMask for NoJam {
    fn is_jamming(&self, _ch: u8) -> bool {
        false
    }
}

/// Decodes the most recent `($A0+ch, $B0+ch)` register pair recorded in
/// `sink` back to the nearest represented MIDI note, by re-deriving every
/// candidate note's register pair and matching.
fn last_note_on(sink: &[(u8, u8)], ch: u8) -> Option<u8> {
    let fnum_reg = 0xA0 + ch;
    let keyon_reg = 0xB0 + ch;
    let lo = sink.iter().rev().find(|(r, _)| *r == fnum_reg)?.1;
    let hi = sink.iter().rev().find(|(r, _)| *r == keyon_reg)?.1;
    (0..=127u8).find(|&midi| {
        let (block, fnum) = midi_to_block_fnum(midi);
        let want_lo = (fnum & 0xFF) as u8;
        let want_hi = ((block << 2) | ((fnum >> 8) as u8 & 0x3)) | 0x20;
        want_lo == lo && want_hi == hi
    })
}

/// S1 (arp tick cycle): a minor-triad arp re-strikes every tick
/// (LUT[0] = 1 tick/step), cycling 0,3,7,12 semitones above the base note
/// indefinitely across row boundaries.
#[test]
fn s1_arp_tick_cycle() {
    let mut store = tracker_format::PatternStore::new(16);
    store.write_cell(
        0,
        0,
        0,
        PatternCell {
            note: 60,
            inst: 0,
            vol: 63,
            effect: 0x1300,
        },
    );

    let mut seq = SequencerState {
        ticks_per_row: 6,
        is_song_mode: false,
        cur_pattern: 0,
        ..Default::default()
    };
    seq.play();
    let mut voices = [VoiceState::default(); 9];
    let mut synth = SynthDriver::new(Vec::new());
    let bank = StaticPatchBank::default();
    let mut rng = rand_pcg::Pcg32::new(1, 1);

    // The shadow register suppresses a byte whenever the new value happens
    // to equal what's already latched, so "current note" must be decoded
    // from the *cumulative* register state, not from writes made in a
    // single frame.
    let mut notes = Vec::new();
    for _ in 0..12u32 {
        let frame_tick = seq.tick_counter;
        advance(&mut seq, &store, &mut voices, &NoJam, &mut synth, &bank);
        let mut ctx = TickCtx {
            voice: &mut voices[0],
            ch: 0,
            tick_counter: frame_tick,
            synth: &mut synth,
            patch_bank: &bank,
            rng: &mut rng,
        };
        process_tick(&mut ctx);
        notes.push(last_note_on(synth.sink(), 0).expect("voice 0 has sounded by now"));
    }

    assert_eq!(notes, vec![60, 63, 67, 72, 60, 63, 67, 72, 60, 63, 67, 72]);
}

/// S2 (vibrato idempotence): a vibrato held across rows 1..3 by repeating
/// the same effect word (no new note on those rows) must keep running its
/// phase uninterrupted through row entry, the same way it would if those
/// row boundaries didn't exist at all.
#[test]
fn s2_vibrato_phase_survives_idempotent_row_reentry() {
    let mut store = tracker_format::PatternStore::new(16);
    store.write_cell(
        0,
        0,
        0,
        PatternCell { note: 60, inst: 0, vol: 63, effect: 0x4224 },
    );
    for row in 1..=3u8 {
        store.write_cell(
            0,
            row,
            0,
            PatternCell { note: 0, inst: 0, vol: 0, effect: 0x4224 },
        );
    }

    let mut seq = SequencerState { ticks_per_row: 6, cur_pattern: 0, ..Default::default() };
    seq.play();
    let mut voices = [VoiceState::default(); 9];
    let mut synth = SynthDriver::new(Vec::new());
    let bank = StaticPatchBank::default();
    let mut rng = rand_pcg::Pcg32::new(1, 1);

    // Drive exactly 3 rows' worth of ticks (row 0, 1, 2's full span), which
    // lands tick_counter back at 0 ready to enter row 3.
    let driven_ticks = 3 * seq.ticks_per_row;
    for _ in 0..driven_ticks {
        let frame_tick = seq.tick_counter;
        advance(&mut seq, &store, &mut voices, &NoJam, &mut synth, &bank);
        let mut ctx = TickCtx {
            voice: &mut voices[0],
            ch: 0,
            tick_counter: frame_tick,
            synth: &mut synth,
            patch_bank: &bank,
            rng: &mut rng,
        };
        process_tick(&mut ctx);
    }
    // One more advance() re-enters row 3 with the identical effect word —
    // idempotent, so it must not touch phase/phase_timer.
    advance(&mut seq, &store, &mut voices, &NoJam, &mut synth, &bank);
    let PitchEffect::Vibrato(driven) = voices[0].pitch_effect else {
        panic!("vibrato must still be active at row 3 entry")
    };

    // Baseline: the identical vibrato runtime ticked continuously for the
    // same number of ticks, with no intervening row re-entries at all.
    let mut baseline_voice = VoiceState::default();
    let mut baseline_synth = SynthDriver::new(Vec::new());
    let mut baseline_rng = rand_pcg::Pcg32::new(1, 1);
    parse_row(
        &mut baseline_voice,
        0,
        PatternCell { note: 60, inst: 0, vol: 63, effect: 0x4224 },
        &mut baseline_synth,
    );
    // Vibrato never skips on `tick_counter == 0` (unlike portamento/tremolo),
    // so the tick value passed doesn't matter here, only the call count: it
    // must equal the driven run's 18 `process_tick` calls exactly.
    for tick in 0..driven_ticks {
        let mut ctx = TickCtx {
            voice: &mut baseline_voice,
            ch: 0,
            tick_counter: tick,
            synth: &mut baseline_synth,
            patch_bank: &bank,
            rng: &mut baseline_rng,
        };
        process_tick(&mut ctx);
    }
    let PitchEffect::Vibrato(baseline) = baseline_voice.pitch_effect else {
        panic!("baseline vibrato must still be active")
    };

    assert_eq!(driven.phase, baseline.phase, "phase must not reset across idempotent row entry");
    assert_eq!(driven.phase_timer, baseline.phase_timer);
}

/// S3 (portamento arrives), driven end-to-end through row entry (for the
/// initial strike) and the real per-tick pipeline (for every step after).
#[test]
fn s3_portamento_arrives_end_to_end() {
    let mut store = tracker_format::PatternStore::new(16);
    store.write_cell(
        0,
        0,
        0,
        PatternCell { note: 60, inst: 0, vol: 63, effect: 0x2203 },
    );

    let mut seq = SequencerState { ticks_per_row: 6, cur_pattern: 0, ..Default::default() };
    seq.play();
    let mut voices = [VoiceState::default(); 9];
    let mut synth = SynthDriver::new(Vec::new());
    let bank = StaticPatchBank::default();
    let mut rng = rand_pcg::Pcg32::new(1, 1);

    // `set_pitch` fires before the tick that lands exactly on the target
    // deactivates the effect, so the register trail (not the voice's
    // `pitch_effect` snapshot, which already reads back `None` on that
    // same tick) is the only place all four notes are observable.
    let mut notes_seen = Vec::new();
    for _ in 0..5u16 {
        let frame_tick = seq.tick_counter;
        advance(&mut seq, &store, &mut voices, &NoJam, &mut synth, &bank);
        let mut ctx = TickCtx {
            voice: &mut voices[0],
            ch: 0,
            tick_counter: frame_tick,
            synth: &mut synth,
            patch_bank: &bank,
            rng: &mut rng,
        };
        process_tick(&mut ctx);
        notes_seen.push(last_note_on(synth.sink(), 0).expect("voice 0 has sounded by now"));
    }

    assert_eq!(notes_seen, vec![60, 61, 62, 63, 63], "advances to 63 then holds");
    assert_eq!(voices[0].pitch_effect, PitchEffect::None, "reaching target deactivates portamento");
}

/// S4 (note-cut), driven end-to-end: row entry strikes the note, then the
/// per-tick pipeline cuts it at the configured tick and zeroes the peak.
#[test]
fn s4_note_cut_end_to_end() {
    let mut store = tracker_format::PatternStore::new(16);
    store.write_cell(
        0,
        0,
        0,
        PatternCell { note: 72, inst: 0, vol: 63, effect: 0x5003 },
    );

    let mut seq = SequencerState { ticks_per_row: 6, cur_pattern: 0, ..Default::default() };
    seq.play();
    let mut voices = [VoiceState::default(); 9];
    let mut synth = SynthDriver::new(Vec::new());
    let bank = StaticPatchBank::default();
    let mut rng = rand_pcg::Pcg32::new(1, 1);

    for _ in 0..=3u16 {
        let frame_tick = seq.tick_counter;
        advance(&mut seq, &store, &mut voices, &NoJam, &mut synth, &bank);
        let mut ctx = TickCtx {
            voice: &mut voices[0],
            ch: 0,
            tick_counter: frame_tick,
            synth: &mut synth,
            patch_bank: &bank,
            rng: &mut rng,
        };
        process_tick(&mut ctx);
    }

    assert!(voices[0].note_cut.is_none(), "note-cut deactivates once fired");
    assert_eq!(voices[0].peak, 0);
    let last_keyon = synth.sink().iter().rev().find(|(r, _)| *r == 0xB0).expect("a key-on/off write on channel 0");
    assert_eq!(last_keyon.1 & 0x20, 0, "key-on bit must be cleared by note_off");
}

/// S5 (F000 kill restores volume): a tremolo active at base vol 40 must be
/// deactivated and the carrier volume restored to exactly 40, once, by the
/// kill command.
#[test]
fn s5_kill_restores_tremolo_volume() {
    let mut voice = VoiceState {
        volume_effect: tracker_engine::VolumeEffect::Tremolo(tracker_engine::TremoloRuntime {
            rate: 4,
            depth: 4,
            waveform: tracker_engine::Waveform::Sine,
            phase: 20,
            base_vol: 40,
        }),
        last_effect: 0x8446,
        ..Default::default()
    };
    let mut synth = SynthDriver::new(Vec::new());
    let kill_cell = PatternCell {
        note: 0,
        inst: 0,
        vol: 0,
        effect: 0xF000,
    };

    parse_row(&mut voice, 0, kill_cell, &mut synth);

    assert_eq!(voice.volume_effect, tracker_engine::VolumeEffect::None);
    // Carrier slot for channel 0 is CAR_SLOT[0] = 3, register 0x40+3 = 0x43.
    let carrier_writes: Vec<_> = synth.sink().iter().filter(|(r, _)| *r == 0x43).collect();
    assert_eq!(carrier_writes.len(), 1, "volume restored exactly once");
    let expected_attenuation = 63u8 - ((40u8 * 2).min(127) >> 1);
    assert_eq!(carrier_writes[0].1, expected_attenuation);
}

/// S6 (song advance), exercised end-to-end through the public `advance`
/// entry point rather than `sequencer`'s own inline test.
#[test]
fn s6_song_advance_end_to_end() {
    let mut store = tracker_format::PatternStore::new(16);
    store.order.set_song_length(3);
    store.write_order(0, 1);
    store.write_order(1, 2);
    store.write_order(2, 0);

    let mut seq = SequencerState {
        is_playing: true,
        tick_counter: 5,
        play_row: 31,
        cur_order_idx: 2,
        cur_pattern: 0,
        is_song_mode: true,
        ..Default::default()
    };
    let mut voices = [VoiceState::default(); 9];
    let mut synth = SynthDriver::new(Vec::new());
    let bank = StaticPatchBank::default();

    advance(&mut seq, &store, &mut voices, &NoJam, &mut synth, &bank);

    assert_eq!(seq.play_row, 0);
    assert_eq!(seq.cur_order_idx, 0);
    assert_eq!(seq.cur_pattern, 1);
}
