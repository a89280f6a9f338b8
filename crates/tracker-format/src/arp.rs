/// The 16 arpeggio styles addressable by the `S` nibble of an Arpeggio
/// effect word (spec.md §4.3). Each style is a pure table of semitone
/// offsets; `arp_offset` always yields 0 at `step_index == 0` (required by
/// spec.md), except for the row-entry "starting offset" computed by
/// [`arp_start_offset`], which special-cases `Down` to start high — the
/// unusual convention spec.md's Design Notes §9 explicitly preserves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ArpStyle {
    Up = 0,
    Down = 1,
    MajorTriad = 2,
    MinorTriad = 3,
    Maj7 = 4,
    Min7 = 5,
    Sus4 = 6,
    Sus2 = 7,
    Dim = 8,
    Aug = 9,
    Power = 10,
    UpDown = 11,
    GuitarStrumE = 12,
    GuitarStrumA = 13,
    Double = 14,
    DoubleOctave = 15,
}

impl From<u8> for ArpStyle {
    fn from(style: u8) -> Self {
        match style & 0xF {
            0 => ArpStyle::Up,
            1 => ArpStyle::Down,
            2 => ArpStyle::MajorTriad,
            3 => ArpStyle::MinorTriad,
            4 => ArpStyle::Maj7,
            5 => ArpStyle::Min7,
            6 => ArpStyle::Sus4,
            7 => ArpStyle::Sus2,
            8 => ArpStyle::Dim,
            9 => ArpStyle::Aug,
            10 => ArpStyle::Power,
            11 => ArpStyle::UpDown,
            12 => ArpStyle::GuitarStrumE,
            13 => ArpStyle::GuitarStrumA,
            14 => ArpStyle::Double,
            _ => ArpStyle::DoubleOctave,
        }
    }
}

fn table(style: ArpStyle) -> &'static [i16] {
    match style {
        ArpStyle::Up => &[0, 4, 7, 12],
        ArpStyle::Down => &[0, -4, -7, -12],
        ArpStyle::MajorTriad => &[0, 4, 7],
        ArpStyle::MinorTriad => &[0, 3, 7, 12],
        ArpStyle::Maj7 => &[0, 4, 7, 11],
        ArpStyle::Min7 => &[0, 3, 7, 10],
        ArpStyle::Sus4 => &[0, 5, 7],
        ArpStyle::Sus2 => &[0, 2, 7],
        ArpStyle::Dim => &[0, 3, 6],
        ArpStyle::Aug => &[0, 4, 8],
        ArpStyle::Power => &[0, 7],
        ArpStyle::UpDown => &[0, 4, 7, 12, 7, 4],
        ArpStyle::GuitarStrumE => &[0, 4, 7, 12, 16, 19],
        ArpStyle::GuitarStrumA => &[0, 3, 7, 12, 15, 19],
        ArpStyle::Double => &[0, 0, 7, 7],
        ArpStyle::DoubleOctave => &[0, 0, 12, 12],
    }
}

pub fn cycle_len(style: ArpStyle) -> usize {
    table(style).len()
}

/// Per-tick phase-stepping offset. `step_index == 0` always yields 0.
pub fn arp_offset(style: ArpStyle, step_index: u32) -> i16 {
    let t = table(style);
    t[step_index as usize % t.len()]
}

/// Offset used by the Sequencer for the initial row-entry strike
/// (spec.md §4.5: "compute starting arpeggio offset (arp may 'start high'
/// on style 'down')"). Every style but `Down` starts at its table's step 0
/// (always 0); `Down` starts at the top of its cycle instead.
pub fn arp_start_offset(style: ArpStyle) -> i16 {
    match style {
        ArpStyle::Down => {
            let t = table(style);
            t[t.len() - 1]
        }
        other => arp_offset(other, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_zero_is_always_zero() {
        for style in 0u8..16 {
            assert_eq!(arp_offset(ArpStyle::from(style), 0), 0);
        }
    }

    #[test]
    fn minor_triad_matches_s1_scenario() {
        let style = ArpStyle::MinorTriad;
        let offsets: Vec<i16> = (0..8).map(|s| arp_offset(style, s)).collect();
        assert_eq!(offsets, vec![0, 3, 7, 12, 0, 3, 7, 12]);
        assert_eq!(arp_start_offset(style), 0);
    }

    #[test]
    fn down_starts_high() {
        assert_eq!(arp_start_offset(ArpStyle::Down), -12);
        assert_eq!(arp_offset(ArpStyle::Down, 0), 0);
    }
}
