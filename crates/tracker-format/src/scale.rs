/// The 8 scales addressable by the Generator effect's `S` nibble
/// (spec.md §4.3: "8×16 table of semitone offsets"). Each scale is 16
/// degrees so any `range` 0..15 (the `D` nibble) indexes validly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Scale {
    Chromatic = 0,
    Major = 1,
    Minor = 2,
    MajorPentatonic = 3,
    MinorPentatonic = 4,
    WholeTone = 5,
    Diminished = 6,
    FifthsOctaves = 7,
}

impl From<u8> for Scale {
    fn from(s: u8) -> Self {
        match s & 0x7 {
            0 => Scale::Chromatic,
            1 => Scale::Major,
            2 => Scale::Minor,
            3 => Scale::MajorPentatonic,
            4 => Scale::MinorPentatonic,
            5 => Scale::WholeTone,
            6 => Scale::Diminished,
            _ => Scale::FifthsOctaves,
        }
    }
}

const CHROMATIC: [i16; 16] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15];
const MAJOR: [i16; 16] = [0, 2, 4, 5, 7, 9, 11, 12, 14, 16, 17, 19, 21, 23, 24, 26];
const MINOR: [i16; 16] = [0, 2, 3, 5, 7, 8, 10, 12, 14, 15, 17, 19, 20, 22, 24, 26];
const MAJOR_PENTATONIC: [i16; 16] = [0, 2, 4, 7, 9, 12, 14, 16, 19, 21, 24, 26, 28, 31, 33, 36];
const MINOR_PENTATONIC: [i16; 16] = [0, 3, 5, 7, 10, 12, 15, 17, 19, 22, 24, 27, 29, 31, 34, 36];
const WHOLE_TONE: [i16; 16] = [0, 2, 4, 6, 8, 10, 12, 14, 16, 18, 20, 22, 24, 26, 28, 30];
const DIMINISHED: [i16; 16] = [0, 2, 3, 5, 6, 8, 9, 11, 12, 14, 15, 17, 18, 20, 21, 23];
const FIFTHS_OCTAVES: [i16; 16] = [0, 7, 12, 19, 24, 31, 36, 43, 48, 55, 60, 67, 72, 79, 84, 91];

fn table(scale: Scale) -> &'static [i16; 16] {
    match scale {
        Scale::Chromatic => &CHROMATIC,
        Scale::Major => &MAJOR,
        Scale::Minor => &MINOR,
        Scale::MajorPentatonic => &MAJOR_PENTATONIC,
        Scale::MinorPentatonic => &MINOR_PENTATONIC,
        Scale::WholeTone => &WHOLE_TONE,
        Scale::Diminished => &DIMINISHED,
        Scale::FifthsOctaves => &FIFTHS_OCTAVES,
    }
}

/// `degree` is taken modulo 16 (callers draw it from `0..range` where
/// `range` is already clamped to 1..=16 by the Generator effect).
pub fn scale_offset(scale: Scale, degree: u8) -> i16 {
    table(scale)[degree as usize % 16]
}
