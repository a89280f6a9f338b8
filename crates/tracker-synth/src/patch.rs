use serde::{Deserialize, Serialize};

/// FM operator parameters for one instrument timbre (spec.md glossary:
/// "Patch"). Field layout mirrors the original `OPL_Patch` record: a
/// modulator operator, a carrier operator, and one shared feedback/
/// connection (algorithm) byte. The patch *bank* (which index maps to
/// which `Patch`) is an external collaborator (spec.md §1); this record
/// layout is not — the Synth Driver must understand it to program the
/// chip.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    pub m_ave: u8,
    pub m_ksl: u8,
    pub m_atdec: u8,
    pub m_susrel: u8,
    pub m_wave: u8,
    pub c_ave: u8,
    pub c_ksl: u8,
    pub c_atdec: u8,
    pub c_susrel: u8,
    pub c_wave: u8,
    pub feedback_conn: u8,
}

/// Opaque patch index -> patch record lookup, consumed by the Synth
/// Driver. The bank's contents are external (spec.md §1); this trait is
/// the seam.
pub trait PatchBank {
    fn patch(&self, idx: u8) -> Patch;
}

/// A simple in-memory bank, useful for tests and as a default when no
/// richer bank is wired in.
#[derive(Clone, Debug, Default)]
pub struct StaticPatchBank {
    patches: Vec<Patch>,
}

impl StaticPatchBank {
    pub fn new(patches: Vec<Patch>) -> Self {
        StaticPatchBank { patches }
    }
}

impl PatchBank for StaticPatchBank {
    fn patch(&self, idx: u8) -> Patch {
        self.patches
            .get(idx as usize)
            .copied()
            .unwrap_or_default()
    }
}
