use std::sync::OnceLock;

/// Reflected IEEE 802.3 polynomial (zlib, PNG, SFV files).
pub const IEEE_POLY: u32 = 0xEDB8_8320;
/// Reflected Castagnoli polynomial (iSCSI, ext4, SSE4.2 `crc32` instruction).
pub const CASTAGNOLI_POLY: u32 = 0x82F6_3B78;

static IEEE_TABLE: OnceLock<[u32; 256]> = OnceLock::new();
static CASTAGNOLI_TABLE: OnceLock<[u32; 256]> = OnceLock::new();

fn build_table(poly: u32) -> [u32; 256] {
    let mut table = [0u32; 256];
    for (i, slot) in table.iter_mut().enumerate() {
        let mut c = i as u32;
        for _ in 0..8 {
            c = if c & 1 != 0 { poly ^ (c >> 1) } else { c >> 1 };
        }
        *slot = c;
    }
    table
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CrcVariant {
    Ieee,
    Castagnoli,
}

impl CrcVariant {
    /// Lookup table for this variant. Built on first use; concurrent first
    /// callers block on the same initialization and observe one table.
    pub fn table(self) -> &'static [u32; 256] {
        match self {
            CrcVariant::Ieee => IEEE_TABLE.get_or_init(|| build_table(IEEE_POLY)),
            CrcVariant::Castagnoli => {
                CASTAGNOLI_TABLE.get_or_init(|| build_table(CASTAGNOLI_POLY))
            }
        }
    }
}

/// Incremental table-driven CRC-32 (init and final xor `0xFFFFFFFF`).
#[derive(Clone, Debug)]
pub struct Crc32 {
    table: &'static [u32; 256],
    state: u32,
}

impl Crc32 {
    pub fn new(variant: CrcVariant) -> Self {
        Self { table: variant.table(), state: 0xFFFF_FFFF }
    }

    pub fn update(&mut self, data: &[u8]) {
        let mut crc = self.state;
        for &b in data {
            crc = (crc >> 8) ^ self.table[((crc ^ b as u32) & 0xFF) as usize];
        }
        self.state = crc;
    }

    pub fn finalize(&self) -> u32 {
        self.state ^ 0xFFFF_FFFF
    }
}

/// One-shot convenience over [`Crc32`].
pub fn checksum(variant: CrcVariant, data: &[u8]) -> u32 {
    let mut c = Crc32::new(variant);
    c.update(data);
    c.finalize()
}
