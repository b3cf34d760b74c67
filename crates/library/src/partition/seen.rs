use std::f64::consts::LN_2;
use std::ffi::OsStr;

/// Each new layer holds this many times the names of the one before it.
const GROWTH: usize = 2;
/// Each new layer's false-positive rate relative to the one before it.
const TIGHTENING: f64 = 0.5;

/// Probabilistic set of destination names already handed out within one bucket.
///
/// A scalable Bloom filter: bits are only ever set, so a name that was inserted is always reported as present. The
/// first layer is sized for `capacity` names. Once it holds that many, a layer twice the size with half the
/// false-positive rate is stacked on top, and so on. Lookups consult every layer, so the combined false-positive
/// rate stays below twice the configured rate however far the bucket outgrows its capacity.
#[derive(Clone, Debug)]
pub struct SeenNames {
    layers: Vec<Layer>,
    false_positive_rate: f64,
}

impl SeenNames {
    /// Size the first layer for `capacity` names at the given false-positive rate.
    pub fn new(capacity: usize, false_positive_rate: f64) -> Self {
        let false_positive_rate = false_positive_rate.clamp(1e-12, 0.5);
        Self { layers: vec![Layer::new(capacity.max(1), false_positive_rate)], false_positive_rate }
    }

    /// Bits allocated across all layers.
    pub fn num_bits(&self) -> u64 {
        self.layers.iter().map(|layer| layer.num_bits).sum()
    }

    /// Probes per lookup in the first layer.
    pub fn num_hashes(&self) -> u32 {
        self.layers[0].num_hashes
    }

    pub fn layers(&self) -> usize {
        self.layers.len()
    }

    pub fn contains(&self, name: &OsStr) -> bool {
        let hashes = Hashes::of(name);
        self.layers.iter().any(|layer| layer.contains(hashes))
    }

    /// Record `name`. Returns `false` if it was (probably) present already.
    pub fn insert(&mut self, name: &OsStr) -> bool {
        let hashes = Hashes::of(name);
        if self.layers.iter().any(|layer| layer.contains(hashes)) {
            return false;
        }
        let newest = self.newest_with_room();
        newest.insert(hashes);
        true
    }

    fn newest_with_room(&mut self) -> &mut Layer {
        let depth = self.layers.len();
        let full = self.layers.last().map(Layer::is_full).unwrap_or(true);
        if full {
            let capacity = self.layers.last().map_or(1, |layer| layer.capacity.saturating_mul(GROWTH));
            let rate = (self.false_positive_rate * TIGHTENING.powi(depth as i32)).max(1e-12);
            self.layers.push(Layer::new(capacity, rate));
        }
        let last = self.layers.len() - 1;
        &mut self.layers[last]
    }
}

/// The two base hashes every probe position is derived from.
#[derive(Clone, Copy)]
struct Hashes {
    h1: u64,
    h2: u64,
}

impl Hashes {
    /// Two halves of the BLAKE3 digest.
    fn of(name: &OsStr) -> Self {
        let digest = blake3::hash(name.as_encoded_bytes());
        let bytes = digest.as_bytes();
        let mut h1 = [0u8; 8];
        let mut h2 = [0u8; 8];
        h1.copy_from_slice(&bytes[..8]);
        h2.copy_from_slice(&bytes[8..16]);
        // Odd, so successive probes never collapse onto one position.
        Self { h1: u64::from_le_bytes(h1), h2: u64::from_le_bytes(h2) | 1 }
    }
}

/// One fixed-size Bloom filter.
#[derive(Clone, Debug)]
struct Layer {
    bits: Vec<u64>,
    num_bits: u64,
    num_hashes: u32,
    capacity: usize,
    len: usize,
}

impl Layer {
    fn new(capacity: usize, false_positive_rate: f64) -> Self {
        let n = capacity as f64;
        let p = false_positive_rate;
        let num_bits = (-n * p.ln() / (LN_2 * LN_2)).ceil().max(64.0) as u64;
        let num_hashes = ((num_bits as f64 / n) * LN_2).round().clamp(1.0, 32.0) as u32;
        let words = num_bits.div_ceil(64) as usize;
        Self { bits: vec![0; words], num_bits, num_hashes, capacity, len: 0 }
    }

    fn is_full(&self) -> bool {
        self.len >= self.capacity
    }

    fn positions(&self, Hashes { h1, h2 }: Hashes) -> impl Iterator<Item = u64> + use<> {
        let num_bits = self.num_bits;
        (0..u64::from(self.num_hashes)).map(move |i| h1.wrapping_add(i.wrapping_mul(h2)) % num_bits)
    }

    fn contains(&self, hashes: Hashes) -> bool {
        self.positions(hashes).all(|position| self.bits[(position / 64) as usize] & (1 << (position % 64)) != 0)
    }

    fn insert(&mut self, hashes: Hashes) {
        for position in self.positions(hashes) {
            self.bits[(position / 64) as usize] |= 1 << (position % 64);
        }
        self.len += 1;
    }
}
