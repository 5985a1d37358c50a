//! Reversible share-code scheme with a 64-word list.
//! Code format: <DIFF>-<WORD><NN>, e.g., ST-BEACON42, AB-TRENCH97

use crate::state::Difficulty;

fn fnv1a64(bytes: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0100_0000_01b3;
    let mut hash = FNV_OFFSET;
    for b in bytes {
        hash = (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME);
    }
    hash
}

fn sanitize_word(word: &str) -> String {
    word.chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

// Word list for share codes
pub const WORD_LIST: [&str; 64] = [
    "BEACON", "BRINE", "TRENCH", "ABYSS", "SONAR", "PUMPS", "HATCH", "GALLEY", "BULKHD", "KEEL",
    "CURRENT", "DRIFT", "KELP", "CORAL", "SQUID", "ANGLER", "LANTERN", "AIRLOCK", "VALVE",
    "RIVET", "PLATING", "PORTHOL", "MOORING", "ANCHOR", "WINCH", "TETHER", "BUOY", "FLARE",
    "SIGNAL", "STATIC", "RATION", "TINNED", "COFFEE", "BUNK", "LOGBOOK", "INKWELL", "PENCIL",
    "CHARTS", "COMPASS", "SEXTANT", "FATHOM", "LEAGUE", "SALT", "SPRAY", "SWELL", "BREAKER",
    "RIPTIDE", "EDDY", "GYRE", "MAELSTR", "SIREN", "WHALE", "BARNACL", "MUSSEL", "LIMPET",
    "URCHIN", "HERRING", "TURBINE", "DYNAMO", "FUSEBOX", "CONDUIT", "BALLAST", "PERISCO",
    "DEPTHS",
];

const fn difficulty_prefix(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Respite => "RS",
        Difficulty::Standard => "ST",
        Difficulty::Abyssal => "AB",
    }
}

fn prefix_difficulty(prefix: &str) -> Option<Difficulty> {
    match prefix {
        "RS" => Some(Difficulty::Respite),
        "ST" => Some(Difficulty::Standard),
        "AB" => Some(Difficulty::Abyssal),
        _ => None,
    }
}

#[inline]
fn pack(word_index: u16, nn: u8) -> u16 {
    word_index & 0x01FF | ((u16::from(nn) & 0x7F) << 9)
}

#[inline]
fn unpack(packed: u16) -> (u16, u8) {
    (packed & 0x01FF, ((packed >> 9) & 0x7F) as u8)
}

fn compose_seed(difficulty: Difficulty, word_index: u16, nn: u8) -> u64 {
    let packed = pack(word_index, nn);
    // Domain-separated FNV input
    let mut buf = [0u8; 10];
    buf[..6].copy_from_slice(b"ADRIFT");
    buf[6] = difficulty.as_str().as_bytes()[0].to_ascii_uppercase();
    buf[7] = (packed & 0xFF) as u8;
    buf[8] = (packed >> 8) as u8;
    buf[9] = 0xA5;
    let h = fnv1a64(&buf);
    (h & 0xFFFF_FFFF_FFFF_0000) | u64::from(packed)
}

#[must_use]
pub fn encode_friendly(difficulty: Difficulty, seed: u64) -> String {
    let prefix = difficulty_prefix(difficulty);
    let packed = (seed & 0xFFFF) as u16;
    let (wi, mut nn) = unpack(packed);
    let word = WORD_LIST.get(wi as usize).copied().unwrap_or("BEACON");
    if nn > 99 {
        nn %= 100;
    }
    format!("{prefix}-{word}{nn:02}")
}

#[must_use]
pub fn decode_to_seed(code: &str) -> Option<(Difficulty, u64)> {
    let s = code.trim();
    let (prefix, rest) = s.split_once('-')?;
    let difficulty = prefix_difficulty(prefix.to_ascii_uppercase().as_str())?;
    if rest.len() < 3 {
        return None;
    }
    let (word_part, nn_part) = rest.split_at(rest.len() - 2);
    let nn: u8 = nn_part.parse().ok()?;
    let word = sanitize_word(word_part);
    let idx = WORD_LIST.iter().position(|w| sanitize_word(w) == word)?;
    let wi = u16::try_from(idx).ok()?;
    let seed = compose_seed(difficulty, wi, nn);
    Some((difficulty, seed))
}

#[must_use]
pub fn generate_code_from_entropy(difficulty: Difficulty, entropy: u64) -> String {
    let wi = u16::try_from(entropy % WORD_LIST.len() as u64).unwrap_or(0);
    let nn = ((entropy >> 17) % 100) as u8;
    let seed = compose_seed(difficulty, wi, nn);
    encode_friendly(difficulty, seed)
}
