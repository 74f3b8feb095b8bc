pub const MAX_NMEA_TOKENS: usize = 32;

/// No numeric field a receiver emits is this long; anything at or past it
/// parses as zero.
const FLOAT_FIELD_MAX: usize = 16;

/// Half-open byte range into the sentence buffer it was cut from. Only valid
/// while that buffer is unmodified; an out-of-range lookup yields the empty
/// token rather than failing.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub struct Token {
    start: usize,
    end: usize,
}

impl Token {
    pub fn bytes<'l>(&self, line: &'l [u8]) -> &'l [u8] {
        line.get(self.start..self.end).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Comma-split view of one sentence. Splitting is best-effort: malformed
/// input degrades to fewer or emptier tokens, never an error.
#[derive(Debug, Copy, Clone)]
pub struct NmeaTokenizer {
    count: usize,
    tokens: [Token; MAX_NMEA_TOKENS],
}

impl NmeaTokenizer {
    pub fn new(line: &[u8]) -> Self {
        let mut p = 0;
        let mut end = line.len();

        // the leading '$' is optional
        if p < end && line[p] == b'$' {
            p += 1;
        }

        // drop the terminator
        if end > p && line[end - 1] == b'\n' {
            end -= 1;
            if end > p && line[end - 1] == b'\r' {
                end -= 1;
            }
        }

        // the checksum suffix is cut by position, never verified
        if end >= p + 3 && line[end - 3] == b'*' {
            end -= 3;
        }

        let mut t = Self {
            count: 0,
            tokens: [Token::default(); MAX_NMEA_TOKENS],
        };
        while p < end {
            let q = line[p..end]
                .iter()
                .position(|&b| b == b',')
                .map_or(end, |i| p + i);
            if t.count < MAX_NMEA_TOKENS {
                t.tokens[t.count] = Token { start: p, end: q };
                t.count += 1;
            }
            p = q + 1;
        }
        t
    }

    /// Field at `index`, or the empty token when out of range.
    pub fn get(&self, index: usize) -> Token {
        if index < self.count {
            self.tokens[index]
        } else {
            Token::default()
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

/// Integer field parse. Returns -1 the moment a non-digit is seen, and for
/// the empty field; a successful parse is never negative, so callers can
/// test the sentinel alone.
pub fn parse_int(field: &[u8]) -> i32 {
    if field.is_empty() {
        return -1;
    }
    let mut result: i32 = 0;
    for &b in field {
        if !b.is_ascii_digit() {
            return -1;
        }
        result = result.wrapping_mul(10).wrapping_add((b - b'0') as i32);
    }
    result
}

/// Float field parse. Overlong and malformed fields parse as 0.0.
pub fn parse_float(field: &[u8]) -> f64 {
    if field.len() >= FLOAT_FIELD_MAX {
        return 0.0;
    }
    core::str::from_utf8(field)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.0)
}

/// `[D]DDMM.MMMM` coordinate field to decimal degrees.
pub fn parse_degrees(field: &[u8]) -> f64 {
    let val = parse_float(field);
    // wire coordinates are non-negative, so truncation is floor here
    let degrees = (val as i64 / 100) as f64;
    degrees + (val - degrees * 100.0) / 60.0
}
