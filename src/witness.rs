use core::fmt;

/// A string over the solver's alphabet, as a sequence of code points.
///
/// Without the `u` flag each code point is a byte, and the witness renders
/// as those bytes decoded as UTF-8, the same reading
/// [`DFA::accepts`](crate::DFA::accepts) gives a `&str`. A byte witness
/// that is not valid UTF-8 renders lossily, with U+FFFD in place of the
/// offending bytes; [`Witness::to_bytes`] and [`Witness::code_points`]
/// are always exact. With the `u` flag, code points that are not Unicode
/// scalar values render as U+FFFD.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Witness {
    code_points: Vec<u32>,
    unicode: bool,
}

impl Witness {
    /// Create a witness over Unicode code points when `unicode` is true,
    /// over bytes otherwise.
    pub fn new(code_points: Vec<u32>, unicode: bool) -> Witness {
        Witness { code_points, unicode }
    }

    /// The raw code points, suitable for running an automaton directly.
    pub fn code_points(&self) -> &[u32] {
        &self.code_points
    }

    /// Whether the code points are Unicode code points rather than bytes.
    pub fn is_unicode(&self) -> bool {
        self.unicode
    }

    /// The witness as bytes: verbatim over a byte alphabet, UTF-8 encoded
    /// over Unicode.
    pub fn to_bytes(&self) -> Vec<u8> {
        if !self.unicode {
            return self.code_points.iter().map(|&cp| cp as u8).collect();
        }
        self.to_string().into_bytes()
    }

    /// The length in code points.
    pub fn len(&self) -> usize {
        self.code_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code_points.is_empty()
    }

    pub fn into_code_points(self) -> Vec<u32> {
        self.code_points
    }
}

impl fmt::Display for Witness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.unicode {
            return write!(f, "{}", String::from_utf8_lossy(&self.to_bytes()));
        }
        for &cp in self.code_points.iter() {
            let c = char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER);
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}
