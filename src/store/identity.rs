pub const ID_ALPHABET: [char; 36] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
    'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];
pub const ID_LENGTH: usize = 8;

/// Produces random note id candidates. It has no idea which ids are taken,
/// the store claims them against the backend.
#[derive(Clone, Debug)]
pub struct IdGenerator {
    alphabet: Vec<char>,
    length: usize,
}

impl Default for IdGenerator {
    fn default() -> Self {
        IdGenerator {
            alphabet: ID_ALPHABET.to_vec(),
            length: ID_LENGTH,
        }
    }
}

impl IdGenerator {
    /// `alphabet` needs at least two symbols and at most 255.
    pub fn new(alphabet: &[char], length: usize) -> Self {
        IdGenerator {
            alphabet: alphabet.to_vec(),
            length,
        }
    }

    pub fn generate(&self) -> String {
        nanoid::format(nanoid::rngs::default, &self.alphabet, self.length)
    }
}
