//! Salted, reversible encoding of paste ordinals into short public identifiers.
//!
//! The encoding follows the Hashids 1.0 scheme, so identifiers stay compatible
//! with data written by other Hashids implementations configured with the same
//! salt, alphabet, and minimum length. It is an obfuscation, not encryption:
//! anyone with the salt can walk the identifier space.

use thiserror::Error;

const MIN_ALPHABET_LENGTH: usize = 16;
const SEP_DIV: f64 = 3.5;
const GUARD_DIV: f64 = 12.0;
const DEFAULT_SEPARATORS: &str = "cfhistuCFHISTU";

/// Invalid codec configuration. Only raised while constructing an [`IdCodec`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("alphabet must contain at least 16 characters, got {0}")]
    AlphabetTooShort(usize),

    #[error("alphabet may not contain spaces")]
    AlphabetContainsSpace,

    #[error("duplicate character in alphabet: {0:?}")]
    DuplicateCharacter(char),
}

/// Encoder/decoder between ordinals and identifiers.
///
/// Holds no mutable state, so a single instance can be shared freely across
/// threads.
#[derive(Debug, Clone)]
pub struct IdCodec {
    salt: Vec<char>,
    alphabet: Vec<char>,
    separators: Vec<char>,
    guards: Vec<char>,
    min_length: usize,
}

impl IdCodec {
    /// Build a codec from its configuration.
    ///
    /// # Arguments
    /// - `salt`: Secret salt, used verbatim. An empty salt disables shuffling.
    /// - `alphabet`: Characters identifiers are drawn from.
    /// - `min_length`: Minimum identifier length.
    ///
    /// # Returns
    /// A ready-to-use [`IdCodec`].
    ///
    /// # Errors
    /// Returns [`CodecError`] when the alphabet is too short, contains a space,
    /// or repeats a character.
    pub fn new(salt: &str, alphabet: &str, min_length: usize) -> Result<Self, CodecError> {
        let mut alphabet: Vec<char> = alphabet.chars().collect();
        if alphabet.len() < MIN_ALPHABET_LENGTH {
            return Err(CodecError::AlphabetTooShort(alphabet.len()));
        }
        if alphabet.contains(&' ') {
            return Err(CodecError::AlphabetContainsSpace);
        }
        for (idx, ch) in alphabet.iter().enumerate() {
            if alphabet[..idx].contains(ch) {
                return Err(CodecError::DuplicateCharacter(*ch));
            }
        }

        let salt: Vec<char> = salt.chars().collect();

        // Separators are the default set restricted to the alphabet, and are
        // removed from it.
        let mut separators: Vec<char> = DEFAULT_SEPARATORS
            .chars()
            .filter(|ch| alphabet.contains(ch))
            .collect();
        alphabet.retain(|ch| !separators.contains(ch));
        consistent_shuffle(&mut separators, &salt);

        if separators.is_empty() || alphabet.len() as f64 / separators.len() as f64 > SEP_DIV {
            let mut wanted = (alphabet.len() as f64 / SEP_DIV).ceil() as usize;
            if wanted == 1 {
                wanted += 1;
            }
            if wanted > separators.len() {
                let diff = wanted - separators.len();
                separators.extend(alphabet.drain(..diff));
            } else {
                separators.truncate(wanted);
            }
        }
        consistent_shuffle(&mut alphabet, &salt);

        let guard_count = (alphabet.len() as f64 / GUARD_DIV).ceil() as usize;
        let guards: Vec<char> = if alphabet.len() < 3 {
            separators.drain(..guard_count).collect()
        } else {
            alphabet.drain(..guard_count).collect()
        };

        Ok(Self {
            salt,
            alphabet,
            separators,
            guards,
            min_length,
        })
    }

    /// Minimum identifier length this codec produces.
    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Encode an ordinal into its identifier.
    ///
    /// # Arguments
    /// - `ordinal`: Non-negative paste ordinal.
    ///
    /// # Returns
    /// The identifier; always at least [`IdCodec::min_length`] characters.
    pub fn encode(&self, ordinal: u64) -> String {
        let mut alphabet = self.alphabet.clone();
        let numbers_hash = ordinal % 100;
        let lottery = alphabet[(numbers_hash % alphabet.len() as u64) as usize];

        let mut result = vec![lottery];
        self.shuffle_for_lottery(&mut alphabet, lottery);
        result.extend(hash(ordinal, &alphabet));

        if result.len() < self.min_length {
            let guard = self.guard_for(numbers_hash, result[0]);
            result.insert(0, guard);

            if result.len() < self.min_length {
                let guard = self.guard_for(numbers_hash, result[2]);
                result.push(guard);
            }
        }

        let half = alphabet.len() / 2;
        while result.len() < self.min_length {
            let salt = alphabet.clone();
            consistent_shuffle(&mut alphabet, &salt);

            let mut padded = Vec::with_capacity(alphabet.len() + result.len());
            padded.extend_from_slice(&alphabet[half..]);
            padded.extend_from_slice(&result);
            padded.extend_from_slice(&alphabet[..half]);
            result = padded;

            let excess = result.len().saturating_sub(self.min_length);
            if excess > 0 {
                let start = excess / 2;
                result = result[start..start + self.min_length].to_vec();
            }
        }

        result.into_iter().collect()
    }

    /// Decode an identifier back into its ordinal.
    ///
    /// # Arguments
    /// - `identifier`: Candidate identifier from a client.
    ///
    /// # Returns
    /// `Some(ordinal)` only when `identifier` is exactly the canonical encoding
    /// of a single ordinal under this configuration; `None` for anything else
    /// (foreign characters, overflow, multi-value or non-canonical strings).
    pub fn decode(&self, identifier: &str) -> Option<u64> {
        let chars: Vec<char> = identifier.chars().collect();
        let parts: Vec<&[char]> = chars.split(|ch| self.guards.contains(ch)).collect();
        let body = match parts.len() {
            2 | 3 => parts[1],
            _ => parts[0],
        };
        let (&lottery, rest) = body.split_first()?;

        let mut alphabet = self.alphabet.clone();
        let mut numbers = Vec::with_capacity(1);
        for chunk in rest.split(|ch| self.separators.contains(ch)) {
            self.shuffle_for_lottery(&mut alphabet, lottery);
            numbers.push(unhash(chunk, &alphabet)?);
        }

        match numbers.as_slice() {
            [ordinal] if self.encode(*ordinal) == identifier => Some(*ordinal),
            _ => None,
        }
    }

    /// Whether every character of `candidate` could appear in an identifier.
    ///
    /// This is a cheap syntactic filter for routing; it does not imply that
    /// [`IdCodec::decode`] succeeds.
    pub fn is_identifier_shaped(&self, candidate: &str) -> bool {
        !candidate.is_empty()
            && candidate.chars().all(|ch| {
                self.alphabet.contains(&ch)
                    || self.separators.contains(&ch)
                    || self.guards.contains(&ch)
            })
    }

    fn shuffle_for_lottery(&self, alphabet: &mut [char], lottery: char) {
        let mut salt = Vec::with_capacity(1 + self.salt.len() + alphabet.len());
        salt.push(lottery);
        salt.extend_from_slice(&self.salt);
        salt.extend_from_slice(alphabet);
        salt.truncate(alphabet.len());
        consistent_shuffle(alphabet, &salt);
    }

    fn guard_for(&self, numbers_hash: u64, ch: char) -> char {
        let idx = (numbers_hash + ch as u64) % self.guards.len() as u64;
        self.guards[idx as usize]
    }
}

/// Deterministic salt-driven permutation of `alphabet` in place.
fn consistent_shuffle(alphabet: &mut [char], salt: &[char]) {
    if salt.is_empty() {
        return;
    }
    let mut v = 0usize;
    let mut p = 0usize;
    for i in (1..alphabet.len()).rev() {
        let s = salt[v] as usize;
        p += s;
        let j = (s + v + p) % i;
        alphabet.swap(i, j);
        v = (v + 1) % salt.len();
    }
}

fn hash(mut input: u64, alphabet: &[char]) -> Vec<char> {
    let base = alphabet.len() as u64;
    let mut out = Vec::new();
    loop {
        out.push(alphabet[(input % base) as usize]);
        input /= base;
        if input == 0 {
            break;
        }
    }
    out.reverse();
    out
}

fn unhash(input: &[char], alphabet: &[char]) -> Option<u64> {
    let base = alphabet.len() as u64;
    input.iter().try_fold(0u64, |acc, ch| {
        let pos = alphabet.iter().position(|a| a == ch)? as u64;
        acc.checked_mul(base)?.checked_add(pos)
    })
}
