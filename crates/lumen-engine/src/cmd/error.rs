use super::Opcode;

/// Stream corruption detected while decoding a command buffer.
///
/// Encoding cannot produce these; they indicate a damaged or foreign buffer. The replayer
/// discards the rest of the buffer when it sees one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("unknown opcode {word:#010x} at word {at_word}")]
    UnknownOpcode { word: u32, at_word: usize },

    #[error("truncated {opcode:?} command at word {at_word}: needs {needed} more words, {remaining} remaining")]
    Truncated {
        opcode: Opcode,
        at_word: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("invalid {field} value {value} in {opcode:?} command at word {at_word}")]
    InvalidField {
        opcode: Opcode,
        field: &'static str,
        value: u32,
        at_word: usize,
    },

    #[error("{opcode:?} command at word {at_word} carries source text that is not UTF-8")]
    InvalidUtf8 { opcode: Opcode, at_word: usize },
}

impl DecodeError {
    /// Word offset of the command that failed to decode.
    pub fn at_word(&self) -> usize {
        match *self {
            DecodeError::UnknownOpcode { at_word, .. }
            | DecodeError::Truncated { at_word, .. }
            | DecodeError::InvalidField { at_word, .. }
            | DecodeError::InvalidUtf8 { at_word, .. } => at_word,
        }
    }
}
