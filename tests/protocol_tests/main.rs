//! Protocol tests: request encoding, reply grammars and reply parsing.

mod codec_tests;
mod grammar_tests;
