// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs and traits that name the core concepts:
// a labelled sentence, its binary sentiment, and the source
// it was read from.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits

// A labelled example and its sentiment label
pub mod example;

// Core abstractions (traits) that other layers implement
pub mod traits;
