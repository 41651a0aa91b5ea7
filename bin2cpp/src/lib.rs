//! Embed binary files like GLSL shaders in C++ source code.
//!
//! The bytes of the file are declared as a `static const char` array
//! inside the namespaces of a [QualifiedName] like `graphics::shader::basic`.
//! Runtime code can then include the generated header instead of loading the file.
//!
//! ```cpp
//! #pragma once
//!
//! // source: src/graphics/shaders/glsl/basic.glsl
//!
//! namespace graphics {
//! namespace shader {
//!     static const char basic[3] = {
//!         0x00, 0xFF, 0x10
//!     };
//! } // namespace shader
//! } // namespace graphics
//! ```
//!
//! The output only depends on the input bytes, the name, and the header comment,
//! so regenerating a header for an unchanged file produces identical text.
pub mod encode;
pub mod error;
pub mod name;

pub use encode::{
    encode, encode_file, read_source, write_declaration, Declaration, EncodeOptions, Encoded,
    Provenance, BYTES_PER_LINE,
};
pub use name::QualifiedName;
