use std::{
    ffi::OsStr,
    fmt::{self, Display},
    io::Write,
    path::Path,
};

use log::warn;

use crate::{error::EncodeFileError, name::QualifiedName};

/// The number of byte literals on each line of the array body.
pub const BYTES_PER_LINE: usize = 12;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct EncodeOptions {
    /// Declare `name[len]` instead of `name[]`.
    pub include_array_size: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            include_array_size: true,
        }
    }
}

/// The comment after `#pragma once` recording where the bytes came from.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Provenance {
    /// `// source: path/to/file.glsl` with `\` replaced by `/`.
    Source(String),
    /// `// $ program arg1 arg2` for the command that generated the header.
    Invocation(Vec<String>),
}

impl Provenance {
    pub fn source<P: AsRef<Path>>(path: P) -> Self {
        Self::Source(path.as_ref().to_string_lossy().into_owned())
    }

    /// Record a command line like [std::env::args_os].
    /// Arguments that aren't valid UTF-8 are converted lossily.
    pub fn invocation<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        Self::Invocation(
            args.into_iter()
                .map(|a| a.as_ref().to_string_lossy().into_owned())
                .collect(),
        )
    }
}

impl Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Source(label) => write!(f, "// source: {}", label.replace('\\', "/")),
            Provenance::Invocation(args) => write!(f, "// $ {}", args.join(" ")),
        }
    }
}

/// The result of writing a declaration.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Encoded {
    /// A declaration for an array with `size` bytes.
    Declaration { size: usize },
    /// Nothing was written since the input contained no bytes.
    SkippedEmpty,
}

/// A complete C++ header declaring a byte array.
/// Use [ToString::to_string] or [write!] to render the header.
#[derive(Debug, Clone, Copy)]
pub struct Declaration<'a> {
    bytes: &'a [u8],
    name: &'a QualifiedName,
    provenance: &'a Provenance,
    options: EncodeOptions,
}

impl<'a> Declaration<'a> {
    /// Returns `None` if `bytes` is empty since C++ does not allow zero length arrays.
    pub fn new(
        bytes: &'a [u8],
        name: &'a QualifiedName,
        provenance: &'a Provenance,
        options: EncodeOptions,
    ) -> Option<Self> {
        (!bytes.is_empty()).then_some(Self {
            bytes,
            name,
            provenance,
            options,
        })
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

impl Display for Declaration<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "#pragma once")?;
        writeln!(f)?;
        writeln!(f, "{}", self.provenance)?;
        writeln!(f)?;

        for scope in self.name.scopes() {
            writeln!(f, "namespace {scope} {{")?;
        }

        let identifier = self.name.identifier();
        if self.options.include_array_size {
            writeln!(
                f,
                "    static const char {identifier}[{}] = {{",
                self.bytes.len()
            )?;
        } else {
            writeln!(f, "    static const char {identifier}[] = {{")?;
        }

        let mut lines = self.bytes.chunks(BYTES_PER_LINE).peekable();
        while let Some(line) = lines.next() {
            write!(f, "        ")?;
            for (i, byte) in line.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "0x{byte:02X}")?;
            }
            // Only the very last literal has no trailing comma.
            if lines.peek().is_some() {
                writeln!(f, ",")?;
            } else {
                writeln!(f)?;
            }
        }

        writeln!(f, "    }};")?;

        for scope in self.name.scopes().iter().rev() {
            writeln!(f, "}} // namespace {scope}")?;
        }

        Ok(())
    }
}

/// Render the header for `bytes` or `None` if `bytes` is empty.
pub fn encode(
    bytes: &[u8],
    name: &QualifiedName,
    provenance: &Provenance,
    options: EncodeOptions,
) -> Option<String> {
    Declaration::new(bytes, name, provenance, options).map(|d| d.to_string())
}

/// Write the header for `bytes` to `writer`.
/// Nothing is written if `bytes` is empty.
pub fn write_declaration<W: Write>(
    writer: &mut W,
    bytes: &[u8],
    name: &QualifiedName,
    provenance: &Provenance,
    options: EncodeOptions,
) -> std::io::Result<Encoded> {
    match Declaration::new(bytes, name, provenance, options) {
        Some(declaration) => {
            write!(writer, "{declaration}")?;
            Ok(Encoded::Declaration {
                size: declaration.size(),
            })
        }
        None => Ok(Encoded::SkippedEmpty),
    }
}

/// Read all the bytes of `path`.
pub fn read_source<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, EncodeFileError> {
    let path = path.as_ref();
    std::fs::read(path).map_err(|source| EncodeFileError::Read {
        path: path.to_owned(),
        source,
    })
}

/// Write the header for the file at `path` to `writer`
/// using the path for the header comment.
///
/// The file is read completely before writing,
/// so nothing is written if the file can't be read.
pub fn encode_file<P: AsRef<Path>, W: Write>(
    path: P,
    name: &QualifiedName,
    options: EncodeOptions,
    writer: &mut W,
) -> Result<Encoded, EncodeFileError> {
    let path = path.as_ref();
    let bytes = read_source(path)?;

    let provenance = Provenance::source(path);
    let encoded = write_declaration(writer, &bytes, name, &provenance, options)?;
    if encoded == Encoded::SkippedEmpty {
        warn!("Skipped {path:?} since it contains no bytes");
    }
    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn source(label: &str) -> Provenance {
        Provenance::Source(label.to_string())
    }

    fn name(text: &str) -> QualifiedName {
        QualifiedName::parse(text).unwrap()
    }

    fn body_lines(text: &str) -> Vec<&str> {
        text.lines()
            .filter(|l| l.starts_with("        0x"))
            .map(str::trim)
            .collect()
    }

    fn decode_body(text: &str) -> Vec<u8> {
        body_lines(text)
            .iter()
            .flat_map(|l| l.split(','))
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|l| u8::from_str_radix(l.strip_prefix("0x").unwrap(), 16).unwrap())
            .collect()
    }

    #[test]
    fn encode_single_line() {
        let text = encode(
            &[0x00, 0xFF, 0x10],
            &name("shader::basic"),
            &source("shaders/basic.glsl"),
            EncodeOptions::default(),
        )
        .unwrap();

        assert_eq!(
            indoc! {"
                #pragma once

                // source: shaders/basic.glsl

                namespace shader {
                    static const char basic[3] = {
                        0x00, 0xFF, 0x10
                    };
                } // namespace shader
            "},
            text
        );
    }

    #[test]
    fn encode_wrap_13_bytes() {
        let bytes: Vec<u8> = (0..13).collect();
        let text = encode(
            &bytes,
            &name("x::y"),
            &source("y.bin"),
            EncodeOptions::default(),
        )
        .unwrap();

        assert_eq!(
            indoc! {"
                #pragma once

                // source: y.bin

                namespace x {
                    static const char y[13] = {
                        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B,
                        0x0C
                    };
                } // namespace x
            "},
            text
        );
    }

    #[test]
    fn encode_nested_scopes() {
        let text = encode(
            b"glsl",
            &name("a::b::id"),
            &source("id.glsl"),
            EncodeOptions::default(),
        )
        .unwrap();

        assert_eq!(
            indoc! {"
                #pragma once

                // source: id.glsl

                namespace a {
                namespace b {
                    static const char id[4] = {
                        0x67, 0x6C, 0x73, 0x6C
                    };
                } // namespace b
                } // namespace a
            "},
            text
        );
    }

    #[test]
    fn encode_global_scope() {
        let text = encode(
            &[0xAB],
            &name("id"),
            &source("id.bin"),
            EncodeOptions::default(),
        )
        .unwrap();

        assert_eq!(
            indoc! {"
                #pragma once

                // source: id.bin

                    static const char id[1] = {
                        0xAB
                    };
            "},
            text
        );
    }

    #[test]
    fn encode_without_array_size() {
        let text = encode(
            &[1, 2],
            &name("graphics::shader::basic"),
            &Provenance::Invocation(vec![
                "bin2cpp".to_string(),
                "basic.glsl".to_string(),
                "graphics::shader::basic".to_string(),
            ]),
            EncodeOptions {
                include_array_size: false,
            },
        )
        .unwrap();

        assert_eq!(
            indoc! {"
                #pragma once

                // $ bin2cpp basic.glsl graphics::shader::basic

                namespace graphics {
                namespace shader {
                    static const char basic[] = {
                        0x01, 0x02
                    };
                } // namespace shader
                } // namespace graphics
            "},
            text
        );
    }

    #[test]
    fn encode_empty_skips_declaration() {
        for include_array_size in [true, false] {
            let options = EncodeOptions { include_array_size };
            assert_eq!(None, encode(&[], &name("ns::id"), &source("id"), options));

            let mut writer: Vec<u8> = Vec::new();
            let encoded =
                write_declaration(&mut writer, &[], &name("ns::id"), &source("id"), options)
                    .unwrap();
            assert_eq!(Encoded::SkippedEmpty, encoded);
            assert!(writer.is_empty());
        }
    }

    #[test]
    fn encode_is_deterministic() {
        let bytes: Vec<u8> = (0..=255).rev().collect();
        let first = encode(&bytes, &name("a::b"), &source("b"), EncodeOptions::default());
        let second = encode(&bytes, &name("a::b"), &source("b"), EncodeOptions::default());
        assert_eq!(first, second);
    }

    #[test]
    fn encode_decodes_to_input() {
        // Cover lengths on both sides of a full line.
        for len in [1, 11, 12, 13, 24, 25, 256, 1000] {
            let bytes: Vec<u8> = (0..len).map(|i| (i * 7 % 256) as u8).collect();
            let text = encode(&bytes, &name("ns::id"), &source("id"), EncodeOptions::default())
                .unwrap();
            assert_eq!(bytes, decode_body(&text), "len {len}");
        }
    }

    #[test]
    fn encode_line_lengths() {
        for len in [1usize, 12, 13, 35, 36, 37] {
            let bytes = vec![0x5A; len];
            let text = encode(&bytes, &name("ns::id"), &source("id"), EncodeOptions::default())
                .unwrap();
            let lines = body_lines(&text);

            assert_eq!(len.div_ceil(BYTES_PER_LINE), lines.len(), "len {len}");

            let (last, full) = lines.split_last().unwrap();
            for line in full {
                assert_eq!(BYTES_PER_LINE, line.matches("0x").count());
                assert!(line.ends_with(','));
            }

            let remainder = match len % BYTES_PER_LINE {
                0 => BYTES_PER_LINE,
                r => r,
            };
            assert_eq!(remainder, last.matches("0x").count());
            assert!(!last.ends_with(','));
        }
    }

    #[test]
    fn write_declaration_reports_size() {
        let mut writer: Vec<u8> = Vec::new();
        let encoded = write_declaration(
            &mut writer,
            &[0x00, 0xFF, 0x10],
            &name("shader::basic"),
            &source("basic.glsl"),
            EncodeOptions::default(),
        )
        .unwrap();

        assert_eq!(Encoded::Declaration { size: 3 }, encoded);
        assert_eq!(
            encode(
                &[0x00, 0xFF, 0x10],
                &name("shader::basic"),
                &source("basic.glsl"),
                EncodeOptions::default()
            )
            .unwrap()
            .as_bytes(),
            writer
        );
    }

    #[test]
    fn provenance_invocation() {
        assert_eq!(
            "// $ bin2cpp basic.glsl shader::basic",
            Provenance::invocation(["bin2cpp", "basic.glsl", "shader::basic"]).to_string()
        );
    }

    #[cfg(unix)]
    #[test]
    fn provenance_invocation_invalid_utf8() {
        use std::{ffi::OsString, os::unix::ffi::OsStringExt};

        let args = [
            OsString::from("bin2cpp"),
            OsString::from_vec(vec![b'a', 0xFF, b'.', b'g']),
        ];
        assert_eq!(
            "// $ bin2cpp a\u{FFFD}.g",
            Provenance::invocation(args).to_string()
        );
    }

    #[test]
    fn provenance_normalizes_separators() {
        assert_eq!(
            "// source: src/graphics/shaders/glsl/basic.glsl",
            source(r"src\graphics\shaders\glsl\basic.glsl").to_string()
        );
    }
}
