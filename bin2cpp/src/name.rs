use std::{fmt::Display, str::FromStr};

use crate::error::NameError;

const SEPARATOR: &str = "::";

// C++20 keywords and alternative operator tokens.
const RESERVED_WORDS: &[&str] = &[
    "alignas", "alignof", "and", "and_eq", "asm", "auto", "bitand", "bitor", "bool", "break",
    "case", "catch", "char", "char8_t", "char16_t", "char32_t", "class", "compl", "concept",
    "const", "consteval", "constexpr", "constinit", "const_cast", "continue", "co_await",
    "co_return", "co_yield", "decltype", "default", "delete", "do", "double", "dynamic_cast",
    "else", "enum", "explicit", "export", "extern", "false", "float", "for", "friend", "goto",
    "if", "inline", "int", "long", "mutable", "namespace", "new", "noexcept", "not", "not_eq",
    "nullptr", "operator", "or", "or_eq", "private", "protected", "public", "register",
    "reinterpret_cast", "requires", "return", "short", "signed", "sizeof", "static",
    "static_assert", "static_cast", "struct", "switch", "template", "this", "thread_local",
    "throw", "true", "try", "typedef", "typeid", "typename", "union", "unsigned", "using",
    "virtual", "void", "volatile", "wchar_t", "while", "xor", "xor_eq",
];

/// Returns `true` if `word` is a C++ keyword and can't be used as a name.
pub fn is_reserved_word(word: &str) -> bool {
    RESERVED_WORDS.contains(&word)
}

/// The identifier alone is enough to declare an array in the global namespace.
pub const MIN_SEGMENTS: usize = 1;

/// A C++ identifier with its enclosing namespaces like `graphics::shader::basic`.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct QualifiedName {
    scopes: Vec<String>,
    identifier: String,
}

impl QualifiedName {
    /// Create a name from namespaces ordered from outermost to innermost.
    pub fn new(scopes: Vec<String>, identifier: String) -> Result<Self, NameError> {
        for (index, segment) in scopes.iter().chain(std::iter::once(&identifier)).enumerate() {
            validate_segment(index, segment)?;
        }
        Ok(Self { scopes, identifier })
    }

    /// Parse segments separated by `::` where the last segment is the identifier.
    pub fn parse(text: &str) -> Result<Self, NameError> {
        if text.is_empty() {
            return Err(NameError::TooFewSegments {
                min: MIN_SEGMENTS,
                found: 0,
            });
        }

        let (scopes, identifier) = match text.rsplit_once(SEPARATOR) {
            Some((scopes, identifier)) => (
                scopes.split(SEPARATOR).map(str::to_string).collect(),
                identifier,
            ),
            None => (Vec::new(), text),
        };
        Self::new(scopes, identifier.to_string())
    }

    /// The enclosing namespaces from outermost to innermost.
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// The name of the declared array.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.scopes
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.identifier.as_str()))
    }
}

impl FromStr for QualifiedName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for QualifiedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for scope in &self.scopes {
            write!(f, "{scope}{SEPARATOR}")?;
        }
        write!(f, "{}", self.identifier)
    }
}

fn validate_segment(index: usize, segment: &str) -> Result<(), NameError> {
    let mut chars = segment.chars();
    let Some(first) = chars.next() else {
        return Err(NameError::EmptySegment { index });
    };

    if !(first.is_ascii_alphabetic() || first == '_')
        || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        Err(NameError::InvalidIdentifier {
            segment: segment.to_string(),
        })
    } else if is_reserved_word(segment) {
        Err(NameError::ReservedWord {
            segment: segment.to_string(),
        })
    } else {
        Ok(())
    }
}
