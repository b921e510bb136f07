// ── SSID name validation ──
//
// 802.11 allows 0-32 octets of anything, but controllers and client
// devices are far pickier. These checks are the hard wire-format limits
// (length, control characters) plus, in strict mode, the whitespace rule
// for names we author ourselves.

use std::fmt;

/// Maximum SSID length in UTF-8 bytes.
pub const MAX_SSID_BYTES: usize = 32;

/// How thoroughly to validate a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strictness {
    /// Hard limits plus style rules. Used for names we write to the controller.
    Strict,
    /// Hard wire-format limits only. Used for protected names we don't control.
    Lenient,
}

/// A forbidden character and its 1-based character position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForbiddenChar {
    pub ch: char,
    pub position: usize,
}

impl fmt::Display for ForbiddenChar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pos = self.position;
        match self.ch {
            '\t' => write!(f, "tab at position {pos}"),
            '\n' => write!(f, "newline at position {pos}"),
            '\r' => write!(f, "carriage return at position {pos}"),
            '\u{7f}' => write!(f, "DEL character at position {pos}"),
            c => write!(
                f,
                "control character (ASCII {}) at position {pos}",
                u32::from(c)
            ),
        }
    }
}

/// Why a single SSID name was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SsidIssue {
    Empty,
    TooLong { bytes: usize },
    InvalidCharacter(Vec<ForbiddenChar>),
    UntrimmedWhitespace,
}

impl fmt::Display for SsidIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("SSID cannot be empty"),
            Self::TooLong { bytes } => write!(
                f,
                "SSID is too long: {bytes} bytes (max {MAX_SSID_BYTES} bytes)"
            ),
            Self::InvalidCharacter(chars) => {
                f.write_str("SSID contains invalid characters: ")?;
                for (i, c) in chars.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{c}")?;
                }
                Ok(())
            }
            Self::UntrimmedWhitespace => {
                f.write_str("SSID cannot have leading or trailing spaces")
            }
        }
    }
}

impl std::error::Error for SsidIssue {}

/// A validation failure for one entry of a named list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameError {
    pub list: String,
    pub index: usize,
    pub name: String,
    pub issue: SsidIssue,
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] '{}': {}",
            self.list,
            self.index,
            printable(&self.name),
            self.issue
        )
    }
}

fn is_forbidden(c: char) -> bool {
    u32::from(c) < 32 || c == '\u{7f}'
}

/// Escape forbidden characters so a name can be shown on one log line.
fn printable(name: &str) -> String {
    name.chars()
        .map(|c| {
            if is_forbidden(c) {
                c.escape_default().to_string()
            } else {
                c.to_string()
            }
        })
        .collect()
}

/// Validate a single SSID name.
pub fn validate(name: &str, strictness: Strictness) -> Result<(), SsidIssue> {
    if name.is_empty() {
        return Err(SsidIssue::Empty);
    }

    let bytes = byte_length(name);
    if bytes > MAX_SSID_BYTES {
        return Err(SsidIssue::TooLong { bytes });
    }

    let forbidden: Vec<ForbiddenChar> = name
        .chars()
        .enumerate()
        .filter(|(_, c)| is_forbidden(*c))
        .map(|(i, ch)| ForbiddenChar {
            ch,
            position: i + 1,
        })
        .collect();
    if !forbidden.is_empty() {
        return Err(SsidIssue::InvalidCharacter(forbidden));
    }

    if strictness == Strictness::Strict && name.trim() != name {
        return Err(SsidIssue::UntrimmedWhitespace);
    }

    Ok(())
}

/// Validate every entry of `names`, collecting all failures.
pub fn validate_list<S: AsRef<str>>(
    list: &str,
    names: &[S],
    strictness: Strictness,
) -> Vec<NameError> {
    names
        .iter()
        .enumerate()
        .filter_map(|(index, name)| {
            let name = name.as_ref();
            validate(name, strictness).err().map(|issue| NameError {
                list: list.to_owned(),
                index,
                name: name.to_owned(),
                issue,
            })
        })
        .collect()
}

/// UTF-8 encoded length of `name`.
pub fn byte_length(name: &str) -> usize {
    name.len()
}

/// UTF-8 length of raw bytes, or `None` if they are not valid UTF-8.
pub fn byte_length_raw(raw: &[u8]) -> Option<usize> {
    std::str::from_utf8(raw).ok().map(byte_length)
}

/// Best-effort repair of an invalid name.
///
/// Trims surrounding whitespace, strips control and DEL characters, then
/// drops trailing characters until the name fits in [`MAX_SSID_BYTES`].
/// Returns `None` if nothing usable remains.
pub fn suggest_fix(name: &str) -> Option<String> {
    let mut fixed: String = name.trim().chars().filter(|c| !is_forbidden(*c)).collect();

    while byte_length(&fixed) > MAX_SSID_BYTES {
        fixed.pop();
    }

    if fixed.is_empty() || validate(&fixed, Strictness::Strict).is_err() {
        return None;
    }
    Some(fixed)
}
