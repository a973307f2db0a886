//! Identity of an engine instance

use heapless::String;

use crate::error::EngineError;

/// Maximum length of a target id
pub const TARGET_CAPACITY: usize = 64;

/// Maximum length of a sanitized instance name
pub const NAME_CAPACITY: usize = 32;

/// What an engine drives and how it is called in logs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineIdentity {
    target: String<TARGET_CAPACITY>,
    name: String<NAME_CAPACITY>,
}

impl EngineIdentity {
    /// Create an identity for `target`
    ///
    /// `name` is sanitized for use as a log prefix. If nothing usable is
    /// left, the target id (truncated to [`NAME_CAPACITY`]) is used instead.
    pub fn new(target: &str, name: &str) -> Result<Self, EngineError> {
        let target = target.trim();
        if target.is_empty() {
            return Err(EngineError::MissingTargetIdentity);
        }

        let mut bounded = String::new();
        bounded
            .push_str(target)
            .map_err(|()| EngineError::TargetIdentityTooLong(TARGET_CAPACITY))?;

        let mut sanitized = sanitize_name(name);
        if sanitized.is_empty() {
            for c in target.chars() {
                if sanitized.push(c).is_err() {
                    break;
                }
            }
        }

        Ok(Self {
            target: bounded,
            name: sanitized,
        })
    }

    /// Id of the driven target
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Sanitized instance name
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Sanitize an instance name
///
/// Whitespace runs become a single `_`, letters are lowercased and every
/// character outside `[a-z0-9_]` is dropped. The result is truncated to
/// [`NAME_CAPACITY`] bytes.
pub fn sanitize_name(name: &str) -> String<NAME_CAPACITY> {
    let mut sanitized = String::new();
    let mut in_whitespace = false;

    for c in name.chars() {
        let mapped = if c.is_whitespace() {
            if in_whitespace {
                continue;
            }
            in_whitespace = true;
            '_'
        } else {
            in_whitespace = false;
            let c = c.to_ascii_lowercase();
            if !(c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_') {
                continue;
            }
            c
        };

        if sanitized.push(mapped).is_err() {
            break;
        }
    }

    sanitized
}
