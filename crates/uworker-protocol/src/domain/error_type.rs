//! Error taxonomy reported by workers.
//!
//! Codes are part of the wire contract. New variants get the next free
//! code; existing codes are never renumbered.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Closed set of failure classifications an output can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum ErrorType {
    #[default]
    NoError = 0,
    /// Build setup failed during analysis.
    AnalyzeBuildSetup = 1,
    /// The expected crash did not reproduce during analysis.
    AnalyzeNoCrash = 2,
    TestcaseSetup = 3,
    /// Uncategorized worker failure.
    Unhandled = 4,
    /// Build setup failed during variant analysis.
    VariantBuildSetup = 5,
}

impl ErrorType {
    pub const ALL: [ErrorType; 6] = [
        ErrorType::NoError,
        ErrorType::AnalyzeBuildSetup,
        ErrorType::AnalyzeNoCrash,
        ErrorType::TestcaseSetup,
        ErrorType::Unhandled,
        ErrorType::VariantBuildSetup,
    ];

    pub fn code(self) -> u32 {
        self as u32
    }

    /// Exact lookup. Returns `None` for codes this build does not know.
    pub fn from_code(code: u64) -> Option<Self> {
        Self::ALL.iter().copied().find(|e| u64::from(e.code()) == code)
    }

    /// Lookup for callers outside the codec: unknown codes are treated as
    /// [`ErrorType::Unhandled`], never ignored.
    pub fn from_code_lossy(code: u64) -> Self {
        Self::from_code(code).unwrap_or_else(|| {
            tracing::warn!(event = "error_type.unknown_code", code = code);
            ErrorType::Unhandled
        })
    }

    pub fn is_error(self) -> bool {
        self != ErrorType::NoError
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorType::NoError => "NO_ERROR",
            ErrorType::AnalyzeBuildSetup => "ANALYZE_BUILD_SETUP",
            ErrorType::AnalyzeNoCrash => "ANALYZE_NO_CRASH",
            ErrorType::TestcaseSetup => "TESTCASE_SETUP",
            ErrorType::Unhandled => "UNHANDLED",
            ErrorType::VariantBuildSetup => "VARIANT_BUILD_SETUP",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.code())
    }
}

struct ErrorTypeVisitor;

impl<'de> Visitor<'de> for ErrorTypeVisitor {
    type Value = ErrorType;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a known error type code")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<ErrorType, E> {
        ErrorType::from_code(v).ok_or_else(|| E::custom(format!("unknown error type code {v}")))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<ErrorType, E> {
        let code = u64::try_from(v).map_err(|_| E::custom(format!("unknown error type code {v}")))?;
        self.visit_u64(code)
    }
}

impl<'de> Deserialize<'de> for ErrorType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_u64(ErrorTypeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        let codes: Vec<u32> = ErrorType::ALL.iter().map(|e| e.code()).collect();
        assert_eq!(codes, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn serializes_as_integer() {
        assert_eq!(serde_json::to_string(&ErrorType::AnalyzeNoCrash).unwrap(), "2");
        let e: ErrorType = serde_json::from_str("5").unwrap();
        assert_eq!(e, ErrorType::VariantBuildSetup);
    }

    #[test]
    fn unknown_code_fails_strict_decode() {
        assert!(serde_json::from_str::<ErrorType>("99").is_err());
        assert!(serde_json::from_str::<ErrorType>("-1").is_err());
        assert!(serde_json::from_str::<ErrorType>("\"NO_ERROR\"").is_err());
    }

    #[test]
    fn unknown_code_is_unhandled_when_lossy() {
        assert_eq!(ErrorType::from_code_lossy(99), ErrorType::Unhandled);
        assert_eq!(ErrorType::from_code_lossy(3), ErrorType::TestcaseSetup);
    }

    #[test]
    fn default_is_no_error() {
        assert_eq!(ErrorType::default(), ErrorType::NoError);
        assert!(!ErrorType::NoError.is_error());
        assert!(ErrorType::Unhandled.is_error());
    }
}
