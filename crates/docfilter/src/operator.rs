use serde::Serialize;
use std::{fmt, str::FromStr};
use thiserror::Error as ThisError;

///
/// ParseOperatorError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("unknown operator: {0}")]
pub struct ParseOperatorError(pub String);

///
/// Operator
///
/// The closed vocabulary of query-key operator suffixes. Word spellings carry
/// an optional `i` prefix (case-insensitive match) and an optional `in` suffix
/// (multi-value form); bracket spellings are the `[]` aliases produced by
/// PHP/Rails-style array keys.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Exists,
    In,
    Nin,
    All,
    EqArray,
    Re,
    ReCi,
    ReIn,
    ReInCi,
    Co,
    CoCi,
    CoIn,
    CoInCi,
    Sw,
    SwCi,
    SwIn,
    SwInCi,
    InArray,
    AllArray,
    ReArray,
    ReCiArray,
    CoArray,
    CoCiArray,
    SwArray,
    SwCiArray,
}

impl Operator {
    pub const ALL: [Self; 31] = [
        Self::Eq,
        Self::Ne,
        Self::Gt,
        Self::Gte,
        Self::Lt,
        Self::Lte,
        Self::Exists,
        Self::In,
        Self::Nin,
        Self::All,
        Self::EqArray,
        Self::Re,
        Self::ReCi,
        Self::ReIn,
        Self::ReInCi,
        Self::Co,
        Self::CoCi,
        Self::CoIn,
        Self::CoInCi,
        Self::Sw,
        Self::SwCi,
        Self::SwIn,
        Self::SwInCi,
        Self::InArray,
        Self::AllArray,
        Self::ReArray,
        Self::ReCiArray,
        Self::CoArray,
        Self::CoCiArray,
        Self::SwArray,
        Self::SwCiArray,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Exists => "exists",
            Self::In => "in",
            Self::Nin => "nin",
            Self::All => "all",
            Self::EqArray => "eqa",
            Self::Re => "re",
            Self::ReCi => "ire",
            Self::ReIn => "rein",
            Self::ReInCi => "irein",
            Self::Co => "co",
            Self::CoCi => "ico",
            Self::CoIn => "coin",
            Self::CoInCi => "icoin",
            Self::Sw => "sw",
            Self::SwCi => "isw",
            Self::SwIn => "swin",
            Self::SwInCi => "iswin",
            Self::InArray => "[]",
            Self::AllArray => "all[]",
            Self::ReArray => "re[]",
            Self::ReCiArray => "ire[]",
            Self::CoArray => "co[]",
            Self::CoCiArray => "ico[]",
            Self::SwArray => "sw[]",
            Self::SwCiArray => "isw[]",
        }
    }

    /// Maps each bracket spelling onto its word-suffix `in` form; word
    /// spellings are fixed points. Idempotent.
    #[must_use]
    pub const fn canonical(self) -> Self {
        match self {
            Self::InArray => Self::In,
            Self::AllArray => Self::All,
            Self::ReArray => Self::ReIn,
            Self::ReCiArray => Self::ReInCi,
            Self::CoArray => Self::CoIn,
            Self::CoCiArray => Self::CoInCi,
            Self::SwArray => Self::SwIn,
            Self::SwCiArray => Self::SwInCi,
            other => other,
        }
    }

    #[must_use]
    pub const fn is_array_spelling(self) -> bool {
        matches!(
            self,
            Self::InArray
                | Self::AllArray
                | Self::ReArray
                | Self::ReCiArray
                | Self::CoArray
                | Self::CoCiArray
                | Self::SwArray
                | Self::SwCiArray
        )
    }

    /// True when the operator takes a list of operands rather than one value.
    #[must_use]
    pub const fn is_multi_value(self) -> bool {
        matches!(
            self.canonical(),
            Self::In
                | Self::Nin
                | Self::All
                | Self::EqArray
                | Self::ReIn
                | Self::ReInCi
                | Self::CoIn
                | Self::CoInCi
                | Self::SwIn
                | Self::SwInCi
        )
    }

    /// A lone value under a multi-value word spelling is a comma-joined list.
    /// Bracket spellings already arrive as repeated keys and never split.
    #[must_use]
    pub const fn needs_split(self) -> bool {
        self.is_multi_value() && !self.is_array_spelling()
    }

    #[must_use]
    pub const fn is_regex(self) -> bool {
        matches!(
            self,
            Self::Re | Self::ReCi | Self::ReIn | Self::ReInCi | Self::ReArray | Self::ReCiArray
        )
    }

    #[must_use]
    pub const fn is_contains(self) -> bool {
        matches!(
            self,
            Self::Co | Self::CoCi | Self::CoIn | Self::CoInCi | Self::CoArray | Self::CoCiArray
        )
    }

    #[must_use]
    pub const fn is_starts_with(self) -> bool {
        matches!(
            self,
            Self::Sw | Self::SwCi | Self::SwIn | Self::SwInCi | Self::SwArray | Self::SwCiArray
        )
    }

    #[must_use]
    pub const fn is_ignore_case(self) -> bool {
        matches!(
            self,
            Self::ReCi
                | Self::ReInCi
                | Self::ReCiArray
                | Self::CoCi
                | Self::CoInCi
                | Self::CoCiArray
                | Self::SwCi
                | Self::SwInCi
                | Self::SwCiArray
        )
    }

    /// Options string handed to the regex primitive factory.
    #[must_use]
    pub const fn regex_options(self) -> &'static str {
        if self.is_ignore_case() { "i" } else { "" }
    }

    /// The operator a multi-value group falls back to when it holds exactly
    /// one operand. `nin` and `eqa` keep their array semantics and do not
    /// downgrade.
    #[must_use]
    pub const fn single_value(self) -> Self {
        match self.canonical() {
            Self::In | Self::All => Self::Eq,
            Self::ReIn => Self::Re,
            Self::ReInCi => Self::ReCi,
            Self::CoIn => Self::Co,
            Self::CoInCi => Self::CoCi,
            Self::SwIn => Self::Sw,
            Self::SwInCi => Self::SwCi,
            other => other,
        }
    }

    /// The database operator symbol this spelling compiles to. The pattern
    /// families and `eqa` collapse to equality (the pattern itself carries
    /// the matching semantics); their `in` forms collapse to `$in`.
    #[must_use]
    pub const fn symbol(self) -> Symbol {
        match self {
            Self::Eq
            | Self::EqArray
            | Self::Re
            | Self::ReCi
            | Self::Co
            | Self::CoCi
            | Self::Sw
            | Self::SwCi => Symbol::Eq,
            Self::Ne => Symbol::Ne,
            Self::Gt => Symbol::Gt,
            Self::Gte => Symbol::Gte,
            Self::Lt => Symbol::Lt,
            Self::Lte => Symbol::Lte,
            Self::Exists => Symbol::Exists,
            Self::In
            | Self::InArray
            | Self::ReIn
            | Self::ReInCi
            | Self::ReArray
            | Self::ReCiArray
            | Self::CoIn
            | Self::CoInCi
            | Self::CoArray
            | Self::CoCiArray
            | Self::SwIn
            | Self::SwInCi
            | Self::SwArray
            | Self::SwCiArray => Symbol::In,
            Self::Nin => Symbol::Nin,
            Self::All | Self::AllArray => Symbol::All,
        }
    }

    /// Subsumption: does `self` belong to the family named by `family`?
    ///
    /// `all[]` is its own family (it matches only `all` spellings), a bracket
    /// family operand compares by raw-text suffix, and an `i`-prefixed
    /// operator sheds its prefix before being compared against a
    /// case-sensitive family.
    #[must_use]
    pub fn is(self, family: Self) -> bool {
        if self == Self::AllArray {
            return matches!(family, Self::All | Self::AllArray);
        }
        if family.is_array_spelling() {
            return self.as_str().ends_with(family.as_str());
        }

        let mut text = self.canonical().as_str();
        if self.is_ignore_case() && !family.is_ignore_case() {
            text = &text[1..];
        }

        if family == Self::In {
            return text.ends_with("in");
        }

        text.starts_with(family.as_str())
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = ParseOperatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| ParseOperatorError(s.to_string()))
    }
}

///
/// Symbol
///
/// The target filter-language operator keys. Serialized form is the dollar
/// spelling used inside nested operator documents.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Symbol {
    #[serde(rename = "$eq")]
    Eq,
    #[serde(rename = "$ne")]
    Ne,
    #[serde(rename = "$gt")]
    Gt,
    #[serde(rename = "$gte")]
    Gte,
    #[serde(rename = "$lt")]
    Lt,
    #[serde(rename = "$lte")]
    Lte,
    #[serde(rename = "$exists")]
    Exists,
    #[serde(rename = "$in")]
    In,
    #[serde(rename = "$nin")]
    Nin,
    #[serde(rename = "$all")]
    All,
}

impl Symbol {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "$eq",
            Self::Ne => "$ne",
            Self::Gt => "$gt",
            Self::Gte => "$gte",
            Self::Lt => "$lt",
            Self::Lte => "$lte",
            Self::Exists => "$exists",
            Self::In => "$in",
            Self::Nin => "$nin",
            Self::All => "$all",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// TESTS
///
