use thiserror::Error;

/// Publication-type identifiers that confirm an RCT: the MEDLINE
/// controlled-vocabulary term in both casings plus its MeSH code.
pub const RCT_PTYP_TAGS: &[&str] = &[
    "randomized controlled trial",
    "Randomized Controlled Trial",
    "D016449",
];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("record `{id}`: use_ptyp flag is missing or not a boolean")]
pub struct InvalidPtypFlagError {
    pub id: String,
}

/// Tri-state publication-type override signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PtypSignal {
    /// No override; publication-type tags were not consulted.
    Absent,
    /// Tags were consulted and do not mark an RCT.
    NotRct,
    /// Tags mark the record as an RCT.
    ConfirmedRct,
}

impl PtypSignal {
    /// Wire encoding: -1 absent, 0 not RCT, 1 RCT.
    pub fn as_int(&self) -> i8 {
        match self {
            PtypSignal::Absent => -1,
            PtypSignal::NotRct => 0,
            PtypSignal::ConfirmedRct => 1,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, PtypSignal::Absent)
    }
}

/// Derives the override signal from a record's publication-type tags.
///
/// `use_ptyp` is `Option<bool>` because the flag arrives from an external
/// document and may be missing or malformed. Under `strict` a malformed
/// flag fails the record; otherwise it resolves to `Absent` with a warning
/// rather than an undefined value.
pub fn resolve_ptyp(
    id: &str,
    use_ptyp: Option<bool>,
    ptyp_tags: &[String],
    strict: bool,
) -> Result<PtypSignal, InvalidPtypFlagError> {
    match use_ptyp {
        Some(false) => Ok(PtypSignal::Absent),
        Some(true) => {
            if ptyp_tags.iter().any(|t| RCT_PTYP_TAGS.contains(&t.as_str())) {
                Ok(PtypSignal::ConfirmedRct)
            } else {
                Ok(PtypSignal::NotRct)
            }
        }
        None if strict => Err(InvalidPtypFlagError { id: id.to_string() }),
        None => {
            tracing::warn!(id, "use_ptyp missing or malformed; treating as absent");
            Ok(PtypSignal::Absent)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/ptyp.rs"]
mod tests;
