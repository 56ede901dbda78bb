use thiserror::Error as ThisError;

///
/// WildcardNotSupportedError
///
/// A `*` selector was found in a select list. Cached rows must carry an
/// explicit column set, so wildcard selections cannot be reconciled.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, ThisError)]
#[error("wildcard selector is not supported")]
pub struct WildcardNotSupportedError;

///
/// ParseError
///
/// Malformed filter or select grammar.
///

#[remain::sorted]
#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ParseError {
    #[error("malformed filter clause '{clause}'")]
    MalformedClause { clause: String },

    #[error("negated logic group '{key}' is not supported")]
    NegatedGroup { key: String },

    #[error("unbalanced delimiters in '{input}'")]
    Unbalanced { input: String },

    #[error("unknown filter operator '{operator}' in '{clause}'")]
    UnknownOperator { operator: String, clause: String },

    #[error("logic group '{key}' must be wrapped in parentheses, got '{value}'")]
    UnwrappedGroup { key: String, value: String },
}

impl ParseError {
    pub(crate) fn malformed(clause: impl Into<String>) -> Self {
        Self::MalformedClause {
            clause: clause.into(),
        }
    }

    pub(crate) fn unbalanced(input: impl Into<String>) -> Self {
        Self::Unbalanced {
            input: input.into(),
        }
    }
}

///
/// QueryError
///
/// Failure to canonicalize a query description. A failed parse never yields
/// a partial descriptor; callers should treat it as "do not cache".
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum QueryError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Wildcard(#[from] WildcardNotSupportedError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_error_message_is_stable() {
        assert_eq!(
            WildcardNotSupportedError.to_string(),
            "wildcard selector is not supported"
        );
    }

    #[test]
    fn query_error_is_transparent() {
        let err = QueryError::from(ParseError::malformed("id.eq"));

        assert_eq!(err.to_string(), "malformed filter clause 'id.eq'");
    }
}
