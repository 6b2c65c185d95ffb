//! Error types for code generation.

use std::fmt;

/// Top-level error returned by every public entry point.
#[derive(Debug)]
pub enum CodeGenError {
    /// A recoverable handler-level failure, carrying its typed reason.
    Handler(HandlerError),
    /// A `write!`/`writeln!` failure against the output buffer.
    Format(fmt::Error),
    /// Anything else, as a plain message.
    Logic(String),
}

impl fmt::Display for CodeGenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeGenError::Handler(e) => write!(f, "{e}"),
            CodeGenError::Format(e) => write!(f, "format error: {e}"),
            CodeGenError::Logic(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for CodeGenError {}

impl From<String> for CodeGenError {
    fn from(s: String) -> Self {
        CodeGenError::Logic(s)
    }
}

impl From<fmt::Error> for CodeGenError {
    fn from(e: fmt::Error) -> Self {
        CodeGenError::Format(e)
    }
}

impl From<HandlerError> for CodeGenError {
    fn from(e: HandlerError) -> Self {
        CodeGenError::Handler(e)
    }
}

/// The typed error taxonomy a handler can raise. Everything here is
/// recoverable and meant to surface as a diagnostic, not a panic — the one
/// exception is `Internal`, reserved for invariant violations the Context
/// Builder is supposed to have already ruled out.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerError {
    /// A compound operator (`+=`, `|=`, ...) applied to a bit-field target,
    /// which only ever supports plain assignment.
    CompoundOnBitField { line: Option<u32> },
    /// A literal `0` written to a write-one-to-clear-only register member.
    WriteOnlyClear { line: Option<u32>, member: String },
    /// `this` used outside any scope body.
    ThisOutsideScope { line: Option<u32> },
    /// A plain (unqualified) reference to a private member of another scope.
    CrossScopeInvisible { line: Option<u32>, scope: String, member: String },
    /// `global.Scope.X` used to reach a member of the scope currently being
    /// compiled, where a bare reference would do.
    OwnScopeByName { line: Option<u32>, scope: String },
    /// A plain identifier that is simultaneously a global and a member of
    /// the enclosing scope — ambiguous without `this`/`global`.
    GlobalShadowed { line: Option<u32>, name: String },
    /// `.field` on a bitmap type that declares no such field.
    UnknownBitmapField { line: Option<u32>, bitmap: String, field: String },
    /// A literal assigned to a bitmap field that cannot fit in its width.
    BitmapLiteralOverflow { line: Option<u32>, field: String, width: u32 },
    /// A `[start, width]` slice whose bounds are not compile-time constant.
    SliceNonConst { line: Option<u32> },
    /// A `[start, width]` slice whose bounds exceed the target's width.
    SliceOutOfBounds { line: Option<u32>, start: i64, width: i64, max: u32 },
    /// A constant array index outside the array's declared bound.
    ArrayIndexOutOfBounds { line: Option<u32>, index: i64, len: u32 },
    /// A read of a write-only register member.
    WriteOnlyRead { line: Option<u32>, member: String },
    /// A float-bit-shadow access attempted outside a function body.
    FloatBitAtGlobalScope { line: Option<u32> },
    /// The deprecated `.length` pseudo-field.
    DeprecatedLength { line: Option<u32> },
    /// `.element_count` on a non-array target.
    ElementCountOnNonArray { line: Option<u32> },
    /// `.char_count` on a non-string target.
    CharCountOnNonString { line: Option<u32> },
    /// `[...]` subscript applied directly to a bitmap-typed member.
    BracketOnBitmapMember { line: Option<u32>, member: String },
    /// `.field` on a struct type that declares no such field.
    UnknownStructField { line: Option<u32>, struct_name: String, field: String },
    /// Assignment of a non-const value into a const-qualified target.
    ConstToNonConst { line: Option<u32>, target: String },
    /// Comparison or assignment across incompatible enum types.
    EnumComparability { line: Option<u32>, left: String, right: String },
    /// A Context Builder invariant was violated; this should be unreachable
    /// from valid input and indicates an upstream bug.
    Internal(String),
}

impl HandlerError {
    fn line(&self) -> Option<u32> {
        match self {
            HandlerError::CompoundOnBitField { line }
            | HandlerError::WriteOnlyClear { line, .. }
            | HandlerError::ThisOutsideScope { line }
            | HandlerError::CrossScopeInvisible { line, .. }
            | HandlerError::OwnScopeByName { line, .. }
            | HandlerError::GlobalShadowed { line, .. }
            | HandlerError::UnknownBitmapField { line, .. }
            | HandlerError::BitmapLiteralOverflow { line, .. }
            | HandlerError::SliceNonConst { line }
            | HandlerError::SliceOutOfBounds { line, .. }
            | HandlerError::ArrayIndexOutOfBounds { line, .. }
            | HandlerError::WriteOnlyRead { line, .. }
            | HandlerError::FloatBitAtGlobalScope { line }
            | HandlerError::DeprecatedLength { line }
            | HandlerError::ElementCountOnNonArray { line }
            | HandlerError::CharCountOnNonString { line }
            | HandlerError::BracketOnBitmapMember { line, .. }
            | HandlerError::UnknownStructField { line, .. }
            | HandlerError::ConstToNonConst { line, .. }
            | HandlerError::EnumComparability { line, .. } => *line,
            HandlerError::Internal(_) => None,
        }
    }

    fn message(&self) -> String {
        match self {
            HandlerError::CompoundOnBitField { .. } => {
                "compound assignment operator is not valid on a bit-field target".to_string()
            }
            HandlerError::WriteOnlyClear { member, .. } => {
                format!("write-only-to-clear register member '{member}' cannot be written 0 directly")
            }
            HandlerError::ThisOutsideScope { .. } => "'this' used outside a scope body".to_string(),
            HandlerError::CrossScopeInvisible { scope, member, .. } => {
                format!("'{member}' is a private member of scope '{scope}' and is not visible here")
            }
            HandlerError::OwnScopeByName { scope, .. } => {
                format!("use a bare reference instead of 'global.{scope}' inside scope '{scope}' itself")
            }
            HandlerError::GlobalShadowed { name, .. } => {
                format!("'{name}' is ambiguous: both a global and a member of the enclosing scope")
            }
            HandlerError::UnknownBitmapField { bitmap, field, .. } => {
                format!("bitmap type '{bitmap}' has no field named '{field}'")
            }
            HandlerError::BitmapLiteralOverflow { field, width, .. } => {
                format!("literal does not fit in {width}-bit field '{field}'")
            }
            HandlerError::SliceNonConst { .. } => {
                "bit-range start and width must be compile-time constants".to_string()
            }
            HandlerError::SliceOutOfBounds { start, width, max, .. } => {
                format!("bit range [{start}, {width}] exceeds the target's {max}-bit width")
            }
            HandlerError::ArrayIndexOutOfBounds { index, len, .. } => {
                format!("array index {index} is out of bounds for an array of length {len}")
            }
            HandlerError::WriteOnlyRead { member, .. } => {
                format!("register member '{member}' is write-only and cannot be read")
            }
            HandlerError::FloatBitAtGlobalScope { .. } => {
                "float bit-level access is only valid inside a function body".to_string()
            }
            HandlerError::DeprecatedLength { .. } => {
                "'.length' has been replaced by '.size', '.capacity', '.bit_length', \
                 '.byte_length', '.element_count', or '.char_count'"
                    .to_string()
            }
            HandlerError::ElementCountOnNonArray { .. } => {
                "'.element_count' is only valid on an array target".to_string()
            }
            HandlerError::CharCountOnNonString { .. } => {
                "'.char_count' is only valid on a string target".to_string()
            }
            HandlerError::BracketOnBitmapMember { member, .. } => {
                format!("'[...]' subscript is not valid directly on bitmap member '{member}'; access a field instead")
            }
            HandlerError::UnknownStructField { struct_name, field, .. } => {
                format!("struct '{struct_name}' has no field named '{field}'")
            }
            HandlerError::ConstToNonConst { target, .. } => {
                format!("cannot assign a non-const value into const target '{target}'")
            }
            HandlerError::EnumComparability { left, right, .. } => {
                format!("enum types '{left}' and '{right}' are not comparable")
            }
            HandlerError::Internal(msg) => format!("internal error: {msg}"),
        }
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line() {
            Some(line) => write!(f, "{line}: Error: {}", self.message()),
            None => write!(f, "Error: {}", self.message()),
        }
    }
}

impl std::error::Error for HandlerError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_line_when_known() {
        let e = HandlerError::ThisOutsideScope { line: Some(42) };
        assert_eq!(e.to_string(), "42: Error: 'this' used outside a scope body");
    }

    #[test]
    fn display_omits_line_when_unknown() {
        let e = HandlerError::Internal("classifier returned no kind".to_string());
        assert_eq!(
            e.to_string(),
            "Error: internal error: classifier returned no kind"
        );
    }

    #[test]
    fn codegen_error_wraps_handler_error_via_from() {
        let e: CodeGenError = HandlerError::DeprecatedLength { line: None }.into();
        assert!(matches!(e, CodeGenError::Handler(_)));
        assert!(e.to_string().contains(".size"));
    }

    #[test]
    fn codegen_error_wraps_fmt_error() {
        use std::fmt::Write as _;
        let mut s = String::new();
        let result: Result<(), CodeGenError> = write!(s, "ok").map_err(Into::into);
        assert!(result.is_ok());
    }
}
