//! Assembler directives (pseudo-ops and control directives). A closed set,
//! mirroring `Mnemonic` in shape: `strum` handles the name <-> variant
//! mapping so the lexer's reserved-word promotion is one `from_str` call.

use strum::{EnumIter, EnumString, IntoStaticStr};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, EnumString, IntoStaticStr, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Directive {
    #[strum(serialize = ".include")]
    Include,
    #[strum(serialize = ".macro")]
    Macro,
    #[strum(serialize = ".endmacro")]
    EndMacro,
    #[strum(serialize = ".end")]
    End,
    #[strum(serialize = ".m8")]
    M8,
    #[strum(serialize = ".m16")]
    M16,
    #[strum(serialize = ".mx8")]
    Mx8,
    #[strum(serialize = ".mx16")]
    Mx16,
    #[strum(serialize = ".x8")]
    X8,
    #[strum(serialize = ".x16")]
    X16,
    #[strum(serialize = ".align")]
    Align,
    #[strum(serialize = ".binary")]
    Binary,
    #[strum(serialize = ".byte")]
    Byte,
    #[strum(serialize = ".word")]
    Word,
    #[strum(serialize = ".dword")]
    Dword,
    #[strum(serialize = ".long")]
    Long,
    #[strum(serialize = ".fill")]
    Fill,
    #[strum(serialize = ".stringify")]
    Stringify,
    #[strum(serialize = ".relocate")]
    Relocate,
    #[strum(serialize = ".endrelocate")]
    EndRelocate,
    #[strum(serialize = ".dp")]
    Dp,
    #[strum(serialize = ".pron")]
    ProOn,
    #[strum(serialize = ".proff")]
    ProOff,
    #[strum(serialize = ".string")]
    Str,
    #[strum(serialize = ".cstring")]
    CString,
    #[strum(serialize = ".lstring")]
    LString,
    #[strum(serialize = ".nstring")]
    NString,
    #[strum(serialize = ".pstring")]
    PString,
}

impl Directive {
    pub fn as_str(self) -> &'static str {
        let s: &'static str = self.into();
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn roundtrips_names() {
        assert_eq!(Directive::from_str(".byte"), Ok(Directive::Byte));
        assert_eq!(Directive::from_str(".PSTRING"), Ok(Directive::PString));
        assert_eq!(Directive::Fill.as_str(), ".fill");
    }
}
