//! CPU selection. Determines which mnemonics are legal and which opcode
//! table the encoder consults.

use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, clap::ValueEnum)]
pub enum Cpu {
    #[default]
    #[value(name = "6502")]
    Nmos6502,
    #[value(name = "6502i")]
    Nmos6502Illegal,
    #[value(name = "65C02")]
    Wdc65C02,
    #[value(name = "65816")]
    Wdc65816,
}

impl Cpu {
    pub fn supports(self, min: Cpu) -> bool {
        match (self, min) {
            (Cpu::Wdc65816, _) => true,
            (Cpu::Wdc65C02, Cpu::Wdc65816) => false,
            (Cpu::Wdc65C02, _) => true,
            (Cpu::Nmos6502Illegal, Cpu::Nmos6502 | Cpu::Nmos6502Illegal) => true,
            (Cpu::Nmos6502Illegal, _) => false,
            (Cpu::Nmos6502, Cpu::Nmos6502) => true,
            (Cpu::Nmos6502, _) => false,
        }
    }

    pub fn is_65816(self) -> bool {
        self == Cpu::Wdc65816
    }

    pub fn is_65c02_or_better(self) -> bool {
        matches!(self, Cpu::Wdc65C02 | Cpu::Wdc65816)
    }
}

impl fmt::Display for Cpu {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Cpu::Nmos6502 => "6502",
            Cpu::Nmos6502Illegal => "6502i",
            Cpu::Wdc65C02 => "65C02",
            Cpu::Wdc65816 => "65816",
        })
    }
}

impl FromStr for Cpu {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "6502" => Ok(Cpu::Nmos6502),
            "6502i" => Ok(Cpu::Nmos6502Illegal),
            "65c02" => Ok(Cpu::Wdc65C02),
            "65816" => Ok(Cpu::Wdc65816),
            other => Err(format!("unrecognized CPU '{}' (expected 6502, 6502i, 65C02, or 65816)", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supports_is_monotone_in_generation() {
        assert!(Cpu::Wdc65816.supports(Cpu::Nmos6502));
        assert!(Cpu::Wdc65816.supports(Cpu::Wdc65C02));
        assert!(!Cpu::Nmos6502.supports(Cpu::Wdc65C02));
        assert!(!Cpu::Wdc65C02.supports(Cpu::Wdc65816));
    }

    #[test]
    fn parses_names() {
        assert_eq!("65C02".parse::<Cpu>().unwrap(), Cpu::Wdc65C02);
        assert_eq!("65816".parse::<Cpu>().unwrap(), Cpu::Wdc65816);
        assert!("bogus".parse::<Cpu>().is_err());
    }
}
