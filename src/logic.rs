// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The table of SMT-LIB logic names.

use serde::Serialize;

use crate::error::{Error, Result};

/// A recognized SMT-LIB logic. Bit-vector logics are recognized but
/// rejected by the driver; unknown names fail at lookup.
#[allow(non_camel_case_types, missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SmtLogic {
    ALIA,
    ALL,
    ANIA,
    AUFDTLIA,
    AUFDTLIRA,
    AUFDTNIRA,
    AUFLIA,
    AUFLIRA,
    AUFNIA,
    AUFNIRA,
    BV,
    LIA,
    LRA,
    NIA,
    NRA,
    QF_ABV,
    QF_ALIA,
    QF_ANIA,
    QF_AUFBV,
    QF_AUFLIA,
    QF_AUFNIA,
    QF_AX,
    QF_BV,
    QF_IDL,
    QF_LIA,
    QF_LIRA,
    QF_LRA,
    QF_NIA,
    QF_NIRA,
    QF_NRA,
    QF_RDL,
    QF_UF,
    QF_UFBV,
    QF_UFIDL,
    QF_UFLIA,
    QF_UFLRA,
    QF_UFNIA,
    QF_UFNRA,
    UF,
    UFBV,
    UFDT,
    UFDTLIA,
    UFDTLIRA,
    UFDTNIA,
    UFDTNIRA,
    UFIDL,
    UFLIA,
    UFLRA,
    UFNIA,
}

impl SmtLogic {
    /// Look up a logic by its SMT-LIB name.
    pub fn from_name(name: &str) -> Result<SmtLogic> {
        use SmtLogic::*;
        match name {
            "ALIA" => Ok(ALIA),
            "ALL" => Ok(ALL),
            "ANIA" => Ok(ANIA),
            "AUFDTLIA" => Ok(AUFDTLIA),
            "AUFDTLIRA" => Ok(AUFDTLIRA),
            "AUFDTNIRA" => Ok(AUFDTNIRA),
            "AUFLIA" => Ok(AUFLIA),
            "AUFLIRA" => Ok(AUFLIRA),
            "AUFNIA" => Ok(AUFNIA),
            "AUFNIRA" => Ok(AUFNIRA),
            "BV" => Ok(BV),
            "LIA" => Ok(LIA),
            "LRA" => Ok(LRA),
            "NIA" => Ok(NIA),
            "NRA" => Ok(NRA),
            "QF_ABV" => Ok(QF_ABV),
            "QF_ALIA" => Ok(QF_ALIA),
            "QF_ANIA" => Ok(QF_ANIA),
            "QF_AUFBV" => Ok(QF_AUFBV),
            "QF_AUFLIA" => Ok(QF_AUFLIA),
            "QF_AUFNIA" => Ok(QF_AUFNIA),
            "QF_AX" => Ok(QF_AX),
            "QF_BV" => Ok(QF_BV),
            "QF_IDL" => Ok(QF_IDL),
            "QF_LIA" => Ok(QF_LIA),
            "QF_LIRA" => Ok(QF_LIRA),
            "QF_LRA" => Ok(QF_LRA),
            "QF_NIA" => Ok(QF_NIA),
            "QF_NIRA" => Ok(QF_NIRA),
            "QF_NRA" => Ok(QF_NRA),
            "QF_RDL" => Ok(QF_RDL),
            "QF_UF" => Ok(QF_UF),
            "QF_UFBV" => Ok(QF_UFBV),
            "QF_UFIDL" => Ok(QF_UFIDL),
            "QF_UFLIA" => Ok(QF_UFLIA),
            "QF_UFLRA" => Ok(QF_UFLRA),
            "QF_UFNIA" => Ok(QF_UFNIA),
            "QF_UFNRA" => Ok(QF_UFNRA),
            "UF" => Ok(UF),
            "UFBV" => Ok(UFBV),
            "UFDT" => Ok(UFDT),
            "UFDTLIA" => Ok(UFDTLIA),
            "UFDTLIRA" => Ok(UFDTLIRA),
            "UFDTNIA" => Ok(UFDTNIA),
            "UFDTNIRA" => Ok(UFDTNIRA),
            "UFIDL" => Ok(UFIDL),
            "UFLIA" => Ok(UFLIA),
            "UFLRA" => Ok(UFLRA),
            "UFNIA" => Ok(UFNIA),
            _ => Err(Error::UnrecognizedLogic(name.to_string())),
        }
    }

    /// Whether this is a bit-vector logic, which the front end rejects.
    pub fn is_bitvector(self) -> bool {
        use SmtLogic::*;
        matches!(self, BV | QF_ABV | QF_AUFBV | QF_BV | QF_UFBV | UFBV)
    }

    /// Whether plain numerals denote reals in this logic.
    pub fn numerals_are_real(self) -> bool {
        use SmtLogic::*;
        matches!(
            self,
            LRA | NRA | QF_LRA | QF_NRA | QF_RDL | QF_UFLRA | QF_UFNRA | UFLRA
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(SmtLogic::from_name("QF_UFLIA"), Ok(SmtLogic::QF_UFLIA));
        assert_eq!(
            SmtLogic::from_name("QF_FP"),
            Err(Error::UnrecognizedLogic("QF_FP".to_string()))
        );
    }

    #[test]
    fn test_families() {
        assert!(SmtLogic::QF_BV.is_bitvector());
        assert!(!SmtLogic::QF_UF.is_bitvector());
        assert!(SmtLogic::LRA.numerals_are_real());
        assert!(SmtLogic::QF_RDL.numerals_are_real());
        assert!(!SmtLogic::QF_LIA.numerals_are_real());
        // mixed int/real logics keep numerals integral
        assert!(!SmtLogic::AUFLIRA.numerals_are_real());
    }
}
