//! Hospital enumerations accepted by the choice filters.
//!
//! Values serialize as the variant name (`APositive`, `FullAdmission`), which
//! is also the form the choice filters normalize submitted text to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A closed set of named values.
pub trait Choice: Copy + Send + Sync + 'static {
    /// Every variant, in declaration order.
    const ALL: &'static [Self];
    /// One-line summary used as the filter description.
    const SUMMARY: &'static str;

    /// Canonical name.
    fn as_str(&self) -> &'static str;

    /// Human readable description.
    fn description(&self) -> &'static str;

    /// Extra spellings accepted on input.
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    /// Case-insensitive lookup by name or alias.
    fn parse_loose(input: &str) -> Option<Self> {
        let input = input.trim();
        Self::ALL.iter().copied().find(|choice| {
            choice.as_str().eq_ignore_ascii_case(input)
                || choice
                    .aliases()
                    .iter()
                    .any(|alias| alias.eq_ignore_ascii_case(input))
        })
    }
}

macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $summary:literal {
            $($variant:ident => $desc:literal $(| $alias:literal)*),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl Choice for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];
            const SUMMARY: &'static str = $summary;

            fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),+
                }
            }

            fn description(&self) -> &'static str {
                match self {
                    $(Self::$variant => $desc),+
                }
            }

            fn aliases(&self) -> &'static [&'static str] {
                match self {
                    $(Self::$variant => &[$($alias),*]),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse_loose(s).ok_or_else(|| {
                    format!("unknown {} value '{s}'", stringify!($name))
                })
            }
        }
    };
}

choice_enum! {
    Sex, "Sex: Male or Female" {
        Female => "Female" | "F",
        Male => "Male" | "M",
    }
}

choice_enum! {
    BloodGroup, "Blood group: APositive ... ABNegative, NotAvailable (or A+, O-, ...)" {
        APositive => "A RhD positive (A+)" | "A+",
        ANegative => "A RhD negative (A-)" | "A-",
        BPositive => "B RhD positive (B+)" | "B+",
        BNegative => "B RhD negative (B-)" | "B-",
        OPositive => "O RhD positive (O+)" | "O+",
        ONegative => "O RhD negative (O-)" | "O-",
        ABPositive => "AB RhD positive (AB+)" | "AB+",
        ABNegative => "AB RhD negative (AB-)" | "AB-",
        NotAvailable => "Not Available" | "N/A",
    }
}

choice_enum! {
    PatientType, "Patient type: Inpatient or Outpatient" {
        Inpatient => "Patient is admitted and under facility care",
        Outpatient => "Patient left after receiving services",
    }
}

choice_enum! {
    IdType, "Identification type: License, GovernmentId or Passport" {
        License => "Drivers License",
        GovernmentId => "Government Issued ID",
        Passport => "Passport",
    }
}

choice_enum! {
    RelationshipType, "Relationship to the patient" {
        Child => "Child",
        Parent => "Parent",
        Friend => "Friend",
        Sibling => "Sibling",
        Uncle => "Uncle",
        Aunt => "Aunt",
        Cousin => "Cousin",
        Spouse => "Spouse",
        Guardian => "Guardian",
        Acquaintance => "Acquaintance",
        Other => "Other",
    }
}

choice_enum! {
    TemperatureUnit, "Temperature unit: Celsius or Fahrenheit" {
        Celsius => "℃" | "C",
        Fahrenheit => "℉" | "F",
    }
}

choice_enum! {
    AdmissionType, "Admission type: ShortStay or FullAdmission" {
        ShortStay => "Short Stay/Emergency",
        FullAdmission => "Full Admission",
    }
}

choice_enum! {
    Portal, "Login portal: Staff or Patient" {
        Staff => "Staff Portal",
        Patient => "Patient Portal",
    }
}

choice_enum! {
    AccountType, "Staff account type: Doctor, Nurse or Regular" {
        Doctor => "Doctor",
        Nurse => "Nurse",
        Regular => "Regular",
    }
}

choice_enum! {
    SubjectType, "Subject type: Patient (STP) or Account (STA)" {
        Patient => "Patient" | "STP",
        Account => "Account" | "STA",
    }
}
