//! Hospital domain: enumerations and the typed records built from forms.

mod country;
mod enums;
mod records;

pub use country::{is_country_code, COUNTRY_CODES};
pub use enums::{
    AccountType, AdmissionType, BloodGroup, Choice, IdType, PatientType, Portal,
    RelationshipType, Sex, SubjectType, TemperatureUnit,
};
pub use records::{ConsultationResult, DispenseRequest, Medicine, PatientRegistration, Person};
