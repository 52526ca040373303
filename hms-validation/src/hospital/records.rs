//! Typed hospital records populated from validated forms.
//!
//! The rule tables here mirror the built-in YAML schemas of the same entity
//! name, so a form validated through the catalog and one validated through
//! the typed API accept exactly the same input.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::hospital::{BloodGroup, IdType, PatientType, Sex};
use crate::schema::{SchemaBuilder, Validatable};
use crate::stage::Stage;

/// Demographics shared by patients and staff.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Person {
    pub first_name: String,
    pub last_name: String,
    pub sex: Option<Sex>,
    pub dob: Option<NaiveDate>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl Validatable for Person {
    const ENTITY: &'static str = "person";

    fn declare(schema: &mut SchemaBuilder) {
        schema
            .field("first_name")
            .label("First name")
            .filters("trim|required|name|length(2,50)|capitalize");
        schema
            .field("last_name")
            .label("Last name")
            .filters("trim|required|name|length(2,50)|capitalize");
        schema.field("sex").label("Sex").filters("required|sex");
        schema
            .field("dob")
            .label("Date of birth")
            .filters("required|date(yyyy-MM-dd)|past");
        schema
            .field("email")
            .label("Email")
            .filters("trim|lower|length(3,50)|email");
        schema.field("phone").label("Phone number").filters("trim|phone");
        schema
            .field("address")
            .label("Address")
            .filters("trim|required|text|length(3,100)");
    }
}

/// Patient registration form: a person plus identification and medical
/// classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientRegistration {
    pub id: Option<i64>,
    #[serde(flatten)]
    pub person: Person,
    pub blood_group: Option<BloodGroup>,
    pub patient_type: Option<PatientType>,
    pub id_type: Option<IdType>,
    pub id_number: String,
}

impl Validatable for PatientRegistration {
    const ENTITY: &'static str = "patient";

    fn declare(schema: &mut SchemaBuilder) {
        schema.extend::<Person>();
        schema
            .field("id")
            .label("Patient id")
            .filters("required|long")
            .stages([Stage::Update]);
        schema
            .field("blood_group")
            .label("Blood group")
            .filters("required|blood_group");
        schema
            .field("patient_type")
            .label("Patient type")
            .filters("required|patient_type");
        schema.field("id_type").label("ID Type").filters("required|id_type");
        schema
            .field("id_number")
            .label("ID Number")
            .filters("trim|required|text|length(3,20)");
    }
}

/// Pharmacy stock item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Medicine {
    pub id: Option<i64>,
    pub name: String,
    pub generic_name: String,
    pub category: i64,
    pub location: i64,
    pub purchase_price: f64,
    pub selling_price: f64,
    pub quantity: i64,
    pub threshold: i64,
    pub expires: Option<NaiveDate>,
}

impl Validatable for Medicine {
    const ENTITY: &'static str = "medicine";

    fn declare(schema: &mut SchemaBuilder) {
        let edit = [Stage::Create, Stage::Update];
        schema
            .field("id")
            .label("Medicine id")
            .filters("required|long")
            .stages([Stage::Update, Stage::Find]);
        schema
            .field("name")
            .label("Medicine name")
            .filters("trim|required|length(2,50)")
            .stages(edit.clone());
        schema
            .field("generic_name")
            .label("Generic name")
            .filters("trim|required|length(2,50)")
            .stages(edit.clone());
        schema
            .field("category")
            .label("Medicine category")
            .filters("required|long")
            .stages(edit.clone());
        schema
            .field("location")
            .label("Medicine location")
            .filters("required|long")
            .stages(edit.clone());
        schema
            .field("purchase_price")
            .label("Purchase price")
            .filters("required|double|positive")
            .stages(edit.clone());
        schema
            .field("selling_price")
            .label("Selling price")
            .filters("required|double|positive")
            .stages(edit.clone());
        schema
            .field("quantity")
            .label("Quantity")
            .filters("required|long|positive")
            .stages(edit.clone());
        schema
            .field("threshold")
            .label("Low stock threshold")
            .filters("required|long|positive")
            .stages(edit.clone());
        schema
            .field("expires")
            .label("Expiry date")
            .filters("required|date(yyyy-MM-dd)|future")
            .stages(edit);
    }
}

/// Outcome notes of a consultation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsultationResult {
    pub notes: String,
    pub procedure_id: i64,
    pub patient_mrn: String,
}

impl Validatable for ConsultationResult {
    const ENTITY: &'static str = "consultation-result";

    fn declare(schema: &mut SchemaBuilder) {
        schema
            .field("notes")
            .label("Summary notes")
            .filters("trim|required|length(1,2048)");
        schema
            .field("procedure_id")
            .label("Consultation")
            .filters("required|long");
        schema
            .field("patient_mrn")
            .name("mrn")
            .label("Patient MRN")
            .filters("trim|required|upper|mrn");
    }
}

/// Drugs handed out to a patient, picked from a checkbox list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispenseRequest {
    pub patient_mrn: String,
    pub drugs: Vec<i64>,
    pub notes: Option<String>,
}

impl Validatable for DispenseRequest {
    const ENTITY: &'static str = "dispense";

    fn declare(schema: &mut SchemaBuilder) {
        schema
            .field("patient_mrn")
            .name("mrn")
            .label("Patient MRN")
            .filters("trim|required|upper|mrn");
        schema
            .field("drugs")
            .name("drug_ids")
            .label("Drugs")
            .filters("required|long_array|length(1,23)")
            .array();
        schema
            .field("notes")
            .label("Notes")
            .filters("trim|text(true)|length(0,500)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::RawInput;
    use crate::validator::{Validation, Validator};

    fn person_form() -> RawInput {
        RawInput::new()
            .with("first_name", "  mARY ")
            .with("last_name", "o'neil")
            .with("sex", "female")
            .with("dob", "1980-04-12")
            .with("email", " Mary.ONeil@Example.org ")
            .with("address", "12 Hope Road, Kingston")
    }

    #[test]
    fn test_person_is_normalized() {
        let validator = Validator::with_builtins();
        let person = validator
            .validate::<Person>(&person_form(), &Stage::Create)
            .unwrap()
            .into_result()
            .unwrap();
        assert_eq!(person.first_name, "Mary");
        assert_eq!(person.last_name, "O'neil");
        assert_eq!(person.sex, Some(Sex::Female));
        assert_eq!(person.dob, NaiveDate::from_ymd_opt(1980, 4, 12));
        assert_eq!(person.email.as_deref(), Some("mary.oneil@example.org"));
    }

    #[test]
    fn test_patient_inherits_person_rules() {
        let validator = Validator::with_builtins();
        let schema = validator.schema::<PatientRegistration>().unwrap();
        assert_eq!(schema.parent(), Some("person"));
        assert_eq!(schema.rules()[0].property, "first_name");
        assert_eq!(schema.rules().last().unwrap().property, "id_number");

        let raw = person_form()
            .with("blood_group", "O+")
            .with("patient_type", "outpatient")
            .with("id_type", "passport")
            .with("id_number", " A1234567 ");
        let patient = validator
            .validate::<PatientRegistration>(&raw, &Stage::Create)
            .unwrap()
            .into_result()
            .unwrap();
        assert_eq!(patient.person.first_name, "Mary");
        assert_eq!(patient.blood_group, Some(BloodGroup::OPositive));
        assert_eq!(patient.id_type, Some(IdType::Passport));
        assert_eq!(patient.id_number, "A1234567");
        assert_eq!(patient.id, None);
    }

    #[test]
    fn test_medicine_update_requires_id() {
        let validator = Validator::with_builtins();
        let raw = RawInput::new()
            .with("name", "Amoxicillin")
            .with("generic_name", "Amoxicillin trihydrate")
            .with("category", "2")
            .with("location", "5")
            .with("purchase_price", "12.50")
            .with("selling_price", "20")
            .with("quantity", "1,000")
            .with("threshold", "50")
            .with("expires", "2999-12-31");

        let created = validator.validate::<Medicine>(&raw, &Stage::Create).unwrap();
        let Validation::Valid(medicine) = created else {
            panic!("expected a valid medicine");
        };
        assert_eq!(medicine.quantity, 1000);
        assert_eq!(medicine.selling_price, 20.0);

        let updated = validator.validate::<Medicine>(&raw, &Stage::Update).unwrap();
        assert_eq!(updated.errors().len(), 1);
        assert_eq!(updated.errors()[0].message, "Medicine id field is required");

        let found = validator
            .validate::<Medicine>(&RawInput::new().with("id", "9"), &Stage::Find)
            .unwrap();
        assert_eq!(found.into_result().unwrap().id, Some(9));
    }

    #[test]
    fn test_dispense_reads_checkbox_group() {
        let validator = Validator::with_builtins();
        let raw = RawInput::from_urlencoded("mrn=abcd0f1&drug_ids=4&drug_ids=9&drug_ids=4");
        let request = validator
            .validate::<DispenseRequest>(&raw, &Stage::All)
            .unwrap()
            .into_result()
            .unwrap();
        assert_eq!(request.patient_mrn, "ABCD0F1");
        assert_eq!(request.drugs, vec![4, 9]);
        assert_eq!(request.notes, None);
    }

    #[test]
    fn test_dispense_without_drugs_is_rejected() {
        let validator = Validator::with_builtins();
        let raw = RawInput::new().with("mrn", "ABCD123");
        let outcome = validator.validate::<DispenseRequest>(&raw, &Stage::All).unwrap();
        let rejection = outcome.into_result().unwrap_err();
        assert_eq!(rejection.messages(), vec!["Drugs field is required"]);
        assert_eq!(rejection.errors[0].field, "drug_ids");
    }
}
