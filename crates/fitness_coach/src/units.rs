//! Imperial/metric conversions. Nothing here rounds; callers round at the
//! display boundary.

const KG_PER_POUND: f64 = 0.453592;
const CM_PER_INCH: f64 = 2.54;

pub fn pounds_to_kg(pounds: f64) -> f64 {
    pounds * KG_PER_POUND
}

pub fn kg_to_pounds(kg: f64) -> f64 {
    kg / KG_PER_POUND
}

pub fn feet_inches_to_cm(feet: f64, inches: f64) -> f64 {
    (feet * 12.0 + inches) * CM_PER_INCH
}

pub fn cm_to_inches(cm: f64) -> f64 {
    cm / CM_PER_INCH
}
