use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Demographic {
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub occupation: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Health {
    pub health_conditions: Vec<String>,
    pub medical_history: Option<String>,
    pub allergies: Vec<String>,
    pub blood_type: Option<String>,
    pub lifestyle_habits: Option<String>,
    pub bmi: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Measurements {
    pub chest: Option<f64>,
    pub waist: Option<f64>,
    pub hips: Option<f64>,
    pub biceps: Option<f64>,
    pub thighs: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientSubscription {
    pub status: String,
    pub end_date: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub plan: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientProfile {
    pub client_id: String,
    pub demographic: Demographic,
    pub health: Health,
    pub measurements: Measurements,
    pub subscription: ClientSubscription,
}
