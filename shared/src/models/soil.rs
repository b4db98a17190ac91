//! Soil analysis report returned by the vision model
//!
//! Every field is optional: the model frequently omits or reshapes parts of
//! the report, and consumers default at the point of use. A section given as
//! a bare string or number fills that section's main field. A section whose
//! shape cannot be read is kept in `extra` under `<field>_unparsed`.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Structured soil report
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct SoilReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soil_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soil_classification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub texture_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moisture_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soil_health_score: Option<SoilHealthScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ph_assessment: Option<PhAssessment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutrient_analysis: Option<NutrientAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organic_matter: Option<OrganicMatter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drainage_assessment: Option<DrainageAssessment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ideal_crops: Option<Vec<CropSuitability>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crops_to_avoid: Option<Vec<CropAvoidance>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amendments_needed: Option<Vec<Amendment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub improvement_plan: Option<ImprovementPlan>,
    /// The single most important action, surfaced first in farming advice
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_priority: Option<String>,
    /// Provider fields this model does not name, passed through untouched
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl<'de> Deserialize<'de> for SoilReport {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = BTreeMap::<String, Value>::deserialize(deserializer)?;
        Ok(Self::from_fields(fields))
    }
}

impl SoilReport {
    /// Read the known sections out of a JSON object; everything left over
    /// lands in `extra`
    pub fn from_fields(mut fields: BTreeMap<String, Value>) -> Self {
        SoilReport {
            soil_type: take_text(&mut fields, "soil_type"),
            soil_classification: take_text(&mut fields, "soil_classification"),
            texture_description: take_text(&mut fields, "texture_description"),
            moisture_level: take_text(&mut fields, "moisture_level"),
            soil_health_score: take_section(&mut fields, "soil_health_score"),
            ph_assessment: take_section(&mut fields, "ph_assessment"),
            nutrient_analysis: take_section(&mut fields, "nutrient_analysis"),
            organic_matter: take_section(&mut fields, "organic_matter"),
            drainage_assessment: take_section(&mut fields, "drainage_assessment"),
            ideal_crops: take_list(&mut fields, "ideal_crops"),
            crops_to_avoid: take_list(&mut fields, "crops_to_avoid"),
            amendments_needed: take_list(&mut fields, "amendments_needed"),
            improvement_plan: take_section(&mut fields, "improvement_plan"),
            action_priority: take_text(&mut fields, "action_priority"),
            extra: fields,
        }
    }

    /// Trimmed, non-empty priority action
    pub fn priority_action(&self) -> Option<&str> {
        self.action_priority
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Nutrients whose level is low or deficient, in definition order
    pub fn deficiencies(&self) -> Vec<(Nutrient, &NutrientStatus)> {
        let Some(analysis) = &self.nutrient_analysis else {
            return Vec::new();
        };

        analysis
            .ordered()
            .into_iter()
            .filter_map(|(nutrient, status)| status.map(|s| (nutrient, s)))
            .filter(|(_, status)| status.level_or_default().is_deficient())
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SoilHealthScore {
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub overall: Option<f64>,
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub fertility: Option<f64>,
    #[serde(deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub structure: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PhAssessment {
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub estimated_ph: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub ph_range: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

/// Per-nutrient findings; primary nutrients first, then secondary
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NutrientAnalysis {
    #[serde(deserialize_with = "lenient_nutrient", skip_serializing_if = "Option::is_none")]
    pub nitrogen: Option<NutrientStatus>,
    #[serde(deserialize_with = "lenient_nutrient", skip_serializing_if = "Option::is_none")]
    pub phosphorus: Option<NutrientStatus>,
    #[serde(deserialize_with = "lenient_nutrient", skip_serializing_if = "Option::is_none")]
    pub potassium: Option<NutrientStatus>,
    #[serde(deserialize_with = "lenient_nutrient", skip_serializing_if = "Option::is_none")]
    pub calcium: Option<NutrientStatus>,
    #[serde(deserialize_with = "lenient_nutrient", skip_serializing_if = "Option::is_none")]
    pub magnesium: Option<NutrientStatus>,
    #[serde(deserialize_with = "lenient_nutrient", skip_serializing_if = "Option::is_none")]
    pub sulfur: Option<NutrientStatus>,
    #[serde(deserialize_with = "lenient_object", skip_serializing_if = "Option::is_none")]
    pub micronutrients: Option<Map<String, Value>>,
}

impl NutrientAnalysis {
    /// N, P, K, then Ca, Mg, S
    pub fn ordered(&self) -> [(Nutrient, Option<&NutrientStatus>); 6] {
        [
            (Nutrient::Nitrogen, self.nitrogen.as_ref()),
            (Nutrient::Phosphorus, self.phosphorus.as_ref()),
            (Nutrient::Potassium, self.potassium.as_ref()),
            (Nutrient::Calcium, self.calcium.as_ref()),
            (Nutrient::Magnesium, self.magnesium.as_ref()),
            (Nutrient::Sulfur, self.sulfur.as_ref()),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nutrient {
    Nitrogen,
    Phosphorus,
    Potassium,
    Calcium,
    Magnesium,
    Sulfur,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NutrientStatus {
    #[serde(deserialize_with = "lenient_level", skip_serializing_if = "Option::is_none")]
    pub level: Option<NutrientLevel>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub remedy: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NutrientStatus {
    /// Missing levels read as adequate
    pub fn level_or_default(&self) -> NutrientLevel {
        self.level.unwrap_or_default()
    }
}

/// Nutrient level as reported by the model
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(from = "String", into = "String")]
pub enum NutrientLevel {
    High,
    #[default]
    Adequate,
    Low,
    Deficient,
}

impl NutrientLevel {
    pub fn is_deficient(&self) -> bool {
        matches!(self, NutrientLevel::Low | NutrientLevel::Deficient)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NutrientLevel::High => "high",
            NutrientLevel::Adequate => "adequate",
            NutrientLevel::Low => "low",
            NutrientLevel::Deficient => "deficient",
        }
    }
}

impl From<String> for NutrientLevel {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "high" | "very high" | "excessive" | "excess" => NutrientLevel::High,
            "low" => NutrientLevel::Low,
            "deficient" | "very low" | "deficiency" => NutrientLevel::Deficient,
            _ => NutrientLevel::Adequate,
        }
    }
}

impl From<NutrientLevel> for String {
    fn from(level: NutrientLevel) -> Self {
        level.as_str().to_string()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OrganicMatter {
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub percentage_estimate: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DrainageAssessment {
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub issues: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CropSuitability {
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub crop: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub suitability: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub yield_potential: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CropAvoidance {
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub crop: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Amendment {
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub amendment: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub application_rate: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub application_method: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub timing: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub cost_estimate: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub organic_option: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ImprovementPlan {
    #[serde(deserialize_with = "lenient_string_list", skip_serializing_if = "Option::is_none")]
    pub immediate: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient_string_list", skip_serializing_if = "Option::is_none")]
    pub short_term: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient_string_list", skip_serializing_if = "Option::is_none")]
    pub long_term: Option<Vec<String>>,
}

// ============================================================================
// Lenient reading
// ============================================================================

/// A report section the model may send as an object or as a bare value
trait Section: DeserializeOwned {
    /// Build the section from a bare value standing in for its main field
    fn from_text(text: String) -> Option<Self>;
}

impl Section for SoilHealthScore {
    fn from_text(text: String) -> Option<Self> {
        parse_number(&text).map(|overall| SoilHealthScore {
            overall: Some(overall),
            ..Default::default()
        })
    }
}

impl Section for PhAssessment {
    fn from_text(text: String) -> Option<Self> {
        Some(PhAssessment {
            estimated_ph: Some(text),
            ..Default::default()
        })
    }
}

impl Section for NutrientAnalysis {
    fn from_text(_text: String) -> Option<Self> {
        None
    }
}

impl Section for NutrientStatus {
    fn from_text(text: String) -> Option<Self> {
        Some(NutrientStatus {
            level: Some(NutrientLevel::from(text)),
            ..Default::default()
        })
    }
}

impl Section for OrganicMatter {
    fn from_text(text: String) -> Option<Self> {
        Some(OrganicMatter {
            level: Some(text),
            ..Default::default()
        })
    }
}

impl Section for DrainageAssessment {
    fn from_text(text: String) -> Option<Self> {
        Some(DrainageAssessment {
            quality: Some(text),
            ..Default::default()
        })
    }
}

impl Section for CropSuitability {
    fn from_text(text: String) -> Option<Self> {
        Some(CropSuitability {
            crop: Some(text),
            ..Default::default()
        })
    }
}

impl Section for CropAvoidance {
    fn from_text(text: String) -> Option<Self> {
        Some(CropAvoidance {
            crop: Some(text),
            ..Default::default()
        })
    }
}

impl Section for Amendment {
    fn from_text(text: String) -> Option<Self> {
        Some(Amendment {
            amendment: Some(text),
            ..Default::default()
        })
    }
}

impl Section for ImprovementPlan {
    fn from_text(text: String) -> Option<Self> {
        Some(ImprovementPlan {
            immediate: Some(vec![text]),
            ..Default::default()
        })
    }
}

/// Hands the value back when it has no usable shape
fn parse_section<T: Section>(value: Value) -> Result<T, Value> {
    match value {
        Value::Object(_) => serde_json::from_value(value.clone()).map_err(|_| value),
        Value::Array(_) | Value::Null => Err(value),
        other => match value_to_string(other.clone()).and_then(T::from_text) {
            Some(section) => Ok(section),
            None => Err(other),
        },
    }
}

fn keep_unparsed(fields: &mut BTreeMap<String, Value>, key: &str, raw: Value) {
    fields.insert(format!("{}_unparsed", key), raw);
}

fn take_text(fields: &mut BTreeMap<String, Value>, key: &str) -> Option<String> {
    match fields.remove(key)? {
        Value::Null => None,
        value @ (Value::Array(_) | Value::Object(_)) => {
            keep_unparsed(fields, key, value);
            None
        }
        value => value_to_string(value),
    }
}

fn take_section<T: Section>(fields: &mut BTreeMap<String, Value>, key: &str) -> Option<T> {
    let value = fields.remove(key)?;
    if value.is_null() {
        return None;
    }
    match parse_section(value) {
        Ok(section) => Some(section),
        Err(raw) => {
            keep_unparsed(fields, key, raw);
            None
        }
    }
}

/// A single item stands for a one-item list; unreadable items are kept aside
fn take_list<T: Section>(fields: &mut BTreeMap<String, Value>, key: &str) -> Option<Vec<T>> {
    let items = match fields.remove(key)? {
        Value::Null => return None,
        Value::Array(items) => items,
        single => vec![single],
    };

    let mut parsed = Vec::with_capacity(items.len());
    let mut rejected = Vec::new();
    for item in items {
        match parse_section(item) {
            Ok(section) => parsed.push(section),
            Err(raw) => rejected.push(raw),
        }
    }
    if !rejected.is_empty() {
        keep_unparsed(fields, key, Value::Array(rejected));
    }
    Some(parsed)
}

/// Accept strings, numbers and booleans where the model was asked for text
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(value_to_string))
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => parse_number(&s),
        _ => None,
    })
}

/// A single string becomes a one-item list; non-text items are dropped
fn lenient_string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => Some(items.into_iter().filter_map(value_to_string).collect()),
        Some(other) => value_to_string(other).map(|s| vec![s]),
        None => None,
    })
}

fn lenient_level<'de, D>(deserializer: D) -> Result<Option<NutrientLevel>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?.map(NutrientLevel::from))
}

/// `"low"` reads as `{"level": "low"}`; other shapes are dropped
fn lenient_nutrient<'de, D>(deserializer: D) -> Result<Option<NutrientStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(|value| parse_section(value).ok()))
}

fn lenient_object<'de, D>(deserializer: D) -> Result<Option<Map<String, Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Object(map)) => Some(map),
        _ => None,
    })
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().trim_end_matches('%').trim().parse().ok()
}

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
