//! Localized advice text for English, Hindi and Telugu

use crate::models::{Nutrient, NutrientLevel, ScoreRating};
use crate::types::Language;

/// Fixed advice sentences
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phrase {
    PostponeIrrigation,
    CheckWaterlogging,
    IncreaseWatering,
    WaterEarlyOrEvening,
    MonitorSoilMoisture,
    FertilizerWindow,
    PestWatch,
    FungalWatch,
    DefaultRemedy,
}

impl Phrase {
    pub fn text(self, language: Language) -> &'static str {
        use Language::*;
        match (self, language) {
            (Phrase::PostponeIrrigation, English) => "Postpone irrigation - natural rainfall expected",
            (Phrase::PostponeIrrigation, Hindi) => "सिंचाई स्थगित करें - प्राकृतिक वर्षा की संभावना है",
            (Phrase::PostponeIrrigation, Telugu) => "నీటిపారుదల వాయిదా వేయండి - సహజ వర్షం వచ్చే అవకాశం ఉంది",

            (Phrase::CheckWaterlogging, English) => "Check fields for waterlogging",
            (Phrase::CheckWaterlogging, Hindi) => "खेतों में जलभराव की जाँच करें",
            (Phrase::CheckWaterlogging, Telugu) => "పొలాల్లో నీరు నిలిచిపోవడాన్ని తనిఖీ చేయండి",

            (Phrase::IncreaseWatering, English) => "High temperature - increase watering frequency",
            (Phrase::IncreaseWatering, Hindi) => "उच्च तापमान - सिंचाई की आवृत्ति बढ़ाएँ",
            (Phrase::IncreaseWatering, Telugu) => "అధిక ఉష్ణోగ్రత - నీరు పెట్టే సార్లు పెంచండి",

            (Phrase::WaterEarlyOrEvening, English) => "Water crops early morning (5-7 AM) or in the evening",
            (Phrase::WaterEarlyOrEvening, Hindi) => "फसलों को सुबह जल्दी (5-7 बजे) या शाम को पानी दें",
            (Phrase::WaterEarlyOrEvening, Telugu) => "పంటలకు తెల్లవారుజామున (5-7 గంటలు) లేదా సాయంత్రం నీరు పెట్టండి",

            (Phrase::MonitorSoilMoisture, English) => "Low humidity - monitor soil moisture closely",
            (Phrase::MonitorSoilMoisture, Hindi) => "कम आर्द्रता - मिट्टी की नमी पर कड़ी नज़र रखें",
            (Phrase::MonitorSoilMoisture, Telugu) => "తక్కువ తేమ - నేల తేమను జాగ్రత్తగా గమనించండి",

            (Phrase::FertilizerWindow, English) => "Ideal conditions for fertilizer application",
            (Phrase::FertilizerWindow, Hindi) => "उर्वरक डालने के लिए आदर्श परिस्थितियाँ",
            (Phrase::FertilizerWindow, Telugu) => "ఎరువులు వేయడానికి అనుకూల పరిస్థితులు",

            (Phrase::PestWatch, English) => "Warm weather - monitor for pest activity",
            (Phrase::PestWatch, Hindi) => "गर्म मौसम - कीटों की गतिविधि पर नज़र रखें",
            (Phrase::PestWatch, Telugu) => "వెచ్చని వాతావరణం - పురుగుల కదలికలను గమనించండి",

            (Phrase::FungalWatch, English) => "Cool weather - check for fungal diseases",
            (Phrase::FungalWatch, Hindi) => "ठंडा मौसम - फफूंद रोगों की जाँच करें",
            (Phrase::FungalWatch, Telugu) => "చల్లని వాతావరణం - శిలీంధ్ర వ్యాధుల కోసం తనిఖీ చేయండి",

            (Phrase::DefaultRemedy, English) => "apply a balanced fertilizer",
            (Phrase::DefaultRemedy, Hindi) => "संतुलित उर्वरक डालें",
            (Phrase::DefaultRemedy, Telugu) => "సమతుల్య ఎరువు వేయండి",
        }
    }
}

pub fn nutrient_name(nutrient: Nutrient, language: Language) -> &'static str {
    use Language::*;
    match (nutrient, language) {
        (Nutrient::Nitrogen, English) => "Nitrogen",
        (Nutrient::Nitrogen, Hindi) => "नाइट्रोजन",
        (Nutrient::Nitrogen, Telugu) => "నత్రజని",
        (Nutrient::Phosphorus, English) => "Phosphorus",
        (Nutrient::Phosphorus, Hindi) => "फॉस्फोरस",
        (Nutrient::Phosphorus, Telugu) => "భాస్వరం",
        (Nutrient::Potassium, English) => "Potassium",
        (Nutrient::Potassium, Hindi) => "पोटैशियम",
        (Nutrient::Potassium, Telugu) => "పొటాషియం",
        (Nutrient::Calcium, English) => "Calcium",
        (Nutrient::Calcium, Hindi) => "कैल्शियम",
        (Nutrient::Calcium, Telugu) => "కాల్షియం",
        (Nutrient::Magnesium, English) => "Magnesium",
        (Nutrient::Magnesium, Hindi) => "मैग्नीशियम",
        (Nutrient::Magnesium, Telugu) => "మెగ్నీషియం",
        (Nutrient::Sulfur, English) => "Sulfur",
        (Nutrient::Sulfur, Hindi) => "सल्फर",
        (Nutrient::Sulfur, Telugu) => "గంధకం",
    }
}

pub fn level_name(level: NutrientLevel, language: Language) -> &'static str {
    use Language::*;
    match (level, language) {
        (NutrientLevel::High, English) => "high",
        (NutrientLevel::High, Hindi) => "अधिक",
        (NutrientLevel::High, Telugu) => "ఎక్కువ",
        (NutrientLevel::Adequate, English) => "adequate",
        (NutrientLevel::Adequate, Hindi) => "पर्याप्त",
        (NutrientLevel::Adequate, Telugu) => "సరిపడా",
        (NutrientLevel::Low, English) => "low",
        (NutrientLevel::Low, Hindi) => "कम",
        (NutrientLevel::Low, Telugu) => "తక్కువ",
        (NutrientLevel::Deficient, English) => "deficient",
        (NutrientLevel::Deficient, Hindi) => "की कमी",
        (NutrientLevel::Deficient, Telugu) => "లోపం",
    }
}

/// Task line for a nutrient shortfall, e.g. "Nitrogen low: apply urea"
pub fn nutrient_task(
    nutrient: Nutrient,
    level: NutrientLevel,
    remedy: Option<&str>,
    language: Language,
) -> String {
    let remedy = remedy
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| Phrase::DefaultRemedy.text(language));
    format!(
        "{} {}: {}",
        nutrient_name(nutrient, language),
        level_name(level, language),
        remedy
    )
}

pub fn rating_name(rating: ScoreRating, language: Language) -> &'static str {
    use Language::*;
    match (rating, language) {
        (ScoreRating::Excellent, English) => "Excellent",
        (ScoreRating::Excellent, Hindi) => "उत्कृष्ट",
        (ScoreRating::Excellent, Telugu) => "అద్భుతం",
        (ScoreRating::Good, English) => "Good",
        (ScoreRating::Good, Hindi) => "अच्छी",
        (ScoreRating::Good, Telugu) => "మంచిది",
        (ScoreRating::Fair, English) => "Fair",
        (ScoreRating::Fair, Hindi) => "सामान्य",
        (ScoreRating::Fair, Telugu) => "సాధారణం",
        (ScoreRating::Poor, English) => "Poor",
        (ScoreRating::Poor, Hindi) => "खराब",
        (ScoreRating::Poor, Telugu) => "అననుకూలం",
    }
}

/// "{condition}, 28°C, humidity 60%, wind 12 km/h. Farming conditions: Good"
pub fn conditions_summary(
    condition: &str,
    temperature: f64,
    humidity: f64,
    wind_speed: f64,
    rating: ScoreRating,
    language: Language,
) -> String {
    let (humidity_word, wind_word, speed_unit, conditions_word) = match language {
        Language::English => ("humidity", "wind", "km/h", "Farming conditions"),
        Language::Hindi => ("आर्द्रता", "हवा", "किमी/घं", "खेती की स्थिति"),
        Language::Telugu => ("తేమ", "గాలి", "కి.మీ/గం", "వ్యవసాయ పరిస్థితులు"),
    };
    let condition = if condition.trim().is_empty() {
        "-"
    } else {
        condition.trim()
    };

    format!(
        "{}, {:.0}°C, {} {:.0}%, {} {:.0} {}. {}: {}",
        condition,
        temperature,
        humidity_word,
        humidity,
        wind_word,
        wind_speed,
        speed_unit,
        conditions_word,
        rating_name(rating, language)
    )
}

/// Weather bands used to pick activity windows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityBand {
    Rainy,
    VeryHot,
    Warm,
    Mild,
    Cold,
}

/// Two (activity, window) pairs per band
pub fn activities(band: ActivityBand, language: Language) -> [(&'static str, &'static str); 2] {
    use Language::*;
    match (band, language) {
        (ActivityBand::Rainy, English) => [
            ("Field drainage check", "After the rain stops"),
            ("Seed and tool preparation", "During rainfall"),
        ],
        (ActivityBand::Rainy, Hindi) => [
            ("खेत की जल निकासी जाँच", "बारिश रुकने के बाद"),
            ("बीज और औज़ार की तैयारी", "वर्षा के दौरान"),
        ],
        (ActivityBand::Rainy, Telugu) => [
            ("పొలం నీటి పారుదల తనిఖీ", "వర్షం ఆగిన తర్వాత"),
            ("విత్తనాలు, పనిముట్ల సిద్ధం", "వర్షం సమయంలో"),
        ],
        (ActivityBand::VeryHot, English) => [
            ("Watering", "5-7 AM or after 6 PM"),
            ("Spraying and field work", "Avoid 11 AM - 4 PM"),
        ],
        (ActivityBand::VeryHot, Hindi) => [
            ("सिंचाई", "सुबह 5-7 बजे या शाम 6 बजे के बाद"),
            ("छिड़काव और खेत का काम", "सुबह 11 से शाम 4 बजे तक न करें"),
        ],
        (ActivityBand::VeryHot, Telugu) => [
            ("నీటి పారుదల", "ఉదయం 5-7 లేదా సాయంత్రం 6 తర్వాత"),
            ("పిచికారీ, పొలం పనులు", "ఉదయం 11 - సాయంత్రం 4 మధ్య వద్దు"),
        ],
        (ActivityBand::Warm, English) => [
            ("Fertilizer application", "7-10 AM"),
            ("Watering", "Early morning"),
        ],
        (ActivityBand::Warm, Hindi) => [
            ("उर्वरक डालना", "सुबह 7-10 बजे"),
            ("सिंचाई", "सुबह जल्दी"),
        ],
        (ActivityBand::Warm, Telugu) => [
            ("ఎరువులు వేయడం", "ఉదయం 7-10"),
            ("నీటి పారుదల", "తెల్లవారుజామున"),
        ],
        (ActivityBand::Mild, English) => [
            ("Planting and transplanting", "Morning or late afternoon"),
            ("Pest scouting", "Midday"),
        ],
        (ActivityBand::Mild, Hindi) => [
            ("बुवाई और रोपाई", "सुबह या देर दोपहर"),
            ("कीट निरीक्षण", "दोपहर"),
        ],
        (ActivityBand::Mild, Telugu) => [
            ("విత్తడం, నాట్లు వేయడం", "ఉదయం లేదా మధ్యాహ్నం చివర"),
            ("పురుగుల పరిశీలన", "మధ్యాహ్నం"),
        ],
        (ActivityBand::Cold, English) => [
            ("Mulching against frost", "Evening"),
            ("Field work", "Midday, when warmest"),
        ],
        (ActivityBand::Cold, Hindi) => [
            ("पाले से बचाव हेतु मल्चिंग", "शाम"),
            ("खेत का काम", "दोपहर, जब सबसे गर्म हो"),
        ],
        (ActivityBand::Cold, Telugu) => [
            ("మంచు నుండి రక్షణకు మల్చింగ్", "సాయంత్రం"),
            ("పొలం పనులు", "మధ్యాహ్నం, వెచ్చగా ఉన్నప్పుడు"),
        ],
    }
}
