//! Category normalization into canonical capability tags

/// Free-text category label (lowercase) to canonical capability tag
const TAXONOMY: &[(&str, &str)] = &[
    ("maintenance", "predictive-maintenance"),
    ("predictive maintenance", "predictive-maintenance"),
    ("asset maintenance", "predictive-maintenance"),
    ("forecasting", "demand-forecasting"),
    ("forecast", "demand-forecasting"),
    ("demand forecasting", "demand-forecasting"),
    ("demand planning", "demand-forecasting"),
    ("quality", "quality-inspection"),
    ("quality control", "quality-inspection"),
    ("quality inspection", "quality-inspection"),
    ("visual inspection", "quality-inspection"),
    ("defect detection", "quality-inspection"),
    ("anomaly", "anomaly-detection"),
    ("anomaly detection", "anomaly-detection"),
    ("fraud", "fraud-detection"),
    ("fraud detection", "fraud-detection"),
    ("optimization", "process-optimization"),
    ("process optimization", "process-optimization"),
    ("inventory", "inventory-optimization"),
    ("inventory optimization", "inventory-optimization"),
    ("supply chain", "supply-chain-optimization"),
    ("supply chain optimization", "supply-chain-optimization"),
    ("logistics", "supply-chain-optimization"),
    ("segmentation", "customer-segmentation"),
    ("customer segmentation", "customer-segmentation"),
    ("customer analytics", "customer-segmentation"),
    ("churn", "churn-prediction"),
    ("churn prediction", "churn-prediction"),
    ("pricing", "pricing-optimization"),
    ("dynamic pricing", "pricing-optimization"),
    ("price optimization", "pricing-optimization"),
    ("nlp", "document-intelligence"),
    ("document processing", "document-intelligence"),
    ("document understanding", "document-intelligence"),
    ("text analytics", "document-intelligence"),
    ("vision", "computer-vision"),
    ("computer vision", "computer-vision"),
    ("image recognition", "computer-vision"),
    ("recommendation", "recommendation-engine"),
    ("recommendations", "recommendation-engine"),
    ("recommendation engine", "recommendation-engine"),
    ("energy", "energy-optimization"),
    ("energy optimization", "energy-optimization"),
    ("scheduling", "production-scheduling"),
    ("production scheduling", "production-scheduling"),
    ("risk", "risk-assessment"),
    ("risk management", "risk-assessment"),
    ("risk assessment", "risk-assessment"),
    ("chatbot", "conversational-ai"),
    ("virtual assistant", "conversational-ai"),
    ("conversational ai", "conversational-ai"),
];

/// Map a free-text category to its canonical capability tag
///
/// Unmapped labels come back lowercased and trimmed. They are not errors;
/// they simply match no module capability later on.
pub fn normalize(category: &str) -> String {
    let key = category.trim().to_lowercase();

    TAXONOMY
        .iter()
        .find(|(label, _)| *label == key)
        .map(|(_, tag)| (*tag).to_string())
        .unwrap_or(key)
}
