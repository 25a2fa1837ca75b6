//! Canned analysis substituted when the remote call does not complete normally

use crate::{
    dispatcher::Endpoint,
    models::{AnalysisResult, ComplexTerms},
};

/// Stated on a 0-100 scale, unlike remote scores in `[0, 1]`
pub const SYNTHETIC_CONFIDENCE: f64 = 85.0;

/// Deterministic result keyed only by the file category of `endpoint`
pub fn synthetic_analysis(endpoint: Endpoint) -> AnalysisResult {
    AnalysisResult {
        success: true,
        summary: format!(
            "This is a mock analysis for {} file. In a real scenario, this would contain \
             AI-generated insights from your medical report.",
            endpoint.file_category()
        ),
        key_findings: strings(&[
            "Sample finding 1: Normal blood pressure readings",
            "Sample finding 2: Cholesterol levels within normal range",
            "Sample finding 3: Blood sugar levels are optimal",
        ]),
        lifestyle_recommendations: strings(&[
            "Continue regular exercise routine",
            "Maintain balanced diet",
            "Get adequate sleep (7-9 hours per night)",
        ]),
        precautions: strings(&[
            "Schedule regular check-ups",
            "Monitor any changes in symptoms",
            "Consult healthcare provider for concerns",
        ]),
        confidence_score: SYNTHETIC_CONFIDENCE,
        complex_terms: ComplexTerms::from_iter([
            ("Blood Pressure", "The force of blood against artery walls"),
            (
                "Cholesterol",
                "A waxy substance in blood that can affect heart health",
            ),
            ("Blood Sugar", "Glucose levels in the bloodstream"),
        ]),
        error_message: None,
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
