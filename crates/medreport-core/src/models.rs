//! Data carried between the upload, the remote service and the presentation layer

use std::{fmt, path::Path, sync::Arc};

use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};

/// A file picked by the user. Replaced wholesale on a new selection.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    name: String,
    size: u64,
    mime_type: String,
    contents: Arc<[u8]>,
}

impl UploadedFile {
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        contents: impl Into<Vec<u8>>,
    ) -> Self {
        let contents: Vec<u8> = contents.into();
        Self {
            name: name.into(),
            size: contents.len() as u64,
            mime_type: mime_type.into(),
            contents: contents.into(),
        }
    }

    /// Read a file from disk, guessing its MIME type from the extension
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read(path).await?;
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self::new(name, mime.essence_str(), contents))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }
}

/// Structured summary returned by `/analyze/image` and `/analyze/pdf`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub success: bool,
    pub summary: String,
    pub key_findings: Vec<String>,
    pub lifestyle_recommendations: Vec<String>,
    pub precautions: Vec<String>,
    /// Expected in `[0, 1]` for remote results; see [`AnalysisResult::confidence_in_unit_range`]
    pub confidence_score: f64,
    #[serde(default, deserialize_with = "nullable_terms")]
    pub complex_terms: ComplexTerms,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl AnalysisResult {
    pub fn confidence_in_unit_range(&self) -> bool {
        (0.0..=1.0).contains(&self.confidence_score)
    }
}

fn nullable_terms<'de, D>(deserializer: D) -> Result<ComplexTerms, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<ComplexTerms>::deserialize(deserializer)?.unwrap_or_default())
}

/// Term -> plain-language explanation, iterated in insertion order.
///
/// Keys are unique: inserting an existing term replaces its explanation in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComplexTerms {
    entries: Vec<(String, String)>,
}

impl ComplexTerms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; returns the previous explanation
    pub fn insert(&mut self, term: impl Into<String>, explanation: impl Into<String>) -> Option<String> {
        let term = term.into();
        let explanation = explanation.into();
        match self.entries.iter_mut().find(|(t, _)| *t == term) {
            Some((_, existing)) => Some(std::mem::replace(existing, explanation)),
            None => {
                self.entries.push((term, explanation));
                None
            }
        }
    }

    pub fn get(&self, term: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t == term)
            .map(|(_, e)| e.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(t, e)| (t.as_str(), e.as_str()))
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(t, _)| t.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ComplexTerms {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut terms = ComplexTerms::new();
        for (k, v) in iter {
            terms.insert(k, v);
        }
        terms
    }
}

impl Serialize for ComplexTerms {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (term, explanation) in &self.entries {
            map.serialize_entry(term, explanation)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ComplexTerms {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TermsVisitor;

        impl<'de> Visitor<'de> for TermsVisitor {
            type Value = ComplexTerms;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of term to explanation")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut terms = ComplexTerms::new();
                while let Some((term, explanation)) = access.next_entry::<String, String>()? {
                    terms.insert(term, explanation);
                }
                Ok(terms)
            }
        }

        deserializer.deserialize_map(TermsVisitor)
    }
}

/// Body of `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}
