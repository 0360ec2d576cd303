//! Voice-assistant surface. Everything here answers with speech and a 200;
//! the voice platform has no error-code channel.

use crate::locations::{self, Location};
use crate::orchestrator::Aggregator;
use crate::recommend::Mode;
use crate::upstream::types::SewageState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Spoken name -> slug, for names that slugification alone can't catch.
static ALIASES: &[(&str, &str)] = &[
    ("barry", "barry-island"),
    ("whistling sands", "porth-oer"),
    ("tenby", "tenby-south"),
    ("gyllyngvase", "falmouth-gyllyngvase"),
    ("broad haven", "broad-haven-north"),
    ("coney beach", "porthcawl"),
    ("three cliffs", "three-cliffs"),
    ("worms head", "rhossili"),
];

/// Suffixes dropped when a spoken name doesn't resolve directly.
const STRIP_SUFFIXES: &[&str] = &[" island", " bay", " cove", " beach", " sands"];

#[derive(Debug, Deserialize)]
pub struct AlexaEnvelope {
    pub request: AlexaRequest,
}

#[derive(Debug, Deserialize)]
pub struct AlexaRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub intent: Option<AlexaIntent>,
}

#[derive(Debug, Deserialize)]
pub struct AlexaIntent {
    pub name: String,
    #[serde(default)]
    pub slots: HashMap<String, AlexaSlot>,
}

#[derive(Debug, Deserialize)]
pub struct AlexaSlot {
    pub value: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AlexaResponse {
    pub version: &'static str,
    pub response: AlexaResponseBody,
}

#[derive(Debug, Serialize)]
pub struct AlexaResponseBody {
    #[serde(rename = "outputSpeech")]
    pub output_speech: OutputSpeech,
    #[serde(rename = "shouldEndSession")]
    pub should_end_session: bool,
}

#[derive(Debug, Serialize)]
pub struct OutputSpeech {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
}

pub fn speech(text: impl Into<String>, end_session: bool) -> AlexaResponse {
    AlexaResponse {
        version: "1.0",
        response: AlexaResponseBody {
            output_speech: OutputSpeech {
                kind: "PlainText",
                text: text.into(),
            },
            should_end_session: end_session,
        },
    }
}

fn lookup(normalized: &str) -> Option<&'static Location> {
    let slugified = normalized.split_whitespace().collect::<Vec<_>>().join("-");
    if let Some(beach) = locations::find(&slugified) {
        return Some(beach);
    }
    if let Some(beach) = locations::all()
        .iter()
        .find(|b| b.name.to_lowercase() == normalized)
    {
        return Some(beach);
    }
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .and_then(|(_, slug)| locations::find(slug))
}

/// Resolve a spoken location to a beach: direct slug, display name, alias
/// table, then the same again with a common suffix stripped.
pub fn resolve_spoken_location(spoken: &str) -> Option<&'static Location> {
    let normalized = spoken.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }

    if let Some(beach) = lookup(&normalized) {
        return Some(beach);
    }

    for suffix in STRIP_SUFFIXES {
        if let Some(stripped) = normalized.strip_suffix(suffix) {
            if let Some(beach) = lookup(stripped) {
                return Some(beach);
            }
        }
    }

    None
}

/// Turn an intent payload into a speech response. Never errors: anything
/// unrecognized or broken becomes a polite spoken fallback.
pub async fn handle(aggregator: &Aggregator, payload: serde_json::Value) -> AlexaResponse {
    let envelope: AlexaEnvelope = match serde_json::from_value(payload) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!("Malformed voice payload: {}", e);
            return speech("Something went wrong.", true);
        }
    };

    match envelope.request.kind.as_str() {
        "LaunchRequest" => speech("Welcome to Shorecast. Ask me about any beach.", false),
        "IntentRequest" => {
            let intent = match envelope.request.intent {
                Some(intent) => intent,
                None => return speech("Sorry, didn't understand.", true),
            };
            match intent.name.as_str() {
                "GetConditionsIntent" => {
                    let spoken = intent
                        .slots
                        .get("location")
                        .and_then(|slot| slot.value.clone());
                    let Some(spoken) = spoken else {
                        return speech("Which beach?", false);
                    };
                    match resolve_spoken_location(&spoken) {
                        Some(beach) => conditions_speech(aggregator, beach).await,
                        None => speech(format!("Sorry, I don't have {}.", spoken), true),
                    }
                }
                _ => speech("Sorry, didn't understand.", true),
            }
        }
        _ => speech("Sorry, didn't understand.", true),
    }
}

async fn conditions_speech(aggregator: &Aggregator, beach: &Location) -> AlexaResponse {
    let response = match aggregator.single(beach.slug, Mode::Swimming).await {
        Ok(response) => response,
        Err(_) => return speech("Sorry, couldn't fetch conditions.", true),
    };

    let water = match response.sea_temp_c {
        Some(temp) => format!("Water {} degrees.", temp.round()),
        None => "Water temperature unavailable.".to_string(),
    };
    let tide = if response.tide.is_known() {
        format!(
            "{} tide at {}.",
            capitalize(response.tide.kind.as_str()),
            response.tide.time
        )
    } else {
        "Tide times unavailable.".to_string()
    };
    let sewage = match response.sewage.status {
        SewageState::Clear => "No sewage alerts.",
        _ => "Check sewage status.",
    };

    speech(
        format!(
            "{}. {} Waves {:.1} metres. {} {}",
            beach.name, water, response.wave_height_m, tide, sewage
        ),
        true,
    )
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_exact_name() {
        assert_eq!(
            resolve_spoken_location("Barry Island").unwrap().slug,
            "barry-island"
        );
        assert_eq!(
            resolve_spoken_location("Lligwy Bay").unwrap().slug,
            "lligwy"
        );
    }

    #[test]
    fn test_resolves_alias() {
        assert_eq!(resolve_spoken_location("barry").unwrap().slug, "barry-island");
        assert_eq!(
            resolve_spoken_location("Whistling Sands").unwrap().slug,
            "porth-oer"
        );
        assert_eq!(resolve_spoken_location("Tenby").unwrap().slug, "tenby-south");
    }

    #[test]
    fn test_resolves_by_stripping_suffix() {
        // "rhossili bay" isn't a slug or a display name, but "rhossili" is.
        assert_eq!(
            resolve_spoken_location("Rhossili Bay").unwrap().slug,
            "rhossili"
        );
        assert_eq!(
            resolve_spoken_location("swansea beach").unwrap().slug,
            "swansea"
        );
    }

    #[test]
    fn test_unknown_location_is_none() {
        assert!(resolve_spoken_location("Bondi").is_none());
        assert!(resolve_spoken_location("").is_none());
    }

    #[test]
    fn test_speech_envelope_shape() {
        let response = speech("hello", true);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["version"], "1.0");
        assert_eq!(json["response"]["outputSpeech"]["type"], "PlainText");
        assert_eq!(json["response"]["outputSpeech"]["text"], "hello");
        assert_eq!(json["response"]["shouldEndSession"], true);
    }
}
