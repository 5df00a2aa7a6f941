//! Practice tips: the prompt, JSON extraction from model text, and the
//! instrument- and period-based defaults.

use cadenza_core::catalog::DifficultyBand;
use serde::{Deserialize, Serialize};

use crate::{Error, Result, TipsRequest};

/// Three short pieces of advice for one piece.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeTips {
  pub technical_focus:   String,
  pub practice_schedule: String,
  pub interpretation:    String,
}

const DEFAULT_SCHEDULE: &str = "Divide the piece into sections and focus on one section per \
  practice session. Spend 15-20 minutes on technical challenges, then work on musicality and \
  expression. Review previously learned sections regularly to maintain progress.";

impl PracticeTips {
  /// Tips chosen from the piece's instrument and period.
  pub fn defaults(instrument: Option<&str>, period: Option<&str>) -> Self {
    Self {
      technical_focus:   default_technical_focus(instrument).to_owned(),
      practice_schedule: DEFAULT_SCHEDULE.to_owned(),
      interpretation:    default_interpretation(period).to_owned(),
    }
  }

  /// Generic tips for when the upstream cannot be reached at all.
  pub fn fallback() -> Self {
    Self {
      technical_focus:   "Focus on identifying the challenging sections and practice them \
        slowly with a metronome. Gradually increase the tempo as you become more comfortable. \
        Pay attention to fingering, articulation, and dynamics."
        .to_owned(),
      practice_schedule: DEFAULT_SCHEDULE.to_owned(),
      interpretation:    "Listen to recordings by different performers to develop your own \
        interpretation. Pay attention to the historical context and performance practices of \
        the period. Balance technical precision with emotional expression."
        .to_owned(),
    }
  }
}

fn default_technical_focus(instrument: Option<&str>) -> &'static str {
  let instrument = instrument.map(str::to_lowercase).unwrap_or_default();
  if instrument.contains("piano") {
    "Focus on hand independence and voicing. Pay attention to pedaling, especially in legato \
     passages. Practice hands separately before combining them, and use a metronome to maintain \
     steady rhythm."
  } else if instrument.contains("violin") {
    "Work on intonation and bow control. Practice string crossings slowly and use open strings to \
     check your pitch. Focus on producing a clean, resonant tone and pay attention to bow \
     distribution."
  } else if instrument.contains("voice") {
    "Focus on breath control and support. Pay attention to diction and text clarity. Practice \
     difficult passages on a neutral syllable before adding text, and work on maintaining \
     consistent tone throughout your range."
  } else {
    "Break down difficult passages and practice them slowly. Focus on tone production and \
     articulation. Use a metronome to ensure rhythmic accuracy, and gradually increase the tempo \
     as you become more comfortable."
  }
}

fn default_interpretation(period: Option<&str>) -> &'static str {
  match period {
    Some("Baroque") => {
      "Focus on clear articulation and limited use of pedal or vibrato. Pay attention to \
       ornaments and consider the dance-like qualities of the music. Emphasize the terraced \
       dynamics characteristic of Baroque music."
    }
    Some("Classical") => {
      "Aim for clarity, balanced phrasing, and controlled dynamics. Observe the structural \
       elements and highlight the thematic development. Maintain a steady pulse while allowing \
       for subtle flexibility in tempo."
    }
    Some("Romantic") => {
      "Express emotion through rubato and dynamic contrast. Focus on the singing quality of the \
       melodic lines and the rich harmonic colors. Allow for more personal expression while \
       respecting the composer's intentions."
    }
    Some("Modern" | "Contemporary") => {
      "Pay careful attention to the composer's specific notations and instructions. Explore the \
       unique sound world of the piece, which may include extended techniques. Balance precision \
       with the expressive elements indicated in the score."
    }
    _ => {
      "Balance authenticity with your personal artistic voice. Research performance practices of \
       the period while bringing your own interpretation. Focus on communicating the emotional \
       content of the music to your audience."
    }
  }
}

pub const TIPS_SYSTEM_PROMPT: &str = "You are an expert classical music teacher. \
  Answer with a single JSON object and nothing else.";

pub fn tips_prompt(req: &TipsRequest) -> String {
  let level = req
    .difficulty
    .map(DifficultyBand::of)
    .unwrap_or(DifficultyBand::Intermediate)
    .as_str();
  format!(
    "Please provide three specific practice tips for a student learning \"{title}\" by {composer}.\n\
     \n\
     The piece is for {instrument}, from the {period} period, in the {genre} genre, and is \
     considered {level} level difficulty.\n\
     \n\
     Format your response as a JSON object with these three keys:\n\
     1. \"technicalFocus\": A specific technical aspect to focus on for this piece (100-150 words)\n\
     2. \"practiceSchedule\": A recommended practice schedule for this piece (100-150 words)\n\
     3. \"interpretation\": Tips on how to interpret this piece authentically (100-150 words)\n\
     \n\
     Keep each tip concise, specific to this piece, and directly applicable.",
    title = req.piece_title,
    composer = req.composer.as_deref().unwrap_or("an unknown composer"),
    instrument = req.instrument.as_deref().unwrap_or("piano"),
    period = req.period.as_deref().unwrap_or("unknown"),
    genre = req.genre.as_deref().unwrap_or("classical"),
  )
}

/// Parse the span from the first `{` to the last `}` of `text`.
pub fn extract_tips(text: &str) -> Result<PracticeTips> {
  let start = text.find('{');
  let end = text.rfind('}');
  let json = match (start, end) {
    (Some(s), Some(e)) if s < e => &text[s..=e],
    _ => return Err(Error::Parse("no JSON object in model reply".into())),
  };
  serde_json::from_str(json).map_err(|e| Error::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extracts_object_wrapped_in_prose() {
    let text = "Sure! Here you go:\n```json\n{\"technicalFocus\": \"a\", \
                \"practiceSchedule\": \"b\", \"interpretation\": \"c\"}\n```\nGood luck.";
    let tips = extract_tips(text).unwrap();
    assert_eq!(tips.technical_focus, "a");
    assert_eq!(tips.interpretation, "c");
  }

  #[test]
  fn missing_or_partial_json_is_rejected() {
    assert!(extract_tips("no braces here").is_err());
    assert!(extract_tips("} backwards {").is_err());
    assert!(extract_tips(r#"{"technicalFocus": "only one"}"#).is_err());
  }

  #[test]
  fn defaults_follow_instrument_and_period() {
    let tips = PracticeTips::defaults(Some("Solo Violin"), Some("Baroque"));
    assert!(tips.technical_focus.starts_with("Work on intonation"));
    assert!(tips.interpretation.contains("terraced dynamics"));

    let tips = PracticeTips::defaults(None, Some("Contemporary"));
    assert!(tips.technical_focus.starts_with("Break down difficult passages"));
    assert!(tips.interpretation.contains("extended techniques"));
  }

  #[test]
  fn serializes_with_camel_case_keys() {
    let value = serde_json::to_value(PracticeTips::fallback()).unwrap();
    let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys.len(), 3);
    assert!(value.get("technicalFocus").is_some());
    assert!(value.get("practiceSchedule").is_some());
  }
}
