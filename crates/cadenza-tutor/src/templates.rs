//! Canned teacher replies, used when no model is reachable.
//!
//! Keyword routing is case-insensitive and checked in a fixed priority order;
//! the first group that matches wins. `pick` chooses among the generic
//! replies when nothing matches.

use cadenza_core::catalog::DifficultyBand;

use crate::{PieceQuestion, TeacherRequest};

fn mentions(text: &str, words: &[&str]) -> bool {
  words.iter().any(|w| text.contains(w))
}

fn choose<T: Copy>(options: &[T], pick: u32) -> T { options[pick as usize % options.len()] }

// ─── General teacher ─────────────────────────────────────────────────────────

const TEACHER_GENERIC: [&str; 8] = [
  "Based on your practice history, I recommend focusing on improving your finger technique. \
   Try practicing scales slowly with a metronome, gradually increasing the tempo as you become \
   more comfortable.",
  "For Bach's pieces, pay special attention to articulation and ornaments. Try practicing each \
   hand separately before combining them.",
  "To improve your sight-reading skills, I recommend spending 10-15 minutes each day reading \
   through new pieces at a comfortable tempo. Don't worry about mistakes - the goal is to keep \
   going and train your eyes to look ahead.",
  "For your current repertoire, I suggest dividing each piece into smaller sections and \
   practicing them intensively. Focus on one section per day, and review previously mastered \
   sections regularly.",
  "Based on your progress, you might be ready to tackle more challenging pieces. Consider adding \
   some Chopin or Debussy to your repertoire to develop different aspects of your technique.",
  "When practicing the Moonlight Sonata, focus on maintaining an even tempo and bringing out the \
   melody in the top voice while keeping the triplet accompaniment soft and flowing.",
  "For Chopin's Nocturnes, work on your pedaling technique. The pedal should create a smooth, \
   connected sound without blurring harmonies.",
  "I recommend practicing with a metronome to develop a solid sense of rhythm, especially for \
   pieces with complex rhythmic patterns.",
];

pub fn teacher_reply(req: &TeacherRequest, pick: u32) -> String {
  let greeting = match req.user_email.as_deref() {
    Some(email) if !email.is_empty() => format!("I see you're practicing as {email}. "),
    _ => String::new(),
  };
  let text = req.message.to_lowercase();

  let body = if text.contains("bach") {
    "For Bach's counterpoint, I recommend practicing each voice separately before combining them. \
     Pay attention to the independence of each line while maintaining a cohesive whole."
  } else if text.contains("chopin") {
    "Chopin's music requires a delicate touch and expressive rubato. Practice with a flexible \
     wrist and focus on creating a singing tone for the melodies."
  } else if mentions(&text, &["beginner", "start"]) {
    "For beginners, I recommend starting with pieces like Bach's Minuet in G, Clementi's \
     Sonatinas, or Schumann's 'The Merry Farmer'. These pieces will help develop fundamental \
     techniques while being musically rewarding."
  } else if mentions(&text, &["technique", "finger"]) {
    "To improve finger technique, practice Hanon exercises, scales, and arpeggios daily. Start \
     slowly with a metronome and gradually increase the tempo as you gain confidence and accuracy."
  } else {
    choose(&TEACHER_GENERIC, pick)
  };

  format!("{greeting}{body}")
}

// ─── Piece assistant ─────────────────────────────────────────────────────────

/// Stylistic period, as far as the templates care.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Period {
  Baroque,
  Classical,
  Romantic,
  Other,
}

impl Period {
  fn of(period: Option<&str>) -> Self {
    match period {
      Some("Baroque") => Self::Baroque,
      Some("Classical") => Self::Classical,
      Some("Romantic") => Self::Romantic,
      _ => Self::Other,
    }
  }
}

fn is_instrument(instrument: Option<&str>, name: &str) -> bool {
  instrument.is_some_and(|i| i.to_lowercase().contains(name))
}

pub fn piece_reply(q: &PieceQuestion, pick: u32) -> String {
  let title = q.piece_title.as_deref().unwrap_or("This piece");
  let greeting = match q.user_email.as_deref() {
    Some(email) if !email.is_empty() => format!("I see you're asking about {title} as {email}. "),
    _ => String::new(),
  };
  let context = match (q.piece_title.as_deref(), q.composer.as_deref()) {
    (Some(t), Some(c)) => format!("{t} by {c}"),
    _ => "this piece".to_owned(),
  };
  let period = q.period.as_deref();
  let style = Period::of(period);
  let band = q.difficulty.map(DifficultyBand::of);
  let text = q.message.to_lowercase();

  let body = if mentions(&text, &["difficult", "hard"]) {
    let band = band.unwrap_or(DifficultyBand::Intermediate);
    let detail = match band {
      DifficultyBand::Beginner => "It's suitable for beginners with some experience.",
      DifficultyBand::Intermediate => "It requires intermediate technical skills.",
      DifficultyBand::Advanced => "It's quite challenging and requires advanced technique.",
    };
    format!(
      "{title} is considered a {} level piece. {detail} When practicing, break it down into \
       smaller sections and work on them separately before combining.",
      band.as_str()
    )
  } else if mentions(&text, &["technique", "practice"]) {
    if is_instrument(q.instrument.as_deref(), "piano") {
      format!(
        "For {context}, focus on hand independence and voicing. Practice hands separately first, \
         then slowly combine. Pay attention to the pedaling, especially in legato passages. Use a \
         metronome to maintain steady rhythm."
      )
    } else if is_instrument(q.instrument.as_deref(), "violin") {
      format!(
        "When practicing {context}, pay special attention to intonation and bow control. Work on \
         string crossings slowly, and use open strings to check your pitch. Focus on producing a \
         clean, resonant tone."
      )
    } else {
      format!(
        "To practice {context} effectively, break it into smaller sections and work on the \
         challenging parts at a slower tempo. Gradually increase the speed as you become more \
         comfortable. Record yourself to identify areas that need improvement."
      )
    }
  } else if mentions(&text, &["history", "background"]) {
    let era = match style {
      Period::Baroque => "contrapuntal techniques and ornate melodic lines were prevalent.",
      Period::Classical => "formal structures and balanced phrases were valued.",
      Period::Romantic => "emotional expression and rich harmonies were emphasized.",
      Period::Other => "various musical innovations were being explored.",
    };
    format!(
      "{context} was composed during the {} period. {} created this piece during a time when {era}",
      period.unwrap_or("classical"),
      q.composer.as_deref().unwrap_or("The composer"),
    )
  } else if mentions(&text, &["interpret", "perform"]) {
    let practice = match style {
      Period::Baroque => "Focus on clear articulation and limited use of pedal or vibrato.",
      Period::Classical => "Aim for clarity, balanced phrasing, and controlled dynamics.",
      Period::Romantic => "Express emotion through rubato and dynamic contrast.",
      Period::Other => "Balance authenticity with your personal artistic voice.",
    };
    format!(
      "When interpreting {context}, consider the {} performance practices. {practice} Listen to \
       recordings by different performers to develop your own interpretation.",
      period.unwrap_or("appropriate"),
    )
  } else {
    generic_piece_reply(q, &context, style, band, pick)
  };

  format!("{greeting}{body}")
}

fn generic_piece_reply(
  q: &PieceQuestion,
  context: &str,
  style: Period,
  band: Option<DifficultyBand>,
  pick: u32,
) -> String {
  let period = q.period.as_deref();
  match pick % 5 {
    0 => {
      let from = period.map(|p| format!(" from the {p} period")).unwrap_or_default();
      let whose = q
        .composer
        .as_deref()
        .map(|c| format!("{c}'s"))
        .unwrap_or_else(|| "the composer's".to_owned());
      format!(
        "{context} is a beautiful work{from}. It showcases {whose} characteristic style with its \
         unique musical elements."
      )
    }
    1 => format!(
      "When learning {context}, start by analyzing its structure and identifying recurring themes \
       and patterns. This will help you understand the piece better and memorize it more \
       effectively."
    ),
    2 => {
      let demands = match band {
        Some(DifficultyBand::Beginner) => "accessible",
        Some(DifficultyBand::Intermediate) => "moderate",
        Some(DifficultyBand::Advanced) => "complex",
        None => "varied",
      };
      let skills = if is_instrument(q.instrument.as_deref(), "piano") {
        "hand coordination and expressive phrasing"
      } else {
        "precise articulation and dynamic control"
      };
      format!(
        "{context} features interesting musical elements that make it both challenging and \
         rewarding to play. The {demands} technical requirements include {skills}."
      )
    }
    3 => format!(
      "To master {context}, regular, focused practice is key. Spend time on the difficult \
       passages, but also work on connecting sections smoothly to maintain the musical flow."
    ),
    _ => {
      let music = period
        .map(|p| format!("{p} period music"))
        .unwrap_or_else(|| "classical music".to_owned());
      let traits = match style {
        Period::Baroque => "contrapuntal textures and ornamental details",
        Period::Classical => "balanced phrases and clear structures",
        Period::Romantic => "emotional expressivity and rich harmonies",
        Period::Other => "distinctive musical techniques",
      };
      format!("{context} exemplifies many characteristics of {music}, including {traits}.")
    }
  }
}
