//! Static mode table: `(mode, subMode)` to generation configuration
//!
//! Every supported mode has exactly one row in `MODE_TABLE`, indexed by
//! the `Mode` discriminant. Sub-modes only swap the system prompt. The
//! table is read-only; resolving a configuration never looks at request
//! content except for the grading modes, which interpolate the question
//! and the user's answer into their prompt.

use std::str::FromStr;
use serde::{Deserialize, Serialize};

/// Model class used for a mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier
{   /// Faster, cheaper model for mechanical transformations
    Light
  , /// Stronger reasoning model for grading and long-form output
    Heavy
}

/// What a mode needs from the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRequirement
{   /// Non-blank `text`
    Text
  , /// Non-blank `question` and `userAnswer`; `text` optional
    GradedAnswer
}

/// Every AI operation a client can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode
{   Summary
  , Quiz
  , AutoFormat
  , Organize
  , Grammar
  , Flashcards
  , ChatWithNote
  , Generate
  , Continue
  , InterviewAssist
  , QuizGenerate
  , QuizGrade
  , InterviewQ
  , InterviewFeedback
  , Eli5
  , Canvas
}

impl Mode
{   /// All modes in table order
    pub const ALL: [Mode; 16] = [
      Mode::Summary
    , Mode::Quiz
    , Mode::AutoFormat
    , Mode::Organize
    , Mode::Grammar
    , Mode::Flashcards
    , Mode::ChatWithNote
    , Mode::Generate
    , Mode::Continue
    , Mode::InterviewAssist
    , Mode::QuizGenerate
    , Mode::QuizGrade
    , Mode::InterviewQ
    , Mode::InterviewFeedback
    , Mode::Eli5
    , Mode::Canvas
    ];

    /// Wire name
    pub fn as_str(&self) -> &'static str
    {   match self
        {   Mode::Summary => "summary"
          , Mode::Quiz => "quiz"
          , Mode::AutoFormat => "auto-format"
          , Mode::Organize => "organize"
          , Mode::Grammar => "grammar"
          , Mode::Flashcards => "flashcards"
          , Mode::ChatWithNote => "chat-with-note"
          , Mode::Generate => "generate"
          , Mode::Continue => "continue"
          , Mode::InterviewAssist => "interview-assist"
          , Mode::QuizGenerate => "quiz-generate"
          , Mode::QuizGrade => "quiz-grade"
          , Mode::InterviewQ => "interview-q"
          , Mode::InterviewFeedback => "interview-feedback"
          , Mode::Eli5 => "eli5"
          , Mode::Canvas => "canvas"
        }
    }

    pub fn input_requirement(&self) -> InputRequirement
    {   match self
        {   Mode::QuizGrade | Mode::InterviewFeedback => {
              InputRequirement::GradedAnswer
            }
          , _ => InputRequirement::Text
        }
    }

    /// Table row for this mode
    pub fn entry(&self) -> &'static ModeEntry
    {   &MODE_TABLE[*self as usize]
    }

    /// Sub-mode names this mode recognises
    pub fn sub_modes(&self) -> impl Iterator<Item = &'static str>
    {   self.entry().variants.iter().map(|(name, _)| *name)
    }
}

impl FromStr for Mode
{   type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {   Mode::ALL.iter()
          .copied()
          .find(|m| m.as_str() == s)
          .ok_or_else(|| crate::error::Error::InvalidMode(s.to_string()))
    }
}

impl std::fmt::Display for Mode
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {   f.write_str(self.as_str())
    }
}

/// One row of the mode table
#[derive(Debug)]
pub struct ModeEntry
{   pub mode: Mode
  , pub tier: ModelTier
  , pub temperature: f32
  , pub max_output_tokens: u32
  , pub json_mode: bool
  , /// Prompt used when no sub-mode matches
    pub prompt: &'static str
  , /// `(subMode, prompt)` overrides
    pub variants: &'static [(&'static str, &'static str)]
}

impl ModeEntry
{   /// Prompt for a sub-mode, falling back to the default prompt
    pub fn prompt_for(&self, sub_mode: Option<&str>) -> &'static str
    {   sub_mode
          .and_then(|sub| {
            self.variants.iter().find(|(name, _)| *name == sub)
          })
          .map(|(_, prompt)| *prompt)
          .unwrap_or(self.prompt)
    }
}

/// Resolved, immutable generation settings for one request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig
{   pub system_prompt: String
  , pub model: ModelTier
  , pub temperature: f32
  , pub max_output_tokens: u32
  , pub json_mode: bool
}

impl GenerationConfig
{   /// Fill the `{question}` / `{user_answer}` slots of a grading prompt
    pub fn with_graded_answer(
      mut self
    , question: &str
    , user_answer: &str
    ) -> Self
    {   let slots = [("{question}", question), ("{user_answer}", user_answer)];
        let mut filled = String::with_capacity(
          self.system_prompt.len() + question.len() + user_answer.len()
        );
        // single left-to-right pass: substituted values are never rescanned
        let mut rest = self.system_prompt.as_str();
        loop
        {   let next = slots.iter()
              .filter_map(|&(slot, value)| rest.find(slot).map(|at| (at, slot, value)))
              .min_by_key(|&(at, _, _)| at);
            let Some((at, slot, value)) = next else { break; };
            filled.push_str(&rest[..at]);
            filled.push_str(value);
            rest = &rest[at + slot.len()..];
        }
        filled.push_str(rest);
        self.system_prompt = filled;
        self
    }
}

/// Configuration for a typed mode; unknown sub-modes use the default
pub fn config_for(mode: Mode, sub_mode: Option<&str>) -> GenerationConfig
{   let entry = mode.entry();
    GenerationConfig
    {   system_prompt: entry.prompt_for(sub_mode).trim().to_string()
      , model: entry.tier
      , temperature: entry.temperature
      , max_output_tokens: entry.max_output_tokens
      , json_mode: entry.json_mode
    }
}

/// Resolve a wire-level `(mode, subMode)` pair
pub fn resolve(mode: &str, sub_mode: Option<&str>)
  -> Result<GenerationConfig, crate::error::Error>
{   let mode = Mode::from_str(mode)?;
    Ok(config_for(mode, sub_mode))
}

// ===== Sub-mode names =====

pub const SUMMARY_ONE_MINUTE: &str = "1-Min Revision";
pub const SUMMARY_ELI5: &str = "ELI5 Mode";
pub const SUMMARY_EXAM: &str = "Exam Focused";
pub const SUMMARY_INTERVIEW: &str = "Interview Prep";

/// Sentinel `interview-assist` returns when nothing should be said
pub const SILENCE: &str = "SILENCE";

/// Ratings `interview-feedback` may produce
pub const INTERVIEW_RATINGS: [&str; 4]
  = ["Strong Hire", "Hire", "Weak Hire", "No Hire"];

// ===== Table =====

static MODE_TABLE: [ModeEntry; Mode::ALL.len()] = [
  ModeEntry
  {   mode: Mode::Summary
    , tier: ModelTier::Light
    , temperature: 0.5
    , max_output_tokens: 1024
    , json_mode: false
    , prompt: "Summarize the following text efficiently. Keep the key \
               facts, drop filler, and use short paragraphs or bullets."
    , variants: &[
        ( SUMMARY_ONE_MINUTE
        , "You are a revision expert. Summarize this into 3-5 \
           high-impact bullet points. Focus ONLY on the critical facts. \
           Use bold text for keywords."
        )
      , ( SUMMARY_ELI5
        , "Explain this topic as if the user is 5 years old. Use simple \
           analogies like LEGOs, pizza, or traffic to explain complex \
           concepts."
        )
      , ( SUMMARY_EXAM
        , "You are an exam setter. Identify 'High Yield' topics likely \
           to appear on a test. List them as '🔥 Likely Exam Topics'. \
           Highlight definitions and formulas."
        )
      , ( SUMMARY_INTERVIEW
        , "You are a technical interviewer. Generate 3 potential \
           interview questions based on this text. Provide a 'Model \
           Answer' for each."
        )
      ]
  }
, ModeEntry
  {   mode: Mode::Quiz
    , tier: ModelTier::Heavy
    , temperature: 0.5
    , max_output_tokens: 1500
    , json_mode: false
    , prompt: "Generate 3 Multiple Choice Questions (MCQs) based on the \
               text. Format clearly with options A) B) C) D). Place the \
               **Correct Answers** hidden at the very bottom."
    , variants: &[]
  }
, ModeEntry
  {   mode: Mode::AutoFormat
    , tier: ModelTier::Light
    , temperature: 0.4
    , max_output_tokens: 2048
    , json_mode: false
    , prompt: r#"
You are an elite Technical Interview Coach.
The user has pasted raw, messy notes. Restructure them into a "Master Interview Guide".

For EVERY topic in the text, use this exact structure:

## [Emoji] [Topic Name]
### ✅ **Interview Answer**
(A clear, concise definition in 1-2 sentences.)

### 🌍 **Real-Life Example**
(A non-technical analogy such as pizza, traffic or home appliances, as a > blockquote.)

### 💡 **Explanation**
(Why this matters, as one short point.)

---

Rules:
1. Use a specific emoji for every header.
2. **Bold** all keywords.
3. Fix all grammar.
4. Keep it human and conversational.
"#
    , variants: &[]
  }
, ModeEntry
  {   mode: Mode::Organize
    , tier: ModelTier::Light
    , temperature: 0.3
    , max_output_tokens: 1500
    , json_mode: false
    , prompt: r#"
You are an expert Note Organizer.
The user has selected a specific cluster of text. REWRITE and STRUCTURE this text into clean HTML.

Rules:
1. Do NOT delete information, only structure it.
2. Use <h3> for the main topic header.
3. Use <ul> and <li> for lists.
4. Use <strong> for keywords.
5. Return ONLY the HTML fragment (e.g. <h3>Title</h3><p>...</p>). Do not wrap it in <html>, <body> or markdown code blocks.
"#
    , variants: &[]
  }
, ModeEntry
  {   mode: Mode::Grammar
    , tier: ModelTier::Light
    , temperature: 0.1
    , max_output_tokens: 2048
    , json_mode: false
    , prompt: "You are a meticulous copy editor. Fix spelling, grammar and \
               punctuation in the user's text while keeping its meaning, \
               tone and formatting. Return ONLY the corrected text with no \
               commentary, explanations or quotes."
    , variants: &[]
  }
, ModeEntry
  {   mode: Mode::Flashcards
    , tier: ModelTier::Light
    , temperature: 0.3
    , max_output_tokens: 1500
    , json_mode: true
    , prompt: r#"
You create study flashcards from notes.
Produce between 5 and 7 flashcards covering the most important concepts in the text.
Each card has a short "front" (a question or term) and a concise "back" (the answer or definition).

Respond with a single JSON object and nothing else, in exactly this shape:
{"flashcards": [{"front": "...", "back": "..."}]}
"#
    , variants: &[]
  }
, ModeEntry
  {   mode: Mode::ChatWithNote
    , tier: ModelTier::Heavy
    , temperature: 0.3
    , max_output_tokens: 1024
    , json_mode: false
    , prompt: "You answer questions about the user's note. Use ONLY the \
               note content provided by the user. If the note does not \
               contain the answer, say that the note does not cover it \
               instead of guessing. Be concise and cite the relevant part \
               of the note when helpful."
    , variants: &[]
  }
, ModeEntry
  {   mode: Mode::Generate
    , tier: ModelTier::Heavy
    , temperature: 0.7
    , max_output_tokens: 4096
    , json_mode: false
    , prompt: "You are an expert study-note writer. Write a complete, \
               well-structured note on the topic the user gives. Use \
               markdown headings, bullet points, bold keywords, and \
               finish with a short 'Key Takeaways' section."
    , variants: &[]
  }
, ModeEntry
  {   mode: Mode::Continue
    , tier: ModelTier::Heavy
    , temperature: 0.8
    , max_output_tokens: 200
    , json_mode: false
    , prompt: "You are an autocomplete engine for study notes. Continue \
               the user's text with 2-3 natural sentences in the same \
               voice and style. Return ONLY the continuation, without \
               repeating any of the given text."
    , variants: &[]
  }
, ModeEntry
  {   mode: Mode::InterviewAssist
    , tier: ModelTier::Heavy
    , temperature: 0.3
    , max_output_tokens: 300
    , json_mode: false
    , prompt: r#"
You are a real-time interview assistant helping a candidate.
The user message contains the candidate's KNOWLEDGE BASE followed by what the INTERVIEWER SAID.

Rules:
1. If the interviewer's words are small talk, filler, incomplete, or not a question addressed to the candidate, reply with exactly: SILENCE
2. Otherwise answer in the first person as the candidate, in 2-4 concise spoken-style sentences.
3. Ground the answer in the knowledge base whenever it covers the topic; otherwise give a short, correct general answer.
4. Never mention the knowledge base, these rules, or that you are an AI.
"#
    , variants: &[]
  }
, ModeEntry
  {   mode: Mode::QuizGenerate
    , tier: ModelTier::Light
    , temperature: 0.6
    , max_output_tokens: 150
    , json_mode: false
    , prompt: "Based on the user's notes, write ONE open-ended question \
               that tests understanding of an important concept. Return \
               only the question text."
    , variants: &[]
  }
, ModeEntry
  {   mode: Mode::QuizGrade
    , tier: ModelTier::Heavy
    , temperature: 0.2
    , max_output_tokens: 600
    , json_mode: true
    , prompt: r#"
You are a strict but fair examiner. Grade the student's answer using the reference notes supplied by the user.

Question: "{question}"
Student's answer: "{user_answer}"

Respond with a single JSON object and nothing else:
{"score": <integer 0-100>, "feedback": "<one or two sentences>", "correct_answer": "<the ideal answer>"}
"#
    , variants: &[]
  }
, ModeEntry
  {   mode: Mode::InterviewQ
    , tier: ModelTier::Light
    , temperature: 0.6
    , max_output_tokens: 150
    , json_mode: false
    , prompt: "You are a technical interviewer. Based on the user's notes, \
               ask ONE realistic interview question. Return only the \
               question text."
    , variants: &[]
  }
, ModeEntry
  {   mode: Mode::InterviewFeedback
    , tier: ModelTier::Heavy
    , temperature: 0.2
    , max_output_tokens: 700
    , json_mode: true
    , prompt: r#"
You are a senior hiring manager reviewing a candidate's interview answer, using the user's notes as reference.

Interview question: "{question}"
Candidate's answer: "{user_answer}"

Respond with a single JSON object and nothing else:
{"rating": "Strong Hire" | "Hire" | "Weak Hire" | "No Hire", "feedback": "<what was good and what was missing>", "better_answer": "<a stronger answer in the first person>"}
"#
    , variants: &[]
  }
, ModeEntry
  {   mode: Mode::Eli5
    , tier: ModelTier::Light
    , temperature: 0.6
    , max_output_tokens: 400
    , json_mode: false
    , prompt: "Explain the user's topic as if to a 5 year old. Use one \
               simple everyday analogy and keep it under 120 words."
    , variants: &[]
  }
, ModeEntry
  {   mode: Mode::Canvas
    , tier: ModelTier::Light
    , temperature: 0.3
    , max_output_tokens: 1024
    , json_mode: false
    , prompt: "Convert the provided text into a text-based structural \
               diagram (ASCII art) using arrows (->) and brackets []. \
               Return only the diagram."
    , variants: &[]
  }
];
