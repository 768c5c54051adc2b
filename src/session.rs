//! Application state around the analyzer.
//!
//! A [`Session`] holds what the user has entered and the latest results. An
//! analysis is requested with [`Session::request_analysis`], which snapshots
//! the input into an [`AnalysisTicket`]; running the ticket is pure and may
//! happen later (after a simulated delay, or on another thread). When the
//! outcome comes back, [`Session::apply`] installs it only if no newer
//! request has been issued in the meantime.

use tracing::debug;

use crate::config::SAMPLE_DOCUMENT;
use crate::document::Document;
use crate::{analyze, answer_query, trim_text, AnalysisResult};

#[derive(Debug, Clone)]
pub struct Session {
    document: String,
    question: String,
    sample_document: String,
    result: Option<AnalysisResult>,
    answer: Option<String>,
    generation: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::with_sample(SAMPLE_DOCUMENT)
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// A session that falls back to `sample` when the document is blank.
    pub fn with_sample(sample: impl Into<String>) -> Self {
        Self {
            document: String::new(),
            question: String::new(),
            sample_document: sample.into(),
            result: None,
            answer: None,
            generation: 0,
        }
    }

    pub fn set_document(&mut self, text: impl Into<String>) {
        self.document = text.into();
    }

    pub fn load(&mut self, document: Document) {
        debug!(source = %document.source, bytes = document.text.len(), "loaded document");
        self.document = document.text;
    }

    pub fn set_question(&mut self, question: impl Into<String>) {
        self.question = question.into();
    }

    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    /// Snapshot the current input for analysis. Any ticket issued earlier
    /// becomes stale.
    pub fn request_analysis(&mut self) -> AnalysisTicket {
        self.generation += 1;
        let text = if trim_text(&self.document).is_empty() {
            debug!("document is blank, analyzing sample");
            self.sample_document.clone()
        } else {
            self.document.clone()
        };
        let question = (!trim_text(&self.question).is_empty()).then(|| self.question.clone());
        AnalysisTicket {
            generation: self.generation,
            text,
            question,
        }
    }

    /// Install an outcome. Returns `false` and leaves state untouched when the
    /// outcome belongs to a superseded request.
    pub fn apply(&mut self, outcome: AnalysisOutcome) -> bool {
        if outcome.generation != self.generation {
            debug!(
                stale = outcome.generation,
                current = self.generation,
                "dropping superseded analysis"
            );
            return false;
        }
        self.result = Some(outcome.result);
        if let Some(answer) = outcome.answer {
            self.answer = Some(answer);
        }
        true
    }

    /// Request, run and apply an analysis in one step.
    pub fn analyze_now(&mut self) -> AnalysisResult {
        let outcome = self.request_analysis().run();
        let result = outcome.result.clone();
        self.apply(outcome);
        result
    }

    /// Answer the current question against the current document. Unlike a
    /// full analysis this never substitutes the sample document.
    pub fn ask(&mut self) -> String {
        let answer = answer_query(&self.document, &self.question);
        self.answer = Some(answer.clone());
        answer
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisTicket {
    generation: u64,
    text: String,
    question: Option<String>,
}

impl AnalysisTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn run(self) -> AnalysisOutcome {
        let result = analyze(&self.text);
        let answer = self.question.map(|q| answer_query(&self.text, &q));
        AnalysisOutcome {
            generation: self.generation,
            result,
            answer,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub generation: u64,
    pub result: AnalysisResult,
    pub answer: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MISSING_INPUT_PROMPT;
    use pretty_assertions::assert_eq;

    #[test]
    fn blank_document_analyzes_sample() {
        let mut session = Session::new();
        session.set_document("   \n");
        let ticket = session.request_analysis();
        assert_eq!(ticket.text(), SAMPLE_DOCUMENT);
    }

    #[test]
    fn bom_only_file_analyzes_sample() {
        let mut session = Session::new();
        session.set_document("\u{FEFF}\n");
        assert_eq!(session.request_analysis().text(), SAMPLE_DOCUMENT);
    }

    #[test]
    fn custom_sample_is_used() {
        let mut session = Session::with_sample("Late fee of $50.");
        let result = session.analyze_now();
        assert_eq!(result.highlights, vec!["late fee"]);
    }

    #[test]
    fn latest_request_wins() {
        let mut session = Session::new();
        session.set_document("Liability is capped.");
        let first = session.request_analysis();
        session.set_document("Confidential information stays private.");
        let second = session.request_analysis();

        let second_outcome = second.run();
        let first_outcome = first.run();

        assert!(session.apply(second_outcome));
        assert!(!session.apply(first_outcome));
        assert_eq!(
            session.result().unwrap().highlights,
            vec!["confidential".to_string()]
        );
    }

    #[test]
    fn fresh_outcome_matches_installed_state() {
        let mut session = Session::new();
        session.set_document("Rent is due monthly. A late fee applies.");
        session.set_question("late fee?");
        let outcome = session.request_analysis().run();

        assert!(session.apply(outcome.clone()));
        assert_eq!(session.result(), Some(&outcome.result));
        assert_eq!(session.answer(), outcome.answer.as_deref());
        assert_eq!(outcome.answer.as_deref(), Some("A late fee applies."));
    }

    #[test]
    fn question_answered_alongside_analysis() {
        let mut session = Session::new();
        session.set_document("Rent is due monthly. Termination requires 30 days notice.");
        session.set_question("termination notice?");
        session.analyze_now();
        assert_eq!(
            session.answer(),
            Some("Termination requires 30 days notice.")
        );
    }

    #[test]
    fn blank_question_keeps_previous_answer() {
        let mut session = Session::new();
        session.set_document("Rent is due monthly. Termination requires 30 days notice.");
        session.set_question("rent");
        session.analyze_now();
        session.set_question("  ");
        session.analyze_now();
        assert_eq!(session.answer(), Some("Rent is due monthly."));
    }

    #[test]
    fn ask_does_not_use_sample() {
        let mut session = Session::new();
        session.set_question("What about liability?");
        assert_eq!(session.ask(), MISSING_INPUT_PROMPT);
        assert_eq!(session.answer(), Some(MISSING_INPUT_PROMPT));
    }
}
