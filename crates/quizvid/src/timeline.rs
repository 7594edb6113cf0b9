//! Segment schedule of a quiz video.
//!
//! ```text
//! | intro |~| Q1 prompt ..countdown| reveal | explanation |~| Q2 ...
//!          ^ transition overlap (xfade)
//! ```
//!
//! Segment `k` starts at `Σ_{j<k} (duration_j − transition)`, so the video
//! lasts `Σ duration − (n − 1) · transition`.

use crate::model::{Question, Quiz};
use crate::settings::{VideoSettings, ANSWER_REVEAL_DELAY_SECS, TRANSITION_SECS};
use serde::Serialize;

/// Length of the title card
pub const INTRO_SECS: f64 = 3.0;
/// Length of the explanation phase
pub const EXPLANATION_SECS: f64 = 3.0;
/// Countdown length at the end of the prompt phase
pub const COUNTDOWN_SECS: f64 = 3.0;

/// What a segment shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SegmentKind {
    /// Title card
    Intro,
    /// A question, by position in the arranged quiz
    Question {
        /// Zero-based index into `Quiz::questions`
        index: usize,
    },
}

/// Phase within a question segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    /// Prompt and options, answer hidden
    Prompt,
    /// Correct answer highlighted
    Reveal,
    /// Explanation shown under the highlighted answer
    Explanation,
}

/// A time window relative to the start of its segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Phase {
    /// Phase kind
    pub kind: PhaseKind,
    /// Start, seconds from segment start
    pub start: f64,
    /// End, seconds from segment start
    pub end: f64,
}

/// One card of the video
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    /// What the segment shows
    pub kind: SegmentKind,
    /// Absolute start on the video timeline
    pub start: f64,
    /// Length including the part overlapped by transitions
    pub duration: f64,
    /// Question phases (empty for the intro)
    pub phases: Vec<Phase>,
    /// Countdown window relative to the segment, when enabled
    pub countdown: Option<(f64, f64)>,
}

impl Segment {
    /// Absolute end on the video timeline
    #[must_use]
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Phase of the given kind
    #[must_use]
    pub fn phase(&self, kind: PhaseKind) -> Option<&Phase> {
        self.phases.iter().find(|p| p.kind == kind)
    }
}

/// Ordered segments plus the transition overlap
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    /// Segments in playback order
    pub segments: Vec<Segment>,
    /// Overlap between adjacent segments
    pub transition: f64,
}

impl Timeline {
    /// Build the schedule for an arranged quiz
    #[must_use]
    pub fn build(quiz: &Quiz, settings: &VideoSettings) -> Self {
        let mut durations = vec![(SegmentKind::Intro, INTRO_SECS, Vec::new(), None)];

        let show_explanations = quiz.settings.show_explanations && settings.include_explanations;
        for (index, question) in quiz.questions.iter().enumerate() {
            let (phases, countdown) = question_phases(
                question,
                settings,
                quiz.settings.show_feedback,
                show_explanations,
            );
            let length = phases.last().map_or(0.0, |p| p.end);
            durations.push((SegmentKind::Question { index }, length, phases, countdown));
        }

        let mut segments = Vec::with_capacity(durations.len());
        let mut cursor = 0.0;
        for (kind, duration, phases, countdown) in durations {
            segments.push(Segment {
                kind,
                start: cursor,
                duration,
                phases,
                countdown,
            });
            cursor += duration - TRANSITION_SECS;
        }

        Self {
            segments,
            transition: TRANSITION_SECS,
        }
    }

    /// Total video length in seconds
    #[must_use]
    pub fn total_duration(&self) -> f64 {
        self.segments.last().map_or(0.0, Segment::end)
    }

    /// Segments showing questions
    pub fn question_segments(&self) -> impl Iterator<Item = (usize, &Segment)> {
        self.segments.iter().filter_map(|s| match s.kind {
            SegmentKind::Question { index } => Some((index, s)),
            SegmentKind::Intro => None,
        })
    }
}

fn question_phases(
    question: &Question,
    settings: &VideoSettings,
    show_feedback: bool,
    show_explanations: bool,
) -> (Vec<Phase>, Option<(f64, f64)>) {
    let prompt = f64::from(question.duration.unwrap_or(settings.duration_per_question));
    let mut phases = vec![Phase {
        kind: PhaseKind::Prompt,
        start: 0.0,
        end: prompt,
    }];
    let mut cursor = prompt;

    if show_feedback {
        phases.push(Phase {
            kind: PhaseKind::Reveal,
            start: cursor,
            end: cursor + ANSWER_REVEAL_DELAY_SECS,
        });
        cursor += ANSWER_REVEAL_DELAY_SECS;

        if show_explanations && question.explanation().is_some() {
            phases.push(Phase {
                kind: PhaseKind::Explanation,
                start: cursor,
                end: cursor + EXPLANATION_SECS,
            });
        }
    }

    let countdown = settings
        .countdown
        .then(|| ((prompt - COUNTDOWN_SECS).max(0.0), prompt));
    (phases, countdown)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn quiz() -> Quiz {
        Quiz::new("Timing")
            .with_question(
                Question::multiple_choice("a?", ["1", "2"], 0)
                    .with_duration(5)
                    .with_explanation("because"),
            )
            .with_question(Question::true_false("b?", true))
    }

    #[test]
    fn test_segments_and_phases() {
        let timeline = Timeline::build(&quiz(), &VideoSettings::default());
        assert_eq!(timeline.segments.len(), 3);

        let intro = &timeline.segments[0];
        assert_eq!(intro.kind, SegmentKind::Intro);
        assert_eq!(intro.start, 0.0);
        assert_eq!(intro.duration, INTRO_SECS);

        let q1 = &timeline.segments[1];
        assert_eq!(q1.start, 2.0);
        assert_eq!(q1.duration, 11.0);
        assert_eq!(q1.phase(PhaseKind::Reveal).unwrap().start, 5.0);
        assert_eq!(q1.phase(PhaseKind::Explanation).unwrap().end, 11.0);
        assert_eq!(q1.countdown, Some((2.0, 5.0)));

        let q2 = &timeline.segments[2];
        assert_eq!(q2.start, 12.0);
        assert_eq!(q2.duration, 13.0);
        assert!(q2.phase(PhaseKind::Explanation).is_none());

        assert_eq!(timeline.total_duration(), 25.0);
    }

    #[test]
    fn test_no_feedback_drops_reveal_and_explanation() {
        let mut quiz = quiz();
        quiz.settings.show_feedback = false;
        let timeline = Timeline::build(&quiz, &VideoSettings::default());
        let q1 = &timeline.segments[1];
        assert_eq!(q1.phases.len(), 1);
        assert_eq!(q1.duration, 5.0);
    }

    #[test]
    fn test_explanations_disabled() {
        let settings = VideoSettings {
            include_explanations: false,
            countdown: false,
            ..VideoSettings::default()
        };
        let timeline = Timeline::build(&quiz(), &settings);
        let q1 = &timeline.segments[1];
        assert!(q1.phase(PhaseKind::Explanation).is_none());
        assert_eq!(q1.countdown, None);
    }

    #[test]
    fn test_question_segments() {
        let timeline = Timeline::build(&quiz(), &VideoSettings::default());
        let indices: Vec<usize> = timeline.question_segments().map(|(i, _)| i).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    proptest! {
        #[test]
        fn prop_total_is_sum_minus_overlaps(durations in prop::collection::vec(3u32..=30, 1..12)) {
            let mut quiz = Quiz::new("p");
            for d in &durations {
                quiz.push_question(Question::multiple_choice("q", ["a", "b"], 0).with_duration(*d));
            }
            let timeline = Timeline::build(&quiz, &VideoSettings::default());
            let sum: f64 = timeline.segments.iter().map(|s| s.duration).sum();
            let n = timeline.segments.len() as f64;
            prop_assert!((timeline.total_duration() - (sum - (n - 1.0) * TRANSITION_SECS)).abs() < 1e-9);
            for pair in timeline.segments.windows(2) {
                prop_assert!((pair[1].start - (pair[0].end() - TRANSITION_SECS)).abs() < 1e-9);
            }
        }
    }
}
