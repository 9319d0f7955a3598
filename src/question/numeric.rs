//! Numeric-tolerance question types: graph point and slider value.
//! Both bands are inclusive at the boundary.

use serde::{Deserialize, Serialize};

use super::edit::{Outcome, PreviewAction, Rejection};
use super::{Answer, Point, QuestionSchema, QuestionType};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphPoint {
    pub question: String,
    pub target_x: f64,
    pub target_y: f64,
    pub radius: f64,
}

impl Default for GraphPoint {
    fn default() -> Self {
        Self::blank()
    }
}

impl QuestionSchema for GraphPoint {
    const TYPE: QuestionType = QuestionType::GraphPoint;
    type Answer = Point;

    fn blank() -> Self {
        Self { question: String::new(), target_x: 0.0, target_y: 0.0, radius: 1.0 }
    }

    fn grade(&self, answer: &Point) -> bool {
        (answer.x - self.target_x).hypot(answer.y - self.target_y) <= self.radius
    }

    fn answer_key(&self) -> Option<Point> {
        Some(Point { x: self.target_x, y: self.target_y })
    }

    fn interact(&self, draft: &mut Option<Point>, action: &PreviewAction) -> Outcome {
        match action {
            PreviewAction::Plot { x, y } => {
                *draft = Some(Point { x: *x, y: *y });
                Outcome::Applied
            }
            other => Outcome::Rejected(Rejection::not_applicable(other.name(), Self::TYPE)),
        }
    }

    fn wrap(answer: Point) -> Answer {
        Answer::GraphPoint(answer)
    }

    fn unwrap(answer: &Answer) -> Option<&Point> {
        match answer {
            Answer::GraphPoint(a) => Some(a),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SliderValue {
    pub question: String,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub correct_value: f64,
    pub tolerance: f64,
}

impl Default for SliderValue {
    fn default() -> Self {
        Self::blank()
    }
}

impl QuestionSchema for SliderValue {
    const TYPE: QuestionType = QuestionType::SliderValue;
    type Answer = f64;

    fn blank() -> Self {
        Self { question: String::new(), min: 0.0, max: 100.0, step: 1.0, correct_value: 50.0, tolerance: 0.0 }
    }

    fn grade(&self, answer: &f64) -> bool {
        (answer - self.correct_value).abs() <= self.tolerance
    }

    fn answer_key(&self) -> Option<f64> {
        Some(self.correct_value)
    }

    /// The slider cannot leave its track.
    fn interact(&self, draft: &mut Option<f64>, action: &PreviewAction) -> Outcome {
        match action {
            PreviewAction::Slide { value } => {
                let (lo, hi) = if self.min <= self.max { (self.min, self.max) } else { (self.max, self.min) };
                *draft = Some(value.clamp(lo, hi));
                Outcome::Applied
            }
            other => Outcome::Rejected(Rejection::not_applicable(other.name(), Self::TYPE)),
        }
    }

    fn wrap(answer: f64) -> Answer {
        Answer::SliderValue(answer)
    }

    fn unwrap(answer: &Answer) -> Option<&f64> {
        match answer {
            Answer::SliderValue(a) => Some(a),
            _ => None,
        }
    }
}
