//! Add-exam form
//!
//! Field values are checked against a declarative schema (field name to a
//! list of rules, first failure wins). A valid form becomes a [`NewExam`].

use crate::error::{ExamError, FormErrors};
use crate::exam::NewExam;
use crate::notice::{Notice, Notices};
use crate::repository::ExamRepository;
use crate::session::SessionContext;
use crate::types::DocId;
use chrono::{DateTime, Utc};
use tracing::{error, warn};
use url::Url;

/// A single constraint on a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    MinChars(usize, &'static str),
    Required(&'static str),
    AbsoluteUrl(&'static str),
}

pub const SCHEMA: &[(&str, &[Rule])] = &[
    (
        "name",
        &[Rule::MinChars(2, "Exam name must be at least 2 characters.")],
    ),
    ("subtitle", &[]),
    ("date", &[Rule::Required("A date is required.")]),
    (
        "imageUrl",
        &[Rule::AbsoluteUrl("Please enter a valid image URL.")],
    ),
];

/// Raw value of one form field.
#[derive(Debug, Clone, Copy)]
enum Input<'a> {
    Text(&'a str),
    Date(Option<&'a DateTime<Utc>>),
}

impl Rule {
    fn check(&self, input: Input<'_>) -> Result<(), &'static str> {
        match (self, input) {
            (Rule::MinChars(min, msg), Input::Text(text)) => {
                if text.chars().count() >= *min {
                    Ok(())
                } else {
                    Err(*msg)
                }
            }
            (Rule::Required(msg), Input::Date(date)) => date.map(|_| ()).ok_or(*msg),
            (Rule::Required(msg), Input::Text(text)) => {
                if text.is_empty() {
                    Err(*msg)
                } else {
                    Ok(())
                }
            }
            (Rule::AbsoluteUrl(msg), Input::Text(text)) => {
                Url::parse(text).map(|_| ()).map_err(|_| *msg)
            }
            (Rule::MinChars(_, msg) | Rule::AbsoluteUrl(msg), Input::Date(_)) => Err(*msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddExamForm {
    pub name: String,
    pub subtitle: String,
    pub date: Option<DateTime<Utc>>,
    pub image_url: String,
    submitting: bool,
}

impl AddExamForm {
    /// Empty form with the configured default image.
    pub fn with_defaults(image_url: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            subtitle: String::new(),
            date: None,
            image_url: image_url.into(),
            submitting: false,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    fn input(&self, field: &str) -> Input<'_> {
        match field {
            "name" => Input::Text(&self.name),
            "subtitle" => Input::Text(&self.subtitle),
            "date" => Input::Date(self.date.as_ref()),
            _ => Input::Text(&self.image_url),
        }
    }

    /// Check every field against [`SCHEMA`].
    pub fn validate(&self) -> Result<NewExam, FormErrors> {
        let mut errors = FormErrors::new();
        for (field, rules) in SCHEMA {
            for rule in rules.iter() {
                if let Err(msg) = rule.check(self.input(field)) {
                    errors.insert(*field, msg);
                }
            }
        }
        let date = match (errors.is_empty(), self.date) {
            (true, Some(date)) => date,
            _ => return Err(errors),
        };
        let subtitle = self.subtitle.trim();
        Ok(NewExam {
            name: self.name.clone(),
            subtitle: (!subtitle.is_empty()).then(|| subtitle.to_string()),
            date,
            image_url: self.image_url.clone(),
        })
    }

    /// Validate and create the exam for the signed-in user.
    ///
    /// Auth and write failures are reported through `notices` as well as
    /// returned. Validation failures only return.
    pub async fn submit(
        &mut self,
        repo: &ExamRepository,
        session: &SessionContext,
        notices: &Notices,
    ) -> Result<DocId, ExamError> {
        let new_exam = self.validate().map_err(ExamError::Validation)?;
        let user = match session.require_user() {
            Ok(user) => user,
            Err(e) => {
                warn!("Exam submission without a session");
                notices.push(Notice::auth_required());
                return Err(e);
            }
        };
        self.submitting = true;
        let result = repo.create_exam(&user, &new_exam).await;
        self.submitting = false;
        match &result {
            Ok(_) => notices.push(Notice::exam_added()),
            Err(e) => {
                error!(error = %e, "Failed to add exam");
                notices.push(Notice::exam_add_failed());
            }
        }
        result
    }
}
