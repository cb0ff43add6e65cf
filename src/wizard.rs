// src/wizard.rs
//! The estimate wizard as an explicit state machine.
//!
//! ```text
//! input -> estimating -> result -> contact -> submitting -> submitted
//!   ^          |            ^  \______/          |
//!   '----------'            '--------------------'  (failures)
//! ```
//!
//! Remote calls are split into `begin_*`/`complete_*` halves so a caller can drop
//! its lock on the wizard while the call is in flight. While estimating or
//! submitting the wizard is busy and refuses every other action.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::actions;
use crate::errors::{EstimateError, Result};
use crate::estimator::CostEstimator;
use crate::models::{
    ActionResult, ContactInfo, EstimateDisplay, EstimateInput, EstimateOutput, FieldError,
    PhotoDataUri, SubmissionData,
};
use crate::relay::LeadSubmitter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Input,
    Estimating,
    Result,
    Contact,
    Submitting,
    Submitted,
}

impl Step {
    pub fn is_busy(self) -> bool {
        matches!(self, Step::Estimating | Step::Submitting)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Input => "input",
            Step::Estimating => "estimating",
            Step::Result => "result",
            Step::Contact => "contact",
            Step::Submitting => "submitting",
            Step::Submitted => "submitted",
        };
        f.write_str(name)
    }
}

/// Things a user can ask the wizard to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    EditDescription,
    AttachPhoto,
    GetEstimate,
    CompleteEstimate,
    ScheduleFormalEstimate,
    Back,
    SubmitContact,
    CompleteSubmission,
    StartOver,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Action::EditDescription => "edit the description",
            Action::AttachPhoto => "attach a photo",
            Action::GetEstimate => "request an estimate",
            Action::CompleteEstimate => "finish estimating",
            Action::ScheduleFormalEstimate => "schedule a formal estimate",
            Action::Back => "go back",
            Action::SubmitContact => "submit contact details",
            Action::CompleteSubmission => "finish submitting",
            Action::StartOver => "start over",
        };
        f.write_str(text)
    }
}

/// A toast-style message for the user about the last thing that went wrong.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub field_errors: Vec<FieldError>,
}

impl Notice {
    fn new(title: &str, description: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            description: description.into(),
            field_errors: Vec::new(),
        }
    }
}

/// Read-only view of the wizard for rendering.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardSnapshot {
    pub step: Step,
    pub description: String,
    pub has_photo: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_data_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate: Option<EstimateOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<EstimateDisplay>,
    pub contact: ContactInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
}

#[derive(Debug, Clone)]
pub struct EstimateWizard {
    step: Step,
    description: String,
    photo: Option<PhotoDataUri>,
    estimate: Option<EstimateOutput>,
    contact: ContactInfo,
    notice: Option<Notice>,
}

impl Default for EstimateWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl EstimateWizard {
    pub fn new() -> Self {
        Self {
            step: Step::Input,
            description: String::new(),
            photo: None,
            estimate: None,
            contact: ContactInfo::default(),
            notice: None,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn photo(&self) -> Option<&PhotoDataUri> {
        self.photo.as_ref()
    }

    pub fn estimate(&self) -> Option<&EstimateOutput> {
        self.estimate.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Builds a snapshot; the photo itself is only included when `with_photo` is set.
    pub fn snapshot(&self, with_photo: bool) -> WizardSnapshot {
        WizardSnapshot {
            step: self.step,
            description: self.description.clone(),
            has_photo: self.photo.is_some(),
            photo_data_uri: if with_photo { self.photo.as_ref().map(|p| p.to_string()) } else { None },
            estimate: self.estimate,
            display: self.estimate.map(|e| e.display()),
            contact: self.contact.clone(),
            notice: self.notice.clone(),
        }
    }

    fn expect_step(&mut self, expected: Step, action: Action) -> Result<()> {
        if self.step != expected {
            return Err(EstimateError::InvalidTransition { from: self.step, action });
        }
        self.notice = None;
        Ok(())
    }

    pub fn set_description(&mut self, text: impl Into<String>) -> Result<()> {
        self.expect_step(Step::Input, Action::EditDescription)?;
        self.description = text.into();
        Ok(())
    }

    /// Attaches a photo given as a data URI. A rejected photo leaves the previous one in place.
    pub fn attach_photo(&mut self, data_uri: &str) -> Result<()> {
        self.expect_step(Step::Input, Action::AttachPhoto)?;
        match PhotoDataUri::parse(data_uri) {
            Ok(photo) => {
                self.photo = Some(photo);
                Ok(())
            }
            Err(e) => {
                self.notice = Some(match &e {
                    EstimateError::ImageTooLarge { .. } => {
                        Notice::new("Image too large", "Please upload an image smaller than 4MB.")
                    }
                    other => Notice::new("Unsupported image", other.to_string()),
                });
                Err(e)
            }
        }
    }

    /// Moves to `estimating` and hands back the input to estimate.
    /// Without both a photo and a description nothing changes but the notice.
    pub fn begin_estimate(&mut self) -> Result<EstimateInput> {
        self.expect_step(Step::Input, Action::GetEstimate)?;
        let photo = match &self.photo {
            Some(photo) if !self.description.trim().is_empty() => photo.clone(),
            _ => {
                self.notice = Some(Notice::new(
                    "Missing Information",
                    EstimateError::MissingInformation.to_string(),
                ));
                return Err(EstimateError::MissingInformation);
            }
        };
        self.step = Step::Estimating;
        Ok(EstimateInput {
            photo_data_uri: photo,
            description: self.description.clone(),
        })
    }

    pub fn complete_estimate(&mut self, result: ActionResult<EstimateOutput>) -> Result<()> {
        self.expect_step(Step::Estimating, Action::CompleteEstimate)?;
        match result.data {
            Some(estimate) if result.success => {
                self.estimate = Some(estimate);
                self.step = Step::Result;
            }
            _ => {
                self.notice = Some(Notice::new(
                    "Estimation Failed",
                    result.message.unwrap_or_else(|| "An unexpected error occurred.".to_string()),
                ));
                self.step = Step::Input;
            }
        }
        Ok(())
    }

    /// `handleGetEstimate`: runs the whole estimate round trip.
    pub async fn get_estimate(&mut self, estimator: &dyn CostEstimator) -> Result<()> {
        let input = self.begin_estimate()?;
        let result = actions::generate_estimate(estimator, &input).await;
        self.complete_estimate(result)
    }

    pub fn schedule_formal_estimate(&mut self) -> Result<()> {
        self.expect_step(Step::Result, Action::ScheduleFormalEstimate)?;
        self.step = Step::Contact;
        Ok(())
    }

    pub fn back_to_result(&mut self) -> Result<()> {
        self.expect_step(Step::Contact, Action::Back)?;
        self.step = Step::Result;
        Ok(())
    }

    /// Validates the contact form and moves to `submitting`.
    /// An invalid form keeps the wizard in `contact` with per-field messages.
    pub fn begin_submission(&mut self, contact: ContactInfo) -> Result<SubmissionData> {
        self.expect_step(Step::Contact, Action::SubmitContact)?;
        self.contact = contact;

        let field_errors = self.contact.validate();
        if !field_errors.is_empty() {
            let messages: Vec<String> = field_errors.iter().map(|e| e.message.to_string()).collect();
            self.notice = Some(Notice {
                title: "Invalid contact details".to_string(),
                description: messages.join(" "),
                field_errors,
            });
            return Err(EstimateError::InvalidContact(messages));
        }

        self.step = Step::Submitting;
        Ok(SubmissionData {
            contact: self.contact.clone(),
            description: self.description.clone(),
            estimate: self.estimate,
        })
    }

    pub fn complete_submission(&mut self, result: ActionResult<()>) -> Result<()> {
        self.expect_step(Step::Submitting, Action::CompleteSubmission)?;
        if result.success {
            self.step = Step::Submitted;
        } else {
            self.notice = Some(Notice::new(
                "Submission Failed",
                result
                    .message
                    .unwrap_or_else(|| "Could not submit your request. Please try again.".to_string()),
            ));
            self.step = Step::Contact;
        }
        Ok(())
    }

    /// `handleContactSubmit`: validates and relays the lead.
    pub async fn submit_contact(&mut self, contact: ContactInfo, submitter: &dyn LeadSubmitter) -> Result<()> {
        let data = self.begin_submission(contact)?;
        let result = actions::submit_request(submitter, &data).await;
        self.complete_submission(result)
    }

    /// Clears everything and returns to `input`. Refused while a remote call is in flight.
    pub fn start_over(&mut self) -> Result<()> {
        if self.step.is_busy() {
            return Err(EstimateError::InvalidTransition {
                from: self.step,
                action: Action::StartOver,
            });
        }
        *self = Self::new();
        Ok(())
    }
}
