//! Detail/edit dialog shared by every editable entity.
//!
//! One dialog value is either closed or open in exactly one [`DialogMode`].
//! Saving is split into [`EntityDialog::begin_submit`] and
//! [`EntityDialog::finish_submit`] so the `is_submitting` guard holds while
//! the request is in flight; [`EntityDialog::submit`] runs both.

use validator::{Validate, ValidationErrors};

use crate::domain::Editable;
use crate::forms::DialogForm;
use crate::repository::errors::RepositoryResult;
use crate::repository::{CollectionReader, CollectionWriter};
use crate::services::list::ListController;
use crate::services::notify::{Notification, Notifier};
use crate::services::{ServiceError, ServiceResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DialogMode {
    View,
    Edit,
    Create,
}

/// Validated payload of a save that has been started.
#[derive(Debug)]
pub enum Submission<T: Editable> {
    Create(T::New),
    Update(T::Id, T::Update),
}

enum DialogState<T, F> {
    Closed,
    Open {
        mode: DialogMode,
        target: Option<T>,
        form: F,
    },
}

pub struct EntityDialog<T: Editable, F: DialogForm<T>> {
    state: DialogState<T, F>,
    submitting: bool,
    validation_errors: Option<ValidationErrors>,
}

impl<T: Editable, F: DialogForm<T>> Default for EntityDialog<T, F> {
    fn default() -> Self {
        Self {
            state: DialogState::Closed,
            submitting: false,
            validation_errors: None,
        }
    }
}

impl<T: Editable, F: DialogForm<T>> EntityDialog<T, F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, DialogState::Open { .. })
    }

    pub fn mode(&self) -> Option<DialogMode> {
        match &self.state {
            DialogState::Closed => None,
            DialogState::Open { mode, .. } => Some(*mode),
        }
    }

    pub fn target(&self) -> Option<&T> {
        match &self.state {
            DialogState::Open { target, .. } => target.as_ref(),
            DialogState::Closed => None,
        }
    }

    pub fn form(&self) -> Option<&F> {
        match &self.state {
            DialogState::Open { form, .. } => Some(form),
            DialogState::Closed => None,
        }
    }

    /// Editable form; `None` unless the dialog is in edit or create mode.
    pub fn form_mut(&mut self) -> Option<&mut F> {
        match &mut self.state {
            DialogState::Open {
                mode: DialogMode::Edit | DialogMode::Create,
                form,
                ..
            } => Some(form),
            _ => None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        self.validation_errors.as_ref()
    }

    fn open(&mut self, mode: DialogMode, target: Option<T>, form: F) -> bool {
        if self.submitting {
            log::warn!("Ignoring {mode:?} request while a {} save is in flight", T::LABEL);
            return false;
        }
        self.validation_errors = None;
        self.state = DialogState::Open { mode, target, form };
        true
    }

    pub fn open_view(&mut self, record: T) -> bool {
        let form = F::from_record(&record);
        self.open(DialogMode::View, Some(record), form)
    }

    pub fn open_edit(&mut self, record: T) -> bool {
        let form = F::from_record(&record);
        self.open(DialogMode::Edit, Some(record), form)
    }

    pub fn open_create(&mut self) -> bool {
        self.open(DialogMode::Create, None, F::default())
    }

    /// Closes the dialog. A no-op while a save is in flight.
    pub fn close(&mut self) -> bool {
        if self.submitting {
            return false;
        }
        self.state = DialogState::Closed;
        self.validation_errors = None;
        true
    }

    /// Validates the form and locks the dialog for saving.
    pub fn begin_submit(&mut self) -> ServiceResult<Submission<T>> {
        if self.submitting {
            return Err(ServiceError::SubmitInFlight);
        }

        let submission = {
            let DialogState::Open { mode, target, form } = &self.state else {
                return Err(ServiceError::Form("dialog is not open".to_string()));
            };

            if let Err(errors) = form.validate() {
                log::error!("Failed to validate {} form: {errors}", T::LABEL);
                self.validation_errors = Some(errors);
                return Err(ServiceError::Form("Form validation failed".to_string()));
            }

            match (mode, target) {
                (DialogMode::Create, _) => Submission::Create(form.to_new()?),
                (DialogMode::Edit, Some(record)) => {
                    Submission::Update(record.id(), form.to_update()?)
                }
                _ => return Err(ServiceError::Form("nothing to save".to_string())),
            }
        };

        self.validation_errors = None;
        self.submitting = true;
        Ok(submission)
    }

    /// Releases the save lock. On success the dialog closes and the list is
    /// refreshed; on failure the dialog and its form stay as they were.
    pub fn finish_submit<R, N>(
        &mut self,
        result: RepositoryResult<T>,
        repo: &R,
        list: &mut ListController<T>,
        notifier: &N,
    ) -> ServiceResult<T>
    where
        R: CollectionReader<T> + ?Sized,
        N: Notifier + ?Sized,
    {
        self.submitting = false;

        let record = match result {
            Ok(record) => record,
            Err(err) => {
                log::error!("Failed to save {}: {err}", T::LABEL);
                notifier.notify(Notification::destructive(
                    format!("Could not save {}", T::LABEL.to_lowercase()),
                    &err,
                ));
                return Err(err.into());
            }
        };

        let verb = match self.mode() {
            Some(DialogMode::Create) => "created",
            _ => "updated",
        };
        self.close();
        notifier.notify(Notification::success(
            format!("{} {verb}", T::LABEL),
            format!("{} #{} was {verb}.", T::LABEL, record.id()),
        ));

        if let Err(err) = list.refresh_after_mutation(repo) {
            log::error!("Failed to refresh {} list after save: {err}", T::LABEL);
        }
        Ok(record)
    }

    /// Validates, saves and completes the dialog in one call.
    pub fn submit<R, N>(
        &mut self,
        repo: &R,
        list: &mut ListController<T>,
        notifier: &N,
    ) -> ServiceResult<T>
    where
        R: CollectionReader<T> + CollectionWriter<T> + ?Sized,
        N: Notifier + ?Sized,
    {
        let submission = self.begin_submit()?;
        let result = match &submission {
            Submission::Create(payload) => repo.create(payload),
            Submission::Update(id, payload) => repo.update(*id, payload),
        };
        self.finish_submit(result, repo, list, notifier)
    }
}
