//! Date attribute store service.
//!
//! # Responsibility
//! - Validate caller input and persist single-field updates.
//! - Serve reads, schema declarations and form inputs.
//! - Apply form submissions and metadata imports.
//!
//! # Invariants
//! - A rejected update never writes; the prior value stays intact.
//! - Reading an unknown resource yields an all-null record and creates no row.
//! - One rejected import tag never stops the rest of a batch.

use crate::config::StoreConfig;
use crate::host::form::{
    build_form_fields, parse_submission, FormField, SubmissionParams, METADATA_FORM_ID,
};
use crate::host::import::{field_for_tag, ImportError, ImportReport};
use crate::host::schema::{describe_schema, FieldDescriptor};
use crate::logging::{log_id, log_reason, value_excerpt};
use crate::model::submission_dates::{
    parse_date_field, parse_submission_date, DateAttributes, DateField, DateOrderPolicy,
    FieldChange, ResourceId,
};
use crate::repo::submission_dates_repo::{RepoResult, SubmissionDatesRepository};
use log::{debug, info, warn};
use std::collections::BTreeMap;

/// Use-case service over a date attribute repository.
pub struct SubmissionDatesService<R: SubmissionDatesRepository> {
    repo: R,
    order_policy: DateOrderPolicy,
}

impl<R: SubmissionDatesRepository> SubmissionDatesService<R> {
    /// Creates a service with default configuration.
    pub fn new(repo: R) -> Self {
        Self::with_config(repo, &StoreConfig::default())
    }

    pub fn with_config(repo: R, config: &StoreConfig) -> Self {
        Self {
            repo,
            order_policy: config.order_policy,
        }
    }

    pub fn order_policy(&self) -> DateOrderPolicy {
        self.order_policy
    }

    /// Sets or clears one field.
    ///
    /// # Contract
    /// - `raw_value = None` clears the field.
    /// - Exactly one field is overwritten; the others are untouched.
    /// - Returns after the write is committed.
    ///
    /// # Errors
    /// - `Validation(UnknownField)` for a name outside `received|revised|accepted`.
    /// - `Validation(InvalidDate)` for a value that is not `YYYY-MM-DD`.
    /// - `Validation(OutOfOrder)` under the chronological policy.
    pub fn set_field(
        &self,
        resource_id: &str,
        field_name: &str,
        raw_value: Option<&str>,
    ) -> RepoResult<()> {
        let result = self.try_set_field(resource_id, field_name, raw_value);
        match &result {
            Ok(field) => info!(
                "event=date_set module=service status=ok resource_id={} field={} cleared={}",
                log_id(resource_id),
                field,
                raw_value.is_none()
            ),
            Err(err) => warn!(
                "event=date_set module=service status=rejected resource_id={} field={} reason={}",
                log_id(resource_id),
                value_excerpt(field_name),
                log_reason(err)
            ),
        }
        result.map(|_| ())
    }

    fn try_set_field(
        &self,
        resource_id: &str,
        field_name: &str,
        raw_value: Option<&str>,
    ) -> RepoResult<DateField> {
        let resource_id = ResourceId::new(resource_id)?;
        let field = parse_date_field(field_name)?;
        let change = match raw_value {
            Some(raw) => FieldChange::set(field, parse_submission_date(field, raw)?),
            None => FieldChange::clear(field),
        };
        self.repo
            .apply_changes(&resource_id, &[change], self.order_policy)?;
        Ok(field)
    }

    /// Returns the current record; never-written resources read as all-null.
    pub fn get_fields(&self, resource_id: &str) -> RepoResult<DateAttributes> {
        let resource_id = ResourceId::new(resource_id)?;
        let attrs = self
            .repo
            .load_dates(&resource_id)?
            .unwrap_or_else(|| DateAttributes::empty(resource_id));
        Ok(attrs)
    }

    /// Static schema declaration for the three date properties.
    pub fn describe_schema(&self) -> BTreeMap<DateField, FieldDescriptor> {
        describe_schema()
    }

    /// Applies one imported tag.
    ///
    /// Returns `Ok(false)` for tags with no date mapping and `Ok(true)` once a
    /// recognized tag is written.
    pub fn import_from_tag(
        &self,
        tag_name: &str,
        text_content: &str,
        resource_id: &str,
    ) -> Result<bool, ImportError> {
        let Some(field) = field_for_tag(tag_name) else {
            debug!(
                "event=date_import module=service status=skip resource_id={} tag={}",
                log_id(resource_id),
                value_excerpt(tag_name)
            );
            return Ok(false);
        };

        self.try_set_field(resource_id, field.as_str(), Some(text_content))
            .map_err(|source| ImportError {
                tag_name: tag_name.to_string(),
                resource_id: resource_id.to_string(),
                source,
            })?;

        info!(
            "event=date_import module=service status=ok resource_id={} tag={} field={}",
            log_id(resource_id),
            tag_name,
            field
        );
        Ok(true)
    }

    /// Imports every `(tag_name, text_content)` pair of one resource.
    ///
    /// Rejected tags are logged and collected; the remaining tags are still
    /// applied.
    pub fn import_tags<'a>(
        &self,
        resource_id: &str,
        tags: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> ImportReport {
        let mut report = ImportReport::default();
        for (tag_name, text_content) in tags {
            match self.import_from_tag(tag_name, text_content, resource_id) {
                Ok(true) => {
                    if let Some(field) = field_for_tag(tag_name) {
                        report.applied.push(field);
                    }
                }
                Ok(false) => report.ignored += 1,
                Err(err) => {
                    warn!(
                        "event=date_import module=service status=rejected resource_id={} tag={} value={} reason={}",
                        log_id(&err.resource_id),
                        err.tag_name,
                        value_excerpt(text_content),
                        log_reason(&err.source)
                    );
                    report.rejected.push(err);
                }
            }
        }
        report
    }

    /// Applies a submitted edit form.
    ///
    /// All present date keys are validated before any is written, and the
    /// writes land in one transaction. A submission without date keys writes
    /// nothing.
    pub fn apply_submission(
        &self,
        resource_id: &str,
        params: &SubmissionParams,
    ) -> RepoResult<DateAttributes> {
        let result = self.try_apply_submission(resource_id, params);
        if let Err(err) = &result {
            warn!(
                "event=date_submit module=service status=rejected resource_id={} reason={}",
                log_id(resource_id),
                log_reason(err)
            );
        }
        result
    }

    fn try_apply_submission(
        &self,
        resource_id: &str,
        params: &SubmissionParams,
    ) -> RepoResult<DateAttributes> {
        let id = ResourceId::new(resource_id)?;
        let changes = parse_submission(params)?;
        if changes.is_empty() {
            return self.get_fields(resource_id);
        }

        let attrs = self.repo.apply_changes(&id, &changes, self.order_policy)?;
        info!(
            "event=date_submit module=service status=ok resource_id={} changes={}",
            log_id(id.as_str()),
            changes.len()
        );
        Ok(attrs)
    }

    /// Returns the date inputs for `form_id`, prefilled with stored values.
    pub fn form_fields(&self, form_id: &str, resource_id: &str) -> RepoResult<Vec<FormField>> {
        if form_id != METADATA_FORM_ID {
            return Ok(Vec::new());
        }
        let attrs = self.get_fields(resource_id)?;
        Ok(build_form_fields(form_id, &attrs))
    }

    /// Removes the record when its owning resource is deleted.
    pub fn delete_for_resource(&self, resource_id: &str) -> RepoResult<bool> {
        let resource_id = ResourceId::new(resource_id)?;
        let existed = self.repo.delete_dates(&resource_id)?;
        info!(
            "event=date_delete module=service status=ok resource_id={} existed={}",
            log_id(resource_id.as_str()),
            existed
        );
        Ok(existed)
    }
}
