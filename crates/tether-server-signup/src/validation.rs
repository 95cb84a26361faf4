// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Field-scoped validation errors shown back on the sign-up form.

use serde::Serialize;

/// Form field carrying the chosen username.
pub const USERNAME_FIELD: &str = "userName";

/// Pseudo-field for errors about the pending external identity itself.
pub const IDENTITY_FIELD: &str = "identity";

pub const USERNAME_REQUIRED: &str = "Please choose a username";

pub fn username_unavailable(username: &str) -> String {
	format!("Sorry, the username '{username}' is not available")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
	pub field: String,
	pub message: String,
}

impl FieldError {
	pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			field: field.into(),
			message: message.into(),
		}
	}
}

/// Accumulated field errors for one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
		let mut errors = Self::new();
		errors.add(field, message);
		errors
	}

	pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
		self.0.push(FieldError::new(field, message));
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
		self.0.iter()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn errors_keep_insertion_order() {
		let mut errors = ValidationErrors::new();
		errors.add(USERNAME_FIELD, "one");
		errors.add("displayName", "two");
		errors.add(USERNAME_FIELD, "three");

		assert_eq!(errors.len(), 3);
		let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
		assert_eq!(fields, vec![USERNAME_FIELD, "displayName", USERNAME_FIELD]);
	}

	#[test]
	fn serializes_as_flat_list() {
		let errors = ValidationErrors::single(USERNAME_FIELD, USERNAME_REQUIRED);
		let json = serde_json::to_value(&errors).unwrap();
		assert_eq!(
			json,
			serde_json::json!([{ "field": "userName", "message": "Please choose a username" }])
		);
	}

	#[test]
	fn unavailable_message_names_username() {
		assert_eq!(
			username_unavailable("octocat"),
			"Sorry, the username 'octocat' is not available"
		);
	}
}
