use crate::task::TaskId;
use thiserror::Error;
use wasm_bindgen::JsValue;

/// A failure reported by a [`Storage`](`crate::storage::Storage`) backend.
///
/// Browser storage reports its failures as opaque [`JsValue`]s, which are neither `Send` nor `Sync`,
/// so they are flattened into their debug representation here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
	#[error("storage is unavailable: {0}")]
	Unavailable(String),
	#[error("failed to read key {key:?}: {reason}")]
	Read { key: String, reason: String },
	#[error("failed to write key {key:?}: {reason}")]
	Write { key: String, reason: String },
}

impl StorageError {
	pub(crate) fn read(key: &str, reason: &JsValue) -> Self {
		Self::Read {
			key: key.to_owned(),
			reason: format!("{:?}", reason),
		}
	}

	pub(crate) fn write(key: &str, reason: &JsValue) -> Self {
		Self::Write {
			key: key.to_owned(),
			reason: format!("{:?}", reason),
		}
	}
}

#[derive(Debug, Error)]
pub enum StoreError {
	#[error(transparent)]
	Storage(#[from] StorageError),
	#[error("stored task list under {key:?} is malformed")]
	Corrupt {
		key: String,
		#[source]
		source: serde_json::Error,
	},
	#[error("failed to serialise the task list")]
	Serialize(#[source] serde_json::Error),
	#[error("a task with id {0} already exists")]
	DuplicateId(TaskId),
	#[error("no id left after {0}")]
	IdsExhausted(TaskId),
}

#[derive(Debug, Error)]
pub enum AppError {
	#[error("at most {limit} todo app instance(s) may be mounted at the same time")]
	TooManyInstances { limit: usize },
	#[error("DOM operation failed: {0}")]
	Dom(String),
	#[error(transparent)]
	Storage(#[from] StorageError),
}

impl From<JsValue> for AppError {
	fn from(error: JsValue) -> Self {
		Self::Dom(format!("{:?}", error))
	}
}

impl From<AppError> for JsValue {
	fn from(error: AppError) -> Self {
		JsValue::from_str(&error.to_string())
	}
}
